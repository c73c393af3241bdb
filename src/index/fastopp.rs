// src/index/fastopp.rs

use crate::document::Document;
use crate::map::{LineDef, Side, Vertex};
use crate::selection::BitVec;
use std::sync::Arc;

/// Leaf size of the interval trees.  Nodes narrower than this are not
/// subdivided further.
const FASTOPP_DIST: i32 = 320;

/// State for one opposite-line cast: a ray fired perpendicular to the
/// source line from a point near its middle, tracking the closest
/// intersected linedef on the requested side.
struct OppTest<'a> {
    linedefs: &'a [Arc<LineDef>],
    vertices: &'a [Arc<Vertex>],

    ld: usize,
    ld_side: Side,

    dx: i32,
    dy: i32,

    // origin of the casting line
    x: f64,
    y: f64,

    is_horizontal: bool,

    best_match: Option<usize>,
    best_dist: f64,
    best_side: Side,
}

impl<'a> OppTest<'a> {
    /// Returns None when the source line has zero length.
    fn new(
        linedefs: &'a [Arc<LineDef>],
        vertices: &'a [Arc<Vertex>],
        ld: usize,
        ld_side: Side,
    ) -> Option<OppTest<'a>> {
        let line = &linedefs[ld];
        let start = &vertices[line.start];
        let end = &vertices[line.end];

        let dx = end.raw_x - start.raw_x;
        let dy = end.raw_y - start.raw_y;

        if dx == 0 && dy == 0 {
            return None;
        }

        let is_horizontal = dy.abs() >= dx.abs();

        // Choose a point near the middle of the source line, nudged
        // off the unit grid so the cast never passes directly through
        // a vertex.
        let mut x = start.raw_x as f64 + dx as f64 * 0.5;
        let mut y = start.raw_y as f64 + dy as f64 * 0.5;

        if is_horizontal && dy % 2 == 0 && dy != 0 {
            y += 0.5;
            x += 0.5 * dx as f64 / dy as f64;
        }

        if !is_horizontal && dx % 2 == 0 && dx != 0 {
            x += 0.5;
            y += 0.5 * dy as f64 / dx as f64;
        }

        Some(OppTest {
            linedefs,
            vertices,
            ld,
            ld_side,
            dx,
            dy,
            x,
            y,
            is_horizontal,
            best_match: None,
            best_dist: 9e9,
            best_side: ld_side,
        })
    }

    fn process_line(&mut self, n: usize) {
        // ignore the source line itself
        if n == self.ld {
            return;
        }

        let line = &self.linedefs[n];
        let nx1 = self.vertices[line.start].raw_x;
        let ny1 = self.vertices[line.start].raw_y;
        let nx2 = self.vertices[line.end].raw_x;
        let ny2 = self.vertices[line.end].raw_y;

        if self.is_horizontal {
            if ny1 == ny2 {
                return;
            }
            if ny1.min(ny2) as f64 > self.y || (ny1.max(ny2) as f64) < self.y {
                return;
            }

            let mut dist = nx1 as f64 + (nx2 - nx1) as f64 * (self.y - ny1 as f64)
                / (ny2 - ny1) as f64
                - self.x;

            if (self.dy < 0) == (self.ld_side == Side::Right) {
                dist = -dist;
            }

            if dist > 0.2 && dist < self.best_dist {
                self.best_match = Some(n);
                self.best_dist = dist;
                self.best_side = if (self.dy > 0) != (ny2 > ny1) {
                    self.ld_side
                } else {
                    self.ld_side.flipped()
                };
            }
        } else {
            // casting a vertical ray
            if nx1 == nx2 {
                return;
            }
            if nx1.min(nx2) as f64 > self.x || (nx1.max(nx2) as f64) < self.x {
                return;
            }

            let mut dist = ny1 as f64 + (ny2 - ny1) as f64 * (self.x - nx1 as f64)
                / (nx2 - nx1) as f64
                - self.y;

            if (self.dx > 0) == (self.ld_side == Side::Right) {
                dist = -dist;
            }

            if dist > 0.2 && dist < self.best_dist {
                self.best_match = Some(n);
                self.best_dist = dist;
                self.best_side = if (self.dx > 0) != (nx2 > nx1) {
                    self.ld_side
                } else {
                    self.ld_side.flipped()
                };
            }
        }
    }

    fn result(&self) -> Option<(usize, Side)> {
        self.best_match.map(|n| (n, self.best_side))
    }
}

/// One node of a binary interval tree over a single axis.  A line is
/// bucketed into the deepest node whose range strictly contains its
/// coordinate interval (one unit of margin at each end), so a query
/// never needs to descend both children.
struct FastoppNode {
    lo: i32,
    hi: i32,
    mid: i32,

    lo_child: Option<Box<FastoppNode>>,
    hi_child: Option<Box<FastoppNode>>,

    lines: Vec<usize>,
}

impl FastoppNode {
    fn new(lo: i32, hi: i32) -> FastoppNode {
        let mid = (lo + hi) / 2;
        let (lo_child, hi_child) = if hi - lo > FASTOPP_DIST {
            (
                Some(Box::new(FastoppNode::new(lo, mid))),
                Some(Box::new(FastoppNode::new(mid, hi))),
            )
        } else {
            (None, None)
        };

        FastoppNode {
            lo,
            hi,
            mid,
            lo_child,
            hi_child,
            lines: Vec::new(),
        }
    }

    fn add_interval(&mut self, ld: usize, c1: i32, c2: i32) {
        if let Some(child) = self.lo_child.as_mut() {
            if c1 > child.lo && c2 < child.hi {
                child.add_interval(ld, c1, c2);
                return;
            }
        }
        if let Some(child) = self.hi_child.as_mut() {
            if c1 > child.lo && c2 < child.hi {
                child.add_interval(ld, c1, c2);
                return;
            }
        }
        self.lines.push(ld);
    }

    fn process(&self, test: &mut OppTest, coord: f64) {
        for &n in &self.lines {
            test.process_line(n);
        }

        if let (Some(lo), Some(hi)) = (&self.lo_child, &self.hi_child) {
            if coord < self.mid as f64 {
                lo.process(test, coord);
            } else {
                hi.process(test, coord);
            }
        }
    }
}

/// Accelerated opposite-line lookup over a frozen snapshot of the map.
///
/// Build it once before a batch of `find_opposite` calls and drop it
/// when done.  The index is NOT kept in sync with edits; results after
/// a geometry change are undefined, so rebuild instead.
pub struct FastOpposite {
    x_tree: FastoppNode,
    y_tree: FastoppNode,
}

impl FastOpposite {
    pub fn build(doc: &Document) -> FastOpposite {
        let (x1, y1, x2, y2) = doc.calc_bounds().unwrap_or((0, 0, 0, 0));

        let mut x_tree = FastoppNode::new(x1 - 8, x2 + 8);
        let mut y_tree = FastoppNode::new(y1 - 8, y2 + 8);

        let linedefs = doc.linedefs.read();
        let vertices = doc.vertices.read();

        for (n, line) in linedefs.iter().enumerate() {
            let sx = vertices[line.start].raw_x;
            let sy = vertices[line.start].raw_y;
            let ex = vertices[line.end].raw_x;
            let ey = vertices[line.end].raw_y;

            // purely vertical lines can never be hit by a vertical
            // cast, and vice versa
            if sx != ex {
                x_tree.add_interval(n, sx.min(ex), sx.max(ex));
            }
            if sy != ey {
                y_tree.add_interval(n, sy.min(ey), sy.max(ey));
            }
        }

        FastOpposite { x_tree, y_tree }
    }

    /// Find the linedef facing `ld` across the empty space on the
    /// given side, and which side of that linedef faces back.
    /// Returns None when the cast reaches the void.
    pub fn find_opposite(&self, doc: &Document, ld: usize, ld_side: Side) -> Option<(usize, Side)> {
        let linedefs = doc.linedefs.read();
        let vertices = doc.vertices.read();

        let mut test = OppTest::new(&linedefs, &vertices, ld, ld_side)?;

        if test.is_horizontal {
            let coord = test.y;
            self.y_tree.process(&mut test, coord);
        } else {
            let coord = test.x;
            self.x_tree.process(&mut test, coord);
        }

        test.result()
    }
}

/// Exhaustive opposite-line search, testing every linedef.  Produces
/// the same result as [`FastOpposite::find_opposite`], and additionally
/// supports skipping the lines set in `ignore_lines` (used by island
/// detection, where a loop's own lines must not occlude the cast).
pub fn opposite_linedef(
    doc: &Document,
    ld: usize,
    ld_side: Side,
    ignore_lines: Option<&BitVec>,
) -> Option<(usize, Side)> {
    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    let mut test = OppTest::new(&linedefs, &vertices, ld, ld_side)?;

    for n in 0..linedefs.len() {
        if let Some(ignore) = ignore_lines {
            if ignore.get(n) {
                continue;
            }
        }
        test.process_line(n);
    }

    test.result()
}

/// The sector on the far side of the empty space next to `ld`, or -1
/// when the cast reaches the void (or hits a bare linedef).
pub fn opposite_sector(doc: &Document, ld: usize, ld_side: Side) -> i32 {
    match opposite_linedef(doc, ld, ld_side, None) {
        Some((opp, opp_side)) => doc.what_sector(opp, opp_side),
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LineDef;

    // Two parallel vertical lines, both pointing north.
    fn parallel_walls() -> Document {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 128);
        let c = doc.add_vertex(128, 0);
        let d = doc.add_vertex(128, 128);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(c, d));
        doc
    }

    #[test]
    fn test_opposite_across_gap() {
        let doc = parallel_walls();

        // right side of line 0 faces east, towards line 1
        let result = opposite_linedef(&doc, 0, Side::Right, None);
        assert_eq!(result, Some((1, Side::Left)));

        // left side of line 0 faces the void
        assert_eq!(opposite_linedef(&doc, 0, Side::Left, None), None);
    }

    #[test]
    fn test_opposite_side_flips_with_direction() {
        let doc = parallel_walls();

        // reverse line 1 so it points south; its right side now
        // faces line 0
        doc.mutate_linedef(1, |line| std::mem::swap(&mut line.start, &mut line.end));

        assert_eq!(
            opposite_linedef(&doc, 0, Side::Right, None),
            Some((1, Side::Right))
        );
    }

    #[test]
    fn test_indexed_matches_exhaustive() {
        let doc = parallel_walls();
        // a third wall in between
        let e = doc.add_vertex(64, 0);
        let f = doc.add_vertex(64, 128);
        doc.add_linedef(LineDef::new(e, f));

        let index = FastOpposite::build(&doc);

        for ld in 0..doc.num_linedefs() {
            for side in [Side::Right, Side::Left] {
                assert_eq!(
                    index.find_opposite(&doc, ld, side),
                    opposite_linedef(&doc, ld, side, None),
                    "linedef {} side {:?}",
                    ld,
                    side
                );
            }
        }
    }

    #[test]
    fn test_ignore_lines() {
        let doc = parallel_walls();
        let e = doc.add_vertex(64, 0);
        let f = doc.add_vertex(64, 128);
        doc.add_linedef(LineDef::new(e, f));

        // normally the middle wall occludes the far one
        assert_eq!(
            opposite_linedef(&doc, 0, Side::Right, None),
            Some((2, Side::Left))
        );

        let mut ignore = BitVec::new(doc.num_linedefs());
        ignore.set(2);
        assert_eq!(
            opposite_linedef(&doc, 0, Side::Right, Some(&ignore)),
            Some((1, Side::Left))
        );
    }

    #[test]
    fn test_zero_length_line() {
        let doc = Document::new();
        let v = doc.add_vertex(0, 0);
        doc.add_linedef(LineDef::new(v, v));
        assert_eq!(opposite_linedef(&doc, 0, Side::Right, None), None);
    }
}
