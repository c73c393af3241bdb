// src/loops/trace.rs

use crate::document::Document;
use crate::geom::{angle_between_points, compute_dist};
use crate::index::opposite_linedef;
use crate::map::Side;

/// A closed path of linedefs bounding an area, with the side of each
/// line that faces the enclosed space.  An inward-facing loop may
/// additionally contain islands, loops floating wholly inside it
/// (pillars, free-standing structures).
#[derive(Debug, Default, Clone)]
pub struct LineLoop {
    pub lines: Vec<usize>,
    pub sides: Vec<Side>,

    /// True when the loop was traced around the OUTSIDE of a shape
    /// (average interior angle of 180 degrees or more).
    pub faces_outward: bool,

    pub islands: Vec<LineLoop>,
}

impl LineLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.sides.clear();
        self.faces_outward = false;
        self.islands.clear();
    }

    pub fn push_back(&mut self, ld: usize, side: Side) {
        self.lines.push(ld);
        self.sides.push(side);
    }

    /// Is this line/side combination in the loop (islands included)?
    pub fn get(&self, ld: usize, side: Side) -> bool {
        for k in 0..self.lines.len() {
            if self.lines[k] == ld && self.sides[k] == side {
                return true;
            }
        }
        self.islands.iter().any(|island| island.get(ld, side))
    }

    /// Is the linedef in the loop on either side (islands included)?
    pub fn get_just_line(&self, ld: usize) -> bool {
        if self.lines.contains(&ld) {
            return true;
        }
        self.islands.iter().any(|island| island.get_just_line(ld))
    }

    /// Total perimeter length, NOT including islands.
    pub fn total_length(&self, doc: &Document) -> f64 {
        let linedefs = doc.linedefs.read();
        let vertices = doc.vertices.read();

        let mut result = 0.0;

        for &ld in &self.lines {
            let line = &linedefs[ld];
            let dx = vertices[line.start].raw_x - vertices[line.end].raw_x;
            let dy = vertices[line.start].raw_y - vertices[line.end].raw_y;
            result += compute_dist(dx as f64, dy as f64);
        }

        result
    }

    /// When every facing side references the same sector (which may
    /// be -1 for none at all), returns it.  Islands are not included.
    pub fn same_sector(&self, doc: &Document) -> Option<i32> {
        assert!(!self.lines.is_empty());

        let sec = doc.what_sector(self.lines[0], self.sides[0]);

        for k in 1..self.lines.len() {
            if doc.what_sector(self.lines[k], self.sides[k]) != sec {
                return None;
            }
        }

        Some(sec)
    }

    /// True when no facing side has a sidedef yet, i.e. the loop
    /// consists entirely of freshly drawn lines.
    pub fn all_bare(&self, doc: &Document) -> bool {
        self.same_sector(doc) == Some(-1)
    }

    /// The sector on the far side of the longest linedef in the loop.
    /// Used as the model when filling a new area next to an existing
    /// room.
    pub fn neighboring_sector(&self, doc: &Document) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_len = -1.0;

        for i in 0..self.lines.len() {
            let sec = doc.what_sector(self.lines[i], self.sides[i].flipped());
            if sec < 0 {
                continue;
            }

            let line = doc.linedef(self.lines[i]);
            let len = doc.calc_length(&line);

            if len > best_len {
                best = Some(sec as usize);
                best_len = len;
            }
        }

        best
    }

    /// For an outward-facing loop: the sector of the surrounding
    /// space, found by casting outward from each line until something
    /// not part of this island is hit.  None when the island sits in
    /// the void or the test does not apply.
    pub fn faces_sector(&self, doc: &Document) -> Option<usize> {
        if !self.faces_outward {
            return None;
        }

        for i in 0..self.lines.len() {
            // the first line may face another line of the island
            // itself, so several casts can be needed
            let (opp, opp_side) = opposite_linedef(doc, self.lines[i], self.sides[i], None)?;

            if self.get_just_line(opp) {
                continue;
            }

            let sec = doc.what_sector(opp, opp_side);
            return if sec >= 0 { Some(sec as usize) } else { None };
        }

        None
    }

    /// Bounding box over all lines of the loop proper.
    pub fn calc_bounds(&self, doc: &Document) -> (i32, i32, i32, i32) {
        assert!(!self.lines.is_empty());

        let linedefs = doc.linedefs.read();
        let vertices = doc.vertices.read();

        let mut x1 = i32::MAX;
        let mut y1 = i32::MAX;
        let mut x2 = i32::MIN;
        let mut y2 = i32::MIN;

        for &ld in &self.lines {
            let line = &linedefs[ld];
            for v in [line.start, line.end] {
                x1 = x1.min(vertices[v].raw_x);
                y1 = y1.min(vertices[v].raw_y);
                x2 = x2.max(vertices[v].raw_x);
                y2 = y2.max(vertices[v].raw_y);
            }
        }

        (x1, y1, x2, y2)
    }

    /// One pass of island discovery: look for line loops lying inside
    /// this loop's bounding box that face outward and are not part of
    /// the path yet.  Returns true when at least one was added.
    fn look_for_island(&mut self, doc: &Document) -> bool {
        let (mut bb_x1, mut bb_y1, mut bb_x2, mut bb_y2) = self.calc_bounds(doc);

        bb_x1 -= 1;
        bb_y1 -= 1;
        bb_x2 += 1;
        bb_y2 += 1;

        let mut count = 0;

        let num_lines = doc.num_linedefs();

        for ld in 0..num_lines {
            let line = doc.linedef(ld);
            let (x1, y1, x2, y2) = doc.line_coords(&line);

            if x1.max(x2) < bb_x1 || x1.min(x2) > bb_x2 || y1.max(y2) < bb_y1
                || y1.min(y2) > bb_y2
            {
                continue;
            }

            // O(n^2) on the number of lines, acceptable for editing
            for ld_side in [Side::Left, Side::Right] {
                let Some((opp, opp_side)) = opposite_linedef(doc, ld, ld_side, None) else {
                    continue;
                };

                let ld_in_path = self.get(ld, ld_side);
                let opp_in_path = self.get(opp, opp_side);

                // nothing to do when both (or neither) are in the path
                if ld_in_path == opp_in_path {
                    continue;
                }

                let traced = if ld_in_path {
                    trace_line_loop(doc, opp, opp_side, false)
                } else {
                    trace_line_loop(doc, ld, ld_side, false)
                };

                if let Some(island) = traced {
                    if island.faces_outward {
                        self.islands.push(island);
                        count += 1;
                    }
                }
            }
        }

        count > 0
    }

    /// Finds all islands, repeating until no more are found.  The
    /// repetition handles e.g. a room full of pillars, where inner
    /// pillars only become visible once their neighbors are part of
    /// the path.
    pub fn find_islands(&mut self, doc: &Document) {
        // iteration cap for safety
        for round in (0..=200).rev() {
            assert!(round > 0, "line loop island search failed to terminate");

            if !self.look_for_island(doc) {
                break;
            }
        }
    }
}

/// Follows the path clockwise from the given start line and side,
/// turning as tightly as possible at each vertex.  Returns None when
/// the path cannot be closed (a dead end, a revisited line, or fewer
/// than three edges).
///
/// With `ignore_bare` set, lines that have no sidedefs at all are
/// not considered when walking.
pub fn trace_line_loop(doc: &Document, ld: usize, side: Side, ignore_bare: bool) -> Option<LineLoop> {
    let mut loop_ = LineLoop::new();

    let start_line = doc.linedef(ld);

    let (mut cur_vert, mut prev_vert) = if side == Side::Right {
        (start_line.end, start_line.start)
    } else {
        (start_line.start, start_line.end)
    };

    let final_vert = prev_vert;

    let mut average_angle = 0.0;

    loop_.push_back(ld, side);

    let mut cur_line = ld;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    while cur_vert != final_vert {
        let mut next_line: Option<usize> = None;
        let mut next_vert = 0;
        let mut next_side = Side::Right;

        let mut best_angle = 9999.0;

        // The next linedef in the path uses the current vertex, is
        // not the current line, and has the smallest interior angle.
        // On an exact tie the lowest-numbered line wins.
        for (n, candidate) in linedefs.iter().enumerate() {
            if candidate.start != cur_vert && candidate.end != cur_vert {
                continue;
            }
            if n == cur_line {
                continue;
            }
            if ignore_bare && candidate.right < 0 && candidate.left < 0 {
                continue;
            }

            let (other_vert, which_side) = if candidate.start == cur_vert {
                (candidate.end, Side::Right)
            } else {
                (candidate.start, Side::Left)
            };

            let a = &vertices[prev_vert];
            let b = &vertices[cur_vert];
            let c = &vertices[other_vert];

            let angle = angle_between_points(
                a.raw_x, a.raw_y, b.raw_x, b.raw_y, c.raw_x, c.raw_y,
            );

            if next_line.is_none() || angle < best_angle {
                next_line = Some(n);
                next_vert = other_vert;
                next_side = which_side;

                best_angle = angle;
            }
        }

        // a dead end: the path cannot be closed
        let next_line = next_line?;

        // a revisited line means a non-closed structure
        if loop_.get_just_line(next_line) {
            return None;
        }

        cur_line = next_line;

        prev_vert = cur_vert;
        cur_vert = next_vert;

        average_angle += best_angle;

        loop_.push_back(next_line, next_side);
    }

    // can happen with overlapping linedefs
    if loop_.lines.len() < 3 {
        return None;
    }

    average_angle /= loop_.lines.len() as f64;

    loop_.faces_outward = average_angle >= 180.0;

    Some(loop_)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LineDef;

    // 128x128 square with lines wound clockwise: right sides face in.
    fn square(doc: &Document, x: i32, y: i32, size: i32) -> Vec<usize> {
        let a = doc.add_vertex(x, y);
        let b = doc.add_vertex(x, y + size);
        let c = doc.add_vertex(x + size, y + size);
        let d = doc.add_vertex(x + size, y);

        [(a, b), (b, c), (c, d), (d, a)]
            .iter()
            .map(|&(s, e)| doc.add_linedef(LineDef::new(s, e)))
            .collect()
    }

    #[test]
    fn test_trace_inward_loop() {
        let doc = Document::new();
        let lines = square(&doc, 0, 0, 128);

        let loop_ = trace_line_loop(&doc, lines[0], Side::Right, false).unwrap();

        assert_eq!(loop_.lines.len(), 4);
        assert!(!loop_.faces_outward);
        assert!(loop_.sides.iter().all(|&s| s == Side::Right));
        for &ld in &lines {
            assert!(loop_.get_just_line(ld));
        }
    }

    #[test]
    fn test_trace_outward_loop() {
        let doc = Document::new();
        let lines = square(&doc, 0, 0, 128);

        let loop_ = trace_line_loop(&doc, lines[0], Side::Left, false).unwrap();

        assert_eq!(loop_.lines.len(), 4);
        assert!(loop_.faces_outward);
    }

    #[test]
    fn test_trace_open_path_fails() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 128);
        let c = doc.add_vertex(128, 128);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(b, c));

        assert!(trace_line_loop(&doc, 0, Side::Right, false).is_none());
    }

    #[test]
    fn test_trace_takes_tightest_turn() {
        let doc = Document::new();
        let lines = square(&doc, 0, 0, 128);

        // a dangling spur attached to the square's second corner
        let spur = doc.add_vertex(-64, 128);
        doc.add_linedef(LineDef::new(1, spur));

        let loop_ = trace_line_loop(&doc, lines[0], Side::Right, false).unwrap();

        assert_eq!(loop_.lines.len(), 4);
        assert!(!loop_.get_just_line(4));
    }

    #[test]
    fn test_find_islands() {
        let doc = Document::new();
        let outer = square(&doc, 0, 0, 512);
        // a pillar in the middle
        let inner = square(&doc, 224, 224, 64);

        let mut loop_ = trace_line_loop(&doc, outer[0], Side::Right, false).unwrap();
        loop_.find_islands(&doc);

        assert_eq!(loop_.islands.len(), 1);
        assert!(loop_.islands[0].faces_outward);
        for &ld in &inner {
            assert!(loop_.get_just_line(ld));
        }
    }

    #[test]
    fn test_total_length() {
        let doc = Document::new();
        let lines = square(&doc, 0, 0, 128);
        let loop_ = trace_line_loop(&doc, lines[0], Side::Right, false).unwrap();
        assert_eq!(loop_.total_length(&doc), 512.0);
    }
}
