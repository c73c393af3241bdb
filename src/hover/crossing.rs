// src/hover/crossing.rs
//
// When a new line is drawn between two points, it may pass over
// existing vertices and cross existing linedefs.  This module finds
// all those crossing points, ordered along the new line, so the
// caller can insert the line piecewise and split what it crosses.

use crate::document::Document;
use crate::geom::{along_dist, perp_dist};

const CROSSING_EPSILON: f64 = 0.8;
const ALONG_EPSILON: f64 = 0.4;

#[derive(Debug, Clone)]
pub struct CrossPoint {
    /// Existing vertex sitting on the line, or -1.
    pub vert: i32,
    /// Linedef crossed by the line, or -1.  After `split_all_lines`
    /// the vertex created at the split is stored in `vert`.
    pub ld: i32,

    pub x: i32,
    pub y: i32,

    /// Distance along the new line, used for ordering.
    pub dist: f64,
}

#[derive(Debug, Default)]
pub struct CrossingState {
    pub points: Vec<CrossPoint>,

    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl CrossingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn add_vert(&mut self, v: usize, x: i32, y: i32, dist: f64) {
        self.points.push(CrossPoint {
            vert: v as i32,
            ld: -1,
            x,
            y,
            dist,
        });
    }

    pub fn add_line(&mut self, ld: usize, ix: i32, iy: i32, dist: f64) {
        self.points.push(CrossPoint {
            vert: -1,
            ld: ld as i32,
            x: ix,
            y: iy,
            dist,
        });
    }

    pub fn has_vertex(&self, v: usize) -> bool {
        self.points.iter().any(|p| p.vert == v as i32)
    }

    pub fn has_line(&self, ld: usize) -> bool {
        self.points.iter().any(|p| p.ld == ld as i32)
    }

    fn sort(&mut self) {
        self.points
            .sort_by(|a, b| a.dist.partial_cmp(&b.dist).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Splits every crossed linedef at its intersection point,
    /// turning each line crossing into a vertex crossing.
    pub fn split_all_lines(&mut self, doc: &Document) {
        for point in self.points.iter_mut() {
            if point.ld >= 0 {
                let v = doc.add_vertex(point.x, point.y);
                crate::editor::split_linedef_at_vertex(doc, point.ld as usize, v);
                point.vert = v as i32;
            }
        }
    }
}

// easier to hit a vertex when zoomed out
fn vertex_close_dist(scale: f64) -> f64 {
    let close_dist = 8.0 * (1.0 / scale).sqrt();
    close_dist.clamp(1.2, 24.0)
}

fn find_crossing_lines(
    doc: &Document,
    cross: &mut CrossingState,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    scale: f64,
) {
    let close_dist = vertex_close_dist(scale);

    let dx = x2 - x1;
    let dy = y2 - y1;

    // happens when two waypoints overlap
    if dx == 0 && dy == 0 {
        return;
    }

    let length = ((dx * dx + dy * dy) as f64).sqrt();

    let num_lines = doc.num_linedefs();

    for ld in 0..num_lines {
        let line = doc.linedef(ld);
        let (lx1, ly1, lx2, ly2) = doc.line_coords(&line);

        // skip any linedef touching a vertex already in the crossing
        // state, including the overall start and end points
        if doc.touches_coord(&line, x1, y1) || doc.touches_coord(&line, x2, y2) {
            continue;
        }
        if doc.touches_coord(&line, cross.start_x, cross.start_y)
            || doc.touches_coord(&line, cross.end_x, cross.end_y)
        {
            continue;
        }

        if cross.has_line(ld) {
            continue;
        }
        if cross.has_vertex(line.start) || cross.has_vertex(line.end) {
            continue;
        }

        // only handle the case where this linedef distinctly crosses
        // the new line: its endpoints clearly on opposite sides
        let a = perp_dist(
            lx1 as f64, ly1 as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
        );
        let b = perp_dist(
            lx2 as f64, ly2 as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
        );

        if !((a < -CROSSING_EPSILON && b > CROSSING_EPSILON)
            || (a > CROSSING_EPSILON && b < -CROSSING_EPSILON))
        {
            continue;
        }

        // compute intersection point
        let l_along = a / (a - b);

        let ix = lx1 as f64 + l_along * (lx2 - lx1) as f64;
        let iy = ly1 as f64 + l_along * (ly2 - ly1) as f64;

        let new_x = ix.round() as i32;
        let new_y = iy.round() as i32;

        // the new vertex must not land on the segment endpoints
        if (new_x == x1 && new_y == y1) || (new_x == x2 && new_y == y2) {
            continue;
        }

        let mut along = along_dist(
            new_x as f64, new_y as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
        );

        if along < ALONG_EPSILON || along > length - ALONG_EPSILON {
            continue;
        }

        // let nearby vertices win over the linedef they sit on
        along += close_dist * 2.0;

        cross.add_line(ld, new_x, new_y, along);
    }
}

/// Collects, in order, every existing vertex lying on the segment
/// `(x1, y1) -> (x2, y2)` and every linedef distinctly crossing it.
/// `possible_v1` / `possible_v2` are the vertices (if any) at the
/// segment's own endpoints, which are never reported.
pub fn find_crossing_points(
    doc: &Document,
    x1: i32,
    y1: i32,
    possible_v1: Option<usize>,
    x2: i32,
    y2: i32,
    possible_v2: Option<usize>,
    scale: f64,
) -> CrossingState {
    let mut cross = CrossingState::new();

    cross.start_x = x1;
    cross.start_y = y1;
    cross.end_x = x2;
    cross.end_y = y2;

    let close_dist = vertex_close_dist(scale);

    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx == 0 && dy == 0 {
        return cross;
    }

    let length = ((dx * dx + dy * dy) as f64).sqrt();

    // all vertices must be found FIRST
    {
        let vertices = doc.vertices.read();

        for (v, vc) in vertices.iter().enumerate() {
            if Some(v) == possible_v1 || Some(v) == possible_v2 {
                continue;
            }

            // ignore vertices at the segment's own coordinates
            if vc.matches(x1, y1) || vc.matches(x2, y2) {
                continue;
            }

            // is this vertex sitting on the line?
            let perp = perp_dist(
                vc.raw_x as f64, vc.raw_y as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
            );

            if perp.abs() > close_dist {
                continue;
            }

            let along = along_dist(
                vc.raw_x as f64, vc.raw_y as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
            );

            if along < ALONG_EPSILON || along > length - ALONG_EPSILON {
                continue;
            }

            cross.add_vert(v, vc.raw_x, vc.raw_y, along);
        }
    }

    cross.sort();

    // then find crossed linedefs between each consecutive pair of
    // waypoints
    let mut cur_x1 = x1;
    let mut cur_y1 = y1;

    let num_verts = cross.points.len();

    for k in 0..num_verts {
        let (nx, ny) = (cross.points[k].x, cross.points[k].y);

        find_crossing_lines(doc, &mut cross, cur_x1, cur_y1, nx, ny, scale);

        cur_x1 = nx;
        cur_y1 = ny;
    }

    find_crossing_lines(doc, &mut cross, cur_x1, cur_y1, x2, y2, scale);

    cross.sort();

    cross
}
