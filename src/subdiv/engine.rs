// src/subdiv/engine.rs
//
// Subdividing a sector into trapezoids with a horizontal sweep.  The
// result is what a flat-fill renderer consumes: every shape has a
// purely horizontal top and bottom, only the sides may slope.

use crate::map::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorPolygon {
    /// Number of corners, either 3 or 4.
    pub count: usize,

    pub mx: [f64; 4],
    pub my: [f64; 4],
}

/// The set of trapezoids covering one sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorSubdivision {
    pub polygons: Vec<SectorPolygon>,
}

impl SectorSubdivision {
    pub fn clear(&mut self) {
        self.polygons.clear();
    }

    pub fn add_polygon(&mut self, lx1: f64, lx2: f64, low_y: f64, hx1: f64, hx2: f64, high_y: f64) {
        // determine if the low or high edge is a single vertex
        let l_single = (lx2 - lx1).abs() < 0.2;
        let h_single = (hx2 - hx1).abs() < 0.2;

        // skip a degenerate polygon
        if l_single && h_single {
            return;
        }

        let mut poly = SectorPolygon {
            count: if l_single || h_single { 3 } else { 4 },
            mx: [0.0; 4],
            my: [0.0; 4],
        };

        // corners in clockwise order
        let mut pos = 0;

        poly.mx[pos] = lx1;
        poly.my[pos] = low_y;
        pos += 1;

        poly.mx[pos] = hx1;
        poly.my[pos] = high_y;
        pos += 1;

        if !h_single {
            poly.mx[pos] = hx2;
            poly.my[pos] = high_y;
            pos += 1;
        }

        if !l_single {
            poly.mx[pos] = lx2;
            poly.my[pos] = low_y;
        }

        self.polygons.push(poly);
    }
}

/// A segment of a linedef bounding the sector being subdivided.  The
/// coordinates are normalized so `y1 <= y2`; `side` records which
/// side faces the sector AFTER that normalization.
#[derive(Debug, Clone)]
pub(crate) struct SectorEdge {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,

    /// Which side faces the sector's interior.
    pub side: Side,

    /// Right sidedef of the underlying line, -1 when absent.  Lines
    /// with no right side are treated as dead when pairing.
    pub line_right: i32,

    /// Scratch X coordinate for the horizontal sort.
    pub cmp_x: f64,
}

impl SectorEdge {
    pub fn calc_x(&self, y: f64) -> f64 {
        self.x1 as f64 + (self.x2 - self.x1) as f64 * (y - self.y1 as f64)
            / (self.y2 - self.y1) as f64
    }
}

/// Sweep over the edge list from bottom to top, maintaining an active
/// edge set, and emit one trapezoid per (right, left) pair per row.
/// `edgelist` must be sorted by `y1`.
pub(crate) fn sweep_edges(mut edgelist: Vec<SectorEdge>, sub: &mut SectorSubdivision) {
    if edgelist.is_empty() {
        return;
    }

    // indices into edgelist; None marks a retired slot
    let mut active_edges: Vec<Option<usize>> = Vec::new();

    let mut pos = 0;

    // minimal by construction, since the edge list is sorted
    let mut low_y = edgelist[0].y1;

    loop {
        // retire old edges
        for slot in active_edges.iter_mut() {
            if let Some(e) = *slot {
                if edgelist[e].y2 <= low_y {
                    *slot = None;
                }
            }
        }

        // add new edges starting at this row
        while pos < edgelist.len() && edgelist[pos].y1 == low_y {
            active_edges.push(Some(pos));
            pos += 1;
        }

        // find the next event Y
        let mut high_y = 1 << 30;
        let mut active_num = 0;

        if pos < edgelist.len() {
            high_y = edgelist[pos].y1;
        }

        for slot in &active_edges {
            if let Some(e) = *slot {
                active_num += 1;

                if edgelist[e].y1 > low_y {
                    high_y = high_y.min(edgelist[e].y1);
                }
                if edgelist[e].y2 > low_y {
                    high_y = high_y.min(edgelist[e].y2);
                }
            }
        }

        if active_num == 0 {
            while pos < edgelist.len() && edgelist[pos].y1 <= low_y {
                pos += 1;
            }

            // no more rows
            if pos >= edgelist.len() {
                break;
            }

            low_y = edgelist[pos].y1;
            continue;
        }

        // sort the active edges horizontally, comparing at the middle
        // of the row so crossing endpoints cannot confuse the order
        let mid_y = low_y as f64 + (high_y - low_y) as f64 * 0.5;

        for slot in &active_edges {
            if let Some(e) = *slot {
                edgelist[e].cmp_x = edgelist[e].calc_x(mid_y);
            }
        }

        active_edges.sort_by(|a, b| {
            // retired slots sort to the end
            let ax = a.map_or(f64::INFINITY, |e| edgelist[e].cmp_x);
            let bx = b.map_or(f64::INFINITY, |e| edgelist[e].cmp_x);
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        });

        while active_edges.last() == Some(&None) {
            active_edges.pop();
        }

        // visit pairs of edges
        for i in 1..active_edges.len() {
            let (Some(e1), Some(e2)) = (active_edges[i - 1], active_edges[i]) else {
                continue;
            };

            let e1 = &edgelist[e1];
            let e2 = &edgelist[e2];

            if !(e1.side == Side::Right && e2.side == Side::Left) {
                continue;
            }

            if e1.line_right < 0 || e2.line_right < 0 {
                continue;
            }

            let lx1 = e1.calc_x(low_y as f64);
            let hx1 = e1.calc_x(high_y as f64);

            let lx2 = e2.calc_x(low_y as f64);
            let hx2 = e2.calc_x(high_y as f64);

            sub.add_polygon(lx1, lx2, low_y as f64, hx1, hx2, high_y as f64);
        }

        // repeat for the next row
        low_y = high_y;
    }
}
