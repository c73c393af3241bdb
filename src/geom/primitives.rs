// src/geom/primitives.rs

/// Epsilon for the perpendicular-distance sign used by [`segments_cross`]:
/// segments closer than this to parallel/touching are not counted as a
/// genuine crossing.
pub const CROSS_EPSILON: f64 = 0.02;

/// Euclidean length of the vector `(dx, dy)`.
pub fn compute_dist(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

/// Signed perpendicular distance of the point from the infinite line
/// through `(x1,y1)-(x2,y2)`.
///
/// Positive on one side, negative on the other, zero on the line.
/// The line must not be degenerate.
pub fn perp_dist(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let x = px - x1;
    let y = py - y1;
    let dx = x2 - x1;
    let dy = y2 - y1;

    let len = (dx * dx + dy * dy).sqrt();
    assert!(len > 0.0, "perp_dist: zero-length line");

    (x * dy - y * dx) / len
}

/// Signed projection of the point onto the line's direction vector, in
/// map units (not normalized to [0,1]).
///
/// Used for ordering points along a line and deciding whether an
/// intersection lies within the segment rather than the infinite line.
pub fn along_dist(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let x = px - x1;
    let y = py - y1;
    let dx = x2 - x1;
    let dy = y2 - y1;

    let len = (dx * dx + dy * dy).sqrt();
    assert!(len > 0.0, "along_dist: zero-length line");

    (x * dx + y * dy) / len
}

/// Integer side test: -1 for back, +1 for front, 0 for exactly on the line.
pub fn point_on_line_side(x: i32, y: i32, lx1: i32, ly1: i32, lx2: i32, ly2: i32) -> i32 {
    let x = (x - lx1) as i64;
    let y = (y - ly1) as i64;
    let dx = (lx2 - lx1) as i64;
    let dy = (ly2 - ly1) as i64;

    let tmp = x * dy - y * dx;

    if tmp < 0 {
        -1
    } else if tmp > 0 {
        1
    } else {
        0
    }
}

/// Distance from the point to the segment, clamped: when the projection
/// falls outside the segment the result is the distance to the nearest
/// endpoint.
pub fn approx_dist_to_line(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx.abs() > dy.abs() {
        // The line is rather horizontal.

        // to the left of the left-most vertex
        let (lx, ly) = if dx > 0.0 { (x1, y1) } else { (x2, y2) };
        if px < lx {
            return (px - lx).hypot(py - ly);
        }

        // to the right of the right-most vertex
        let (rx, ry) = if dx > 0.0 { (x2, y2) } else { (x1, y1) };
        if px > rx {
            return (px - rx).hypot(py - ry);
        }

        // in-between: use the slope formula to get the intersection
        let y3 = y1 + (px - x1) * dy / dx;
        (y3 - py).abs()
    } else if dy.abs() > 0.0 {
        // The line is rather vertical.

        let (lx, ly) = if dy > 0.0 { (x1, y1) } else { (x2, y2) };
        if py < ly {
            return (px - lx).hypot(py - ly);
        }

        let (hx, hy) = if dy > 0.0 { (x2, y2) } else { (x1, y1) };
        if py > hy {
            return (px - hx).hypot(py - hy);
        }

        let x3 = x1 + (py - y1) * dx / dy;
        (x3 - px).abs()
    } else {
        // degenerate segment
        (px - x1).hypot(py - y1)
    }
}

/// The angle between lines AB and BC, going anticlockwise, in degrees
/// in the range [0, 360).
pub fn angle_between_points(
    ax: i32,
    ay: i32,
    bx: i32,
    by: i32,
    cx: i32,
    cy: i32,
) -> f64 {
    let a_dx = (bx - ax) as f64;
    let a_dy = (by - ay) as f64;

    let c_dx = (bx - cx) as f64;
    let c_dy = (by - cy) as f64;

    let ab_angle = if a_dx == 0.0 {
        if a_dy >= 0.0 {
            90.0
        } else {
            -90.0
        }
    } else {
        a_dy.atan2(a_dx).to_degrees()
    };

    let cb_angle = if c_dx == 0.0 {
        if c_dy >= 0.0 {
            90.0
        } else {
            -90.0
        }
    } else {
        c_dy.atan2(c_dx).to_degrees()
    };

    let mut result = cb_angle - ab_angle;

    while result >= 360.0 {
        result -= 360.0;
    }
    while result < 0.0 {
        result += 360.0;
    }

    result
}

/// Project `(x, y)` onto the line through `(x1,y1)-(x2,y2)` and round
/// to integer map coordinates.
pub fn move_coord_onto(x: i32, y: i32, x1: f64, y1: f64, x2: f64, y2: f64) -> (i32, i32) {
    let dx = x2 - x1;
    let dy = y2 - y1;

    let len_squared = dx * dx + dy * dy;
    assert!(len_squared > 0.0, "move_coord_onto: zero-length line");

    let along = (x as f64 - x1) * dx + (y as f64 - y1) * dy;

    let new_x = x1 + along * dx / len_squared;
    let new_y = y1 + along * dy / len_squared;

    (new_x.round() as i32, new_y.round() as i32)
}

/// Classification of how two segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossKind {
    /// No genuine crossing.
    None,
    /// An endpoint of A sits on B's interior.
    TJunctionAOnB,
    /// An endpoint of B sits on A's interior.
    TJunctionBOnA,
    /// The segments distinctly cross each other.
    Cross,
    /// The segments are colinear and their ranges overlap.
    ColinearOverlap,
}

/// Classify how segment A `(ax1,ay1)-(ax2,ay2)` meets segment B.
///
/// Near-parallel and touching-only cases are rejected by requiring the
/// perpendicular distances to clear [`CROSS_EPSILON`].
pub fn segments_cross(
    ax1: f64,
    ay1: f64,
    ax2: f64,
    ay2: f64,
    bx1: f64,
    by1: f64,
    bx2: f64,
    by2: f64,
) -> CrossKind {
    // perpendicular distance of each endpoint from the other segment's line
    let pa1 = perp_dist(ax1, ay1, bx1, by1, bx2, by2);
    let pa2 = perp_dist(ax2, ay2, bx1, by1, bx2, by2);
    let pb1 = perp_dist(bx1, by1, ax1, ay1, ax2, ay2);
    let pb2 = perp_dist(bx2, by2, ax1, ay1, ax2, ay2);

    let a_on = pa1.abs() <= CROSS_EPSILON && pa2.abs() <= CROSS_EPSILON;

    if a_on {
        // colinear: overlapping when the along ranges intersect
        let len_b = compute_dist(bx2 - bx1, by2 - by1);

        let t1 = along_dist(ax1, ay1, bx1, by1, bx2, by2);
        let t2 = along_dist(ax2, ay2, bx1, by1, bx2, by2);

        let lo = t1.min(t2);
        let hi = t1.max(t2);

        if hi > CROSS_EPSILON && lo < len_b - CROSS_EPSILON {
            return CrossKind::ColinearOverlap;
        }
        return CrossKind::None;
    }

    let a_straddles = (pa1 < -CROSS_EPSILON && pa2 > CROSS_EPSILON)
        || (pa1 > CROSS_EPSILON && pa2 < -CROSS_EPSILON);
    let b_straddles = (pb1 < -CROSS_EPSILON && pb2 > CROSS_EPSILON)
        || (pb1 > CROSS_EPSILON && pb2 < -CROSS_EPSILON);

    if a_straddles && b_straddles {
        return CrossKind::Cross;
    }

    // T-junction: one endpoint sits on the other segment's interior
    let len_a = compute_dist(ax2 - ax1, ay2 - ay1);
    let len_b = compute_dist(bx2 - bx1, by2 - by1);

    if b_straddles && (pa1.abs() <= CROSS_EPSILON || pa2.abs() <= CROSS_EPSILON) {
        let (px, py) = if pa1.abs() <= CROSS_EPSILON {
            (ax1, ay1)
        } else {
            (ax2, ay2)
        };
        let along = along_dist(px, py, bx1, by1, bx2, by2);
        if along > CROSS_EPSILON && along < len_b - CROSS_EPSILON {
            return CrossKind::TJunctionAOnB;
        }
    }

    if a_straddles && (pb1.abs() <= CROSS_EPSILON || pb2.abs() <= CROSS_EPSILON) {
        let (px, py) = if pb1.abs() <= CROSS_EPSILON {
            (bx1, by1)
        } else {
            (bx2, by2)
        };
        let along = along_dist(px, py, ax1, ay1, ax2, ay2);
        if along > CROSS_EPSILON && along < len_a - CROSS_EPSILON {
            return CrossKind::TJunctionBOnA;
        }
    }

    CrossKind::None
}

/// Axis-aligned containment test (inclusive).
pub fn point_in_box(x: i32, y: i32, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    x >= x1 && x <= x2 && y >= y1 && y <= y2
}

/// True when the segment touches or crosses the axis-aligned box,
/// including the case where both endpoints are outside but the segment
/// passes through an edge.
pub fn line_touches_box(
    lx1: i32,
    ly1: i32,
    lx2: i32,
    ly2: i32,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) -> bool {
    if point_in_box(lx1, ly1, x1, y1, x2, y2) || point_in_box(lx2, ly2, x1, y1, x2, y2) {
        return true;
    }

    // bounding interval rejection
    if lx1.max(lx2) < x1 || lx1.min(lx2) > x2 || ly1.max(ly2) < y1 || ly1.min(ly2) > y2 {
        return false;
    }

    let dx = (lx2 - lx1) as i64;
    let dy = (ly2 - ly1) as i64;

    // test against the two vertical box edges
    if dx != 0 {
        for edge_x in [x1, x2] {
            let t_num = (edge_x - lx1) as i64;
            // intersection y at edge_x, computed without division:
            // ly1 + dy * t_num / dx must lie inside [y1, y2]
            if (t_num >= 0) != (dx >= 0) && t_num != 0 {
                continue;
            }
            if t_num.abs() > dx.abs() {
                continue;
            }
            let iy = ly1 as i64 + dy * t_num / dx;
            if iy >= y1 as i64 && iy <= y2 as i64 {
                return true;
            }
        }
    }

    // test against the two horizontal box edges
    if dy != 0 {
        for edge_y in [y1, y2] {
            let t_num = (edge_y - ly1) as i64;
            if (t_num >= 0) != (dy >= 0) && t_num != 0 {
                continue;
            }
            if t_num.abs() > dy.abs() {
                continue;
            }
            let ix = lx1 as i64 + dx * t_num / dy;
            if ix >= x1 as i64 && ix <= x2 as i64 {
                return true;
            }
        }
    }

    false
}
