// src/geom/mod.rs
//! Pure spatial primitives used throughout the editing core.
//!
//! Everything in here is a free function with no document access and no
//! side effects, so side classification, projection and crossing tests
//! behave identically wherever they are called from.

pub mod primitives;

pub use primitives::{
    along_dist, angle_between_points, approx_dist_to_line, compute_dist, line_touches_box,
    move_coord_onto, perp_dist, point_in_box, point_on_line_side, segments_cross, CrossKind,
    CROSS_EPSILON,
};
