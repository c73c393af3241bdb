// src/hover/mod.rs

pub mod crossing;
pub mod query;

pub use crossing::{find_crossing_points, CrossPoint, CrossingState};
pub use query::{
    approx_dist_to_linedef, closest_line_casting_horiz, closest_line_casting_vert,
    get_near_object, moved_coord_onto_linedef, nearest_linedef, nearest_sector,
    nearest_split_line, nearest_thing, nearest_vertex, point_outside_of_map,
};
