// src/editor/mod.rs

pub mod ops;
pub mod transform;

use thiserror::Error;

/// Errors surfaced to the user by editing operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// A ray from the point reaches the void, or tracing the
    /// enclosing line loop failed.
    #[error("area is not closed")]
    AreaNotClosed,

    /// The traced loop goes around the outside of a shape, so there
    /// is no interior to fill.
    #[error("line loop faces outward")]
    LoopFacesOutward,
}

pub use ops::{
    convert_selection, create_square_sector, delete_objects, disconnect_vertex, flip_linedef,
    flip_linedef_group, insert_linedef, insert_linedef_autosplit, linedef_already_exists,
    linedef_touches_box, merge_vertex, move_objects, objs_calc_bbox, objs_calc_middle,
    split_linedef_at_vertex,
};
pub use transform::{
    apply_transform, enlarge_objects, mirror_objects, quantize_objects, rotate90_objects,
    shrink_objects, Transform,
};
