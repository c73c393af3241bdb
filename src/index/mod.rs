// src/index/mod.rs

pub mod fastopp;

pub use fastopp::{opposite_linedef, opposite_sector, FastOpposite};
