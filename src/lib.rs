// src/lib.rs
//
// The geometric editing engine of a DOOM map editor: the map model,
// spatial queries, line-loop tracing, sector assignment and sector
// subdivision, without any rendering or file I/O.

pub mod config;
pub mod document;
pub mod editor;
pub mod geom;
pub mod hover;
pub mod index;
pub mod loops;
pub mod map;
pub mod selection;
pub mod subdiv;
