// src/loops/mod.rs

pub mod assign;
pub mod trace;

pub use assign::{add_second_sidedef, assign_sector_to_loop, assign_sector_to_space};
pub use trace::{trace_line_loop, LineLoop};
