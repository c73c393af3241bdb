// src/selection/mod.rs
pub mod bitvec;
pub mod set;

pub use bitvec::{BitOp, BitVec};
pub use set::{SelIter, Selection, MAX_STORE_SEL};
