// src/document/mod.rs

pub mod document;
pub mod objid;

pub use document::Document;
pub use objid::{ObjType, Objid, NIL_OBJ};
