// src/map/mod.rs
pub mod linedef;
pub mod sector;
pub mod side;
pub mod sidedef;
pub mod thing;
pub mod vertex;

pub use linedef::{LineDef, MLF_BLOCKING, MLF_TWO_SIDED};
pub use sector::Sector;
pub use side::Side;
pub use sidedef::{is_real_tex, SideDef};
pub use thing::Thing;
pub use vertex::Vertex;
