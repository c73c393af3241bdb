// src/subdiv/mod.rs

pub mod cache;
pub mod engine;

pub use cache::{
    floors_for_sector, polygons_for_sector, sector_on_screen, ExtraFloor, SectorFloors,
    SectorInfoCache, EXFL_BOTTOM, EXFL_LOWER, EXFL_THIN, EXFL_TOP, EXFL_TRANSLUC, EXFL_UPPER,
    EXFL_VAVOOM,
};
pub use engine::{SectorPolygon, SectorSubdivision};
