// src/config/mod.rs

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User-tunable editing defaults, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Texture given to newly created walls.
    pub default_wall_tex: String,
    pub default_floor_tex: String,
    pub default_ceiling_tex: String,

    pub default_light: i32,

    /// Edge length of sectors created from nothing.
    pub new_sector_size: i32,

    /// When filling an area that contains islands, leave the island
    /// interiors unassigned instead of giving them the new sector.
    pub new_islands_are_void: bool,

    /// Recognize BOOM generalized line types (242/280) when scanning
    /// for fake floors.
    pub boom_gen_types: bool,

    /// Bitmask of 3D-floor conventions to scan for: 1 = EDGE,
    /// 2 = Legacy.
    pub extra_floor_styles: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            default_wall_tex: "STARTAN2".to_string(),
            default_floor_tex: "FLAT1".to_string(),
            default_ceiling_tex: "CEIL1_1".to_string(),
            default_light: 160,
            new_sector_size: 128,
            new_islands_are_void: false,
            boom_gen_types: true,
            extra_floor_styles: 1 | 2,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!("loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        info!("saved editor config to {}", path.display());
        Ok(())
    }
}
