// src/map/sector.rs

/// A sector holds the floor/ceiling surfaces and lighting for an area
/// of the map.
///
/// A sector has no geometry of its own: its shape is implicitly the
/// union of all sidedefs whose `sector` field references it, which is
/// why subdivision works from linedef/sidedef scans rather than from
/// stored outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    /// The floor height (in map units).
    pub floor_height: i32,

    /// The ceiling height (in map units).
    pub ceiling_height: i32,

    /// The name of the floor flat, up to 8 chars.
    pub floor_tex: String,

    /// The name of the ceiling flat, up to 8 chars.
    pub ceiling_tex: String,

    /// Light level (0-255 in classic DOOM).
    pub light: i32,

    /// Special type (a.k.a. "effect" or "sector type").
    pub r#type: i32,

    /// Sector tag, used to link linedefs to sectors.
    pub tag: i32,
}

impl Sector {
    pub fn new(
        floor_height: i32,
        ceiling_height: i32,
        floor_tex: String,
        ceiling_tex: String,
        light: i32,
        r#type: i32,
        tag: i32,
    ) -> Self {
        Sector {
            floor_height,
            ceiling_height,
            floor_tex,
            ceiling_tex,
            light,
            r#type,
            tag,
        }
    }

    /// Returns the difference between ceiling and floor height.
    pub fn headroom(&self) -> i32 {
        self.ceiling_height - self.floor_height
    }

    /// Sets common defaults for a newly created sector.
    pub fn set_defaults(&mut self, floor_tex: &str, ceiling_tex: &str, light: i32) {
        self.floor_height = 0;
        self.ceiling_height = 128;
        self.floor_tex = floor_tex.to_uppercase();
        self.ceiling_tex = ceiling_tex.to_uppercase();
        self.light = light;
        self.r#type = 0;
        self.tag = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headroom() {
        let s = Sector::new(8, 136, "FLOOR4_8".into(), "CEIL3_5".into(), 160, 0, 0);
        assert_eq!(s.headroom(), 128);
    }
}
