// src/map/sidedef.rs

/// A sidedef carries the three wall texture slots and a sector reference.
///
/// Texture names follow the classic convention: up to 8 characters,
/// uppercase, with `"-"` meaning "no texture here".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideDef {
    /// Horizontal texture offset.
    pub x_offset: i32,

    /// Vertical texture offset.
    pub y_offset: i32,

    /// Upper texture name (shown where the far ceiling is lower).
    pub upper_tex: String,

    /// Lower texture name (shown where the far floor is higher).
    pub lower_tex: String,

    /// Middle (a.k.a. "mid" or "normal") texture name.
    pub mid_tex: String,

    /// Sector index for this sidedef.
    pub sector: i32,
}

impl SideDef {
    pub fn new(
        x_offset: i32,
        y_offset: i32,
        upper_tex: String,
        lower_tex: String,
        mid_tex: String,
        sector: i32,
    ) -> Self {
        SideDef {
            x_offset,
            y_offset,
            upper_tex,
            lower_tex,
            mid_tex,
            sector,
        }
    }

    /// Sets common default fields for a newly created sidedef.
    ///
    /// `default_tex` is the default wall texture for your project,
    /// e.g. `"STARTAN2"`. For two-sided lines the mid texture stays
    /// clear and upper/lower take the default; for one-sided lines
    /// only the mid texture is visible.
    pub fn set_defaults(&mut self, default_tex: &str, is_two_sided: bool) {
        self.x_offset = 0;
        self.y_offset = 0;
        if is_two_sided {
            self.upper_tex = default_tex.to_uppercase();
            self.lower_tex = default_tex.to_uppercase();
            self.mid_tex = "-".to_string();
        } else {
            self.upper_tex = "-".to_string();
            self.lower_tex = "-".to_string();
            self.mid_tex = default_tex.to_uppercase();
        }
        self.sector = 0;
    }
}

/// True when a texture slot actually names a texture (not `"-"` or empty).
pub fn is_real_tex(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_real_tex() {
        assert!(is_real_tex("STARTAN2"));
        assert!(!is_real_tex("-"));
        assert!(!is_real_tex(""));
    }

    #[test]
    fn test_set_defaults_two_sided() {
        let mut sd = SideDef::new(8, 8, String::new(), String::new(), String::new(), 3);
        sd.set_defaults("startan2", true);
        assert_eq!(sd.upper_tex, "STARTAN2");
        assert_eq!(sd.lower_tex, "STARTAN2");
        assert_eq!(sd.mid_tex, "-");
        assert_eq!(sd.x_offset, 0);
    }
}
