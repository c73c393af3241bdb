// src/map/thing.rs

#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub raw_x: i32,
    pub raw_y: i32,
    pub angle: i32,
    pub thing_type: i32,
    pub options: i32,
}

impl Thing {
    pub fn new(x: i32, y: i32, angle: i32, thing_type: i32, options: i32) -> Self {
        Thing {
            raw_x: x,
            raw_y: y,
            angle,
            thing_type,
            options,
        }
    }

    /// Collision radius for this thing's type, used by hover queries.
    ///
    /// We only need a rough classification here; the real editor looks
    /// this up in the game definition files.
    pub fn radius(&self) -> i32 {
        match self.thing_type {
            // player starts and common monsters
            1..=4 | 3004 | 9 | 3001 | 3002 => 16,
            // large monsters
            3003 | 3005 | 3006 | 16 | 68 => 40,
            // barrels, pickups, decorations
            2035 => 10,
            _ => 20,
        }
    }
}
