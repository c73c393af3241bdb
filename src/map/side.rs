// src/map/side.rs

/// Which side of a linedef, by the fixed screen-space convention:
/// walking from start to end, "right" is on your right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Right,
    Left,
}

impl Side {
    /// The opposite side.
    pub fn flipped(self) -> Side {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
        }
    }
}
