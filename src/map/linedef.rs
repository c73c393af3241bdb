// src/map/linedef.rs

use crate::map::Side;

/// Linedef flag: monsters and players cannot cross this line.
pub const MLF_BLOCKING: i32 = 0x0001;
/// Linedef flag: the line has sidedefs on both sides.
pub const MLF_TWO_SIDED: i32 = 0x0004;

#[derive(Debug, Clone, PartialEq)]
pub struct LineDef {
    pub start: usize,
    pub end: usize,
    pub flags: i32,
    pub line_type: i32,
    pub tag: i32,
    /// Index into the sidedef array, or -1 for none.
    /// A linedef with only a left side is invalid.
    pub right: i32,
    pub left: i32,
}

impl LineDef {
    pub fn new(start: usize, end: usize) -> Self {
        LineDef {
            start,
            end,
            flags: MLF_BLOCKING,
            line_type: 0,
            tag: 0,
            right: -1,
            left: -1,
        }
    }

    /// The sidedef index on the given side, or -1.
    pub fn side_index(&self, side: Side) -> i32 {
        match side {
            Side::Right => self.right,
            Side::Left => self.left,
        }
    }

    pub fn set_side_index(&mut self, side: Side, sd: i32) {
        match side {
            Side::Right => self.right = sd,
            Side::Left => self.left = sd,
        }
    }

    pub fn one_sided(&self) -> bool {
        self.right >= 0 && self.left < 0
    }

    pub fn two_sided(&self) -> bool {
        self.right >= 0 && self.left >= 0
    }

    pub fn uses_vertex(&self, v: usize) -> bool {
        self.start == v || self.end == v
    }
}
