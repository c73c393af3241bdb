// src/map/vertex.rs

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub raw_x: i32,
    pub raw_y: i32,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Vertex { raw_x: x, raw_y: y }
    }

    pub fn matches(&self, tx: i32, ty: i32) -> bool {
        self.raw_x == tx && self.raw_y == ty
    }
}
