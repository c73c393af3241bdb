// src/document/objid.rs

/// The main kinds of map objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjType {
    Things,
    Linedefs,
    Sidedefs,
    Vertices,
    Sectors,
}

/// Special object number for "none".
pub const NIL_OBJ: i32 = -1;

/// A typed reference to a map object by index.
///
/// A nil `Objid` (num < 0) is the normal way to say "nothing there":
/// void lookups and missed hover queries produce it, and it is never
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Objid {
    pub obj_type: ObjType,
    pub num: i32,
}

impl Objid {
    pub fn new(obj_type: ObjType, num: i32) -> Self {
        Objid { obj_type, num }
    }

    pub fn nil(obj_type: ObjType) -> Self {
        Objid {
            obj_type,
            num: NIL_OBJ,
        }
    }

    pub fn valid(&self) -> bool {
        self.num >= 0
    }

    pub fn is_nil(&self) -> bool {
        self.num < 0
    }

    pub fn clear(&mut self) {
        self.num = NIL_OBJ;
    }
}
