// src/selection/set.rs

use crate::document::ObjType;
use crate::selection::bitvec::{BitOp, BitVec};

/// Small selections are kept in a plain array; past this many objects
/// we convert to a bit vector.
pub const MAX_STORE_SEL: usize = 24;

const INITIAL_BITVEC_SIZE: usize = 1024;

/// Backing storage for a selection set.
///
/// `Small` and `Bits` together form the plain ("dense") mode; `Extended`
/// stores an 8-bit mask per object for sub-part selection (e.g. the
/// upper/lower/rail faces of a linedef, or the floor/ceiling of a
/// sector).
#[derive(Debug, Clone)]
enum Store {
    Small(Vec<usize>),
    Bits { bv: BitVec, count: usize },
    Extended { bytes: Vec<u8>, count: usize },
}

/// A set of object indices of one declared [`ObjType`].
#[derive(Debug, Clone)]
pub struct Selection {
    obj_type: ObjType,

    store: Store,

    // the highest object in the selection, or -1
    maxobj: i64,

    // the very first object selected, or -1.
    // only updated on a set() when the selection is empty.
    first_obj: i64,
}

impl Selection {
    pub fn new(obj_type: ObjType) -> Self {
        Selection {
            obj_type,
            store: Store::Small(Vec::new()),
            maxobj: -1,
            first_obj: -1,
        }
    }

    /// An extended-mode selection with an 8-bit mask per object.
    pub fn new_extended(obj_type: ObjType) -> Self {
        Selection {
            obj_type,
            store: Store::Extended {
                bytes: Vec::new(),
                count: 0,
            },
            maxobj: -1,
            first_obj: -1,
        }
    }

    pub fn obj_type(&self) -> ObjType {
        self.obj_type
    }

    pub fn is_extended(&self) -> bool {
        matches!(self.store, Store::Extended { .. })
    }

    /// This also clears the selection.
    pub fn change_type(&mut self, new_type: ObjType) {
        self.obj_type = new_type;
        self.clear_all();
    }

    pub fn clear_all(&mut self) {
        self.maxobj = -1;
        self.first_obj = -1;

        match &mut self.store {
            Store::Extended { bytes, count } => {
                bytes.clear();
                *count = 0;
            }
            store => *store = Store::Small(Vec::new()),
        }
    }

    pub fn empty(&self) -> bool {
        self.count_obj() == 0
    }

    pub fn notempty(&self) -> bool {
        !self.empty()
    }

    pub fn count_obj(&self) -> usize {
        match &self.store {
            Store::Small(objs) => objs.len(),
            Store::Bits { count, .. } => *count,
            Store::Extended { count, .. } => *count,
        }
    }

    /// The highest selected object, or -1 if none.
    pub fn max_obj(&self) -> i64 {
        self.maxobj
    }

    pub fn get(&self, n: usize) -> bool {
        match &self.store {
            Store::Small(objs) => objs.contains(&n),
            Store::Bits { bv, .. } => bv.get(n),
            Store::Extended { bytes, .. } => bytes.get(n).copied().unwrap_or(0) != 0,
        }
    }

    /// The 8-bit mask for an object.  In plain mode this is 1 or 0.
    pub fn get_ext(&self, n: usize) -> u8 {
        match &self.store {
            Store::Extended { bytes, .. } => bytes.get(n).copied().unwrap_or(0),
            _ => self.get(n) as u8,
        }
    }

    pub fn set(&mut self, n: usize) {
        self.set_ext(n, 1);
    }

    /// Write the mask for an object.  A zero value is equivalent to
    /// [`Selection::clear`].
    pub fn set_ext(&mut self, n: usize, value: u8) {
        if value == 0 {
            self.clear(n);
            return;
        }

        let was_empty = self.empty();
        let was_set = self.get(n);

        if self.maxobj < n as i64 {
            self.maxobj = n as i64;
        }
        if self.first_obj < 0 && was_empty {
            self.first_obj = n as i64;
        }

        // upgrade small storage to a bit vector when it overflows
        if let Store::Small(objs) = &self.store {
            if !was_set && objs.len() >= MAX_STORE_SEL {
                self.convert_to_bitvec();
            }
        }

        match &mut self.store {
            Store::Small(objs) => {
                if !was_set {
                    objs.push(n);
                }
            }
            Store::Bits { bv, count } => {
                if !was_set {
                    bv.set(n);
                    *count += 1;
                }
            }
            Store::Extended { bytes, count } => {
                if n >= bytes.len() {
                    bytes.resize(n + 1, 0);
                }
                if !was_set {
                    *count += 1;
                }
                bytes[n] = value;
            }
        }
    }

    pub fn clear(&mut self, n: usize) {
        let was_set = self.get(n);
        if !was_set {
            return;
        }

        match &mut self.store {
            Store::Small(objs) => {
                if let Some(pos) = objs.iter().position(|&o| o == n) {
                    objs.swap_remove(pos);
                }
            }
            Store::Bits { bv, count } => {
                bv.clear(n);
                *count -= 1;
            }
            Store::Extended { bytes, count } => {
                bytes[n] = 0;
                *count -= 1;
            }
        }

        if self.maxobj == n as i64 {
            self.recompute_maxobj();
        }
        if self.first_obj == n as i64 {
            self.first_obj = -1;
        }
    }

    pub fn toggle(&mut self, n: usize) {
        if self.get(n) {
            self.clear(n);
        } else {
            self.set(n);
        }
    }

    pub fn frob(&mut self, n: usize, op: BitOp) {
        match op {
            BitOp::Add => self.set(n),
            BitOp::Remove => self.clear(n),
            BitOp::Toggle => self.toggle(n),
        }
    }

    pub fn frob_range(&mut self, n1: usize, n2: usize, op: BitOp) {
        for n in n1..=n2 {
            self.frob(n, op);
        }
    }

    /// Set all the objects from the other selection.
    pub fn merge(&mut self, other: &Selection) {
        for n in other.iter() {
            self.set(n);
        }
    }

    /// Clear all the objects from the other selection.
    pub fn unmerge(&mut self, other: &Selection) {
        for n in other.iter() {
            self.clear(n);
        }
    }

    /// Only keep objects that are in both selections.
    pub fn intersect(&mut self, other: &Selection) {
        let mine: Vec<usize> = self.iter().collect();
        for n in mine {
            if !other.get(n) {
                self.clear(n);
            }
        }
    }

    pub fn test_equal(&self, other: &Selection) -> bool {
        if self.obj_type != other.obj_type || self.count_obj() != other.count_obj() {
            return false;
        }
        self.iter().all(|n| other.get(n))
    }

    /// The very first object selected, or -1.
    pub fn find_first(&self) -> i64 {
        if self.first_obj >= 0 {
            debug_assert!(self.get(self.first_obj as usize));
            return self.first_obj;
        }
        self.iter().next().map_or(-1, |n| n as i64)
    }

    /// The second object, skipping over `find_first()`'s answer.
    pub fn find_second(&self) -> i64 {
        let mut it = self.iter();

        let first = match it.next() {
            Some(n) => n,
            None => return -1,
        };

        // when first_obj exists and differs from the lowest-ordered
        // object, that lowest object is the "second" one
        if self.first_obj >= 0 && first as i64 != self.first_obj {
            return first as i64;
        }

        it.next().map_or(-1, |n| n as i64)
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    pub fn iter(&self) -> SelIter<'_> {
        SelIter { sel: self, pos: 0 }
    }

    fn convert_to_bitvec(&mut self) {
        let objs = match &self.store {
            Store::Small(objs) => objs.clone(),
            _ => return,
        };

        let mut size = INITIAL_BITVEC_SIZE;
        if (size as i64) < self.maxobj + 1 {
            size = (self.maxobj + 1) as usize;
        }

        let mut bv = BitVec::new(size);
        for &n in &objs {
            bv.set(n);
        }

        self.store = Store::Bits {
            bv,
            count: objs.len(),
        };
    }

    fn recompute_maxobj(&mut self) {
        self.maxobj = self.iter().map(|n| n as i64).max().unwrap_or(-1);
    }
}

/// Iterates the object numbers in a selection.
///
/// Modifying the selection during a traversal is not allowed.
pub struct SelIter<'a> {
    sel: &'a Selection,
    pos: usize,
}

impl<'a> Iterator for SelIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match &self.sel.store {
            Store::Small(objs) => {
                let item = objs.get(self.pos).copied();
                self.pos += 1;
                item
            }
            Store::Bits { bv, .. } => {
                while self.pos < bv.size() {
                    let n = self.pos;
                    self.pos += 1;
                    if bv.get(n) {
                        return Some(n);
                    }
                }
                None
            }
            Store::Extended { bytes, .. } => {
                while self.pos < bytes.len() {
                    let n = self.pos;
                    self.pos += 1;
                    if bytes[n] != 0 {
                        return Some(n);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_then_bitvec() {
        let mut sel = Selection::new(ObjType::Linedefs);

        for n in 0..MAX_STORE_SEL + 10 {
            sel.set(n * 3);
        }

        assert_eq!(sel.count_obj(), MAX_STORE_SEL + 10);
        assert!(sel.get(0));
        assert!(sel.get((MAX_STORE_SEL + 9) * 3));
        assert!(!sel.get(1));
        assert_eq!(sel.max_obj(), ((MAX_STORE_SEL + 9) * 3) as i64);
    }

    #[test]
    fn test_clear_updates_maxobj() {
        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(5);
        sel.set(9);
        sel.clear(9);
        assert_eq!(sel.max_obj(), 5);
        sel.clear(5);
        assert_eq!(sel.max_obj(), -1);
        assert!(sel.empty());
    }

    #[test]
    fn test_first_and_second() {
        let mut sel = Selection::new(ObjType::Sectors);
        sel.set(7);
        sel.set(2);
        assert_eq!(sel.find_first(), 7);
        assert_eq!(sel.find_second(), 2);
    }

    #[test]
    fn test_extended_mask() {
        let mut sel = Selection::new_extended(ObjType::Linedefs);
        sel.set_ext(4, 0b101);
        assert_eq!(sel.get_ext(4), 0b101);
        assert!(sel.get(4));
        assert_eq!(sel.count_obj(), 1);

        // zero mask clears
        sel.set_ext(4, 0);
        assert!(!sel.get(4));
        assert!(sel.empty());
    }

    #[test]
    fn test_merge_unmerge_intersect() {
        let mut a = Selection::new(ObjType::Things);
        let mut b = Selection::new(ObjType::Things);
        a.set(1);
        a.set(2);
        b.set(2);
        b.set(3);

        let mut m = a.clone();
        m.merge(&b);
        assert_eq!(m.count_obj(), 3);

        m.unmerge(&b);
        assert!(m.get(1));
        assert!(!m.get(2));

        a.intersect(&b);
        assert_eq!(a.to_vec(), vec![2]);
    }

    #[test]
    fn test_frob_range() {
        let mut sel = Selection::new(ObjType::Vertices);
        sel.frob_range(3, 6, BitOp::Add);
        assert_eq!(sel.count_obj(), 4);
        sel.frob_range(4, 5, BitOp::Remove);
        assert_eq!(sel.to_vec().len(), 2);
    }
}
