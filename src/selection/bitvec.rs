// src/selection/bitvec.rs

/// How a set/clear/toggle request should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Add,
    Remove,
    Toggle,
}

/// A growable bit vector over object indices.
///
/// `set()` grows the vector as needed; `get()`/`clear()` treat bits past
/// the end as zero rather than failing, since callers routinely probe
/// with indices from a larger newer array.
#[derive(Debug, Clone)]
pub struct BitVec {
    num_elem: usize,
    data: Vec<u8>,
}

impl BitVec {
    pub fn new(n_elements: usize) -> Self {
        let total = n_elements / 8 + 1;
        BitVec {
            num_elem: n_elements,
            data: vec![0; total],
        }
    }

    pub fn size(&self) -> usize {
        self.num_elem
    }

    pub fn resize(&mut self, n_elements: usize) {
        assert!(n_elements > 0);

        let old_elem = self.num_elem;
        let new_total = n_elements / 8 + 1;

        // don't bother re-allocating unless shrinking by a large amount
        if self.num_elem / 2 < n_elements && n_elements < self.num_elem {
            self.num_elem = n_elements;
            return;
        }

        self.num_elem = n_elements;
        self.data.resize(new_total, 0);

        // make sure the bits near the old top are clear
        for i in 0..8 {
            if old_elem + i < self.num_elem {
                self.raw_clear(old_elem + i);
            }
        }
    }

    fn raw_get(&self, n: usize) -> bool {
        (self.data[n >> 3] >> (n & 7)) & 1 != 0
    }

    fn raw_set(&mut self, n: usize) {
        self.data[n >> 3] |= 1 << (n & 7);
    }

    fn raw_clear(&mut self, n: usize) {
        self.data[n >> 3] &= !(1 << (n & 7));
    }

    pub fn get(&self, n: usize) -> bool {
        if n >= self.num_elem {
            return false;
        }
        self.raw_get(n)
    }

    pub fn set(&mut self, n: usize) {
        while n >= self.num_elem {
            self.resize(self.num_elem * 3 / 2 + 16);
        }
        self.raw_set(n);
    }

    pub fn clear(&mut self, n: usize) {
        if n >= self.num_elem {
            return;
        }
        self.raw_clear(n);
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

    /// Note: this sets some spare bits above `size()`; the accessors
    /// never look at them.
    pub fn set_all(&mut self) {
        for b in &mut self.data {
            *b = 0xff;
        }
    }

    pub fn clear_all(&mut self) {
        for b in &mut self.data {
            *b = 0;
        }
    }

    pub fn toggle_all(&mut self) {
        for b in &mut self.data {
            *b ^= 0xff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let mut bv = BitVec::new(100);
        assert!(!bv.get(42));
        bv.set(42);
        assert!(bv.get(42));
        bv.clear(42);
        assert!(!bv.get(42));
        bv.toggle(42);
        assert!(bv.get(42));
    }

    #[test]
    fn test_grows_on_set() {
        let mut bv = BitVec::new(8);
        bv.set(1000);
        assert!(bv.get(1000));
        assert!(bv.size() > 1000);
        // out-of-range reads stay false
        assert!(!bv.get(100_000));
    }

    #[test]
    fn test_set_all_respects_size() {
        let mut bv = BitVec::new(10);
        bv.set_all();
        for i in 0..10 {
            assert!(bv.get(i));
        }
        assert!(!bv.get(10_000));
    }

    #[test]
    fn test_toggle_all() {
        let mut bv = BitVec::new(16);
        bv.set(3);
        bv.toggle_all();
        assert!(!bv.get(3));
        assert!(bv.get(4));
    }
}
