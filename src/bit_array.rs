//! Fixed-length array of bits.

use std::mem;
use std::ops::Index;

/// A fixed-length array of bits backed by a single boxed slice of `u8` blocks.
///
/// The length is chosen at construction and never changes. A running count of set bits is kept
/// so that occupancy queries are O(1).
#[derive(Clone, Debug, PartialEq)]
pub struct BitArray {
    blocks: Box<[u8]>,
    len: usize,
    one_count: usize,
}

const BLOCK_BIT_COUNT: usize = mem::size_of::<u8>() * 8;

impl BitArray {
    fn get_block_count(len: usize) -> usize {
        (len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT
    }

    /// Constructs a new `BitArray` of `len` bits, all unset.
    pub fn new(len: usize) -> Self {
        BitArray {
            blocks: vec![0; Self::get_block_count(len)].into_boxed_slice(),
            len,
            one_count: 0,
        }
    }

    /// Sets the bit at `index`. Returns `true` if the bit was previously unset.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize) -> bool {
        assert!(index < self.len);
        let block = &mut self.blocks[index / BLOCK_BIT_COUNT];
        let mask = 1 << (index % BLOCK_BIT_COUNT);
        if *block & mask != 0 {
            return false;
        }
        *block |= mask;
        self.one_count += 1;
        true
    }

    /// Returns the bit at `index`, or `None` if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let block = self.blocks[index / BLOCK_BIT_COUNT];
        Some((block >> (index % BLOCK_BIT_COUNT)) & 1 != 0)
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of bytes backing the array.
    pub fn byte_len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.one_count
    }

    /// Returns the number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.one_count
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl Index<usize> for BitArray {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        match self.get(index) {
            Some(true) => &TRUE,
            Some(false) => &FALSE,
            None => panic!("index out of bounds: {} >= {}", index, self.len),
        }
    }
}
