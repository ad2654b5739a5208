//! Space-efficient probabilistic data structure for approximate membership queries in a set.

mod bloom_filter;
mod uniqueness;

pub use self::bloom_filter::BloomFilter;
pub use self::uniqueness::{check_uniqueness, Uniqueness};
