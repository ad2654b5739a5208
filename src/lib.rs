//! # set-sketches
//!
//! `set-sketches` contains two probabilistic data structures for approximate set analytics over
//! large streams of tokens such as passwords or IP addresses. Both use memory fixed at
//! construction, independent of how many items are observed, in exchange for a bounded error:
//!
//!  - [`bloom::BloomFilter`] answers "has this value been seen before?" with no false negatives
//!    and a tunable false positive rate.
//!  - [`hyperloglog::HyperLogLog`] estimates the number of distinct values with a relative error
//!    of about `1.04 / sqrt(2^p)`.
//!
//! Items are anything that can be viewed as bytes (`&str`, `String`, `&[u8]`, `Vec<u8>`).
//! Construction is the only fallible step; invalid parameters are reported as an [`Error`].
//!
//! ## Usage
//!
//! ```rust
//! use set_sketches::bloom::BloomFilter;
//! use set_sketches::hyperloglog::HyperLogLog;
//! use set_sketches::SipHasherBuilder;
//!
//! let mut seen = BloomFilter::from_item_count(1000, 0.01)?;
//! seen.add("password123");
//! assert!(seen.contains("password123"));
//!
//! let mut unique_ips = HyperLogLog::with_hasher(14, SipHasherBuilder::from_seed(0, 0))?;
//! for ip in &["10.0.0.1", "10.0.0.2", "10.0.0.1"] {
//!     unique_ips.add(*ip);
//! }
//! assert_eq!(unique_ips.count(), 2);
//! # Ok::<(), set_sketches::Error>(())
//! ```
//!
//! ## References
//!
//!  - [HyperLogLog: the analysis of a near-optimal cardinality estimation algorithm](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!  > Flajolet, Philippe, Éric Fusy, Olivier Gandouet, and Frédéric Meunier. 2007. “Hyperloglog: The Analysis of a Near-Optimal Cardinality Estimation Algorithm.” In *IN Aofa ’07: PROCEEDINGS of the 2007 International Conference on Analysis of Algorithms*.
//!  - [Less hashing, same performance: Building a better Bloom filter](https://dl.acm.org/citation.cfm?id=1400125)
//!  > Kirsch, Adam, and Michael Mitzenmacher. 2008. “Less Hashing, Same Performance: Building a Better Bloom Filter.” *Random Struct. Algorithms* 33 (2). New York, NY, USA: John Wiley & Sons, Inc.: 187–218. doi:[10.1002/rsa.v33:2](https://doi.org/10.1002/rsa.v33:2).

#![warn(missing_docs)]

mod bit_array;
pub mod bloom;
mod error;
pub mod hyperloglog;
mod util;

pub use crate::error::{Error, Result};
pub use crate::util::SipHasherBuilder;
