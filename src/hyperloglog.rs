//! Space-efficient probabilistic data structure for estimating the number of distinct items in a
//! multiset.

use crate::error::{Error, Result};
use crate::util::hash_bytes;
use crate::SipHasherBuilder;
use std::cmp;
use std::hash::BuildHasher;
use tracing::debug;

/// The smallest supported precision.
pub const MIN_PRECISION: u8 = 4;

/// The largest supported precision.
pub const MAX_PRECISION: u8 = 16;

/// Bias correction constants for small register counts. Larger counts use
/// `0.7213 / (1 + 1.079 / M)`.
const ALPHA_TABLE: [(usize, f64); 3] = [(16, 0.673), (32, 0.697), (64, 0.709)];

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Returns the bias correction constant `alpha_M` for `register_count` registers.
///
/// # Examples
///
/// ```
/// use set_sketches::hyperloglog::alpha;
///
/// assert_eq!(alpha(16), 0.673);
/// assert_eq!(alpha(64), 0.709);
/// assert!((alpha(1024) - 0.7213 / (1.0 + 1.079 / 1024.0)).abs() < std::f64::EPSILON);
/// ```
pub fn alpha(register_count: usize) -> f64 {
    ALPHA_TABLE
        .iter()
        .find(|(len, _)| *len == register_count)
        .map(|(_, alpha)| *alpha)
        .unwrap_or_else(|| 0.7213 / (1.0 + 1.079 / register_count as f64))
}

/// A space-efficient probabilistic data structure to count the number of distinct items in a
/// multiset.
///
/// A `HyperLogLog` uses the observation that the cardinality of a multiset of uniformly
/// distributed items can be estimated by calculating the maximum number of leading zeros in the
/// hash of each item in the multiset. It also buckets each item in a register and takes the
/// harmonic mean of the count in order to reduce the variance. Finally, it uses linear counting
/// for small cardinalities and small correction for large cardinalities.
///
/// Memory is fixed at `2^p` one-byte registers no matter how many items are added.
///
/// # Examples
///
/// ```
/// # use std::f64::EPSILON;
/// use set_sketches::hyperloglog::HyperLogLog;
/// use set_sketches::SipHasherBuilder;
///
/// let mut hhl = HyperLogLog::with_hasher(12, SipHasherBuilder::from_seed(0, 0)).unwrap();
///
/// assert!(hhl.is_empty());
///
/// for key in &["0", "1", "2", "0", "1", "2"] {
///     hhl.add(*key);
/// }
///
/// assert!((hhl.estimate().round() - 3.0).abs() < EPSILON);
/// assert_eq!(hhl.count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HyperLogLog<B = SipHasherBuilder> {
    alpha: f64,
    p: u8,
    registers: Box<[u8]>,
    hash_builder: B,
}

impl HyperLogLog {
    /// Constructs a new, empty `HyperLogLog` with `2^precision` registers and a hasher seeded
    /// from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is not between 4 and 16.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::hyperloglog::HyperLogLog;
    ///
    /// let hhl = HyperLogLog::new(14).unwrap();
    /// assert_eq!(hhl.register_count(), 16384);
    ///
    /// assert!(HyperLogLog::new(3).is_err());
    /// ```
    pub fn new(precision: u8) -> Result<Self> {
        Self::with_hasher(precision, SipHasherBuilder::from_entropy())
    }
}

impl<B> HyperLogLog<B>
where
    B: BuildHasher,
{
    /// Constructs a new, empty `HyperLogLog` with `2^precision` registers and the given hasher
    /// builder.
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is not between 4 and 16.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::hyperloglog::HyperLogLog;
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let hhl = HyperLogLog::with_hasher(8, SipHasherBuilder::from_seed(0, 0)).unwrap();
    /// assert_eq!(hhl.register_count(), 256);
    /// ```
    pub fn with_hasher(precision: u8, hash_builder: B) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::PrecisionOutOfRange { precision });
        }
        let registers_len = 1usize << precision;
        debug!(
            precision = precision,
            registers = registers_len,
            "constructed hyperloglog"
        );
        Ok(HyperLogLog {
            alpha: alpha(registers_len),
            p: precision,
            registers: vec![0; registers_len].into_boxed_slice(),
            hash_builder,
        })
    }

    /// Splits a hash into its register index (the top `p` bits) and the rank of the remaining
    /// `64 - p` bits.
    fn index_and_rank(hash: u64, p: u8) -> (usize, u8) {
        let index = (hash >> (64 - p)) as usize;
        let remaining = hash << p;
        let rank = if remaining == 0 {
            64 - p + 1
        } else {
            remaining.leading_zeros() as u8 + 1
        };
        (index, rank)
    }

    /// Adds an item to the `HyperLogLog`.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl = HyperLogLog::new(4).unwrap();
    ///
    /// hhl.add("10.0.0.1");
    /// hhl.add(b"10.0.0.2");
    /// assert!(!hhl.is_empty());
    /// ```
    pub fn add<U>(&mut self, item: &U)
    where
        U: AsRef<[u8]> + ?Sized,
    {
        let hash = hash_bytes(&self.hash_builder, item.as_ref());
        let (index, rank) = Self::index_and_rank(hash, self.p);
        self.registers[index] = cmp::max(self.registers[index], rank);
    }

    fn raw_estimate(&self) -> f64 {
        let len = self.registers.len() as f64;
        self.alpha * len * len
            / self
                .registers
                .iter()
                .map(|value| 2.0f64.powi(-i32::from(*value)))
                .sum::<f64>()
    }

    /// Returns the estimated number of distinct items in the `HyperLogLog`.
    ///
    /// Small cardinalities fall back to linear counting over the empty registers, and
    /// cardinalities above `2^32 / 30` get the large range correction.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::f64::EPSILON;
    /// use set_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl = HyperLogLog::new(10).unwrap();
    /// assert!((hhl.estimate().round() - 0.0).abs() < EPSILON);
    ///
    /// hhl.add("1");
    /// assert!((hhl.estimate().round() - 1.0).abs() < EPSILON);
    /// ```
    pub fn estimate(&self) -> f64 {
        let len = self.registers.len() as f64;
        match self.raw_estimate() {
            x if x <= 2.5 * len => {
                let zeros = self.registers.iter().filter(|value| **value == 0).count();
                if zeros == 0 {
                    x
                } else {
                    len * (len / zeros as f64).ln()
                }
            }
            x if x <= TWO_POW_32 / 30.0 => x,
            // The correction is undefined once the raw estimate reaches the 32-bit hash space.
            x if x >= TWO_POW_32 => x,
            x => -TWO_POW_32 * (1.0 - x / TWO_POW_32).ln(),
        }
    }

    /// Returns the estimate rounded to the nearest whole number of items.
    pub fn count(&self) -> u64 {
        self.estimate().round() as u64
    }

    /// Returns `true` if no item has been added.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|value| *value == 0)
    }

    /// Returns the precision `p`.
    pub fn precision(&self) -> u8 {
        self.p
    }

    /// Returns the number of registers, `2^p`.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Returns the registers.
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Returns the expected relative error of the estimate, `1.04 / sqrt(2^p)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::hyperloglog::HyperLogLog;
    ///
    /// let hhl = HyperLogLog::new(8).unwrap();
    /// assert!((hhl.relative_error() - 0.065).abs() < 1e-12);
    /// ```
    pub fn relative_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    /// Returns the number of bytes used by the registers.
    pub fn memory_usage(&self) -> usize {
        self.registers.len()
    }

    /// Returns a reference to the hasher builder.
    pub fn hasher(&self) -> &B {
        &self.hash_builder
    }
}
