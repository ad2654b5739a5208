use crate::bit_array::BitArray;
use crate::error::{Error, Result};
use crate::util::DoubleHasher;
use crate::SipHasherBuilder;
use std::f64::consts::LN_2;
use std::fmt;
use std::hash::BuildHasher;
use tracing::debug;

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// At its core, a bloom filter is a bit array, initially all set to zero. `K` hash functions
/// map each element to `K` bits in the bit array. An element definitely does not exist in the
/// bloom filter if any of the `K` bits are unset. An element is possibly in the set if all of the
/// `K` bits are set. This implementation derives the `K` positions from two base hashes as
/// `(h1 + i * h2) mod m` instead of running `K` separate hash functions.
///
/// Items are anything that can be viewed as bytes, so `"foo"`, `String::from("foo")` and
/// `b"foo"` all address the same bits.
///
/// # Examples
///
/// ```
/// use set_sketches::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::from_item_count(10, 0.01).unwrap();
///
/// assert!(!filter.contains("foo"));
/// filter.add("foo");
/// assert!(filter.contains("foo"));
///
/// assert_eq!(filter.bit_count(), 96);
/// assert_eq!(filter.hasher_count(), 7);
/// assert_eq!(filter.items_added(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter<B = SipHasherBuilder> {
    bit_array: BitArray,
    hasher: DoubleHasher<B>,
    hasher_count: usize,
    items_added: u64,
}

impl BloomFilter {
    /// Constructs a new, empty `BloomFilter` with `bit_count` bits that sets `hasher_count` bits
    /// per item. The two base hashers are seeded from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `bit_count` or `hasher_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(1000, 3).unwrap();
    /// assert_eq!(filter.bit_count(), 1000);
    ///
    /// assert!(BloomFilter::new(0, 3).is_err());
    /// ```
    pub fn new(bit_count: usize, hasher_count: usize) -> Result<Self> {
        Self::with_hashers(
            bit_count,
            hasher_count,
            [
                SipHasherBuilder::from_entropy(),
                SipHasherBuilder::from_entropy(),
            ],
        )
    }

    /// Constructs a new, empty `BloomFilter` sized to hold `item_count` items with a false
    /// positive probability of at most `fpp`. The two base hashers are seeded from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero or `fpp` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::from_item_count(1000, 0.01).unwrap();
    /// assert_eq!(filter.bit_count(), 9586);
    /// assert_eq!(filter.hasher_count(), 7);
    /// ```
    pub fn from_item_count(item_count: usize, fpp: f64) -> Result<Self> {
        Self::from_item_count_with_hashers(
            item_count,
            fpp,
            [
                SipHasherBuilder::from_entropy(),
                SipHasherBuilder::from_entropy(),
            ],
        )
    }

    /// Returns the optimal `(bit_count, hasher_count)` for `item_count` items and a false
    /// positive probability of `fpp`.
    ///
    /// `m = ceil(-n * ln(fpp) / ln(2)^2)` and `k = round(m / n * ln(2))`, with `k` clamped to at
    /// least one.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero or `fpp` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// assert_eq!(BloomFilter::optimal_parameters(100, 0.01), Ok((959, 7)));
    /// assert_eq!(BloomFilter::optimal_parameters(5000, 0.001), Ok((71888, 10)));
    /// ```
    pub fn optimal_parameters(item_count: usize, fpp: f64) -> Result<(usize, usize)> {
        if item_count == 0 {
            return Err(Error::ZeroItemCount);
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(Error::InvalidFalsePositiveRate { fpp });
        }
        let item_count = item_count as f64;
        let bit_count = (-(item_count * fpp.ln()) / (LN_2 * LN_2)).ceil();
        let hasher_count = (bit_count / item_count * LN_2).round().max(1.0);
        Ok((bit_count as usize, hasher_count as usize))
    }
}

impl<B> BloomFilter<B>
where
    B: BuildHasher,
{
    /// Constructs a new, empty `BloomFilter` with `bit_count` bits, `hasher_count` hash
    /// functions, and two hasher builders for double hashing.
    ///
    /// # Errors
    ///
    /// Returns an error if `bit_count` or `hasher_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let filter = BloomFilter::with_hashers(
    ///     1000,
    ///     3,
    ///     [SipHasherBuilder::from_seed(0, 0), SipHasherBuilder::from_seed(1, 1)],
    /// )
    /// .unwrap();
    /// ```
    pub fn with_hashers(
        bit_count: usize,
        hasher_count: usize,
        hash_builders: [B; 2],
    ) -> Result<Self> {
        if bit_count == 0 {
            return Err(Error::ZeroBitCount);
        }
        if hasher_count == 0 {
            return Err(Error::ZeroHasherCount);
        }
        debug!(
            bit_count = bit_count,
            hasher_count = hasher_count,
            "constructed bloom filter"
        );
        Ok(BloomFilter {
            bit_array: BitArray::new(bit_count),
            hasher: DoubleHasher::with_hashers(hash_builders),
            hasher_count,
            items_added: 0,
        })
    }

    /// Constructs a new, empty `BloomFilter` sized for `item_count` items and a false positive
    /// probability of `fpp`, with two hasher builders for double hashing.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero or `fpp` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let mut filter = BloomFilter::from_item_count_with_hashers(
    ///     10,
    ///     0.01,
    ///     [SipHasherBuilder::from_seed(0, 0), SipHasherBuilder::from_seed(1, 1)],
    /// )
    /// .unwrap();
    /// filter.add("foo");
    ///
    /// assert_eq!(filter.count_ones(), 7);
    /// ```
    pub fn from_item_count_with_hashers(
        item_count: usize,
        fpp: f64,
        hash_builders: [B; 2],
    ) -> Result<Self> {
        let (bit_count, hasher_count) = BloomFilter::optimal_parameters(item_count, fpp)?;
        debug!(
            item_count = item_count,
            fpp = fpp,
            "sizing bloom filter for target false positive probability"
        );
        Self::with_hashers(bit_count, hasher_count, hash_builders)
    }

    fn positions(&self, bytes: &[u8]) -> impl Iterator<Item = usize> {
        self.hasher
            .positions(bytes, self.bit_array.len() as u64)
            .take(self.hasher_count)
            .map(|position| position as usize)
    }

    /// Adds an item to the bloom filter. Adding the same item again leaves the bits unchanged
    /// but still counts towards `items_added`.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::new(1000, 3).unwrap();
    ///
    /// filter.add("foo");
    /// filter.add(b"bar");
    /// filter.add("");
    /// assert_eq!(filter.items_added(), 3);
    /// ```
    pub fn add<U>(&mut self, item: &U)
    where
        U: AsRef<[u8]> + ?Sized,
    {
        for position in self.positions(item.as_ref()) {
            self.bit_array.set(position);
        }
        self.items_added += 1;
    }

    /// Checks if an item is possibly in the bloom filter. `false` means the item was never
    /// added; `true` may be a false positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::new(1000, 3).unwrap();
    ///
    /// assert!(!filter.contains("foo"));
    /// filter.add("foo");
    /// assert!(filter.contains("foo"));
    /// assert!(filter.contains(&String::from("foo")));
    /// ```
    pub fn contains<U>(&self, item: &U) -> bool
    where
        U: AsRef<[u8]> + ?Sized,
    {
        self.positions(item.as_ref())
            .all(|position| self.bit_array[position])
    }

    /// Returns the false positive probability implied by the number of `add` calls so far,
    /// `(1 - e^(-k * n / m))^k`.
    ///
    /// `n` counts calls, not distinct items, so adding the same item twice raises the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::from_item_count(100, 0.01).unwrap();
    /// assert!(filter.current_false_positive_rate() < std::f64::EPSILON);
    ///
    /// for i in 0..100 {
    ///     filter.add(&i.to_string());
    /// }
    /// assert!(filter.current_false_positive_rate() < 0.011);
    /// ```
    pub fn current_false_positive_rate(&self) -> f64 {
        let k = self.hasher_count as f64;
        let exponent = -k * self.items_added as f64 / self.bit_array.len() as f64;
        (1.0 - exponent.exp()).powi(self.hasher_count as i32)
    }

    /// Returns the false positive probability implied by the fraction of bits set,
    /// `(X / m)^k`.
    pub fn estimated_fpp(&self) -> f64 {
        let fill = self.bit_array.count_ones() as f64 / self.bit_array.len() as f64;
        fill.powi(self.hasher_count as i32)
    }

    /// Returns the number of distinct items implied by the fraction of bits set,
    /// `-(m / k) * ln(1 - X / m)`. Unlike `items_added`, repeated items do not inflate this.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let mut filter = BloomFilter::from_item_count_with_hashers(
    ///     1000,
    ///     0.01,
    ///     [SipHasherBuilder::from_seed(0, 0), SipHasherBuilder::from_seed(1, 1)],
    /// )
    /// .unwrap();
    /// for _ in 0..10 {
    ///     filter.add("foo");
    /// }
    ///
    /// assert_eq!(filter.items_added(), 10);
    /// assert_eq!(filter.estimated_item_count(), 1);
    /// ```
    pub fn estimated_item_count(&self) -> usize {
        let bit_count = self.bit_array.len();
        match self.bit_array.count_ones() {
            0 => 0,
            ones if ones >= bit_count => bit_count,
            ones => {
                let m = bit_count as f64;
                let k = self.hasher_count as f64;
                (-(m / k) * (1.0 - ones as f64 / m).ln()).floor() as usize
            }
        }
    }

    /// Returns the number of bits in the bloom filter.
    pub fn bit_count(&self) -> usize {
        self.bit_array.len()
    }

    /// Returns the number of bytes used to store the bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(1001, 3).unwrap();
    /// assert_eq!(filter.byte_len(), 126);
    /// ```
    pub fn byte_len(&self) -> usize {
        self.bit_array.byte_len()
    }

    /// Returns the number of hash functions used by the bloom filter.
    pub fn hasher_count(&self) -> usize {
        self.hasher_count
    }

    /// Returns the number of times `add` has been called.
    pub fn items_added(&self) -> u64 {
        self.items_added
    }

    /// Returns the number of set bits in the bloom filter.
    pub fn count_ones(&self) -> usize {
        self.bit_array.count_ones()
    }

    /// Returns the number of unset bits in the bloom filter.
    pub fn count_zeros(&self) -> usize {
        self.bit_array.count_zeros()
    }

    /// Returns a reference to the bloom filter's hasher builders.
    pub fn hashers(&self) -> &[B; 2] {
        self.hasher.hashers()
    }
}

impl<B> fmt::Display for BloomFilter<B>
where
    B: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BloomFilter:")?;
        writeln!(f, "\tbits: {}", self.bit_count())?;
        writeln!(f, "\tnumber hashes: {}", self.hasher_count())?;
        writeln!(f, "\tbloom length (8 bits): {}", self.byte_len())?;
        writeln!(f, "\tnumber bits set: {}", self.count_ones())?;
        writeln!(f, "\titems added: {}", self.items_added())?;
        writeln!(f, "\testimated elements added: {}", self.estimated_item_count())?;
        write!(
            f,
            "\tcurrent false positive rate: {:.6}",
            self.current_false_positive_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BloomFilter;
    use crate::error::Error;
    use crate::util::tests::{hash_builder_1, hash_builder_2};
    use proptest::prelude::*;

    fn seeded(bit_count: usize, hasher_count: usize) -> BloomFilter {
        BloomFilter::with_hashers(
            bit_count,
            hasher_count,
            [hash_builder_1(), hash_builder_2()],
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let mut filter = seeded(1000, 3);

        assert!(!filter.contains("foo"));
        filter.add("foo");
        assert!(filter.contains("foo"));
        assert_eq!(filter.count_ones(), 3);
        assert_eq!(filter.count_zeros(), 997);

        assert_eq!(filter.bit_count(), 1000);
        assert_eq!(filter.byte_len(), 125);
        assert_eq!(filter.hasher_count(), 3);
        assert_eq!(filter.items_added(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            BloomFilter::new(0, 3).unwrap_err(),
            Error::ZeroBitCount
        );
        assert_eq!(
            BloomFilter::new(1000, 0).unwrap_err(),
            Error::ZeroHasherCount
        );
        assert_eq!(
            BloomFilter::from_item_count(0, 0.01).unwrap_err(),
            Error::ZeroItemCount
        );
        for fpp in &[0.0, 1.0, -0.5, 2.0] {
            assert_eq!(
                BloomFilter::from_item_count(100, *fpp).unwrap_err(),
                Error::InvalidFalsePositiveRate { fpp: *fpp }
            );
        }
        assert!(BloomFilter::from_item_count(100, std::f64::NAN).is_err());
    }

    #[test]
    fn test_from_item_count() {
        let mut filter = BloomFilter::from_item_count_with_hashers(
            10,
            0.01,
            [hash_builder_1(), hash_builder_2()],
        )
        .unwrap();

        assert_eq!(filter.bit_count(), 96);
        assert_eq!(filter.hasher_count(), 7);

        filter.add("foo");
        assert!(filter.contains("foo"));
        assert_eq!(filter.count_ones(), 7);
        assert_eq!(filter.count_zeros(), 89);
    }

    #[test]
    fn test_hasher_count_clamped_to_one() {
        // 220 bits for 1000 items rounds m / n * ln(2) down to zero.
        assert_eq!(BloomFilter::optimal_parameters(1000, 0.9), Ok((220, 1)));
    }

    #[test]
    fn test_passwords() {
        let mut filter = seeded(1000, 3);
        for password in &["password123", "admin123", "qwerty123"] {
            filter.add(*password);
        }

        assert!(filter.contains("password123"));
        assert!(filter.contains("admin123"));
        assert!(filter.contains("qwerty123"));
        assert!(!filter.contains("newpassword"));
        assert!(!filter.contains("guest"));
        assert!(!filter.contains(""));
        assert_eq!(filter.count_ones(), 9);
    }

    #[test]
    fn test_empty_item() {
        let mut filter = seeded(1000, 3);
        filter.add("");
        assert!(filter.contains(""));
        assert!(filter.contains(b""));
        assert_eq!(filter.count_ones(), 3);
    }

    #[test]
    fn test_byte_and_str_items_agree() {
        let mut filter = seeded(1000, 3);
        filter.add(b"foo");
        assert!(filter.contains("foo"));
        assert!(filter.contains(&String::from("foo")));
        assert!(filter.contains(&vec![b'f', b'o', b'o']));
    }

    #[test]
    fn test_re_add_is_idempotent() {
        let mut filter = seeded(1000, 3);
        filter.add("foo");
        let snapshot = filter.bit_array.clone();

        filter.add("foo");
        assert_eq!(filter.bit_array, snapshot);
        assert_eq!(filter.items_added(), 2);
    }

    #[test]
    fn test_current_false_positive_rate() {
        let mut filter = seeded(1000, 3);
        assert!(filter.current_false_positive_rate() < std::f64::EPSILON);

        for password in &["password123", "admin123", "qwerty123"] {
            filter.add(*password);
        }

        let expected = (1.0 - (-3.0 * 3.0 / 1000.0f64).exp()).powi(3);
        assert!((filter.current_false_positive_rate() - expected).abs() < std::f64::EPSILON);
    }

    #[test]
    fn test_estimated_fpp() {
        let mut filter = seeded(1000, 3);
        assert!(filter.estimated_fpp() < std::f64::EPSILON);

        filter.add("foo");
        let expected = (3.0 / 1000.0f64).powi(3);
        assert!((filter.estimated_fpp() - expected).abs() < std::f64::EPSILON);
    }

    #[test]
    fn test_false_positive_rate_bound() {
        let fpp = 0.01;
        let mut filter = BloomFilter::from_item_count_with_hashers(
            1000,
            fpp,
            [hash_builder_1(), hash_builder_2()],
        )
        .unwrap();
        for i in 0..1000 {
            filter.add(&format!("inserted-{}", i));
        }

        let false_positives = (0..10_000)
            .filter(|i| filter.contains(&format!("absent-{}", i)))
            .count();
        let observed = false_positives as f64 / 10_000.0;
        assert!(
            (observed - fpp).abs() <= fpp * 0.5,
            "observed false positive rate {} too far from {}",
            observed,
            fpp
        );
    }

    #[test]
    fn test_display() {
        let mut filter = seeded(1000, 3);
        for password in &["password123", "admin123", "qwerty123"] {
            filter.add(*password);
        }

        assert_eq!(
            filter.to_string(),
            "BloomFilter:\n\
             \tbits: 1000\n\
             \tnumber hashes: 3\n\
             \tbloom length (8 bits): 125\n\
             \tnumber bits set: 9\n\
             \titems added: 3\n\
             \testimated elements added: 3\n\
             \tcurrent false positive rate: 0.000001"
        );
    }

    proptest! {
        #[test]
        fn test_no_false_negatives(items in prop::collection::vec(any::<Vec<u8>>(), 1..64)) {
            let mut filter = seeded(512, 4);
            for item in &items {
                filter.add(item);
            }
            for item in &items {
                prop_assert!(filter.contains(item));
            }
        }

        #[test]
        fn test_monotonic_fill(items in prop::collection::vec(any::<String>(), 1..64)) {
            let mut filter = seeded(256, 3);
            let mut prev = 0;
            for item in &items {
                let snapshot = filter.bit_array.clone();
                filter.add(item);
                prop_assert!(filter.count_ones() >= prev);
                prop_assert!((0..snapshot.len()).all(|i| !snapshot[i] || filter.bit_array[i]));
                prev = filter.count_ones();
            }
        }
    }
}
