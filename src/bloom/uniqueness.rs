use crate::bloom::BloomFilter;
use std::fmt;
use std::hash::BuildHasher;

/// The outcome of checking a candidate against a `BloomFilter` of values already in use.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Uniqueness {
    /// The candidate is empty and was not checked.
    NotValid,
    /// The filter reports the candidate as possibly present. This may be a false positive.
    AlreadyUsed,
    /// The candidate was certainly never added to the filter.
    Unique,
}

impl fmt::Display for Uniqueness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Uniqueness::NotValid => "non valid",
            Uniqueness::AlreadyUsed => "already used",
            Uniqueness::Unique => "unique",
        };
        f.write_str(label)
    }
}

impl<B> BloomFilter<B>
where
    B: BuildHasher,
{
    /// Classifies a single candidate against the values already added to the filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::bloom::{BloomFilter, Uniqueness};
    ///
    /// let mut filter = BloomFilter::new(1000, 3).unwrap();
    /// filter.add("password123");
    ///
    /// assert_eq!(filter.classify("password123"), Uniqueness::AlreadyUsed);
    /// assert_eq!(filter.classify(""), Uniqueness::NotValid);
    /// ```
    pub fn classify(&self, candidate: &str) -> Uniqueness {
        if candidate.is_empty() {
            Uniqueness::NotValid
        } else if self.contains(candidate) {
            Uniqueness::AlreadyUsed
        } else {
            Uniqueness::Unique
        }
    }
}

/// Classifies every candidate against `filter`, preserving input order.
///
/// # Examples
///
/// ```
/// use set_sketches::bloom::{check_uniqueness, BloomFilter, Uniqueness};
///
/// let mut filter = BloomFilter::new(1000, 3).unwrap();
/// filter.add("admin123");
///
/// let results = check_uniqueness(&filter, vec!["admin123", ""]);
/// assert_eq!(
///     results,
///     vec![("admin123", Uniqueness::AlreadyUsed), ("", Uniqueness::NotValid)],
/// );
/// ```
pub fn check_uniqueness<'a, B, I>(
    filter: &BloomFilter<B>,
    candidates: I,
) -> Vec<(&'a str, Uniqueness)>
where
    B: BuildHasher,
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (candidate, filter.classify(candidate)))
        .collect()
}
