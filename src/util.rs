use rand::Rng;
use siphasher::sip::SipHasher;
use std::hash::{BuildHasher, Hasher};
use std::{cmp, fmt};

/// The default hash builder for both sketches.
///
/// Builds SipHash-2-4 hashers keyed with `(k0, k1)`. Two builders with the same keys always
/// hash the same bytes to the same value, which is what makes a sketch's positions
/// deterministic for its whole lifetime.
#[derive(Clone, Copy)]
pub struct SipHasherBuilder {
    k0: u64,
    k1: u64,
    hasher: SipHasher,
}

impl SipHasherBuilder {
    /// Constructs a new `SipHasherBuilder` that uses the thread-local RNG to seed itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_entropy();
    /// ```
    pub fn from_entropy() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_seed(rng.gen(), rng.gen())
    }

    /// Constructs a new `SipHasherBuilder` that is seeded with the given keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_seed(0, 0);
    /// assert_eq!(hash_builder.keys(), (0, 0));
    /// ```
    pub fn from_seed(k0: u64, k1: u64) -> Self {
        SipHasherBuilder {
            k0,
            k1,
            hasher: SipHasher::new_with_keys(k0, k1),
        }
    }

    /// Returns the keys this builder was seeded with.
    pub fn keys(&self) -> (u64, u64) {
        (self.k0, self.k1)
    }
}

impl fmt::Debug for SipHasherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipHasherBuilder")
            .field("k0", &self.k0)
            .field("k1", &self.k1)
            .finish()
    }
}

impl cmp::PartialEq for SipHasherBuilder {
    fn eq(&self, other: &SipHasherBuilder) -> bool {
        self.k0 == other.k0 && self.k1 == other.k1
    }
}

impl BuildHasher for SipHasherBuilder {
    type Hasher = SipHasher;

    #[inline]
    fn build_hasher(&self) -> SipHasher {
        self.hasher
    }
}

/// Hashes the raw bytes of an item. The bytes are fed to the hasher directly, so `"foo"` and
/// `b"foo"` hash identically.
pub fn hash_bytes(hash_builder: &impl BuildHasher, bytes: &[u8]) -> u64 {
    let mut hasher = hash_builder.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// Derives any number of positions from two independently seeded base hashes.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleHasher<B = SipHasherBuilder> {
    hash_builders: [B; 2],
}

impl<B> DoubleHasher<B>
where
    B: BuildHasher,
{
    pub fn with_hashers(hash_builders: [B; 2]) -> Self {
        DoubleHasher { hash_builders }
    }

    /// Returns the positions `(h1 + i * h2) mod modulus` for `i = 0, 1, 2, ...`.
    pub fn positions(&self, bytes: &[u8], modulus: u64) -> PositionIter {
        debug_assert!(modulus > 0);
        PositionIter {
            next: hash_bytes(&self.hash_builders[0], bytes) % modulus,
            step: hash_bytes(&self.hash_builders[1], bytes) % modulus,
            modulus,
        }
    }

    pub fn hashers(&self) -> &[B; 2] {
        &self.hash_builders
    }
}

/// Infinite iterator over double-hashed positions, all in `0..modulus`.
#[derive(Clone, Copy, Debug)]
pub struct PositionIter {
    next: u64,
    step: u64,
    modulus: u64,
}

impl Iterator for PositionIter {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let ret = self.next;
        // Both operands are below `modulus`, widen so the sum cannot wrap.
        self.next = ((u128::from(self.next) + u128::from(self.step)) % u128::from(self.modulus))
            as u64;
        Some(ret)
    }
}
