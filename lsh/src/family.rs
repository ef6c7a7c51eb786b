//! A family of salted hash functions.
use std::hash::{Hash, Hasher};

use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use xxhash_rust::xxh3::Xxh3;

/// A fixed collection of `dim` hash functions, each distinguished by its own salt.
///
/// Hashing a value with function `i` is done in two steps: the value is first
/// reduced to a 64-bit feature with a seeded xxh3 hasher that is shared by the
/// whole family, and the feature is then mixed with the salt of `i`.
/// Splitting the steps lets a signature hash every member once and reuse the
/// feature for all functions.
#[derive(Clone, Debug)]
pub struct HashFamily {
    seed: u64,
    member_seed: u64,
    salts: Vec<u64>,
}

impl HashFamily {
    /// Creates a family of `dim` functions whose salts are drawn from `seed`.
    ///
    /// `dim == 0` gives an empty family, whose signatures are empty.
    pub fn new(dim: usize, seed: u64) -> Self {
        let mut seeder = rand_xoshiro::SplitMix64::seed_from_u64(seed);
        let member_seed = seeder.next_u64();
        let salts = (0..dim).map(|_| seeder.next_u64()).collect();
        Self {
            seed,
            member_seed,
            salts,
        }
    }

    /// Reduces a value to the feature that every function of this family consumes.
    #[inline]
    pub fn hash_member<T>(&self, value: &T) -> u64
    where
        T: Hash + ?Sized,
    {
        let mut hasher = Xxh3::with_seed(self.member_seed);
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Hashes a feature produced by [`Self::hash_member()`] with the `i`-th function.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline(always)]
    pub fn hash_feature(&self, i: usize, feature: u64) -> u64 {
        crate::hash_u64(feature, self.salts[i])
    }

    /// Hashes a value with the `i`-th function.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn hash<T>(&self, i: usize, value: &T) -> u64
    where
        T: Hash + ?Sized,
    {
        self.hash_feature(i, self.hash_member(value))
    }

    /// Gets the `i`-th function, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<HashFunction<'_>> {
        self.salts.get(i).map(|&salt| HashFunction { family: self, salt })
    }

    /// Iterates over the functions in index order.
    pub fn iter(&self) -> impl Iterator<Item = HashFunction<'_>> + '_ {
        self.salts
            .iter()
            .map(move |&salt| HashFunction { family: self, salt })
    }

    /// Gets the number of functions.
    pub fn len(&self) -> usize {
        self.salts.len()
    }

    /// Checks if the family has no functions.
    pub fn is_empty(&self) -> bool {
        self.salts.is_empty()
    }

    /// Gets the seed the family was derived from.
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// One member of a [`HashFamily`].
#[derive(Clone, Copy, Debug)]
pub struct HashFunction<'a> {
    family: &'a HashFamily,
    salt: u64,
}

impl HashFunction<'_> {
    /// Hashes a value.
    pub fn hash<T>(&self, value: &T) -> u64
    where
        T: Hash + ?Sized,
    {
        crate::hash_u64(self.family.hash_member(value), self.salt)
    }

    /// Gets the salt distinguishing this function from the others in its family.
    pub const fn salt(&self) -> u64 {
        self.salt
    }
}
