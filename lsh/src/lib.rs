//! MinHash signatures and locality-sensitive hashing for Jaccard similarity.
//!
//! The pipeline is `item -> Signature -> bucket keys`:
//!
//! * [`HashFamily`] holds `d` salted hash functions,
//! * [`MinHasher`] turns any [`Members`] collection into a [`Signature`] of `d` minima,
//! * [`Lsh`] splits a signature into bands and hashes every band to a bucket key.
#![deny(missing_docs)]

pub mod banding;
pub mod family;
pub mod members;
pub mod minhash;

pub use banding::{derive_bandwidth, Lsh};
pub use family::{HashFamily, HashFunction};
pub use members::Members;
pub use minhash::{MinHasher, Signature};

use std::hash::Hash;

use hashbrown::HashSet;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};

/// Generates a hash value.
#[inline(always)]
pub fn hash_u64(x: u64, seed: u64) -> u64 {
    rand_xoshiro::SplitMix64::seed_from_u64(x ^ seed).next_u64()
}

/// Computes the Jaccard similarity `|X ∩ Y| / |X ∪ Y|`.
///
/// Two empty inputs have no similarity, so `0` is returned for them.
///
/// # Examples
///
/// ```
/// use lsh::jaccard_similarity;
///
/// let x = vec![1, 2, 4];
/// let y = vec![1, 2, 5, 7];
/// assert_eq!(jaccard_similarity(x, y), 0.4);
/// ```
pub fn jaccard_similarity<I, T>(lhs: I, rhs: I) -> f64
where
    I: IntoIterator<Item = T>,
    T: Hash + Eq,
{
    let a = HashSet::<T>::from_iter(lhs);
    let b = HashSet::<T>::from_iter(rhs);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.;
    }
    (a.intersection(&b).count() as f64) / (union as f64)
}

/// Computes the Jaccard distance, i.e., `1 - similarity`.
///
/// # Examples
///
/// ```
/// use lsh::jaccard_distance;
///
/// let x = vec![1, 2, 4];
/// let y = vec![1, 2, 5, 7];
/// assert_eq!(jaccard_distance(x, y), 0.6);
/// ```
pub fn jaccard_distance<I, T>(lhs: I, rhs: I) -> f64
where
    I: IntoIterator<Item = T>,
    T: Hash + Eq,
{
    1. - jaccard_similarity(lhs, rhs)
}
