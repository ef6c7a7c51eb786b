//! Banding of signatures into bucket keys.
use std::hash::Hasher;
use std::slice::ChunksExact;

use anyhow::{anyhow, Result};
use xxhash_rust::xxh3::Xxh3;

/// Approximates the bandwidth, i.e., the number of rows in each band, that makes
/// signatures of `n` positions collide around similarity `t`.
///
/// The S-curve threshold of `b` bands of `r` rows is `(1/b)^(1/r)`, so `b = 1/t^r`
/// bands would be needed for each candidate `r`. The `r` in `1..=n` whose implied
/// `b * r` is closest to `n` is returned. Once `t^r` underflows to zero the search
/// stops with the best candidate so far. `n == 0` gives `1`.
///
/// # Examples
///
/// ```
/// use lsh::derive_bandwidth;
///
/// assert_eq!(derive_bandwidth(10, 0.5), 2);
/// assert_eq!(derive_bandwidth(100, 0.7), 7);
/// ```
pub fn derive_bandwidth(n: usize, t: f64) -> usize {
    let mut best = 1;
    let mut min_err = f64::INFINITY;
    for r in 1..=n {
        let b = 1. / t.powf(r as f64);
        if !b.is_finite() {
            // The signature is too long for this threshold.
            return best;
        }
        let err = (n as f64 - b * r as f64).abs();
        if err < min_err {
            best = r;
            min_err = err;
        }
    }
    best
}

/// Locality-sensitive hashing of signatures by banding.
///
/// A signature of `length` positions is split into `length / bandwidth` consecutive
/// bands, and each band is hashed to one bucket key. Two signatures share a bucket
/// with probability `1 - (1 - s^r)^b` where `s` is their similarity, `r` the bandwidth
/// and `b` the number of bands.
#[derive(Clone, Debug)]
pub struct Lsh {
    length: usize,
    requested_threshold: f64,
    bandwidth: usize,
    salt: u64,
}

impl Lsh {
    /// Creates an instance for signatures of `length` positions and a target
    /// similarity `threshold` in `(0, 1)`.
    ///
    /// `salt` separates bucket keys from other hashes of the same values.
    pub fn new(length: usize, threshold: f64, salt: u64) -> Result<Self> {
        if !(threshold > 0. && threshold < 1.) {
            return Err(anyhow!(
                "The threshold must be in the range (0, 1), but got {threshold}."
            ));
        }
        Ok(Self {
            length,
            requested_threshold: threshold,
            bandwidth: derive_bandwidth(length, threshold),
            salt,
        })
    }

    /// Generates the bucket keys of a signature.
    ///
    /// The iterator borrows only the signature, so it can be created again for
    /// the same signature with the same result. An incomplete trailing band is dropped.
    pub fn hash<'a>(&self, sig: &'a [u64]) -> BandIter<'a> {
        BandIter {
            bands: sig.chunks_exact(self.bandwidth),
            salt: self.salt,
        }
    }

    /// Gets the number of rows in each band.
    pub const fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    /// Gets the number of bands in a signature.
    pub const fn num_bands(&self) -> usize {
        self.length / self.bandwidth
    }

    /// Gets the signature length.
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Gets the threshold given at construction.
    pub const fn requested_threshold(&self) -> f64 {
        self.requested_threshold
    }

    /// Gets the similarity threshold actually achieved by the chosen bands,
    /// `(1/b)^(1/r)`.
    ///
    /// This is an approximation of the requested threshold and may differ from it.
    /// With no band at all, it is infinite since no pair can collide.
    pub fn threshold(&self) -> f64 {
        let r = self.bandwidth as f64;
        let b = self.num_bands() as f64;
        (1. / b).powf(1. / r)
    }

    /// Gets the probability that two signatures of similarity `s` share a bucket.
    pub fn collision_probability(&self, s: f64) -> f64 {
        let r = self.bandwidth as i32;
        let b = self.num_bands() as i32;
        1. - (1. - s.powi(r)).powi(b)
    }
}

/// Iterator over the bucket keys of a signature.
pub struct BandIter<'a> {
    bands: ChunksExact<'a, u64>,
    salt: u64,
}

impl<'a> Iterator for BandIter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let band = self.bands.next()?;
        let mut hasher = Xxh3::with_seed(self.salt);
        for &v in band {
            hasher.write_u64(v);
        }
        Some(hasher.finish())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bands.size_hint()
    }
}

impl ExactSizeIterator for BandIter<'_> {}
