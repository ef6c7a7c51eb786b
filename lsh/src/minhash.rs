//! MinHash signatures estimating the Jaccard similarity.
use crate::family::HashFamily;
use crate::members::Members;

/// A fixed-length sequence of minima, one per hash function.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    values: Vec<u64>,
}

impl Signature {
    /// The value of a position when the signed item had no member.
    pub const EMPTY_SLOT: u64 = u64::MAX;

    /// Wraps raw signature values.
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Gets the values.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Gets the number of positions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the signature has no position.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks if every position holds [`Self::EMPTY_SLOT`], i.e., the signed item was empty.
    ///
    /// Degenerate signatures are equal to each other, so empty items all land in the
    /// same buckets.
    pub fn is_degenerate(&self) -> bool {
        !self.is_empty() && self.values.iter().all(|&v| v == Self::EMPTY_SLOT)
    }

    /// Estimates the Jaccard similarity as the fraction of agreeing positions.
    ///
    /// Returns `0` if either signature is empty.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn similarity(&self, other: &Self) -> f64 {
        assert_eq!(self.len(), other.len());
        if self.is_empty() {
            return 0.;
        }
        let agree = self
            .values
            .iter()
            .zip(other.values.iter())
            .filter(|(x, y)| x == y)
            .count();
        agree as f64 / self.len() as f64
    }
}

impl AsRef<[u64]> for Signature {
    fn as_ref(&self) -> &[u64] {
        &self.values
    }
}

/// MinHash for Jaccard similarity.
///
/// For two sets `X` and `Y`, the probability that position `i` of their signatures
/// agree is `|X ∩ Y| / |X ∪ Y|`.
///
/// # Reference
///
/// * J. Leskovec, A. Rajaraman, J. D. Ullman. Mining of Massive Datasets, Chapter 3.
#[derive(Clone, Debug)]
pub struct MinHasher {
    family: HashFamily,
}

impl MinHasher {
    /// Creates a hasher producing signatures of `dim` positions.
    pub fn new(dim: usize, seed: u64) -> Self {
        Self::from_family(HashFamily::new(dim, seed))
    }

    /// Creates a hasher from a prepared family.
    pub const fn from_family(family: HashFamily) -> Self {
        Self { family }
    }

    /// Gets the number of positions of produced signatures.
    pub fn dim(&self) -> usize {
        self.family.len()
    }

    /// Gets the underlying family.
    pub const fn family(&self) -> &HashFamily {
        &self.family
    }

    /// Reduces the members of an item to features for [`Self::iter()`].
    pub fn features<S>(&self, item: &S, features: &mut Vec<u64>)
    where
        S: Members + ?Sized,
    {
        features.clear();
        item.for_each_member(|m| features.push(self.family.hash_member(m)));
    }

    /// Produces the signature of an item.
    ///
    /// An empty item yields [`Signature::EMPTY_SLOT`] at every position.
    pub fn sign<S>(&self, item: &S) -> Signature
    where
        S: Members + ?Sized,
    {
        let mut features = vec![];
        self.features(item, &mut features);
        self.sign_features(&features)
    }

    /// Produces the signature of pre-hashed features.
    pub fn sign_features(&self, features: &[u64]) -> Signature {
        Signature::new(self.iter(features).collect())
    }

    /// Lazily iterates over the signature positions of pre-hashed features.
    pub fn iter<'a>(&'a self, features: &'a [u64]) -> MinHashIter<'a> {
        MinHashIter {
            feats: features,
            family: &self.family,
            pos: 0,
        }
    }
}

/// Iterator over the positions of a signature.
pub struct MinHashIter<'a> {
    feats: &'a [u64],
    family: &'a HashFamily,
    pos: usize,
}

impl<'a> Iterator for MinHashIter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == self.family.len() {
            return None;
        }
        let i = self.pos;
        self.pos += 1;
        let h = self
            .feats
            .iter()
            .map(|&f| self.family.hash_feature(i, f))
            .min()
            .unwrap_or(Signature::EMPTY_SLOT);
        Some(h)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.family.len() - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for MinHashIter<'_> {}
