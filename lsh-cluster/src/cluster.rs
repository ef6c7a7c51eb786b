//! Clustering of near-duplicate sets.
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use lsh::{Lsh, Members, MinHasher, Signature};
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use union_find::UnionFind;

use crate::disjoint_set::DisjointSet;
use crate::errors::{LshClusterError, Result};

/// Default number of hash functions in a signature.
pub const DEFAULT_WIDTH: usize = 10;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Shared flag stopping batch insertions between two sets.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. All clones of this token observe it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Checks if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Clusters sets whose Jaccard similarity is above a threshold, with high probability.
///
/// The algorithm follows Rajaraman and Ullman, "Mining of Massive Datasets":
///
/// 1. Generate the MinHash signature of a set.
/// 2. Use LSH to map similar signatures to the same buckets.
/// 3. Use union-find to merge the labels found in the same bucket.
///
/// Every label is only merged with the first label of each of its buckets, which is
/// enough to connect all labels that ever shared a bucket.
pub struct Cluster<L, D = UnionFind<L>> {
    signer: MinHasher,
    hasher: Lsh,
    buckets: HashMap<u64, Vec<L>>,
    unionfind: D,
    cancel: Option<CancelToken>,
    shows_progress: bool,
}

impl<L> Cluster<L>
where
    L: Hash + Eq + Clone,
{
    /// Creates an instance.
    ///
    /// # Arguments
    ///
    /// * `width` - Number of hash functions in a signature (must be more than 0).
    /// * `threshold` - Target Jaccard similarity in the range `(0, 1)`.
    /// * `seed` - Seed value for the hash functions. If `None`, a random one is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use lsh_cluster::Cluster;
    ///
    /// let mut cluster = Cluster::<String>::new(10, 0.5, Some(42)).unwrap();
    /// cluster.add_set("abcdefg");
    /// cluster.add_set("abcdefghi");
    /// cluster.add_set("1234567890z");
    /// assert_eq!(cluster.sets().len(), 2);
    /// ```
    pub fn new(width: usize, threshold: f64, seed: Option<u64>) -> Result<Self> {
        Self::with_disjoint_set(width, threshold, seed, UnionFind::new())
    }
}

impl<L, D> Cluster<L, D>
where
    L: Hash + Eq + Clone,
    D: DisjointSet<L>,
{
    /// Creates an instance merging labels in the given disjoint-set structure.
    ///
    /// See [`Cluster::new()`] for the arguments.
    pub fn with_disjoint_set(
        width: usize,
        threshold: f64,
        seed: Option<u64>,
        unionfind: D,
    ) -> Result<Self> {
        if width == 0 {
            return Err(LshClusterError::input("Width must not be 0."));
        }
        if !(threshold > 0. && threshold < 1.) {
            return Err(LshClusterError::input(format!(
                "Threshold must be in the range (0, 1), but got {threshold}."
            )));
        }
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        let mut seeder = rand_xoshiro::SplitMix64::seed_from_u64(seed);
        let signer = MinHasher::new(width, seeder.next_u64());
        let hasher = Lsh::new(width, threshold, seeder.next_u64())
            .map_err(|e| LshClusterError::input(e.to_string()))?;
        Self::with_components(signer, hasher, unionfind)
    }

    /// Assembles an instance from prepared parts.
    ///
    /// Unlike [`Cluster::new()`], a signer of zero width is accepted. Its signatures
    /// are empty and yield no bucket key, so no two labels are ever merged.
    pub fn with_components(signer: MinHasher, hasher: Lsh, unionfind: D) -> Result<Self> {
        if signer.dim() != hasher.length() {
            return Err(LshClusterError::input(format!(
                "Signatures have {} positions, but banding expects {}.",
                signer.dim(),
                hasher.length()
            )));
        }
        Ok(Self {
            signer,
            hasher,
            buckets: HashMap::new(),
            unionfind,
            cancel: None,
            shows_progress: false,
        })
    }

    /// Shows the progress via the standard error output?
    pub fn shows_progress(mut self, yes: bool) -> Self {
        self.shows_progress = yes;
        self
    }

    /// Checks a token between sets in batch insertions.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Adds a set labelled by itself.
    ///
    /// An empty set has a degenerate signature and is clustered with every other
    /// empty set.
    pub fn add_set<S>(&mut self, item: S)
    where
        S: Into<L>,
        L: Members,
    {
        let label = item.into();
        let signature = self.signer.sign(&label);
        self.merge(label, &signature);
    }

    /// Adds a set under the given label.
    ///
    /// Adding again under a known label merges the new set into that label's cluster.
    pub fn add_set_with_label<S>(&mut self, item: &S, label: L)
    where
        S: Members + ?Sized,
    {
        let signature = self.signer.sign(item);
        self.merge(label, &signature);
    }

    /// Adds a precomputed signature under the given label.
    ///
    /// The signature must come from a signer equal to [`Self::signer()`].
    pub fn add_signature(&mut self, signature: &Signature, label: L) -> Result<()> {
        if signature.len() != self.width() {
            return Err(LshClusterError::input(format!(
                "The signature must have {} positions, but has {}.",
                self.width(),
                signature.len()
            )));
        }
        self.merge(label, signature);
        Ok(())
    }

    /// Adds pairs of a set and its label, returning the number of added sets.
    ///
    /// If the cancel token is raised, the remaining sets are skipped and
    /// [`LshClusterError::Cancelled`] is returned.
    pub fn add_sets<I, S>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Members,
    {
        let mut num_added = 0;
        for (item, label) in items {
            if self.is_cancelled() {
                return Err(LshClusterError::cancelled(num_added));
            }
            self.add_set_with_label(&item, label);
            num_added += 1;
            if self.shows_progress && num_added % 10000 == 0 {
                eprintln!("[Cluster::add_sets] Processed {num_added} sets...");
            }
        }
        Ok(num_added)
    }

    /// Adds pairs of a set and its label, producing signatures in parallel.
    ///
    /// Merges are applied in the input order, so the result is the same as
    /// [`Self::add_sets()`].
    pub fn add_sets_in_parallel<S>(&mut self, items: Vec<(S, L)>) -> Result<usize>
    where
        S: Members + Send,
        L: Send,
    {
        if self.shows_progress {
            eprintln!(
                "[Cluster::add_sets_in_parallel] Signing {} sets...",
                items.len()
            );
        }
        let signer = &self.signer;
        let cancel = self.cancel.as_ref();
        let signed: Vec<(Option<Signature>, L)> = items
            .into_par_iter()
            .map(|(item, label)| {
                if cancel.map_or(false, CancelToken::is_cancelled) {
                    (None, label)
                } else {
                    (Some(signer.sign(&item)), label)
                }
            })
            .collect();

        let mut num_added = 0;
        for (signature, label) in signed {
            match signature {
                Some(signature) if !self.is_cancelled() => {
                    self.merge(label, &signature);
                    num_added += 1;
                }
                _ => return Err(LshClusterError::cancelled(num_added)),
            }
            if self.shows_progress && num_added % 10000 == 0 {
                eprintln!("[Cluster::add_sets_in_parallel] Merged {num_added} sets...");
            }
        }
        Ok(num_added)
    }

    /// Gets the clusters of labels.
    ///
    /// Order of clusters and of labels within a cluster is unspecified.
    pub fn sets(&mut self) -> Vec<Vec<L>> {
        self.unionfind.equivalence_classes()
    }

    /// Gets the similarity threshold implied by the chosen bands.
    ///
    /// It approximates, and may differ from, the requested threshold.
    pub fn threshold(&self) -> f64 {
        self.hasher.threshold()
    }

    /// Gets the number of rows in each band.
    pub const fn bandwidth(&self) -> usize {
        self.hasher.bandwidth()
    }

    /// Gets the number of bands in a signature.
    pub const fn num_bands(&self) -> usize {
        self.hasher.num_bands()
    }

    /// Gets the number of hash functions in a signature.
    pub fn width(&self) -> usize {
        self.signer.dim()
    }

    /// Gets the signer.
    pub const fn signer(&self) -> &MinHasher {
        &self.signer
    }

    /// Gets the banding scheme.
    pub const fn hasher(&self) -> &Lsh {
        &self.hasher
    }

    /// Gets the number of distinct bucket keys seen so far.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Gets the number of labels.
    pub fn len(&self) -> usize {
        self.unionfind.num_labels()
    }

    /// Checks if no set has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelToken::is_cancelled)
    }

    fn merge(&mut self, label: L, signature: &Signature) {
        self.unionfind.ensure(&label);
        for key in self.hasher.hash(signature.values()) {
            let bucket = self.buckets.entry(key).or_insert_with(Vec::new);
            bucket.push(label.clone());
            // The first label of a bucket is its anchor.
            self.unionfind.union(&label, &bucket[0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_xoshiro::SplitMix64;

    fn random_set(rng: &mut SplitMix64) -> Vec<u32> {
        let n = 5 + (rng.next_u64() % 15) as usize;
        let mut set: Vec<_> = (0..n).map(|_| (rng.next_u64() % 10) as u32).collect();
        set.sort_unstable();
        set.dedup();
        set
    }

    fn sorted(mut sets: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        sets.iter_mut().for_each(|s| s.sort_unstable());
        sets.sort();
        sets
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Cluster::<String>::new(0, 0.5, Some(42)).is_err());
        assert!(Cluster::<String>::new(10, 0., Some(42)).is_err());
        assert!(Cluster::<String>::new(10, 1., Some(42)).is_err());
        assert!(Cluster::<String>::new(10, 1.5, Some(42)).is_err());
        assert!(Cluster::<String>::new(10, f64::NAN, Some(42)).is_err());
        assert!(Cluster::<String>::new(1, 0.5, None).is_ok());
    }

    #[test]
    fn test_parameters() {
        let cluster = Cluster::<String>::new(10, 0.5, Some(42)).unwrap();
        assert_eq!(cluster.width(), 10);
        assert_eq!(cluster.bandwidth(), 2);
        assert_eq!(cluster.num_bands(), 5);
        assert!((cluster.threshold() - 0.2f64.sqrt()).abs() < 1e-12);
        assert!(cluster.is_empty());
    }

    #[test]
    fn test_same_set() {
        let mut cluster = Cluster::<Vec<u32>>::new(10, 0.5, Some(42)).unwrap();
        let s = vec![1, 5, 7, 8];
        cluster.add_set(s.clone());
        cluster.add_set(s);
        assert_eq!(cluster.len(), 1);
        assert_eq!(cluster.sets().len(), 1);
    }

    #[test]
    fn test_same_set_with_labels() {
        let mut cluster = Cluster::new(10, 0.5, Some(42)).unwrap();
        cluster.add_set_with_label("hello", 0);
        cluster.add_set_with_label("olleh", 1);
        assert_eq!(sorted(cluster.sets()), vec![vec![0, 1]]);
    }

    #[test]
    fn test_similar_sets() {
        let mut cluster = Cluster::<String>::new(10, 0.5, Some(42)).unwrap();
        cluster.add_set("abcdefg");
        cluster.add_set("abcdefghi");
        assert_eq!(cluster.sets().len(), 1);
    }

    #[test]
    fn test_dissimilar_sets() {
        let mut cluster = Cluster::<String>::new(10, 0.5, Some(42)).unwrap();
        cluster.add_set("12345abcdef");
        cluster.add_set("1234567890z");
        assert_eq!(cluster.sets().len(), 2);
    }

    #[test]
    fn test_empty_sets_cluster_together() {
        let mut cluster = Cluster::new(10, 0.5, Some(42)).unwrap();
        cluster.add_set_with_label("", 0);
        cluster.add_set_with_label("", 1);
        cluster.add_set_with_label("abc", 2);
        assert_eq!(sorted(cluster.sets()), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_zero_width() {
        let signer = MinHasher::new(0, 1);
        let hasher = Lsh::new(0, 0.5, 2).unwrap();
        let mut cluster = Cluster::with_components(signer, hasher, UnionFind::new()).unwrap();
        assert_eq!(cluster.num_bands(), 0);
        cluster.add_set_with_label("abc", 0);
        cluster.add_set_with_label("abc", 1);
        assert_eq!(cluster.num_buckets(), 0);
        assert_eq!(sorted(cluster.sets()), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_mismatched_components() {
        let signer = MinHasher::new(10, 1);
        let hasher = Lsh::new(12, 0.5, 2).unwrap();
        assert!(Cluster::<usize>::with_components(signer, hasher, UnionFind::new()).is_err());
    }

    #[test]
    fn test_add_signature() {
        let mut cluster = Cluster::new(10, 0.5, Some(42)).unwrap();
        let sig = cluster.signer().sign("abc");
        cluster.add_signature(&sig, 0).unwrap();
        cluster.add_set_with_label("cab", 1);
        assert_eq!(sorted(cluster.sets()), vec![vec![0, 1]]);
        assert!(cluster.add_signature(&Signature::new(vec![1, 2]), 2).is_err());
        assert_eq!(cluster.len(), 2);
    }

    #[test]
    fn test_anchor_union_is_transitive() {
        // The same band values under three labels share one bucket.
        let mut cluster = Cluster::new(10, 0.5, Some(42)).unwrap();
        let sig = cluster.signer().sign("xyz");
        for label in 0..3 {
            cluster.add_signature(&sig, label).unwrap();
        }
        assert_eq!(sorted(cluster.sets()), vec![vec![0, 1, 2]]);
        assert_eq!(cluster.num_buckets(), 5);
    }

    #[test]
    fn test_cluster_threshold() {
        // Expected error for threshold to similarity should be reasonable.
        let n_tests = 50;
        let dim = 15;
        let expected_error = 0.20;
        let mut rng = SplitMix64::seed_from_u64(11);

        let mut tot_err = 0.;
        for _ in 0..n_tests {
            let x = random_set(&mut rng);
            let y = random_set(&mut rng);
            let jsim = lsh::jaccard_similarity(x.iter(), y.iter());

            // Finds the threshold at which they are no longer clustered.
            for threshold in (1..100).step_by(5) {
                let threshold = threshold as f64 / 100.;
                let mut cluster = Cluster::new(dim, threshold, Some(42)).unwrap();
                cluster.add_set_with_label(&x, 0);
                cluster.add_set_with_label(&y, 1);
                if cluster.sets().len() == 2 {
                    tot_err += (jsim - threshold).abs();
                    break;
                }
            }
        }
        let avg_err = tot_err / n_tests as f64;
        assert!(avg_err <= expected_error, "avg error: {avg_err}");
    }

    #[test]
    fn test_stricter_threshold_merges_less() {
        let mut rng = SplitMix64::seed_from_u64(5);
        let pairs: Vec<_> = (0..200)
            .map(|_| (random_set(&mut rng), random_set(&mut rng)))
            .collect();
        let count_merges = |threshold| {
            pairs
                .iter()
                .filter(|(x, y)| {
                    let mut cluster = Cluster::new(20, threshold, Some(42)).unwrap();
                    cluster.add_set_with_label(x, 0);
                    cluster.add_set_with_label(y, 1);
                    cluster.sets().len() == 1
                })
                .count()
        };
        let loose = count_merges(0.3);
        let strict = count_merges(0.8);
        assert!(strict <= loose, "strict={strict}, loose={loose}");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = SplitMix64::seed_from_u64(3);
        let items: Vec<_> = (0..300).map(|i| (random_set(&mut rng), i)).collect();

        let mut sequential = Cluster::new(20, 0.6, Some(42)).unwrap();
        assert_eq!(sequential.add_sets(items.clone()).unwrap(), 300);
        let mut parallel = Cluster::new(20, 0.6, Some(42)).unwrap();
        assert_eq!(parallel.add_sets_in_parallel(items).unwrap(), 300);

        assert_eq!(sorted(sequential.sets()), sorted(parallel.sets()));
    }

    #[test]
    fn test_cancel_before_batch() {
        let token = CancelToken::new();
        token.cancel();
        let mut cluster = Cluster::new(10, 0.5, Some(42))
            .unwrap()
            .cancel_token(token);
        let items = vec![("abc", 0), ("abd", 1)];
        match cluster.add_sets_in_parallel(items) {
            Err(LshClusterError::Cancelled(e)) => assert_eq!(e.num_added(), 0),
            _ => panic!("expected cancellation"),
        }
        assert!(cluster.is_empty());
    }

    #[test]
    fn test_cancel_during_batch() {
        let token = CancelToken::new();
        let mut cluster = Cluster::new(10, 0.5, Some(42))
            .unwrap()
            .cancel_token(token.clone());
        let items = ["ab", "cd", "ef", "gh", "ij"]
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 3 {
                    token.cancel();
                }
                (s, i)
            });
        match cluster.add_sets(items) {
            Err(LshClusterError::Cancelled(e)) => assert_eq!(e.num_added(), 3),
            _ => panic!("expected cancellation"),
        }
        assert_eq!(cluster.len(), 3);
    }

    #[test]
    fn test_custom_disjoint_set() {
        #[derive(Default)]
        struct Recorder {
            labels: Vec<u32>,
            unions: Vec<(u32, u32)>,
        }

        impl DisjointSet<u32> for Recorder {
            fn ensure(&mut self, label: &u32) {
                if !self.labels.contains(label) {
                    self.labels.push(*label);
                }
            }
            fn union(&mut self, a: &u32, b: &u32) {
                self.unions.push((*a, *b));
            }
            fn equivalence_classes(&mut self) -> Vec<Vec<u32>> {
                self.labels.iter().map(|&l| vec![l]).collect()
            }
            fn num_labels(&self) -> usize {
                self.labels.len()
            }
        }

        let mut cluster =
            Cluster::with_disjoint_set(10, 0.5, Some(42), Recorder::default()).unwrap();
        cluster.add_set_with_label("abc", 7);
        cluster.add_set_with_label("abc", 9);
        // One union per band, each with the anchor of the bucket.
        assert_eq!(cluster.unionfind.unions.len(), 10);
        assert!(cluster.unionfind.unions[5..].iter().all(|&u| u == (9, 7)));
        assert_eq!(cluster.len(), 2);
    }
}
