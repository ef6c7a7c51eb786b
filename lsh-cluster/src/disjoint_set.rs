//! Interface to the disjoint-set structure that merges labels.
use std::hash::Hash;

use union_find::UnionFind;

/// Partition of labels into equivalence classes.
///
/// [`Cluster`](crate::Cluster) only registers labels, merges pairs of labels and
/// reads the classes back, so any union-find can be plugged in.
pub trait DisjointSet<L> {
    /// Registers a label as a singleton class if it is unseen.
    fn ensure(&mut self, label: &L);

    /// Merges the classes of two labels.
    fn union(&mut self, a: &L, b: &L);

    /// Gets the current classes. Order of classes and of labels within a class
    /// is unspecified.
    fn equivalence_classes(&mut self) -> Vec<Vec<L>>;

    /// Gets the number of registered labels.
    fn num_labels(&self) -> usize;
}

impl<L> DisjointSet<L> for UnionFind<L>
where
    L: Hash + Eq + Clone,
{
    fn ensure(&mut self, label: &L) {
        if !self.contains(label) {
            self.insert(label.clone());
        }
    }

    fn union(&mut self, a: &L, b: &L) {
        UnionFind::union(self, a, b);
    }

    fn equivalence_classes(&mut self) -> Vec<Vec<L>> {
        self.sets()
    }

    fn num_labels(&self) -> usize {
        self.len()
    }
}
