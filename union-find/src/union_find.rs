//! Union-find keyed by labels.
use std::borrow::Borrow;
use std::hash::Hash;

use hashbrown::HashMap;

/// Disjoint sets of labels.
///
/// Labels are interned to dense indices on first sight; the forest is kept over
/// those indices. Supports near-constant time operations via path compression and
/// union-by-rank.
///
/// # Examples
///
/// ```
/// use union_find::UnionFind;
///
/// let mut uf = UnionFind::new();
/// uf.union(&"a", &"b");
/// uf.insert("c");
/// assert!(uf.connected(&"a", &"b"));
/// assert_eq!(uf.num_sets(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct UnionFind<T> {
    index: HashMap<T, usize>,
    labels: Vec<T>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
}

impl<T> Default for UnionFind<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            labels: vec![],
            parent: vec![],
            rank: vec![],
            size: vec![],
        }
    }
}

impl<T> UnionFind<T>
where
    T: Hash + Eq + Clone,
{
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty structure with room for `capacity` labels.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
            size: Vec::with_capacity(capacity),
        }
    }

    /// Adds a label as a singleton set unless it is already present,
    /// returning its index.
    pub fn insert(&mut self, label: T) -> usize {
        if let Some(&i) = self.index.get(&label) {
            return i;
        }
        let i = self.labels.len();
        self.index.insert(label.clone(), i);
        self.labels.push(label);
        self.parent.push(i);
        self.rank.push(0);
        self.size.push(1);
        i
    }

    /// Gets the index of a label.
    pub fn index_of<Q>(&self, label: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(label).copied()
    }

    /// Checks if a label has been inserted.
    pub fn contains<Q>(&self, label: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(label)
    }

    /// Finds the representative label of the set containing `label`.
    pub fn find<Q>(&mut self, label: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.index_of(label)?;
        let root = self.root(i);
        Some(&self.labels[root])
    }

    /// Merges the sets containing `x` and `y`, inserting unseen labels first.
    ///
    /// Returns `true` if they were in different sets.
    pub fn union(&mut self, x: &T, y: &T) -> bool {
        let x = self.ensure(x);
        let y = self.ensure(y);
        self.union_indices(x, y)
    }

    /// Checks if two labels are in the same set. Unseen labels are in no set.
    pub fn connected<Q>(&mut self, x: &Q, y: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match (self.index_of(x), self.index_of(y)) {
            (Some(x), Some(y)) => self.root(x) == self.root(y),
            _ => false,
        }
    }

    /// Gets all sets. Sets are ordered by their earliest inserted label, and labels
    /// within a set by insertion.
    pub fn sets(&mut self) -> Vec<Vec<T>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut sets: Vec<Vec<T>> = vec![];
        for i in 0..self.labels.len() {
            let root = self.root(i);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                sets.push(Vec::with_capacity(self.size[root]));
                sets.len() - 1
            });
            sets[slot].push(self.labels[i].clone());
        }
        sets
    }

    /// Gets the number of distinct sets.
    pub fn num_sets(&self) -> usize {
        (0..self.parent.len()).filter(|&i| self.parent[i] == i).count()
    }

    /// Gets the size of the set containing `label`.
    pub fn set_size<Q>(&mut self, label: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.index_of(label)?;
        let root = self.root(i);
        Some(self.size[root])
    }

    /// Iterates over the labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &T> {
        self.labels.iter()
    }

    /// Gets the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Checks if no label has been inserted.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn ensure(&mut self, label: &T) -> usize {
        match self.index.get(label) {
            Some(&i) => i,
            None => self.insert(label.clone()),
        }
    }

    fn root(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn union_indices(&mut self, x: usize, y: usize) -> bool {
        let rx = self.root(x);
        let ry = self.root(y);
        if rx == ry {
            return false;
        }
        let (child, parent) = match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => (rx, ry),
            std::cmp::Ordering::Greater => (ry, rx),
            std::cmp::Ordering::Equal => {
                self.rank[rx] += 1;
                (ry, rx)
            }
        };
        self.parent[child] = parent;
        self.size[parent] += self.size[child];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_union_find() {
        let uf = UnionFind::<u32>::new();
        assert!(uf.is_empty());
        assert_eq!(uf.len(), 0);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut uf = UnionFind::new();
        assert_eq!(uf.insert("a"), 0);
        assert_eq!(uf.insert("b"), 1);
        assert_eq!(uf.insert("a"), 0);
        assert_eq!(uf.len(), 2);
        assert!(uf.contains("a"));
        assert!(!uf.contains("c"));
    }

    #[test]
    fn test_find_initial() {
        let mut uf = UnionFind::new();
        for i in 0..5 {
            uf.insert(i);
        }
        for i in 0..5 {
            assert_eq!(uf.find(&i), Some(&i));
        }
        assert_eq!(uf.find(&9), None);
    }

    #[test]
    fn test_union_basic() {
        let mut uf = UnionFind::new();
        assert!(uf.union(&0, &1));
        assert!(uf.connected(&0, &1));
        assert!(!uf.union(&0, &1));
        assert!(!uf.union(&2, &2));
        assert_eq!(uf.len(), 3);
    }

    #[test]
    fn test_union_chain() {
        let mut uf = UnionFind::new();
        for i in 0..5 {
            uf.insert(i);
        }
        uf.union(&0, &1);
        uf.union(&1, &2);

        assert!(uf.connected(&0, &1));
        assert!(uf.connected(&1, &2));
        assert!(uf.connected(&0, &2));

        assert!(!uf.connected(&0, &3));
        assert!(!uf.connected(&0, &4));
        assert!(!uf.connected(&0, &99));
    }

    #[test]
    fn test_num_sets() {
        let mut uf = UnionFind::new();
        for i in 0..5 {
            uf.insert(i);
        }
        assert_eq!(uf.num_sets(), 5);
        uf.union(&0, &1);
        assert_eq!(uf.num_sets(), 4);
        uf.union(&2, &3);
        assert_eq!(uf.num_sets(), 3);
        uf.union(&0, &2);
        assert_eq!(uf.num_sets(), 2);
    }

    #[test]
    fn test_sets() {
        let mut uf = UnionFind::new();
        for label in ["a", "b", "c", "d", "e", "f"] {
            uf.insert(label.to_string());
        }
        uf.union(&"a".to_string(), &"b".to_string());
        uf.union(&"a".to_string(), &"c".to_string());
        uf.union(&"d".to_string(), &"e".to_string());

        let sets = uf.sets();
        assert_eq!(
            sets,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string(), "e".to_string()],
                vec!["f".to_string()],
            ]
        );
        let c = uf.find("c").cloned();
        let a = uf.find("a").cloned();
        assert_eq!(c, a);
    }

    #[test]
    fn test_set_size() {
        let mut uf = UnionFind::new();
        for i in 0..5 {
            uf.insert(i);
        }
        assert_eq!(uf.set_size(&0), Some(1));
        uf.union(&0, &1);
        assert_eq!(uf.set_size(&0), Some(2));
        assert_eq!(uf.set_size(&1), Some(2));
        uf.union(&0, &2);
        assert_eq!(uf.set_size(&2), Some(3));
        assert_eq!(uf.set_size(&7), None);
    }

    #[test]
    fn test_path_compression() {
        let mut uf = UnionFind::new();
        for i in 0..10 {
            uf.insert(i);
        }
        for i in 0..9 {
            uf.union(&i, &(i + 1));
        }
        let root_label = *uf.find(&0).unwrap();
        let root = uf.index_of(&root_label).unwrap();
        for i in 0..10 {
            uf.find(&i);
            assert_eq!(uf.parent[i], root);
        }
    }

    #[test]
    fn test_large_union_find() {
        let n = 10000;
        let mut uf = UnionFind::with_capacity(n);
        for i in 0..n {
            uf.insert(i);
        }
        for i in (0..n).step_by(2) {
            if i + 2 < n {
                uf.union(&i, &(i + 2));
            }
        }
        for i in (1..n).step_by(2) {
            if i + 2 < n {
                uf.union(&i, &(i + 2));
            }
        }
        assert_eq!(uf.num_sets(), 2);
        assert!(uf.connected(&0, &2));
        assert!(uf.connected(&0, &100));
        assert!(uf.connected(&1, &101));
        assert!(!uf.connected(&0, &1));
        assert_eq!(uf.set_size(&0), Some(n / 2));
    }
}
