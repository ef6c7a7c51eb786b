//! Collections that can be signed as sets.
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hash};

/// A finite collection of hashable members, viewed as a set.
///
/// Only membership matters: visiting order and repeated members do not change
/// a signature since MinHash takes a minimum. Strings are treated as the set of
/// their characters.
pub trait Members {
    /// Type of one member.
    type Member: Hash + ?Sized;

    /// Calls `f` with every member.
    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&Self::Member);
}

impl Members for str {
    type Member = char;

    fn for_each_member<F>(&self, mut f: F)
    where
        F: FnMut(&char),
    {
        self.chars().for_each(|c| f(&c));
    }
}

impl Members for String {
    type Member = char;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&char),
    {
        self.as_str().for_each_member(f)
    }
}

impl<T: Hash> Members for [T] {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<T: Hash, const N: usize> Members for [T; N] {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<T: Hash> Members for Vec<T> {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<T: Hash> Members for BTreeSet<T> {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<T: Hash, S: BuildHasher> Members for std::collections::HashSet<T, S> {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<T: Hash, S: BuildHasher> Members for hashbrown::HashSet<T, S> {
    type Member = T;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }
}

impl<M: Members + ?Sized> Members for &M {
    type Member = M::Member;

    fn for_each_member<F>(&self, f: F)
    where
        F: FnMut(&Self::Member),
    {
        (**self).for_each_member(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<M: Members<Member = char> + ?Sized>(m: &M) -> Vec<char> {
        let mut out = vec![];
        m.for_each_member(|&c| out.push(c));
        out
    }

    #[test]
    fn test_str_members_are_chars() {
        assert_eq!(collect("aéb"), vec!['a', 'é', 'b']);
        assert_eq!(collect(&"xy".to_string()), vec!['x', 'y']);
        assert_eq!(collect(&&"z"), vec!['z']);
    }

    #[test]
    fn test_empty_str_has_no_members() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn test_sets() {
        let set: BTreeSet<char> = "cab".chars().collect();
        assert_eq!(collect(&set), vec!['a', 'b', 'c']);
        let arr = ['q'; 3];
        assert_eq!(collect(&arr), vec!['q', 'q', 'q']);
    }
}
