//! Disjoint sets (union-find) over arbitrary hashable labels, with union by rank
//! and path compression.
#![deny(missing_docs)]

pub mod union_find;

pub use union_find::UnionFind;
