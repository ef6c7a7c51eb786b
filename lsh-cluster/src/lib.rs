//! Near-duplicate clustering of sets with MinHash and locality-sensitive hashing.
//!
//! Sets whose Jaccard similarity exceeds a threshold are, with high probability,
//! placed in the same cluster. Items are anything implementing [`lsh::Members`],
//! e.g., strings (as sets of characters), vectors and hash sets.
//!
//! # Examples
//!
//! ```
//! use lsh_cluster::Cluster;
//!
//! let mut cluster = Cluster::new(10, 0.5, Some(42)).unwrap();
//! cluster.add_set_with_label("abcdefg", 0);
//! cluster.add_set_with_label("abcdefghi", 1);
//! cluster.add_set_with_label("1234567890z", 2);
//!
//! let mut sets = cluster.sets();
//! sets.iter_mut().for_each(|s| s.sort_unstable());
//! sets.sort();
//! assert_eq!(sets, vec![vec![0, 1], vec![2]]);
//! ```
#![deny(missing_docs)]

pub mod cluster;
pub mod disjoint_set;
pub mod errors;
pub mod shingling;

pub use cluster::{CancelToken, Cluster, DEFAULT_THRESHOLD, DEFAULT_WIDTH};
pub use disjoint_set::DisjointSet;
pub use errors::{LshClusterError, Result};
