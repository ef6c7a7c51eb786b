//! Shingling of texts into token sets.
//!
//! A `k`-shingle is a run of `k` consecutive tokens. Texts shorter than `k` tokens
//! produce one shingle spanning the whole text, so that every text has at least
//! one member.
use std::hash::Hasher;
use std::ops::Range;

use xxhash_rust::xxh3::Xxh3;

use crate::errors::{LshClusterError, Result};

/// Iterator over the character shingles of a text.
pub struct Shingles<'a> {
    text: &'a str,
    bounds: Vec<usize>,
    window_size: usize,
    position: usize,
}

impl<'a> Iterator for Shingles<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.position + self.window_size;
        if end >= self.bounds.len() {
            return None;
        }
        let shingle = &self.text[self.bounds[self.position]..self.bounds[end]];
        self.position += 1;
        Some(shingle)
    }
}

/// Generates the character `k`-shingles of a text.
///
/// The window is clamped to the text length, and an empty text yields a single
/// empty shingle.
///
/// # Panics
///
/// Panics if `k == 0`.
///
/// # Examples
///
/// ```
/// use lsh_cluster::shingling::shingles;
///
/// assert_eq!(shingles("abcd", 3).collect::<Vec<_>>(), vec!["abc", "bcd"]);
/// assert_eq!(shingles("ab", 3).collect::<Vec<_>>(), vec!["ab"]);
/// ```
pub fn shingles(text: &str, k: usize) -> Shingles<'_> {
    assert!(k >= 1, "The shingle size must not be 0.");
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let window_size = k.min(bounds.len() - 1);
    Shingles {
        text,
        bounds,
        window_size,
        position: 0,
    }
}

/// Generates the character `k`-shingles of a text, hashed with `seed`.
///
/// # Panics
///
/// Panics if `k == 0`.
pub fn hashed_shingles(text: &str, k: usize, seed: u64) -> impl Iterator<Item = u64> + '_ {
    shingles(text, k).map(move |s| hash_str(s, seed))
}

fn hash_str(s: &str, seed: u64) -> u64 {
    let mut hasher = Xxh3::with_seed(seed);
    hasher.write(s.as_bytes());
    hasher.finish()
}

/// Configuration of [`Shingler`].
#[derive(Clone, Copy, Debug)]
pub struct ShingleConfig {
    window_size: usize,
    delimiter: Option<char>,
    seed: u64,
}

impl ShingleConfig {
    /// Creates an instance.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Number of tokens in a shingle (must be more than 0).
    /// * `delimiter` - Delimiter for recognizing words as tokens.
    ///                 If `None`, characters are used for tokens.
    /// * `seed` - Seed value for hashing shingles.
    pub fn new(window_size: usize, delimiter: Option<char>, seed: u64) -> Result<Self> {
        if window_size == 0 {
            return Err(LshClusterError::input("Window size must not be 0."));
        }
        Ok(Self {
            window_size,
            delimiter,
            seed,
        })
    }

    /// Gets the number of tokens in a shingle.
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Gets the word delimiter.
    pub const fn delimiter(&self) -> Option<char> {
        self.delimiter
    }
}

/// Extractor of hashed shingles, reusing its buffers across texts.
pub struct Shingler {
    config: ShingleConfig,
    token_ranges: Vec<Range<usize>>,
}

impl Shingler {
    /// Creates an instance.
    pub const fn new(config: ShingleConfig) -> Self {
        Self {
            config,
            token_ranges: vec![],
        }
    }

    /// Extracts the hashed shingles of `text` into `feature`.
    ///
    /// A shingle is hashed as the text it spans, delimiters included, so character
    /// shingles agree with [`hashed_shingles()`].
    pub fn extract<S>(&mut self, text: S, feature: &mut Vec<u64>)
    where
        S: AsRef<str>,
    {
        let text = text.as_ref();
        feature.clear();
        self.tokenize(text);
        if self.token_ranges.is_empty() {
            feature.push(hash_str("", self.config.seed));
            return;
        }
        let window_size = self.config.window_size.min(self.token_ranges.len());
        for window in self.token_ranges.windows(window_size) {
            let span = window[0].start..window[window_size - 1].end;
            feature.push(hash_str(&text[span], self.config.seed));
        }
    }

    /// Gets the configuration.
    pub const fn config(&self) -> ShingleConfig {
        self.config
    }

    fn tokenize(&mut self, text: &str) {
        self.token_ranges.clear();

        let mut offset = 0;
        if let Some(delim) = self.config.delimiter {
            while offset < text.len() {
                let len = text[offset..].find(delim);
                if let Some(len) = len {
                    self.token_ranges.push(offset..offset + len);
                    offset += len + delim.len_utf8();
                } else {
                    self.token_ranges.push(offset..text.len());
                    break;
                }
            }
        } else {
            for c in text.chars() {
                let len = c.len_utf8();
                self.token_ranges.push(offset..offset + len);
                offset += len;
            }
        }
    }
}
