// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Token → ordinal postings.
//!
//! # Invariants
//!
//! 1. **SORTED**: every list is strictly increasing.
//! 2. **DEDUPED**: an ordinal appears at most once per list, however many
//!    times the token occurs in that document.
//! 3. **NON_EMPTY**: a token has a list only if some document contains it.
//!
//! Lists grow in a `HashMap<String, Vec<u32>>` during a build and are sorted
//! and deduplicated once by `freeze`. Appends push ordinals larger than any
//! posted one, so they stay sorted without another pass.

use std::collections::{HashMap, HashSet};

/// Growable postings used while building.
#[derive(Debug, Default)]
pub struct PostingsBuilder {
    lists: HashMap<String, Vec<u32>>,
}

impl PostingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document's tokens. Repeated tokens count once.
    pub fn add_document<'a>(&mut self, ordinal: u32, tokens: impl IntoIterator<Item = &'a str>) {
        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            if token.is_empty() || !seen.insert(token) {
                continue;
            }
            self.lists.entry(token.to_string()).or_default().push(ordinal);
        }
    }

    /// Merge another builder's lists. Ordinals may interleave; `freeze` sorts.
    pub fn merge(&mut self, other: PostingsBuilder) {
        for (token, ordinals) in other.lists {
            self.lists.entry(token).or_default().extend(ordinals);
        }
    }

    pub fn freeze(self) -> Postings {
        let lists = self
            .lists
            .into_iter()
            .map(|(token, mut ordinals)| {
                ordinals.sort_unstable();
                ordinals.dedup();
                (token, ordinals)
            })
            .collect();
        Postings { lists }
    }
}

/// Frozen postings table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postings {
    lists: HashMap<String, Vec<u32>>,
}

impl Postings {
    #[inline]
    pub fn get(&self, token: &str) -> Option<&[u32]> {
        self.lists.get(token).map(Vec::as_slice)
    }

    /// Whether `ordinal` is posted under `token`.
    #[inline]
    pub fn contains(&self, token: &str, ordinal: u32) -> bool {
        self.get(token)
            .is_some_and(|list| list.binary_search(&ordinal).is_ok())
    }

    /// Number of distinct tokens.
    pub fn token_count(&self) -> usize {
        self.lists.len()
    }

    /// Total postings across all lists.
    pub fn posting_count(&self) -> usize {
        self.lists.values().map(|list| list.len()).sum()
    }

    /// Add a document whose ordinal is larger than every posted ordinal.
    pub fn append_document<'a>(&mut self, ordinal: u32, tokens: impl IntoIterator<Item = &'a str>) {
        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            if token.is_empty() || !seen.insert(token) {
                continue;
            }
            let list = self.lists.entry(token.to_string()).or_default();
            debug_assert!(list.last().map_or(true, |&last| last < ordinal));
            list.push(ordinal);
        }
    }

    /// Remove `ordinal` from the lists of `tokens`, dropping emptied lists.
    pub fn remove_document<'a>(&mut self, ordinal: u32, tokens: impl IntoIterator<Item = &'a str>) {
        for token in tokens {
            let Some(list) = self.lists.get_mut(token) else {
                continue;
            };
            if let Ok(pos) = list.binary_search(&ordinal) {
                list.remove(pos);
                if list.is_empty() {
                    self.lists.remove(token);
                }
            }
        }
    }

    /// Insert `ordinal` into the lists of `tokens` at its sorted position.
    pub fn insert_document<'a>(&mut self, ordinal: u32, tokens: impl IntoIterator<Item = &'a str>) {
        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            if token.is_empty() || !seen.insert(token) {
                continue;
            }
            let list = self.lists.entry(token.to_string()).or_default();
            if let Err(pos) = list.binary_search(&ordinal) {
                list.insert(pos, ordinal);
            }
        }
    }

    /// Check the SORTED / DEDUPED / NON_EMPTY invariants.
    pub fn is_well_formed(&self) -> bool {
        self.lists
            .values()
            .all(|list| !list.is_empty() && list.windows(2).all(|w| w[0] < w[1]))
    }
}

/// Split normalized text into tokens.
#[inline]
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| !t.is_empty())
}
