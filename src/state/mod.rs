// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query state in the page address.
//!
//! Three parameters: `q` (free text), `scope`, `sort`. Defaults are left out
//! so a plain search stays a short URL. A query whose encoded form would
//! push past the URL ceiling is parked in a session [`PointerStore`] and `q`
//! carries `~key` instead:
//!
//! ```text
//! ?q=alpha+-beta&scope=all
//! ?q=~q-1c291ca3&sort=relevance        (long query, stored under q-1c291ca3)
//! ?q=~~literal                         (a query that really starts with ~)
//! ```
//!
//! The store keeps a fixed number of entries and evicts the oldest first. A
//! pointer that has been evicted (or came from another session) decodes to
//! an empty query with `pointer_missing` set.

use crate::types::{Scope, SortMode};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use url::form_urlencoded;

/// Prefix marking `q` as a pointer into the store.
pub const POINTER_SIGIL: char = '~';

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub query: String,
    pub scope: Scope,
    pub sort: SortMode,
}

impl QueryState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedState {
    pub state: QueryState,
    /// `q` named a pointer the store no longer holds.
    pub pointer_missing: bool,
}

/// Bounded session storage for overlong queries.
#[derive(Debug)]
pub struct PointerStore {
    entries: LruCache<String, String>,
}

impl PointerStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Store `query` and return its key. Storing the same query again
    /// returns the same key and does not refresh its age.
    pub fn put(&mut self, query: &str) -> String {
        let base = format!("q-{:08x}", crc32fast::hash(query.as_bytes()));
        let mut key = base.clone();
        let mut attempt = 0u32;
        loop {
            match self.entries.peek(&key) {
                Some(stored) if stored == query => return key,
                Some(_) => {
                    attempt += 1;
                    key = format!("{}-{}", base, attempt);
                }
                None => break,
            }
        }
        if let Some((evicted, _)) = self.entries.push(key.clone(), query.to_string()) {
            tracing::debug!(key = %evicted, "evicted query pointer");
        }
        key
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.peek(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn encoded_len(value: &str) -> usize {
    form_urlencoded::byte_serialize(value.as_bytes()).map(str::len).sum()
}

/// Serialize `state` to a query string (without the leading `?`).
pub fn encode(state: &QueryState, store: &mut PointerStore, max_query_len: usize) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if !state.query.is_empty() {
        let literal = if state.query.starts_with(POINTER_SIGIL) {
            format!("{}{}", POINTER_SIGIL, state.query)
        } else {
            state.query.clone()
        };
        let q = if encoded_len(&literal) > max_query_len {
            format!("{}{}", POINTER_SIGIL, store.put(&state.query))
        } else {
            literal
        };
        out.append_pair("q", &q);
    }
    if state.scope != Scope::default() {
        out.append_pair("scope", state.scope.as_str());
    }
    if state.sort != SortMode::default() {
        out.append_pair("sort", state.sort.as_str());
    }
    out.finish()
}

/// Parse a query string (with or without the leading `?`). Unknown
/// parameters and unrecognized values fall back to defaults.
pub fn decode(query_string: &str, store: &PointerStore) -> DecodedState {
    let raw = query_string.strip_prefix('?').unwrap_or(query_string);
    let mut decoded = DecodedState::default();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "q" => {
                let value = value.as_ref();
                match value.strip_prefix(POINTER_SIGIL) {
                    Some(rest) if rest.starts_with(POINTER_SIGIL) => {
                        decoded.state.query = rest.to_string();
                    }
                    Some(pointer) => match store.get(pointer) {
                        Some(query) => {
                            decoded.state.query = query.to_string();
                            decoded.pointer_missing = false;
                        }
                        None => {
                            decoded.state.query.clear();
                            decoded.pointer_missing = true;
                        }
                    },
                    None => decoded.state.query = value.to_string(),
                }
            }
            "scope" => decoded.state.scope = Scope::parse(&value).unwrap_or_default(),
            "sort" => decoded.state.sort = SortMode::parse(&value).unwrap_or_default(),
            _ => {}
        }
    }
    decoded
}
