// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tunables for parsing, execution, mirroring and URL state.
//!
//! Every knob has a default that matches the behavior the archive UI shipped
//! with. A JSON file can override any subset of them:
//!
//! ```json
//! { "budgetMs": 250, "weights": { "term": 12 } }
//! ```

use crate::error::{QuarryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Relevance weights for the fixed ranking heuristic.
///
/// These are preserved defaults, not tuned values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelevanceWeights {
    pub term: u32,
    pub phrase: u32,
    pub author: u32,
    pub reply_to: u32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            term: 10,
            phrase: 15,
            author: 8,
            reply_to: 6,
        }
    }
}

/// Search configuration shared by the foreground and the background worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// Default wall-clock budget for one query.
    pub budget_ms: u64,
    /// Iterations between clock reads inside the engine loops.
    pub budget_check_interval: u32,
    /// Budget for the facet pass.
    pub facet_budget_ms: u64,
    /// Longest regex literal the parser will compile.
    pub regex_max_len: usize,
    /// Stricter length cap applied before running regexes locally.
    pub fallback_regex_max_len: usize,
    /// Compiled program size cap applied before running regexes locally.
    pub fallback_regex_size_limit: usize,
    pub weights: RelevanceWeights,
    /// Items per `index.full.chunk` frame.
    pub chunk_size: usize,
    /// Largest mirror diff sent as `index.patch` instead of a full reload.
    pub patch_max_items: usize,
    /// How long the manager waits for the worker before answering locally.
    pub worker_timeout_ms: u64,
    /// Encoded `q` parameter length above which the query overflows to the pointer store.
    pub url_max_query_len: usize,
    pub pointer_store_capacity: usize,
    /// Number of author options in the author facet.
    pub top_authors: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget_ms: 120,
            budget_check_interval: 256,
            facet_budget_ms: 25,
            regex_max_len: 120,
            fallback_regex_max_len: 60,
            fallback_regex_size_limit: 1 << 16,
            weights: RelevanceWeights::default(),
            chunk_size: 500,
            patch_max_items: 64,
            worker_timeout_ms: 5_000,
            url_max_query_len: 1_500,
            pointer_store_capacity: 20,
            top_authors: 5,
        }
    }
}

impl SearchConfig {
    /// Load a config file, filling unspecified keys with defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the engine loop or divide by zero.
    pub fn validate(&self) -> Result<()> {
        if self.budget_check_interval == 0 {
            return Err(QuarryError::Config(
                "budgetCheckInterval must be at least 1".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(QuarryError::Config("chunkSize must be at least 1".into()));
        }
        if self.pointer_store_capacity == 0 {
            return Err(QuarryError::Config(
                "pointerStoreCapacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
