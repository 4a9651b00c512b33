// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Relevance signals and the fixed relevance heuristic.
//!
//! ```text
//! score = term_hits × term + phrase_hits × phrase
//!       + author_hit × author + reply_to_hit × reply_to
//! ```
//!
//! Weights come from [`RelevanceWeights`] and default to 10/15/8/6.

use crate::config::RelevanceWeights;

/// Per-document side channel collected by the engine for relevance ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub term_hits: u32,
    pub phrase_hits: u32,
    /// A query term or phrase names the author, or an `author:` filter matched.
    pub author_hit: bool,
    /// Same, for the reply target.
    pub reply_to_hit: bool,
}

#[inline]
pub fn relevance_score(signals: &Signals, weights: &RelevanceWeights) -> u32 {
    signals
        .term_hits
        .saturating_mul(weights.term)
        .saturating_add(signals.phrase_hits.saturating_mul(weights.phrase))
        .saturating_add(u32::from(signals.author_hit) * weights.author)
        .saturating_add(u32::from(signals.reply_to_hit) * weights.reply_to)
}
