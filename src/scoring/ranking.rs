// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result ranking: how matches get ordered.
//!
//! Each sort mode contributes one primary key. After it, every mode applies
//! the same tail-break:
//!
//! 1. **Corpus** - authored before context
//! 2. **Timestamp** - newest first
//! 3. **Id** - lexical, so ties never depend on input order
//!
//! Ids are unique within a corpus and the corpus is part of the key, so the
//! order is total and an unstable sort is safe.

use super::core::{relevance_score, Signals};
use crate::config::RelevanceWeights;
use crate::types::{SearchDoc, SortMode};
use std::cmp::Ordering;

/// A matched document and its relevance side channel.
#[derive(Debug, Clone, Copy)]
pub struct RankedHit<'a> {
    pub doc: &'a SearchDoc,
    pub signals: Signals,
}

impl<'a> RankedHit<'a> {
    pub fn new(doc: &'a SearchDoc, signals: Signals) -> Self {
        Self { doc, signals }
    }
}

/// Shared tail-break.
#[inline]
pub fn tail_break(a: &SearchDoc, b: &SearchDoc) -> Ordering {
    a.corpus
        .cmp(&b.corpus)
        .then_with(|| b.timestamp.cmp(&a.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Reply-target names alphabetically; items with no target go last.
fn compare_reply_to(a: &SearchDoc, b: &SearchDoc) -> Ordering {
    a.reply_to
        .is_empty()
        .cmp(&b.reply_to.is_empty())
        .then_with(|| a.reply_to.cmp(&b.reply_to))
}

/// Compare two hits under `mode`.
pub fn compare_hits(
    a: &RankedHit<'_>,
    b: &RankedHit<'_>,
    mode: SortMode,
    weights: &RelevanceWeights,
) -> Ordering {
    let primary = match mode {
        SortMode::DateDesc => b.doc.timestamp.cmp(&a.doc.timestamp),
        SortMode::DateAsc => a.doc.timestamp.cmp(&b.doc.timestamp),
        SortMode::ScoreDesc => b.doc.score.cmp(&a.doc.score),
        SortMode::ScoreAsc => a.doc.score.cmp(&b.doc.score),
        SortMode::ReplyTo => compare_reply_to(a.doc, b.doc),
        SortMode::Relevance => relevance_score(&b.signals, weights)
            .cmp(&relevance_score(&a.signals, weights)),
    };
    primary.then_with(|| tail_break(a.doc, b.doc))
}

/// Sort hits in place.
pub fn rank(hits: &mut [RankedHit<'_>], mode: SortMode, weights: &RelevanceWeights) {
    hits.sort_unstable_by(|a, b| compare_hits(a, b, mode, weights));
}
