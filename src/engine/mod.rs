// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Clause execution against one corpus.
//!
//! ```text
//! Stage A   postings lists ──► merge-intersect, shortest first
//!           type/score/date ──► narrow candidates (or scan the corpus)
//! Stage B   phrase/regex/wildcard/unindexed terms ──► scan candidates
//! Negations ──► filter whatever survived
//! ```
//!
//! # Partial results
//!
//! Every loop ticks the shared [`Budget`]. When it runs out the engine stops
//! expanding but never emits an unverified document: an interrupted
//! intersection keeps only the exact prefix it finished, lists it never
//! reached are checked per candidate, unchecked candidates are dropped, and
//! negations always run. So a partial answer is a subset of the full one.

mod budget;
mod plan;

pub use budget::Budget;
pub use plan::MIN_INDEXED_TERM_CHARS;

use crate::index::CorpusIndex;
use crate::query::{Clause, ClauseKind};
use crate::scoring::core::Signals;
use plan::{contains_words, matches, Plan};
use std::cmp::Ordering;

/// What one corpus produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Matching ordinals, ascending.
    pub ordinals: Vec<u32>,
    /// Aligned with `ordinals` when signals were requested, else empty.
    pub signals: Vec<Signals>,
    /// Candidates left after Stage A (0 when there was no Stage A clause).
    pub stage_a_count: usize,
    /// Documents examined by Stage B.
    pub stage_b_scanned: usize,
    pub partial: bool,
}

/// Sorted merge intersection. Stops early, keeping only what it verified,
/// if the budget runs out.
pub fn intersect(a: &[u32], b: &[u32], budget: &mut Budget) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if !budget.tick() {
            break;
        }
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Run `clauses` against `index`.
///
/// Queries with no positive clause match nothing; callers reject them
/// before getting here.
pub fn execute(
    clauses: &[Clause],
    index: &CorpusIndex,
    budget: &mut Budget,
    want_signals: bool,
) -> Execution {
    let mut out = Execution::default();
    if index.is_empty() || !clauses.iter().any(|c| !c.negated) {
        return out;
    }

    let plan = Plan::new(clauses, index);
    if plan.unsatisfiable {
        return out;
    }

    let mut candidates = stage_a(&plan, index, budget);
    if plan.has_stage_a() {
        out.stage_a_count = candidates.len();
    }

    if !plan.scans.is_empty() {
        let mut survivors = Vec::with_capacity(candidates.len());
        for &ordinal in &candidates {
            if !budget.tick() {
                break;
            }
            out.stage_b_scanned += 1;
            if plan.scans.iter().all(|clause| matches(index, ordinal, clause)) {
                survivors.push(ordinal);
            }
        }
        candidates = survivors;
    }

    // Unbudgeted: skipping a negation would add documents.
    if !plan.negations.is_empty() {
        candidates.retain(|&ordinal| {
            !plan
                .negations
                .iter()
                .any(|clause| matches(index, ordinal, clause))
        });
    }

    if want_signals {
        out.signals = candidates
            .iter()
            .map(|&ordinal| collect_signals(clauses, index, ordinal))
            .collect();
    }

    out.partial = budget.is_exhausted();
    out.ordinals = candidates;

    tracing::debug!(
        corpus = index.corpus().as_str(),
        stage_a = out.stage_a_count,
        stage_b_scanned = out.stage_b_scanned,
        matched = out.ordinals.len(),
        partial = out.partial,
        "executed clauses"
    );
    out
}

fn stage_a(plan: &Plan<'_>, index: &CorpusIndex, budget: &mut Budget) -> Vec<u32> {
    let mut candidates: Vec<u32> = match plan.lists.split_first() {
        Some((shortest, rest)) => {
            let mut current = shortest.to_vec();
            let mut unreached: Vec<&[u32]> = Vec::new();
            for &list in rest {
                if current.is_empty() {
                    return current;
                }
                if budget.is_exhausted() {
                    unreached.push(list);
                } else {
                    current = intersect(&current, list, budget);
                }
            }
            if !unreached.is_empty() {
                current.retain(|ordinal| {
                    unreached
                        .iter()
                        .all(|list| list.binary_search(ordinal).is_ok())
                });
            }
            current
        }
        None if plan.attributes.is_empty() => return (0..index.len() as u32).collect(),
        None => {
            let mut scanned = Vec::new();
            for ordinal in 0..index.len() as u32 {
                if !budget.tick() {
                    break;
                }
                if plan.attributes.iter().all(|clause| matches(index, ordinal, clause)) {
                    scanned.push(ordinal);
                }
            }
            return scanned;
        }
    };

    if !plan.attributes.is_empty() {
        let mut kept = Vec::with_capacity(candidates.len());
        for &ordinal in &candidates {
            if !budget.tick() {
                break;
            }
            if plan.attributes.iter().all(|clause| matches(index, ordinal, clause)) {
                kept.push(ordinal);
            }
        }
        candidates = kept;
    }
    candidates
}

fn collect_signals(clauses: &[Clause], index: &CorpusIndex, ordinal: u32) -> Signals {
    let doc = index.doc(ordinal);
    let mut signals = Signals::default();
    for clause in clauses.iter().filter(|c| !c.negated) {
        match &clause.kind {
            ClauseKind::Term(term) => {
                signals.term_hits += u32::from(matches(index, ordinal, clause));
                signals.author_hit |= index.author_postings().contains(term, ordinal);
                signals.reply_to_hit |= index.reply_to_postings().contains(term, ordinal);
            }
            ClauseKind::Phrase(phrase) => {
                signals.phrase_hits += u32::from(matches(index, ordinal, clause));
                signals.author_hit |= contains_words(&doc.author, phrase);
                signals.reply_to_hit |= contains_words(&doc.reply_to, phrase);
            }
            ClauseKind::Author(_) => signals.author_hit = true,
            ClauseKind::ReplyTo(_) => signals.reply_to_hit = true,
            _ => {}
        }
    }
    signals
}
