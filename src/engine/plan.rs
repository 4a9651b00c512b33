// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Clause placement and the per-document match predicate.
//!
//! Placement depends on the corpus: a term with a postings list in one corpus
//! is a Stage A clause there and a Stage B substring scan in a corpus that
//! never saw the token.

use crate::index::postings::tokens;
use crate::index::CorpusIndex;
use crate::query::{Clause, ClauseKind};

/// Shortest term the postings tables answer for. Shorter terms scan.
pub const MIN_INDEXED_TERM_CHARS: usize = 2;

#[derive(Debug)]
pub(crate) struct Plan<'a> {
    /// Stage A postings lists to intersect.
    pub lists: Vec<&'a [u32]>,
    /// Stage A clauses checked per candidate.
    pub attributes: Vec<&'a Clause>,
    /// Stage B clauses.
    pub scans: Vec<&'a Clause>,
    pub negations: Vec<&'a Clause>,
    /// A postings-backed clause has no list here, so nothing can match.
    pub unsatisfiable: bool,
}

impl<'a> Plan<'a> {
    pub fn new(clauses: &'a [Clause], index: &'a CorpusIndex) -> Self {
        let mut plan = Plan {
            lists: Vec::new(),
            attributes: Vec::new(),
            scans: Vec::new(),
            negations: Vec::new(),
            unsatisfiable: false,
        };

        for clause in clauses {
            if clause.negated {
                plan.negations.push(clause);
                continue;
            }
            match &clause.kind {
                ClauseKind::Term(term) => match indexed_term(index, term) {
                    Some(list) => plan.lists.push(list),
                    None => plan.scans.push(clause),
                },
                ClauseKind::Author(name) | ClauseKind::ReplyTo(name) => {
                    let postings = if matches!(clause.kind, ClauseKind::Author(_)) {
                        index.author_postings()
                    } else {
                        index.reply_to_postings()
                    };
                    for word in tokens(name) {
                        match postings.get(word) {
                            Some(list) => plan.lists.push(list),
                            None => plan.unsatisfiable = true,
                        }
                    }
                    // Token lists cannot see word order.
                    if name.contains(' ') {
                        plan.attributes.push(clause);
                    }
                }
                ClauseKind::Type(_) | ClauseKind::Score(_) | ClauseKind::Date(_) => {
                    plan.attributes.push(clause)
                }
                ClauseKind::Phrase(_) | ClauseKind::Regex(_) | ClauseKind::Wildcard => {
                    plan.scans.push(clause)
                }
            }
        }

        plan.lists.sort_by_key(|list| list.len());
        plan
    }

    pub fn has_stage_a(&self) -> bool {
        !self.lists.is_empty() || !self.attributes.is_empty()
    }
}

/// The content postings list for a term, if the term is long enough and
/// the corpus has it.
#[inline]
pub(crate) fn indexed_term<'a>(index: &'a CorpusIndex, term: &str) -> Option<&'a [u32]> {
    if term.chars().count() < MIN_INDEXED_TERM_CHARS {
        return None;
    }
    index.content_postings().get(term)
}

/// `needle` occurs in `haystack` on word boundaries.
pub(crate) fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        (start == 0 || bytes[start - 1] == b' ') && (end == bytes.len() || bytes[end] == b' ')
    })
}

fn content_contains(index: &CorpusIndex, ordinal: u32, needle: &str) -> bool {
    let doc = index.doc(ordinal);
    if needle.contains(' ') {
        doc.content().contains(needle)
    } else {
        doc.title.contains(needle) || doc.body.contains(needle)
    }
}

/// Does document `ordinal` satisfy `clause`, ignoring its negation flag?
pub(crate) fn matches(index: &CorpusIndex, ordinal: u32, clause: &Clause) -> bool {
    let doc = index.doc(ordinal);
    match &clause.kind {
        ClauseKind::Term(term) => match indexed_term(index, term) {
            Some(list) => list.binary_search(&ordinal).is_ok(),
            None => content_contains(index, ordinal, term),
        },
        ClauseKind::Phrase(phrase) => content_contains(index, ordinal, phrase),
        ClauseKind::Regex(regex) => regex.compiled.is_match(&doc.content()),
        ClauseKind::Wildcard => true,
        ClauseKind::Type(kind) => doc.kind == *kind,
        ClauseKind::Author(name) => contains_words(&doc.author, name),
        ClauseKind::ReplyTo(name) => contains_words(&doc.reply_to, name),
        ClauseKind::Score(range) => range.contains(doc.score),
        ClauseKind::Date(range) => range.contains(doc.timestamp),
    }
}
