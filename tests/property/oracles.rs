//! Reference evaluator for differential testing.
//!
//! Slow and obviously correct: every clause is checked against every
//! document by reading its text, with no postings and no budget.

use quarry::{ItemKind, SearchDoc};
use std::collections::HashSet;

/// The subset of query syntax the oracle understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleClause {
    Term(String),
    Phrase(String),
    Type(ItemKind),
    ScoreAbove(i64),
}

impl OracleClause {
    pub fn to_query(&self) -> String {
        match self {
            OracleClause::Term(term) => term.clone(),
            OracleClause::Phrase(phrase) => format!("\"{}\"", phrase),
            OracleClause::Type(kind) => format!("type:{}", kind.as_str()),
            OracleClause::ScoreAbove(min) => format!("score:>{}", min),
        }
    }
}

pub fn oracle_query(positive: &[OracleClause], negative: &[OracleClause]) -> String {
    positive
        .iter()
        .map(OracleClause::to_query)
        .chain(negative.iter().map(|c| format!("-{}", c.to_query())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(doc: &SearchDoc) -> impl Iterator<Item = &str> {
    doc.title
        .split(' ')
        .chain(doc.body.split(' '))
        .filter(|t| !t.is_empty())
}

/// Does `doc` satisfy `clause`, given the token vocabulary of its corpus?
///
/// A term the corpus has as a whole token matches whole tokens only; any
/// other term (or one shorter than two characters) matches as a substring.
pub fn oracle_matches(doc: &SearchDoc, clause: &OracleClause, vocabulary: &HashSet<String>) -> bool {
    match clause {
        OracleClause::Term(term) => {
            if term.chars().count() >= 2 && vocabulary.contains(term) {
                tokens(doc).any(|t| t == term)
            } else {
                doc.title.contains(term.as_str()) || doc.body.contains(term.as_str())
            }
        }
        OracleClause::Phrase(phrase) => doc.content().contains(phrase.as_str()),
        OracleClause::Type(kind) => doc.kind == *kind,
        OracleClause::ScoreAbove(min) => doc.score > *min,
    }
}

/// Ids of documents matching every positive clause and no negative one.
/// Sorted, for set comparison.
pub fn oracle_search(
    docs: &[SearchDoc],
    positive: &[OracleClause],
    negative: &[OracleClause],
) -> Vec<String> {
    if positive.is_empty() {
        return Vec::new();
    }
    let vocabulary: HashSet<String> = docs
        .iter()
        .flat_map(|doc| tokens(doc).map(str::to_string).collect::<Vec<_>>())
        .collect();

    let mut ids: Vec<String> = docs
        .iter()
        .filter(|doc| positive.iter().all(|c| oracle_matches(doc, c, &vocabulary)))
        .filter(|doc| !negative.iter().any(|c| oracle_matches(doc, c, &vocabulary)))
        .map(|doc| doc.id.clone())
        .collect();
    ids.sort();
    ids
}
