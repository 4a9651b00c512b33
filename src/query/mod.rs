// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The query language: tokens in, typed clauses and warnings out.
//!
//! ```text
//! alpha "exact phrase" -beta /colou?r/i type:comment author:"ada l"
//! replyto:bob score:5..20 date:>2024-12-31 scope:all *
//! ```
//!
//! Parsing is total. Anything the parser cannot use turns into a warning and
//! the clause is omitted; the rest of the query still runs. The only query
//! the parser refuses outright is one made entirely of negations, since
//! "everything except X" has no positive anchor to start from.

mod lexer;
mod parser;
pub mod range;
pub mod regex_guard;

pub use parser::{parse, parse_with_limits, resolve_scope, DEFAULT_REGEX_MAX_LEN};
pub use range::{DateRange, RangeSpec, ScoreRange};

use crate::types::{ItemKind, Scope};
use regex::Regex;
use std::fmt;

/// A compiled regex clause, remembered by its source text.
#[derive(Debug, Clone)]
pub struct RegexClause {
    pub pattern: String,
    /// Canonical flags: subset of `ims`, sorted.
    pub flags: String,
    pub compiled: Regex,
}

impl PartialEq for RegexClause {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl Eq for RegexClause {}

/// What a clause tests.
///
/// Text payloads (`Term`, `Phrase`, `Author`, `ReplyTo`) are normalized at
/// parse time so they compare directly against indexed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseKind {
    Term(String),
    Phrase(String),
    Regex(RegexClause),
    Wildcard,
    Type(ItemKind),
    Author(String),
    ReplyTo(String),
    Score(ScoreRange),
    Date(DateRange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    pub negated: bool,
}

impl Clause {
    pub fn positive(kind: ClauseKind) -> Self {
        Self {
            kind,
            negated: false,
        }
    }

    pub fn negative(kind: ClauseKind) -> Self {
        Self {
            kind,
            negated: true,
        }
    }
}

fn write_name_value(f: &mut fmt::Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    if value.contains(' ') {
        write!(f, "{}:\"{}\"", key, value)
    } else {
        write!(f, "{}:{}", key, value)
    }
}

impl fmt::Display for Clause {
    /// Canonical syntax. Re-parsing it yields an equal clause.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("-")?;
        }
        match &self.kind {
            ClauseKind::Term(term) => f.write_str(term),
            ClauseKind::Phrase(phrase) => write!(f, "\"{}\"", phrase),
            ClauseKind::Regex(regex) => write!(f, "/{}/{}", regex.pattern, regex.flags),
            ClauseKind::Wildcard => f.write_str("*"),
            ClauseKind::Type(kind) => write!(f, "type:{}", kind.as_str()),
            ClauseKind::Author(name) => write_name_value(f, "author", name),
            ClauseKind::ReplyTo(name) => write_name_value(f, "replyto", name),
            ClauseKind::Score(range) => write!(f, "score:{}", range),
            ClauseKind::Date(range) => write!(f, "date:{}", range),
        }
    }
}

/// The parser's output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub raw: String,
    /// Executable clauses followed by scope directives.
    pub canonical: String,
    pub clauses: Vec<Clause>,
    /// `scope:` directives in query order. The last one wins.
    pub scope_directives: Vec<Scope>,
    pub warnings: Vec<String>,
    /// False when the query cannot run (only negations).
    pub valid: bool,
}

impl ParsedQuery {
    /// Clauses only, in canonical syntax, without scope directives.
    pub fn executable_query(&self) -> String {
        self.clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the query has anything to execute.
    pub fn is_executable(&self) -> bool {
        self.valid && self.clauses.iter().any(|c| !c.negated)
    }

    /// True if the query already contains exactly this positive clause.
    pub fn has_positive(&self, kind: &ClauseKind) -> bool {
        self.clauses.iter().any(|c| !c.negated && &c.kind == kind)
    }
}

/// Serialize a parsed query back to query syntax.
pub fn serialize(parsed: &ParsedQuery) -> String {
    parsed.canonical.clone()
}
