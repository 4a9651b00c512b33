// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Token classification.
//!
//! Order matters and is fixed: regex literal, field filter, bare `*`, quoted
//! phrase, plain term. The first rule that claims a token wins.

use super::lexer::{tokenize, unquote, Literal, RawToken};
use super::range::RangeSpec;
use super::regex_guard::{compile_for_parse, complexity_issue};
use super::{Clause, ClauseKind, ParsedQuery, RegexClause};
use crate::types::{ItemKind, Scope};
use crate::util::normalize::normalize_text;

/// Longest regex pattern (in characters) the parser will compile.
pub const DEFAULT_REGEX_MAX_LEN: usize = 120;

/// Keys `filter` understands.
const OPERATORS: &[&str] = &["type", "author", "replyto", "scope", "score", "date"];

/// Parse with default limits.
pub fn parse(query: &str) -> ParsedQuery {
    parse_with_limits(query, DEFAULT_REGEX_MAX_LEN)
}

/// Parse a query. Never fails: problems become warnings.
pub fn parse_with_limits(query: &str, regex_max_len: usize) -> ParsedQuery {
    let mut parser = Parser {
        regex_max_len,
        clauses: Vec::new(),
        scopes: Vec::new(),
        warnings: Vec::new(),
    };
    for token in tokenize(query) {
        parser.classify(token);
    }
    parser.finish(query)
}

/// Pick the effective scope: an explicit parameter beats `scope:` directives.
pub fn resolve_scope(parsed: &ParsedQuery, external: Option<Scope>) -> (Scope, Option<String>) {
    let directive = parsed.scope_directives.last().copied();
    match (external, directive) {
        (Some(explicit), Some(inline)) if explicit != inline => (
            explicit,
            Some(format!(
                "scope `{}` from the scope selector overrides `scope:{}` in the query",
                explicit.as_str(),
                inline.as_str()
            )),
        ),
        (Some(explicit), _) => (explicit, None),
        (None, Some(inline)) => (inline, None),
        (None, None) => (Scope::default(), None),
    }
}

struct Parser {
    regex_max_len: usize,
    clauses: Vec<Clause>,
    scopes: Vec<Scope>,
    warnings: Vec<String>,
}

impl Parser {
    fn push(&mut self, kind: ClauseKind, negated: bool) {
        self.clauses.push(Clause { kind, negated });
    }

    fn classify(&mut self, token: RawToken) {
        let RawToken { literal, negated } = token;
        match literal {
            Literal::Regex { pattern, flags } => self.regex(pattern, &flags, negated),
            Literal::Quoted(text) => self.phrase(&text, negated),
            Literal::Bare(text) => {
                if let Some(key) = valueless_operator(&text) {
                    self.warnings
                        .push(format!("`{}:` needs a value and was ignored", key));
                    return;
                }
                if let Some((key, value)) = split_field(&text) {
                    if self.filter(&key, value, negated) {
                        return;
                    }
                    self.warnings.push(format!(
                        "unknown operator `{}:`; searching for `{}` as text",
                        key, text
                    ));
                }
                if text == "*" {
                    if negated {
                        self.warnings
                            .push("`-*` excludes everything and was ignored".to_string());
                    } else {
                        self.push(ClauseKind::Wildcard, false);
                    }
                    return;
                }
                self.term(&text, negated);
            }
        }
    }

    fn regex(&mut self, pattern: String, flags: &str, negated: bool) {
        let shown = format!("/{}/{}", pattern, flags);
        if pattern.is_empty() {
            self.warnings.push("empty regex `//` ignored".to_string());
            return;
        }
        if pattern.chars().count() > self.regex_max_len {
            self.warnings.push(format!(
                "regex `{}` is longer than {} characters and was ignored",
                shown, self.regex_max_len
            ));
            return;
        }
        if let Some(issue) = complexity_issue(&pattern) {
            self.warnings.push(format!(
                "regex `{}` uses {} and was ignored",
                shown, issue
            ));
            return;
        }

        let mut canonical_flags: Vec<char> = Vec::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' => {
                    if !canonical_flags.contains(&flag) {
                        canonical_flags.push(flag);
                    }
                }
                other => self
                    .warnings
                    .push(format!("regex flag `{}` has no effect here", other)),
            }
        }
        canonical_flags.sort_unstable();
        let flags: String = canonical_flags.into_iter().collect();

        match compile_for_parse(&pattern, &flags) {
            Ok(compiled) => self.push(
                ClauseKind::Regex(RegexClause {
                    pattern,
                    flags,
                    compiled,
                }),
                negated,
            ),
            Err(err) => self.warnings.push(format!(
                "regex `{}` is invalid and was ignored: {}",
                shown,
                error_summary(&err.to_string())
            )),
        }
    }

    /// Returns false if `key` is not a known operator.
    fn filter(&mut self, key: &str, value: &str, negated: bool) -> bool {
        let raw_value = unquote(value);
        match key {
            "type" => match ItemKind::parse(&normalize_text(raw_value)) {
                Some(kind) => self.push(ClauseKind::Type(kind), negated),
                None => self.warnings.push(format!(
                    "`type:{}` is not a type; use `type:post` or `type:comment`",
                    raw_value
                )),
            },
            "author" | "replyto" => {
                let name = normalize_text(raw_value);
                if name.is_empty() {
                    self.warnings
                        .push(format!("`{}:` needs a name and was ignored", key));
                } else if key == "author" {
                    self.push(ClauseKind::Author(name), negated);
                } else {
                    self.push(ClauseKind::ReplyTo(name), negated);
                }
            }
            "scope" => match Scope::parse(&normalize_text(raw_value)) {
                Some(scope) => {
                    if negated {
                        self.warnings.push(format!(
                            "`-scope:{}` cannot be negated; treated as `scope:{}`",
                            raw_value,
                            scope.as_str()
                        ));
                    }
                    self.scopes.push(scope);
                }
                None => self.warnings.push(format!(
                    "`scope:{}` is not a scope; use `scope:authored` or `scope:all`",
                    raw_value
                )),
            },
            "score" => match RangeSpec::<i64>::parse(raw_value) {
                Ok(range) => self.push(ClauseKind::Score(range), negated),
                Err(err) => self.warnings.push(format!(
                    "`score:{}` ignored ({}); use forms like `score:>5` or `score:5..20`",
                    raw_value, err
                )),
            },
            "date" => match RangeSpec::<chrono::NaiveDate>::parse(raw_value) {
                Ok(range) => self.push(ClauseKind::Date(range), negated),
                Err(err) => self.warnings.push(format!(
                    "`date:{}` ignored ({}); use YYYY-MM-DD, `>`/`<` or `a..b`",
                    raw_value, err
                )),
            },
            _ => return false,
        }
        true
    }

    fn phrase(&mut self, text: &str, negated: bool) {
        let phrase = normalize_text(text);
        if phrase.is_empty() {
            self.warnings.push("empty phrase ignored".to_string());
            return;
        }
        self.push(ClauseKind::Phrase(phrase), negated);
    }

    fn term(&mut self, text: &str, negated: bool) {
        let term = normalize_text(unquote_spans(text).as_str());
        if term.is_empty() {
            return;
        }
        if term.contains(' ') {
            self.push(ClauseKind::Phrase(term), negated);
        } else {
            self.push(ClauseKind::Term(term), negated);
        }
    }

    fn finish(mut self, raw: &str) -> ParsedQuery {
        // Wildcards: keep one, and only when nothing else selects.
        let has_selector = self
            .clauses
            .iter()
            .any(|c| !c.negated && c.kind != ClauseKind::Wildcard);
        let mut seen_wildcard = false;
        self.clauses.retain(|c| {
            if c.kind != ClauseKind::Wildcard {
                return true;
            }
            let keep = !has_selector && !seen_wildcard;
            seen_wildcard = true;
            keep
        });

        let mut valid = true;
        if !self.clauses.is_empty() && self.clauses.iter().all(|c| c.negated) {
            valid = false;
            self.warnings.push(
                "query only excludes things; add a term to search for, or `*` to start from everything"
                    .to_string(),
            );
        }

        let mut parsed = ParsedQuery {
            raw: raw.to_string(),
            canonical: String::new(),
            clauses: self.clauses,
            scope_directives: self.scopes,
            warnings: self.warnings,
            valid,
        };
        let mut canonical = parsed.executable_query();
        for scope in &parsed.scope_directives {
            if !canonical.is_empty() {
                canonical.push(' ');
            }
            canonical.push_str("scope:");
            canonical.push_str(scope.as_str());
        }
        parsed.canonical = canonical;
        parsed
    }
}

/// `key:value` where `key` is alphabetic and `value` is non-empty.
///
/// `12:30` and `http://x` are not fields: the key must be letters only.
fn split_field(text: &str) -> Option<(String, &str)> {
    let (key, value) = text.split_once(':')?;
    if key.is_empty() || value.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((key.to_ascii_lowercase(), value))
}

/// A known operator with nothing after the colon (`author:`).
fn valueless_operator(text: &str) -> Option<String> {
    let key = text.strip_suffix(':')?.to_ascii_lowercase();
    OPERATORS.contains(&key.as_str()).then_some(key)
}

/// Drop quote characters from a bare token (`foo"bar baz"` → `foobar baz`).
fn unquote_spans(text: &str) -> String {
    text.chars().filter(|&c| c != '"').collect()
}

/// The last non-empty line; regex errors put the pattern and a caret first.
fn error_summary(message: &str) -> &str {
    message
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(message)
        .trim()
}
