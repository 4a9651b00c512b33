// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Regex cost controls.
//!
//! Two layers:
//!
//! 1. **Parse time**: a length cap and a structural denylist. Patterns with
//!    nested quantifiers (`(a+)+`), stacked quantifiers (`a**`, `a{2}{3}`) or
//!    long backreferences (`\12`, `\k<name>`) are rejected before compiling.
//! 2. **Local fallback**: the foreground thread is also the UI thread, so it
//!    applies a stricter length cap and a compiled-size limit. Patterns that
//!    fail are not dropped but downgraded to a substring search over the
//!    pattern's literal characters.

use crate::util::normalize::normalize_text;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Compiled program size cap at parse time.
const PARSE_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityIssue {
    NestedQuantifier,
    StackedQuantifier,
    LongBackreference,
}

impl fmt::Display for ComplexityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplexityIssue::NestedQuantifier => "nested quantifiers",
            ComplexityIssue::StackedQuantifier => "stacked quantifiers",
            ComplexityIssue::LongBackreference => "long backreference",
        })
    }
}

/// Length of a `{n}`, `{n,}` or `{n,m}` quantifier starting at `start`, if any.
fn counted_quantifier_len(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let digits_start = i;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if chars.get(i) == Some(&',') {
        i += 1;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
    }
    (chars.get(i) == Some(&'}')).then_some(i + 1 - start)
}

/// Scan a pattern for constructs with super-linear worst cases.
pub fn complexity_issue(pattern: &str) -> Option<ComplexityIssue> {
    let chars: Vec<char> = pattern.chars().collect();
    // One flag per open group: does it contain a quantifier?
    let mut groups: Vec<bool> = vec![false];
    let mut prev_quantifier = false;
    let mut lazy_taken = false;
    let mut closed_quantified_group = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let quantifier_len = match c {
            '*' | '+' | '?' => Some(1),
            '{' => counted_quantifier_len(&chars, i),
            _ => None,
        };

        if let Some(len) = quantifier_len {
            if prev_quantifier {
                if c == '?' && !lazy_taken {
                    lazy_taken = true;
                    i += 1;
                    continue;
                }
                return Some(ComplexityIssue::StackedQuantifier);
            }
            if closed_quantified_group {
                return Some(ComplexityIssue::NestedQuantifier);
            }
            if let Some(top) = groups.last_mut() {
                *top = true;
            }
            prev_quantifier = true;
            lazy_taken = false;
            closed_quantified_group = false;
            i += len;
            continue;
        }

        prev_quantifier = false;
        closed_quantified_group = false;

        match c {
            '\\' => {
                let next = chars.get(i + 1).copied();
                if next == Some('k') && chars.get(i + 2) == Some(&'<') {
                    return Some(ComplexityIssue::LongBackreference);
                }
                if next.is_some_and(|n| ('1'..='9').contains(&n))
                    && chars.get(i + 2).is_some_and(|n| n.is_ascii_digit())
                {
                    return Some(ComplexityIssue::LongBackreference);
                }
                i += 2;
            }
            '[' => {
                // Skip the class; quantifier characters inside are literals.
                i += 1;
                if chars.get(i) == Some(&'^') {
                    i += 1;
                }
                if chars.get(i) == Some(&']') {
                    i += 1;
                }
                while i < chars.len() && chars[i] != ']' {
                    i += if chars[i] == '\\' { 2 } else { 1 };
                }
                i += 1;
            }
            '(' => {
                groups.push(false);
                i += 1;
                if chars.get(i) == Some(&'?') {
                    // Group modifiers: (?:, (?i), (?P<name>, ...
                    while i < chars.len() && !matches!(chars[i], ':' | ')' | '>') {
                        i += 1;
                    }
                    if chars.get(i).is_some_and(|&m| m == ':' || m == '>') {
                        i += 1;
                    }
                }
            }
            ')' => {
                if groups.len() > 1 {
                    let had_quantifier = groups.pop().unwrap_or(false);
                    if had_quantifier {
                        if let Some(parent) = groups.last_mut() {
                            *parent = true;
                        }
                    }
                    closed_quantified_group = had_quantifier;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    None
}

/// Compile with the query-language flag set. Indexed text is lowercase, so
/// matching is always case-insensitive.
pub fn compile(pattern: &str, flags: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .size_limit(size_limit)
        .build()
}

pub(crate) fn compile_for_parse(pattern: &str, flags: &str) -> Result<Regex, regex::Error> {
    compile(pattern, flags, PARSE_SIZE_LIMIT)
}

/// Whether a pattern may run on the foreground thread as-is.
pub fn is_fallback_safe(pattern: &str, flags: &str, max_len: usize, size_limit: usize) -> bool {
    pattern.chars().count() <= max_len && compile(pattern, flags, size_limit).is_ok()
}

/// The literal characters of a pattern, normalized, as substring text.
///
/// Escaped punctuation keeps its character; escape classes (`\d`, `\b`, ...),
/// metacharacters, character classes and group modifiers become separators.
/// Returns `None` when nothing literal is left.
pub fn literal_text(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                match chars.get(i + 1) {
                    Some(n) if n.is_alphanumeric() => out.push(' '),
                    Some(&n) => out.push(n),
                    None => {}
                }
                i += 2;
            }
            '[' => {
                i += 1;
                while i < chars.len() && chars[i] != ']' {
                    i += if chars[i] == '\\' { 2 } else { 1 };
                }
                i += 1;
                out.push(' ');
            }
            '(' if chars.get(i + 1) == Some(&'?') => {
                while i < chars.len() && !matches!(chars[i], ':' | ')' | '>') {
                    i += 1;
                }
                i += 1;
                out.push(' ');
            }
            '{' => {
                let len = counted_quantifier_len(&chars, i).unwrap_or(1);
                i += len;
                out.push(' ');
            }
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '|' | '}' | ']' => {
                out.push(' ');
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    let text = normalize_text(&out);
    (!text.is_empty()).then_some(text)
}
