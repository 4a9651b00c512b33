// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Whitespace tokenizer with atomic quoted spans and regex literals.
//!
//! A quoted span is atomic wherever it appears in a token, so
//! `author:"jane doe"` stays one token. A token that starts with `/` is a
//! regex literal only if an unescaped closing `/` follows, and the closing
//! slash is followed by flag letters and then whitespace or end of input.
//! Otherwise it is an ordinary bare token (`/usr/bin` is a term).

/// Flag letters recognized after a regex literal's closing slash.
pub(crate) const REGEX_FLAG_CHARS: &str = "gimsuy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Literal {
    /// Unquoted text, possibly containing quoted spans (`author:"a b"`).
    Bare(String),
    /// A token that is entirely one quoted span. Quotes stripped.
    Quoted(String),
    Regex { pattern: String, flags: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub literal: Literal,
    pub negated: bool,
}

pub(crate) fn tokenize(input: &str) -> Vec<RawToken> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let mut negated = false;
        if chars[i] == '-' && chars.get(i + 1).is_some_and(|c| !c.is_whitespace()) {
            negated = true;
            i += 1;
        }

        if chars[i] == '/' {
            if let Some((pattern, flags, end)) = scan_regex(&chars, i) {
                tokens.push(RawToken {
                    literal: Literal::Regex { pattern, flags },
                    negated,
                });
                i = end;
                continue;
            }
        }

        let (text, end) = scan_bare(&chars, i);
        i = end;
        tokens.push(RawToken {
            literal: classify_quotes(text),
            negated,
        });
    }

    tokens
}

/// Returns `(pattern, flags, next_index)` if a regex literal starts at `start`.
fn scan_regex(chars: &[char], start: usize) -> Option<(String, String, usize)> {
    let mut i = start + 1;
    let mut pattern = String::new();
    loop {
        let c = *chars.get(i)?;
        match c {
            '\\' => {
                pattern.push(c);
                pattern.push(*chars.get(i + 1)?);
                i += 2;
            }
            '/' => break,
            _ => {
                pattern.push(c);
                i += 1;
            }
        }
    }
    i += 1;

    let mut flags = String::new();
    while let Some(&c) = chars.get(i) {
        if c.is_whitespace() {
            break;
        }
        if !REGEX_FLAG_CHARS.contains(c) {
            return None;
        }
        flags.push(c);
        i += 1;
    }

    Some((pattern, flags, i))
}

fn scan_bare(chars: &[char], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        if c.is_whitespace() {
            break;
        }
        if c == '"' {
            // Consume through the closing quote, whitespace included.
            text.push(c);
            i += 1;
            while let Some(&q) = chars.get(i) {
                text.push(q);
                i += 1;
                if q == '"' {
                    break;
                }
            }
            continue;
        }
        text.push(c);
        i += 1;
    }
    (text, i)
}

fn classify_quotes(text: String) -> Literal {
    let is_single_span = text.len() >= 2
        && text.starts_with('"')
        && text.ends_with('"')
        && text[1..text.len() - 1].find('"').is_none();
    if is_single_span {
        Literal::Quoted(text[1..text.len() - 1].to_string())
    } else if text.starts_with('"') && text[1..].find('"').is_none() {
        // Unterminated quote: take the rest of the input as the phrase.
        Literal::Quoted(text[1..].to_string())
    } else {
        Literal::Bare(text)
    }
}

/// Strip one pair of surrounding quotes from a filter value.
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}
