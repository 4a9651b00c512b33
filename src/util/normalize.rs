// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text normalization for accent- and markup-insensitive matching.
//!
//! Everything that gets compared goes through here: indexed fields at build
//! time, filter values and phrases at parse time. Same function on both sides
//! means comparisons are always like-for-like.
//!
//! - "Café" → "cafe"
//! - "Don't" → "dont"
//! - "<p>Hello&nbsp;<b>World</b></p>" → "hello world"
//! - "[the docs](https://x.y) say `42`" → "the docs say 42"
//!
//! # Algorithm
//!
//! 1. Strip markup: HTML tags and entities, or markdown decoration
//! 2. NFKD decompose, drop combining marks
//! 3. Lowercase, drop apostrophes
//! 4. Every other non-alphanumeric run becomes a single space, trimmed
//!
//! The fold is idempotent: `fold(fold(x)) == fold(x)`.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A field value and the markup it is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichText<'a> {
    Plain(&'a str),
    Html(&'a str),
    Markdown(&'a str),
}

/// Normalize a field value for indexing or comparison.
pub fn normalize(field: RichText<'_>) -> String {
    match field {
        RichText::Plain(text) => fold(text),
        RichText::Html(html) => fold(&strip_html(html)),
        RichText::Markdown(source) => fold(&strip_markdown(source)),
    }
}

/// Normalize plain text (titles, names, query values).
#[inline]
pub fn normalize_text(text: &str) -> String {
    normalize(RichText::Plain(text))
}

/// Normalize an item body, preferring markdown source over rendered HTML.
pub fn normalize_body(markdown: Option<&str>, html: Option<&str>) -> String {
    match (markdown, html) {
        (Some(source), _) => normalize(RichText::Markdown(source)),
        (None, Some(html)) => normalize(RichText::Html(html)),
        (None, None) => String::new(),
    }
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{02BC}')
}

/// Compatibility fold, lowercase, punctuation to single spaces.
pub fn fold(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    for c in value.nfkd() {
        if is_combining_mark(c) || is_apostrophe(c) {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            // Lowercasing can reintroduce a combining mark (İ → i + U+0307)
            out.extend(c.to_lowercase().filter(|lc| !is_combining_mark(*lc)));
        } else {
            pending_space = true;
        }
    }

    out
}

// =============================================================================
// HTML
// =============================================================================

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("static regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("static regex"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

/// Drop tags (as whitespace, so `a<br>b` stays two words) and decode entities.
pub fn strip_html(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, " ");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, " ");
    let text = HTML_TAG.replace_all(&without_styles, " ");
    html_escape::decode_html_entities(&text).into_owned()
}

// =============================================================================
// MARKDOWN
// =============================================================================

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:```|~~~)[^\n]*$").expect("static regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("static regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\](?:\([^)]*\)|\[[^\]]*\])").expect("static regex"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`+").expect("static regex"));
static LATEX_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$|\$|\\\(|\\\)|\\\[|\\\]").expect("static regex"));
static BLOCK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#{1,6}|>+|[-*+]|\d+[.)])[ \t]+").expect("static regex")
});

/// Reduce markdown-like source to the text a reader would see.
///
/// Links and images keep their visible label; fences, backticks, LaTeX
/// delimiters and leading block markers disappear while the text they
/// wrap stays.
pub fn strip_markdown(source: &str) -> String {
    let text = CODE_FENCE.replace_all(source, " ");
    let text = IMAGE.replace_all(&text, " $1 ");
    let text = LINK.replace_all(&text, " $1 ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = LATEX_DELIMITER.replace_all(&text, " ");
    BLOCK_MARKER.replace_all(&text, "").into_owned()
}
