// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks shared by every stage of the pipeline.
//!
//! Items come in from the feed, get normalized into `SearchDoc`s, live in a
//! corpus at a fixed ordinal, and come back out as ids inside a
//! `SearchResult`. Anything that crosses the worker boundary derives
//! `Serialize`/`Deserialize`, so the two execution contexts share one
//! vocabulary.
//!
//! # Invariants
//!
//! - **SearchDoc**: text fields are already normalized. Compare them only
//!   against other normalized text.
//! - **IndexVersion**: strictly increases with every index mutation inside one
//!   execution context. A result stamped with an older version than the
//!   latest acknowledged one is stale.
//! - **Corpus**: the derived `Ord` is the ranking priority (authored first).

use crate::util::normalize::{normalize_body, normalize_text};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// INPUT ITEMS
// =============================================================================

/// Post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Comment => "comment",
        }
    }

    /// Parse a `type:` filter value. Plurals are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "post" | "posts" => Some(ItemKind::Post),
            "comment" | "comments" => Some(ItemKind::Comment),
            _ => None,
        }
    }
}

/// One archived item as delivered by the feed.
///
/// `body_markdown` wins over `body_html` when both are present: it is cheaper
/// to strip and closer to what the author typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    /// Milliseconds since the Unix epoch, UTC.
    pub posted_at: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_markdown: Option<String>,
}

/// A shared, identity-comparable item array.
///
/// Identity (`Arc::ptr_eq`) is what the mirroring and append fast paths check,
/// so callers should keep reusing the same `Arc<Item>` for unchanged items.
pub type ItemList = Arc<Vec<Arc<Item>>>;

// =============================================================================
// CORPORA, SCOPE, SORT
// =============================================================================

/// Which collection a document belongs to.
///
/// Declaration order is ranking priority: authored items beat context items
/// on every tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    /// The canonical archive.
    Authored,
    /// Fetched thread ancestors, searched only when the scope asks for them.
    Context,
}

impl Corpus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Corpus::Authored => "authored",
            Corpus::Context => "context",
        }
    }
}

/// Which corpora a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Authored,
    All,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Authored => "authored",
            Scope::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authored" | "mine" => Some(Scope::Authored),
            "all" | "everything" => Some(Scope::All),
            _ => None,
        }
    }

    pub fn includes(&self, corpus: Corpus) -> bool {
        match self {
            Scope::Authored => corpus == Corpus::Authored,
            Scope::All => true,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    DateDesc,
    DateAsc,
    ScoreDesc,
    ScoreAsc,
    /// Reply-target name, alphabetical, blanks last.
    ReplyTo,
    Relevance,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::DateDesc,
        SortMode::DateAsc,
        SortMode::ScoreDesc,
        SortMode::ScoreAsc,
        SortMode::ReplyTo,
        SortMode::Relevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::DateDesc => "date-desc",
            SortMode::DateAsc => "date-asc",
            SortMode::ScoreDesc => "score-desc",
            SortMode::ScoreAsc => "score-asc",
            SortMode::ReplyTo => "reply-to",
            SortMode::Relevance => "relevance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        SortMode::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

// =============================================================================
// DERIVED DOCUMENTS
// =============================================================================

/// The normalized, immutable view of an item that the index stores.
///
/// Ordinal = position in the corpus' document array. Postings are expressed
/// in ordinals, never in ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDoc {
    pub id: String,
    pub kind: ItemKind,
    pub corpus: Corpus,
    pub timestamp: i64,
    pub score: i64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub reply_to: String,
}

impl SearchDoc {
    pub fn from_item(item: &Item, corpus: Corpus) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            corpus,
            timestamp: item.posted_at,
            score: item.score,
            title: item.title.as_deref().map(normalize_text).unwrap_or_default(),
            body: normalize_body(item.body_markdown.as_deref(), item.body_html.as_deref()),
            author: item.author.as_deref().map(normalize_text).unwrap_or_default(),
            reply_to: item
                .reply_to
                .as_deref()
                .map(normalize_text)
                .unwrap_or_default(),
        }
    }

    /// Title and body joined the way phrase and regex clauses see them.
    pub fn content(&self) -> String {
        match (self.title.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => self.title.clone(),
            (false, false) => format!("{} {}", self.title, self.body),
        }
    }
}

// =============================================================================
// VERSIONS, REQUESTS, RESULTS
// =============================================================================

/// Monotonic index mutation counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct IndexVersion(pub u64);

impl IndexVersion {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn next(self) -> Self {
        IndexVersion(self.0 + 1)
    }
}

/// Everything needed to run one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    /// Explicit scope; overrides any `scope:` directive in the query.
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Overrides the configured budget when set.
    #[serde(default)]
    pub budget_ms: Option<u64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            scope: None,
            sort: SortMode::default(),
            limit: None,
            budget_ms: None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_budget_ms(mut self, budget_ms: u64) -> Self {
        self.budget_ms = Some(budget_ms);
        self
    }
}

/// Which execution context produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutedBy {
    Background,
    #[default]
    Local,
}

/// How a query went, for the UI and for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    /// Budget ran out; results are a subset of the full answer.
    pub partial: bool,
    pub parse_valid: bool,
    pub stage_a_count: usize,
    pub stage_b_scanned: usize,
    pub executed_by: ExecutedBy,
    /// The background answer was stale and this one was computed locally.
    pub stale_rerun: bool,
    /// At least one regex clause ran as a plain substring.
    pub regex_downgraded: bool,
    pub elapsed_ms: u64,
}

/// The answer to one `SearchRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Ranked ids, truncated to the request limit.
    pub ids: Vec<String>,
    /// Match count before the limit was applied.
    pub total: usize,
    pub canonical_query: String,
    pub scope: Scope,
    pub index_version: IndexVersion,
    pub diagnostics: Diagnostics,
}
