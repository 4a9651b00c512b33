// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Facet counts over a ranked result set.
//!
//! One linear pass over the result items (not the index), under its own short
//! budget. Each option carries the query fragment that selects it and an
//! `active` flag telling the UI whether the current query already has it.
//!
//! Groups:
//! - **type**: posts and comments
//! - **author**: the top N names by count, then name
//! - **year**: only shown when results span more than one year

use crate::config::SearchConfig;
use crate::engine::Budget;
use crate::query::{parse_with_limits, Clause, ClauseKind, ParsedQuery, RangeSpec};
use crate::types::{Item, ItemKind};
use crate::util::normalize::normalize_text;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKey {
    Type,
    Author,
    Year,
}

impl FacetKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKey::Type => "type",
            FacetKey::Author => "author",
            FacetKey::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOption {
    pub label: String,
    pub count: usize,
    /// Query syntax that selects this option.
    pub fragment: String,
    /// The current query already contains `fragment`.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetGroup {
    pub key: FacetKey,
    pub options: Vec<FacetOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetResult {
    pub groups: Vec<FacetGroup>,
    /// The budget ran out; counts cover only a prefix of the items.
    pub delayed: bool,
}

impl FacetResult {
    pub fn group(&self, key: FacetKey) -> Option<&FacetGroup> {
        self.groups.iter().find(|group| group.key == key)
    }
}

#[derive(Default)]
struct Tally {
    types: BTreeMap<ItemKind, usize>,
    /// normalized name → (first display name seen, count)
    authors: HashMap<String, (String, usize)>,
    years: BTreeMap<i32, usize>,
}

impl Tally {
    fn add(&mut self, item: &Item) {
        *self.types.entry(item.kind).or_default() += 1;

        if let Some(display) = item.author.as_deref() {
            let key = normalize_text(display);
            if !key.is_empty() {
                self.authors
                    .entry(key)
                    .or_insert_with(|| (display.trim().to_string(), 0))
                    .1 += 1;
            }
        }

        if let Some(posted) = DateTime::from_timestamp_millis(item.posted_at) {
            *self.years.entry(posted.year()).or_default() += 1;
        }
    }
}

fn option(parsed: &ParsedQuery, label: String, count: usize, kind: ClauseKind) -> FacetOption {
    let active = parsed.has_positive(&kind);
    FacetOption {
        label,
        count,
        fragment: Clause::positive(kind).to_string(),
        active,
    }
}

fn year_range(year: i32) -> Option<ClauseKind> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(ClauseKind::Date(RangeSpec::Between(first, last)))
}

/// Count facets over `items` (already ranked) for the current `query`.
pub fn compute_facets(items: &[Arc<Item>], query: &str, config: &SearchConfig) -> FacetResult {
    let parsed = parse_with_limits(query, config.regex_max_len);
    let mut budget = Budget::new(config.facet_budget_ms, config.budget_check_interval);

    let mut tally = Tally::default();
    let mut delayed = false;
    for item in items {
        if !budget.tick() {
            delayed = true;
            break;
        }
        tally.add(item);
    }

    let mut groups = Vec::with_capacity(3);

    let type_options: Vec<FacetOption> = tally
        .types
        .iter()
        .map(|(&kind, &count)| option(&parsed, kind.as_str().to_string(), count, ClauseKind::Type(kind)))
        .collect();
    if !type_options.is_empty() {
        groups.push(FacetGroup {
            key: FacetKey::Type,
            options: type_options,
        });
    }

    let mut authors: Vec<(String, String, usize)> = tally
        .authors
        .into_iter()
        .map(|(key, (label, count))| (key, label, count))
        .collect();
    authors.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    authors.truncate(config.top_authors);
    if !authors.is_empty() {
        groups.push(FacetGroup {
            key: FacetKey::Author,
            options: authors
                .into_iter()
                .map(|(key, label, count)| option(&parsed, label, count, ClauseKind::Author(key)))
                .collect(),
        });
    }

    if tally.years.len() > 1 {
        let options = tally
            .years
            .iter()
            .rev()
            .filter_map(|(&year, &count)| {
                year_range(year).map(|kind| option(&parsed, year.to_string(), count, kind))
            })
            .collect();
        groups.push(FacetGroup {
            key: FacetKey::Year,
            options,
        });
    }

    if delayed {
        tracing::debug!(counted = budget.spent(), total = items.len(), "facet budget exhausted");
    }

    FacetResult { groups, delayed }
}
