// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Archive item fixtures.
//!
//! `ItemBuilder` assembles posts and comments field by field; `make_post` and
//! `make_comment` cover the common shapes. Timestamps come from `utc_ms` and
//! `day_start_ms` so date filters can be tested against exact day edges.
//! Used by unit tests, `tests/` and the bench.

#![doc(hidden)]

use crate::types::{Item, ItemKind, ItemList};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

/// Builder for test items. Defaults: post, timestamp 0, score 0, no text.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(id: &str, kind: ItemKind) -> Self {
        Self {
            item: Item {
                id: id.to_string(),
                kind,
                posted_at: 0,
                score: 0,
                title: None,
                author: None,
                reply_to: None,
                body_html: None,
                body_markdown: None,
            },
        }
    }

    pub fn post(id: &str) -> Self {
        Self::new(id, ItemKind::Post)
    }

    pub fn comment(id: &str) -> Self {
        Self::new(id, ItemKind::Comment)
    }

    pub fn at(mut self, posted_at: i64) -> Self {
        self.item.posted_at = posted_at;
        self
    }

    pub fn score(mut self, score: i64) -> Self {
        self.item.score = score;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.item.title = Some(title.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.item.author = Some(author.to_string());
        self
    }

    pub fn reply_to(mut self, name: &str) -> Self {
        self.item.reply_to = Some(name.to_string());
        self
    }

    pub fn body(mut self, markdown: &str) -> Self {
        self.item.body_markdown = Some(markdown.to_string());
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.item.body_html = Some(html.to_string());
        self
    }

    pub fn build(self) -> Arc<Item> {
        Arc::new(self.item)
    }
}

/// A post with a markdown body and nothing else.
pub fn make_post(id: &str, posted_at: i64, body: &str) -> Arc<Item> {
    ItemBuilder::post(id).at(posted_at).body(body).build()
}

/// Create a comment with an author and optional reply target.
pub fn make_comment(
    id: &str,
    posted_at: i64,
    body: &str,
    author: &str,
    reply_to: Option<&str>,
) -> Arc<Item> {
    let builder = ItemBuilder::comment(id).at(posted_at).body(body).author(author);
    match reply_to {
        Some(name) => builder.reply_to(name).build(),
        None => builder.build(),
    }
}

/// Wrap items into a shared list.
pub fn item_list(items: Vec<Arc<Item>>) -> ItemList {
    Arc::new(items)
}

/// Milliseconds at the given UTC time.
pub fn utc_ms(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day} {hour}h"))
}

/// Milliseconds at UTC midnight of the given day.
pub fn day_start_ms(year: i32, month: u32, day: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day}"))
}
