// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Item feed files.
//!
//! Either a bare array of items or an object with an `items` array (the
//! shape the archive cache exports). Order is preserved; it becomes the
//! index ordinal order.

use crate::error::Result;
use crate::types::{Item, ItemList};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedFile {
    Bare(Vec<Item>),
    Wrapped { items: Vec<Item> },
}

/// Parse feed JSON into a shared item list.
pub fn parse_feed(raw: &str) -> Result<ItemList> {
    let items = match serde_json::from_str(raw)? {
        FeedFile::Bare(items) | FeedFile::Wrapped { items } => items,
    };
    Ok(Arc::new(items.into_iter().map(Arc::new).collect()))
}

pub fn load_feed(path: impl AsRef<Path>) -> Result<ItemList> {
    let raw = fs::read_to_string(path.as_ref())?;
    let items = parse_feed(&raw)?;
    tracing::debug!(path = %path.as_ref().display(), items = items.len(), "loaded feed");
    Ok(items)
}
