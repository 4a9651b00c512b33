// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Deciding what the worker needs to hear about an item array change.
//!
//! The common case (the caller hands back the same `Arc` list with the same
//! revision) is an O(1) pointer check. Otherwise the arrays are diffed by id
//! and item identity; small diffs go out as one `index.patch`, large ones as
//! a chunked full reload.

use crate::types::{Item, ItemList};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// What the worker was last sent for one corpus.
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    pub items: Option<ItemList>,
    pub revision: u64,
}

impl Mirror {
    pub fn record(&mut self, items: &ItemList, revision: u64) {
        self.items = Some(Arc::clone(items));
        self.revision = revision;
    }

    pub fn clear(&mut self) {
        self.items = None;
    }
}

#[derive(Debug, Clone)]
pub enum MirrorPlan {
    Noop,
    Patch {
        upserts: Vec<Arc<Item>>,
        deletes: Vec<String>,
    },
    Full,
}

/// First occurrence of each id, the same rule the index applies.
fn first_by_id(items: &[Arc<Item>]) -> HashMap<&str, &Arc<Item>> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        map.entry(item.id.as_str()).or_insert(item);
    }
    map
}

/// Plan how to bring `mirror` in line with `items` at `revision`.
pub fn plan_mirror(mirror: &Mirror, items: &ItemList, revision: u64, patch_max_items: usize) -> MirrorPlan {
    let Some(sent) = mirror.items.as_ref() else {
        return MirrorPlan::Full;
    };
    if Arc::ptr_eq(sent, items) && mirror.revision == revision {
        return MirrorPlan::Noop;
    }

    let before = first_by_id(sent);
    let mut upserts = Vec::new();
    let mut current: HashSet<&str> = HashSet::with_capacity(items.len());
    for item in items.iter() {
        if !current.insert(item.id.as_str()) {
            continue;
        }
        match before.get(item.id.as_str()) {
            Some(old) if Arc::ptr_eq(old, item) => {}
            _ => upserts.push(Arc::clone(item)),
        }
        if upserts.len() > patch_max_items {
            return MirrorPlan::Full;
        }
    }

    let mut deletes: Vec<String> = before
        .keys()
        .filter(|id| !current.contains(*id))
        .map(|id| id.to_string())
        .collect();
    deletes.sort_unstable();

    match upserts.len() + deletes.len() {
        0 => MirrorPlan::Noop,
        n if n <= patch_max_items => MirrorPlan::Patch { upserts, deletes },
        _ => MirrorPlan::Full,
    }
}
