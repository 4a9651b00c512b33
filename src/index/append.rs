// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Append-only fast path precondition.
//!
//! A new item array may extend an index in place only if it is an identity
//! superset of the array the index was built from: the same `Arc<Item>`s in
//! the same positions, followed by items whose ids the index has never seen.
//! Anything else (a replaced item, a reorder, a removal, a recycled id)
//! requires a rebuild.

use super::corpus::CorpusIndex;
use crate::types::Item;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum AppendPlan {
    /// Extend with these items. Empty means the arrays are identical.
    AppendOnly { new_items: Vec<Arc<Item>> },
    RequiresRebuild,
}

impl AppendPlan {
    pub fn is_noop(&self) -> bool {
        matches!(self, AppendPlan::AppendOnly { new_items } if new_items.is_empty())
    }
}

/// Decide how `index` can absorb `items`.
pub fn plan_append(index: &CorpusIndex, items: &[Arc<Item>]) -> AppendPlan {
    let source = index.source();
    if items.len() < source.len() {
        return AppendPlan::RequiresRebuild;
    }
    let prefix_identical = source
        .iter()
        .zip(items)
        .all(|(old, new)| Arc::ptr_eq(old, new));
    if !prefix_identical {
        return AppendPlan::RequiresRebuild;
    }

    // Repeats inside the tail are fine: append keeps the first, as build does.
    let tail = &items[source.len()..];
    if tail.iter().any(|item| index.contains_id(&item.id)) {
        return AppendPlan::RequiresRebuild;
    }

    AppendPlan::AppendOnly {
        new_items: tail.to_vec(),
    }
}
