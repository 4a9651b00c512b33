// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction: the data structures that make search fast.
//!
//! Each corpus gets one `CorpusIndex` with three postings tables:
//! - **content**: title and body tokens, for terms
//! - **authors**: author-name tokens, for `author:` filters and relevance
//! - **reply_to**: reply-target tokens, for `replyto:` filters and relevance
//!
//! Growth is append-only when the new item array is an identity superset of
//! the old one (see [`plan_append`]); anything else rebuilds.

mod append;
mod corpus;
pub mod postings;

pub use append::{plan_append, AppendPlan};
pub use corpus::{CorpusIndex, IndexStats, UpdateOutcome};
pub use postings::{Postings, PostingsBuilder};
