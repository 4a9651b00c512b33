// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Budgeted boolean search over a local archive of posts and comments.
//!
//! Queries combine terms, phrases, regexes and field filters. They run
//! against per-corpus inverted indexes under a time budget, and return ranked
//! ids together with diagnostics. A background worker normally answers. The
//! foreground keeps a mirror of every index and answers on its own whenever
//! the worker is stale, slow or broken.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//! │  query   │──▶│    engine    │──▶│   scoring    │──▶│   search   │
//! │ (parse,  │   │ (Stage A     │   │ (sort modes, │   │ (pipeline, │
//! │  guard)  │   │  postings,   │   │  relevance)  │   │  Searcher) │
//! └──────────┘   │  Stage B)    │   └──────────────┘   └─────┬──────┘
//!                └──────┬───────┘                            │
//!                       │                                    ▼
//!                ┌──────▼───────┐                    ┌──────────────┐
//!                │    index     │                    │   runtime    │
//!                │ (postings,   │◀───────────────────│ (manager,    │
//!                │  append)     │   replace / patch  │  worker,     │
//!                └──────────────┘                    │  protocol)   │
//!                                                    └──────────────┘
//! ```
//!
//! `facets` and `state` sit beside the pipeline: one summarizes a result
//! set, the other carries query state through page addresses.
//!
//! # Usage
//!
//! ```ignore
//! use quarry::{SearchConfig, SearchManager, SearchRequest, SearchSession};
//!
//! let mut manager = SearchManager::new(SearchConfig::default());
//! manager.set_authored_items(items, 1);
//!
//! let mut session = SearchSession::new();
//! let result = manager.run_search(&mut session, SearchRequest::new("alpha -beta"));
//! println!("{} matches", result.total);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod facets;
pub mod feed;
pub mod index;
pub mod query;
pub mod runtime;
pub mod scoring;
pub mod search;
pub mod state;
pub mod types;
pub mod util;

#[doc(hidden)]
pub mod testing;

pub use config::{RelevanceWeights, SearchConfig};
pub use error::{QuarryError, Result};
pub use facets::{compute_facets, FacetGroup, FacetKey, FacetOption, FacetResult};
pub use feed::{load_feed, parse_feed};
pub use index::{CorpusIndex, IndexStats};
pub use query::{parse, serialize, Clause, ClauseKind, ParsedQuery};
pub use runtime::{SearchManager, SearchSession};
pub use search::{run_search, Corpora, Searcher};
pub use state::{DecodedState, PointerStore, QueryState};
pub use types::{
    Corpus, Diagnostics, ExecutedBy, IndexVersion, Item, ItemKind, ItemList, Scope, SearchDoc,
    SearchRequest, SearchResult, SortMode,
};
