// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One execution context's private copy of the indexes.
//!
//! The background worker owns one `Searcher`; the foreground manager owns
//! another. They never share memory, only the code in this crate, so a
//! query answered by either one follows the same rules.

use super::{run_search, Corpora};
use crate::config::SearchConfig;
use crate::facets::{compute_facets, FacetResult};
use crate::index::{CorpusIndex, IndexStats, UpdateOutcome};
use crate::types::{Corpus, ExecutedBy, IndexVersion, Item, SearchRequest, SearchResult};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Searcher {
    authored: CorpusIndex,
    context: CorpusIndex,
    version: IndexVersion,
    config: SearchConfig,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            authored: CorpusIndex::new(Corpus::Authored),
            context: CorpusIndex::new(Corpus::Context),
            version: IndexVersion::default(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn version(&self) -> IndexVersion {
        self.version
    }

    pub fn corpora(&self) -> Corpora<'_> {
        Corpora::new(&self.authored, &self.context)
    }

    pub fn index(&self, corpus: Corpus) -> &CorpusIndex {
        match corpus {
            Corpus::Authored => &self.authored,
            Corpus::Context => &self.context,
        }
    }

    fn index_mut(&mut self, corpus: Corpus) -> &mut CorpusIndex {
        match corpus {
            Corpus::Authored => &mut self.authored,
            Corpus::Context => &mut self.context,
        }
    }

    fn bump(&mut self, outcome: UpdateOutcome) -> UpdateOutcome {
        if outcome.changed() {
            self.version = self.version.next();
        }
        outcome
    }

    /// Sync a corpus with `items`, taking the append fast path when the new
    /// array extends the old one item for item.
    pub fn set_items(&mut self, corpus: Corpus, items: &[Arc<Item>]) -> UpdateOutcome {
        let outcome = self.index_mut(corpus).update(items);
        self.bump(outcome)
    }

    /// Replace a corpus wholesale. Always a new version.
    pub fn replace(&mut self, corpus: Corpus, items: &[Arc<Item>]) -> IndexVersion {
        *self.index_mut(corpus) = CorpusIndex::build(corpus, items);
        self.version = self.version.next();
        self.version
    }

    /// Apply a small upsert/delete diff. Always a new version.
    pub fn patch(&mut self, corpus: Corpus, upserts: &[Arc<Item>], deletes: &[String]) -> IndexVersion {
        self.index_mut(corpus).apply_patch(upserts, deletes);
        self.version = self.version.next();
        self.version
    }

    pub fn search(&self, request: &SearchRequest, executed_by: ExecutedBy) -> SearchResult {
        run_search(self.corpora(), self.version, request, &self.config, executed_by)
    }

    /// Facets over result ids. Unknown ids are skipped.
    pub fn facets(&self, ids: &[String], query: &str) -> FacetResult {
        let corpora = self.corpora();
        let items: Vec<Arc<Item>> = ids
            .iter()
            .filter_map(|id| corpora.item(id).cloned())
            .collect();
        compute_facets(&items, query, &self.config)
    }

    pub fn stats(&self) -> [IndexStats; 2] {
        [self.authored.stats(), self.context.stats()]
    }
}
