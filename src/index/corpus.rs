// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One corpus: documents, lookups, and three postings tables.

use super::append::{plan_append, AppendPlan};
use super::postings::{tokens, Postings, PostingsBuilder};
use crate::types::{Corpus, Item, SearchDoc};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Title and body tokens, the content a term is matched against.
fn content_tokens(doc: &SearchDoc) -> impl Iterator<Item = &str> {
    tokens(&doc.title).chain(tokens(&doc.body))
}

#[cfg(feature = "parallel")]
fn derive_docs(items: &[Arc<Item>], corpus: Corpus) -> Vec<SearchDoc> {
    items
        .par_iter()
        .map(|item| SearchDoc::from_item(item, corpus))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn derive_docs(items: &[Arc<Item>], corpus: Corpus) -> Vec<SearchDoc> {
    items
        .iter()
        .map(|item| SearchDoc::from_item(item, corpus))
        .collect()
}

/// The three postings tables under construction.
#[derive(Debug, Default)]
struct TableBuilders {
    content: PostingsBuilder,
    authors: PostingsBuilder,
    reply_to: PostingsBuilder,
}

impl TableBuilders {
    fn add(mut self, ordinal: u32, doc: &SearchDoc) -> Self {
        self.content.add_document(ordinal, content_tokens(doc));
        self.authors.add_document(ordinal, tokens(&doc.author));
        self.reply_to.add_document(ordinal, tokens(&doc.reply_to));
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.content.merge(other.content);
        self.authors.merge(other.authors);
        self.reply_to.merge(other.reply_to);
        self
    }
}

/// Per-thread builders over chunks of `docs`, merged and frozen once.
#[cfg(feature = "parallel")]
fn post_docs(docs: &[SearchDoc]) -> TableBuilders {
    docs.par_iter()
        .enumerate()
        .fold(TableBuilders::default, |tables, (ordinal, doc)| {
            tables.add(ordinal as u32, doc)
        })
        .reduce(TableBuilders::default, TableBuilders::merge)
}

#[cfg(not(feature = "parallel"))]
fn post_docs(docs: &[SearchDoc]) -> TableBuilders {
    docs.iter()
        .enumerate()
        .fold(TableBuilders::default(), |tables, (ordinal, doc)| {
            tables.add(ordinal as u32, doc)
        })
}

/// `source` with `deleting` removed, replacements swapped in place, and new
/// ids appended.
fn patched_source(
    source: &[Arc<Item>],
    upserts: &[Arc<Item>],
    deleting: &HashSet<&str>,
) -> Vec<Arc<Item>> {
    let replacements: HashMap<&str, &Arc<Item>> =
        upserts.iter().map(|item| (item.id.as_str(), item)).collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut next = Vec::with_capacity(source.len() + upserts.len());
    for item in source {
        if deleting.contains(item.id.as_str()) {
            continue;
        }
        match replacements.get(item.id.as_str()) {
            Some(replacement) => {
                placed.insert(item.id.as_str());
                next.push(Arc::clone(replacement));
            }
            None => next.push(item.clone()),
        }
    }
    next.extend(
        upserts
            .iter()
            .filter(|item| !placed.contains(item.id.as_str()))
            .cloned(),
    );
    next
}

/// What `CorpusIndex::update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    Appended(usize),
    Rebuilt,
}

impl UpdateOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, UpdateOutcome::Unchanged)
    }
}

/// Sizes, for `quarry inspect` and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub corpus: Corpus,
    pub docs: usize,
    pub content_tokens: usize,
    pub author_tokens: usize,
    pub reply_to_tokens: usize,
    pub postings: usize,
}

/// Inverted index over one corpus.
///
/// Ordinals are dense: `docs[o]`, `items[o]` and every posting `o` refer to
/// the same document. Duplicate ids in an input array keep their first
/// occurrence.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    corpus: Corpus,
    /// The item array this index reflects, exactly as received.
    source: Vec<Arc<Item>>,
    docs: Vec<SearchDoc>,
    items: Vec<Arc<Item>>,
    ordinals: HashMap<String, u32>,
    content: Postings,
    authors: Postings,
    reply_to: Postings,
}

impl CorpusIndex {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            source: Vec::new(),
            docs: Vec::new(),
            items: Vec::new(),
            ordinals: HashMap::new(),
            content: Postings::default(),
            authors: Postings::default(),
            reply_to: Postings::default(),
        }
    }

    /// Build from scratch.
    pub fn build(corpus: Corpus, items: &[Arc<Item>]) -> Self {
        let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
        let unique: Vec<Arc<Item>> = items
            .iter()
            .filter(|item| seen.insert(item.id.as_str()))
            .cloned()
            .collect();

        let docs = derive_docs(&unique, corpus);

        let tables = post_docs(&docs);
        let ordinals: HashMap<String, u32> = docs
            .iter()
            .enumerate()
            .map(|(ordinal, doc)| (doc.id.clone(), ordinal as u32))
            .collect();

        tracing::info!(
            corpus = corpus.as_str(),
            docs = docs.len(),
            "built corpus index"
        );

        Self {
            corpus,
            source: items.to_vec(),
            docs,
            items: unique,
            ordinals,
            content: tables.content.freeze(),
            authors: tables.authors.freeze(),
            reply_to: tables.reply_to.freeze(),
        }
    }

    /// Extend with items that follow the current source array.
    ///
    /// Items whose id is already indexed are skipped. Callers that need the
    /// identity-superset guarantee go through [`CorpusIndex::update`].
    pub fn append(&mut self, items: &[Arc<Item>]) {
        for item in items {
            self.source.push(item.clone());
            if self.ordinals.contains_key(&item.id) {
                continue;
            }
            let ordinal = self.docs.len() as u32;
            let doc = SearchDoc::from_item(item, self.corpus);
            self.content.append_document(ordinal, content_tokens(&doc));
            self.authors.append_document(ordinal, tokens(&doc.author));
            self.reply_to.append_document(ordinal, tokens(&doc.reply_to));
            self.ordinals.insert(doc.id.clone(), ordinal);
            self.docs.push(doc);
            self.items.push(item.clone());
        }
    }

    /// Bring the index in line with `items`, appending when possible.
    pub fn update(&mut self, items: &[Arc<Item>]) -> UpdateOutcome {
        match plan_append(self, items) {
            AppendPlan::AppendOnly { new_items } if new_items.is_empty() => UpdateOutcome::Unchanged,
            AppendPlan::AppendOnly { new_items } => {
                self.append(&new_items);
                tracing::debug!(
                    corpus = self.corpus.as_str(),
                    appended = new_items.len(),
                    "appended to corpus index"
                );
                UpdateOutcome::Appended(new_items.len())
            }
            AppendPlan::RequiresRebuild => {
                *self = CorpusIndex::build(self.corpus, items);
                UpdateOutcome::Rebuilt
            }
        }
    }

    /// Apply a small upsert/delete diff.
    ///
    /// Replacements are re-posted in place and new ids are appended. Deleting
    /// an indexed id shifts ordinals, so it rebuilds.
    pub fn apply_patch(&mut self, upserts: &[Arc<Item>], deletes: &[String]) -> UpdateOutcome {
        let deleting: HashSet<&str> = deletes
            .iter()
            .map(String::as_str)
            .filter(|id| self.ordinals.contains_key(*id))
            .collect();

        if !deleting.is_empty() {
            let next = patched_source(&self.source, upserts, &deleting);
            *self = CorpusIndex::build(self.corpus, &next);
            return UpdateOutcome::Rebuilt;
        }

        let mut appended = Vec::new();
        for item in upserts {
            match self.ordinals.get(&item.id).copied() {
                Some(ordinal) => self.replace_at(ordinal, item.clone()),
                None => appended.push(item.clone()),
            }
        }
        if upserts.is_empty() {
            return UpdateOutcome::Unchanged;
        }
        let count = appended.len();
        self.append(&appended);
        UpdateOutcome::Appended(count)
    }

    fn replace_at(&mut self, ordinal: u32, item: Arc<Item>) {
        let slot = ordinal as usize;
        let doc = SearchDoc::from_item(&item, self.corpus);

        let old = &self.docs[slot];
        self.content.remove_document(ordinal, content_tokens(old));
        self.authors.remove_document(ordinal, tokens(&old.author));
        self.reply_to.remove_document(ordinal, tokens(&old.reply_to));

        self.content.insert_document(ordinal, content_tokens(&doc));
        self.authors.insert_document(ordinal, tokens(&doc.author));
        self.reply_to.insert_document(ordinal, tokens(&doc.reply_to));

        if let Some(position) = self.source.iter().position(|s| s.id == item.id) {
            self.source[position] = item.clone();
        }
        self.docs[slot] = doc;
        self.items[slot] = item;
    }

    #[inline]
    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    #[inline]
    pub fn doc(&self, ordinal: u32) -> &SearchDoc {
        &self.docs[ordinal as usize]
    }

    pub fn docs(&self) -> &[SearchDoc] {
        &self.docs
    }

    #[inline]
    pub fn item(&self, ordinal: u32) -> &Arc<Item> {
        &self.items[ordinal as usize]
    }

    pub fn source(&self) -> &[Arc<Item>] {
        &self.source
    }

    pub fn ordinal_of(&self, id: &str) -> Option<u32> {
        self.ordinals.get(id).copied()
    }

    #[inline]
    pub fn contains_id(&self, id: &str) -> bool {
        self.ordinals.contains_key(id)
    }

    pub fn content_postings(&self) -> &Postings {
        &self.content
    }

    pub fn author_postings(&self) -> &Postings {
        &self.authors
    }

    pub fn reply_to_postings(&self) -> &Postings {
        &self.reply_to
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            corpus: self.corpus,
            docs: self.docs.len(),
            content_tokens: self.content.token_count(),
            author_tokens: self.authors.token_count(),
            reply_to_tokens: self.reply_to.token_count(),
            postings: self.content.posting_count()
                + self.authors.posting_count()
                + self.reply_to.posting_count(),
        }
    }
}
