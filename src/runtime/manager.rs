// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The foreground side: one entry point, two execution contexts.
//!
//! `SearchManager` keeps a local [`Searcher`] current at all times and, while
//! the background worker is healthy, mirrors every item change to it and
//! sends queries there. Whatever comes back is checked before it is used:
//!
//! - a result for a request that is no longer current is dropped;
//! - a result computed while a mutation was outstanding, or against a version
//!   other than the last acknowledged one, is stale and re-run locally;
//! - a frame that cannot be decoded, a schema mismatch or a closed channel
//!   disables the worker for the rest of the session;
//! - a worker that misses the deadline has that one query answered locally.
//!
//! No public method returns an error. The worst case is a local answer.

use super::mirror::{plan_mirror, Mirror, MirrorPlan};
use super::protocol::{chunk_checksum, decode, encode, ErrorKind, Request, RequestId, Response};
use super::worker::WorkerHandle;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::facets::FacetResult;
use crate::search::Searcher;
use crate::types::{
    Corpus, ExecutedBy, IndexVersion, Item, ItemList, SearchRequest, SearchResult,
};
use crossbeam_channel::RecvTimeoutError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-caller request state, passed by `&mut` into the manager.
#[derive(Debug, Default)]
pub struct SearchSession {
    next_request_id: u64,
    current: Option<RequestId>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request whose answer the caller still wants.
    pub fn current(&self) -> Option<RequestId> {
        self.current
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        RequestId(self.next_request_id)
    }
}

#[derive(Debug)]
enum Backend {
    Worker(WorkerHandle),
    Local,
}

#[derive(Debug)]
struct Pending {
    id: RequestId,
    request: SearchRequest,
    sent_at: Instant,
    answer: Option<SearchResult>,
}

/// Latest items the caller handed over, per corpus.
#[derive(Debug, Clone)]
struct Source {
    items: ItemList,
    revision: u64,
}

fn slot(corpus: Corpus) -> usize {
    match corpus {
        Corpus::Authored => 0,
        Corpus::Context => 1,
    }
}

const CORPORA: [Corpus; 2] = [Corpus::Authored, Corpus::Context];

#[derive(Debug)]
pub struct SearchManager {
    config: SearchConfig,
    backend: Backend,
    local: Searcher,
    sources: [Option<Source>; 2],
    mirrors: [Mirror; 2],
    /// Corpora whose last batch was rejected and must be resent in full.
    needs_full: [bool; 2],
    /// Unacknowledged batch id → corpus.
    outstanding: HashMap<u64, Corpus>,
    next_batch_id: u64,
    /// Version from the most recent `index.ready`.
    observed_version: IndexVersion,
    pending: Option<Pending>,
}

impl SearchManager {
    /// Start with a background worker, or locally if the thread cannot spawn.
    pub fn new(config: SearchConfig) -> Self {
        match WorkerHandle::spawn(config.clone()) {
            Ok(handle) => Self::with_worker(config, handle),
            Err(e) => {
                tracing::error!(error = %e, "search worker unavailable; searching locally");
                Self::local(config)
            }
        }
    }

    /// Foreground only.
    pub fn local(config: SearchConfig) -> Self {
        Self::with_backend(config, Backend::Local)
    }

    /// Use an already connected worker.
    pub fn with_worker(config: SearchConfig, handle: WorkerHandle) -> Self {
        Self::with_backend(config, Backend::Worker(handle))
    }

    fn with_backend(config: SearchConfig, backend: Backend) -> Self {
        Self {
            local: Searcher::new(config.clone()),
            config,
            backend,
            sources: [None, None],
            mirrors: [Mirror::default(), Mirror::default()],
            needs_full: [false; 2],
            outstanding: HashMap::new(),
            next_batch_id: 0,
            observed_version: IndexVersion::default(),
            pending: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether queries still go to the background worker.
    pub fn is_background(&self) -> bool {
        matches!(self.backend, Backend::Worker(_))
    }

    pub fn local_searcher(&self) -> &Searcher {
        &self.local
    }

    pub fn observed_version(&self) -> IndexVersion {
        self.observed_version
    }

    pub fn outstanding_batches(&self) -> usize {
        self.outstanding.len()
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    /// Replace the authored items. Idempotent for the same list and revision.
    pub fn set_authored_items(&mut self, items: ItemList, revision: u64) {
        self.set_items(Corpus::Authored, items, revision);
    }

    /// Replace the context items. Idempotent for the same list.
    pub fn set_context_items(&mut self, items: ItemList) {
        let revision = self.sources[slot(Corpus::Context)]
            .as_ref()
            .map_or(0, |source| source.revision);
        self.set_items(Corpus::Context, items, revision);
    }

    fn set_items(&mut self, corpus: Corpus, items: ItemList, revision: u64) {
        if let Some(source) = &self.sources[slot(corpus)] {
            if Arc::ptr_eq(&source.items, &items) && source.revision == revision {
                return;
            }
        }
        let outcome = self.local.set_items(corpus, &items);
        tracing::debug!(corpus = corpus.as_str(), ?outcome, revision, "local index updated");
        self.sources[slot(corpus)] = Some(Source { items, revision });
        self.sync(corpus);
    }

    // =========================================================================
    // MIRRORING
    // =========================================================================

    fn sync(&mut self, corpus: Corpus) {
        if !self.is_background() {
            return;
        }
        let Some(source) = self.sources[slot(corpus)].clone() else {
            return;
        };
        let plan = if self.needs_full[slot(corpus)] {
            MirrorPlan::Full
        } else {
            plan_mirror(
                &self.mirrors[slot(corpus)],
                &source.items,
                source.revision,
                self.config.patch_max_items,
            )
        };

        let sent = match plan {
            MirrorPlan::Noop => Ok(()),
            MirrorPlan::Patch { upserts, deletes } => self.send_patch(corpus, &upserts, deletes),
            MirrorPlan::Full => self.send_full(corpus, &source.items),
        };
        match sent {
            Ok(()) => {
                self.needs_full[slot(corpus)] = false;
                self.mirrors[slot(corpus)].record(&source.items, source.revision);
            }
            Err(e) => self.disable_worker(&e.to_string()),
        }
    }

    fn next_batch(&mut self, corpus: Corpus) -> u64 {
        self.next_batch_id += 1;
        self.outstanding.insert(self.next_batch_id, corpus);
        self.next_batch_id
    }

    fn send_index(&self, request: &Request) -> Result<()> {
        if let Backend::Worker(handle) = &self.backend {
            handle.send_index(encode(request)?)?;
        }
        Ok(())
    }

    fn send_patch(&mut self, corpus: Corpus, upserts: &[Arc<Item>], deletes: Vec<String>) -> Result<()> {
        let batch_id = self.next_batch(corpus);
        tracing::debug!(batch_id, upserts = upserts.len(), deletes = deletes.len(), "sending index.patch");
        self.send_index(&Request::Patch {
            batch_id,
            corpus,
            upserts: upserts.iter().map(|item| Item::clone(item)).collect(),
            deletes,
        })
    }

    fn send_full(&mut self, corpus: Corpus, items: &[Arc<Item>]) -> Result<()> {
        let batch_id = self.next_batch(corpus);
        let chunks: Vec<&[Arc<Item>]> = items.chunks(self.config.chunk_size.max(1)).collect();
        tracing::info!(
            batch_id,
            corpus = corpus.as_str(),
            items = items.len(),
            chunks = chunks.len(),
            "sending full index load"
        );

        self.send_index(&Request::FullStart {
            batch_id,
            corpus,
            total_items: items.len(),
            chunk_count: chunks.len() as u32,
        })?;
        for (seq, chunk) in chunks.into_iter().enumerate() {
            let items: Vec<Item> = chunk.iter().map(|item| Item::clone(item)).collect();
            self.send_index(&Request::FullChunk {
                batch_id,
                seq: seq as u32,
                checksum: chunk_checksum(&items)?,
                items,
            })?;
        }
        self.send_index(&Request::FullCommit { batch_id })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Start a query, superseding whatever the session had in flight.
    pub fn submit(&mut self, session: &mut SearchSession, request: SearchRequest) -> RequestId {
        let id = session.next_id();
        if let Some(previous) = session.current.replace(id) {
            self.cancel(previous);
        }

        // Catch up on acknowledgements so freshness is judged on current state.
        self.pump();
        for corpus in CORPORA {
            if self.needs_full[slot(corpus)] {
                self.sync(corpus);
            }
        }

        let mut pending = Pending {
            id,
            request,
            sent_at: Instant::now(),
            answer: None,
        };

        if let Backend::Worker(handle) = &self.backend {
            let frame = encode(&Request::QueryRun {
                request_id: id,
                observed_version: self.observed_version,
                request: pending.request.clone(),
            })
            .and_then(|frame| handle.send_query(frame));
            if let Err(e) = frame {
                self.pending = Some(pending);
                self.disable_worker(&e.to_string());
                return id;
            }
        } else {
            pending.answer = Some(self.local.search(&pending.request, ExecutedBy::Local));
        }

        self.pending = Some(pending);
        id
    }

    fn cancel(&mut self, id: RequestId) {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending = None;
        }
        if let Err(e) = self.send_cancel(id) {
            self.disable_worker(&e.to_string());
        }
    }

    fn send_cancel(&self, id: RequestId) -> Result<()> {
        match &self.backend {
            Backend::Worker(handle) => encode(&Request::QueryCancel { request_id: id })
                .and_then(|frame| handle.send_query(frame)),
            Backend::Local => Ok(()),
        }
    }

    /// Block until `id` is answered. `None` if a newer request superseded it.
    pub fn wait(&mut self, session: &mut SearchSession, id: RequestId) -> Option<SearchResult> {
        if session.current != Some(id) {
            return None;
        }
        loop {
            let pending = self.pending.as_mut().filter(|p| p.id == id)?;
            if let Some(answer) = pending.answer.take() {
                self.pending = None;
                session.current = None;
                return Some(answer);
            }

            let deadline = pending.sent_at + Duration::from_millis(self.config.worker_timeout_ms);
            let received = match &self.backend {
                Backend::Worker(handle) => handle.responses().recv_deadline(deadline),
                Backend::Local => {
                    self.answer_locally(false);
                    continue;
                }
            };
            match received {
                Ok(frame) => self.handle_frame(&frame),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        request_id = %id,
                        timeout_ms = self.config.worker_timeout_ms,
                        "search worker timed out; answering locally"
                    );
                    self.answer_locally(false);
                    if let Err(e) = self.send_cancel(id) {
                        tracing::debug!(request_id = %id, error = %e, "dropped cancel for timed-out query");
                    }
                }
                Err(RecvTimeoutError::Disconnected) => self.disable_worker("worker disconnected"),
            }
        }
    }

    /// Submit and wait in one call.
    pub fn run_search(&mut self, session: &mut SearchSession, request: SearchRequest) -> SearchResult {
        let id = self.submit(session, request.clone());
        match self.wait(session, id) {
            Some(result) => result,
            None => self.local.search(&request, ExecutedBy::Local),
        }
    }

    /// Facets for ids from a result, looked up in the local index.
    pub fn compute_facets(&self, ids: &[String], query: &str) -> FacetResult {
        self.local.facets(ids, query)
    }

    /// Handle every response already waiting, without blocking.
    pub fn pump(&mut self) {
        loop {
            let frame = match &self.backend {
                Backend::Worker(handle) => handle.responses().try_recv(),
                Backend::Local => return,
            };
            match frame {
                Ok(frame) => self.handle_frame(&frame),
                Err(crossbeam_channel::TryRecvError::Empty) => return,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    self.disable_worker("worker disconnected");
                    return;
                }
            }
        }
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        let response = match decode::<Response>(frame) {
            Ok(response) => response,
            Err(e) => return self.disable_worker(&e.to_string()),
        };
        match response {
            Response::IndexReady {
                version,
                corpus,
                doc_count,
                batch_id,
            } => {
                if let Some(batch_id) = batch_id {
                    self.outstanding.remove(&batch_id);
                }
                self.observed_version = version;
                tracing::debug!(corpus = corpus.as_str(), version = version.get(), doc_count, "index ready");
            }
            Response::QueryResult { request_id, result } => {
                let current = self.pending.as_ref().is_some_and(|p| p.id == request_id && p.answer.is_none());
                if !current {
                    tracing::debug!(request_id = %request_id, "dropped response for a superseded request");
                    return;
                }
                let fresh = self.outstanding.is_empty() && result.index_version == self.observed_version;
                if fresh {
                    if let Some(pending) = self.pending.as_mut() {
                        pending.answer = Some(result);
                    }
                } else {
                    tracing::debug!(
                        request_id = %request_id,
                        result_version = result.index_version.get(),
                        observed_version = self.observed_version.get(),
                        outstanding = self.outstanding.len(),
                        "stale background result; re-running locally"
                    );
                    self.answer_locally(true);
                }
            }
            Response::Error {
                kind: ErrorKind::BatchRejected,
                message,
                batch_id,
                ..
            } => {
                let corpus = batch_id.and_then(|id| self.outstanding.remove(&id));
                tracing::warn!(?batch_id, %message, "index batch rejected; resending full snapshot");
                if let Some(corpus) = corpus {
                    self.needs_full[slot(corpus)] = true;
                    self.mirrors[slot(corpus)].clear();
                    self.sync(corpus);
                }
            }
            Response::Error { kind, message, .. } => {
                debug_assert!(kind.is_fatal());
                self.disable_worker(&format!("worker reported {:?}: {}", kind, message));
            }
        }
    }

    fn answer_locally(&mut self, stale_rerun: bool) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.answer.is_some() {
            return;
        }
        let mut result = self.local.search(&pending.request, ExecutedBy::Local);
        result.diagnostics.stale_rerun = stale_rerun;
        pending.answer = Some(result);
    }

    /// Switch to local execution for the rest of the session. Logged once.
    fn disable_worker(&mut self, reason: &str) {
        if let Backend::Worker(handle) = std::mem::replace(&mut self.backend, Backend::Local) {
            tracing::error!(reason, "background search disabled; answering locally from now on");
            drop(handle);
        }
        self.outstanding.clear();
        self.answer_locally(false);
    }

    /// Stop the worker thread, if any, and wait for it.
    pub fn shutdown(mut self) {
        if let Backend::Worker(handle) = std::mem::replace(&mut self.backend, Backend::Local) {
            handle.shutdown();
        }
    }
}
