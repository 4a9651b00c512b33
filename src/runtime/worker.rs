// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The background execution context.
//!
//! A named thread that owns its own [`Searcher`] and talks to the rest of
//! the process only through byte frames on three channels:
//!
//! ```text
//!            index_tx ──► ┌──────────────┐
//! manager    query_tx ──► │ quarry-worker│ ──► responses ──► manager
//!                         └──────────────┘
//! ```
//!
//! Index and query channels are each ordered, but not relative to each
//! other. Before running a query the worker applies every index frame that
//! is already queued, then drains the query channel so a queued cancel or a
//! newer `query.run` wins before any work is done.

use super::protocol::{
    chunk_checksum, decode, encode, ErrorKind, Request, RequestId, Response,
};
use crate::config::SearchConfig;
use crate::error::{QuarryError, Result};
use crate::search::Searcher;
use crate::types::{Corpus, ExecutedBy, IndexVersion, Item, SearchRequest};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const WORKER_THREAD_NAME: &str = "quarry-worker";

/// `total_items` comes off the wire; never trust it for a single allocation.
const MAX_PREALLOCATED_ITEMS: usize = 1 << 16;

/// The foreground's end of the worker channels.
///
/// Dropping the handle disconnects the channels; the worker thread notices
/// and exits on its own.
#[derive(Debug)]
pub struct WorkerHandle {
    index_tx: Sender<Vec<u8>>,
    query_tx: Sender<Vec<u8>>,
    responses: Receiver<Vec<u8>>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Start a worker thread with empty indexes.
    pub fn spawn(config: SearchConfig) -> Result<Self> {
        let (index_tx, index_rx) = unbounded();
        let (query_tx, query_rx) = unbounded();
        let (response_tx, responses) = unbounded();

        let join = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || Worker::new(config, response_tx).run(index_rx, query_rx))
            .map_err(|e| QuarryError::WorkerUnavailable(e.to_string()))?;

        tracing::info!(thread = WORKER_THREAD_NAME, "search worker started");
        Ok(Self {
            index_tx,
            query_tx,
            responses,
            join: Some(join),
        })
    }

    /// Wrap channels whose other ends are driven by something else.
    pub fn from_channels(
        index_tx: Sender<Vec<u8>>,
        query_tx: Sender<Vec<u8>>,
        responses: Receiver<Vec<u8>>,
    ) -> Self {
        Self {
            index_tx,
            query_tx,
            responses,
            join: None,
        }
    }

    pub fn send_index(&self, frame: Vec<u8>) -> Result<()> {
        self.index_tx
            .send(frame)
            .map_err(|_| QuarryError::WorkerUnavailable("index channel closed".into()))
    }

    pub fn send_query(&self, frame: Vec<u8>) -> Result<()> {
        self.query_tx
            .send(frame)
            .map_err(|_| QuarryError::WorkerUnavailable("query channel closed".into()))
    }

    pub fn responses(&self) -> &Receiver<Vec<u8>> {
        &self.responses
    }

    /// Disconnect and wait for the thread to finish.
    pub fn shutdown(self) {
        let WorkerHandle {
            index_tx,
            query_tx,
            responses,
            join,
        } = self;
        drop(index_tx);
        drop(query_tx);
        drop(responses);
        if let Some(join) = join {
            if join.join().is_err() {
                tracing::warn!(thread = WORKER_THREAD_NAME, "search worker panicked");
            } else {
                tracing::info!(thread = WORKER_THREAD_NAME, "search worker stopped");
            }
        }
    }
}

/// A chunked full load in progress.
#[derive(Debug)]
struct PendingBatch {
    corpus: Corpus,
    total_items: usize,
    chunk_count: u32,
    next_seq: u32,
    items: Vec<Arc<Item>>,
}

struct LatestQuery {
    request_id: RequestId,
    request: SearchRequest,
}

struct Worker {
    searcher: Searcher,
    batches: HashMap<u64, PendingBatch>,
    out: Sender<Vec<u8>>,
}

impl Worker {
    fn new(config: SearchConfig, out: Sender<Vec<u8>>) -> Self {
        Self {
            searcher: Searcher::new(config),
            batches: HashMap::new(),
            out,
        }
    }

    fn run(mut self, index_rx: Receiver<Vec<u8>>, query_rx: Receiver<Vec<u8>>) {
        loop {
            select! {
                recv(index_rx) -> frame => match frame {
                    Ok(frame) => self.handle_index(&frame),
                    Err(_) => break,
                },
                recv(query_rx) -> frame => match frame {
                    Ok(frame) => self.handle_queries(frame, &index_rx, &query_rx),
                    Err(_) => break,
                },
            }
        }
        tracing::debug!(thread = WORKER_THREAD_NAME, "channels closed");
    }

    fn send(&self, response: &Response) {
        match encode(response) {
            // A closed channel means the manager is gone; the loop ends on the next recv.
            Ok(frame) => {
                if self.out.send(frame).is_err() {
                    tracing::debug!(thread = WORKER_THREAD_NAME, "response dropped, manager gone");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to encode worker response"),
        }
    }

    fn decode_or_report(&self, frame: &[u8]) -> Option<Request> {
        match decode::<Request>(frame) {
            Ok(request) => Some(request),
            Err(e) => {
                let kind = match e {
                    QuarryError::SchemaMismatch { .. } => ErrorKind::Schema,
                    _ => ErrorKind::Deserialize,
                };
                tracing::warn!(error = %e, "worker could not decode a frame");
                self.send(&Response::error(kind, e.to_string()));
                None
            }
        }
    }

    fn handle_index(&mut self, frame: &[u8]) {
        let Some(request) = self.decode_or_report(frame) else {
            return;
        };
        match request {
            Request::FullStart {
                batch_id,
                corpus,
                total_items,
                chunk_count,
            } => {
                // A newer load of the same corpus supersedes any unfinished one.
                self.batches.retain(|_, pending| pending.corpus != corpus);
                self.batches.insert(
                    batch_id,
                    PendingBatch {
                        corpus,
                        total_items,
                        chunk_count,
                        next_seq: 0,
                        items: Vec::with_capacity(total_items.min(MAX_PREALLOCATED_ITEMS)),
                    },
                );
            }
            Request::FullChunk {
                batch_id,
                seq,
                checksum,
                items,
            } => {
                let Some(pending) = self.batches.get_mut(&batch_id) else {
                    return self.reject(batch_id, "chunk for an unknown or superseded batch");
                };
                if seq != pending.next_seq {
                    let message = format!("chunk {} arrived, expected {}", seq, pending.next_seq);
                    return self.reject(batch_id, &message);
                }
                match chunk_checksum(&items) {
                    Ok(actual) if actual == checksum => {}
                    _ => return self.reject(batch_id, &format!("chunk {} checksum mismatch", seq)),
                }
                pending.next_seq += 1;
                pending.items.extend(items.into_iter().map(Arc::new));
            }
            Request::FullCommit { batch_id } => {
                let Some(pending) = self.batches.remove(&batch_id) else {
                    return self.reject(batch_id, "commit for an unknown or superseded batch");
                };
                if pending.next_seq != pending.chunk_count || pending.items.len() != pending.total_items {
                    let message = format!(
                        "incomplete batch: {}/{} chunks, {}/{} items",
                        pending.next_seq,
                        pending.chunk_count,
                        pending.items.len(),
                        pending.total_items
                    );
                    return self.reject(batch_id, &message);
                }
                let version = self.searcher.replace(pending.corpus, &pending.items);
                self.ready(pending.corpus, version, batch_id);
            }
            Request::Patch {
                batch_id,
                corpus,
                upserts,
                deletes,
            } => {
                let upserts: Vec<Arc<Item>> = upserts.into_iter().map(Arc::new).collect();
                let version = self.searcher.patch(corpus, &upserts, &deletes);
                self.ready(corpus, version, batch_id);
            }
            other => {
                tracing::warn!(kind = other.kind(), "query message on the index channel ignored");
            }
        }
    }

    fn reject(&mut self, batch_id: u64, message: &str) {
        self.batches.remove(&batch_id);
        tracing::warn!(batch_id, message, "rejected index batch");
        self.send(&Response::batch_rejected(batch_id, message));
    }

    fn ready(&self, corpus: Corpus, version: IndexVersion, batch_id: u64) {
        self.send(&Response::IndexReady {
            version,
            corpus,
            doc_count: self.searcher.index(corpus).len(),
            batch_id: Some(batch_id),
        });
    }

    fn handle_queries(
        &mut self,
        first: Vec<u8>,
        index_rx: &Receiver<Vec<u8>>,
        query_rx: &Receiver<Vec<u8>>,
    ) {
        // Mutations queued before this query must be visible to it.
        while let Ok(frame) = index_rx.try_recv() {
            self.handle_index(&frame);
        }

        let mut latest: Option<LatestQuery> = None;
        for frame in std::iter::once(first).chain(query_rx.try_iter()) {
            let Some(request) = self.decode_or_report(&frame) else {
                continue;
            };
            match request {
                Request::QueryRun {
                    request_id,
                    request,
                    ..
                } => {
                    if let Some(previous) = latest.replace(LatestQuery {
                        request_id,
                        request,
                    }) {
                        tracing::debug!(request_id = %previous.request_id, "query superseded before running");
                    }
                }
                Request::QueryCancel { request_id } => {
                    if latest.as_ref().is_some_and(|q| q.request_id == request_id) {
                        tracing::debug!(request_id = %request_id, "query cancelled before running");
                        latest = None;
                    }
                }
                other => {
                    tracing::warn!(kind = other.kind(), "index message on the query channel ignored");
                }
            }
        }

        if let Some(query) = latest {
            let result = self.searcher.search(&query.request, ExecutedBy::Background);
            self.send(&Response::QueryResult {
                request_id: query.request_id,
                result,
            });
        }
    }
}
