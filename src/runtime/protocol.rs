// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wire format between the foreground manager and the background worker.
//!
//! Every frame is a JSON envelope `{"schema": N, "body": {...}}` where the
//! body is tagged by `type`:
//!
//! ```text
//! foreground → worker                     worker → foreground
//! index.full.start  {batchId, corpus,…}   index.ready  {version, corpus, docCount, batchId?}
//! index.full.chunk  {batchId, seq, crc,…} query.result {requestId, result}
//! index.full.commit {batchId}             error        {kind, message, requestId?, batchId?}
//! index.patch       {batchId, corpus,…}
//! query.run         {requestId, observedVersion, request}
//! query.cancel      {requestId}
//! ```
//!
//! The schema is checked before the body is decoded, so a peer speaking a
//! different version fails with [`QuarryError::SchemaMismatch`] instead of a
//! confusing field error.

use crate::error::{QuarryError, Result};
use crate::types::{Corpus, IndexVersion, Item, SearchRequest, SearchResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bumped on any incompatible change to the message shapes.
pub const SCHEMA_VERSION: u32 = 1;

/// Identifies one logical query inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Foreground to worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Request {
    #[serde(rename = "index.full.start")]
    FullStart {
        batch_id: u64,
        corpus: Corpus,
        total_items: usize,
        chunk_count: u32,
    },
    #[serde(rename = "index.full.chunk")]
    FullChunk {
        batch_id: u64,
        seq: u32,
        /// CRC32 of the JSON-encoded `items`.
        checksum: u32,
        items: Vec<Item>,
    },
    #[serde(rename = "index.full.commit")]
    FullCommit { batch_id: u64 },
    #[serde(rename = "index.patch")]
    Patch {
        batch_id: u64,
        corpus: Corpus,
        upserts: Vec<Item>,
        deletes: Vec<String>,
    },
    #[serde(rename = "query.run")]
    QueryRun {
        request_id: RequestId,
        observed_version: IndexVersion,
        request: SearchRequest,
    },
    #[serde(rename = "query.cancel")]
    QueryCancel { request_id: RequestId },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::FullStart { .. } => "index.full.start",
            Request::FullChunk { .. } => "index.full.chunk",
            Request::FullCommit { .. } => "index.full.commit",
            Request::Patch { .. } => "index.patch",
            Request::QueryRun { .. } => "query.run",
            Request::QueryCancel { .. } => "query.cancel",
        }
    }

    /// Whether this message belongs on the query channel.
    pub fn is_query(&self) -> bool {
        matches!(self, Request::QueryRun { .. } | Request::QueryCancel { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A chunked load or patch was refused; the sender should resend a full snapshot.
    BatchRejected,
    /// A frame could not be decoded.
    Deserialize,
    /// A frame carried another schema version.
    Schema,
}

impl ErrorKind {
    /// The channel can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorKind::BatchRejected)
    }
}

/// Worker to foreground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Response {
    #[serde(rename = "index.ready")]
    IndexReady {
        version: IndexVersion,
        corpus: Corpus,
        doc_count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batch_id: Option<u64>,
    },
    #[serde(rename = "query.result")]
    QueryResult {
        request_id: RequestId,
        result: SearchResult,
    },
    #[serde(rename = "error")]
    Error {
        kind: ErrorKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batch_id: Option<u64>,
    },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
            request_id: None,
            batch_id: None,
        }
    }

    pub fn batch_rejected(batch_id: u64, message: impl Into<String>) -> Self {
        Response::Error {
            kind: ErrorKind::BatchRejected,
            message: message.into(),
            request_id: None,
            batch_id: Some(batch_id),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    schema: u32,
    body: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    schema: u32,
    body: serde_json::Value,
}

/// Wrap `body` in a versioned envelope.
pub fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&Envelope {
        schema: SCHEMA_VERSION,
        body,
    })?)
}

/// Unwrap an envelope, checking the schema before decoding the body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let raw: RawEnvelope = serde_json::from_slice(bytes)?;
    if raw.schema != SCHEMA_VERSION {
        return Err(QuarryError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            actual: raw.schema,
        });
    }
    Ok(serde_json::from_value(raw.body)?)
}

/// CRC32 over the JSON encoding of a chunk's items.
pub fn chunk_checksum(items: &[Item]) -> Result<u32> {
    let bytes = serde_json::to_vec(items)?;
    Ok(crc32fast::hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_post;
    use crate::types::SortMode;

    #[test]
    fn test_request_tags_and_field_names() {
        let frame = encode(&Request::QueryRun {
            request_id: RequestId(3),
            observed_version: IndexVersion(9),
            request: SearchRequest::new("alpha").with_sort(SortMode::Relevance),
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(json["schema"], 1);
        assert_eq!(json["body"]["type"], "query.run");
        assert_eq!(json["body"]["requestId"], 3);
        assert_eq!(json["body"]["observedVersion"], 9);
        assert_eq!(json["body"]["request"]["sort"], "relevance");
    }

    #[test]
    fn test_round_trip_chunk() {
        let items = vec![(*make_post("a", 1, "alpha")).clone()];
        let request = Request::FullChunk {
            batch_id: 4,
            seq: 0,
            checksum: chunk_checksum(&items).unwrap(),
            items,
        };
        let decoded: Request = decode(&encode(&request).unwrap()).unwrap();
        assert_eq!(decoded, request);
        assert!(!decoded.is_query());
    }

    #[test]
    fn test_error_kind_names() {
        let frame = encode(&Response::batch_rejected(2, "out of order")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(json["body"]["type"], "error");
        assert_eq!(json["body"]["kind"], "batch-rejected");
        assert_eq!(json["body"]["batchId"], 2);
        assert!(json["body"].get("requestId").is_none());
    }

    #[test]
    fn test_schema_checked_first() {
        let frame = br#"{"schema": 99, "body": {"type": "nonsense"}}"#;
        let err = decode::<Response>(frame).unwrap_err();
        assert!(matches!(
            err,
            QuarryError::SchemaMismatch {
                expected: 1,
                actual: 99
            }
        ));
    }

    #[test]
    fn test_garbage_is_json_error() {
        let err = decode::<Response>(b"\x00\xffnot json").unwrap_err();
        assert!(matches!(err, QuarryError::Json(_)));
        assert!(err.disables_worker());
    }

    #[test]
    fn test_checksum_detects_changes() {
        let a = vec![(*make_post("a", 1, "alpha")).clone()];
        let b = vec![(*make_post("a", 1, "alpha!")).clone()];
        assert_ne!(chunk_checksum(&a).unwrap(), chunk_checksum(&b).unwrap());
        assert_eq!(chunk_checksum(&a).unwrap(), chunk_checksum(&a.clone()).unwrap());
    }
}
