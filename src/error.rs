// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Errors for the fallible plumbing around search.
//!
//! Searching itself never fails: parse problems become warnings, budget
//! exhaustion becomes a partial result, and a dead worker becomes a local
//! fallback. What can fail is everything around it: decoding a protocol
//! frame, loading a feed or config file, spawning the worker thread.

use thiserror::Error;

/// Main error type for quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: u32, actual: u32 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

/// Result type alias for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Whether this error means the background worker can no longer be trusted.
    ///
    /// Decode failures and schema drift poison the channel for the rest of
    /// the session; config and IO errors are the caller's problem.
    pub fn disables_worker(&self) -> bool {
        matches!(
            self,
            QuarryError::Json(_)
                | QuarryError::SchemaMismatch { .. }
                | QuarryError::Protocol(_)
                | QuarryError::WorkerUnavailable(_)
        )
    }
}
