// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Two execution contexts for the same search code.
//!
//! The background worker is what normally answers queries; the foreground
//! [`SearchManager`] keeps a local copy of every index so it can answer on
//! its own when the worker is slow, stale or gone.

pub mod manager;
pub mod mirror;
pub mod protocol;
pub mod worker;

pub use manager::{SearchManager, SearchSession};
pub use mirror::{plan_mirror, Mirror, MirrorPlan};
pub use protocol::{ErrorKind, Request, RequestId, Response, SCHEMA_VERSION};
pub use worker::WorkerHandle;
