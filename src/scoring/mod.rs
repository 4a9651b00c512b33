// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring and ranking: how matches get ordered.
//!
//! There is no learned model here. Relevance is one fixed linear heuristic
//! over four signals, and every sort mode ends in the same deterministic
//! tail-break.

pub mod core;
pub mod ranking;

pub use self::core::{relevance_score, Signals};
pub use ranking::{compare_hits, rank, tail_break, RankedHit};
