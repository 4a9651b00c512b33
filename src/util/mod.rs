// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Utility modules for string processing.
//!
//! Text normalization lives here because both sides of every comparison need
//! it: the index at build time and the parser at query time.

pub mod normalize;
