// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Cooperative wall-clock budget.
//!
//! The engine loops call [`Budget::tick`] once per unit of work. Reading the
//! clock on every iteration would cost more than the work itself, so the
//! clock is only consulted every `check_every` ticks. Once the limit is
//! passed the budget stays exhausted and every later `tick` returns false.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
enum Limit {
    Wall(Duration),
    /// Deterministic limit in ticks, for tests and benchmarks.
    Ticks(u64),
    Unlimited,
}

#[derive(Debug, Clone)]
pub struct Budget {
    started: Instant,
    limit: Limit,
    check_every: u32,
    counter: u32,
    ticks: u64,
    exhausted: bool,
}

impl Budget {
    pub fn new(limit_ms: u64, check_every: u32) -> Self {
        Self::with_limit(Limit::Wall(Duration::from_millis(limit_ms)), check_every)
    }

    pub fn unlimited() -> Self {
        Self::with_limit(Limit::Unlimited, 1)
    }

    /// Exhausts after exactly `max` successful ticks.
    pub fn ticks(max: u64) -> Self {
        Self::with_limit(Limit::Ticks(max), 1)
    }

    fn with_limit(limit: Limit, check_every: u32) -> Self {
        Self {
            started: Instant::now(),
            limit,
            check_every: check_every.max(1),
            counter: 0,
            ticks: 0,
            exhausted: false,
        }
    }

    /// Account for one unit of work. Returns false once the budget is spent;
    /// the caller must not do the work it was about to do.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.limit {
            Limit::Unlimited => {}
            Limit::Ticks(max) => {
                if self.ticks >= max {
                    self.exhausted = true;
                    return false;
                }
            }
            Limit::Wall(limit) => {
                self.counter += 1;
                if self.counter >= self.check_every {
                    self.counter = 0;
                    if self.started.elapsed() >= limit {
                        self.exhausted = true;
                        return false;
                    }
                }
            }
        }
        self.ticks += 1;
        true
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Successful ticks so far.
    pub fn spent(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
