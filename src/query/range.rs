// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `score:` and `date:` value grammars.
//!
//! | form   | score      | date                      |
//! |--------|------------|---------------------------|
//! | `x`    | `== x`     | that UTC day              |
//! | `>x`   | `> x`      | after that day            |
//! | `<x`   | `< x`      | before that day           |
//! | `a..b` | inclusive  | start of `a` to end of `b`|
//! | `a..`  | `>= a`     | from the start of `a`     |
//! | `..b`  | `<= b`     | through the end of `b`    |
//!
//! The original form is kept so the canonical query reads like what the user
//! typed. Bounds are resolved to inclusive `i64` pairs for evaluation.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::str::FromStr;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec<T> {
    Exact(T),
    Above(T),
    Below(T),
    Between(T, T),
    From(T),
    Through(T),
}

pub type ScoreRange = RangeSpec<i64>;
pub type DateRange = RangeSpec<NaiveDate>;

/// Inclusive resolved bounds. `None` means unbounded on that side; `empty`
/// marks a strict comparison past the end of `i64`, which admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub empty: bool,
}

impl Bounds {
    const NONE: Bounds = Bounds {
        min: None,
        max: None,
        empty: true,
    };

    fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Bounds {
            min,
            max,
            empty: false,
        }
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        !self.empty
            && self.min.map_or(true, |min| value >= min)
            && self.max.map_or(true, |max| value <= max)
    }
}

/// Why a range value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    Empty,
    BadValue(String),
    Inverted,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::Empty => f.write_str("missing value"),
            RangeError::BadValue(v) => write!(f, "cannot read `{}`", v),
            RangeError::Inverted => f.write_str("lower bound is above upper bound"),
        }
    }
}

/// A value usable as a range endpoint.
pub trait Endpoint: Copy + PartialOrd + fmt::Display {
    fn parse_endpoint(raw: &str) -> Option<Self>;
    /// Smallest timestamp/number covered by this endpoint.
    fn first(self) -> i64;
    /// Largest timestamp/number covered by this endpoint.
    fn last(self) -> i64;
}

impl Endpoint for i64 {
    fn parse_endpoint(raw: &str) -> Option<Self> {
        i64::from_str(raw).ok()
    }

    fn first(self) -> i64 {
        self
    }

    fn last(self) -> i64 {
        self
    }
}

/// UTC day bounds in milliseconds since the epoch.
fn day_start(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

impl Endpoint for NaiveDate {
    fn parse_endpoint(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    fn first(self) -> i64 {
        day_start(self)
    }

    fn last(self) -> i64 {
        day_start(self) + MS_PER_DAY - 1
    }
}

impl<T: Endpoint> RangeSpec<T> {
    pub fn parse(raw: &str) -> Result<Self, RangeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RangeError::Empty);
        }

        let endpoint = |s: &str| T::parse_endpoint(s).ok_or_else(|| RangeError::BadValue(s.into()));

        if let Some(rest) = raw.strip_prefix('>') {
            return Ok(RangeSpec::Above(endpoint(rest)?));
        }
        if let Some(rest) = raw.strip_prefix('<') {
            return Ok(RangeSpec::Below(endpoint(rest)?));
        }
        if let Some((lo, hi)) = raw.split_once("..") {
            return match (lo.is_empty(), hi.is_empty()) {
                (true, true) => Err(RangeError::Empty),
                (false, true) => Ok(RangeSpec::From(endpoint(lo)?)),
                (true, false) => Ok(RangeSpec::Through(endpoint(hi)?)),
                (false, false) => {
                    let (lo, hi) = (endpoint(lo)?, endpoint(hi)?);
                    if lo > hi {
                        Err(RangeError::Inverted)
                    } else {
                        Ok(RangeSpec::Between(lo, hi))
                    }
                }
            };
        }
        Ok(RangeSpec::Exact(endpoint(raw)?))
    }

    pub fn bounds(&self) -> Bounds {
        match *self {
            RangeSpec::Exact(v) => Bounds::new(Some(v.first()), Some(v.last())),
            RangeSpec::Above(v) => match v.last().checked_add(1) {
                Some(min) => Bounds::new(Some(min), None),
                None => Bounds::NONE,
            },
            RangeSpec::Below(v) => match v.first().checked_sub(1) {
                Some(max) => Bounds::new(None, Some(max)),
                None => Bounds::NONE,
            },
            RangeSpec::Between(lo, hi) => Bounds::new(Some(lo.first()), Some(hi.last())),
            RangeSpec::From(v) => Bounds::new(Some(v.first()), None),
            RangeSpec::Through(v) => Bounds::new(None, Some(v.last())),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.bounds().contains(value)
    }
}

impl<T: Endpoint> fmt::Display for RangeSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::Exact(v) => write!(f, "{}", v),
            RangeSpec::Above(v) => write!(f, ">{}", v),
            RangeSpec::Below(v) => write!(f, "<{}", v),
            RangeSpec::Between(lo, hi) => write!(f, "{}..{}", lo, hi),
            RangeSpec::From(v) => write!(f, "{}..", v),
            RangeSpec::Through(v) => write!(f, "..{}", v),
        }
    }
}
