// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the quarry command-line interface.
//!
//! Four subcommands over JSON item feeds: `search` runs a query through the
//! same manager an application would use (background worker unless
//! `--local`), `facets` prints the facet groups for a query, `inspect` shows
//! index sizes, and `state` converts between query state and URL parameters.

pub mod display;

use clap::{Args, Parser, Subcommand, ValueEnum};
use quarry::{Scope, SortMode};

#[derive(Parser)]
#[command(
    name = "quarry",
    about = "Budgeted boolean search over a local archive of posts and comments",
    version
)]
pub struct Cli {
    /// JSON config file overriding search defaults
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    Authored,
    All,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Authored => Scope::Authored,
            ScopeArg::All => Scope::All,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    DateDesc,
    DateAsc,
    ScoreDesc,
    ScoreAsc,
    ReplyTo,
    Relevance,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::DateDesc => SortMode::DateDesc,
            SortArg::DateAsc => SortMode::DateAsc,
            SortArg::ScoreDesc => SortMode::ScoreDesc,
            SortArg::ScoreAsc => SortMode::ScoreAsc,
            SortArg::ReplyTo => SortMode::ReplyTo,
            SortArg::Relevance => SortMode::Relevance,
        }
    }
}

/// Feed files shared by the index-backed commands.
#[derive(Args)]
pub struct FeedArgs {
    /// Authored items (JSON array or {"items": [...]})
    pub feed: String,

    /// Context items (thread ancestors), searched with --scope all
    #[arg(long)]
    pub context: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query and print ranked results
    Search {
        #[command(flatten)]
        feeds: FeedArgs,

        /// Query in quarry syntax
        query: String,

        /// Scope selector; overrides any scope: directive in the query
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,

        #[arg(long, value_enum, default_value = "date-desc")]
        sort: SortArg,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Query budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,

        /// Skip the background worker
        #[arg(long)]
        local: bool,

        /// Also print facet groups
        #[arg(long)]
        facets: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print facet groups for a query
    Facets {
        #[command(flatten)]
        feeds: FeedArgs,

        query: String,

        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,

        #[arg(long)]
        json: bool,
    },

    /// Show index sizes for a feed
    Inspect {
        #[command(flatten)]
        feeds: FeedArgs,

        #[arg(long)]
        json: bool,
    },

    /// Convert between query state and URL parameters
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Query, scope and sort to a query string
    Encode {
        query: String,

        #[arg(long, value_enum, default_value = "authored")]
        scope: ScopeArg,

        #[arg(long, value_enum, default_value = "date-desc")]
        sort: SortArg,
    },

    /// Query string to query, scope and sort
    Decode {
        /// e.g. "?q=alpha+-beta&sort=relevance"
        query_string: String,
    },
}
