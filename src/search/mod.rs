// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The query pipeline, shared by both execution contexts.
//!
//! ```text
//! parse ─► resolve scope ─► (downgrade regexes) ─► execute authored
//!                                                ─► execute context (scope:all)
//!       ─► dedupe ─► rank ─► total ─► limit ─► diagnostics
//! ```
//!
//! The worker and the foreground fallback both call [`run_search`] against
//! their own indexes. The only behavioral difference is regex handling: the
//! foreground must not run an expensive pattern on the caller's thread, so
//! with [`ExecutedBy::Local`] unsafe regex clauses are rewritten as plain
//! substring phrases before execution.

mod searcher;

pub use searcher::Searcher;

use crate::config::SearchConfig;
use crate::engine::{self, Budget};
use crate::index::CorpusIndex;
use crate::query::regex_guard::{is_fallback_safe, literal_text};
use crate::query::{parse_with_limits, resolve_scope, Clause, ClauseKind};
use crate::scoring::{rank, RankedHit};
use crate::types::{
    Corpus, Diagnostics, ExecutedBy, IndexVersion, Item, SearchRequest, SearchResult, SortMode,
};
use std::collections::HashSet;
use std::sync::Arc;

/// The two indexes a query can see.
#[derive(Debug, Clone, Copy)]
pub struct Corpora<'a> {
    pub authored: &'a CorpusIndex,
    pub context: &'a CorpusIndex,
}

impl<'a> Corpora<'a> {
    pub fn new(authored: &'a CorpusIndex, context: &'a CorpusIndex) -> Self {
        Self { authored, context }
    }

    pub fn get(&self, corpus: Corpus) -> &'a CorpusIndex {
        match corpus {
            Corpus::Authored => self.authored,
            Corpus::Context => self.context,
        }
    }

    /// Look an item up by id, authored first.
    pub fn item(&self, id: &str) -> Option<&'a Arc<Item>> {
        [self.authored, self.context]
            .into_iter()
            .find_map(|index| index.ordinal_of(id).map(|ordinal| index.item(ordinal)))
    }
}

/// Rewrite regex clauses that are not safe to run locally.
///
/// A pattern with literal characters becomes a phrase over them; one
/// without any is dropped. Returns whether anything changed.
pub fn downgrade_regexes(
    clauses: &mut Vec<Clause>,
    config: &SearchConfig,
    warnings: &mut Vec<String>,
) -> bool {
    let mut changed = false;
    clauses.retain_mut(|clause| {
        let ClauseKind::Regex(regex) = &clause.kind else {
            return true;
        };
        if is_fallback_safe(
            &regex.pattern,
            &regex.flags,
            config.fallback_regex_max_len,
            config.fallback_regex_size_limit,
        ) {
            return true;
        }

        changed = true;
        let shown = format!("/{}/{}", regex.pattern, regex.flags);
        match literal_text(&regex.pattern) {
            Some(text) => {
                warnings.push(format!(
                    "regex `{}` ran as plain text \"{}\" in the foreground",
                    shown, text
                ));
                clause.kind = ClauseKind::Phrase(text);
                true
            }
            None => {
                warnings.push(format!(
                    "regex `{}` skipped: too expensive to run in the foreground",
                    shown
                ));
                false
            }
        }
    });
    changed
}

fn hits<'a>(index: &'a CorpusIndex, execution: &engine::Execution) -> Vec<RankedHit<'a>> {
    execution
        .ordinals
        .iter()
        .enumerate()
        .map(|(i, &ordinal)| {
            let signals = execution.signals.get(i).copied().unwrap_or_default();
            RankedHit::new(index.doc(ordinal), signals)
        })
        .collect()
}

/// Run one request end to end. Never fails.
pub fn run_search(
    corpora: Corpora<'_>,
    version: IndexVersion,
    request: &SearchRequest,
    config: &SearchConfig,
    executed_by: ExecutedBy,
) -> SearchResult {
    let mut budget = Budget::new(
        request.budget_ms.unwrap_or(config.budget_ms),
        config.budget_check_interval,
    );

    let mut parsed = parse_with_limits(&request.query, config.regex_max_len);
    let (scope, scope_warning) = resolve_scope(&parsed, request.scope);

    let mut diagnostics = Diagnostics {
        warnings: std::mem::take(&mut parsed.warnings),
        parse_valid: parsed.valid,
        executed_by,
        ..Diagnostics::default()
    };
    diagnostics.warnings.extend(scope_warning);

    if executed_by == ExecutedBy::Local {
        diagnostics.regex_downgraded =
            downgrade_regexes(&mut parsed.clauses, config, &mut diagnostics.warnings);
    }

    let mut result = SearchResult {
        canonical_query: parsed.canonical.clone(),
        scope,
        index_version: version,
        ..SearchResult::default()
    };

    if parsed.is_executable() {
        let want_signals = request.sort == SortMode::Relevance;

        let authored = engine::execute(&parsed.clauses, corpora.authored, &mut budget, want_signals);
        let mut ranked = hits(corpora.authored, &authored);
        diagnostics.stage_a_count += authored.stage_a_count;
        diagnostics.stage_b_scanned += authored.stage_b_scanned;
        diagnostics.partial |= authored.partial;

        if scope.includes(Corpus::Context) {
            let context = engine::execute(&parsed.clauses, corpora.context, &mut budget, want_signals);
            diagnostics.stage_a_count += context.stage_a_count;
            diagnostics.stage_b_scanned += context.stage_b_scanned;
            diagnostics.partial |= context.partial;

            // An item archived in both corpora is reported once, as authored.
            let seen: HashSet<&str> = ranked.iter().map(|hit| hit.doc.id.as_str()).collect();
            let extra: Vec<RankedHit> = hits(corpora.context, &context)
                .into_iter()
                .filter(|hit| !seen.contains(hit.doc.id.as_str()))
                .collect();
            ranked.extend(extra);
        }

        rank(&mut ranked, request.sort, &config.weights);
        result.total = ranked.len();
        result.ids = ranked
            .iter()
            .take(request.limit.unwrap_or(usize::MAX))
            .map(|hit| hit.doc.id.clone())
            .collect();
    }

    diagnostics.elapsed_ms = budget.elapsed_ms();
    tracing::debug!(
        query = %result.canonical_query,
        scope = scope.as_str(),
        total = result.total,
        partial = diagnostics.partial,
        executed_by = ?executed_by,
        "search finished"
    );
    result.diagnostics = diagnostics;
    result
}
