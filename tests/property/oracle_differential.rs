//! Differential testing: the engine against the naive evaluator.
//!
//! If they disagree, the oracle is right.

use super::oracles::{oracle_query, oracle_search, OracleClause};
use proptest::prelude::*;
use quarry::testing::ItemBuilder;
use quarry::{Corpus, CorpusIndex, ExecutedBy, Item, ItemKind, SearchConfig, SearchRequest, Searcher};
use std::sync::Arc;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Document words. "alphabet" and "rustacean" overlap other words so the
/// token/substring split gets exercised.
const DOC_WORDS: &[&str] = &[
    "alpha", "alphabet", "beta", "gamma", "delta", "rust", "rustacean", "ok",
];

/// Query words: document words plus pure substrings and a miss.
const QUERY_WORDS: &[&str] = &[
    "alpha", "alphabet", "beta", "gamma", "rust", "rustacean", "al", "eta", "stace", "zzz", "ok",
];

fn doc_item(ordinal: usize) -> impl Strategy<Value = Arc<Item>> {
    (
        prop::collection::vec(prop::sample::select(DOC_WORDS), 0..5),
        prop::collection::vec(prop::sample::select(DOC_WORDS), 0..7),
        any::<bool>(),
        -3i64..4,
    )
        .prop_map(move |(title, body, comment, score)| {
            let id = format!("d{:02}", ordinal);
            let builder = if comment {
                ItemBuilder::comment(&id)
            } else {
                ItemBuilder::post(&id)
            };
            let mut builder = builder.at(ordinal as i64 * 1_000).score(score);
            if !title.is_empty() {
                builder = builder.title(&title.join(" "));
            }
            builder.body(&body.join(" ")).build()
        })
}

fn corpus() -> impl Strategy<Value = Vec<Arc<Item>>> {
    (1usize..20).prop_flat_map(|n| (0..n).map(doc_item).collect::<Vec<_>>())
}

fn clause() -> impl Strategy<Value = OracleClause> {
    prop_oneof![
        4 => prop::sample::select(QUERY_WORDS).prop_map(|w| OracleClause::Term(w.to_string())),
        2 => (prop::sample::select(QUERY_WORDS), prop::sample::select(DOC_WORDS))
            .prop_map(|(a, b)| OracleClause::Phrase(format!("{} {}", a, b))),
        1 => prop::sample::select(vec![ItemKind::Post, ItemKind::Comment]).prop_map(OracleClause::Type),
        1 => (-3i64..3).prop_map(OracleClause::ScoreAbove),
    ]
}

fn query() -> impl Strategy<Value = (Vec<OracleClause>, Vec<OracleClause>)> {
    (
        prop::collection::vec(clause(), 1..4),
        prop::collection::vec(clause(), 0..3),
    )
}

fn searcher(items: &[Arc<Item>]) -> Searcher {
    let mut searcher = Searcher::new(SearchConfig::default());
    searcher.set_items(Corpus::Authored, items);
    searcher
}

// =============================================================================
// ENGINE vs ORACLE
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The engine returns exactly the oracle's match set.
    #[test]
    fn diff_search_matches_oracle(items in corpus(), (positive, negative) in query()) {
        let searcher = searcher(&items);
        let docs = CorpusIndex::build(Corpus::Authored, &items).docs().to_vec();
        let query = oracle_query(&positive, &negative);

        let result = searcher.search(
            &SearchRequest::new(query.clone()).with_budget_ms(60_000),
            ExecutedBy::Background,
        );
        prop_assert!(!result.diagnostics.partial);

        let mut got = result.ids.clone();
        got.sort();
        let expected = oracle_search(&docs, &positive, &negative);
        prop_assert_eq!(got, expected, "query {:?}", query);
    }

    /// Default order is newest first, and timestamps here are unique.
    #[test]
    fn diff_default_order_is_date_desc(items in corpus(), (positive, negative) in query()) {
        let searcher = searcher(&items);
        let query = oracle_query(&positive, &negative);
        let result = searcher.search(
            &SearchRequest::new(query).with_budget_ms(60_000),
            ExecutedBy::Background,
        );
        let mut expected = result.ids.clone();
        expected.sort_by(|a, b| b.cmp(a));
        prop_assert_eq!(result.ids, expected);
    }

    /// Adding a negation can only remove results.
    #[test]
    fn diff_negation_narrows(items in corpus(), (positive, _) in query(), extra in clause()) {
        let searcher = searcher(&items);
        let base = oracle_query(&positive, &[]);
        let narrowed = oracle_query(&positive, std::slice::from_ref(&extra));

        let run = |q: String| {
            searcher
                .search(&SearchRequest::new(q).with_budget_ms(60_000), ExecutedBy::Background)
                .ids
        };
        let wide = run(base);
        let narrow = run(narrowed);
        prop_assert!(narrow.iter().all(|id| wide.contains(id)));
    }
}
