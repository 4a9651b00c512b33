//! Invariants that hold for any input.

use proptest::prelude::*;
use quarry::engine::{execute, Budget};
use quarry::state::{decode, encode, PointerStore, QueryState};
use quarry::testing::ItemBuilder;
use quarry::{
    compute_facets, parse, Corpus, CorpusIndex, FacetKey, Item, Scope, SearchConfig, SortMode,
};
use std::sync::Arc;

fn items() -> impl Strategy<Value = Vec<Arc<Item>>> {
    prop::collection::vec(
        (
            prop::collection::vec(
                prop::sample::select(vec!["alpha", "beta", "gamma", "al", "be"]),
                0..6,
            ),
            prop::sample::select(vec!["Ada", "Grace", "ada", "Zoë"]),
            any::<bool>(),
            0i64..3_000_000_000_000,
        ),
        1..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (words, author, comment, at))| {
                let id = format!("i{i}");
                let builder = if comment {
                    ItemBuilder::comment(&id)
                } else {
                    ItemBuilder::post(&id)
                };
                builder.at(at).author(author).body(&words.join(" ")).build()
            })
            .collect()
    })
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "alpha", "beta", "-gamma", "al", "\"alpha beta\"", "-\"be al\"", "type:post", "*",
            "/a.p/", "author:ada",
        ]),
        1..4,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Whatever the budget, a partial answer is a subset of the full answer.
    #[test]
    fn prop_partial_results_are_a_subset(items in items(), query in query(), ticks in 0u64..200) {
        let index = CorpusIndex::build(Corpus::Authored, &items);
        let parsed = parse(&query);
        prop_assume!(parsed.is_executable());

        let full = execute(&parsed.clauses, &index, &mut Budget::unlimited(), false);
        let partial = execute(&parsed.clauses, &index, &mut Budget::ticks(ticks), false);
        prop_assert!(!full.partial);
        prop_assert!(
            partial.ordinals.iter().all(|o| full.ordinals.binary_search(o).is_ok()),
            "partial {:?} not within {:?}",
            partial.ordinals,
            full.ordinals
        );
        if !partial.partial {
            prop_assert_eq!(partial.ordinals, full.ordinals);
        }
    }

    /// Facet counts add up and never exceed the item count.
    #[test]
    fn prop_type_facet_partitions_items(items in items()) {
        let config = SearchConfig {
            facet_budget_ms: 60_000,
            ..SearchConfig::default()
        };
        let facets = compute_facets(&items, "*", &config);
        prop_assert!(!facets.delayed);

        let types = facets.group(FacetKey::Type).unwrap();
        let total: usize = types.options.iter().map(|o| o.count).sum();
        prop_assert_eq!(total, items.len());

        let authors = facets.group(FacetKey::Author).unwrap();
        prop_assert!(authors.options.len() <= config.top_authors);
        prop_assert!(authors.options.windows(2).all(|w| w[0].count >= w[1].count));
    }

    /// Any query text survives the page address, overflowing or not.
    #[test]
    fn prop_query_state_survives_the_address(
        query in "[~a-z \"*:-]{0,40}",
        limit in 1usize..60,
        all in any::<bool>(),
    ) {
        let mut store = PointerStore::new(4);
        let state = QueryState {
            query,
            scope: if all { Scope::All } else { Scope::Authored },
            sort: SortMode::Relevance,
        };
        let decoded = decode(&encode(&state, &mut store, limit), &store);
        prop_assert!(!decoded.pointer_missing);
        prop_assert_eq!(decoded.state, state);
    }
}
