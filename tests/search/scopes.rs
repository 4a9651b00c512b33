//! Scope resolution and the context corpus.

use super::common::{archive, ids, loaded_searcher, search};
use quarry::testing::ItemBuilder;
use quarry::{Corpus, ExecutedBy, Scope, SearchConfig, SearchRequest, Searcher};

#[test]
fn test_context_is_hidden_by_default() {
    let result = search(&loaded_searcher(), SearchRequest::new("regex"));
    assert_eq!(ids(&result), vec!["c-budget", "c-regex"]);
    assert_eq!(result.scope, Scope::Authored);
}

#[test]
fn test_scope_directive_includes_context() {
    let result = search(&loaded_searcher(), SearchRequest::new("regex scope:all"));
    assert_eq!(ids(&result), vec!["c-budget", "c-regex", "ctx-thread"]);
    assert_eq!(result.scope, Scope::All);
    assert_eq!(result.canonical_query, "regex scope:all");
}

#[test]
fn test_explicit_scope_wins_over_directive() {
    let searcher = loaded_searcher();

    let result = search(&searcher, SearchRequest::new("regex").with_scope(Scope::All));
    assert_eq!(result.total, 3);
    assert!(result.diagnostics.warnings.is_empty());

    let result = search(
        &searcher,
        SearchRequest::new("regex scope:all").with_scope(Scope::Authored),
    );
    assert_eq!(result.scope, Scope::Authored);
    assert_eq!(result.total, 2);
    assert_eq!(result.diagnostics.warnings.len(), 1);
}

#[test]
fn test_last_directive_wins() {
    let result = search(
        &loaded_searcher(),
        SearchRequest::new("scope:all regex scope:authored"),
    );
    assert_eq!(result.scope, Scope::Authored);
    assert_eq!(result.total, 2);
}

#[test]
fn test_placement_differs_per_corpus() {
    // "engine" is a token only in the context corpus; authored falls back to
    // substring and finds nothing
    let searcher = loaded_searcher();
    let result = search(&searcher, SearchRequest::new("engine").with_scope(Scope::All));
    assert_eq!(ids(&result), vec!["ctx-thread"]);
    assert!(result.diagnostics.stage_b_scanned > 0);
}

#[test]
fn test_item_in_both_corpora_reported_once() {
    let mut searcher = Searcher::new(SearchConfig::default());
    let authored = archive();
    let duplicate = authored
        .iter()
        .find(|item| item.id == "p-budget")
        .cloned()
        .unwrap();
    searcher.set_items(Corpus::Authored, &authored);
    searcher.set_items(
        Corpus::Context,
        &[duplicate, ItemBuilder::post("ctx-only").body("budgets").build()],
    );

    let result = searcher.search(
        &SearchRequest::new("budgets").with_scope(Scope::All),
        ExecutedBy::Local,
    );
    assert_eq!(ids(&result), vec!["c-budget", "p-budget", "ctx-only"]);
    assert_eq!(result.total, 3);
}

#[test]
fn test_limit_truncates_after_ranking() {
    let result = search(&loaded_searcher(), SearchRequest::new("*").with_limit(3));
    assert_eq!(result.total, 7);
    assert_eq!(ids(&result), vec!["c-budget", "c-regex", "p-budget"]);
}
