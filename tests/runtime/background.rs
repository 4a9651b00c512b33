//! The manager driving a real worker thread.

use super::common::{archive, archive_list, context_list};
use quarry::testing::{item_list, ItemBuilder};
use quarry::{
    ExecutedBy, Scope, SearchConfig, SearchManager, SearchRequest, SearchSession, SortMode,
};

fn manager(config: SearchConfig) -> SearchManager {
    let manager = SearchManager::new(config);
    assert!(manager.is_background(), "worker thread should start");
    manager
}

#[test]
fn test_background_answers_match_local_answers() {
    let mut background = manager(SearchConfig::default());
    let mut local = SearchManager::local(SearchConfig::default());
    for m in [&mut background, &mut local] {
        m.set_authored_items(archive_list(), 1);
        m.set_context_items(context_list());
    }

    let queries = [
        "budgets",
        "tomatoes -sun",
        "\"borrow checker\"",
        "author:ada type:comment",
        "score:5..10",
        "date:2025-01-01..2025-12-31",
        "regex scope:all",
        "*",
    ];
    let mut session = SearchSession::new();
    let mut local_session = SearchSession::new();
    for query in queries {
        for sort in [SortMode::DateDesc, SortMode::Relevance] {
            let request = SearchRequest::new(query).with_sort(sort).with_budget_ms(10_000);
            let remote = background.run_search(&mut session, request.clone());
            let here = local.run_search(&mut local_session, request);
            assert_eq!(remote.diagnostics.executed_by, ExecutedBy::Background, "{query}");
            assert_eq!(here.diagnostics.executed_by, ExecutedBy::Local);
            assert_eq!(remote.ids, here.ids, "{query} {sort:?}");
            assert_eq!(remote.total, here.total);
            assert_eq!(remote.canonical_query, here.canonical_query);
        }
    }

    assert_eq!(background.outstanding_batches(), 0);
    background.shutdown();
}

#[test]
fn test_chunked_load() {
    let mut manager = manager(SearchConfig {
        chunk_size: 2,
        ..SearchConfig::default()
    });
    manager.set_authored_items(archive_list(), 1);

    let mut session = SearchSession::new();
    let result = manager.run_search(&mut session, SearchRequest::new("*"));
    assert_eq!(result.total, 7);
    assert_eq!(result.diagnostics.executed_by, ExecutedBy::Background);
    assert_eq!(result.index_version, manager.observed_version());
    manager.shutdown();
}

#[test]
fn test_edits_reach_the_worker() {
    let mut manager = manager(SearchConfig::default());
    let mut items = archive();
    manager.set_authored_items(item_list(items.clone()), 1);
    let mut session = SearchSession::new();

    // Appended item goes out as a patch
    items.push(ItemBuilder::post("p-new").at(1).body("freshly written budgets").build());
    manager.set_authored_items(item_list(items.clone()), 2);
    let result = manager.run_search(&mut session, SearchRequest::new("budgets"));
    assert_eq!(result.ids, vec!["c-budget", "p-budget", "p-new"]);
    assert_eq!(result.diagnostics.executed_by, ExecutedBy::Background);

    // So does a removal
    items.retain(|item| item.id != "p-budget");
    manager.set_authored_items(item_list(items.clone()), 3);
    let result = manager.run_search(&mut session, SearchRequest::new("budgets"));
    assert_eq!(result.ids, vec!["c-budget", "p-new"]);
    assert_eq!(result.diagnostics.executed_by, ExecutedBy::Background);
    assert!(!result.diagnostics.stale_rerun);
    manager.shutdown();
}

#[test]
fn test_large_diff_reloads_in_full() {
    let mut manager = manager(SearchConfig {
        patch_max_items: 1,
        ..SearchConfig::default()
    });
    manager.set_authored_items(archive_list(), 1);

    let replaced = item_list(vec![
        ItemBuilder::post("x1").at(2).body("zebra").build(),
        ItemBuilder::post("x2").at(1).body("zebra crossing").build(),
    ]);
    manager.set_authored_items(replaced, 2);

    let mut session = SearchSession::new();
    let result = manager.run_search(&mut session, SearchRequest::new("zebra"));
    assert_eq!(result.ids, vec!["x1", "x2"]);
    assert_eq!(result.diagnostics.executed_by, ExecutedBy::Background);

    let result = manager.run_search(&mut session, SearchRequest::new("budgets"));
    assert!(result.ids.is_empty());
    manager.shutdown();
}

#[test]
fn test_newer_request_supersedes_older() {
    let mut manager = manager(SearchConfig::default());
    manager.set_authored_items(archive_list(), 1);

    let mut session = SearchSession::new();
    let first = manager.submit(&mut session, SearchRequest::new("tomatoes"));
    let second = manager.submit(&mut session, SearchRequest::new("budgets"));
    assert_eq!(session.current(), Some(second));
    assert_eq!(manager.wait(&mut session, first), None);

    let result = manager.wait(&mut session, second).unwrap();
    assert_eq!(result.ids, vec!["c-budget", "p-budget"]);
    assert_eq!(session.current(), None);
    manager.shutdown();
}

#[test]
fn test_facets_come_from_the_local_mirror() {
    let mut manager = manager(SearchConfig::default());
    manager.set_authored_items(archive_list(), 1);
    manager.set_context_items(context_list());

    let mut session = SearchSession::new();
    let request = SearchRequest::new("regex").with_scope(Scope::All);
    let result = manager.run_search(&mut session, request);
    let facets = manager.compute_facets(&result.ids, "regex");
    let authors = facets.group(quarry::FacetKey::Author).unwrap();
    assert_eq!(authors.options.len(), 3);
    manager.shutdown();
}
