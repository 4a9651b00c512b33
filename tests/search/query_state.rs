//! Query state through the page address, end to end.

use super::common::{loaded_searcher, search};
use quarry::state::{decode, encode, PointerStore, QueryState};
use quarry::{Scope, SearchConfig, SearchRequest, SortMode};

#[test]
fn test_restored_state_reproduces_the_search() {
    let config = SearchConfig::default();
    let mut store = PointerStore::new(config.pointer_store_capacity);
    let state = QueryState {
        query: "regex -\"is slow\"".to_string(),
        scope: Scope::All,
        sort: SortMode::ScoreDesc,
    };

    let address = encode(&state, &mut store, config.url_max_query_len);
    let restored = decode(&address, &store);
    assert_eq!(restored.state, state);

    let searcher = loaded_searcher();
    let request = SearchRequest::new(restored.state.query)
        .with_scope(restored.state.scope)
        .with_sort(restored.state.sort);
    assert_eq!(search(&searcher, request).ids, vec!["ctx-thread", "c-regex"]);
}

#[test]
fn test_overlong_query_survives_only_in_session() {
    let mut store = PointerStore::new(2);
    let long = format!("budgets {}", "-nothing ".repeat(30));
    let address = encode(&QueryState::new(long.clone()), &mut store, 80);
    assert!(address.len() < 80);
    assert_eq!(decode(&address, &store).state.query, long);

    // A fresh session has no pointer to follow
    let other_session = PointerStore::new(2);
    let decoded = decode(&address, &other_session);
    assert!(decoded.pointer_missing);
    assert!(decoded.state.query.is_empty());
}
