//! Shared test fixtures.

#![allow(dead_code)]

use quarry::testing::{item_list, utc_ms, ItemBuilder};
use quarry::{
    Corpus, Item, ItemList, SearchConfig, SearchRequest, SearchResult, Searcher, ExecutedBy,
};
use std::sync::Arc;

pub use quarry::testing::{make_comment, make_post};

// ============================================================================
// ARCHIVE FIXTURE
// ============================================================================

/// A small archive: three posts and four comments by two people, across
/// two years, plus one context item (a parent post by someone else).
pub fn archive() -> Vec<Arc<Item>> {
    vec![
        ItemBuilder::post("p-rust")
            .at(utc_ms(2024, 3, 1, 9))
            .score(42)
            .title("Rust ownership notes")
            .author("Ada Lovelace")
            .body("Borrowing rules and *lifetimes* explained")
            .build(),
        ItemBuilder::post("p-garden")
            .at(utc_ms(2024, 6, 12, 18))
            .score(7)
            .title("Garden log")
            .author("Ada Lovelace")
            .body("Tomatoes ripened early this year")
            .build(),
        ItemBuilder::post("p-budget")
            .at(utc_ms(2025, 1, 20, 8))
            .score(15)
            .title("Search budgets")
            .author("Grace Hopper")
            .body("Time budgets keep search responsive")
            .build(),
        ItemBuilder::comment("c-borrow")
            .at(utc_ms(2024, 3, 2, 10))
            .score(3)
            .author("Grace Hopper")
            .reply_to("Ada Lovelace")
            .body("The borrow checker saved me twice this week")
            .build(),
        ItemBuilder::comment("c-tomato")
            .at(utc_ms(2024, 6, 13, 7))
            .score(-2)
            .author("Ada Lovelace")
            .reply_to("Grace Hopper")
            .body("Tomatoes need more sun than you think")
            .build(),
        ItemBuilder::comment("c-regex")
            .at(utc_ms(2025, 2, 1, 12))
            .score(9)
            .author("Grace Hopper")
            .reply_to("Alan Turing")
            .html("<p>Regex <b>colour</b> matching, see issue 1234</p>")
            .build(),
        ItemBuilder::comment("c-budget")
            .at(utc_ms(2025, 2, 3, 12))
            .score(1)
            .author("Ada Lovelace")
            .reply_to("Grace Hopper")
            .body("Budgets are fine until the regex is slow")
            .build(),
    ]
}

pub fn context() -> Vec<Arc<Item>> {
    vec![ItemBuilder::post("ctx-thread")
        .at(utc_ms(2025, 1, 31, 9))
        .score(120)
        .title("Ask: regex engines and budgets")
        .author("Alan Turing")
        .body("Which regex engine bounds its run time?")
        .build()]
}

pub fn archive_list() -> ItemList {
    item_list(archive())
}

pub fn context_list() -> ItemList {
    item_list(context())
}

/// A searcher with the archive and context loaded.
pub fn loaded_searcher() -> Searcher {
    let mut searcher = Searcher::new(SearchConfig::default());
    searcher.set_items(Corpus::Authored, &archive());
    searcher.set_items(Corpus::Context, &context());
    searcher
}

/// Run a query with a generous budget so timing never matters.
pub fn search(searcher: &Searcher, request: SearchRequest) -> SearchResult {
    searcher.search(&request.with_budget_ms(10_000), ExecutedBy::Local)
}

pub fn ids(result: &SearchResult) -> Vec<&str> {
    result.ids.iter().map(String::as_str).collect()
}

/// Ids of a query against the loaded fixture, default sort.
pub fn query_ids(query: &str) -> Vec<String> {
    search(&loaded_searcher(), SearchRequest::new(query)).ids
}
