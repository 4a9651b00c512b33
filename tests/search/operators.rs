//! One operator at a time, then combinations.
//!
//! Archive by date, newest first:
//!
//! ```text
//! c-budget  2025-02-03  ada    → grace   "budgets are fine until the regex is slow"
//! c-regex   2025-02-01  grace  → alan    "regex colour matching see issue 1234"
//! p-budget  2025-01-20  grace            "search budgets" / "time budgets keep ..."
//! c-tomato  2024-06-13  ada    → grace   "tomatoes need more sun than you think"
//! p-garden  2024-06-12  ada              "garden log" / "tomatoes ripened early ..."
//! c-borrow  2024-03-02  grace  → ada     "the borrow checker saved me twice ..."
//! p-rust    2024-03-01  ada              "rust ownership notes" / "borrowing rules ..."
//! ```

use super::common::{loaded_searcher, query_ids, search};
use quarry::SearchRequest;

fn assert_ids(query: &str, expected: &[&str]) {
    assert_eq!(query_ids(query), expected, "query {query:?}");
}

#[test]
fn test_single_terms() {
    assert_ids("budgets", &["c-budget", "p-budget"]);
    assert_ids("TOMATOES", &["c-tomato", "p-garden"]);
    assert_ids("1234", &["c-regex"]);
}

#[test]
fn test_terms_are_conjunctive() {
    assert_ids("regex budgets", &["c-budget"]);
    assert_ids("tomatoes sun", &["c-tomato"]);
    assert_ids("tomatoes lifetimes", &[]);
}

#[test]
fn test_indexed_term_matches_whole_tokens() {
    // "borrow" is a token, so "borrowing" in p-rust does not count
    assert_ids("borrow", &["c-borrow"]);
    // "borr" is not, so it falls back to substring
    assert_ids("borr", &["c-borrow", "p-rust"]);
}

#[test]
fn test_negation() {
    assert_ids("tomatoes -sun", &["p-garden"]);
    assert_ids("budgets -\"regex is slow\"", &["p-budget"]);
}

#[test]
fn test_phrase() {
    assert_ids("\"borrow checker\"", &["c-borrow"]);
    assert_ids("\"checker borrow\"", &[]);
    // title and body are one continuous text for phrases
    assert_ids("\"garden log tomatoes\"", &["p-garden"]);
}

#[test]
fn test_markup_is_stripped() {
    assert_ids("lifetimes", &["p-rust"]);
    assert_ids("\"colour matching\"", &["c-regex"]);
}

#[test]
fn test_regex() {
    assert_ids("/colou?r/", &["c-regex"]);
    assert_ids("/tim[ea]/", &["p-budget"]);
}

#[test]
fn test_type_filter() {
    assert_ids("type:post", &["p-budget", "p-garden", "p-rust"]);
    assert_ids("type:comment budgets", &["c-budget"]);
}

#[test]
fn test_author_and_reply_filters() {
    assert_ids("author:ada", &["c-budget", "c-tomato", "p-garden", "p-rust"]);
    assert_ids("author:\"Ada Lovelace\" tomatoes", &["c-tomato", "p-garden"]);
    assert_ids("author:\"lovelace ada\"", &[]);
    assert_ids("replyto:grace", &["c-budget", "c-tomato"]);
    assert_ids("-replyto:grace type:comment", &["c-regex", "c-borrow"]);
}

#[test]
fn test_score_ranges() {
    assert_ids("score:>10", &["p-budget", "p-rust"]);
    assert_ids("score:5..10", &["c-regex", "p-garden"]);
    assert_ids("score:<0", &["c-tomato"]);
    assert_ids("score:42", &["p-rust"]);
}

#[test]
fn test_date_ranges() {
    assert_ids("date:2024-03-02", &["c-borrow"]);
    assert_ids("date:<2024-06-01", &["c-borrow", "p-rust"]);
    assert_ids(
        "date:2025-01-01..2025-12-31",
        &["c-budget", "c-regex", "p-budget"],
    );
    assert_ids("date:>2025-01-31 type:comment", &["c-budget", "c-regex"]);
}

#[test]
fn test_wildcard_selects_everything() {
    assert_eq!(query_ids("*").len(), 7);
    assert_ids("* -type:comment", &["p-budget", "p-garden", "p-rust"]);
}

#[test]
fn test_only_negations_is_rejected() {
    let result = search(&loaded_searcher(), SearchRequest::new("-budgets"));
    assert!(result.ids.is_empty());
    assert_eq!(result.total, 0);
    assert!(!result.diagnostics.parse_valid);
    assert!(!result.diagnostics.warnings.is_empty());
}

#[test]
fn test_bad_values_warn_but_rest_runs() {
    let result = search(&loaded_searcher(), SearchRequest::new("budgets score:lots"));
    assert_eq!(result.ids, vec!["c-budget", "p-budget"]);
    assert!(result.diagnostics.parse_valid);
    assert_eq!(result.diagnostics.warnings.len(), 1);
    assert_eq!(result.canonical_query, "budgets");
}

#[test]
fn test_empty_query_matches_nothing() {
    let result = search(&loaded_searcher(), SearchRequest::new("   "));
    assert!(result.ids.is_empty());
    assert!(result.diagnostics.warnings.is_empty());
}
