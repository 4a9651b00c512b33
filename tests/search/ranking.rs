//! Sort modes and the shared tail-break.

use super::common::{ids, loaded_searcher, search};
use quarry::testing::{utc_ms, ItemBuilder};
use quarry::{Corpus, SearchConfig, SearchRequest, Searcher, SortMode};

fn sorted(query: &str, sort: SortMode) -> Vec<String> {
    search(&loaded_searcher(), SearchRequest::new(query).with_sort(sort)).ids
}

#[test]
fn test_date_modes() {
    assert_eq!(
        sorted("type:post", SortMode::DateDesc),
        vec!["p-budget", "p-garden", "p-rust"]
    );
    assert_eq!(
        sorted("type:post", SortMode::DateAsc),
        vec!["p-rust", "p-garden", "p-budget"]
    );
}

#[test]
fn test_score_modes() {
    assert_eq!(
        sorted("author:grace", SortMode::ScoreDesc),
        vec!["p-budget", "c-regex", "c-borrow"]
    );
    assert_eq!(
        sorted("author:grace", SortMode::ScoreAsc),
        vec!["c-borrow", "c-regex", "p-budget"]
    );
}

#[test]
fn test_reply_to_mode_puts_untargeted_last() {
    assert_eq!(
        sorted("author:ada", SortMode::ReplyTo),
        vec!["c-budget", "c-tomato", "p-garden", "p-rust"]
    );
    assert_eq!(
        sorted("type:comment", SortMode::ReplyTo),
        vec!["c-borrow", "c-regex", "c-budget", "c-tomato"]
    );
}

#[test]
fn test_ties_break_by_timestamp_then_id() {
    let mut searcher = Searcher::new(SearchConfig::default());
    let at = utc_ms(2025, 5, 5, 5);
    searcher.set_items(
        Corpus::Authored,
        &[
            ItemBuilder::post("b").at(at).score(1).body("same").build(),
            ItemBuilder::post("c").at(at + 1).score(1).body("same").build(),
            ItemBuilder::post("a").at(at).score(1).body("same").build(),
        ],
    );
    let result = search(&searcher, SearchRequest::new("same").with_sort(SortMode::ScoreDesc));
    assert_eq!(ids(&result), vec!["c", "a", "b"]);
}

#[test]
fn test_relevance_rewards_author_match() {
    let mut searcher = Searcher::new(SearchConfig::default());
    searcher.set_items(
        Corpus::Authored,
        &[
            ItemBuilder::post("mention")
                .at(utc_ms(2025, 2, 1, 0))
                .author("Bob")
                .body("ada wrote about lifetimes")
                .build(),
            ItemBuilder::post("by-ada")
                .at(utc_ms(2024, 2, 1, 0))
                .author("Ada")
                .body("ada on lifetimes")
                .build(),
        ],
    );

    let by_date = search(&searcher, SearchRequest::new("ada lifetimes"));
    assert_eq!(ids(&by_date), vec!["mention", "by-ada"]);

    let by_relevance = search(
        &searcher,
        SearchRequest::new("ada lifetimes").with_sort(SortMode::Relevance),
    );
    assert_eq!(ids(&by_relevance), vec!["by-ada", "mention"]);
}

#[test]
fn test_every_mode_returns_the_same_set() {
    let searcher = loaded_searcher();
    let mut expected = search(&searcher, SearchRequest::new("*")).ids;
    expected.sort();
    for mode in SortMode::ALL {
        let mut got = search(&searcher, SearchRequest::new("*").with_sort(mode)).ids;
        got.sort();
        assert_eq!(got, expected, "mode {:?}", mode);
    }
}
