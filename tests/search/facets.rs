//! Facets over search results.

use super::common::{loaded_searcher, search};
use quarry::{FacetKey, SearchRequest};

fn labels_and_counts(facets: &quarry::FacetResult, key: FacetKey) -> Vec<(String, usize)> {
    facets
        .group(key)
        .map(|group| {
            group
                .options
                .iter()
                .map(|option| (option.label.clone(), option.count))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_facets_for_everything() {
    let searcher = loaded_searcher();
    let result = search(&searcher, SearchRequest::new("*"));
    let facets = searcher.facets(&result.ids, "*");

    assert!(!facets.delayed);
    assert_eq!(
        labels_and_counts(&facets, FacetKey::Type),
        vec![("post".to_string(), 3), ("comment".to_string(), 4)]
    );
    assert_eq!(
        labels_and_counts(&facets, FacetKey::Author),
        vec![("Ada Lovelace".to_string(), 4), ("Grace Hopper".to_string(), 3)]
    );
    assert_eq!(
        labels_and_counts(&facets, FacetKey::Year),
        vec![("2025".to_string(), 3), ("2024".to_string(), 4)]
    );
}

#[test]
fn test_fragments_refine_the_query() {
    let searcher = loaded_searcher();
    let result = search(&searcher, SearchRequest::new("*"));
    let facets = searcher.facets(&result.ids, "*");

    let fragments: Vec<&str> = facets
        .groups
        .iter()
        .flat_map(|group| group.options.iter().map(|option| option.fragment.as_str()))
        .collect();
    assert_eq!(
        fragments,
        vec![
            "type:post",
            "type:comment",
            "author:\"ada lovelace\"",
            "author:\"grace hopper\"",
            "date:2025-01-01..2025-12-31",
            "date:2024-01-01..2024-12-31",
        ]
    );

    // Applying a fragment narrows the results to exactly that count
    for group in &facets.groups {
        for option in &group.options {
            let refined = search(&searcher, SearchRequest::new(option.fragment.clone()));
            assert_eq!(refined.total, option.count, "fragment {}", option.fragment);
        }
    }
}

#[test]
fn test_active_options_follow_the_query() {
    let searcher = loaded_searcher();
    let query = "type:comment author:\"ada lovelace\"";
    let result = search(&searcher, SearchRequest::new(query));
    let facets = searcher.facets(&result.ids, query);

    let comment = &facets.group(FacetKey::Type).unwrap().options[0];
    assert_eq!(comment.label, "comment");
    assert!(comment.active);

    let author = &facets.group(FacetKey::Author).unwrap().options[0];
    assert_eq!(author.count, 2);
    assert!(author.active);
}

#[test]
fn test_single_year_has_no_year_group() {
    let searcher = loaded_searcher();
    let result = search(&searcher, SearchRequest::new("tomatoes"));
    let facets = searcher.facets(&result.ids, "tomatoes");
    assert!(facets.group(FacetKey::Year).is_none());
    assert!(facets.group(FacetKey::Type).is_some());
}
