// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use quarry::state::{self, PointerStore, QueryState};
use quarry::{
    load_feed, Corpus, FacetResult, Item, ItemList, SearchConfig, SearchManager, SearchRequest,
    SearchResult, SearchSession,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::display::{self, themed, BOLD, CYAN, DIM, GRAY};
use cli::{Cli, Commands, FeedArgs, StateAction};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUARRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SearchConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path))?,
        None => SearchConfig::default(),
    };

    match cli.command {
        Commands::Search {
            feeds,
            query,
            scope,
            sort,
            limit,
            budget_ms,
            local,
            facets,
            json,
        } => {
            let mut request = SearchRequest::new(query).with_sort(sort.into());
            if let Some(scope) = scope {
                request = request.with_scope(scope.into());
            }
            if let Some(budget_ms) = budget_ms {
                request = request.with_budget_ms(budget_ms);
            }
            let budget = request.budget_ms.unwrap_or(config.budget_ms);

            let (mut manager, items) = open(&feeds, config, local)?;
            let mut session = SearchSession::new();
            let result = manager.run_search(&mut session, request.clone());
            let facet_result = facets.then(|| manager.compute_facets(&result.ids, &request.query));
            manager.shutdown();

            if json {
                let mut shown = result.clone();
                shown.ids.truncate(limit);
                let out = serde_json::json!({ "result": shown, "facets": facet_result });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_results(&result, &items, limit, budget);
                if let Some(facet_result) = &facet_result {
                    print_facets(facet_result);
                }
            }
        }

        Commands::Facets {
            feeds,
            query,
            scope,
            json,
        } => {
            let mut request = SearchRequest::new(query);
            if let Some(scope) = scope {
                request = request.with_scope(scope.into());
            }
            let (mut manager, _) = open(&feeds, config, true)?;
            let mut session = SearchSession::new();
            let result = manager.run_search(&mut session, request.clone());
            let facet_result = manager.compute_facets(&result.ids, &request.query);

            if json {
                println!("{}", serde_json::to_string_pretty(&facet_result)?);
            } else {
                print_facets(&facet_result);
            }
        }

        Commands::Inspect { feeds, json } => {
            let (manager, _) = open(&feeds, config, true)?;
            let stats = manager.local_searcher().stats();
            let version = manager.observed_version();

            if json {
                let out = serde_json::json!({ "version": version, "corpora": stats });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                display::section_top("INDEX");
                for stat in &stats {
                    display::row(&format!(
                        "{} {:>8} docs {:>10} postings",
                        display::pad_right(&themed(CYAN, &[BOLD], stat.corpus.as_str()), 10),
                        stat.docs,
                        stat.postings
                    ));
                    display::row(&themed(
                        GRAY,
                        &[DIM],
                        &format!(
                            "           {} content / {} author / {} reply-to tokens",
                            stat.content_tokens, stat.author_tokens, stat.reply_to_tokens
                        ),
                    ));
                }
                display::section_bot();
            }
        }

        Commands::State { action } => {
            let mut store = PointerStore::new(config.pointer_store_capacity);
            match action {
                StateAction::Encode { query, scope, sort } => {
                    let query_state = QueryState {
                        query,
                        scope: scope.into(),
                        sort: sort.into(),
                    };
                    println!("?{}", state::encode(&query_state, &mut store, config.url_max_query_len));
                }
                StateAction::Decode { query_string } => {
                    let decoded = state::decode(&query_string, &store);
                    let out = serde_json::json!({
                        "state": decoded.state,
                        "pointerMissing": decoded.pointer_missing,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
    }

    Ok(())
}

/// Load the feeds into a manager. Authored items get revision 1; the CLI
/// never changes them afterwards.
fn open(
    feeds: &FeedArgs,
    config: SearchConfig,
    local: bool,
) -> Result<(SearchManager, HashMap<String, Arc<Item>>)> {
    let authored = load_feed(&feeds.feed).with_context(|| format!("failed to read {}", feeds.feed))?;
    let context: Option<ItemList> = feeds
        .context
        .as_ref()
        .map(|path| load_feed(path).with_context(|| format!("failed to read {}", path)))
        .transpose()?;

    let mut lookup = HashMap::new();
    for item in context.iter().flat_map(|list| list.iter()).chain(authored.iter()) {
        lookup.insert(item.id.clone(), Arc::clone(item));
    }

    let mut manager = if local {
        SearchManager::local(config)
    } else {
        SearchManager::new(config)
    };
    manager.set_authored_items(authored, 1);
    if let Some(context) = context {
        manager.set_context_items(context);
    }
    tracing::debug!(
        authored = manager.local_searcher().index(Corpus::Authored).len(),
        context = manager.local_searcher().index(Corpus::Context).len(),
        "feeds indexed"
    );
    Ok((manager, lookup))
}

fn print_results(result: &SearchResult, items: &HashMap<String, Arc<Item>>, limit: usize, budget_ms: u64) {
    let diagnostics = &result.diagnostics;
    let mut header = format!(
        "{} of {} for {}  {}  {}",
        result.ids.len().min(limit),
        result.total,
        themed(CYAN, &[BOLD], &result.canonical_query),
        display::executed_by_label(diagnostics.executed_by),
        display::timing_ms(diagnostics.elapsed_ms, budget_ms),
    );
    for flag in display::diagnostic_flags(diagnostics) {
        header.push_str("  ");
        header.push_str(&flag);
    }

    display::section_top("RESULTS");
    display::row(&header);
    for warning in &diagnostics.warnings {
        display::row(&display::warning(warning));
    }
    display::section_mid(&format!("scope {}", result.scope.as_str()));
    for id in result.ids.iter().take(limit) {
        let Some(item) = items.get(id) else {
            display::row(&themed(GRAY, &[], id));
            continue;
        };
        let headline = item
            .title
            .as_deref()
            .or(item.body_markdown.as_deref())
            .or(item.body_html.as_deref())
            .unwrap_or("");
        let headline = display::truncate(&headline.split_whitespace().collect::<Vec<_>>().join(" "), 44);
        display::row(&format!(
            "{} {} {} {} {}",
            display::kind_badge(item.kind),
            themed(GRAY, &[], &display::posted_date(item.posted_at)),
            display::score_value(item.score),
            display::pad_right(&display::truncate(item.author.as_deref().unwrap_or("-"), 12), 12),
            headline
        ));
    }
    display::section_bot();
}

fn print_facets(facets: &FacetResult) {
    let label = if facets.delayed { "FACETS (partial)" } else { "FACETS" };
    display::section_top(label);
    for group in &facets.groups {
        display::row(&themed(CYAN, &[BOLD], group.key.as_str()));
        for option in &group.options {
            let marker = if option.active { "●" } else { " " };
            display::row(&format!(
                "  {} {} {:>6}  {}",
                marker,
                display::pad_right(&display::truncate(&option.label, 24), 24),
                option.count,
                themed(GRAY, &[DIM], &option.fragment)
            ));
        }
    }
    display::section_bot();
}
