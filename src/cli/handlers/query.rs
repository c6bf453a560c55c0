//! Search and context handlers

use std::path::Path;

use super::read_json_file;
use crate::cli::commands::QueryFilterArgs;
use crate::cli::output::print_search_results;
use crate::cli::output::print_sources;
use crate::cli::output::print_warning;
use crate::config::RagConfig;
use crate::models::UserContext;
use crate::rag::RetrievalQuery;
use crate::rag::Retriever;
use crate::FinRag;
use crate::Result;

/// Build a retrieval query from flags, falling back to configured defaults
pub fn build_query(query: &str, filter: &QueryFilterArgs, defaults: &RagConfig) -> RetrievalQuery {
    let mut request = RetrievalQuery::new(query)
        .with_top_k(filter.top_k.unwrap_or(defaults.top_k))
        .with_score_threshold(filter.threshold.unwrap_or(defaults.score_threshold));
    if let Some(symbol) = &filter.symbol {
        request = request.with_symbol(symbol.clone());
    }
    if !filter.types.is_empty() {
        request = request.with_source_types(filter.types.clone());
    }
    request
}

pub async fn handle_search_command(
    rag: &FinRag,
    defaults: &RagConfig,
    query: &str,
    filter: &QueryFilterArgs,
) -> Result<()> {
    let request = build_query(query, filter, defaults);
    let outcome = rag.retriever().retrieve(&request).await;
    if let Some(reason) = outcome.reason() {
        print_warning(&format!("Search degraded: {reason}"));
    }
    print_search_results(query, outcome.value());
    Ok(())
}

pub async fn handle_context_command(
    rag: &FinRag,
    defaults: &RagConfig,
    query: &str,
    filter: &QueryFilterArgs,
    max_chars: Option<usize>,
    user_context: Option<&Path>,
    json: bool,
) -> Result<()> {
    let request = build_query(query, filter, defaults);
    let max_chars = max_chars.unwrap_or(defaults.max_context_chars);

    let user_context = match user_context {
        Some(path) => {
            let parsed: UserContext = read_json_file(path)?;
            Some(Retriever::format_user_context(&parsed))
        }
        None => None,
    };

    let outcome = rag
        .retriever()
        .build_context_with_sources(&request, max_chars)
        .await;
    let degraded = outcome.reason().map(ToString::to_string);
    let built = outcome.into_value();

    if json {
        let body = serde_json::json!({
            "context": built.context,
            "sources": built.sources,
            "userContext": user_context,
            "degraded": degraded,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if let Some(reason) = degraded {
        print_warning(&format!("Context degraded: {reason}"));
    }
    if let Some(user_context) = user_context.filter(|c| !c.is_empty()) {
        println!("{user_context}");
        println!();
    }
    if built.context.is_empty() {
        println!("(no relevant documents)");
    } else {
        println!("{}", built.context);
    }
    println!();
    print_sources(&built.sources);
    Ok(())
}
