//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `finrag` CLI

use crate::config::EmbeddingProviderKind;
use crate::models::ChatMessage;
use crate::models::SearchHit;
use crate::models::SourceCitation;
use crate::rag::RagStatus;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8 characters (emojis, etc.)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "✅ available"
    } else {
        "❌ unavailable"
    }
}

/// Print availability and document counts
pub fn print_status(status: &RagStatus) {
    println!("📊 FinRAG Status");
    println!("===============");
    println!();
    println!("🧠 Embeddings:   {}", yes_no(status.embedding_available));
    println!("🗄️  Vector store: {}", yes_no(status.vector_store_available));
    println!();
    println!("📚 Documents:");
    for (source_type, count) in &status.document_counts {
        println!("  {:<10} {count}", source_type.as_str());
    }
    println!("  {:<10} {}", "total", status.total_documents());
}

/// Print search results
pub fn print_search_results(query: &str, hits: &[SearchHit]) {
    println!("🔍 Results for: \"{query}\"");
    println!();

    if hits.is_empty() {
        println!("No documents above the score threshold.");
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        let doc = &hit.document;
        println!(
            "{}. [{}] {} (score: {:.4})",
            i + 1,
            doc.source_type.label(),
            doc.title,
            hit.score
        );
        if let Some(symbol) = &doc.symbol {
            println!("   📈 Symbol: {symbol}");
        }
        if let Some(expires_at) = doc.expires_at {
            println!("   ⏳ Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!("   {}", truncate_str(&doc.content.replace('\n', " "), 160));
        println!();
    }
}

/// Print citations in placement order
pub fn print_sources(sources: &[SourceCitation]) {
    println!("📎 Sources ({}):", sources.len());
    for (i, source) in sources.iter().enumerate() {
        println!(
            "  {}. [{}] {}{} (score: {:.4})",
            i + 1,
            source.source_type.label(),
            source.title,
            source
                .symbol
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default(),
            source.score
        );
    }
}

/// Print a chat session transcript
pub fn print_chat_history(session_id: &str, messages: &[ChatMessage]) {
    println!("💬 Session {session_id} ({} messages)", messages.len());
    println!();

    for message in messages {
        let icon = match message.role {
            crate::models::ChatRole::User => "👤",
            crate::models::ChatRole::Assistant => "🤖",
        };
        println!(
            "{icon} {} [{}]",
            message.role.as_str(),
            message.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!("   {}", message.content);
        if !message.sources.is_empty() {
            let titles: Vec<&str> = message.sources.iter().map(|s| s.title.as_str()).collect();
            println!("   📎 {}", titles.join(" | "));
        }
        println!();
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 FinRAG Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", mask_database_url(config.database_url()));
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!("  Vector index: {}", config.database.enable_vector_index);
    println!("  Vector index lists: {}", config.database.vector_index_lists);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    match config.embeddings.provider {
        EmbeddingProviderKind::Local => println!("  Provider: local"),
        EmbeddingProviderKind::Ollama => {
            println!("  Provider: ollama ({})", config.embeddings.endpoint);
        }
    }
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Max input chars: {}", config.embeddings.max_input_chars);
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!();

    println!("🔎 Retrieval:");
    println!("  Top K: {}", config.rag.top_k);
    println!("  Score threshold: {}", config.rag.score_threshold);
    println!("  Max context chars: {}", config.rag.max_context_chars);
    println!("  News TTL: {} days", config.rag.news_ttl_days);
    println!("  Research TTL: {} days", config.rag.research_ttl_days);
    println!("  Chat history limit: {}", config.rag.chat_history_limit);
}

/// Mask database URL for display (hide password)
pub fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "***invalid***".to_string();
    };

    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
