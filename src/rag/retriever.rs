//! Retrieval of ranked documents and prompt inputs

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::cli::output::truncate_str;
use crate::embeddings::EmbeddingService;
use crate::errors::FinRagError;
use crate::errors::Result;
use crate::models::SearchHit;
use crate::models::SourceCitation;
use crate::models::UserContext;
use crate::outcome::Outcome;
use crate::rag::ContextAssembler;
use crate::rag::RetrievalQuery;
use crate::vector_store::SearchFilter;
use crate::vector_store::VectorStore;

/// Holdings and watchlist entries rendered into the user context
const MAX_USER_CONTEXT_ITEMS: usize = 10;

/// Prompt context and the citations of the entries it contains
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextWithSources {
    pub context: String,
    pub sources: Vec<SourceCitation>,
}

/// Retriever over the vector store
pub struct Retriever {
    embedding_service: Arc<EmbeddingService>,
    store: Arc<VectorStore>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedding_service: Arc<EmbeddingService>, store: Arc<VectorStore>) -> Self {
        Self {
            embedding_service,
            store,
        }
    }

    /// Both the embedding model and the store are usable
    pub async fn is_available(&self) -> bool {
        self.embedding_service.is_available().await && self.store.is_available()
    }

    async fn try_retrieve(&self, query: &RetrievalQuery) -> Result<Vec<SearchHit>> {
        if !self.embedding_service.is_available().await {
            return Err(FinRagError::EmbeddingUnavailable);
        }

        debug!("Performing semantic search: {}", query.query);
        let embedding = self.embedding_service.try_embed_text(&query.query).await?;

        let filter = SearchFilter::new(embedding)
            .with_symbol(query.symbol.as_deref())
            .with_source_types(query.source_types.clone())
            .with_top_k(query.top_k)
            .with_score_threshold(query.score_threshold);

        let hits = self.store.try_search_similar(&filter).await?;

        info!(
            "Retrieved {} documents for query: '{}' (symbol={})",
            hits.len(),
            truncate_str(&query.query, 80),
            query.symbol.as_deref().unwrap_or("-")
        );
        Ok(hits)
    }

    /// Ranked hits for a query; degrades to an empty list
    pub async fn retrieve(&self, query: &RetrievalQuery) -> Outcome<Vec<SearchHit>> {
        let outcome = Outcome::from_result(self.try_retrieve(query).await, Vec::new(), "retrieve");
        if outcome.is_degraded() {
            warn!("RAG not available, returning empty context");
        }
        outcome
    }

    /// Prompt context for a query, at most `max_context_chars` plus the truncation marker
    pub async fn build_context_string(
        &self,
        query: &RetrievalQuery,
        max_context_chars: usize,
    ) -> Outcome<String> {
        self.build_context_with_sources(query, max_context_chars)
            .await
            .map(|built| built.context)
    }

    /// Prompt context plus a citation for every entry placed in it
    pub async fn build_context_with_sources(
        &self,
        query: &RetrievalQuery,
        max_context_chars: usize,
    ) -> Outcome<ContextWithSources> {
        self.retrieve(query).await.map(|hits| {
            let (context, sources) =
                ContextAssembler::new(max_context_chars).assemble_with_sources(&hits);
            ContextWithSources { context, sources }
        })
    }

    /// Render the caller's portfolio and watchlist for the prompt
    pub fn format_user_context(user_context: &UserContext) -> String {
        let mut parts = Vec::new();

        if !user_context.portfolio.is_empty() {
            let holdings: Vec<String> = user_context
                .portfolio
                .iter()
                .take(MAX_USER_CONTEXT_ITEMS)
                .map(|holding| {
                    format!(
                        "  - {}: {} shares @ ${:.2} avg",
                        holding.symbol.as_deref().unwrap_or("?"),
                        holding.quantity,
                        holding.average_purchase_price
                    )
                })
                .collect();
            parts.push(format!("User's Portfolio:\n{}", holdings.join("\n")));
        }

        if !user_context.watchlist.is_empty() {
            let symbols: Vec<&str> = user_context
                .watchlist
                .iter()
                .take(MAX_USER_CONTEXT_ITEMS)
                .map(|item| item.symbol.as_deref().unwrap_or("?"))
                .collect();
            parts.push(format!("User's Watchlist: {}", symbols.join(", ")));
        }

        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Holding;
    use crate::models::WatchlistItem;

    #[test]
    fn test_format_user_context_full() {
        let user_context = UserContext {
            portfolio: vec![Holding {
                symbol: Some("AAPL".to_string()),
                quantity: 10.0,
                average_purchase_price: 150.0,
            }],
            watchlist: vec![
                WatchlistItem {
                    symbol: Some("TSLA".to_string()),
                },
                WatchlistItem {
                    symbol: Some("NVDA".to_string()),
                },
            ],
        };

        assert_eq!(
            Retriever::format_user_context(&user_context),
            "User's Portfolio:\n  - AAPL: 10 shares @ $150.00 avg\n\nUser's Watchlist: TSLA, NVDA"
        );
    }

    #[test]
    fn test_format_user_context_empty() {
        assert_eq!(Retriever::format_user_context(&UserContext::default()), "");
    }

    #[test]
    fn test_format_user_context_caps_items() {
        let user_context = UserContext {
            portfolio: Vec::new(),
            watchlist: (0..15)
                .map(|i| WatchlistItem {
                    symbol: Some(format!("S{i}")),
                })
                .collect(),
        };

        let rendered = Retriever::format_user_context(&user_context);
        assert!(rendered.starts_with("User's Watchlist: S0, S1"));
        assert!(rendered.ends_with("S9"));
    }

    #[test]
    fn test_missing_holding_symbol_renders_placeholder() {
        let user_context = UserContext {
            portfolio: vec![Holding {
                symbol: None,
                quantity: 2.5,
                average_purchase_price: 10.0,
            }],
            watchlist: Vec::new(),
        };
        assert_eq!(
            Retriever::format_user_context(&user_context),
            "User's Portfolio:\n  - ?: 2.5 shares @ $10.00 avg"
        );
    }
}
