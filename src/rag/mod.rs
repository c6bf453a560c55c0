//! RAG (Retrieval-Augmented Generation) module
//!
//! Turns a natural-language question into grounded prompt inputs:
//! - Semantic retrieval of news, education and research documents
//! - Size-bounded context assembly with one citation per entry
//! - Rendering of the caller's portfolio and watchlist
//!
//! The completion call itself belongs to the host; this module only prepares
//! what goes into the prompt.
//!
//! # Examples
//!
//! ```rust,no_run
//! use finrag::rag::RetrievalQuery;
//! use finrag::AppConfig;
//! use finrag::FinRag;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let rag = FinRag::from_config(&config).await;
//!
//!     let query = RetrievalQuery::new("Is Apple's dividend safe?").with_symbol("AAPL");
//!     let context = rag.retriever().build_context_with_sources(&query, 3000).await;
//!     println!("{}", context.value().context);
//!     println!("Sources: {}", context.value().sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod retriever;
pub mod status;

pub use context::ContextAssembler;
pub use retriever::ContextWithSources;
pub use retriever::Retriever;
pub use status::collect_status;
pub use status::RagStatus;

use crate::models::SourceType;

/// Retrieval request
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalQuery {
    pub query: String,
    pub symbol: Option<String>,
    pub source_types: Option<Vec<SourceType>>,
    pub top_k: usize,
    pub score_threshold: f64,
}

impl RetrievalQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            symbol: None,
            source_types: None,
            top_k: 5,
            score_threshold: 0.3,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_source_types(mut self, source_types: Vec<SourceType>) -> Self {
        self.source_types = Some(source_types);
        self
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub const fn with_score_threshold(mut self, score_threshold: f64) -> Self {
        self.score_threshold = score_threshold;
        self
    }
}
