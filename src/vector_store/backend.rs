use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::errors::Result;
use crate::models::ChatMessage;
use crate::models::NewChatMessage;
use crate::models::NewDocument;
use crate::models::SearchHit;
use crate::models::SourceType;

/// Similarity search parameters
///
/// `symbol` admits documents tagged with that symbol plus global documents
/// (no symbol). `source_types` of `None` admits every type.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub embedding: Vec<f32>,
    pub symbol: Option<String>,
    pub source_types: Option<Vec<SourceType>>,
    pub top_k: usize,
    pub score_threshold: f64,
}

impl SearchFilter {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            symbol: None,
            source_types: None,
            top_k: 5,
            score_threshold: 0.3,
        }
    }

    pub fn with_symbol(mut self, symbol: Option<&str>) -> Self {
        self.symbol = symbol.and_then(crate::models::normalize_symbol);
        self
    }

    /// An empty list means "no type filter"
    pub fn with_source_types(mut self, source_types: Option<Vec<SourceType>>) -> Self {
        self.source_types = source_types.filter(|types| !types.is_empty());
        self
    }

    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub const fn with_score_threshold(mut self, score_threshold: f64) -> Self {
        self.score_threshold = score_threshold;
        self
    }
}

/// Storage engine behind [`super::VectorStore`]
///
/// Implementations receive already-validated input: symbols upper-cased,
/// embeddings of the right dimension and one per document.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Cheap round trip proving the backend can serve requests
    async fn health_check(&self) -> Result<()>;

    /// Insert all documents in a single transaction
    async fn insert_documents(&self, documents: &[NewDocument], embeddings: &[Vec<f32>])
        -> Result<usize>;

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<SearchHit>>;

    async fn delete_expired(&self) -> Result<u64>;

    async fn count_documents(
        &self,
        source_type: Option<SourceType>,
        symbol: Option<&str>,
    ) -> Result<i64>;

    async fn counts_by_type(&self) -> Result<BTreeMap<SourceType, i64>>;

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<()>;

    /// Latest `limit` messages of a session, oldest first
    async fn chat_history(&self, session_id: &str, limit: i64) -> Result<Vec<ChatMessage>>;

    async fn insert_ingestion_log(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        document_count: i32,
    ) -> Result<()>;

    /// `symbol` of `None` matches only log rows without a symbol
    async fn last_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>>;
}
