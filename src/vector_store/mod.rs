//! Vector store for RAG documents, chat history and the ingestion audit log
//!
//! [`VectorStore`] validates input, normalizes symbols and turns backend
//! failures into degraded [`Outcome`]s. Storage itself lives behind the
//! [`StoreBackend`] trait:
//! - [`PgVectorBackend`]: PostgreSQL with the pgvector extension
//! - [`MemoryBackend`]: in-process, for tests and hosts without a database

pub mod backend;
pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub use backend::SearchFilter;
pub use backend::StoreBackend;
use chrono::DateTime;
use chrono::Utc;
pub use memory::MemoryBackend;
pub use postgres::PgVectorBackend;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::embeddings::EMBEDDING_DIM;
use crate::errors::FinRagError;
use crate::errors::Result;
use crate::models::normalize_symbol;
use crate::models::ChatMessage;
use crate::models::NewChatMessage;
use crate::models::NewDocument;
use crate::models::SearchHit;
use crate::models::SourceType;
use crate::outcome::Outcome;

/// Availability-aware front of a [`StoreBackend`]
pub struct VectorStore {
    backend: Option<Arc<dyn StoreBackend>>,
    available: AtomicBool,
    dimension: usize,
}

impl VectorStore {
    /// Connect to PostgreSQL and prepare the schema
    ///
    /// Never fails: a store that cannot connect is returned in the
    /// unavailable state and every operation on it degrades.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        match PgVectorBackend::connect(config).await {
            Ok(backend) => {
                info!("✅ Vector store initialized");
                Self::with_backend(Arc::new(backend))
            }
            Err(e) => {
                error!("Vector store initialization failed: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn with_backend(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend: Some(backend),
            available: AtomicBool::new(true),
            dimension: EMBEDDING_DIM,
        }
    }

    /// A store with no backend at all
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            available: AtomicBool::new(false),
            dimension: EMBEDDING_DIM,
        }
    }

    #[must_use]
    pub const fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Last known availability; no I/O
    pub fn is_available(&self) -> bool {
        self.backend.is_some() && self.available.load(Ordering::SeqCst)
    }

    /// Probe the backend and record the result
    pub async fn refresh_availability(&self) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        let healthy = match backend.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Vector store health check failed: {}", e);
                false
            }
        };
        self.available.store(healthy, Ordering::SeqCst);
        healthy
    }

    /// Backend for the next call, re-probing if the last call lost the connection
    async fn backend(&self) -> Result<&Arc<dyn StoreBackend>> {
        let backend = self.backend.as_ref().ok_or(FinRagError::StoreUnavailable)?;
        if !self.available.load(Ordering::SeqCst) && !self.refresh_availability().await {
            return Err(FinRagError::StoreUnavailable);
        }
        Ok(backend)
    }

    /// Mark the store unavailable when an error means the connection is gone
    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if is_connection_error(e) {
                self.available.store(false, Ordering::SeqCst);
            }
        }
        result
    }

    fn validate_batch(&self, documents: &[NewDocument], embeddings: &[Vec<f32>]) -> Result<()> {
        if documents.len() != embeddings.len() {
            return Err(FinRagError::InvalidInput(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(FinRagError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        Ok(())
    }

    async fn try_store_documents(
        &self,
        documents: &[NewDocument],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        self.validate_batch(documents, embeddings)?;
        if documents.is_empty() {
            return Ok(0);
        }

        let normalized: Vec<NewDocument> = documents
            .iter()
            .map(|doc| NewDocument {
                symbol: doc.symbol.as_deref().and_then(normalize_symbol),
                ..doc.clone()
            })
            .collect();

        let backend = self.backend().await?;
        let stored = self.observe(backend.insert_documents(&normalized, embeddings).await)?;
        info!("Stored {} documents in vector store", stored);
        Ok(stored)
    }

    /// Store documents with their embeddings, all or nothing
    pub async fn store_documents(
        &self,
        documents: &[NewDocument],
        embeddings: &[Vec<f32>],
    ) -> Outcome<usize> {
        Outcome::from_result(
            self.try_store_documents(documents, embeddings).await,
            0,
            "store_documents",
        )
    }

    pub(crate) async fn try_search_similar(&self, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        if filter.embedding.len() != self.dimension {
            return Err(FinRagError::DimensionMismatch {
                expected: self.dimension,
                actual: filter.embedding.len(),
            });
        }
        if filter.top_k == 0 {
            return Ok(Vec::new());
        }

        let filter = SearchFilter {
            symbol: filter.symbol.as_deref().and_then(normalize_symbol),
            source_types: filter.source_types.clone().filter(|types| !types.is_empty()),
            ..filter.clone()
        };

        let backend = self.backend().await?;
        self.observe(backend.search(&filter).await)
    }

    /// Nearest non-expired documents, best match first
    pub async fn search_similar(&self, filter: &SearchFilter) -> Outcome<Vec<SearchHit>> {
        Outcome::from_result(
            self.try_search_similar(filter).await,
            Vec::new(),
            "search_similar",
        )
    }

    async fn try_delete_expired(&self) -> Result<u64> {
        let backend = self.backend().await?;
        let deleted = self.observe(backend.delete_expired().await)?;
        if deleted > 0 {
            info!("Cleaned up {} expired documents", deleted);
        }
        Ok(deleted)
    }

    /// Physically remove documents whose expiry has passed
    pub async fn delete_expired(&self) -> Outcome<u64> {
        Outcome::from_result(self.try_delete_expired().await, 0, "delete_expired")
    }

    async fn try_get_document_count(
        &self,
        source_type: Option<SourceType>,
        symbol: Option<&str>,
    ) -> Result<i64> {
        let symbol = symbol.and_then(normalize_symbol);
        let backend = self.backend().await?;
        self.observe(backend.count_documents(source_type, symbol.as_deref()).await)
    }

    /// Count stored documents (expired ones included until swept)
    pub async fn get_document_count(
        &self,
        source_type: Option<SourceType>,
        symbol: Option<&str>,
    ) -> Outcome<i64> {
        Outcome::from_result(
            self.try_get_document_count(source_type, symbol).await,
            0,
            "get_document_count",
        )
    }

    async fn try_document_counts_by_type(&self) -> Result<BTreeMap<SourceType, i64>> {
        let backend = self.backend().await?;
        self.observe(backend.counts_by_type().await)
    }

    /// Per-type document counts, every known type present
    pub async fn document_counts_by_type(&self) -> Outcome<BTreeMap<SourceType, i64>> {
        let zeroes: BTreeMap<SourceType, i64> = SourceType::ALL.iter().map(|t| (*t, 0)).collect();
        Outcome::from_result(
            self.try_document_counts_by_type().await,
            zeroes,
            "document_counts_by_type",
        )
    }

    async fn try_store_chat_message(&self, message: &NewChatMessage) -> Result<()> {
        let backend = self.backend().await?;
        self.observe(backend.insert_chat_message(message).await)
    }

    /// Append a chat turn
    pub async fn store_chat_message(&self, message: &NewChatMessage) -> Outcome<()> {
        Outcome::from_result(
            self.try_store_chat_message(message).await,
            (),
            "store_chat_message",
        )
    }

    async fn try_get_chat_history(&self, session_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let backend = self.backend().await?;
        self.observe(backend.chat_history(session_id, limit).await)
    }

    /// The latest `limit` messages of a session in chronological order
    pub async fn get_chat_history(&self, session_id: &str, limit: i64) -> Outcome<Vec<ChatMessage>> {
        Outcome::from_result(
            self.try_get_chat_history(session_id, limit).await,
            Vec::new(),
            "get_chat_history",
        )
    }

    async fn try_log_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        document_count: usize,
    ) -> Result<()> {
        let symbol = symbol.and_then(normalize_symbol);
        let count = i32::try_from(document_count).unwrap_or(i32::MAX);
        let backend = self.backend().await?;
        self.observe(
            backend
                .insert_ingestion_log(source_type, symbol.as_deref(), count)
                .await,
        )
    }

    /// Record an ingestion run
    pub async fn log_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        document_count: usize,
    ) -> Outcome<()> {
        Outcome::from_result(
            self.try_log_ingestion(source_type, symbol, document_count)
                .await,
            (),
            "log_ingestion",
        )
    }

    async fn try_get_last_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>> {
        let symbol = symbol.and_then(normalize_symbol);
        let backend = self.backend().await?;
        self.observe(backend.last_ingestion(source_type, symbol.as_deref()).await)
    }

    /// Most recent ingestion time; a `None` symbol matches global runs only
    pub async fn get_last_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
    ) -> Outcome<Option<DateTime<Utc>>> {
        Outcome::from_result(
            self.try_get_last_ingestion(source_type, symbol).await,
            None,
            "get_last_ingestion",
        )
    }
}

fn is_connection_error(err: &FinRagError) -> bool {
    match err {
        FinRagError::StoreUnavailable => true,
        FinRagError::Database(db) => matches!(
            db,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ),
        _ => false,
    }
}
