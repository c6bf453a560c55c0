pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod ingestion;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod rag;
pub mod vector_store;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod errors_tests;
#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use config::AppConfig;
pub use errors::*;
pub use outcome::DegradedReason;
pub use outcome::Outcome;

use crate::embeddings::EmbeddingService;
use crate::ingestion::IngestionPipeline;
use crate::rag::RagStatus;
use crate::rag::Retriever;
use crate::vector_store::VectorStore;

/// The RAG subsystem wired together from configuration
///
/// Construction never fails. Components whose dependency is missing come up
/// unavailable and their operations return degraded outcomes.
pub struct FinRag {
    embeddings: Arc<EmbeddingService>,
    store: Arc<VectorStore>,
    pipeline: IngestionPipeline,
    retriever: Retriever,
}

impl FinRag {
    /// Connect the vector store and prepare the embedding service
    ///
    /// The embedding model itself loads lazily on first use.
    pub async fn from_config(config: &AppConfig) -> Self {
        let embeddings = Arc::new(EmbeddingService::from_config(&config.embeddings));
        let store = Arc::new(
            VectorStore::connect(&config.database)
                .await
                .with_dimension(config.embeddings.dimension),
        );
        Self::with_components(embeddings, store, config)
    }

    pub fn with_components(
        embeddings: Arc<EmbeddingService>,
        store: Arc<VectorStore>,
        config: &AppConfig,
    ) -> Self {
        let pipeline = IngestionPipeline::with_config(embeddings.clone(), store.clone(), &config.rag);
        let retriever = Retriever::new(embeddings.clone(), store.clone());
        Self {
            embeddings,
            store,
            pipeline,
            retriever,
        }
    }

    pub fn embeddings(&self) -> &EmbeddingService {
        &self.embeddings
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub const fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Availability flags and document counts
    pub async fn status(&self) -> RagStatus {
        rag::collect_status(&self.embeddings, &self.store).await
    }
}
