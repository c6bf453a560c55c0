use std::collections::BTreeMap;

use serde::Serialize;

use crate::embeddings::EmbeddingService;
use crate::models::SourceType;
use crate::vector_store::VectorStore;

/// Availability flags and per-type document counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RagStatus {
    pub embedding_available: bool,
    pub vector_store_available: bool,
    pub document_counts: BTreeMap<SourceType, i64>,
}

impl RagStatus {
    pub fn total_documents(&self) -> i64 {
        self.document_counts.values().sum()
    }
}

/// Probe both dependencies and count stored documents
pub async fn collect_status(embeddings: &EmbeddingService, store: &VectorStore) -> RagStatus {
    let embedding_available = embeddings.is_available().await;
    let vector_store_available = store.refresh_availability().await;
    let document_counts = store.document_counts_by_type().await.into_value();

    RagStatus {
        embedding_available,
        vector_store_available,
        document_counts,
    }
}
