pub mod store_tests;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::embeddings::EMBEDDING_DIM;
use crate::models::DocumentMetadata;
use crate::models::NewDocument;
use crate::models::SourceType;
use crate::vector_store::MemoryBackend;
use crate::vector_store::VectorStore;
use crate::FinRagError;
use crate::Result;

/// Deterministic bag-of-words embedder
///
/// Every lower-cased alphanumeric token is hashed into one dimension, so
/// cosine similarity tracks word overlap between texts.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let index = (fnv1a(&token.to_lowercase()) % self.dimension as u64) as usize;
            vector[index] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash-bag-of-words"
    }
}

/// Embedding service whose model never loads
pub fn unavailable_embeddings() -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::with_loader(EMBEDDING_DIM, || {
        Err(FinRagError::EmbeddingError("model weights not found".to_string()))
    }))
}

pub fn hash_embeddings() -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::with_embedder(Arc::new(HashEmbedder::default())))
}

/// A vector store over a fresh in-memory backend, plus the backend handle
pub fn memory_store() -> (Arc<VectorStore>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(VectorStore::with_backend(backend.clone()));
    (store, backend)
}

/// Unit vector along `axis`, tilted toward `toward` by `weight`
pub fn axis_vector(axis: usize, toward: Option<(usize, f32)>) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    vector[axis] = 1.0;
    if let Some((other, weight)) = toward {
        vector[other] = weight;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    vector.iter().map(|x| x / norm).collect()
}

pub fn new_document(
    source_type: SourceType,
    symbol: Option<&str>,
    title: &str,
    content: &str,
    expires_at: Option<DateTime<Utc>>,
) -> NewDocument {
    NewDocument {
        source_type,
        symbol: symbol.map(str::to_string),
        title: title.to_string(),
        content: content.to_string(),
        metadata: DocumentMetadata::default(),
        expires_at,
    }
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_hash_embedder_tracks_word_overlap() {
        let embedder = HashEmbedder::default();
        let a = embedder.vector_for("dividend growth");
        let b = embedder.vector_for("Dividend, growth!");
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
