//! In-process sentence embeddings via fastembed
//!
//! Only available when the `local-embed` feature is enabled.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::EmbeddingModel;
use fastembed::InitOptions;
use fastembed::TextEmbedding;
use tracing::debug;
use tracing::info;

use super::Embedder;
use crate::config::EmbeddingsConfig;
use crate::errors::FinRagError;
use crate::errors::Result;

/// fastembed-backed embedder
pub struct FastEmbedder {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedder {
    /// Load the model, downloading weights on first use
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        info!("Loading embedding model: {}...", config.model);

        let model_enum = model_for_name(&config.model).ok_or_else(|| {
            FinRagError::ConfigError(format!("Unsupported local model: {}", config.model))
        })?;

        let options = InitOptions::new(model_enum).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| FinRagError::EmbeddingError(format!("Failed to load model: {e}")))?;

        info!("✅ Embedding model loaded ({}, dim={})", config.model, config.dimension);

        Ok(Self {
            model: Arc::new(model),
            model_name: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size,
        })
    }
}

/// Map a configured model name onto the fastembed catalog
pub fn model_for_name(name: &str) -> Option<EmbeddingModel> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
            Some(EmbeddingModel::AllMiniLML6V2)
        }
        "BAAI/bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        _ => None,
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts", texts.len());

        // fastembed is synchronous; keep it off the async workers
        let model = self.model.clone();
        let batch_size = self.batch_size;
        tokio::task::spawn_blocking(move || model.embed(texts, Some(batch_size)))
        .await
        .map_err(|e| FinRagError::EmbeddingError(format!("Task join error: {e}")))?
        .map_err(|e| FinRagError::EmbeddingError(format!("Embedding failed: {e}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
