//! Embeddings generation module
//!
//! Turns text into fixed-length dense vectors for similarity search. Two
//! backends are available behind the [`Embedder`] trait:
//! - Local sentence-transformers model (all-MiniLM-L6-v2) via fastembed
//! - Ollama server (`/api/embeddings`)
//!
//! [`EmbeddingService`] owns the backend, loads it once on first use and
//! reports itself unavailable for the rest of the process if loading fails.
//!
//! # Examples
//!
//! ```rust,no_run
//! use finrag::config::AppConfig;
//! use finrag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let service = EmbeddingService::from_config(&config.embeddings);
//!
//!     if service.is_available().await {
//!         let vector = service.embed_text("What is dollar-cost averaging?").await;
//!         println!("degraded: {}", vector.is_degraded());
//!     }
//! }
//! ```

pub mod client;
pub mod generator;
#[cfg(feature = "local-embed")]
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
pub use client::OllamaEmbedder;
pub use generator::EmbeddingService;
#[cfg(feature = "local-embed")]
pub use local::FastEmbedder;

use crate::config::EmbeddingProviderKind;
use crate::config::EmbeddingsConfig;
use crate::errors::Result;

/// Output dimension of all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Character budget applied to every input before embedding
pub const MAX_INPUT_CHARS: usize = 2000;

/// Backend that produces embeddings for a batch of texts
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in the same order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the backend named in configuration (this loads the model)
pub fn create_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProviderKind::Ollama => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        EmbeddingProviderKind::Local => {
            #[cfg(feature = "local-embed")]
            {
                Ok(Arc::new(FastEmbedder::new(config)?))
            }

            #[cfg(not(feature = "local-embed"))]
            {
                Err(crate::errors::FinRagError::ConfigError(
                    "Local embeddings require the 'local-embed' feature".to_string(),
                ))
            }
        }
    }
}
