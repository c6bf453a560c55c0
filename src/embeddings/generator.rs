use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::truncate_for_embedding;
use super::Embedder;
use super::MAX_INPUT_CHARS;
use crate::config::EmbeddingsConfig;
use crate::errors::FinRagError;
use crate::errors::Result;
use crate::outcome::Outcome;

type Loader = Arc<dyn Fn() -> Result<Arc<dyn Embedder>> + Send + Sync>;

/// Embedding service that loads its backend once and shares it
///
/// The first call that needs the model runs the loader. The result, success
/// or failure, is kept for the life of the service: a model that failed to
/// load is never retried and every later call degrades immediately.
pub struct EmbeddingService {
    loader: Loader,
    embedder: OnceCell<Option<Arc<dyn Embedder>>>,
    dimension: usize,
    max_input_chars: usize,
}

impl EmbeddingService {
    /// Create a service that builds the configured backend on first use
    pub fn from_config(config: &EmbeddingsConfig) -> Self {
        let backend_config = config.clone();
        Self {
            loader: Arc::new(move || super::create_embedder(&backend_config)),
            embedder: OnceCell::new(),
            dimension: config.dimension,
            max_input_chars: config.max_input_chars,
        }
    }

    /// Create a service around an already-loaded backend
    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        let dimension = embedder.dimension();
        let loaded = embedder.clone();
        Self {
            loader: Arc::new(move || Ok(loaded.clone())),
            embedder: OnceCell::new_with(Some(Some(embedder))),
            dimension,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }

    /// Create a service with a custom loader, run lazily on first use
    pub fn with_loader<F>(dimension: usize, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            embedder: OnceCell::new(),
            dimension,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }

    async fn embedder(&self) -> Option<Arc<dyn Embedder>> {
        self.embedder
            .get_or_init(|| async {
                let loader = self.loader.clone();
                // Model loading reads weights from disk and may download them
                let loaded = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|e| FinRagError::EmbeddingError(format!("Loader task failed: {e}")))
                    .and_then(|result| result);

                match loaded {
                    Ok(embedder) if embedder.dimension() == self.dimension => {
                        info!(
                            "Embedding backend ready: {} (dim={})",
                            embedder.model_name(),
                            embedder.dimension()
                        );
                        Some(embedder)
                    }
                    Ok(embedder) => {
                        error!(
                            "Embedding backend {} reports dimension {}, expected {}",
                            embedder.model_name(),
                            embedder.dimension(),
                            self.dimension
                        );
                        None
                    }
                    Err(e) => {
                        error!("Failed to load embedding model: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether the model is loaded (triggers the one-time load)
    pub async fn is_available(&self) -> bool {
        self.embedder().await.is_some()
    }

    /// Configured output dimension
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Name of the loaded model, if any
    pub async fn model_name(&self) -> Option<String> {
        self.embedder()
            .await
            .map(|embedder| embedder.model_name().to_string())
    }

    /// Embed a batch, propagating failures
    pub async fn try_embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embedder = self
            .embedder()
            .await
            .ok_or(FinRagError::EmbeddingUnavailable)?;

        let inputs: Vec<String> = texts
            .iter()
            .map(|text| truncate_for_embedding(text, self.max_input_chars).to_string())
            .collect();

        debug!("Generating embeddings for {} texts", inputs.len());
        let embeddings = embedder.embed(inputs).await?;

        if embeddings.len() != texts.len() {
            return Err(FinRagError::EmbeddingError(format!(
                "backend returned {} embeddings for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }

        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(FinRagError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        Ok(embeddings)
    }

    /// Embed a single text, propagating failures
    pub async fn try_embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.try_embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| FinRagError::EmbeddingError("empty embedding response".to_string()))
    }

    /// Embed a single text; degrades to `None`
    pub async fn embed_text(&self, text: &str) -> Outcome<Option<Vec<f32>>> {
        Outcome::from_result(self.try_embed_text(text).await.map(Some), None, "embed_text")
    }

    /// Embed a batch of texts; degrades to an empty list
    pub async fn embed_batch(&self, texts: &[String]) -> Outcome<Vec<Vec<f32>>> {
        Outcome::from_result(self.try_embed_batch(texts).await, Vec::new(), "embed_batch")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::outcome::DegradedReason;
    use crate::tests::HashEmbedder;

    #[tokio::test]
    async fn test_failed_load_is_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let service = EmbeddingService::with_loader(384, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(FinRagError::EmbeddingError("weights missing".to_string()))
        });

        assert!(!service.is_available().await);
        assert!(!service.is_available().await);

        let outcome = service.embed_text("hello").await;
        assert_eq!(outcome.reason(), Some(&DegradedReason::EmbeddingUnavailable));
        assert!(outcome.value().is_none());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrong_dimension_backend_is_unavailable() {
        let service =
            EmbeddingService::with_loader(384, || Ok(Arc::new(HashEmbedder::new(16)) as Arc<dyn Embedder>));
        assert!(!service.is_available().await);
    }

    #[tokio::test]
    async fn test_embed_text_is_deterministic() {
        let service = EmbeddingService::with_embedder(Arc::new(HashEmbedder::default()));

        let first = service.embed_text("What is beta?").await;
        let second = service.embed_text("What is beta?").await;

        assert!(!first.is_degraded());
        assert_eq!(first.value().as_ref().map(Vec::len), Some(384));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_long_input_is_truncated_before_embedding() {
        let service = EmbeddingService::with_embedder(Arc::new(HashEmbedder::default()));

        let head = "word ".repeat(MAX_INPUT_CHARS / 5);
        let long = format!("{head}tail tail tail");

        let a = service.try_embed_text(&head).await.unwrap();
        let b = service.try_embed_text(&long).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_empty_batch_is_healthy_and_empty() {
        let service = EmbeddingService::with_loader(384, || {
            Err(FinRagError::EmbeddingError("unused".to_string()))
        });
        let outcome = service.embed_batch(&[]).await;
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }
}
