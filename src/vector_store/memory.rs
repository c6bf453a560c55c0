//! In-process storage with the same semantics as the PostgreSQL backend

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use super::backend::SearchFilter;
use super::backend::StoreBackend;
use crate::errors::FinRagError;
use crate::errors::Result;
use crate::models::round_score;
use crate::models::ChatMessage;
use crate::models::Document;
use crate::models::IngestionLogEntry;
use crate::models::NewChatMessage;
use crate::models::NewDocument;
use crate::models::SearchHit;
use crate::models::SourceType;

#[derive(Default)]
struct MemoryState {
    documents: Vec<(Document, Vec<f32>)>,
    chat: Vec<ChatMessage>,
    ingestion_log: Vec<IngestionLogEntry>,
    next_id: i64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vector store kept in memory; contents are lost on drop
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database went away
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(FinRagError::StoreUnavailable)
        } else {
            Ok(())
        }
    }
}

/// Cosine similarity; zero-length vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn health_check(&self) -> Result<()> {
        self.ensure_online()
    }

    async fn insert_documents(
        &self,
        documents: &[NewDocument],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let now = Utc::now();

        for (doc, embedding) in documents.iter().zip(embeddings) {
            let id = state.allocate_id();
            state.documents.push((
                Document {
                    id,
                    source_type: doc.source_type,
                    symbol: doc.symbol.clone(),
                    title: doc.title.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    created_at: now,
                    expires_at: doc.expires_at,
                },
                embedding.clone(),
            ));
        }

        Ok(documents.len())
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let now = Utc::now();

        let mut scored: Vec<(f64, &Document)> = state
            .documents
            .iter()
            .filter(|(doc, _)| !doc.is_expired_at(now))
            .filter(|(doc, _)| match (&filter.symbol, &doc.symbol) {
                (None, _) | (Some(_), None) => true,
                (Some(wanted), Some(symbol)) => wanted == symbol,
            })
            .filter(|(doc, _)| {
                filter
                    .source_types
                    .as_ref()
                    .map_or(true, |types| types.contains(&doc.source_type))
            })
            .map(|(doc, embedding)| (cosine_similarity(&filter.embedding, embedding), doc))
            .filter(|(score, _)| *score >= filter.score_threshold)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(filter.top_k);

        Ok(scored
            .into_iter()
            .map(|(score, doc)| SearchHit {
                document: doc.clone(),
                score: round_score(score),
            })
            .collect())
    }

    async fn delete_expired(&self) -> Result<u64> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let now = Utc::now();

        let before = state.documents.len();
        state.documents.retain(|(doc, _)| !doc.is_expired_at(now));
        Ok((before - state.documents.len()) as u64)
    }

    async fn count_documents(
        &self,
        source_type: Option<SourceType>,
        symbol: Option<&str>,
    ) -> Result<i64> {
        self.ensure_online()?;
        let state = self.state.read().await;

        let count = state
            .documents
            .iter()
            .filter(|(doc, _)| source_type.map_or(true, |t| doc.source_type == t))
            .filter(|(doc, _)| symbol.map_or(true, |s| doc.symbol.as_deref() == Some(s)))
            .count();
        Ok(count as i64)
    }

    async fn counts_by_type(&self) -> Result<BTreeMap<SourceType, i64>> {
        self.ensure_online()?;
        let state = self.state.read().await;

        let mut counts: BTreeMap<SourceType, i64> =
            SourceType::ALL.iter().map(|t| (*t, 0)).collect();
        for (doc, _) in &state.documents {
            *counts.entry(doc.source_type).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<()> {
        self.ensure_online()?;
        let mut state = self.state.write().await;

        let id = state.allocate_id();
        state.chat.push(ChatMessage {
            id,
            user_id: message.user_id.clone(),
            session_id: message.session_id.clone(),
            role: message.role,
            content: message.content.clone(),
            sources: message.sources.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn chat_history(&self, session_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        self.ensure_online()?;
        let state = self.state.read().await;

        let mut messages: Vec<ChatMessage> = state
            .chat
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let keep = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let skip = messages.len().saturating_sub(keep);
        Ok(messages.split_off(skip))
    }

    async fn insert_ingestion_log(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        document_count: i32,
    ) -> Result<()> {
        self.ensure_online()?;
        let mut state = self.state.write().await;

        let id = state.allocate_id();
        state.ingestion_log.push(IngestionLogEntry {
            id,
            source_type,
            symbol: symbol.map(str::to_string),
            document_count,
            last_ingested_at: Utc::now(),
        });
        Ok(())
    }

    async fn last_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>> {
        self.ensure_online()?;
        let state = self.state.read().await;

        Ok(state
            .ingestion_log
            .iter()
            .filter(|entry| entry.source_type == source_type && entry.symbol.as_deref() == symbol)
            .map(|entry| entry.last_ingested_at)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_offline_backend_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);

        assert!(backend.health_check().await.is_err());
        assert!(backend.count_documents(None, None).await.is_err());

        backend.set_offline(false);
        assert_eq!(backend.count_documents(None, None).await.unwrap(), 0);
    }
}
