//! PostgreSQL + pgvector storage

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::backend::SearchFilter;
use super::backend::StoreBackend;
use crate::config::DatabaseConfig;
use crate::embeddings::EMBEDDING_DIM;
use crate::errors::Result;
use crate::models::round_score;
use crate::models::ChatMessage;
use crate::models::ChatRole;
use crate::models::Document;
use crate::models::NewChatMessage;
use crate::models::NewDocument;
use crate::models::SearchHit;
use crate::models::SourceCitation;
use crate::models::SourceType;

/// Vector store backed by a bounded `PgPool`
#[derive(Debug, Clone)]
pub struct PgVectorBackend {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    source_type: String,
    symbol: Option<String>,
    title: String,
    content: String,
    metadata: Option<Json<serde_json::Value>>,
    created_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    score: f64,
}

impl DocumentRow {
    fn into_hit(self) -> Option<SearchHit> {
        let source_type = match SourceType::from_str(&self.source_type) {
            Ok(source_type) => source_type,
            Err(_) => {
                warn!(
                    "Skipping document {} with unknown source type {}",
                    self.id, self.source_type
                );
                return None;
            }
        };

        Some(SearchHit {
            document: Document {
                id: self.id,
                source_type,
                symbol: self.symbol,
                title: self.title,
                content: self.content,
                metadata: self
                    .metadata
                    .and_then(|Json(value)| serde_json::from_value(value).ok())
                    .unwrap_or_default(),
                created_at: self.created_at.unwrap_or_default(),
                expires_at: self.expires_at,
            },
            score: round_score(self.score),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: i64,
    user_id: String,
    session_id: String,
    role: String,
    content: String,
    sources: Option<Json<serde_json::Value>>,
    created_at: Option<DateTime<Utc>>,
}

impl ChatRow {
    fn into_message(self) -> Option<ChatMessage> {
        let role = ChatRole::from_str(&self.role)
            .map_err(|e| warn!("Skipping chat message {}: {}", self.id, e))
            .ok()?;
        let sources: Vec<SourceCitation> = self
            .sources
            .and_then(|Json(value)| serde_json::from_value(value).ok())
            .unwrap_or_default();

        Some(ChatMessage {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            role,
            content: self.content,
            sources,
            created_at: self.created_at.unwrap_or_default(),
        })
    }
}

impl PgVectorBackend {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, enable pgvector and create the schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        let backend = Self::new(pool);
        backend.init_schema(config).await?;
        Ok(backend)
    }

    /// Create the extension, tables and indexes (idempotent)
    ///
    /// Timestamps are plain `TIMESTAMP` written in the UTC session zone and
    /// JSON columns are nullable. Reads cast to `timestamptz` so tables
    /// created with `TIMESTAMPTZ` columns decode the same way.
    pub async fn init_schema(&self, config: &DatabaseConfig) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS rag_documents (
                id BIGSERIAL PRIMARY KEY,
                source_type VARCHAR(50) NOT NULL,
                symbol VARCHAR(20),
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata JSONB DEFAULT '{{}}',
                embedding vector({EMBEDDING_DIM}),
                created_at TIMESTAMP DEFAULT NOW(),
                expires_at TIMESTAMP
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS rag_chat_history (
                id BIGSERIAL PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL,
                session_id VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL,
                content TEXT NOT NULL,
                sources JSONB DEFAULT '[]',
                created_at TIMESTAMP DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS rag_ingestion_log (
                id BIGSERIAL PRIMARY KEY,
                source_type VARCHAR(50) NOT NULL,
                symbol VARCHAR(20),
                document_count INTEGER DEFAULT 0,
                last_ingested_at TIMESTAMP DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_rag_documents_type_symbol ON rag_documents(source_type, symbol)",
            "CREATE INDEX IF NOT EXISTS idx_rag_documents_expires ON rag_documents(expires_at)",
            "CREATE INDEX IF NOT EXISTS idx_rag_chat_session ON rag_chat_history(session_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_rag_ingestion_lookup ON rag_ingestion_log(source_type, symbol, last_ingested_at)",
        ];
        for statement in indexes {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        if config.enable_vector_index {
            info!(
                "Creating ivfflat index on rag_documents (lists={})",
                config.vector_index_lists
            );
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_rag_documents_embedding ON rag_documents \
                 USING ivfflat (embedding vector_cosine_ops) WITH (lists = {})",
                config.vector_index_lists
            ))
            .execute(&self.pool)
            .await?;
        }

        info!("✅ RAG schema ready");
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for PgVectorBackend {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_documents(
        &self,
        documents: &[NewDocument],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for (doc, embedding) in documents.iter().zip(embeddings) {
            sqlx::query(
                r"
                INSERT INTO rag_documents
                    (source_type, symbol, title, content, metadata, embedding, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(doc.source_type.as_str())
            .bind(doc.symbol.as_deref())
            .bind(&doc.title)
            .bind(&doc.content)
            .bind(Json(&doc.metadata))
            .bind(Vector::from(embedding.clone()))
            .bind(doc.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(documents.len())
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        let source_types: Option<Vec<String>> = filter.source_types.as_ref().map(|types| {
            types
                .iter()
                .map(|source_type| source_type.as_str().to_string())
                .collect()
        });

        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, source_type, symbol, title, content, metadata,
                   created_at::timestamptz AS created_at,
                   expires_at::timestamptz AS expires_at,
                   1 - (embedding <=> $1) AS score
            FROM rag_documents
            WHERE embedding IS NOT NULL
              AND (expires_at IS NULL OR expires_at > NOW())
              AND ($2::text IS NULL OR symbol = $2 OR symbol IS NULL)
              AND ($3::text[] IS NULL OR source_type = ANY($3))
              AND 1 - (embedding <=> $1) >= $4
            ORDER BY embedding <=> $1
            LIMIT $5
            ",
        )
        .bind(Vector::from(filter.embedding.clone()))
        .bind(filter.symbol.as_deref())
        .bind(source_types)
        .bind(filter.score_threshold)
        .bind(filter.top_k as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!("Similarity search matched {} rows", rows.len());
        Ok(rows.into_iter().filter_map(DocumentRow::into_hit).collect())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM rag_documents WHERE expires_at IS NOT NULL AND expires_at < NOW()",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_documents(
        &self,
        source_type: Option<SourceType>,
        symbol: Option<&str>,
    ) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM rag_documents
            WHERE ($1::text IS NULL OR source_type = $1)
              AND ($2::text IS NULL OR symbol = $2)
            ",
        )
        .bind(source_type.map(SourceType::as_str))
        .bind(symbol)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn counts_by_type(&self) -> Result<BTreeMap<SourceType, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT source_type, COUNT(*) FROM rag_documents GROUP BY source_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts: BTreeMap<SourceType, i64> =
            SourceType::ALL.iter().map(|t| (*t, 0)).collect();
        for (source_type, count) in rows {
            match SourceType::from_str(&source_type) {
                Ok(parsed) => {
                    counts.insert(parsed, count);
                }
                Err(_) => warn!("Ignoring {} documents of unknown type {}", count, source_type),
            }
        }
        Ok(counts)
    }

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO rag_chat_history (user_id, session_id, role, content, sources)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&message.user_id)
        .bind(&message.session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(Json(&message.sources))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn chat_history(&self, session_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatRow>(
            r"
            SELECT id, user_id, session_id, role, content, sources,
                   created_at::timestamptz AS created_at
            FROM rag_chat_history
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // Fetched newest first; callers want chronological order
        let mut messages: Vec<ChatMessage> =
            rows.into_iter().filter_map(ChatRow::into_message).collect();
        messages.reverse();
        Ok(messages)
    }

    async fn insert_ingestion_log(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        document_count: i32,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO rag_ingestion_log (source_type, symbol, document_count)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(source_type.as_str())
        .bind(symbol)
        .bind(document_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn last_ingestion(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(
            r"
            SELECT last_ingested_at::timestamptz FROM rag_ingestion_log
            WHERE source_type = $1
              AND (($2::text IS NULL AND symbol IS NULL) OR symbol = $2)
            ORDER BY last_ingested_at DESC
            LIMIT 1
            ",
        )
        .bind(source_type.as_str())
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(at,)| at))
    }
}
