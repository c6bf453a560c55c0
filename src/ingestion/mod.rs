//! Ingestion pipelines that turn raw financial content into stored documents
//!
//! Three sources feed the vector store:
//! - the static financial education catalog (seeded once, never expires)
//! - news articles for a symbol (expire after the news TTL)
//! - research summaries synthesized from risk, dividend and earnings data
//!   (expire after the research TTL)
//!
//! Every run, including empty and degraded ones, is written to the
//! ingestion log.

pub mod catalog;
pub mod trigger;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use tracing::info;
use tracing::warn;

pub use catalog::EducationEntry;
pub use catalog::FINANCIAL_EDUCATION;
pub use trigger::IngestReport;
pub use trigger::IngestTrigger;
pub use trigger::JsonDirResearchSource;
pub use trigger::ResearchSource;

use crate::config::default_news_ttl_days;
use crate::config::default_research_ttl_days;
use crate::config::is_valid_ttl_days;
use crate::config::RagConfig;
use crate::embeddings::EmbeddingService;
use crate::models::normalize_symbol;
use crate::models::DividendSummary;
use crate::models::DocumentMetadata;
use crate::models::EarningsSummary;
use crate::models::NewDocument;
use crate::models::NewsItem;
use crate::models::NewsProvenance;
use crate::models::ResearchInputs;
use crate::models::RiskMetrics;
use crate::models::SourceType;
use crate::models::TypedMetadata;
use crate::outcome::DegradedReason;
use crate::outcome::Outcome;
use crate::vector_store::VectorStore;

/// Writes embedded documents into the vector store
pub struct IngestionPipeline {
    embeddings: Arc<EmbeddingService>,
    store: Arc<VectorStore>,
    news_ttl: Duration,
    research_ttl: Duration,
}

impl IngestionPipeline {
    pub fn new(embeddings: Arc<EmbeddingService>, store: Arc<VectorStore>) -> Self {
        Self::with_config(embeddings, store, &RagConfig::default())
    }

    pub fn with_config(
        embeddings: Arc<EmbeddingService>,
        store: Arc<VectorStore>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            news_ttl: resolve_ttl("news", config.news_ttl_days, default_news_ttl_days()),
            research_ttl: resolve_ttl(
                "research",
                config.research_ttl_days,
                default_research_ttl_days(),
            ),
        }
    }

    pub const fn news_ttl(&self) -> Duration {
        self.news_ttl
    }

    pub const fn research_ttl(&self) -> Duration {
        self.research_ttl
    }

    /// Seed the education catalog unless it is already stored
    pub async fn ingest_financial_education(&self) -> Outcome<usize> {
        let existing = self
            .store
            .get_document_count(Some(SourceType::Education), None)
            .await;

        if let Some(reason) = existing.reason() {
            warn!("Cannot check existing education documents: {}", reason);
            let reason = reason.clone();
            self.store.log_ingestion(SourceType::Education, None, 0).await;
            return Outcome::degraded(0, reason);
        }

        let existing = existing.into_value();
        if existing >= FINANCIAL_EDUCATION.len() as i64 {
            info!("Education docs already ingested ({} docs), skipping", existing);
            self.store.log_ingestion(SourceType::Education, None, 0).await;
            return Outcome::healthy(0);
        }

        let texts: Vec<String> = FINANCIAL_EDUCATION
            .iter()
            .map(EducationEntry::embedding_text)
            .collect();
        let documents: Vec<NewDocument> = FINANCIAL_EDUCATION
            .iter()
            .map(|entry| NewDocument {
                source_type: SourceType::Education,
                symbol: None,
                title: entry.title.to_string(),
                content: entry.content.to_string(),
                metadata: DocumentMetadata::education(catalog::EDUCATION_CATEGORY),
                expires_at: None,
            })
            .collect();

        let outcome = self
            .embed_and_store(SourceType::Education, None, &documents, &texts)
            .await;
        info!("✅ Ingested {} financial education documents", outcome.value());
        outcome
    }

    /// Store news articles for one symbol
    pub async fn ingest_news_articles(&self, items: &[NewsItem], symbol: &str) -> Outcome<usize> {
        let symbol = normalize_symbol(symbol);
        let Some(expires_at) = expiry_after(self.news_ttl) else {
            self.store
                .log_ingestion(SourceType::News, symbol.as_deref(), 0)
                .await;
            return Outcome::degraded(0, expiry_overflow(self.news_ttl));
        };

        let mut seen = HashSet::new();
        let mut documents = Vec::new();
        let mut texts = Vec::new();

        for item in items {
            let key = item
                .url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(&item.title);
            if !seen.insert(key.to_string()) {
                warn!("Skipping duplicate news article: {}", item.title);
                continue;
            }

            let summary = item.summary.clone().unwrap_or_default();
            texts.push(format!("{}. {}", item.title, summary));
            documents.push(NewDocument {
                source_type: SourceType::News,
                symbol: symbol.clone(),
                title: item.title.clone(),
                content: summary,
                metadata: DocumentMetadata::Typed(TypedMetadata::News(news_provenance(item))),
                expires_at: Some(expires_at),
            });
        }

        let outcome = self
            .embed_and_store(SourceType::News, symbol.as_deref(), &documents, &texts)
            .await;
        info!(
            "✅ Ingested {} news articles for {}",
            outcome.value(),
            symbol.as_deref().unwrap_or("-")
        );
        outcome
    }

    /// Synthesize research documents from structured market data
    pub async fn ingest_market_research(
        &self,
        symbol: &str,
        inputs: &ResearchInputs,
    ) -> Outcome<usize> {
        let symbol = normalize_symbol(symbol);
        let label = symbol.as_deref().unwrap_or("?");
        let Some(expires_at) = expiry_after(self.research_ttl) else {
            self.store
                .log_ingestion(SourceType::Research, symbol.as_deref(), 0)
                .await;
            return Outcome::degraded(0, expiry_overflow(self.research_ttl));
        };

        let mut documents = Vec::new();

        if let Some(risk) = &inputs.risk {
            documents.push(NewDocument {
                source_type: SourceType::Research,
                symbol: symbol.clone(),
                title: format!("Risk Analysis: {label}"),
                content: risk_prose(label, risk),
                metadata: DocumentMetadata::Typed(TypedMetadata::RiskAnalysis(risk.clone())),
                expires_at: Some(expires_at),
            });
        }

        if let Some(dividend) = inputs.dividend.as_ref().filter(|d| d.has_dividends) {
            documents.push(NewDocument {
                source_type: SourceType::Research,
                symbol: symbol.clone(),
                title: format!("Dividend Data: {label}"),
                content: dividend_prose(label, dividend),
                metadata: DocumentMetadata::Typed(TypedMetadata::Dividend(dividend.clone())),
                expires_at: Some(expires_at),
            });
        }

        if let Some(earnings) = &inputs.earnings {
            documents.push(NewDocument {
                source_type: SourceType::Research,
                symbol: symbol.clone(),
                title: format!("Earnings Data: {label}"),
                content: earnings_prose(label, earnings),
                metadata: DocumentMetadata::Typed(TypedMetadata::Earnings(earnings.clone())),
                expires_at: Some(expires_at),
            });
        }

        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let outcome = self
            .embed_and_store(SourceType::Research, symbol.as_deref(), &documents, &texts)
            .await;
        info!("✅ Ingested {} research documents for {}", outcome.value(), label);
        outcome
    }

    /// Remove expired documents from the vector store
    pub async fn cleanup_expired(&self) -> Outcome<u64> {
        self.store.delete_expired().await
    }

    async fn embed_and_store(
        &self,
        source_type: SourceType,
        symbol: Option<&str>,
        documents: &[NewDocument],
        texts: &[String],
    ) -> Outcome<usize> {
        let outcome = if documents.is_empty() {
            Outcome::healthy(0)
        } else {
            match self.embeddings.embed_batch(texts).await {
                Outcome::Healthy(embeddings) => {
                    self.store.store_documents(documents, &embeddings).await
                }
                Outcome::Degraded { reason, .. } => Outcome::degraded(0, reason),
            }
        };

        self.store
            .log_ingestion(source_type, symbol, *outcome.value())
            .await;
        outcome
    }
}

/// TTL for `days`, or `fallback_days` when `days` is out of range
fn resolve_ttl(kind: &str, days: i64, fallback_days: i64) -> Duration {
    let days = if is_valid_ttl_days(days) {
        days
    } else {
        warn!(
            "Invalid {} TTL of {} days, using {} days",
            kind, days, fallback_days
        );
        fallback_days
    };
    Duration::try_days(days).unwrap_or_else(Duration::zero)
}

fn expiry_after(ttl: Duration) -> Option<DateTime<Utc>> {
    Utc::now().checked_add_signed(ttl)
}

fn expiry_overflow(ttl: Duration) -> DegradedReason {
    DegradedReason::OperationFailed(format!(
        "expiry {} days from now is out of range",
        ttl.num_days()
    ))
}

fn news_provenance(item: &NewsItem) -> NewsProvenance {
    NewsProvenance {
        source: item.source.clone().unwrap_or_else(|| "Unknown".to_string()),
        sentiment: item.sentiment.clone().unwrap_or_else(|| "NEUTRAL".to_string()),
        sentiment_score: item.sentiment_score.unwrap_or(0.0),
        published_at: item.published_at.clone().unwrap_or_default(),
        url: item.url.clone().unwrap_or_default(),
    }
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn risk_prose(symbol: &str, risk: &RiskMetrics) -> String {
    format!(
        "Risk Analysis for {symbol}: Beta: {}, Volatility: {}%, Sharpe Ratio: {}, \
         Max Drawdown: {}%, Value at Risk (95%): {}%, Risk Level: {}",
        or_na(risk.beta),
        or_na(risk.volatility),
        or_na(risk.sharpe_ratio),
        or_na(risk.max_drawdown),
        or_na(risk.value_at_risk),
        or_na(risk.risk_level.as_deref()),
    )
}

fn dividend_prose(symbol: &str, dividend: &DividendSummary) -> String {
    let mut content = format!(
        "Dividend Data for {symbol}: Annual Yield: {}%, Annual Dividend: ${}, \
         Payout Frequency: {}. ",
        dividend.annual_yield.unwrap_or(0.0),
        dividend.annual_dividend.unwrap_or(0.0),
        or_na(dividend.payout_frequency.as_deref()),
    );

    if let Some(next) = &dividend.next_dividend {
        content.push_str(&format!(
            "Next ex-date: {}, Amount: ${}",
            or_na(next.ex_date.as_deref()),
            next.amount.unwrap_or(0.0)
        ));
    }
    content
}

fn earnings_prose(symbol: &str, earnings: &EarningsSummary) -> String {
    let mut content = format!("Earnings Data for {symbol}: ");

    if earnings.has_upcoming {
        content.push_str(&format!(
            "Next Earnings: {} ({} days away), Fiscal Quarter: {}, EPS Estimate: {}. ",
            or_na(earnings.next_earnings_date.as_deref()),
            earnings
                .days_until_earnings
                .map_or_else(|| "?".to_string(), |days| days.to_string()),
            or_na(earnings.fiscal_quarter.as_deref()),
            or_na(earnings.next_eps_estimate),
        ));
    }

    if let Some(recent) = earnings.history.first() {
        content.push_str(&format!(
            "Last Earnings: EPS Actual {} vs Estimate {}, Surprise: {}%",
            or_na(recent.eps_actual),
            or_na(recent.eps_estimate),
            or_na(recent.surprise),
        ));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EarningsRecord;
    use crate::models::NextDividend;

    #[test]
    fn test_risk_prose_uses_placeholders() {
        let risk = RiskMetrics {
            beta: Some(1.2),
            risk_level: Some("MODERATE".to_string()),
            ..RiskMetrics::default()
        };
        assert_eq!(
            risk_prose("AAPL", &risk),
            "Risk Analysis for AAPL: Beta: 1.2, Volatility: N/A%, Sharpe Ratio: N/A, \
             Max Drawdown: N/A%, Value at Risk (95%): N/A%, Risk Level: MODERATE"
        );
    }

    #[test]
    fn test_dividend_prose_with_next_payment() {
        let dividend = DividendSummary {
            has_dividends: true,
            annual_yield: Some(0.5),
            annual_dividend: Some(0.96),
            payout_frequency: Some("Quarterly".to_string()),
            next_dividend: Some(NextDividend {
                ex_date: Some("2024-02-09".to_string()),
                amount: Some(0.24),
            }),
        };
        assert_eq!(
            dividend_prose("AAPL", &dividend),
            "Dividend Data for AAPL: Annual Yield: 0.5%, Annual Dividend: $0.96, \
             Payout Frequency: Quarterly. Next ex-date: 2024-02-09, Amount: $0.24"
        );
    }

    #[test]
    fn test_earnings_prose_uses_most_recent_report() {
        let earnings = EarningsSummary {
            has_upcoming: true,
            next_earnings_date: Some("2024-05-02".to_string()),
            days_until_earnings: None,
            fiscal_quarter: Some("Q2".to_string()),
            next_eps_estimate: Some(1.5),
            history: vec![
                EarningsRecord {
                    eps_actual: Some(2.18),
                    eps_estimate: Some(2.1),
                    surprise: Some(3.8),
                },
                EarningsRecord {
                    eps_actual: Some(1.46),
                    ..EarningsRecord::default()
                },
            ],
        };
        assert_eq!(
            earnings_prose("AAPL", &earnings),
            "Earnings Data for AAPL: Next Earnings: 2024-05-02 (? days away), \
             Fiscal Quarter: Q2, EPS Estimate: 1.5. \
             Last Earnings: EPS Actual 2.18 vs Estimate 2.1, Surprise: 3.8%"
        );
    }

    #[test]
    fn test_out_of_range_ttl_falls_back_to_default() {
        assert_eq!(resolve_ttl("news", 1_000_000_000, 30), Duration::days(30));
        assert_eq!(resolve_ttl("news", -5, 30), Duration::days(30));
        assert_eq!(resolve_ttl("news", 0, 30), Duration::days(30));
        assert_eq!(resolve_ttl("research", 14, 7), Duration::days(14));
    }

    #[test]
    fn test_expiry_after_overflow_is_none() {
        assert!(expiry_after(Duration::days(30)).is_some());
        assert!(expiry_after(Duration::MAX).is_none());
    }

    #[test]
    fn test_news_provenance_defaults() {
        let item = NewsItem {
            title: "Headline".to_string(),
            ..NewsItem::default()
        };
        let provenance = news_provenance(&item);
        assert_eq!(provenance.source, "Unknown");
        assert_eq!(provenance.sentiment, "NEUTRAL");
        assert!(provenance.url.is_empty());
    }
}
