//! Manual ingestion triggers
//!
//! The core has no scheduler. A cron job, an admin endpoint or the CLI
//! builds an [`IngestTrigger`] and hands it to
//! [`IngestionPipeline::run_trigger`].

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use super::IngestionPipeline;
use crate::errors::Result;
use crate::models::ResearchInputs;
use crate::outcome::DegradedReason;

/// What to (re)ingest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sourceType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestTrigger {
    Education,
    Research { symbols: Vec<String> },
    Cleanup,
}

/// Result of a triggered run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub trigger: IngestTrigger,
    /// Documents ingested, or documents deleted for a cleanup
    pub count: u64,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

/// Supplier of structured research data for a symbol
#[async_trait]
pub trait ResearchSource: Send + Sync {
    async fn research_inputs(&self, symbol: &str) -> Result<ResearchInputs>;
}

/// Reads `<dir>/<SYMBOL>.json` files in the producers' camelCase shape
#[derive(Debug, Clone)]
pub struct JsonDirResearchSource {
    dir: PathBuf,
}

impl JsonDirResearchSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ResearchSource for JsonDirResearchSource {
    async fn research_inputs(&self, symbol: &str) -> Result<ResearchInputs> {
        let path = self.dir.join(format!("{}.json", symbol.trim().to_uppercase()));
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl IngestionPipeline {
    /// Dispatch a manual trigger and report what happened
    pub async fn run_trigger(
        &self,
        trigger: IngestTrigger,
        research: &dyn ResearchSource,
    ) -> IngestReport {
        let mut problems: Vec<DegradedReason> = Vec::new();

        let count = match &trigger {
            IngestTrigger::Education => {
                let outcome = self.ingest_financial_education().await;
                problems.extend(outcome.reason().cloned());
                outcome.into_value() as u64
            }
            IngestTrigger::Cleanup => {
                let outcome = self.cleanup_expired().await;
                problems.extend(outcome.reason().cloned());
                outcome.into_value()
            }
            IngestTrigger::Research { symbols } => {
                let mut total = 0u64;
                for symbol in symbols {
                    let inputs = match research.research_inputs(symbol).await {
                        Ok(inputs) => inputs,
                        Err(e) => {
                            warn!("No research data for {}: {}", symbol, e);
                            problems.push(DegradedReason::OperationFailed(format!("{symbol}: {e}")));
                            continue;
                        }
                    };
                    let outcome = self.ingest_market_research(symbol, &inputs).await;
                    problems.extend(outcome.reason().cloned());
                    total += outcome.into_value() as u64;
                }
                total
            }
        };

        info!("Trigger {:?} finished: {} documents", trigger, count);
        IngestReport {
            trigger,
            count,
            degraded: !problems.is_empty(),
            problems: problems.iter().map(ToString::to_string).collect(),
        }
    }
}
