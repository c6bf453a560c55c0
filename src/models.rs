use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::FinRagError;

/// Provenance tag of a stored document; drives its default expiry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    News,
    Education,
    Research,
}

impl SourceType {
    pub const ALL: [Self; 3] = [Self::News, Self::Education, Self::Research];

    /// Storage representation (`NEWS`, `EDUCATION`, ...)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::News => "NEWS",
            Self::Education => "EDUCATION",
            Self::Research => "RESEARCH",
        }
    }

    /// Human label used in prompt context, e.g. `MARKET_REPORT` -> `Market Report`
    pub fn label(self) -> String {
        self.as_str()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = FinRagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEWS" => Ok(Self::News),
            "EDUCATION" => Ok(Self::Education),
            "RESEARCH" => Ok(Self::Research),
            other => Err(FinRagError::InvalidInput(format!(
                "unknown source type: {other}"
            ))),
        }
    }
}

/// Trim and upper-case a ticker; blank input means "no symbol"
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

// ====== Metadata ======

/// Per-document metadata, typed where the shape is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentMetadata {
    Typed(TypedMetadata),
    /// Anything that does not match a known shape is kept verbatim
    Open(serde_json::Map<String, serde_json::Value>),
}

impl DocumentMetadata {
    pub fn education(category: &str) -> Self {
        Self::Typed(TypedMetadata::Education {
            category: category.to_string(),
        })
    }

    pub const fn typed(&self) -> Option<&TypedMetadata> {
        match self {
            Self::Typed(typed) => Some(typed),
            Self::Open(_) => None,
        }
    }
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self::Open(serde_json::Map::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum TypedMetadata {
    News(NewsProvenance),
    RiskAnalysis(RiskMetrics),
    Dividend(DividendSummary),
    Earnings(EarningsSummary),
    Education { category: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsProvenance {
    pub source: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub published_at: String,
    pub url: String,
}

// ====== Documents ======

/// A document ready to be embedded and stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub source_type: SourceType,
    pub symbol: Option<String>,
    pub title: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A stored document (embedding omitted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub source_type: SourceType,
    pub symbol: Option<String>,
    pub title: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Document returned from similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    /// `1 - cosine_distance`, rounded to 4 decimals
    pub score: f64,
}

impl SearchHit {
    pub fn citation(&self) -> SourceCitation {
        SourceCitation {
            title: self.document.title.clone(),
            source_type: self.document.source_type,
            symbol: self.document.symbol.clone(),
            score: self.score,
        }
    }
}

pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

// ====== Chat history ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for ChatRole {
    type Err = FinRagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(FinRagError::InvalidInput(format!("unknown chat role: {other}"))),
        }
    }
}

/// Citation attached to an assistant turn that used retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub source_type: SourceType,
    pub symbol: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub user_id: String,
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    pub sources: Vec<SourceCitation>,
}

impl NewChatMessage {
    pub fn user(user_id: &str, session_id: &str, content: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            role: ChatRole::User,
            content: content.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(
        user_id: &str,
        session_id: &str,
        content: &str,
        sources: Vec<SourceCitation>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            role: ChatRole::Assistant,
            content: content.to_string(),
            sources,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: String,
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    pub sources: Vec<SourceCitation>,
    pub created_at: DateTime<Utc>,
}

// ====== Ingestion audit ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionLogEntry {
    pub id: i64,
    pub source_type: SourceType,
    pub symbol: Option<String>,
    pub document_count: i32,
    pub last_ingested_at: DateTime<Utc>,
}

// ====== Producer inputs ======
//
// Shapes follow the JSON emitted by the market-data services (camelCase).
// Numeric correctness is not validated; values are only rendered into prose.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsItem {
    pub title: String,
    #[serde(alias = "description")]
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskMetrics {
    pub beta: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub value_at_risk: Option<f64>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextDividend {
    pub ex_date: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividendSummary {
    pub has_dividends: bool,
    pub annual_yield: Option<f64>,
    pub annual_dividend: Option<f64>,
    pub payout_frequency: Option<String>,
    pub next_dividend: Option<NextDividend>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarningsRecord {
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub surprise: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarningsSummary {
    pub has_upcoming: bool,
    pub next_earnings_date: Option<String>,
    pub days_until_earnings: Option<i64>,
    pub fiscal_quarter: Option<String>,
    pub next_eps_estimate: Option<f64>,
    /// Most recent report first
    pub history: Vec<EarningsRecord>,
}

/// Structured research inputs for one symbol; absent parts produce no document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchInputs {
    #[serde(alias = "riskData")]
    pub risk: Option<RiskMetrics>,
    #[serde(alias = "dividendData")]
    pub dividend: Option<DividendSummary>,
    #[serde(alias = "earningsData")]
    pub earnings: Option<EarningsSummary>,
}

impl ResearchInputs {
    pub const fn is_empty(&self) -> bool {
        self.risk.is_none() && self.dividend.is_none() && self.earnings.is_none()
    }
}

// ====== User context ======

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Holding {
    pub symbol: Option<String>,
    pub quantity: f64,
    pub average_purchase_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchlistItem {
    pub symbol: Option<String>,
}

/// Optional portfolio and watchlist supplied by the caller for prompt building
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserContext {
    pub portfolio: Vec<Holding>,
    pub watchlist: Vec<WatchlistItem>,
}
