use super::RawValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Raw listing row ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawListingRecord {
    pub ticker: Option<RawValue>,
    pub name: Option<RawValue>,
    /// Exchange that announced this listing.
    pub exchange: Option<RawValue>,
    /// Comma-separated list of every exchange carrying the token.
    pub exchanges: Option<RawValue>,
    #[serde(rename = "exchangeCount")]
    pub exchange_count: Option<RawValue>,
    pub price: Option<RawValue>,
    #[serde(rename = "priceChangePct24h")]
    pub price_change_pct_24h: Option<RawValue>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<RawValue>,
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<RawValue>,
    #[serde(rename = "listedAt")]
    pub listed_at: Option<RawValue>,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: Option<RawValue>,
}

// ── Momentum ──────────────────────────────────────────────────────────────────

/// Coarse label for 24h price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Momentum {
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "GROWING")]
    Growing,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "DECLINING")]
    Declining,
    #[serde(rename = "LOW")]
    Low,
}

impl Momentum {
    pub const ALL: [Momentum; 6] = [
        Momentum::VeryHigh,
        Momentum::High,
        Momentum::Growing,
        Momentum::Medium,
        Momentum::Declining,
        Momentum::Low,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Momentum::VeryHigh => "VERY HIGH",
            Momentum::High => "HIGH",
            Momentum::Growing => "GROWING",
            Momentum::Medium => "MEDIUM",
            Momentum::Declining => "DECLINING",
            Momentum::Low => "LOW",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Momentum::VeryHigh => "#059669",
            Momentum::High => "#10b981",
            Momentum::Growing => "#34d399",
            Momentum::Medium => "#6b7280",
            Momentum::Declining => "#f59e0b",
            Momentum::Low => "#ef4444",
        }
    }
}

// ── Processed listing ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedListing {
    pub ticker: String,
    pub name: String,
    pub exchange: Option<String>,
    pub exchanges: Vec<String>,
    pub exchange_count: usize,
    pub price: Option<f64>,
    pub price_display: String,
    pub price_change_pct_24h: Option<f64>,
    pub price_change_display: String,
    pub market_cap: Option<f64>,
    pub market_cap_display: String,
    pub volume_24h: Option<f64>,
    pub volume_display: String,
    pub momentum: Momentum,
    pub momentum_color: String,
    pub listed_at: Option<DateTime<Utc>>,
    pub scraped_at: Option<DateTime<Utc>>,
}

// ── Views ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreemapNode {
    pub ticker: String,
    pub name: String,
    pub value: usize,
    pub momentum: Momentum,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeListingCount {
    pub exchange: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumCount {
    pub momentum: Momentum,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsMetrics {
    pub total_tokens: usize,
    pub multi_exchange_tokens: usize,
    pub cross_exchange_rate: f64,
    pub average_exchange_count: f64,
    pub momentum_distribution: Vec<MomentumCount>,
    pub exchange_breakdown: Vec<ExchangeListingCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsDashboard {
    pub processed_listings: Vec<ProcessedListing>,
    pub treemap: Vec<TreemapNode>,
    pub cards: Vec<ProcessedListing>,
    pub live_feed: Vec<ProcessedListing>,
    pub fastest_growing: Vec<ProcessedListing>,
    pub newest: Vec<ProcessedListing>,
    pub metrics: ListingsMetrics,
}
