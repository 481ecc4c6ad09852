use super::RawValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Raw funding row ───────────────────────────────────────────────────────────

/// Funding round as served by the upstream API.
///
/// Upstream swaps two columns: `Date` usually carries the amount string and
/// `Amount Raised` the date. Read them through the normalizer, never directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFundingRecord {
    #[serde(rename = "Name")]
    pub name: Option<RawValue>,
    #[serde(rename = "Date")]
    pub date: Option<RawValue>,
    #[serde(rename = "Amount Raised")]
    pub amount_raised: Option<RawValue>,
    #[serde(rename = "Round")]
    pub round: Option<RawValue>,
    #[serde(rename = "Category")]
    pub category: Option<RawValue>,
    #[serde(rename = "Description")]
    pub description: Option<RawValue>,
    #[serde(rename = "Lead Investor")]
    pub lead_investor: Option<RawValue>,
    #[serde(rename = "Other Investors")]
    pub other_investors: Option<RawValue>,
    #[serde(rename = "Website")]
    pub website: Option<RawValue>,
}

// ── Processed funding row ─────────────────────────────────────────────────────

/// Which fields fell back to a default during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuality {
    pub amount_parsed: bool,
    pub date_parsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFundingRecord {
    pub name: String,
    pub amount: f64,
    pub amount_display: String,
    pub date: NaiveDate,
    pub date_display: String,
    pub month_label: String,
    pub round: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub lead_investors: Vec<String>,
    pub other_investors: Vec<String>,
    pub all_investors: Vec<String>,
    pub quality: RecordQuality,
}

// ── Aggregates ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorMetrics {
    pub name: String,
    pub total_invested: f64,
    pub total_display: String,
    pub deal_count: usize,
    pub deals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub category: String,
    pub total: f64,
    pub total_display: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFunding {
    pub month: String,
    pub amount_billions: f64,
    pub deal_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub days: i64,
    pub deal_count: usize,
    pub amount: f64,
    pub amount_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingDashboard {
    pub records: Vec<ProcessedFundingRecord>,
    pub total_raised: f64,
    pub total_raised_display: String,
    pub deal_count: usize,
    pub average_deal: f64,
    pub average_deal_display: String,
    pub top_investors: Vec<InvestorMetrics>,
    pub categories: Vec<CategoryMetrics>,
    pub monthly: Vec<MonthlyFunding>,
    pub recent: Vec<WindowSummary>,
}
