//! Funding rounds: per-record normalization and dashboard aggregation.

use crate::models::{
    text_of, CategoryMetrics, FundingDashboard, InvestorMetrics, MonthlyFunding,
    ProcessedFundingRecord, RawFundingRecord, RawValue, RecordQuality, WindowSummary,
};
use crate::transform::parsers::{format_amount, parse_amount, parse_date, split_list};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

pub const TOP_INVESTORS: usize = 10;
pub const TOP_CATEGORIES: usize = 10;
pub const MONTHS_SHOWN: usize = 12;
pub const RECENT_WINDOWS: [i64; 2] = [7, 30];

// ── Category classification ───────────────────────────────────────────────────

// Vertical categories come before Infrastructure, which owns the generic
// words. Checked in order; the first category with a keyword hit wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("DeFi", &[
        "defi", "dex", "decentralized", "lending", "yield", "stablecoin", "amm",
        "derivatives", "perps",
    ]),
    ("Layer 2", &["layer 2", "layer2", "l2", "rollup", "rollups", "zk"]),
    ("Layer 1", &["layer 1", "layer1", "l1", "mainnet"]),
    ("AI", &["ai", "artificial intelligence", "machine learning", "agent", "agents"]),
    ("Gaming", &["gaming", "game", "games", "gamefi", "metaverse"]),
    ("NFT", &["nft", "nfts", "collectibles"]),
    ("Social", &["social", "socialfi", "community", "creator", "creators"]),
    ("CeFi", &["cefi", "exchange", "custody", "payments", "payment", "trading", "brokerage"]),
    ("Infrastructure", &[
        "infrastructure", "infra", "oracle", "wallet", "tooling", "developer",
        "bridge", "node", "rpc", "data", "security", "storage", "interoperability",
        "abstraction",
    ]),
];

pub const OTHER_CATEGORY: &str = "Other";

fn match_category(text: &str) -> Option<&'static str> {
    let haystack = text.to_lowercase();
    let words: HashSet<&str> = haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    CATEGORY_KEYWORDS.iter().find_map(|(category, keywords)| {
        let hit = keywords.iter().any(|kw| {
            if kw.contains(' ') {
                haystack.contains(kw)
            } else {
                words.contains(kw)
            }
        });
        hit.then_some(*category)
    })
}

/// Map the upstream category (or failing that, the description) onto the
/// fixed dashboard categories.
pub fn classify_category(category: Option<&str>, description: Option<&str>) -> String {
    category
        .and_then(match_category)
        .or_else(|| description.and_then(match_category))
        .unwrap_or(OTHER_CATEGORY)
        .to_string()
}

// ── Normalizer ────────────────────────────────────────────────────────────────

/// First candidate whose content satisfies `parse`.
fn first_parsed<T>(
    candidates: [&Option<RawValue>; 2],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    candidates
        .into_iter()
        .filter_map(text_of)
        .find_map(|s| parse(&s))
}

/// Normalize one upstream funding row.
///
/// `Date` and `Amount Raised` are swapped upstream, so both are probed by
/// content. Unparseable amounts become 0 and unparseable dates become
/// `today`; `quality` records which fallback was taken.
pub fn normalize_funding(raw: &RawFundingRecord, today: NaiveDate) -> ProcessedFundingRecord {
    let name = text_of(&raw.name).unwrap_or_else(|| "Unknown".to_string());

    let parsed_amount = first_parsed([&raw.date, &raw.amount_raised], parse_amount);
    let parsed_date = first_parsed([&raw.amount_raised, &raw.date], parse_date);

    if parsed_amount.is_none() {
        debug!("{}: unparseable amount, defaulting to 0", name);
    }
    if parsed_date.is_none() {
        debug!("{}: unparseable date, defaulting to {}", name, today);
    }

    let amount = parsed_amount.unwrap_or(0.0);
    let date = parsed_date.unwrap_or(today);

    let lead_investors = text_of(&raw.lead_investor)
        .map(|s| split_list(&s))
        .unwrap_or_default();
    let other_investors = text_of(&raw.other_investors)
        .map(|s| split_list(&s))
        .unwrap_or_default();
    let all_investors: Vec<String> = lead_investors
        .iter()
        .chain(other_investors.iter())
        .cloned()
        .collect();

    let category_raw = text_of(&raw.category);
    let description = text_of(&raw.description);

    ProcessedFundingRecord {
        amount_display: format_amount(amount),
        amount,
        date_display: date.format("%b %d, %Y").to_string(),
        month_label: date.format("%b %Y").to_string(),
        date,
        round: text_of(&raw.round),
        category: classify_category(category_raw.as_deref(), description.as_deref()),
        description,
        website: text_of(&raw.website),
        lead_investors,
        other_investors,
        all_investors,
        quality: RecordQuality {
            amount_parsed: parsed_amount.is_some(),
            date_parsed: parsed_date.is_some(),
        },
        name,
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

fn top_investors(records: &[ProcessedFundingRecord]) -> Vec<InvestorMetrics> {
    let mut by_investor: HashMap<&str, (f64, Vec<String>)> = HashMap::new();

    for record in records {
        // An investor named twice in one round is credited once
        let mut seen = HashSet::new();
        for investor in &record.all_investors {
            if !seen.insert(investor.as_str()) {
                continue;
            }
            let entry = by_investor.entry(investor.as_str()).or_default();
            entry.0 += record.amount;
            entry.1.push(record.name.clone());
        }
    }

    let mut investors: Vec<InvestorMetrics> = by_investor
        .into_iter()
        .map(|(name, (total, deals))| InvestorMetrics {
            name: name.to_string(),
            total_invested: total,
            total_display: format_amount(total),
            deal_count: deals.len(),
            deals,
        })
        .collect();

    investors.sort_by(|a, b| {
        b.total_invested
            .total_cmp(&a.total_invested)
            .then_with(|| a.name.cmp(&b.name))
    });
    investors.truncate(TOP_INVESTORS);
    investors
}

fn categories(records: &[ProcessedFundingRecord], total_raised: f64) -> Vec<CategoryMetrics> {
    let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        let entry = by_category.entry(record.category.as_str()).or_default();
        entry.0 += record.amount;
        entry.1 += 1;
    }

    let denominator = if total_raised > 0.0 { total_raised } else { 1.0 };

    let mut categories: Vec<CategoryMetrics> = by_category
        .into_iter()
        .map(|(category, (total, count))| CategoryMetrics {
            category: category.to_string(),
            total,
            total_display: format_amount(total),
            count,
            percentage: total / denominator * 100.0,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.category.cmp(&b.category))
    });
    categories.truncate(TOP_CATEGORIES);
    categories
}

fn monthly(records: &[ProcessedFundingRecord]) -> Vec<MonthlyFunding> {
    let mut by_month: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_month
            .entry((record.date.year(), record.date.month()))
            .or_default();
        entry.0 += record.amount;
        entry.1 += 1;
    }

    by_month
        .into_iter()
        .rev()
        .take(MONTHS_SHOWN)
        .filter_map(|((year, month), (total, count))| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(MonthlyFunding {
                month: first.format("%b %Y").to_string(),
                amount_billions: total / 1e9,
                deal_count: count,
            })
        })
        .collect()
}

/// Deals dated within the last `days` days, today included.
fn window(records: &[ProcessedFundingRecord], today: NaiveDate, days: i64) -> WindowSummary {
    let start = today - Duration::days(days);
    let (deal_count, amount) = records
        .iter()
        .filter(|r| r.date > start && r.date <= today)
        .fold((0usize, 0.0f64), |(n, sum), r| (n + 1, sum + r.amount));

    WindowSummary {
        days,
        deal_count,
        amount,
        amount_display: format_amount(amount),
    }
}

/// Reduce normalized rounds into the funding dashboard payload.
pub fn aggregate_funding(
    records: Vec<ProcessedFundingRecord>,
    today: NaiveDate,
) -> FundingDashboard {
    let total_raised: f64 = records.iter().map(|r| r.amount).sum();
    let deal_count = records.len();
    let average_deal = if deal_count > 0 {
        total_raised / deal_count as f64
    } else {
        0.0
    };

    let mut records = records;
    records.sort_by(|a, b| b.date.cmp(&a.date));

    FundingDashboard {
        total_raised_display: format_amount(total_raised),
        average_deal_display: format_amount(average_deal),
        top_investors: top_investors(&records),
        categories: categories(&records, total_raised),
        monthly: monthly(&records),
        recent: RECENT_WINDOWS
            .iter()
            .map(|days| window(&records, today, *days))
            .collect(),
        total_raised,
        deal_count,
        average_deal,
        records,
    }
}

/// Normalize and aggregate in one pass over the raw rows.
pub fn build_funding_dashboard(raws: &[RawFundingRecord], today: NaiveDate) -> FundingDashboard {
    let records: Vec<ProcessedFundingRecord> =
        raws.iter().map(|raw| normalize_funding(raw, today)).collect();
    aggregate_funding(records, today)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn raw(name: &str, date: &str, amount: &str, lead: &str, other: &str) -> RawFundingRecord {
        RawFundingRecord {
            name: Some(RawValue::text(name)),
            date: Some(RawValue::text(date)),
            amount_raised: Some(RawValue::text(amount)),
            lead_investor: Some(RawValue::text(lead)),
            other_investors: Some(RawValue::text(other)),
            ..Default::default()
        }
    }

    fn record(name: &str, amount: f64, date: NaiveDate, category: &str, investors: &[&str]) -> ProcessedFundingRecord {
        let mut r = normalize_funding(&RawFundingRecord::default(), date);
        r.name = name.to_string();
        r.amount = amount;
        r.date = date;
        r.category = category.to_string();
        r.all_investors = investors.iter().map(|s| s.to_string()).collect();
        r
    }

    #[test]
    fn test_normalize_swapped_fields() {
        let r = normalize_funding(&raw("Acme", "$5m", "01 Jan 2025", "A, B", "C"), today());
        assert_eq!(r.amount, 5_000_000.0);
        assert_eq!(r.amount_display, "$5M");
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(r.lead_investors, vec!["A", "B"]);
        assert_eq!(r.all_investors, vec!["A", "B", "C"]);
        assert!(r.quality.amount_parsed && r.quality.date_parsed);
    }

    #[test]
    fn test_normalize_unswapped_fields() {
        let r = normalize_funding(&raw("Beta", "2025-02-10", "$1.2B", "", ""), today());
        assert_eq!(r.amount, 1_200_000_000.0);
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert_eq!(r.month_label, "Feb 2025");
        assert!(r.all_investors.is_empty());
    }

    #[test]
    fn test_normalize_fallbacks_flagged() {
        let r = normalize_funding(&raw("Gamma", "Undisclosed", "soon", "X", ""), today());
        assert_eq!(r.amount, 0.0);
        assert_eq!(r.amount_display, "$0");
        assert_eq!(r.date, today());
        assert!(!r.quality.amount_parsed);
        assert!(!r.quality.date_parsed);
    }

    #[test]
    fn test_normalize_numeric_amount() {
        let mut input = raw("Delta", "", "2024-12-01", "", "");
        input.date = Some(RawValue::Number(2_500_000.0));
        let r = normalize_funding(&input, today());
        assert_eq!(r.amount, 2_500_000.0);
        assert_eq!(r.amount_display, "$3M");
    }

    #[test]
    fn test_normalize_overflowing_amount_falls_back() {
        let huge = format!("${}", "9".repeat(400));
        let r = normalize_funding(&raw("Omega", &huge, "2024-12-01", "", ""), today());
        assert_eq!(r.amount, 0.0);
        assert!(!r.quality.amount_parsed);

        let dash = aggregate_funding(vec![r], today());
        assert!(dash.total_raised.is_finite());
        assert!(dash.categories.iter().all(|c| c.percentage.is_finite()));
    }

    #[test]
    fn test_classify_category() {
        assert_eq!(classify_category(Some("DeFi"), None), "DeFi");
        assert_eq!(classify_category(Some("ZK Rollup"), None), "Layer 2");
        assert_eq!(classify_category(None, Some("An AI agent network")), "AI");
        assert_eq!(classify_category(Some("Web3 Gaming"), None), "Gaming");
        assert_eq!(classify_category(Some("misc"), Some("")), "Other");
        assert_eq!(classify_category(None, None), "Other");
        // "ai" must match as a word, not inside "chain"
        assert_eq!(classify_category(Some("Chain abstraction"), None), "Infrastructure");
    }

    #[test]
    fn test_classify_generic_words_do_not_win() {
        assert_eq!(classify_category(Some("Blockchain Infrastructure"), None), "Infrastructure");
        assert_eq!(classify_category(Some("Blockchain Gaming"), None), "Gaming");
        assert_eq!(classify_category(Some("AI Data"), None), "AI");
        assert_eq!(classify_category(Some("Blockchain"), None), "Other");
        assert_eq!(classify_category(Some("Decentralized Exchange"), None), "DeFi");
    }

    #[test]
    fn test_top_investors_sorted_and_truncated() {
        let d = today();
        let mut records: Vec<_> = (0..12)
            .map(|i| {
                let investor = format!("inv{}", i);
                record(&format!("deal{}", i), (i + 1) as f64 * 1e6, d, "DeFi", &[investor.as_str()])
            })
            .collect();
        records.push(record("big", 50e6, d, "DeFi", &["inv0", "inv0", "solo"]));

        let dash = aggregate_funding(records, d);
        assert_eq!(dash.top_investors.len(), 10);
        let first = &dash.top_investors[0];
        assert_eq!(first.name, "inv0");
        assert_eq!(first.total_invested, 51e6);
        assert_eq!(first.deals, vec!["deal0", "big"]);
        assert_eq!(dash.top_investors[1].name, "solo");
    }

    #[test]
    fn test_category_percentages() {
        let d = today();
        let records = vec![
            record("a", 30e6, d, "DeFi", &[]),
            record("b", 10e6, d, "AI", &[]),
            record("c", 60e6, d, "DeFi", &[]),
        ];
        let dash = aggregate_funding(records, d);
        assert_eq!(dash.categories[0].category, "DeFi");
        assert_eq!(dash.categories[0].count, 2);
        assert!((dash.categories[0].percentage - 90.0).abs() < 1e-9);
        let sum: f64 = dash.categories.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_percentages_truncated_below_100() {
        let d = today();
        let names = ["DeFi", "AI", "NFT", "Gaming", "Social", "CeFi", "Layer 1", "Layer 2", "Infrastructure", "Other", "Extra"];
        let records: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, c)| record(c, (i + 1) as f64, d, c, &[]))
            .collect();
        let dash = aggregate_funding(records, d);
        assert_eq!(dash.categories.len(), 10);
        let sum: f64 = dash.categories.iter().map(|c| c.percentage).sum();
        assert!(sum < 100.0);
    }

    #[test]
    fn test_zero_total_has_no_nan() {
        let d = today();
        let dash = aggregate_funding(vec![record("a", 0.0, d, "AI", &[])], d);
        assert_eq!(dash.categories[0].percentage, 0.0);
        assert_eq!(dash.average_deal, 0.0);

        let empty = aggregate_funding(vec![], d);
        assert_eq!(empty.deal_count, 0);
        assert_eq!(empty.average_deal, 0.0);
        assert!(empty.categories.is_empty());
    }

    #[test]
    fn test_small_month_keeps_precision() {
        let d = today();
        let dash = aggregate_funding(vec![record("seed", 3e6, d, "AI", &[])], d);
        assert_eq!(dash.monthly.len(), 1);
        assert!(dash.monthly[0].amount_billions > 0.0);
        assert!((dash.monthly[0].amount_billions - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_descending_and_capped() {
        let records: Vec<_> = (1..=14)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024 + (i - 1) / 12, ((i - 1) % 12 + 1) as u32, 5).unwrap();
                record("m", 1e9, date, "DeFi", &[])
            })
            .collect();
        let dash = aggregate_funding(records, today());
        assert_eq!(dash.monthly.len(), 12);
        assert_eq!(dash.monthly[0].month, "Feb 2025");
        assert_eq!(dash.monthly[0].amount_billions, 1.0);
        assert_eq!(dash.monthly[11].month, "Mar 2024");
    }

    #[test]
    fn test_recent_windows() {
        let d = today();
        let records = vec![
            record("today", 1e6, d, "AI", &[]),
            record("week", 2e6, d - Duration::days(6), "AI", &[]),
            record("month", 3e6, d - Duration::days(20), "AI", &[]),
            record("old", 4e6, d - Duration::days(45), "AI", &[]),
        ];
        let dash = aggregate_funding(records, d);
        assert_eq!(dash.recent[0].days, 7);
        assert_eq!(dash.recent[0].deal_count, 2);
        assert_eq!(dash.recent[1].deal_count, 3);
        assert_eq!(dash.recent[1].amount, 6e6);
        assert_eq!(dash.records[0].name, "today");
    }
}
