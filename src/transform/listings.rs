//! Exchange listings: ticker deduplication, momentum classification and the
//! derived dashboard views.

use crate::models::{
    number_of, text_of, ExchangeListingCount, ListingsDashboard, ListingsMetrics, Momentum,
    MomentumCount, ProcessedListing, RawListingRecord, TreemapNode,
};
use crate::transform::parsers::{
    format_amount, format_pct, format_price, normalise_ticker, parse_timestamp, percentage,
    split_list,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const TREEMAP_SIZE: usize = 20;
pub const CARD_COUNT: usize = 8;
pub const LIVE_FEED_SIZE: usize = 10;
pub const HIGHLIGHT_SIZE: usize = 4;

// ── Momentum ──────────────────────────────────────────────────────────────────

impl Momentum {
    /// Threshold ladder over the 24h percent change.
    pub fn classify(change_pct_24h: Option<f64>) -> Self {
        match change_pct_24h {
            None => Momentum::Medium,
            Some(p) if p >= 20.0 => Momentum::VeryHigh,
            Some(p) if p >= 10.0 => Momentum::High,
            Some(p) if p >= 0.0 => Momentum::Growing,
            Some(p) if p >= -10.0 => Momentum::Declining,
            Some(_) => Momentum::Low,
        }
    }
}

// ── Row → ProcessedListing ────────────────────────────────────────────────────

fn exchanges_of(raw: &RawListingRecord, primary: Option<&str>) -> Vec<String> {
    let mut exchanges = text_of(&raw.exchanges)
        .map(|s| split_list(&s))
        .unwrap_or_default();
    if let Some(primary) = primary {
        if !exchanges.iter().any(|e| e.eq_ignore_ascii_case(primary)) {
            exchanges.insert(0, primary.to_string());
        }
    }
    exchanges
}

/// Convert a row; `None` when it carries no ticker.
pub fn process_listing(raw: &RawListingRecord) -> Option<ProcessedListing> {
    let ticker = normalise_ticker(&text_of(&raw.ticker)?);
    if ticker.is_empty() {
        return None;
    }

    let exchange = text_of(&raw.exchange);
    let exchanges = exchanges_of(raw, exchange.as_deref());
    let exchange_count = number_of(&raw.exchange_count)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as usize)
        .unwrap_or(exchanges.len());

    let price = number_of(&raw.price);
    let change = number_of(&raw.price_change_pct_24h);
    let market_cap = number_of(&raw.market_cap);
    let volume = number_of(&raw.volume_24h);
    let momentum = Momentum::classify(change);

    Some(ProcessedListing {
        name: text_of(&raw.name).unwrap_or_else(|| ticker.clone()),
        ticker,
        exchange,
        exchanges,
        exchange_count,
        price,
        price_display: format_price(price),
        price_change_pct_24h: change,
        price_change_display: format_pct(change),
        market_cap,
        market_cap_display: market_cap.map(format_amount).unwrap_or_else(|| "—".into()),
        volume_24h: volume,
        volume_display: volume.map(format_amount).unwrap_or_else(|| "—".into()),
        momentum,
        momentum_color: momentum.color().to_string(),
        listed_at: text_of(&raw.listed_at).and_then(|s| parse_timestamp(&s)),
        scraped_at: text_of(&raw.scraped_at).and_then(|s| parse_timestamp(&s)),
    })
}

/// First-seen-wins deduplication by ticker. Later rows for a ticker already
/// seen are dropped entirely, never merged.
pub fn dedupe_listings(raws: &[RawListingRecord]) -> Vec<ProcessedListing> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raws.len());
    for listing in raws.iter().filter_map(process_listing) {
        if seen.insert(listing.ticker.clone()) {
            out.push(listing);
        } else {
            debug!("Dropping duplicate listing row for {}", listing.ticker);
        }
    }
    out
}

/// Re-apply the first-seen-wins rule to already processed listings.
pub fn dedupe_processed(listings: Vec<ProcessedListing>) -> Vec<ProcessedListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|l| seen.insert(l.ticker.clone()))
        .collect()
}

// ── Views ─────────────────────────────────────────────────────────────────────

fn by_exchange_count(a: &ProcessedListing, b: &ProcessedListing) -> Ordering {
    b.exchange_count.cmp(&a.exchange_count)
}

/// Newest first; rows without a timestamp sink to the end.
fn by_time_desc(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    b.cmp(&a)
}

fn sorted_top(
    listings: &[ProcessedListing],
    n: usize,
    cmp: impl FnMut(&ProcessedListing, &ProcessedListing) -> Ordering,
) -> Vec<ProcessedListing> {
    let mut view = listings.to_vec();
    view.sort_by(cmp);
    view.truncate(n);
    view
}

pub fn treemap(listings: &[ProcessedListing]) -> Vec<TreemapNode> {
    sorted_top(listings, TREEMAP_SIZE, by_exchange_count)
        .into_iter()
        .map(|l| TreemapNode {
            value: l.exchange_count,
            color: l.momentum_color,
            momentum: l.momentum,
            ticker: l.ticker,
            name: l.name,
        })
        .collect()
}

pub fn cards(listings: &[ProcessedListing]) -> Vec<ProcessedListing> {
    sorted_top(listings, CARD_COUNT, by_exchange_count)
}

pub fn live_feed(listings: &[ProcessedListing]) -> Vec<ProcessedListing> {
    sorted_top(listings, LIVE_FEED_SIZE, |a, b| {
        by_time_desc(a.listed_at.or(a.scraped_at), b.listed_at.or(b.scraped_at))
    })
}

pub fn fastest_growing(listings: &[ProcessedListing]) -> Vec<ProcessedListing> {
    let with_change: Vec<ProcessedListing> = listings
        .iter()
        .filter(|l| l.price_change_pct_24h.is_some())
        .cloned()
        .collect();
    sorted_top(&with_change, HIGHLIGHT_SIZE, |a, b| {
        let (a, b) = (a.price_change_pct_24h.unwrap_or(0.0), b.price_change_pct_24h.unwrap_or(0.0));
        b.total_cmp(&a)
    })
}

pub fn newest(listings: &[ProcessedListing]) -> Vec<ProcessedListing> {
    sorted_top(listings, HIGHLIGHT_SIZE, |a, b| by_time_desc(a.scraped_at, b.scraped_at))
}

pub fn listings_metrics(listings: &[ProcessedListing]) -> ListingsMetrics {
    let total = listings.len();
    let multi = listings.iter().filter(|l| l.exchange_count > 1).count();
    let exchange_sum: usize = listings.iter().map(|l| l.exchange_count).sum();

    let mut momentum_counts: HashMap<Momentum, usize> = HashMap::new();
    for l in listings {
        *momentum_counts.entry(l.momentum).or_default() += 1;
    }
    let momentum_distribution = Momentum::ALL
        .into_iter()
        .map(|m| MomentumCount {
            momentum: m,
            count: momentum_counts.get(&m).copied().unwrap_or(0),
        })
        .collect();

    let mut per_exchange: HashMap<&str, usize> = HashMap::new();
    for l in listings {
        for e in &l.exchanges {
            *per_exchange.entry(e.as_str()).or_default() += 1;
        }
    }
    let mut exchange_breakdown: Vec<ExchangeListingCount> = per_exchange
        .into_iter()
        .map(|(exchange, count)| ExchangeListingCount {
            exchange: exchange.to_string(),
            count,
        })
        .collect();
    exchange_breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.exchange.cmp(&b.exchange)));

    ListingsMetrics {
        total_tokens: total,
        multi_exchange_tokens: multi,
        cross_exchange_rate: percentage(multi as f64, total as f64),
        average_exchange_count: if total > 0 {
            exchange_sum as f64 / total as f64
        } else {
            0.0
        },
        momentum_distribution,
        exchange_breakdown,
    }
}

/// Deduplicate the raw rows and derive every dashboard view from the result.
pub fn build_listings_dashboard(raws: &[RawListingRecord]) -> ListingsDashboard {
    let processed = dedupe_listings(raws);
    debug!("{} raw listing rows → {} unique tickers", raws.len(), processed.len());

    ListingsDashboard {
        treemap: treemap(&processed),
        cards: cards(&processed),
        live_feed: live_feed(&processed),
        fastest_growing: fastest_growing(&processed),
        newest: newest(&processed),
        metrics: listings_metrics(&processed),
        processed_listings: processed,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    fn row(ticker: &str, exchanges: &str, change: Option<f64>, scraped: &str) -> RawListingRecord {
        RawListingRecord {
            ticker: Some(RawValue::text(ticker)),
            name: Some(RawValue::text(format!("{} Token", ticker))),
            exchanges: Some(RawValue::text(exchanges)),
            price_change_pct_24h: change.map(RawValue::Number),
            scraped_at: Some(RawValue::text(scraped)),
            ..Default::default()
        }
    }

    #[test]
    fn test_momentum_ladder() {
        assert_eq!(Momentum::classify(Some(25.0)), Momentum::VeryHigh);
        assert_eq!(Momentum::classify(Some(20.0)), Momentum::VeryHigh);
        assert_eq!(Momentum::classify(Some(15.0)), Momentum::High);
        assert_eq!(Momentum::classify(Some(0.0)), Momentum::Growing);
        assert_eq!(Momentum::classify(Some(-10.0)), Momentum::Declining);
        assert_eq!(Momentum::classify(Some(-25.0)), Momentum::Low);
        assert_eq!(Momentum::classify(None), Momentum::Medium);
        assert_eq!(Momentum::High.color(), "#10b981");
        assert_eq!(Momentum::Low.color(), "#ef4444");
        assert_eq!(Momentum::Medium.label(), "MEDIUM");
    }

    #[test]
    fn test_exchanges_as_json_array() {
        let raw: RawListingRecord =
            serde_json::from_str(r#"{"ticker":"bbb","exchanges":["Binance","OKX"]}"#).unwrap();
        let listing = process_listing(&raw).unwrap();
        assert_eq!(listing.exchanges, vec!["Binance", "OKX"]);
        assert_eq!(listing.exchange_count, 2);
    }

    #[test]
    fn test_duplicate_ticker_dropped() {
        let raws = vec![
            row("ABC", "Binance, OKX", Some(1.0), "2025-01-01"),
            row("abc", "Kraken", Some(50.0), "2025-01-02"),
            row("XYZ", "Bybit", None, "2025-01-03"),
        ];
        let listings = dedupe_listings(&raws);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].ticker, "ABC");
        assert_eq!(listings[0].exchanges, vec!["Binance", "OKX"]);
        assert_eq!(listings[0].price_change_pct_24h, Some(1.0));
    }

    #[test]
    fn test_dedupe_idempotent() {
        let raws = vec![
            row("A", "Binance", None, "2025-01-01"),
            row("A", "OKX", None, "2025-01-01"),
            row("B", "OKX", None, "2025-01-01"),
        ];
        let once = dedupe_listings(&raws);
        let twice = dedupe_processed(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_ticker_dropped() {
        let mut blank = row("  ", "Binance", None, "2025-01-01");
        assert!(process_listing(&blank).is_none());
        blank.ticker = None;
        assert!(process_listing(&blank).is_none());
    }

    #[test]
    fn test_exchange_count_sources() {
        let mut r = row("A", "Binance, OKX", None, "2025-01-01");
        r.exchange = Some(RawValue::text("Kraken"));
        let l = process_listing(&r).unwrap();
        assert_eq!(l.exchanges, vec!["Kraken", "Binance", "OKX"]);
        assert_eq!(l.exchange_count, 3);

        r.exchange_count = Some(RawValue::text("7"));
        assert_eq!(process_listing(&r).unwrap().exchange_count, 7);
    }

    #[test]
    fn test_views() {
        let raws: Vec<_> = (0..25)
            .map(|i| {
                let exchanges = vec!["Binance"; i % 5 + 1].join(",");
                row(
                    &format!("T{}", i),
                    &exchanges,
                    if i % 3 == 0 { None } else { Some(i as f64) },
                    &format!("2025-01-{:02}", i + 1),
                )
            })
            .collect();
        let dash = build_listings_dashboard(&raws);

        assert_eq!(dash.processed_listings.len(), 25);
        assert_eq!(dash.treemap.len(), 20);
        assert_eq!(dash.treemap[0].value, 5);
        assert_eq!(dash.cards.len(), 8);
        assert_eq!(dash.live_feed.len(), 10);
        assert_eq!(dash.live_feed[0].ticker, "T24");
        assert_eq!(dash.newest.len(), 4);
        assert_eq!(dash.newest[0].ticker, "T24");
        let growth: Vec<_> = dash.fastest_growing.iter().map(|l| l.ticker.as_str()).collect();
        assert_eq!(growth, vec!["T23", "T22", "T20", "T19"]);
    }

    #[test]
    fn test_metrics() {
        let raws = vec![
            row("A", "Binance, OKX", Some(25.0), "2025-01-01"),
            row("B", "Binance", Some(-30.0), "2025-01-01"),
            row("C", "OKX, Bybit, Kraken", None, "2025-01-01"),
            row("D", "Kraken", Some(5.0), "2025-01-01"),
        ];
        let m = build_listings_dashboard(&raws).metrics;
        assert_eq!(m.total_tokens, 4);
        assert_eq!(m.multi_exchange_tokens, 2);
        assert_eq!(m.cross_exchange_rate, 50.0);
        assert_eq!(m.average_exchange_count, 7.0 / 4.0);
        let very_high = m.momentum_distribution.iter().find(|c| c.momentum == Momentum::VeryHigh).unwrap();
        assert_eq!(very_high.count, 1);
        assert_eq!(m.exchange_breakdown[0].count, 2);
    }

    #[test]
    fn test_empty_metrics() {
        let m = listings_metrics(&[]);
        assert_eq!(m.cross_exchange_rate, 0.0);
        assert_eq!(m.average_exchange_count, 0.0);
    }

    #[test]
    fn test_missing_timestamps_sink() {
        let mut undated = row("OLD", "Binance", None, "");
        undated.scraped_at = None;
        let raws = vec![undated, row("NEW", "Binance", None, "2025-02-01")];
        let dash = build_listings_dashboard(&raws);
        assert_eq!(dash.newest[0].ticker, "NEW");
        assert_eq!(dash.live_feed.last().unwrap().ticker, "OLD");
    }
}
