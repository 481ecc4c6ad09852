//! Canned payloads served in development or when the upstream API is down.
//! Rows deliberately keep the upstream quirks (swapped funding columns,
//! mixed value types, a duplicate ticker).

use super::DataSource;
use crate::error::Result;
use crate::models::{RawFundingRecord, RawListingRecord, RawParityRecord, RawValue};
use async_trait::async_trait;

pub struct MockSource;

#[async_trait]
impl DataSource for MockSource {
    async fn fetch_funding(&self) -> Result<Vec<RawFundingRecord>> {
        Ok(funding_rows())
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListingRecord>> {
        Ok(listing_rows())
    }

    async fn fetch_parity(&self) -> Result<Vec<RawParityRecord>> {
        Ok(parity_rows())
    }
}

fn text(s: &str) -> Option<RawValue> {
    Some(RawValue::text(s))
}

pub fn funding_rows() -> Vec<RawFundingRecord> {
    [
        ("Monad Labs", "$225m", "09 Apr 2024", "Series A", "Layer 1", "Paradigm", "Electric Capital, Coinbase Ventures"),
        ("Berachain", "$69m", "12 Apr 2024", "Series B", "Layer 1", "Framework Ventures, Brevan Howard Digital", "Polychain Capital"),
        ("EigenLayer", "$100m", "22 Feb 2024", "Series B", "Infrastructure", "a16z crypto", ""),
        ("Farcaster", "$150m", "21 May 2024", "Series A", "Social", "Paradigm", "a16z crypto, Haun Ventures"),
        ("Ethena", "$14m", "16 Feb 2024", "Strategic", "DeFi", "Dragonfly", "Binance Labs, Arthur Hayes"),
        ("Sentient", "$85m", "02 Jul 2024", "Seed", "AI", "Founders Fund, Pantera Capital", "Framework Ventures"),
        ("Treasure", "Undisclosed", "03 Mar 2024", "Strategic", "Gaming", "Binance Labs", ""),
    ]
    .into_iter()
    .map(|(name, amount, date, round, category, lead, other)| RawFundingRecord {
        name: text(name),
        // Upstream column swap, reproduced
        date: text(amount),
        amount_raised: text(date),
        round: text(round),
        category: text(category),
        lead_investor: text(lead),
        other_investors: text(other),
        ..Default::default()
    })
    .collect()
}

pub fn listing_rows() -> Vec<RawListingRecord> {
    [
        ("ENA", "Ethena", "Binance", "Binance, OKX, Bybit, Coinbase", Some(12.4), "2025-01-10 08:00:00"),
        ("WIF", "dogwifhat", "Coinbase", "Binance, Coinbase, Bybit", Some(24.9), "2025-01-09 14:30:00"),
        ("JUP", "Jupiter", "OKX", "OKX, Bybit", Some(-3.2), "2025-01-08 11:15:00"),
        ("PYTH", "Pyth Network", "Kraken", "Kraken", None, "2025-01-07 09:45:00"),
        ("TIA", "Celestia", "Bybit", "Bybit, Binance, OKX, Kraken, KuCoin", Some(-14.1), "2025-01-06 17:20:00"),
        ("ENA", "Ethena (dup)", "Kraken", "Kraken", Some(99.0), "2025-01-11 10:00:00"),
    ]
    .into_iter()
    .map(|(ticker, name, exchange, exchanges, change, scraped)| RawListingRecord {
        ticker: text(ticker),
        name: text(name),
        exchange: text(exchange),
        exchanges: text(exchanges),
        price_change_pct_24h: change.map(RawValue::Number),
        scraped_at: text(scraped),
        listed_at: text(scraped),
        ..Default::default()
    })
    .collect()
}

pub fn parity_rows() -> Vec<RawParityRecord> {
    let table: [(&str, &str, [bool; 9]); 5] = [
        ("BTC", "Bitcoin", [true; 9]),
        ("ENA", "Ethena", [true, true, true, true, false, true, true, true, false]),
        ("JUP", "Jupiter", [true, false, true, true, false, true, true, true, false]),
        ("PYTH", "Pyth Network", [false, true, false, false, true, false, false, false, false]),
        ("BONK", "Bonk", [false, false, true, true, false, false, false, false, true]),
    ];

    table
        .into_iter()
        .map(|(ticker, name, flags)| {
            let mut row = RawParityRecord {
                ticker: text(ticker),
                name: text(name),
                ..Default::default()
            };
            for (exchange, listed) in crate::models::Exchange::ALL.into_iter().zip(flags) {
                row.presence
                    .insert(exchange.key().to_string(), Some(RawValue::Bool(listed)));
            }
            row
        })
        .collect()
}
