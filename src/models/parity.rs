use super::RawValue;
use crate::error::RadarError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── Exchanges ─────────────────────────────────────────────────────────────────

/// The fixed set of tracked exchanges, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Coinbase,
    Okx,
    Bybit,
    Kraken,
    Kucoin,
    Gateio,
    Bitget,
    Upbit,
}

impl Exchange {
    pub const ALL: [Exchange; 9] = [
        Exchange::Binance,
        Exchange::Coinbase,
        Exchange::Okx,
        Exchange::Bybit,
        Exchange::Kraken,
        Exchange::Kucoin,
        Exchange::Gateio,
        Exchange::Bitget,
        Exchange::Upbit,
    ];

    /// Key used by upstream parity rows.
    pub fn key(self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Coinbase => "coinbase",
            Exchange::Okx => "okx",
            Exchange::Bybit => "bybit",
            Exchange::Kraken => "kraken",
            Exchange::Kucoin => "kucoin",
            Exchange::Gateio => "gateio",
            Exchange::Bitget => "bitget",
            Exchange::Upbit => "upbit",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Exchange::Binance => "Binance",
            Exchange::Coinbase => "Coinbase",
            Exchange::Okx => "OKX",
            Exchange::Bybit => "Bybit",
            Exchange::Kraken => "Kraken",
            Exchange::Kucoin => "KuCoin",
            Exchange::Gateio => "Gate.io",
            Exchange::Bitget => "Bitget",
            Exchange::Upbit => "Upbit",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Exchange {
    type Err = RadarError;

    /// "Gate.io", "gate io" and "GATEIO" all resolve to `Gateio`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Exchange::ALL
            .into_iter()
            .find(|e| e.key() == key)
            .ok_or_else(|| RadarError::UnknownExchange(s.trim().to_string()))
    }
}

/// Reference point for coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageBase {
    #[default]
    All,
    #[serde(untagged)]
    Exchange(Exchange),
}

impl FromStr for CoverageBase {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CoverageBase::All)
        } else {
            s.parse().map(CoverageBase::Exchange)
        }
    }
}

impl fmt::Display for CoverageBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageBase::All => f.write_str("all"),
            CoverageBase::Exchange(e) => f.write_str(e.key()),
        }
    }
}

// ── Raw parity row ────────────────────────────────────────────────────────────

/// One token with a presence flag per exchange key. Unknown keys are kept in
/// `presence` and ignored during processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParityRecord {
    pub ticker: Option<RawValue>,
    pub name: Option<RawValue>,
    #[serde(flatten)]
    pub presence: BTreeMap<String, Option<RawValue>>,
}

// ── Processed parity ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub count: usize,
    pub total: usize,
    pub percentage: f64,
    pub ratio: String,
    pub missing: Vec<Exchange>,
    /// `None` when coverage is measured across all exchanges.
    pub on_base: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityToken {
    pub ticker: String,
    pub name: String,
    pub listed_on: Vec<Exchange>,
    pub coverage: Coverage,
}

impl ParityToken {
    pub fn is_listed_on(&self, exchange: Exchange) -> bool {
        self.listed_on.contains(&exchange)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeGap {
    pub exchange: Exchange,
    pub missing_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityOverview {
    pub total_tokens: usize,
    pub average_coverage: f64,
    pub tokens_with_gaps: usize,
    pub exclusive_tokens: usize,
    pub top_missing_exchanges: Vec<ExchangeGap>,
}

/// Asymmetric comparison between a primary exchange and its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Listed by a peer but not by the primary.
    Opportunity,
    /// Listed by the primary but absent from a peer.
    Gap,
}

impl FromStr for ComparisonMode {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opportunity" | "opportunities" => Ok(ComparisonMode::Opportunity),
            "gap" | "gaps" => Ok(ComparisonMode::Gap),
            other => Err(RadarError::Config(format!("unknown comparison mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityDashboard {
    pub base: CoverageBase,
    pub tokens: Vec<ParityToken>,
    pub overview: ParityOverview,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_from_str() {
        assert_eq!("Gate.io".parse::<Exchange>().unwrap(), Exchange::Gateio);
        assert_eq!("OKX".parse::<Exchange>().unwrap(), Exchange::Okx);
        assert_eq!(" kucoin ".parse::<Exchange>().unwrap(), Exchange::Kucoin);
        assert!("ftx".parse::<Exchange>().is_err());
    }

    #[test]
    fn test_coverage_base_from_str() {
        assert_eq!("ALL".parse::<CoverageBase>().unwrap(), CoverageBase::All);
        assert_eq!(
            "binance".parse::<CoverageBase>().unwrap(),
            CoverageBase::Exchange(Exchange::Binance)
        );
        assert_eq!(CoverageBase::Exchange(Exchange::Gateio).to_string(), "gateio");
    }

    #[test]
    fn test_raw_parity_flatten() {
        let raw: RawParityRecord = serde_json::from_str(
            r#"{"ticker":"ABC","name":"Abc","binance":true,"okx":"no","kraken":null}"#,
        )
        .unwrap();
        assert_eq!(raw.presence.get("binance"), Some(&Some(RawValue::Bool(true))));
        assert_eq!(raw.presence.get("kraken"), Some(&None));
        assert!(!raw.presence.contains_key("ticker"));
    }

    #[test]
    fn test_raw_parity_nested_extra_key() {
        let raw: RawParityRecord = serde_json::from_str(
            r#"{"ticker":"ABC","binance":true,"meta":{"x":1},"tags":["new"]}"#,
        )
        .unwrap();
        assert_eq!(raw.presence.get("binance"), Some(&Some(RawValue::Bool(true))));
        assert!(!raw.presence["meta"].as_ref().unwrap().is_truthy());
    }
}
