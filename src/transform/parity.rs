//! Exchange parity: per-token coverage relative to a base exchange, the
//! overview aggregate and the two filter predicates used by the UI.

use crate::models::{
    text_of, ComparisonMode, Coverage, CoverageBase, Exchange, ExchangeGap, ParityDashboard,
    ParityOverview, ParityToken, RawParityRecord,
};
use crate::transform::parsers::{normalise_ticker, percentage};
use std::collections::HashSet;
use tracing::debug;

pub const EXCLUSIVE_MAX_EXCHANGES: usize = 2;
pub const TOP_MISSING_EXCHANGES: usize = 5;

// ── Coverage ──────────────────────────────────────────────────────────────────

/// Coverage over the tracked exchanges. With a concrete base the base itself
/// is left out of the denominator and reported through `on_base` instead.
pub fn compute_coverage(listed_on: &[Exchange], base: CoverageBase) -> Coverage {
    let scope: Vec<Exchange> = match base {
        CoverageBase::All => Exchange::ALL.to_vec(),
        CoverageBase::Exchange(b) => Exchange::ALL.into_iter().filter(|e| *e != b).collect(),
    };

    let (present, missing): (Vec<Exchange>, Vec<Exchange>) =
        scope.iter().partition(|e| listed_on.contains(e));

    let count = present.len();
    let total = scope.len();

    Coverage {
        count,
        total,
        percentage: percentage(count as f64, total as f64),
        ratio: format!("{}/{}", count, total),
        missing,
        on_base: match base {
            CoverageBase::All => None,
            CoverageBase::Exchange(b) => Some(listed_on.contains(&b)),
        },
    }
}

/// Exchanges flagged present on a raw row, in declaration order.
fn listed_exchanges(raw: &RawParityRecord) -> Vec<Exchange> {
    let flagged: HashSet<Exchange> = raw
        .presence
        .iter()
        .filter(|(_, value)| value.as_ref().is_some_and(|v| v.is_truthy()))
        .filter_map(|(key, _)| key.parse::<Exchange>().ok())
        .collect();

    Exchange::ALL
        .into_iter()
        .filter(|e| flagged.contains(e))
        .collect()
}

/// Process raw rows into tokens; duplicate tickers keep their first row.
pub fn process_parity(raws: &[RawParityRecord], base: CoverageBase) -> Vec<ParityToken> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::with_capacity(raws.len());

    for raw in raws {
        let Some(ticker) = text_of(&raw.ticker).map(|t| normalise_ticker(&t)) else {
            debug!("Skipping parity row without ticker");
            continue;
        };
        if !seen.insert(ticker.clone()) {
            debug!("Dropping duplicate parity row for {}", ticker);
            continue;
        }

        let listed_on = listed_exchanges(raw);
        tokens.push(ParityToken {
            name: text_of(&raw.name).unwrap_or_else(|| ticker.clone()),
            ticker,
            coverage: compute_coverage(&listed_on, base),
            listed_on,
        });
    }

    tokens
}

// ── Overview ──────────────────────────────────────────────────────────────────

pub fn parity_overview(tokens: &[ParityToken]) -> ParityOverview {
    let total_tokens = tokens.len();
    let coverage_sum: f64 = tokens.iter().map(|t| t.coverage.percentage).sum();

    let mut gaps: Vec<ExchangeGap> = Exchange::ALL
        .into_iter()
        .map(|exchange| ExchangeGap {
            exchange,
            missing_count: tokens
                .iter()
                .filter(|t| t.coverage.missing.contains(&exchange))
                .count(),
        })
        .filter(|g| g.missing_count > 0)
        .collect();
    // Stable sort keeps declaration order among ties
    gaps.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
    gaps.truncate(TOP_MISSING_EXCHANGES);

    ParityOverview {
        total_tokens,
        average_coverage: if total_tokens > 0 {
            coverage_sum / total_tokens as f64
        } else {
            0.0
        },
        tokens_with_gaps: tokens
            .iter()
            .filter(|t| t.coverage.count < t.coverage.total)
            .count(),
        exclusive_tokens: tokens
            .iter()
            .filter(|t| t.coverage.count <= EXCLUSIVE_MAX_EXCHANGES)
            .count(),
        top_missing_exchanges: gaps,
    }
}

pub fn build_parity_dashboard(raws: &[RawParityRecord], base: CoverageBase) -> ParityDashboard {
    let tokens = process_parity(raws, base);
    ParityDashboard {
        base,
        overview: parity_overview(&tokens),
        tokens,
    }
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// True when the token is absent from any selected exchange. An empty
/// selection matches every token.
pub fn missing_from_any(token: &ParityToken, selected: &[Exchange]) -> bool {
    selected.is_empty() || selected.iter().any(|e| !token.is_listed_on(*e))
}

/// Asymmetric coverage between `primary` and its peers. The primary is
/// ignored if it also appears among `comparisons`; no peers means no match.
pub fn comparison_match(
    token: &ParityToken,
    primary: Exchange,
    comparisons: &[Exchange],
    mode: ComparisonMode,
) -> bool {
    let mut peers = comparisons.iter().copied().filter(|e| *e != primary).peekable();
    if peers.peek().is_none() {
        return false;
    }

    let on_primary = token.is_listed_on(primary);
    match mode {
        ComparisonMode::Opportunity => !on_primary && peers.any(|e| token.is_listed_on(e)),
        ComparisonMode::Gap => on_primary && peers.any(|e| !token.is_listed_on(e)),
    }
}

pub fn filter_missing<'a>(tokens: &'a [ParityToken], selected: &[Exchange]) -> Vec<&'a ParityToken> {
    tokens.iter().filter(|t| missing_from_any(t, selected)).collect()
}

pub fn filter_comparison<'a>(
    tokens: &'a [ParityToken],
    primary: Exchange,
    comparisons: &[Exchange],
    mode: ComparisonMode,
) -> Vec<&'a ParityToken> {
    tokens
        .iter()
        .filter(|t| comparison_match(t, primary, comparisons, mode))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
