//! Pipeline orchestrator: ties a data source to the transformers.
//!
//! Each run awaits exactly one fetch and then transforms synchronously. When
//! the fetch fails and `source.mock_fallback` is on, the canned mock rows are
//! transformed instead and the stats say so.

use crate::config::AppConfig;
use crate::error::RadarError;
use crate::models::{CoverageBase, FundingDashboard, ListingsDashboard, ParityDashboard};
use crate::source::{mock, DataSource};
use crate::transform::{build_funding_dashboard, build_listings_dashboard, build_parity_dashboard};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
    source: Arc<dyn DataSource>,
    today: NaiveDate,
}

impl Pipeline {
    pub fn new(config: AppConfig, source: Arc<dyn DataSource>) -> Self {
        Self {
            config,
            source,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the reference date used for date fallbacks and recent windows.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn fallback<T>(
        &self,
        dataset: &'static str,
        err: RadarError,
        mock_rows: fn() -> Vec<T>,
    ) -> Result<(Vec<T>, bool)> {
        if self.config.source.mock_fallback {
            warn!("{} fetch failed ({}), serving mock data", dataset, err);
            Ok((mock_rows(), true))
        } else {
            Err(anyhow::Error::new(err).context(format!("{} fetch failed", dataset)))
        }
    }

    pub async fn funding(&self) -> Result<(FundingDashboard, PipelineStats)> {
        let started = Instant::now();
        let (raws, used_mock) = match self.source.fetch_funding().await {
            Ok(rows) => (rows, false),
            Err(e) => self.fallback("funding", e, mock::funding_rows)?,
        };

        let dashboard = build_funding_dashboard(&raws, self.today);
        let stats = PipelineStats {
            dataset: "funding",
            raw_rows: raws.len(),
            processed: dashboard.records.len(),
            used_mock,
            elapsed: started.elapsed(),
        };
        stats.log();
        Ok((dashboard, stats))
    }

    pub async fn listings(&self) -> Result<(ListingsDashboard, PipelineStats)> {
        let started = Instant::now();
        let (raws, used_mock) = match self.source.fetch_listings().await {
            Ok(rows) => (rows, false),
            Err(e) => self.fallback("listings", e, mock::listing_rows)?,
        };

        let dashboard = build_listings_dashboard(&raws);
        let stats = PipelineStats {
            dataset: "listings",
            raw_rows: raws.len(),
            processed: dashboard.processed_listings.len(),
            used_mock,
            elapsed: started.elapsed(),
        };
        stats.log();
        Ok((dashboard, stats))
    }

    pub async fn parity(&self, base: CoverageBase) -> Result<(ParityDashboard, PipelineStats)> {
        let started = Instant::now();
        let (raws, used_mock) = match self.source.fetch_parity().await {
            Ok(rows) => (rows, false),
            Err(e) => self.fallback("parity", e, mock::parity_rows)?,
        };

        let dashboard = build_parity_dashboard(&raws, base);
        let stats = PipelineStats {
            dataset: "parity",
            raw_rows: raws.len(),
            processed: dashboard.tokens.len(),
            used_mock,
            elapsed: started.elapsed(),
        };
        stats.log();
        Ok((dashboard, stats))
    }
}

/// Row counts and wall time of one fetch → transform run.
#[derive(Debug)]
pub struct PipelineStats {
    pub dataset: &'static str,
    pub raw_rows: usize,
    pub processed: usize,
    pub used_mock: bool,
    pub elapsed: Duration,
}

impl PipelineStats {
    fn log(&self) {
        info!(
            "{}: {} raw rows → {} processed in {:.2?}{}",
            self.dataset,
            group_thousands(self.raw_rows),
            group_thousands(self.processed),
            self.elapsed,
            if self.used_mock { " (mock data)" } else { "" }
        );
    }
}

/// "12345" → "12,345"
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.char_indices() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
