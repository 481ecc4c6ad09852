pub mod http_client;
pub mod mock;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::loader::{find_dataset, load_records};
use crate::models::{ApiEnvelope, RawFundingRecord, RawListingRecord, RawParityRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

use self::http_client::HttpClient;
pub use self::mock::MockSource;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable provider of raw API rows.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_funding(&self) -> Result<Vec<RawFundingRecord>>;
    async fn fetch_listings(&self) -> Result<Vec<RawListingRecord>>;
    async fn fetch_parity(&self) -> Result<Vec<RawParityRecord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    File,
    Mock,
}

/// Build the configured source.
pub fn open_source(kind: SourceKind, config: &SourceConfig) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match kind {
        SourceKind::Http => Arc::new(HttpSource::new(config)?),
        SourceKind::File => Arc::new(FileSource::new(config.data_dir.clone())),
        SourceKind::Mock => Arc::new(MockSource),
    };
    Ok(source)
}

// ── HTTP API ──────────────────────────────────────────────────────────────────

pub struct HttpSource {
    client: HttpClient,
    funding_url: Url,
    listings_url: Url,
    parity_url: Url,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;

        Ok(Self {
            client: HttpClient::new(config)?,
            funding_url: base.join(config.funding_path.trim_start_matches('/'))?,
            listings_url: base.join(config.listings_path.trim_start_matches('/'))?,
            parity_url: base.join(config.parity_path.trim_start_matches('/'))?,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>> {
        let envelope: ApiEnvelope<T> = self.client.get_json(url).await?;
        let rows = envelope.into_records();
        info!("{}: {} rows", url, rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_funding(&self) -> Result<Vec<RawFundingRecord>> {
        self.fetch(&self.funding_url).await
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListingRecord>> {
        self.fetch(&self.listings_url).await
    }

    async fn fetch_parity(&self) -> Result<Vec<RawParityRecord>> {
        self.fetch(&self.parity_url).await
    }
}

// ── Local files ───────────────────────────────────────────────────────────────

/// Reads `funding`, `listings` and `parity` datasets (.json or .csv) from a
/// directory, e.g. saved API responses.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn load<T: DeserializeOwned>(&self, stem: &str) -> Result<Vec<T>> {
        let path = find_dataset(&self.dir, stem)?;
        load_records(&path)
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch_funding(&self) -> Result<Vec<RawFundingRecord>> {
        self.load("funding")
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListingRecord>> {
        self.load("listings")
    }

    async fn fetch_parity(&self) -> Result<Vec<RawParityRecord>> {
        self.load("parity")
    }
}
