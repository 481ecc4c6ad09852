use crate::config::SourceConfig;
use crate::error::{RadarError, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";
const MAX_BACKOFF: Duration = Duration::from_secs(30);

pub struct HttpClient {
    inner: reqwest::Client,
    config: SourceConfig,
}

impl HttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|_| RadarError::Config("api_key contains invalid header characters".into()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// GET a URL and decode its JSON body, retrying transport errors,
    /// 429 and 5xx with jittered exponential backoff.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((self.config.retry_delay_ms / 2).max(1))
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.config.max_retries as usize);

        RetryIf::spawn(
            strategy,
            || self.get_json_once(url),
            |e: &RadarError| {
                let retry = e.is_retryable();
                if retry {
                    warn!("GET {} failed ({}), retrying", url, e);
                }
                retry
            },
        )
        .await
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("GET {}", url);
        let resp = self.inner.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RadarError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
