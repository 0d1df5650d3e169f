//! HTTP client for the pool statistics API.
//!
//! The API is plain JSON over HTTP with no authentication. Pages talk to it
//! through the [`PoolApi`] trait so they can be driven by fakes in tests.

pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::{DEFAULT_API_URL, DashboardConfig};
use crate::error::{Error, Result};
use crate::tracing::prelude::*;
use types::{BlockRecord, ChainList, MinerSnapshot, PaymentRecord, PoolSnapshot};

/// Read-only view of the pool API.
#[async_trait]
pub trait PoolApi: Send + Sync + 'static {
    /// `GET /pool/stats`
    async fn pool_stats(&self) -> Result<PoolSnapshot>;

    /// `GET /pool/blocks?limit=N`, most recent first.
    async fn recent_blocks(&self, limit: u32) -> Result<Vec<BlockRecord>>;

    /// `GET /pool/payments?limit=N`, most recent first.
    async fn recent_payments(&self, limit: u32) -> Result<Vec<PaymentRecord>>;

    /// `GET /miner/{address}/stats`
    async fn miner_stats(&self, address: &str) -> Result<MinerSnapshot>;

    /// `GET /config/chains`
    async fn chains(&self) -> Result<Vec<String>>;
}

/// Pool API client over `reqwest`.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Client for the default local API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Client for an API rooted at `url`, e.g. `http://pool:8001/api`.
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(url.into()),
            http: reqwest::Client::new(),
        }
    }

    /// Client honoring the configured URL and request timeout.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let base_url = normalize_base(config.api_url.clone());
        reqwest::Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, u32)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!(%url, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolApi for Client {
    async fn pool_stats(&self) -> Result<PoolSnapshot> {
        self.get("/pool/stats", &[]).await
    }

    async fn recent_blocks(&self, limit: u32) -> Result<Vec<BlockRecord>> {
        self.get("/pool/blocks", &[("limit", limit)]).await
    }

    async fn recent_payments(&self, limit: u32) -> Result<Vec<PaymentRecord>> {
        self.get("/pool/payments", &[("limit", limit)]).await
    }

    async fn miner_stats(&self, address: &str) -> Result<MinerSnapshot> {
        let endpoint = format!("/miner/{}/stats", urlencoding::encode(address));
        self.get(&endpoint, &[]).await
    }

    async fn chains(&self) -> Result<Vec<String>> {
        let list: ChainList = self.get("/config/chains", &[]).await?;
        Ok(list.into_chains())
    }
}

fn normalize_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
