//! HTTP geolocation client.
//!
//! Talks to an ipinfo-style provider: `GET {base}/json` resolves the caller's
//! own address and `GET {base}/{ip}/json` resolves a specific one.

use std::sync::Arc;

use log::debug;
use reqwest::header::ACCEPT;
use url::Url;

use super::types::{GeoRecord, LookupTarget};
use super::GeoLocator;
use crate::config::Config;
use crate::error_handling::{InitializationError, LookupError};
use crate::initialization::init_client;

/// Geolocation client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct IpInfoClient {
    client: Arc<reqwest::Client>,
    base: Url,
    token: Option<String>,
}

impl IpInfoClient {
    /// Creates a client for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a `url::ParseError` if `base_url` is not an absolute URL that can
    /// carry a path.
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: &str,
        token: Option<String>,
    ) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Builds the HTTP client and the provider endpoint from `config`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` if the HTTP client cannot be built or the
    /// provider URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let client = init_client(config)?;
        let locator = Self::new(client, &config.provider_url, config.token.clone())?;
        Ok(locator)
    }

    /// The URL requested for `target`.
    pub fn endpoint(&self, target: &LookupTarget) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                LookupError::Unavailable(format!("provider URL {} cannot carry a path", self.base))
            })?;
            segments.pop_if_empty();
            if let Some(ip) = target.address() {
                segments.push(ip);
            }
            segments.push("json");
        }
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }
}

impl GeoLocator for IpInfoClient {
    async fn locate(&self, target: &LookupTarget) -> Result<GeoRecord, LookupError> {
        let url = self.endpoint(target)?;
        debug!("Requesting geolocation for {target}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let record: GeoRecord = serde_json::from_str(&body)?;
        debug!(
            "Geolocation for {target}: {}",
            record.place().unwrap_or_else(|| "unknown place".to_string())
        );
        Ok(record)
    }
}
