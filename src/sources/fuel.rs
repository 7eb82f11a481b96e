//! Fuel media RSS feed
//!
//! A single GET per channel; the feed carries its own channel title and
//! whatever programmes the service decides to return.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;
use url::Url;

use super::traits::{EmptyTitlePolicy, FetchSchedule, ListingProvider, ProviderKind};
use crate::config::{FuelConfig, SourceInfo};
use crate::errors::{SourceError, SourceResult};
use crate::models::ChannelSource;
use crate::utils::http_client::HttpClient;

pub struct FuelProvider {
    config: FuelConfig,
    http_client: HttpClient,
}

impl FuelProvider {
    pub fn new(config: FuelConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Feed URL for `channel`
    pub fn feed_url(&self, channel: &ChannelSource) -> SourceResult<Url> {
        let max_items = self.config.max_items.to_string();
        Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("ChId", channel.site_id.as_str()),
                ("maxItems", max_items.as_str()),
                ("ContentType", self.config.content_type.as_str()),
            ],
        )
        .map_err(|e| {
            SourceError::invalid_config(
                "fuel.endpoint",
                format!("'{}' is not a valid URL: {e}", self.config.endpoint),
            )
        })
    }
}

#[async_trait]
impl ListingProvider for FuelProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fuel
    }

    fn source_info(&self) -> &SourceInfo {
        &self.config.source_info
    }

    fn fetch_schedule(&self) -> FetchSchedule {
        FetchSchedule::Once
    }

    fn empty_title_policy(&self) -> EmptyTitlePolicy {
        EmptyTitlePolicy::Drop
    }

    fn default_language(&self) -> Option<&str> {
        Some(self.config.default_language.as_str()).filter(|l| !l.is_empty())
    }

    async fn fetch(&self, channel: &ChannelSource, _date: NaiveDate) -> SourceResult<Vec<u8>> {
        let url = self.feed_url(channel)?;
        debug!("Requesting feed for channel {}", channel.site_id);

        let body = self.http_client.get_bytes(url.as_str()).await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(SourceError::EmptyResponse {
                channel: channel.site_id.clone(),
            });
        }
        Ok(body)
    }
}
