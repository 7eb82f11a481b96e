//! Gracenote grid listings
//!
//! One POST to the `sslgrid` endpoint per channel and day. The response is a
//! JSON object keyed by date; the orchestrator extracts the requested day.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::traits::{EmptyTitlePolicy, FetchSchedule, ListingProvider, ProviderKind};
use crate::config::{GracenoteConfig, SourceInfo};
use crate::errors::{SourceError, SourceResult};
use crate::models::ChannelSource;
use crate::utils::http_client::HttpClient;
use crate::utils::time::local_timestamp_at;

/// Request body expected by the grid endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRequest<'a> {
    #[serde(rename = "lineupId")]
    pub lineup_id: Option<&'a str>,
    #[serde(rename = "IsSSLinkNavigation")]
    pub is_ss_link_navigation: bool,
    pub timespan: u32,
    pub timestamp: i64,
    pub prgsvcid: &'a str,
    #[serde(rename = "headendId")]
    pub headend_id: Option<&'a str>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<&'a str>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<&'a str>,
    pub device: Option<&'a str>,
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub aid: &'a str,
    #[serde(rename = "DSTUTCOffset")]
    pub dst_utc_offset: i32,
    #[serde(rename = "STDUTCOffset")]
    pub std_utc_offset: i32,
    #[serde(rename = "DSTStart")]
    pub dst_start: &'a str,
    #[serde(rename = "DSTEnd")]
    pub dst_end: &'a str,
    #[serde(rename = "languagecode")]
    pub language_code: &'a str,
}

pub struct GracenoteProvider {
    config: GracenoteConfig,
    http_client: HttpClient,
}

impl GracenoteProvider {
    pub fn new(config: GracenoteConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the request body for `channel` on `date`
    pub fn request_for<'a>(
        &'a self,
        channel: &'a ChannelSource,
        date: NaiveDate,
    ) -> SourceResult<GridRequest<'a>> {
        let timestamp = local_timestamp_at(date, self.config.request_hour).ok_or_else(|| {
            SourceError::invalid_config(
                "gracenote.request_hour",
                format!(
                    "{}:00 on {} is not a valid local time",
                    self.config.request_hour, date
                ),
            )
        })?;

        let lineup = &channel.lineup;
        Ok(GridRequest {
            lineup_id: lineup.lineup_id.as_deref(),
            is_ss_link_navigation: true,
            timespan: self.config.timespan_hours,
            timestamp,
            prgsvcid: channel.program_service_id(),
            headend_id: lineup.headend_id.as_deref(),
            country_code: lineup.country.as_deref(),
            postal_code: lineup.postal.as_deref(),
            device: lineup.device.as_deref(),
            user_id: &self.config.user_id,
            aid: &self.config.aid,
            dst_utc_offset: self.config.dst_utc_offset,
            std_utc_offset: self.config.std_utc_offset,
            dst_start: &self.config.dst_start,
            dst_end: &self.config.dst_end,
            language_code: &self.config.language_code,
        })
    }
}

#[async_trait]
impl ListingProvider for GracenoteProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gracenote
    }

    fn source_info(&self) -> &SourceInfo {
        &self.config.source_info
    }

    fn fetch_schedule(&self) -> FetchSchedule {
        FetchSchedule::PerDay
    }

    fn empty_title_policy(&self) -> EmptyTitlePolicy {
        EmptyTitlePolicy::Placeholder
    }

    async fn fetch(&self, channel: &ChannelSource, date: NaiveDate) -> SourceResult<Vec<u8>> {
        let request = self.request_for(channel, date)?;
        debug!(
            "Requesting grid for {} (prgsvcid={}) on {}",
            channel.label(),
            request.prgsvcid,
            date
        );

        let body = self
            .http_client
            .post_json_bytes(&self.config.endpoint, &request)
            .await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(SourceError::EmptyResponse {
                channel: channel.label().to_string(),
            });
        }
        Ok(body)
    }
}
