//! Listing provider abstractions
//!
//! A provider is the upstream client for one EPG service: it knows how to
//! request listings for a channel and hands back the raw response body.
//! Everything after that (extraction, normalization, output) is shared.

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::SourceInfo;
use crate::config::defaults::{DEFAULT_FUEL_OUTPUT, DEFAULT_GRACENOTE_OUTPUT};
use crate::errors::SourceResult;
use crate::models::ChannelSource;

/// Supported upstream services
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// Gracenote grid listings (JSON, one request per day)
    Gracenote,
    /// Fuel media RSS feed (XML, one request per channel)
    Fuel,
}

impl ProviderKind {
    /// Output file used when neither the CLI nor the config names one
    pub fn default_output(&self) -> &'static str {
        match self {
            Self::Gracenote => DEFAULT_GRACENOTE_OUTPUT,
            Self::Fuel => DEFAULT_FUEL_OUTPUT,
        }
    }
}

/// How often a provider is asked for data per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSchedule {
    /// One request per day of the listing window
    PerDay,
    /// A single request covering whatever the provider returns
    Once,
}

/// What happens to programme candidates without a title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyTitlePolicy {
    /// Keep the candidate, titled with the configured placeholder
    Placeholder,
    /// Drop the candidate before normalization
    Drop,
}

#[async_trait]
pub trait ListingProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Attributes for the `tv` root element
    fn source_info(&self) -> &SourceInfo;

    fn fetch_schedule(&self) -> FetchSchedule;

    fn empty_title_policy(&self) -> EmptyTitlePolicy;

    /// Language for channels that do not declare one
    fn default_language(&self) -> Option<&str> {
        None
    }

    /// Fetch the raw listing document for `channel`.
    ///
    /// `date` is the listing day for per-day providers and the first day of
    /// the window for the others.
    async fn fetch(&self, channel: &ChannelSource, date: NaiveDate) -> SourceResult<Vec<u8>>;
}
