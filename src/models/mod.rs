use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::time::{format_xmltv_time, parse_feed_time, parse_xmltv_time, is_xmltv_time};

pub mod channel_source;

pub use channel_source::{ChannelSource, GridLineup, load_channel_sources};

/// Canonical channel, one per configured source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub display_name: String,
    pub language: Option<String>,
}

/// Canonical programme record produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub start: ListingTime,
    pub stop: ListingTime,
    pub channel_id: String,
    pub title: String,
    pub episode_title: Option<String>,
    pub description: Option<String>,
    pub episode: Option<EpisodeNumber>,
    pub rating: Option<String>,
    pub language: Option<String>,
}

/// Programme timing as it will be written to the guide.
///
/// Epoch and feed dates become `Instant` and are always rendered in UTC.
/// Strings that are already XMLTV timestamps, or that cannot be interpreted,
/// are kept as `Verbatim` and written byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingTime {
    Instant(DateTime<Utc>),
    Verbatim(String),
}

impl ListingTime {
    pub fn from_epoch(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self::Instant)
    }

    /// Interpret a timestamp string taken from an upstream document
    pub fn from_wire(raw: &str) -> Self {
        if is_xmltv_time(raw) {
            return Self::Verbatim(raw.to_string());
        }
        match parse_feed_time(raw) {
            Some(dt) => Self::Instant(dt),
            None => Self::Verbatim(raw.to_string()),
        }
    }

    /// The instant this timestamp denotes, when it can be determined
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(dt) => Some(*dt),
            Self::Verbatim(raw) => parse_xmltv_time(raw),
        }
    }

    pub fn to_xmltv(&self) -> String {
        match self {
            Self::Instant(dt) => format_xmltv_time(dt),
            Self::Verbatim(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for ListingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xmltv())
    }
}

/// Season and episode, always carried together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeNumber {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeNumber {
    /// `xmltv_ns` rendering, `season.episode.part`
    pub fn xmltv_ns(&self) -> String {
        format!("{}.{}.0", self.season, self.episode)
    }

    /// On-screen rendering, `S<season>E<episode>`
    pub fn onscreen(&self) -> String {
        format!("S{}E{}", self.season, self.episode)
    }
}

/// A JSON scalar whose upstream type is not stable (ids, numbers sent as strings, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl LooseValue {
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(_) => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|i| u32::try_from(i).ok())
    }
}
