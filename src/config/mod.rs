use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub gracenote: GracenoteConfig,
    #[serde(default)]
    pub fuel: FuelConfig,
}

/// Where and how the XMLTV guide is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output path; falls back to the provider's default when unset
    pub path: Option<PathBuf>,
    /// Emit `<!DOCTYPE tv SYSTEM "xmltv.dtd">` after the declaration
    #[serde(default = "default_doctype")]
    pub doctype: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout
    #[serde(with = "duration_serde::duration", default = "default_http_timeout")]
    pub timeout: Duration,
    #[serde(with = "duration_serde::duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Static headers injected into every upstream request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Skip TLS certificate verification (the Fuel endpoint needs this)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Number of days, starting today, to request listings for
    #[serde(default = "default_window_days")]
    pub days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Title used when a grid entry carries none
    #[serde(default = "default_placeholder_title")]
    pub placeholder_title: String,
    /// Duration assumed when a programme has a start but no stop
    #[serde(with = "duration_serde::duration", default = "default_programme_duration")]
    pub default_duration: Duration,
    #[serde(default = "default_sentinel_start")]
    pub sentinel_start: String,
    #[serde(default = "default_sentinel_stop")]
    pub sentinel_stop: String,
}

/// Document-level attributes of the `tv` root element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub url: String,
    pub generator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GracenoteConfig {
    #[serde(default = "default_gracenote_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_gracenote_timespan_hours")]
    pub timespan_hours: u32,
    /// Local hour of day used as the request timestamp for each listing day
    #[serde(default = "default_gracenote_request_hour")]
    pub request_hour: u32,
    #[serde(default = "default_gracenote_aid")]
    pub aid: String,
    #[serde(default = "default_gracenote_user_id")]
    pub user_id: String,
    #[serde(default = "default_gracenote_language_code")]
    pub language_code: String,
    #[serde(default = "default_gracenote_dst_utc_offset")]
    pub dst_utc_offset: i32,
    #[serde(default = "default_gracenote_std_utc_offset")]
    pub std_utc_offset: i32,
    #[serde(default = "default_gracenote_dst_start")]
    pub dst_start: String,
    #[serde(default = "default_gracenote_dst_end")]
    pub dst_end: String,
    #[serde(default = "default_gracenote_source_info")]
    pub source_info: SourceInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelConfig {
    #[serde(default = "default_fuel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_fuel_max_items")]
    pub max_items: u32,
    #[serde(default = "default_fuel_content_type")]
    pub content_type: String,
    /// Language applied to channels that do not declare one
    #[serde(default = "default_fuel_language")]
    pub default_language: String,
    #[serde(default = "default_fuel_source_info")]
    pub source_info: SourceInfo,
}

fn default_doctype() -> bool {
    DEFAULT_DOCTYPE
}

fn default_http_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_HTTP_TIMEOUT).unwrap_or(Duration::from_secs(30))
}

fn default_connect_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_CONNECT_TIMEOUT).unwrap_or(Duration::from_secs(10))
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_placeholder_title() -> String {
    DEFAULT_PLACEHOLDER_TITLE.to_string()
}

fn default_programme_duration() -> Duration {
    humantime::parse_duration(DEFAULT_PROGRAMME_DURATION).unwrap_or(Duration::from_secs(1800))
}

fn default_sentinel_start() -> String {
    DEFAULT_SENTINEL_START.to_string()
}

fn default_sentinel_stop() -> String {
    DEFAULT_SENTINEL_STOP.to_string()
}

fn default_gracenote_endpoint() -> String {
    DEFAULT_GRACENOTE_ENDPOINT.to_string()
}

fn default_gracenote_timespan_hours() -> u32 {
    DEFAULT_GRACENOTE_TIMESPAN_HOURS
}

fn default_gracenote_request_hour() -> u32 {
    DEFAULT_GRACENOTE_REQUEST_HOUR
}

fn default_gracenote_aid() -> String {
    DEFAULT_GRACENOTE_AID.to_string()
}

fn default_gracenote_user_id() -> String {
    DEFAULT_GRACENOTE_USER_ID.to_string()
}

fn default_gracenote_language_code() -> String {
    DEFAULT_GRACENOTE_LANGUAGE_CODE.to_string()
}

fn default_gracenote_dst_utc_offset() -> i32 {
    DEFAULT_GRACENOTE_DST_UTC_OFFSET
}

fn default_gracenote_std_utc_offset() -> i32 {
    DEFAULT_GRACENOTE_STD_UTC_OFFSET
}

fn default_gracenote_dst_start() -> String {
    DEFAULT_GRACENOTE_DST_START.to_string()
}

fn default_gracenote_dst_end() -> String {
    DEFAULT_GRACENOTE_DST_END.to_string()
}

fn default_gracenote_source_info() -> SourceInfo {
    SourceInfo {
        name: GRACENOTE_SOURCE_NAME.to_string(),
        url: GRACENOTE_SOURCE_URL.to_string(),
        generator: GRACENOTE_GENERATOR.to_string(),
    }
}

fn default_fuel_endpoint() -> String {
    DEFAULT_FUEL_ENDPOINT.to_string()
}

fn default_fuel_max_items() -> u32 {
    DEFAULT_FUEL_MAX_ITEMS
}

fn default_fuel_content_type() -> String {
    DEFAULT_FUEL_CONTENT_TYPE.to_string()
}

fn default_fuel_language() -> String {
    DEFAULT_FUEL_LANGUAGE.to_string()
}

fn default_fuel_source_info() -> SourceInfo {
    SourceInfo {
        name: FUEL_SOURCE_NAME.to_string(),
        url: FUEL_SOURCE_URL.to_string(),
        generator: FUEL_GENERATOR.to_string(),
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            doctype: default_doctype(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: default_window_days(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            placeholder_title: default_placeholder_title(),
            default_duration: default_programme_duration(),
            sentinel_start: default_sentinel_start(),
            sentinel_stop: default_sentinel_stop(),
        }
    }
}

impl Default for GracenoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gracenote_endpoint(),
            timespan_hours: default_gracenote_timespan_hours(),
            request_hour: default_gracenote_request_hour(),
            aid: default_gracenote_aid(),
            user_id: default_gracenote_user_id(),
            language_code: default_gracenote_language_code(),
            dst_utc_offset: default_gracenote_dst_utc_offset(),
            std_utc_offset: default_gracenote_std_utc_offset(),
            dst_start: default_gracenote_dst_start(),
            dst_end: default_gracenote_dst_end(),
            source_info: default_gracenote_source_info(),
        }
    }
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_fuel_endpoint(),
            max_items: default_fuel_max_items(),
            content_type: default_fuel_content_type(),
            default_language: default_fuel_language(),
            source_info: default_fuel_source_info(),
        }
    }
}

impl Config {
    /// Load configuration: built-in defaults, then the optional TOML file,
    /// then `XMLTV_GRABBER_*` environment variables (nested keys split on `__`).
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(AppError::configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parse configuration from a TOML string layered over the defaults
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        Self::extract(
            Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(contents)),
        )
    }

    /// Render the default configuration as TOML
    pub fn default_toml() -> AppResult<String> {
        toml::to_string_pretty(&Config::default())
            .map_err(|e| AppError::internal(format!("Failed to render default config: {e}")))
    }

    fn extract(figment: Figment) -> AppResult<Self> {
        figment
            .extract()
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))
    }
}
