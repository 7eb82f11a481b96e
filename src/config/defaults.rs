/// Configuration default values
///
/// All provider literals live here so the config structs and the
/// serialized default config agree.
// Output defaults
pub const DEFAULT_DOCTYPE: bool = true;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT: &str = "30s";
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

// Listing window defaults
pub const DEFAULT_WINDOW_DAYS: u32 = 3;

// Normalization defaults
pub const DEFAULT_PLACEHOLDER_TITLE: &str = "Unknown";
pub const DEFAULT_PROGRAMME_DURATION: &str = "30m";
pub const DEFAULT_SENTINEL_START: &str = "20000101000000";
pub const DEFAULT_SENTINEL_STOP: &str = "20000101010000";

// Gracenote grid defaults
pub const DEFAULT_GRACENOTE_ENDPOINT: &str = "https://tvlistings.gracenote.com/api/sslgrid";
pub const DEFAULT_GRACENOTE_OUTPUT: &str = "gracenote.xml";
pub const DEFAULT_GRACENOTE_TIMESPAN_HOURS: u32 = 336;
pub const DEFAULT_GRACENOTE_REQUEST_HOUR: u32 = 4;
pub const DEFAULT_GRACENOTE_AID: &str = "orbebb";
pub const DEFAULT_GRACENOTE_USER_ID: &str = "-";
pub const DEFAULT_GRACENOTE_LANGUAGE_CODE: &str = "en-us";
pub const DEFAULT_GRACENOTE_DST_UTC_OFFSET: i32 = -240;
pub const DEFAULT_GRACENOTE_STD_UTC_OFFSET: i32 = -300;
pub const DEFAULT_GRACENOTE_DST_START: &str = "2026-03-08T02:00Z";
pub const DEFAULT_GRACENOTE_DST_END: &str = "2026-11-01T02:00Z";
pub const GRACENOTE_SOURCE_NAME: &str = "Gracenote TV Listings";
pub const GRACENOTE_SOURCE_URL: &str = "https://tvlistings.gracenote.com";
pub const GRACENOTE_GENERATOR: &str = "Gracenote TV Converter";

// Fuel feed defaults
pub const DEFAULT_FUEL_ENDPOINT: &str = "https://fueltools-prod01-v1-fast.fuelmedia.io/mrss";
pub const DEFAULT_FUEL_OUTPUT: &str = "guide/fuel.xml";
pub const DEFAULT_FUEL_MAX_ITEMS: u32 = 50;
pub const DEFAULT_FUEL_CONTENT_TYPE: &str = "epg";
pub const DEFAULT_FUEL_LANGUAGE: &str = "en";
pub const FUEL_SOURCE_NAME: &str = "Bitcentral, Inc.";
pub const FUEL_SOURCE_URL: &str = "https://bitcentral.com";
pub const FUEL_GENERATOR: &str = "FUEL EPG Generator";

// Environment override prefix
pub const ENV_PREFIX: &str = "XMLTV_GRABBER_";
