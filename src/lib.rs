//! XMLTV grabber
//!
//! Fetches per-channel listings from grid (JSON) and feed (XML) EPG providers,
//! normalizes the different response shapes into one programme model and
//! writes a single XMLTV guide.

pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod sources;
pub mod utils;
pub mod xmltv;

pub use config::Config;
pub use errors::{AppError, AppResult, SourceError, SourceResult};
