//! Provider factory
//!
//! Maps a [`ProviderKind`] to its adapter, wired with the shared HTTP client
//! and the matching config section.

use std::sync::Arc;

use super::fuel::FuelProvider;
use super::gracenote::GracenoteProvider;
use super::traits::{ListingProvider, ProviderKind};
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::http_client::HttpClient;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider for `kind`
    ///
    /// # Errors
    /// Returns a configuration error if the HTTP client cannot be built from
    /// the `[http]` section.
    pub fn create_provider(kind: ProviderKind, config: &Config) -> AppResult<Arc<dyn ListingProvider>> {
        let http_client = HttpClient::from_config(&config.http)?;

        match kind {
            ProviderKind::Gracenote => Ok(Arc::new(GracenoteProvider::new(
                config.gracenote.clone(),
                http_client,
            ))),
            ProviderKind::Fuel => Ok(Arc::new(FuelProvider::new(config.fuel.clone(), http_client))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::traits::{EmptyTitlePolicy, FetchSchedule};

    #[test]
    fn test_creates_each_provider() {
        let config = Config::default();

        let gracenote = ProviderFactory::create_provider(ProviderKind::Gracenote, &config).unwrap();
        assert_eq!(gracenote.kind(), ProviderKind::Gracenote);
        assert_eq!(gracenote.fetch_schedule(), FetchSchedule::PerDay);

        let fuel = ProviderFactory::create_provider(ProviderKind::Fuel, &config).unwrap();
        assert_eq!(fuel.kind(), ProviderKind::Fuel);
        assert_eq!(fuel.empty_title_policy(), EmptyTitlePolicy::Drop);
    }

    #[test]
    fn test_bad_http_config_is_reported() {
        let mut config = Config::default();
        config.http.headers.insert("bad\nname".to_string(), "x".to_string());
        assert!(ProviderFactory::create_provider(ProviderKind::Fuel, &config).is_err());
    }
}
