use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};

/// Shared HTTP client for listing providers
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client from the `[http]` config section
    pub fn from_config(config: &HttpConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                AppError::configuration(format!("Invalid HTTP header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                AppError::configuration(format!("Invalid value for HTTP header '{name}': {e}"))
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET a URL and return the raw body
    pub async fn get_bytes(&self, url: &str) -> SourceResult<Vec<u8>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_request(e, url))?;

        Self::read_body(response, url).await
    }

    /// POST a JSON body and return the raw response body
    pub async fn post_json_bytes<T>(&self, url: &str, body: &T) -> SourceResult<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::from_request(e, url))?;

        Self::read_body(response, url).await
    }

    async fn read_body(response: Response, url: &str) -> SourceResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} {} - URL: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    url
                ),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_request(e, url))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpClient::from_config(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_custom_headers_are_accepted() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("X-Requested-With".to_string(), "xmltv-grabber".to_string());
        assert!(HttpClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_header_name_is_a_configuration_error() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());
        let err = HttpClient::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
