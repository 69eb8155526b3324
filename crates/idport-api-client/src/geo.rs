//! Unauthenticated IP-geolocation lookup used by the region wizard. Only
//! `location.country` is consumed.

use async_trait::async_trait;
use serde::Deserialize;

use idport_client_core::region::LocationLookup;

use crate::PortalApiError;

pub const DEFAULT_GEO_BASE_URL: &str = "https://api.ipapi.is";

#[derive(Debug, Clone)]
pub struct GeoClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    location: Option<GeoLocation>,
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    #[serde(default)]
    country: Option<String>,
}

impl GeoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PortalApiError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(PortalApiError::BaseUrlMissing);
        }
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for GeoClient {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEO_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LocationLookup for GeoClient {
    type Error = PortalApiError;

    async fn current_country(&self) -> Result<Option<String>, Self::Error> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|error| PortalApiError::Request {
                message: error.to_string(),
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| PortalApiError::Read {
                message: error.to_string(),
            })?;
        if !status.is_success() {
            return Err(crate::format_http_error(status, &bytes));
        }

        let decoded: GeoResponse =
            serde_json::from_slice(&bytes).map_err(|error| PortalApiError::Decode {
                message: error.to_string(),
            })?;
        Ok(decoded
            .location
            .and_then(|location| location.country)
            .map(|country| country.trim().to_string())
            .filter(|country| !country.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_points_at_the_public_endpoint() {
        assert_eq!(GeoClient::default().base_url(), DEFAULT_GEO_BASE_URL);
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = GeoClient::new("https://geo.example.com/").expect("geo client");
        assert_eq!(client.base_url(), "https://geo.example.com");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            GeoClient::new("  "),
            Err(PortalApiError::BaseUrlMissing)
        ));
    }

    #[test]
    fn location_body_decodes_to_a_country() {
        let decoded: GeoResponse = serde_json::from_value(serde_json::json!({
            "location": { "country": "DE", "city": "Berlin" },
        }))
        .expect("geo body decodes");
        assert_eq!(
            decoded.location.and_then(|location| location.country),
            Some("DE".to_string())
        );
    }

    #[test]
    fn missing_location_decodes_to_none() {
        let decoded: GeoResponse =
            serde_json::from_value(serde_json::json!({})).expect("geo body decodes");
        assert!(decoded.location.is_none());
    }
}
