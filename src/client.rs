//! HTTP adapter for the route comparison backend.

use std::env;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::payload::{
    CompareRoutesRequest, CompareRoutesResponse, ErrorBody, LocationEntry, LocationsResponse, RouteEntry,
    RoutesResponse,
};
use crate::traits::{CatalogSource, ComparisonSource};

pub const BASE_URL_VAR: &str = "ROUTE_COMPARE_BASE_URL";
pub const TIMEOUT_VAR: &str = "ROUTE_COMPARE_TIMEOUT_SECS";

/// Message fragments the backend uses when a location is outside its data.
const LOCATION_CONSTRAINT_HINTS: [&str; 3] = ["not available", "Could not find location", "Could not geocode location"];

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        available_locations: Option<Vec<LocationEntry>>,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// True when the backend rejected a location it has no data for.
    ///
    /// Callers show the available-location list instead of a generic error.
    pub fn is_location_constraint(&self) -> bool {
        match self {
            ServiceError::Api { message, .. } => LOCATION_CONSTRAINT_HINTS.iter().any(|hint| message.contains(hint)),
            _ => false,
        }
    }

    pub fn available_locations(&self) -> &[LocationEntry] {
        match self {
            ServiceError::Api {
                available_locations: Some(locations),
                ..
            } => locations,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RouteServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RouteServiceConfig {
    /// Defaults overridden by `ROUTE_COMPARE_BASE_URL` and
    /// `ROUTE_COMPARE_TIMEOUT_SECS`. An unparsable timeout keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            let base_url = base_url.trim().trim_end_matches('/');
            if !base_url.is_empty() {
                config.base_url = base_url.to_string();
            }
        }
        if let Ok(raw) = env::var(TIMEOUT_VAR) {
            match raw.trim().parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring invalid {}", TIMEOUT_VAR),
            }
        }
        config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone)]
pub struct RouteServiceClient {
    config: RouteServiceConfig,
    client: reqwest::blocking::Client,
}

impl RouteServiceClient {
    pub fn new(config: RouteServiceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RouteServiceConfig {
        &self.config
    }

    pub fn compare_routes(&self, request: &CompareRoutesRequest) -> Result<CompareRoutesResponse, ServiceError> {
        debug!(
            source = %request.source,
            destination = %request.destination,
            preference = %request.preference,
            "requesting route comparison"
        );
        let response = self
            .client
            .post(self.config.url("/api/compare-routes"))
            .json(request)
            .send()?;
        read_body(response)
    }

    pub fn available_locations(&self) -> Result<Vec<LocationEntry>, ServiceError> {
        let response = self.client.get(self.config.url("/api/available-locations")).send()?;
        read_body::<LocationsResponse>(response).map(|body| body.locations)
    }

    pub fn available_routes(&self) -> Result<Vec<RouteEntry>, ServiceError> {
        let response = self.client.get(self.config.url("/api/available-routes")).send()?;
        read_body::<RoutesResponse>(response).map(|body| body.routes)
    }
}

impl CatalogSource for RouteServiceClient {
    fn fetch_locations(&self) -> Result<Vec<LocationEntry>, ServiceError> {
        self.available_locations()
    }

    fn fetch_routes(&self) -> Result<Vec<RouteEntry>, ServiceError> {
        self.available_routes()
    }
}

impl ComparisonSource for RouteServiceClient {
    fn compare_routes(&self, request: &CompareRoutesRequest) -> Result<CompareRoutesResponse, ServiceError> {
        RouteServiceClient::compare_routes(self, request)
    }
}

fn read_body<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ServiceError> {
    let status = response.status();
    let text = response.text()?;
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }
    Err(api_error(status.as_u16(), &text))
}

/// Turns a non-2xx body into [`ServiceError::Api`], keeping the raw text when
/// the body is not the usual `{error, message}` object.
fn api_error(status: u16, text: &str) -> ServiceError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ServiceError::Api {
            status,
            message: body.message.unwrap_or(body.error),
            available_locations: body.available_locations,
        },
        Err(_) => ServiceError::Api {
            status,
            message: if text.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                text.trim().to_string()
            },
            available_locations: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_message() {
        let err = api_error(
            400,
            r#"{"error": "Location error", "message": "Location 'Portland' is not available", "available_locations": [{"id": "kingston", "name": "Kingston"}]}"#,
        );
        assert!(err.is_location_constraint());
        assert_eq!(err.available_locations()[0].name, "Kingston");
        assert_eq!(err.to_string(), "backend returned 400: Location 'Portland' is not available");
    }

    #[test]
    fn test_api_error_falls_back_to_error_field() {
        let err = api_error(500, r#"{"error": "Could not geocode location: Atlantis"}"#);
        assert!(err.is_location_constraint());
        assert!(err.available_locations().is_empty());
    }

    #[test]
    fn test_api_error_non_json_body() {
        let err = api_error(502, "Bad Gateway");
        assert!(!err.is_location_constraint());
        match err {
            ServiceError::Api { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(api_error(503, "").to_string(), "backend returned 503: HTTP 503");
    }

    #[test]
    fn test_decode_errors_are_not_location_constraints() {
        let err = ServiceError::from(serde_json::from_str::<LocationsResponse>("{").unwrap_err());
        assert!(!err.is_location_constraint());
    }

    #[test]
    fn test_config_url_joins_cleanly() {
        let config = RouteServiceConfig {
            base_url: "http://backend:8080/".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(config.url("/api/available-routes"), "http://backend:8080/api/available-routes");
        assert_eq!(RouteServiceConfig::default().base_url, "http://localhost:5000");
    }
}
