use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Coordinates;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoding results for '{location}'")]
    NoResults { location: String },

    #[error("geocoding API returned {status}: {message}")]
    Status { status: String, message: String },

    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Best-match result for a free-text location. The formatted address is the
/// upstream's normalization, advisory only.
#[derive(Debug, Clone)]
pub struct GeocodedLocation {
    pub coordinates: Coordinates,
    pub formatted_address: String,
}

/// Resolves free text (place name, "postcode, country", ...) to coordinates.
/// Single shot: no retry, no caching.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, location: &str) -> Result<GeocodedLocation, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Outcome of the upstream connectivity check exposed at /businesses/test-api.
#[derive(Debug, Clone, Serialize)]
pub struct ApiTestResult {
    pub status: u16,
    pub api_status: String,
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeocodingClient {
    #[must_use]
    pub const fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    async fn fetch(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        let url = format!(
            "{}?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            self.api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status {
                status: status.to_string(),
                message: body,
            });
        }

        Ok(response.json().await?)
    }

    /// Geocodes a known-good address and reports what the upstream said,
    /// without failing the caller on upstream errors.
    pub async fn test_connection(&self) -> ApiTestResult {
        let url = format!(
            "{}?address={}&key={}",
            self.base_url,
            urlencoding::encode("Sydney, Australia"),
            self.api_key
        );

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.json::<GeocodeResponse>().await {
                    Ok(body) => ApiTestResult {
                        status,
                        success: body.status == "OK",
                        message: body
                            .error_message
                            .unwrap_or_else(|| "Connection successful".to_string()),
                        api_status: body.status,
                    },
                    Err(e) => ApiTestResult {
                        status,
                        api_status: "UNKNOWN".to_string(),
                        success: false,
                        message: e.to_string(),
                    },
                }
            }
            Err(e) => ApiTestResult {
                status: 0,
                api_status: "ERROR".to_string(),
                success: false,
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn resolve(&self, location: &str) -> Result<GeocodedLocation, GeocodeError> {
        let body = self.fetch(location).await?;

        if body.status != "OK" {
            return Err(GeocodeError::Status {
                status: body.status,
                message: body
                    .error_message
                    .unwrap_or_else(|| "No error message provided".to_string()),
            });
        }

        // First result is the upstream's best match.
        let Some(first) = body.results.into_iter().next() else {
            return Err(GeocodeError::NoResults {
                location: location.to_string(),
            });
        };

        Ok(GeocodedLocation {
            coordinates: Coordinates::new(first.geometry.location.lat, first.geometry.location.lng),
            formatted_address: first
                .formatted_address
                .unwrap_or_else(|| location.to_string()),
        })
    }
}
