use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{CandidatePlace, Coordinates};

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("places API returned {status}: {message}")]
    Status { status: String, message: String },

    #[error("places request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Nearby-place lookup around a point. ZERO_RESULTS is a valid empty
/// outcome, not an error.
#[async_trait]
pub trait PlaceSearcher: Send + Sync {
    async fn search(
        &self,
        coords: Coordinates,
        radius_m: u32,
        place_type: &str,
    ) -> Result<Vec<CandidatePlace>, PlacesError>;

    /// Backfills address/phone/website via a per-place details lookup.
    /// Called once per candidate that will actually be stored, after
    /// filtering and dedup. Default is a no-op for providers without a
    /// details endpoint.
    async fn enrich(&self, _candidate: &mut CandidatePlace) {}
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: String,
    name: String,
    vicinity: Option<String>,
    geometry: Geometry,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f32>,
    user_ratings_total: Option<i32>,
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

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
}

#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Upstream hard ceiling; requested radii are silently capped here.
    max_radius_m: u32,
    fetch_details: bool,
}

impl PlacesClient {
    #[must_use]
    pub const fn new(
        client: Client,
        base_url: String,
        api_key: String,
        max_radius_m: u32,
        fetch_details: bool,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            max_radius_m,
            fetch_details,
        }
    }

    #[must_use]
    pub const fn clamp_radius(&self, radius_m: u32) -> u32 {
        if radius_m > self.max_radius_m {
            self.max_radius_m
        } else {
            radius_m
        }
    }

    /// Backfills address/phone/website from the Place Details endpoint.
    /// Any failure here keeps the candidate with search-response fields only.
    async fn get_details(&self, place_id: &str) -> Option<PlaceDetails> {
        let url = format!(
            "{}/details/json?place_id={}&fields=formatted_address,formatted_phone_number,website&key={}",
            self.base_url,
            urlencoding::encode(place_id),
            self.api_key
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Place details request failed for {place_id}: {e}");
                return None;
            }
        };

        match response.json::<DetailsResponse>().await {
            Ok(body) if body.status == "OK" => body.result,
            Ok(body) => {
                warn!("Place details returned {} for {place_id}", body.status);
                None
            }
            Err(e) => {
                warn!("Place details response unreadable for {place_id}: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl PlaceSearcher for PlacesClient {
    async fn search(
        &self,
        coords: Coordinates,
        radius_m: u32,
        place_type: &str,
    ) -> Result<Vec<CandidatePlace>, PlacesError> {
        let radius = self.clamp_radius(radius_m);

        let url = format!(
            "{}/nearbysearch/json?location={},{}&radius={}&type={}&key={}",
            self.base_url,
            coords.lat,
            coords.lng,
            radius,
            urlencoding::encode(place_type),
            self.api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::Status {
                status: status.to_string(),
                message: body,
            });
        }

        let body: NearbySearchResponse = response.json().await?;

        if body.status == "ZERO_RESULTS" {
            return Ok(Vec::new());
        }

        if body.status != "OK" {
            return Err(PlacesError::Status {
                status: body.status,
                message: body
                    .error_message
                    .unwrap_or_else(|| "No error message provided".to_string()),
            });
        }

        let candidates = body
            .results
            .into_iter()
            .map(|result| {
                let category = if result.types.is_empty() {
                    None
                } else {
                    Some(result.types.join(","))
                };

                CandidatePlace {
                    place_id: result.place_id,
                    name: result.name,
                    address: result.vicinity.unwrap_or_default(),
                    postcode: None,
                    phone: None,
                    website: None,
                    location: Coordinates::new(
                        result.geometry.location.lat,
                        result.geometry.location.lng,
                    ),
                    category,
                    rating: result.rating,
                    user_ratings_total: result.user_ratings_total,
                }
            })
            .collect();

        Ok(candidates)
    }

    async fn enrich(&self, candidate: &mut CandidatePlace) {
        if !self.fetch_details {
            return;
        }

        let Some(details) = self.get_details(&candidate.place_id).await else {
            return;
        };

        if let Some(address) = details.formatted_address {
            candidate.address = address;
        }
        if details.formatted_phone_number.is_some() {
            candidate.phone = details.formatted_phone_number;
        }
        if details.website.is_some() {
            candidate.website = details.website;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_radius: u32) -> PlacesClient {
        PlacesClient::new(
            Client::new(),
            "http://localhost".to_string(),
            "test-key".to_string(),
            max_radius,
            false,
        )
    }

    #[test]
    fn radius_is_capped_at_upstream_ceiling() {
        let places = client(50_000);
        assert_eq!(places.clamp_radius(200_000), 50_000);
        assert_eq!(places.clamp_radius(50_000), 50_000);
    }

    #[test]
    fn radius_below_ceiling_passes_through() {
        let places = client(50_000);
        assert_eq!(places.clamp_radius(5_000), 5_000);
        assert_eq!(places.clamp_radius(1), 1);
    }
}
