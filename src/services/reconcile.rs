//! Search-and-store pipeline: resolve the requested search mode into one or
//! more locations, geocode each, pull nearby places, filter to the wanted
//! rating band, dedup across locations and upsert into the businesses table.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::clients::geocoding::{GeocodeError, Geocoder};
use crate::clients::places::{PlaceSearcher, PlacesError};
use crate::config::SearchConfig;
use crate::db::repositories::business::BusinessRecord;
use crate::db::BusinessGateway;
use crate::entities::businesses;
use crate::models::CandidatePlace;
use crate::services::category::map_category;
use crate::services::postcode::{derive_postcode, postcode_query};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{0}")]
    Validation(String),

    #[error("geocoding '{location}' failed: {source}")]
    Geocode {
        location: String,
        source: GeocodeError,
    },

    #[error(transparent)]
    Places(#[from] PlacesError),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// One search-and-store invocation. Exactly one of `location`, `postcode`
/// and `country_wide` selects the mode.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub location: Option<String>,
    pub postcode: Option<String>,
    pub country_wide: bool,
    pub radius_m: u32,
    pub category: String,
}

#[derive(Debug)]
pub struct SearchOutcome {
    /// Candidates that survived filtering and dedup, i.e. rows written.
    pub total_found: usize,
    pub businesses: Vec<businesses::Model>,
}

/// Search-time policy knobs, lifted out of the config so tests can pin them.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    pub country: String,
    pub anchor_cities: Vec<String>,
    pub rating_ceiling: f32,
    pub review_floor: i32,
}

impl From<&SearchConfig> for SearchPolicy {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            country: cfg.country.clone(),
            anchor_cities: cfg.anchor_cities.clone(),
            rating_ceiling: cfg.rating_ceiling,
            review_floor: cfg.review_floor,
        }
    }
}

/// The locations a request expands to, plus whether a stamped postcode
/// overrides derivation from the candidate's address.
struct SearchPlan {
    locations: Vec<String>,
    stamped_postcode: Option<String>,
}

pub struct ReconcileService {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlaceSearcher>,
    gateway: Arc<dyn BusinessGateway>,
    policy: SearchPolicy,
}

impl ReconcileService {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlaceSearcher>,
        gateway: Arc<dyn BusinessGateway>,
        policy: SearchPolicy,
    ) -> Self {
        Self {
            geocoder,
            places,
            gateway,
            policy,
        }
    }

    fn plan(&self, request: &SearchRequest) -> Result<SearchPlan, ReconcileError> {
        let location = request.location.as_deref().filter(|s| !s.trim().is_empty());
        let postcode = request.postcode.as_deref().filter(|s| !s.trim().is_empty());

        let mode_count =
            usize::from(location.is_some()) + usize::from(postcode.is_some()) + usize::from(request.country_wide);
        if mode_count == 0 {
            return Err(ReconcileError::Validation(
                "one of location, postcode or country-wide is required".to_string(),
            ));
        }
        if mode_count > 1 {
            return Err(ReconcileError::Validation(
                "location, postcode and country-wide are mutually exclusive".to_string(),
            ));
        }

        if let Some(location) = location {
            return Ok(SearchPlan {
                locations: vec![location.to_string()],
                stamped_postcode: None,
            });
        }

        if let Some(postcode) = postcode {
            let postcode = postcode.trim().to_string();
            return Ok(SearchPlan {
                locations: vec![postcode_query(&postcode, &self.policy.country)],
                stamped_postcode: Some(postcode),
            });
        }

        if self.policy.anchor_cities.is_empty() {
            return Err(ReconcileError::Validation(
                "no anchor cities configured for country-wide search".to_string(),
            ));
        }

        Ok(SearchPlan {
            locations: self
                .policy
                .anchor_cities
                .iter()
                .map(|city| format!("{}, {}", city, self.policy.country))
                .collect(),
            stamped_postcode: None,
        })
    }

    /// Both fields must be present to pass: unrated or review-less places
    /// are not worth prospecting.
    fn passes_filter(&self, candidate: &CandidatePlace) -> bool {
        match (candidate.rating, candidate.user_ratings_total) {
            (Some(rating), Some(reviews)) => {
                rating <= self.policy.rating_ceiling && reviews >= self.policy.review_floor
            }
            _ => false,
        }
    }

    fn to_record(candidate: &CandidatePlace, plan: &SearchPlan) -> BusinessRecord {
        let postcode = plan
            .stamped_postcode
            .clone()
            .or_else(|| derive_postcode(&candidate.address));

        BusinessRecord {
            place_id: candidate.place_id.clone(),
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            postcode,
            phone: candidate.phone.clone(),
            website: candidate.website.clone(),
            email: None,
            latitude: candidate.location.lat,
            longitude: candidate.location.lng,
            category: candidate.category.clone(),
            google_rating: candidate.rating,
            user_ratings_total: candidate.user_ratings_total,
        }
    }

    /// Runs the full pipeline. In multi-location mode a location whose
    /// geocoding or place search fails is skipped with a warning; in
    /// single-location mode the failure is the caller's answer.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, ReconcileError> {
        let plan = self.plan(request)?;
        let place_type = map_category(&request.category);
        let multi_location = plan.locations.len() > 1;

        let mut seen = HashSet::new();
        let mut stored = Vec::new();

        for location in &plan.locations {
            let geocoded = match self.geocoder.resolve(location).await {
                Ok(g) => g,
                Err(e) if multi_location => {
                    warn!("Skipping '{location}': geocoding failed: {e}");
                    continue;
                }
                Err(source) => {
                    return Err(ReconcileError::Geocode {
                        location: location.clone(),
                        source,
                    });
                }
            };

            let candidates = match self
                .places
                .search(geocoded.coordinates, request.radius_m, &place_type)
                .await
            {
                Ok(c) => c,
                Err(e) if multi_location => {
                    warn!("Skipping '{location}': place search failed: {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            info!(
                "Found {} candidates near '{}' for type '{}'",
                candidates.len(),
                location,
                place_type
            );

            for mut candidate in candidates {
                if !self.passes_filter(&candidate) {
                    continue;
                }
                // First location to see a place wins; later duplicates are
                // the same place re-discovered from another anchor.
                if !seen.insert(candidate.place_id.clone()) {
                    continue;
                }

                // Details are fetched only for candidates that will be
                // written, so filtered or duplicate places cost nothing.
                self.places.enrich(&mut candidate).await;

                let record = Self::to_record(&candidate, &plan);
                let model = match self.gateway.find_by_place_id(&record.place_id).await? {
                    Some(existing) => self.gateway.update(existing.id, &record).await?,
                    None => self.gateway.insert(&record).await?,
                };
                stored.push(model);
            }
        }

        info!(
            "Search stored {} businesses across {} location(s)",
            stored.len(),
            plan.locations.len()
        );

        Ok(SearchOutcome {
            total_found: stored.len(),
            businesses: stored,
        })
    }
}
