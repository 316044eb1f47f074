use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiKeyTestDto, ApiResponse, AppState, BusinessDto, BusinessListDto, SearchResultDto,
    StatsDto,
};
use crate::api::validation::{
    validate_business_id, validate_category, validate_postcode, validate_radius,
    validate_rating_ceiling,
};
use crate::models::Coordinates;
use crate::services::{GeoFilter, ListQuery, SearchRequest};

const fn default_radius() -> u32 {
    5_000
}

const fn default_page() -> u64 {
    1
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub location: Option<String>,
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: bool,
    #[serde(default = "default_radius")]
    pub radius: u32,
    pub category: String,
}

/// GET /api/businesses/search — geocode, pull nearby places, filter and
/// store them, returning what was written.
pub async fn search_businesses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResultDto>>, ApiError> {
    let radius = validate_radius(params.radius)?;
    let category = validate_category(&params.category)?.to_string();
    let postcode = match params.postcode.as_deref() {
        Some(p) if !p.trim().is_empty() => Some(validate_postcode(p)?.to_string()),
        _ => None,
    };

    let request = SearchRequest {
        location: params.location,
        postcode,
        country_wide: params.country,
        radius_m: radius,
        category,
    };

    let outcome = state.reconciler.run(&request).await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub postcode: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Radius in meters, applied only when lat and lng are both given.
    pub radius: Option<u32>,
    /// "low" selects the low-rated bucket.
    pub rating: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
}

pub async fn list_businesses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<BusinessListDto>>, ApiError> {
    let near = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => {
            let radius_m = validate_radius(params.radius.unwrap_or_else(default_radius))?;
            Some(GeoFilter {
                center: Coordinates::new(lat, lng),
                radius_km: f64::from(radius_m) / 1000.0,
            })
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::validation(
                "lat and lng must be provided together",
            ));
        }
    };

    let query = ListQuery {
        category: params.category.filter(|c| !c.trim().is_empty()),
        postcode: params.postcode.filter(|p| !p.trim().is_empty()),
        near,
        low_rated: params.rating.as_deref() == Some("low"),
        page: params.page,
    };

    let page = state.businesses.list(&query).await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_business(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusinessDto>>, ApiError> {
    let id = validate_business_id(id)?;
    let business = state.businesses.get(id).await?;
    Ok(Json(ApiResponse::success(business.into())))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let stats = state.businesses.stats().await?;
    Ok(Json(ApiResponse::success(stats.into())))
}

/// GET /api/businesses/test-api — checks upstream connectivity without
/// touching the database.
pub async fn test_api(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ApiKeyTestDto>>, ApiError> {
    let api_key = &state.config.google.api_key;
    let google_api_test = state.geocoding.test_connection().await;

    Ok(Json(ApiResponse::success(ApiKeyTestDto {
        google_api_test,
        api_key_configured: !api_key.is_empty(),
        api_key_length: api_key.len(),
    })))
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub max_rating: Option<f32>,
}

/// GET /api/businesses/export — CSV attachment of businesses at or below
/// the rating ceiling.
pub async fn export_businesses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let ceiling = validate_rating_ceiling(
        params
            .max_rating
            .unwrap_or(state.config.search.rating_ceiling),
    )?;

    let csv = state.businesses.export_csv(ceiling).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"businesses.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
