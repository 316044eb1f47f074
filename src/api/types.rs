use serde::Serialize;

use crate::clients::geocoding::ApiTestResult;
use crate::db::repositories::business::CategoryCount;
use crate::entities::businesses;
use crate::services::{BusinessPage, BusinessStats, SearchOutcome};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusinessDto {
    pub id: i32,
    pub place_id: String,
    pub name: String,
    pub category: Option<String>,
    pub address: String,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub google_rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<businesses::Model> for BusinessDto {
    fn from(m: businesses::Model) -> Self {
        Self {
            id: m.id,
            place_id: m.place_id,
            name: m.name,
            category: m.category,
            address: m.address,
            postcode: m.postcode,
            phone: m.phone,
            website: m.website,
            email: m.email,
            google_rating: m.google_rating,
            user_ratings_total: m.user_ratings_total,
            latitude: m.latitude,
            longitude: m.longitude,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub total_found: usize,
    pub businesses: Vec<BusinessDto>,
}

impl From<SearchOutcome> for SearchResultDto {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            total_found: outcome.total_found,
            businesses: outcome.businesses.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusinessListDto {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub businesses: Vec<BusinessDto>,
}

impl From<BusinessPage> for BusinessListDto {
    fn from(page: BusinessPage) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            businesses: page.businesses.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub total_businesses: u64,
    pub top_categories: Vec<CategoryCount>,
    pub sample: Vec<BusinessDto>,
}

impl From<BusinessStats> for StatsDto {
    fn from(stats: BusinessStats) -> Self {
        Self {
            total_businesses: stats.total_businesses,
            top_categories: stats.top_categories,
            sample: stats.sample.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeyTestDto {
    pub google_api_test: ApiTestResult,
    pub api_key_configured: bool,
    pub api_key_length: usize,
}
