use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::db::repositories::business::CategoryCount;
use crate::entities::businesses;
use crate::models::Coordinates;

#[derive(Debug, Error)]
pub enum BusinessError {
    #[error("business {0} not found")]
    NotFound(i32),

    #[error("database error: {0}")]
    Database(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<anyhow::Error> for BusinessError {
    fn from(e: anyhow::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<csv::Error> for BusinessError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}

/// Radius filter around a point, applied after the relational filters.
#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    pub center: Coordinates,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub category: Option<String>,
    pub postcode: Option<String>,
    pub near: Option<GeoFilter>,
    pub low_rated: bool,
    /// 1-based; 0 is treated as the first page.
    pub page: u64,
}

#[derive(Debug)]
pub struct BusinessPage {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub businesses: Vec<businesses::Model>,
}

#[derive(Debug, Serialize)]
pub struct BusinessStats {
    pub total_businesses: u64,
    pub top_categories: Vec<CategoryCount>,
    pub sample: Vec<businesses::Model>,
}

#[async_trait]
pub trait BusinessService: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<BusinessPage, BusinessError>;

    async fn get(&self, id: i32) -> Result<businesses::Model, BusinessError>;

    async fn stats(&self) -> Result<BusinessStats, BusinessError>;

    /// CSV of businesses at or below `rating_ceiling`, ready to serve as an
    /// attachment.
    async fn export_csv(&self, rating_ceiling: f32) -> Result<String, BusinessError>;
}
