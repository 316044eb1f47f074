use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;

use crate::entities::{businesses, prelude::*};

/// Write payload for a business row. Every mapped column is present so an
/// update is a full replace, never a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub google_rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
}

/// Thresholds for the "low-rated" list bucket.
#[derive(Debug, Clone, Copy)]
pub struct RatingThresholds {
    pub ceiling: f32,
    pub floor: i32,
}

/// SQL-side filters for list reads. The geographic radius filter is applied
/// in the query service after the fetch.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub postcode: Option<String>,
    pub low_rated: Option<RatingThresholds>,
}

#[derive(Debug, Serialize, FromQueryResult)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

pub struct BusinessRepository {
    conn: DatabaseConnection,
}

impl BusinessRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn round_rating(rating: Option<f32>) -> Option<f32> {
        rating.map(|r| (r * 10.0).round() / 10.0)
    }

    pub async fn find_by_place_id(
        &self,
        place_id: &str,
    ) -> anyhow::Result<Option<businesses::Model>> {
        let row = Businesses::find()
            .filter(businesses::Column::PlaceId.eq(place_id))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    pub async fn insert(&self, record: &BusinessRecord) -> anyhow::Result<businesses::Model> {
        let now = Self::now();
        let model = businesses::ActiveModel {
            place_id: Set(record.place_id.clone()),
            name: Set(record.name.clone()),
            category: Set(record.category.clone()),
            address: Set(record.address.clone()),
            postcode: Set(record.postcode.clone()),
            phone: Set(record.phone.clone()),
            website: Set(record.website.clone()),
            email: Set(record.email.clone()),
            google_rating: Set(Self::round_rating(record.google_rating)),
            user_ratings_total: Set(record.user_ratings_total),
            latitude: Set(record.latitude),
            longitude: Set(record.longitude),
            created_at: Set(Some(now.clone())),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!("Created business: {}", model.name);
        Ok(model)
    }

    /// Overwrites all mapped columns with fresh upstream data. `created_at`
    /// is left as written at insert time.
    pub async fn update(
        &self,
        id: i32,
        record: &BusinessRecord,
    ) -> anyhow::Result<businesses::Model> {
        let model = businesses::ActiveModel {
            id: Set(id),
            place_id: Set(record.place_id.clone()),
            name: Set(record.name.clone()),
            category: Set(record.category.clone()),
            address: Set(record.address.clone()),
            postcode: Set(record.postcode.clone()),
            phone: Set(record.phone.clone()),
            website: Set(record.website.clone()),
            email: Set(record.email.clone()),
            google_rating: Set(Self::round_rating(record.google_rating)),
            user_ratings_total: Set(record.user_ratings_total),
            latitude: Set(record.latitude),
            longitude: Set(record.longitude),
            updated_at: Set(Some(Self::now())),
            ..Default::default()
        }
        .update(&self.conn)
        .await?;

        info!("Updated business: {}", model.name);
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<businesses::Model>> {
        Ok(Businesses::find_by_id(id).one(&self.conn).await?)
    }

    /// Filtered rows sorted by rating descending. SQLite sorts NULL ratings
    /// last on DESC, matching the original ordering.
    pub async fn list_filtered(&self, filter: &ListFilter) -> anyhow::Result<Vec<businesses::Model>> {
        let mut query = Businesses::find();

        if let Some(category) = &filter.category {
            query = query.filter(businesses::Column::Category.contains(category));
        }

        if let Some(postcode) = &filter.postcode {
            query = query.filter(
                Condition::any()
                    .add(businesses::Column::Postcode.eq(postcode.as_str()))
                    .add(businesses::Column::Address.contains(postcode)),
            );
        }

        if let Some(thresholds) = filter.low_rated {
            query = query
                .filter(businesses::Column::GoogleRating.lte(thresholds.ceiling))
                .filter(businesses::Column::UserRatingsTotal.gte(thresholds.floor));
        }

        let rows = query
            .order_by_desc(businesses::Column::GoogleRating)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        Ok(Businesses::find().count(&self.conn).await?)
    }

    pub async fn top_categories(&self, limit: u64) -> anyhow::Result<Vec<CategoryCount>> {
        let rows = Businesses::find()
            .select_only()
            .column(businesses::Column::Category)
            .column_as(businesses::Column::Id.count(), "count")
            .group_by(businesses::Column::Category)
            .order_by_desc(Expr::col(Alias::new("count")))
            .limit(limit)
            .into_model::<CategoryCount>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn sample(&self, limit: u64) -> anyhow::Result<Vec<businesses::Model>> {
        let rows = Businesses::find().limit(limit).all(&self.conn).await?;
        Ok(rows)
    }

    /// Rows for CSV export: everything rated at or below the ceiling.
    pub async fn export_rows(&self, rating_ceiling: f32) -> anyhow::Result<Vec<businesses::Model>> {
        let rows = Businesses::find()
            .filter(businesses::Column::GoogleRating.lte(rating_ceiling))
            .order_by_desc(businesses::Column::GoogleRating)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
