use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::businesses;

pub mod migrator;
pub mod repositories;

pub use repositories::business::{BusinessRecord, CategoryCount, ListFilter, RatingThresholds};

/// Find-or-create/update surface keyed by the upstream place id. The
/// reconciliation engine only talks to this trait, so tests can swap in an
/// in-memory store.
#[async_trait]
pub trait BusinessGateway: Send + Sync {
    async fn find_by_place_id(&self, place_id: &str) -> Result<Option<businesses::Model>>;

    async fn insert(&self, record: &BusinessRecord) -> Result<businesses::Model>;

    async fn update(&self, id: i32, record: &BusinessRecord) -> Result<businesses::Model>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn business_repo(&self) -> repositories::business::BusinessRepository {
        repositories::business::BusinessRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl BusinessGateway for Store {
    async fn find_by_place_id(&self, place_id: &str) -> Result<Option<businesses::Model>> {
        self.business_repo().find_by_place_id(place_id).await
    }

    async fn insert(&self, record: &BusinessRecord) -> Result<businesses::Model> {
        self.business_repo().insert(record).await
    }

    async fn update(&self, id: i32, record: &BusinessRecord) -> Result<businesses::Model> {
        self.business_repo().update(id, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(place_id: &str, rating: f32, reviews: i32) -> BusinessRecord {
        BusinessRecord {
            place_id: place_id.to_string(),
            name: format!("Business {place_id}"),
            address: "12 Main St, Sydney NSW 2000".to_string(),
            postcode: Some("2000".to_string()),
            phone: None,
            website: None,
            email: None,
            latitude: -33.8688,
            longitude: 151.2093,
            category: Some("restaurant,food".to_string()),
            google_rating: Some(rating),
            user_ratings_total: Some(reviews),
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_place_id() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let created = store.insert(&record("p1", 3.5, 40)).await.unwrap();
        assert_eq!(created.place_id, "p1");
        assert!(created.created_at.is_some());

        let found = store.find_by_place_id("p1").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(store.find_by_place_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_all_mapped_fields() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let created = store.insert(&record("p1", 3.5, 40)).await.unwrap();

        // Fresh sighting with fewer fields populated: stale values must go.
        let mut fresh = record("p1", 2.0, 55);
        fresh.postcode = None;
        fresh.category = None;

        let updated = store.update(created.id, &fresh).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.postcode, None);
        assert_eq!(updated.category, None);
        assert_eq!(updated.user_ratings_total, Some(55));
        assert_eq!(updated.created_at, created.created_at);

        let count = store.business_repo().count().await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn rating_is_rounded_to_one_decimal() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let created = store.insert(&record("p1", 3.456, 40)).await.unwrap();
        assert_eq!(created.google_rating, Some(3.5));
    }

    #[tokio::test]
    async fn list_filtered_by_category_and_postcode() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.business_repo();

        store.insert(&record("p1", 3.0, 40)).await.unwrap();

        let mut other = record("p2", 3.9, 12);
        other.address = "5 High St, Melbourne VIC 3000".to_string();
        other.postcode = Some("3000".to_string());
        other.category = Some("lodging".to_string());
        store.insert(&other).await.unwrap();

        let by_category = repo
            .list_filtered(&ListFilter {
                category: Some("restaurant".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].place_id, "p1");

        // Postcode matches the column or a substring of the address.
        let by_postcode = repo
            .list_filtered(&ListFilter {
                postcode: Some("3000".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_postcode.len(), 1);
        assert_eq!(by_postcode[0].place_id, "p2");
    }

    #[tokio::test]
    async fn low_rated_bucket_excludes_thin_reviews() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.business_repo();

        store.insert(&record("keep", 3.2, 50)).await.unwrap();
        store.insert(&record("too-good", 4.8, 200)).await.unwrap();
        store.insert(&record("thin", 2.0, 3)).await.unwrap();

        let rows = repo
            .list_filtered(&ListFilter {
                low_rated: Some(RatingThresholds {
                    ceiling: 4.0,
                    floor: 10,
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].place_id, "keep");
    }

    #[tokio::test]
    async fn list_is_sorted_by_rating_descending() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.business_repo();

        store.insert(&record("low", 2.1, 30)).await.unwrap();
        store.insert(&record("high", 3.9, 30)).await.unwrap();
        store.insert(&record("mid", 3.0, 30)).await.unwrap();

        let rows = repo.list_filtered(&ListFilter::default()).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.place_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn top_categories_groups_and_counts() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.business_repo();

        store.insert(&record("a", 3.0, 20)).await.unwrap();
        store.insert(&record("b", 3.1, 20)).await.unwrap();

        let mut lodging = record("c", 3.2, 20);
        lodging.category = Some("lodging".to_string());
        store.insert(&lodging).await.unwrap();

        let top = repo.top_categories(10).await.unwrap();
        assert_eq!(top[0].category.as_deref(), Some("restaurant,food"));
        assert_eq!(top[0].count, 2);
    }
}
