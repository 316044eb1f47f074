use async_trait::async_trait;

use crate::db::repositories::business::{ListFilter, RatingThresholds};
use crate::db::Store;
use crate::entities::businesses;
use crate::models::Coordinates;
use crate::services::business_service::{
    BusinessError, BusinessPage, BusinessService, BusinessStats, ListQuery,
};

const TOP_CATEGORIES: u64 = 10;
const STATS_SAMPLE: u64 = 5;

pub struct SeaOrmBusinessService {
    store: Store,
    thresholds: RatingThresholds,
    page_size: u64,
}

impl SeaOrmBusinessService {
    #[must_use]
    pub const fn new(store: Store, thresholds: RatingThresholds, page_size: u64) -> Self {
        Self {
            store,
            thresholds,
            page_size,
        }
    }

    fn csv_row(business: &businesses::Model) -> Vec<String> {
        vec![
            business.place_id.clone(),
            business.name.clone(),
            business.address.clone(),
            business.postcode.clone().unwrap_or_default(),
            business.phone.clone().unwrap_or_default(),
            business.website.clone().unwrap_or_default(),
            business.latitude.to_string(),
            business.longitude.to_string(),
            business.category.clone().unwrap_or_default(),
            business
                .google_rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_default(),
            business
                .user_ratings_total
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ]
    }
}

#[async_trait]
impl BusinessService for SeaOrmBusinessService {
    async fn list(&self, query: &ListQuery) -> Result<BusinessPage, BusinessError> {
        let filter = ListFilter {
            category: query.category.clone(),
            postcode: query.postcode.clone(),
            low_rated: query.low_rated.then_some(self.thresholds),
        };

        let mut rows = self.store.business_repo().list_filtered(&filter).await?;

        // Distance is computed here rather than in SQL so the paging totals
        // stay correct for radius queries.
        if let Some(near) = query.near {
            rows.retain(|row| {
                let point = Coordinates::new(row.latitude, row.longitude);
                near.center.distance_km(&point) <= near.radius_km
            });
        }

        let total = rows.len() as u64;
        let page = query.page.max(1);
        let offset = usize::try_from((page - 1) * self.page_size).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.page_size).unwrap_or(usize::MAX);

        let businesses = rows.into_iter().skip(offset).take(limit).collect();

        Ok(BusinessPage {
            page,
            page_size: self.page_size,
            total,
            businesses,
        })
    }

    async fn get(&self, id: i32) -> Result<businesses::Model, BusinessError> {
        self.store
            .business_repo()
            .get(id)
            .await?
            .ok_or(BusinessError::NotFound(id))
    }

    async fn stats(&self) -> Result<BusinessStats, BusinessError> {
        let repo = self.store.business_repo();

        Ok(BusinessStats {
            total_businesses: repo.count().await?,
            top_categories: repo.top_categories(TOP_CATEGORIES).await?,
            sample: repo.sample(STATS_SAMPLE).await?,
        })
    }

    async fn export_csv(&self, rating_ceiling: f32) -> Result<String, BusinessError> {
        let rows = self.store.business_repo().export_rows(rating_ceiling).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "place_id",
            "name",
            "address",
            "postcode",
            "phone",
            "website",
            "latitude",
            "longitude",
            "category",
            "google_rating",
            "user_ratings_total",
        ])?;
        for business in &rows {
            writer.write_record(Self::csv_row(business))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| BusinessError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| BusinessError::Export(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::business::BusinessRecord;
    use crate::db::BusinessGateway;
    use crate::services::business_service::GeoFilter;

    fn record(place_id: &str, name: &str, lat: f64, lng: f64) -> BusinessRecord {
        BusinessRecord {
            place_id: place_id.to_string(),
            name: name.to_string(),
            address: format!("{name} address"),
            postcode: Some("2000".to_string()),
            phone: None,
            website: None,
            email: None,
            latitude: lat,
            longitude: lng,
            category: Some("restaurant".to_string()),
            google_rating: Some(3.5),
            user_ratings_total: Some(20),
        }
    }

    fn thresholds() -> RatingThresholds {
        RatingThresholds {
            ceiling: 4.0,
            floor: 10,
        }
    }

    async fn seeded_store(records: &[BusinessRecord]) -> Store {
        let store = Store::new("sqlite::memory:").await.unwrap();
        for r in records {
            store.insert(r).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn radius_filter_keeps_nearby_and_drops_distant() {
        let store = seeded_store(&[
            record("cbd", "Sydney CBD", -33.8688, 151.2093),
            record("bondi", "Bondi", -33.8915, 151.2767),
            record("parra", "Parramatta", -33.8150, 151.0011),
        ])
        .await;
        let svc = SeaOrmBusinessService::new(store, thresholds(), 20);

        let page = svc
            .list(&ListQuery {
                near: Some(GeoFilter {
                    center: Coordinates::new(-33.8688, 151.2093),
                    radius_km: 10.0,
                }),
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<_> = page.businesses.iter().map(|b| b.name.as_str()).collect();
        assert!(names.contains(&"Sydney CBD"));
        assert!(names.contains(&"Bondi"));
        assert!(!names.contains(&"Parramatta"));
    }

    #[tokio::test]
    async fn pagination_slices_without_losing_the_total() {
        let store = seeded_store(&[
            record("a", "A", -33.0, 151.0),
            record("b", "B", -33.0, 151.0),
            record("c", "C", -33.0, 151.0),
        ])
        .await;
        let svc = SeaOrmBusinessService::new(store, thresholds(), 2);

        let first = svc
            .list(&ListQuery {
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.businesses.len(), 2);

        let second = svc
            .list(&ListQuery {
                page: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.businesses.len(), 1);
    }

    #[tokio::test]
    async fn get_missing_id_is_not_found() {
        let store = seeded_store(&[]).await;
        let svc = SeaOrmBusinessService::new(store, thresholds(), 20);

        let err = svc.get(42).await.unwrap_err();
        assert!(matches!(err, BusinessError::NotFound(42)));
    }

    #[tokio::test]
    async fn export_writes_header_and_rows_within_ceiling() {
        let mut high = record("high", "Too Good", -33.0, 151.0);
        high.google_rating = Some(4.8);
        let store = seeded_store(&[record("low", "Low Rated", -33.0, 151.0), high]).await;
        let svc = SeaOrmBusinessService::new(store, thresholds(), 20);

        let csv = svc.export_csv(4.0).await.unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "place_id,name,address,postcode,phone,website,latitude,longitude,category,google_rating,user_ratings_total"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("low,Low Rated,"));
        assert!(row.contains("3.5"));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn stats_reports_count_and_category_breakdown() {
        let mut cafe = record("cafe", "Cafe", -33.0, 151.0);
        cafe.category = Some("cafe".to_string());
        let store = seeded_store(&[
            record("r1", "R1", -33.0, 151.0),
            record("r2", "R2", -33.0, 151.0),
            cafe,
        ])
        .await;
        let svc = SeaOrmBusinessService::new(store, thresholds(), 20);

        let stats = svc.stats().await.unwrap();

        assert_eq!(stats.total_businesses, 3);
        assert_eq!(stats.top_categories[0].category.as_deref(), Some("restaurant"));
        assert_eq!(stats.top_categories[0].count, 2);
        assert!(stats.sample.len() <= 5);
    }
}
