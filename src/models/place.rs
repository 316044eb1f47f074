use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in kilometers (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// A place returned by the search adapter, prior to filtering, dedup and
/// persistence. Fixed shape with explicit optionals so the upsert mapping
/// stays total; coordinates are mandatory because a record without them is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePlace {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: Coordinates,
    /// Comma-joined upstream place type tags.
    pub category: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_sydney_to_melbourne() {
        let sydney = Coordinates::new(-33.8688, 151.2093);
        let melbourne = Coordinates::new(-37.8136, 144.9631);

        let km = sydney.distance_km(&melbourne);
        assert!((km - 714.0).abs() < 10.0, "got {km}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = Coordinates::new(-27.4698, 153.0251);
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = Coordinates::new(-31.9523, 115.8613);
        let b = Coordinates::new(-42.8821, 147.3272);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
    }
}
