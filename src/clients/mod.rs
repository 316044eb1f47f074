pub mod geocoding;
pub mod places;

pub use geocoding::{ApiTestResult, GeocodeError, GeocodedLocation, Geocoder, GeocodingClient};
pub use places::{PlaceSearcher, PlacesClient, PlacesError};
