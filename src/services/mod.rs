pub mod category;
pub use category::map_category;

pub mod postcode;
pub use postcode::{derive_postcode, is_plausible_postcode, postcode_query};

pub mod reconcile;
pub use reconcile::{ReconcileError, ReconcileService, SearchOutcome, SearchPolicy, SearchRequest};

pub mod business_service;
pub use business_service::{
    BusinessError, BusinessPage, BusinessService, BusinessStats, GeoFilter, ListQuery,
};

pub mod business_service_impl;
pub use business_service_impl::SeaOrmBusinessService;
