// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AmenityFlag, BoundingRegion, CanonicalListing, LatLng, ListingDetail, Marker, Popup, STANDARD_AMENITIES};
pub use requests::{FeatureRecord, Layout, ListingsQuery, MapQuery};
pub use responses::{ErrorResponse, ListingsResponse, MapResponse, PayloadStatus, PredictionResponse};
