// Core pipeline exports
pub mod bounds;
pub mod extract;
pub mod feed;
pub mod map;
pub mod normalizer;
pub mod projector;
pub mod query;

pub use extract::{extract_price, parse_coordinate, parse_price, sum_bedroom_notation};
pub use feed::{FetchTicket, ListingFeed, Snapshot};
pub use map::{fit_viewport, FitOptions, MapConfig, MapScene, MapSurface, MapView, SceneSurface, TileLayer, Viewport, ViewportSize};
pub use normalizer::{find_listing, normalize, Normalized, RawPayload, ShapeFailure};
pub use projector::{project, project_onto, Projection};
pub use query::{query, BudgetRange, QueryParams, QueryResult, SortKey};
