//! Rentscope - listing pipeline for a rental browsing front end
//!
//! Turns the untrusted listings payload into canonical records, filters,
//! sorts and paginates them, and projects a budget window onto a map with
//! bounds fitting.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, project, query, BudgetRange, Normalized, QueryParams, RawPayload, SortKey};
pub use crate::models::{BoundingRegion, CanonicalListing, LatLng, Marker};
