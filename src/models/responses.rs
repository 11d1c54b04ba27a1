use serde::Serialize;
use crate::core::map::MapScene;
use crate::core::normalizer::ShapeFailure;
use crate::core::projector::detail_href;
use crate::core::query::{BudgetRange, QueryResult};
use crate::models::domain::{BoundingRegion, CanonicalListing};
use crate::services::Accuracy;

/// Whether the upstream payload could be read at all
///
/// Lets clients tell "no listings" apart from "payload unparsable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadStatus {
    Ok,
    Unparsable,
}

impl PayloadStatus {
    pub fn from_failure(failure: Option<&ShapeFailure>) -> Self {
        match failure {
            Some(_) => PayloadStatus::Unparsable,
            None => PayloadStatus::Ok,
        }
    }
}

/// Listing card for the grid view
#[derive(Debug, Clone, Serialize)]
pub struct ListingCard<'a> {
    pub key: String,
    pub listing: &'a CanonicalListing,
    pub price: String,
    pub bedrooms: String,
    pub excerpt: String,
    #[serde(rename = "detailHref")]
    pub detail_href: Option<String>,
}

impl<'a> From<&'a CanonicalListing> for ListingCard<'a> {
    fn from(listing: &'a CanonicalListing) -> Self {
        let price = if listing.lease_rent_raw.trim().is_empty() {
            "Contact".to_string()
        } else {
            listing.lease_rent_raw.clone()
        };

        Self {
            key: listing.list_key(),
            listing,
            price,
            bedrooms: listing.bedrooms_display("0"),
            excerpt: listing.remarks_excerpt(),
            detail_href: listing.id.as_deref().map(detail_href),
        }
    }
}

/// Response for the listings view
#[derive(Debug, Clone, Serialize)]
pub struct ListingsResponse<'a> {
    pub status: PayloadStatus,
    pub listings: Vec<ListingCard<'a>>,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    pub page: usize,
}

impl<'a> ListingsResponse<'a> {
    pub fn new(status: PayloadStatus, result: QueryResult<'a>) -> Self {
        Self {
            status,
            listings: result.window.into_iter().map(ListingCard::from).collect(),
            total: result.total,
            total_pages: result.total_pages,
            page: result.page,
        }
    }
}

/// Response for the budget map
#[derive(Debug, Clone, Serialize)]
pub struct MapResponse {
    pub status: PayloadStatus,
    pub budget: BudgetRange,
    /// Listings whose price falls inside the budget
    #[serde(rename = "inBudget")]
    pub in_budget: usize,
    /// Listings inside the budget that could be placed on the map
    pub placed: usize,
    pub bounds: Option<BoundingRegion>,
    pub scene: MapScene,
}

/// Response for the prediction flow
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    pub accuracy: Accuracy,
    pub map: MapResponse,
}

/// Error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// Transport failures can be retried by the client
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_card_fallbacks() {
        let listing = CanonicalListing::empty(2);
        let card = ListingCard::from(&listing);
        assert_eq!(card.key, "listing-2");
        assert_eq!(card.price, "Contact");
        assert_eq!(card.bedrooms, "0");
        assert_eq!(card.excerpt, "No description available");
        assert!(card.detail_href.is_none());
    }

    #[test]
    fn test_payload_status_wire_name() {
        let failure = ShapeFailure::UnexpectedShape { kind: "null" };
        let status = PayloadStatus::from_failure(Some(&failure));
        assert_eq!(serde_json::to_value(status).unwrap(), "unparsable");
        assert_eq!(PayloadStatus::from_failure(None), PayloadStatus::Ok);
    }
}
