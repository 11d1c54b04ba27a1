use crate::core::bounds::accumulate;
use crate::core::map::{MapSurface, MapView, RenderOutcome};
use crate::core::query::{budget_filter, BudgetRange};
use crate::models::{BoundingRegion, CanonicalListing, LatLng, Marker, Popup};
use maud::{html, Markup};
use serde::Serialize;

/// Markers plus the region that contains them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub markers: Vec<Marker>,
    /// `None` when no listing could be placed on the map
    pub bounds: Option<BoundingRegion>,
}

/// Project the listings inside `budget` onto map markers
///
/// Listings without both coordinates are skipped and logged; they stay
/// available to list views.
pub fn project<'a, I>(records: I, budget: &BudgetRange) -> Projection
where
    I: IntoIterator<Item = &'a CanonicalListing>,
{
    let affordable = budget_filter(records, budget);
    let mut markers = Vec::with_capacity(affordable.len());
    let mut bounds: Option<BoundingRegion> = None;

    for listing in &affordable {
        let Some(position) = listing.coordinates() else {
            tracing::debug!("Listing missing coordinates: {}", listing.list_key());
            continue;
        };

        markers.push(marker_for(listing, position));
        bounds = Some(accumulate(bounds, position));
    }

    tracing::debug!(
        "Projected {} of {} listings within ${}-${}",
        markers.len(),
        affordable.len(),
        budget.min,
        budget.max
    );

    Projection { markers, bounds }
}

/// Project and draw onto a mounted map view in one step
pub fn project_onto<'a, I, S>(
    view: &mut MapView<'_, S>,
    records: I,
    budget: &BudgetRange,
) -> (Projection, RenderOutcome)
where
    I: IntoIterator<Item = &'a CanonicalListing>,
    S: MapSurface,
{
    let projection = project(records, budget);
    let outcome = view.render(&projection);
    (projection, outcome)
}

pub fn marker_for(listing: &CanonicalListing, position: LatLng) -> Marker {
    Marker {
        listing_key: listing.list_key(),
        position,
        popup: Popup {
            address: non_empty_or(&listing.address_text, "Property"),
            price: non_empty_or(&listing.lease_rent_raw, "Contact for price"),
            building_type: listing
                .building_type
                .clone()
                .unwrap_or_else(|| "Property".to_string()),
            bedrooms: listing.bedrooms_display("Studio"),
            bathrooms: listing
                .bathrooms
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            detail_href: listing.id.as_deref().map(detail_href),
        },
    }
}

/// Path of the detail view for a listing id
pub fn detail_href(id: &str) -> String {
    format!("/listings/property/{}", urlencoding::encode(id))
}

pub fn render_popup(popup: &Popup) -> Markup {
    html! {
        div style="font-family: sans-serif; max-width: 240px;" {
            h3 style="font-weight: bold; margin-bottom: 8px; color: #9333ea;" { (popup.address) }
            p style="margin-bottom: 5px;" { strong { "Price:" } " " (popup.price) }
            p style="margin-bottom: 5px;" { strong { "Type:" } " " (popup.building_type) }
            p style="margin-bottom: 5px;" { strong { "Bedrooms:" } " " (popup.bedrooms) }
            p style="margin-bottom: 5px;" { strong { "Bathrooms:" } " " (popup.bathrooms) }
            @if let Some(href) = &popup.detail_href {
                a href=(href) style="color: #9333ea; text-decoration: underline; display: inline-block; margin-top: 8px;" {
                    "View Details"
                }
            }
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: &str, coords: Option<(f64, f64)>) -> CanonicalListing {
        CanonicalListing {
            id: Some(id.to_string()),
            address_text: format!("{} Bank St", id),
            lease_rent_raw: price.to_string(),
            bedrooms_raw: "2+1".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            ..CanonicalListing::empty(0)
        }
    }

    #[test]
    fn test_project_filters_budget_and_coordinates() {
        let records = vec![
            listing("1", "$1,500", Some((45.40, -75.70))),
            listing("2", "$1,600", Some((45.45, -75.65))),
            listing("3", "$1,550", None),
            listing("4", "$3,000", Some((45.50, -75.60))),
            listing("5", "Contact for price", Some((45.41, -75.69))),
        ];
        let projection = project(&records, &BudgetRange::new(1400.0, 1800.0));

        let keys: Vec<&str> = projection.markers.iter().map(|m| m.listing_key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2"]);

        let bounds = projection.bounds.unwrap();
        assert_eq!(bounds.min_lat, 45.40);
        assert_eq!(bounds.max_lat, 45.45);
        assert_eq!(bounds.min_lng, -75.70);
        assert_eq!(bounds.max_lng, -75.65);
    }

    #[test]
    fn test_project_without_geolocatable_records() {
        let records = vec![listing("1", "$1,500", None)];
        let projection = project(&records, &BudgetRange::new(0.0, 5000.0));
        assert!(projection.markers.is_empty());
        assert!(projection.bounds.is_none());
    }

    #[test]
    fn test_marker_popup_fallbacks() {
        let bare = CanonicalListing::empty(4);
        let marker = marker_for(&bare, LatLng { lat: 45.0, lng: -75.0 });
        assert_eq!(marker.listing_key, "listing-4");
        assert_eq!(marker.popup.address, "Property");
        assert_eq!(marker.popup.price, "Contact for price");
        assert_eq!(marker.popup.building_type, "Property");
        assert_eq!(marker.popup.bedrooms, "Studio");
        assert_eq!(marker.popup.bathrooms, "N/A");
        assert!(marker.popup.detail_href.is_none());
    }

    #[test]
    fn test_marker_popup_sums_bedrooms() {
        let l = listing("12", "$1,500", Some((45.0, -75.0)));
        let marker = marker_for(&l, l.coordinates().unwrap());
        assert_eq!(marker.popup.bedrooms, "3");
        assert_eq!(marker.popup.detail_href.as_deref(), Some("/listings/property/12"));
    }

    #[test]
    fn test_render_popup_escapes_text() {
        let l = CanonicalListing {
            address_text: "<b>Loft</b> & Co".to_string(),
            ..listing("7", "$900", Some((45.0, -75.0)))
        };
        let html = render_popup(&marker_for(&l, l.coordinates().unwrap()).popup).into_string();
        assert!(html.contains("&lt;b&gt;Loft&lt;/b&gt; &amp; Co"));
        assert!(html.contains("href=\"/listings/property/7\""));
        assert!(html.contains("View Details"));
    }
}
