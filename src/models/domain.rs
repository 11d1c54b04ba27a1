use serde::{Deserialize, Serialize};
use crate::core::bounds::osm_embed_url;
use crate::core::extract::{bedroom_count, parse_price, sum_bedroom_notation};

/// Amenity tags shown on the detail view, in display order
pub const STANDARD_AMENITIES: [&str; 6] = [
    "Public Transit",
    "Recreation",
    "Shopping",
    "Highway",
    "Park",
    "Schools",
];

const REMARKS_EXCERPT_CHARS: usize = 100;

/// Shown on the detail view for missing type, bedrooms and bathrooms
const DETAIL_FALLBACK: &str = "Not specified";

/// Canonical rental listing, lifted from one upstream record
///
/// Serializes back under the upstream key names, so feeding serialized
/// output through the normalizer again yields the same records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalListing {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Index of the source element in the upstream array
    #[serde(skip)]
    pub position: usize,
    #[serde(rename = "Property.Address.AddressText")]
    pub address_text: String,
    #[serde(rename = "Property.LeaseRent")]
    pub lease_rent_raw: String,
    #[serde(rename = "Building.Bedrooms")]
    pub bedrooms_raw: String,
    #[serde(rename = "Building.BathroomTotal", skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<String>,
    #[serde(rename = "Building.Type", skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(rename = "PostalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "PublicRemarks", skip_serializing_if = "Option::is_none")]
    pub public_remarks: Option<String>,
    #[serde(rename = "Property.Address.Latitude", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(rename = "Property.Address.Longitude", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(rename = "Property.AmmenitiesNearBy", skip_serializing_if = "Vec::is_empty")]
    pub amenities_nearby: Vec<String>,
}

impl CanonicalListing {
    /// Empty listing at the given upstream position
    pub fn empty(position: usize) -> Self {
        Self {
            id: None,
            position,
            address_text: String::new(),
            lease_rent_raw: String::new(),
            bedrooms_raw: String::new(),
            bathrooms: None,
            building_type: None,
            postal_code: None,
            public_remarks: None,
            latitude: None,
            longitude: None,
            amenities_nearby: Vec::new(),
        }
    }

    /// Stable key for list rendering: the id, else the upstream position
    pub fn list_key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("listing-{}", self.position),
        }
    }

    /// Parsed rent, `None` when the display string holds no amount
    pub fn lease_rent_amount(&self) -> Option<u64> {
        parse_price(&self.lease_rent_raw)
    }

    /// Bedroom notation summed to a single value, e.g. "2+1" → "3"
    pub fn bedroom_total(&self) -> String {
        sum_bedroom_notation(&self.bedrooms_raw)
    }

    pub fn bedroom_count(&self) -> u32 {
        bedroom_count(&self.bedrooms_raw)
    }

    /// Summed bedroom value, or `fallback` when there is nothing to show
    pub fn bedrooms_display(&self, fallback: &str) -> String {
        let total = self.bedroom_total();
        if total.trim().is_empty() {
            fallback.to_string()
        } else {
            total
        }
    }

    /// Position when both coordinates are present and finite
    pub fn coordinates(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
            _ => None,
        }
    }

    pub fn is_geolocatable(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Case-sensitive substring match against the nearby amenity tags
    pub fn has_amenity(&self, tag: &str) -> bool {
        self.amenities_nearby
            .iter()
            .any(|amenity| amenity.contains(tag))
    }

    /// Lowercased text the free-text search runs against
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.address_text,
            self.lease_rent_raw,
            self.bedrooms_raw,
            self.building_type.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }

    /// Remarks cut to a card-sized excerpt
    pub fn remarks_excerpt(&self) -> String {
        match self.public_remarks.as_deref() {
            Some(remarks) if remarks.chars().count() > REMARKS_EXCERPT_CHARS => {
                let cut: String = remarks.chars().take(REMARKS_EXCERPT_CHARS).collect();
                format!("{}...", cut)
            }
            Some(remarks) => remarks.to_string(),
            None => "No description available".to_string(),
        }
    }
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Smallest lat/lng rectangle containing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    #[serde(rename = "minLat")]
    pub min_lat: f64,
    #[serde(rename = "maxLat")]
    pub max_lat: f64,
    #[serde(rename = "minLng")]
    pub min_lng: f64,
    #[serde(rename = "maxLng")]
    pub max_lng: f64,
}

/// Popup summary attached to a map marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub address: String,
    pub price: String,
    #[serde(rename = "buildingType")]
    pub building_type: String,
    pub bedrooms: String,
    pub bathrooms: String,
    /// Absent when the listing has no id to link to
    #[serde(rename = "detailHref")]
    pub detail_href: Option<String>,
}

/// One map marker per geolocatable listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    #[serde(rename = "listingKey")]
    pub listing_key: String,
    pub position: LatLng,
    pub popup: Popup,
}

/// Listing plus everything the detail view renders
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub listing: CanonicalListing,
    pub price: String,
    pub bedrooms: String,
    pub bathrooms: String,
    #[serde(rename = "buildingType")]
    pub building_type: String,
    pub amenities: Vec<AmenityFlag>,
    #[serde(rename = "embedUrl")]
    pub embed_url: Option<String>,
}

impl ListingDetail {
    pub fn new(listing: CanonicalListing) -> Self {
        let amenities = STANDARD_AMENITIES
            .iter()
            .map(|name| AmenityFlag {
                name: name.to_string(),
                present: listing.has_amenity(name),
            })
            .collect();

        let price = if listing.lease_rent_raw.trim().is_empty() {
            "Contact for price".to_string()
        } else {
            listing.lease_rent_raw.clone()
        };

        Self {
            price,
            bedrooms: listing.bedrooms_display(DETAIL_FALLBACK),
            bathrooms: listing
                .bathrooms
                .clone()
                .unwrap_or_else(|| DETAIL_FALLBACK.to_string()),
            building_type: listing
                .building_type
                .clone()
                .unwrap_or_else(|| DETAIL_FALLBACK.to_string()),
            amenities,
            embed_url: listing.coordinates().map(osm_embed_url),
            listing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityFlag {
    pub name: String,
    pub present: bool,
}
