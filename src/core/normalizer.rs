use crate::core::extract::{coerce_text, parse_coordinate, split_amenities};
use crate::models::CanonicalListing;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

/// Wrapper keys searched, in order, when the payload is a mapping
const WRAPPER_KEYS: [&str; 2] = ["listings", "properties"];

/// Raw upstream listings response of unknown shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Already-parsed JSON (array, wrapper object, or a string holding JSON)
    Json(Value),
    /// Body text that still has to be repaired and parsed
    Text(String),
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Json(value)
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}

/// Payload-level failure reported alongside an empty result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeFailure {
    #[error("payload text is not valid JSON after repair: {reason}")]
    Unparsable { reason: String },

    #[error("payload is a {kind}, expected a sequence of listings")]
    UnexpectedShape { kind: &'static str },
}

/// Output of one normalization pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub listings: Vec<CanonicalListing>,
    /// Set when the payload could not be coerced into a sequence
    pub failure: Option<ShapeFailure>,
    /// Array elements that were not mappings
    pub skipped: usize,
    /// Records dropped because their id was already seen
    pub duplicates: usize,
}

impl Normalized {
    fn failed(failure: ShapeFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    pub fn into_listings(self) -> Vec<CanonicalListing> {
        self.listings
    }
}

/// Result of running one shape matcher against a decoded value
enum ShapeOutcome {
    Matched(Vec<Value>),
    FallThrough(Value),
}

type ShapeMatcher = fn(Value) -> ShapeOutcome;

/// Matchers tried in order after any text decoding
const SHAPE_MATCHERS: [ShapeMatcher; 2] = [match_sequence, match_wrapper];

/// Turn a raw upstream payload into canonical listings
///
/// Never fails: an irrecoverable payload yields no listings and a
/// [`ShapeFailure`] in [`Normalized::failure`]. Record and field problems
/// are recovered locally and only logged.
pub fn normalize(raw: RawPayload) -> Normalized {
    let records = match detect_shape(raw) {
        Ok(records) => records,
        Err(failure) => {
            tracing::warn!("Listing payload rejected: {}", failure);
            return Normalized::failed(failure);
        }
    };

    let total = records.len();
    let mut normalized = Normalized::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (position, element) in records.iter().enumerate() {
        let Some(record) = element.as_object() else {
            tracing::debug!("Skipping non-mapping element at position {}", position);
            normalized.skipped += 1;
            continue;
        };

        let listing = lift_record(position, record);

        if let Some(id) = &listing.id {
            if !seen_ids.insert(id.clone()) {
                tracing::trace!("Dropping duplicate listing {} at position {}", id, position);
                normalized.duplicates += 1;
                continue;
            }
        }

        normalized.listings.push(listing);
    }

    tracing::debug!(
        "Normalized {} of {} records ({} duplicates, {} skipped)",
        normalized.listings.len(),
        total,
        normalized.duplicates,
        normalized.skipped
    );

    normalized
}

/// Linear scan for the detail view
pub fn find_listing<'a>(listings: &'a [CanonicalListing], id: &str) -> Option<&'a CanonicalListing> {
    listings.iter().find(|listing| listing.id.as_deref() == Some(id))
}

/// Replace non-standard numeric literals after a key with `null`
///
/// Some upstream encoders emit `NaN`, `Infinity` and `-Infinity` as bare
/// values, which strict JSON parsers reject.
pub fn repair_json_text(text: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r":(\s*)(?:-Infinity|Infinity|NaN)\b").expect("repair pattern is valid")
    });
    pattern.replace_all(text, ":${1}null").into_owned()
}

fn detect_shape(raw: RawPayload) -> Result<Vec<Value>, ShapeFailure> {
    let mut value = match raw {
        RawPayload::Text(text) => decode_text(&text)?,
        RawPayload::Json(Value::String(text)) => decode_text(&text)?,
        RawPayload::Json(value) => value,
    };

    for matcher in SHAPE_MATCHERS {
        match matcher(value) {
            ShapeOutcome::Matched(records) => return Ok(records),
            ShapeOutcome::FallThrough(rest) => value = rest,
        }
    }

    Err(ShapeFailure::UnexpectedShape {
        kind: value_kind(&value),
    })
}

fn decode_text(text: &str) -> Result<Value, ShapeFailure> {
    let repaired = repair_json_text(text);
    serde_json::from_str(&repaired).map_err(|e| {
        let sample: String = text.chars().take(200).collect();
        tracing::debug!("Unparsable payload sample: {}...", sample);
        ShapeFailure::Unparsable {
            reason: e.to_string(),
        }
    })
}

fn match_sequence(value: Value) -> ShapeOutcome {
    match value {
        Value::Array(records) => ShapeOutcome::Matched(records),
        other => ShapeOutcome::FallThrough(other),
    }
}

fn match_wrapper(value: Value) -> ShapeOutcome {
    let Value::Object(mut map) = value else {
        return ShapeOutcome::FallThrough(value);
    };

    for key in WRAPPER_KEYS {
        if let Some(Value::Array(records)) = map.remove(key) {
            return ShapeOutcome::Matched(records);
        }
    }

    tracing::debug!("Wrapper object has no listing sequence, treating as empty");
    ShapeOutcome::Matched(Vec::new())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lift_record(position: usize, record: &Map<String, Value>) -> CanonicalListing {
    let text = |key: &str| text_field(record, key, position);
    let coordinate = |key: &str| {
        let value = record.get(key)?;
        let parsed = parse_coordinate(value);
        if parsed.is_none() && !value.is_null() {
            tracing::debug!("Invalid coordinate {} at position {}: {}", key, position, value);
        }
        parsed
    };

    CanonicalListing {
        id: text("Id"),
        position,
        address_text: text("Property.Address.AddressText").unwrap_or_default(),
        lease_rent_raw: text("Property.LeaseRent").unwrap_or_default(),
        bedrooms_raw: text("Building.Bedrooms").unwrap_or_default(),
        bathrooms: text("Building.BathroomTotal"),
        building_type: text("Building.Type"),
        postal_code: text("PostalCode"),
        public_remarks: text("PublicRemarks"),
        latitude: coordinate("Property.Address.Latitude"),
        longitude: coordinate("Property.Address.Longitude"),
        amenities_nearby: record
            .get("Property.AmmenitiesNearBy")
            .map(split_amenities)
            .unwrap_or_default(),
    }
}

fn text_field(record: &Map<String, Value>, key: &str, position: usize) -> Option<String> {
    let value = record.get(key)?;
    let text = coerce_text(value);
    if text.is_none() && (value.is_object() || value.is_array()) {
        tracing::debug!("Field {} at position {} is not a scalar, left empty", key, position);
    }
    text
}
