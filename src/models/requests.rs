use crate::core::query::{BudgetRange, QueryParams, SortKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Presentation layout reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Paged grid
    #[default]
    Wide,
    /// Single scrolling column, no pagination
    Narrow,
}

/// Query string for the listings view
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingsQuery {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub search: String,
    #[serde(default)]
    pub sort: SortKey,
    /// 1-based; 0 is read as the first page
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub layout: Layout,
}

fn default_page() -> usize {
    1
}

impl ListingsQuery {
    pub fn to_params(&self, page_size: usize) -> QueryParams {
        QueryParams {
            search_term: self.search.clone(),
            budget: None,
            sort: self.sort,
            page: self.page,
            page_size,
            paginate: self.layout == Layout::Wide,
        }
    }
}

/// Query string for the budget map
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_budget_order"))]
pub struct MapQuery {
    #[validate(range(min = 0.0))]
    pub min_budget: f64,
    #[validate(range(min = 0.0))]
    pub max_budget: f64,
}

impl MapQuery {
    pub fn budget(&self) -> BudgetRange {
        BudgetRange::new(self.min_budget, self.max_budget)
    }
}

fn validate_budget_order(query: &MapQuery) -> Result<(), ValidationError> {
    if !query.min_budget.is_finite() || !query.max_budget.is_finite() {
        return Err(ValidationError::new("budget_not_finite"));
    }
    if query.min_budget > query.max_budget {
        return Err(ValidationError::new("min_budget_exceeds_max_budget"));
    }
    Ok(())
}

/// Feature vector sent to the price predictor
///
/// Field names and integer codes follow the prediction API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeatureRecord {
    #[serde(rename = "bedNumb")]
    #[validate(range(min = 1, max = 5))]
    pub bedrooms: u8,
    #[serde(rename = "storyNumb")]
    #[validate(range(min = 1, max = 4))]
    pub stories: u8,
    #[validate(length(max = 100))]
    pub city: String,
    /// 0 = Ontario, 1 = Quebec
    #[validate(range(max = 1))]
    pub province: u8,
    /// 0 = Apartment, 1 = House
    #[serde(rename = "buildingType")]
    #[validate(range(max = 1))]
    pub building_type: u8,
    /// Laundry code: 0 none, 1 in building, 2 in unit, 3 hookups
    #[serde(rename = "amenities")]
    #[validate(range(max = 7))]
    pub laundry: u8,
    #[serde(rename = "publicTransit", default)]
    pub public_transit: bool,
    #[serde(default)]
    pub recreation: bool,
    #[serde(default)]
    pub shops: bool,
    #[serde(default)]
    pub highway: bool,
    #[serde(default)]
    pub park: bool,
    #[serde(default)]
    pub schools: bool,
    #[serde(default)]
    pub college: bool,
    #[serde(default)]
    pub hospital: bool,
    #[serde(default)]
    pub university: bool,
    #[serde(rename = "hasParking", default)]
    pub has_parking: bool,
    /// 0 none, 1 small, 2 medium, 3 large
    #[serde(rename = "parkingSize", default)]
    #[validate(range(max = 3))]
    pub parking_size: u8,
    #[serde(rename = "postedDate")]
    pub posted_date: NaiveDate,
}
