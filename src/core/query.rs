use crate::models::CanonicalListing;
use serde::{Deserialize, Serialize};

/// Default listings per page on wide layouts
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Sort order for the listing view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    BedroomsAsc,
    BedroomsDesc,
}

/// Inclusive `[min, max]` price window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Window of `offset` either side of a predicted price, floored at zero
    pub fn around(prediction: f64, offset: f64) -> Self {
        Self {
            min: (prediction - offset).max(0.0),
            max: prediction + offset,
        }
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Listing query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub search_term: String,
    /// Only the map-facing views restrict by budget
    pub budget: Option<BudgetRange>,
    pub sort: SortKey,
    /// 1-indexed
    pub page: usize,
    pub page_size: usize,
    /// Narrow layouts show the whole filtered sequence
    pub paginate: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            budget: None,
            sort: SortKey::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            paginate: true,
        }
    }
}

/// Visible window plus totals over the filtered sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<'a> {
    pub window: Vec<&'a CanonicalListing>,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    pub page: usize,
}

/// Search, filter, sort and paginate a canonical sequence
pub fn query<'a>(records: &'a [CanonicalListing], params: &QueryParams) -> QueryResult<'a> {
    let needle = params.search_term.to_lowercase();

    let mut filtered: Vec<&CanonicalListing> = records
        .iter()
        .filter(|listing| matches_search(listing, &needle))
        .filter(|listing| params.budget.map_or(true, |budget| within_budget(listing, &budget)))
        .collect();

    sort_listings(&mut filtered, params.sort);

    let total = filtered.len();

    if !params.paginate {
        return QueryResult {
            window: filtered,
            total,
            total_pages: usize::from(total > 0),
            page: 1,
        };
    }

    let page_size = params.page_size.max(1);
    let page = params.page.max(1);
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    let window = filtered.into_iter().skip(start).take(page_size).collect();

    QueryResult {
        window,
        total,
        total_pages,
        page,
    }
}

/// Case-insensitive substring match; `needle` must already be lowercased
#[inline]
pub fn matches_search(listing: &CanonicalListing, needle: &str) -> bool {
    needle.is_empty() || listing.search_text().contains(needle)
}

/// Listings without a parseable price never fall inside a budget
#[inline]
pub fn within_budget(listing: &CanonicalListing, budget: &BudgetRange) -> bool {
    listing
        .lease_rent_amount()
        .is_some_and(|price| budget.contains(price as f64))
}

/// Budget-only view used by the map
pub fn budget_filter<'a>(
    records: impl IntoIterator<Item = &'a CanonicalListing>,
    budget: &BudgetRange,
) -> Vec<&'a CanonicalListing> {
    records
        .into_iter()
        .filter(|listing| within_budget(listing, budget))
        .collect()
}

/// Stable sort, ties keep their prior order
pub fn sort_listings(listings: &mut [&CanonicalListing], sort: SortKey) {
    match sort {
        SortKey::PriceAsc => listings.sort_by_key(|l| l.lease_rent_amount().unwrap_or(0)),
        SortKey::PriceDesc => listings.sort_by(|a, b| {
            b.lease_rent_amount()
                .unwrap_or(0)
                .cmp(&a.lease_rent_amount().unwrap_or(0))
        }),
        SortKey::BedroomsAsc => listings.sort_by_key(|l| l.bedroom_count()),
        SortKey::BedroomsDesc => listings.sort_by(|a, b| b.bedroom_count().cmp(&a.bedroom_count())),
    }
}
