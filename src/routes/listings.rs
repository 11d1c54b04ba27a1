use actix_web::{web, HttpResponse, Responder};
use validator::{Validate, ValidationErrors};
use crate::config::Settings;
use crate::core::query::budget_filter;
use crate::core::{
    find_listing, normalize, project_onto, query, BudgetRange, ListingFeed, MapConfig, MapView,
    SceneSurface, Snapshot, ViewportSize,
};
use crate::models::{
    ErrorResponse, ListingDetail, ListingsQuery, ListingsResponse, MapQuery, MapResponse,
    PayloadStatus,
};
use crate::services::{ListingsClient, ListingsError, PredictorClient};
use std::fmt::Display;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<ListingsClient>,
    pub predictor: Arc<PredictorClient>,
    pub feed: Arc<ListingFeed>,
    pub page_size: usize,
    pub map: Arc<MapConfig>,
    pub viewport: ViewportSize,
    pub budget_offset: f64,
}

impl AppState {
    pub fn new(settings: &Settings, listings: ListingsClient, predictor: PredictorClient) -> Self {
        Self {
            listings: Arc::new(listings),
            predictor: Arc::new(predictor),
            feed: Arc::new(ListingFeed::new()),
            page_size: settings.listings.page_size,
            map: Arc::new(MapConfig::from(&settings.map)),
            viewport: settings.map.viewport_size(),
            budget_offset: settings.prediction.budget_offset,
        }
    }

    /// Fetch, normalize and publish the listings
    ///
    /// A response overtaken by a newer fetch is dropped and the newer
    /// snapshot served instead.
    pub async fn refresh(&self) -> Result<Snapshot, ListingsError> {
        let ticket = self.feed.begin();
        let raw = self.listings.fetch().await?;
        let normalized = normalize(raw);

        if let Some(failure) = &normalized.failure {
            tracing::warn!("Listings payload unusable: {}", failure);
        }

        tracing::info!(
            "Normalized {} listings ({} skipped, {} duplicates)",
            normalized.listings.len(),
            normalized.skipped,
            normalized.duplicates
        );

        match self.feed.publish(ticket, normalized).await {
            Some(snapshot) => Ok(snapshot),
            None => Ok(self.feed.snapshot().await),
        }
    }

    /// Project the snapshot for `budget` onto a fresh map view
    pub fn render_map(&self, snapshot: &Snapshot, budget: BudgetRange) -> MapResponse {
        let in_budget = budget_filter(snapshot.listings.iter(), &budget).len();
        let mut surface = SceneSurface::new(self.viewport, self.map.default_view);

        let mut view = MapView::mount(&mut surface, &self.map);
        let (projection, outcome) = project_onto(&mut view, snapshot.listings.iter(), &budget);
        let scene = view.surface().scene();
        drop(view);

        tracing::debug!(
            "Rendered {} markers, fitted: {:?}",
            outcome.markers,
            outcome.fitted
        );

        MapResponse {
            status: PayloadStatus::from_failure(snapshot.failure.as_ref()),
            budget,
            in_budget,
            placed: projection.markers.len(),
            bounds: projection.bounds,
            scene,
        }
    }
}

/// Configure listing and map routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/listings", web::get().to(list_listings))
        .route("/listings/{id}", web::get().to(get_listing))
        .route("/map", web::get().to(budget_map));
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
        retryable: false,
    })
}

pub(crate) fn upstream_failed(error: &str, cause: impl Display, retryable: bool) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse {
        error: error.to_string(),
        message: cause.to_string(),
        status_code: 502,
        retryable,
    })
}

/// Listings view
///
/// GET /api/v1/listings?search=&sort=price-asc&page=1&layout=wide
async fn list_listings(
    state: web::Data<AppState>,
    req: web::Query<ListingsQuery>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for listings query: {:?}", errors);
        return validation_failed(errors);
    }

    let snapshot = match state.refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch listings: {}", e);
            return upstream_failed("Failed to fetch listings", e, true);
        }
    };

    let params = req.to_params(state.page_size);
    let result = query(&snapshot.listings, &params);

    tracing::info!(
        "Returning page {} of {} ({} matching listings)",
        result.page,
        result.total_pages,
        result.total
    );

    let status = PayloadStatus::from_failure(snapshot.failure.as_ref());
    HttpResponse::Ok().json(ListingsResponse::new(status, result))
}

/// Listing detail
///
/// GET /api/v1/listings/{id}
async fn get_listing(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    let snapshot = match state.refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch listings for {}: {}", id, e);
            return upstream_failed("Failed to fetch listings", e, true);
        }
    };

    match find_listing(&snapshot.listings, &id) {
        Some(listing) => HttpResponse::Ok().json(ListingDetail::new(listing.clone())),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Listing not found".to_string(),
            message: format!("No listing with id {}", id),
            status_code: 404,
            retryable: false,
        }),
    }
}

/// Budget map
///
/// GET /api/v1/map?min_budget=1000&max_budget=1400
async fn budget_map(state: web::Data<AppState>, req: web::Query<MapQuery>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let snapshot = match state.refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch listings for map: {}", e);
            return upstream_failed("Failed to fetch listings", e, true);
        }
    };

    HttpResponse::Ok().json(state.render_map(&snapshot, req.budget()))
}
