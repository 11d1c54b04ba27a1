// Route exports
pub mod listings;
pub mod predictions;

pub use listings::AppState;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(listings::configure)
            .configure(predictions::configure),
    );
}
