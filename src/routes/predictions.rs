use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::BudgetRange;
use crate::models::{FeatureRecord, PredictionResponse};
use crate::routes::listings::{upstream_failed, validation_failed, AppState};
use crate::services::PredictorError;

/// Configure prediction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/predictions", web::post().to(predict));
}

/// Predict a rent and map the listings around it
///
/// POST /api/v1/predictions
///
/// Request body:
/// ```json
/// {
///   "bedNumb": 2,
///   "storyNumb": 1,
///   "city": "Ottawa",
///   "province": 0,
///   "buildingType": 0,
///   "amenities": 2,
///   "publicTransit": true,
///   "postedDate": "2024-01-01"
/// }
/// ```
async fn predict(state: web::Data<AppState>, req: web::Json<FeatureRecord>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for prediction request: {:?}", errors);
        return validation_failed(errors);
    }

    let prediction = match state.predictor.predict(&req).await {
        Ok(prediction) => prediction,
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            let retryable = !matches!(e, PredictorError::InvalidResponse(_));
            return upstream_failed("Prediction failed", e, retryable);
        }
    };

    let budget = BudgetRange::around(prediction.prediction, state.budget_offset);

    tracing::info!(
        "Predicted {:.2}, searching listings within ${:.0}-${:.0}",
        prediction.prediction,
        budget.min,
        budget.max
    );

    let snapshot = match state.refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch listings after prediction: {}", e);
            return upstream_failed("Failed to fetch listings", e, true);
        }
    };

    let map = state.render_map(&snapshot, budget);

    HttpResponse::Ok().json(PredictionResponse {
        prediction: prediction.prediction,
        accuracy: prediction.accuracy,
        map,
    })
}
