use crate::models::FeatureRecord;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the price predictor
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Predictor returned status {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Accuracy figure; the predictor sends either a number or a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accuracy {
    Score(f64),
    Label(String),
}

/// Predicted monthly rent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: f64,
    pub accuracy: Accuracy,
}

/// Client for the external price prediction API
pub struct PredictorClient {
    base_url: String,
    client: Client,
}

impl PredictorClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PredictorError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    /// Ask the predictor for a price estimate
    pub async fn predict(&self, features: &FeatureRecord) -> Result<Prediction, PredictorError> {
        let url = format!("{}/api/get_prediction", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting prediction from: {}", url);

        let response = self.client.post(&url).json(features).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Prediction request failed: {} - {}", status, body);
            return Err(PredictorError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let prediction: Prediction = serde_json::from_str(&body)
            .map_err(|e| PredictorError::InvalidResponse(format!("Failed to parse prediction: {}", e)))?;

        if !prediction.prediction.is_finite() {
            return Err(PredictorError::InvalidResponse("Prediction is not a finite number".into()));
        }
        if prediction.prediction < 0.0 {
            return Err(PredictorError::InvalidResponse(format!(
                "Prediction is negative: {}",
                prediction.prediction
            )));
        }

        tracing::debug!("Predicted rent {:.2}", prediction.prediction);

        Ok(prediction)
    }
}
