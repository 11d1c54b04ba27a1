// Service exports
pub mod listings;
pub mod predictor;

pub use listings::{ListingsClient, ListingsError};
pub use predictor::{Accuracy, Prediction, PredictorClient, PredictorError};
