pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use inference::{OnnxClassifier, RiskClassifier, RiskModels};
pub use models::{HealthInput, RiskReport};
pub use routes::AppState;
