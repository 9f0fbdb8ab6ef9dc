pub mod config;
pub mod devices;
pub mod error;
pub mod http;
pub mod model;
pub mod mqtt;
pub mod prediction;
pub mod state;

pub use devices::KnownDevices;
pub use error::{InferenceError, InferenceResult};
pub use model::{EdgeModel, ModelWeights};
pub use prediction::{Features, RiskLevel, RiskPrediction, TelemetryData};
pub use state::EdgeState;

#[cfg(test)]
mod pipeline_tests;
