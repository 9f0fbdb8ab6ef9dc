use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const INFERENCE_LOCATION: &str = "edge";
pub const MODEL_VERSION: &str = "v1.0.0-edge";

/// Incoming telemetry as the edge module reads it. Extra fields (hours, line, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryData {
    pub device_id: String,
    pub timestamp: String,
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub power: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub power: f64,
}

impl From<&TelemetryData> for Features {
    fn from(telemetry: &TelemetryData) -> Self {
        Self {
            temperature: telemetry.temperature,
            vibration: telemetry.vibration,
            pressure: telemetry.pressure,
            power: telemetry.power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPrediction {
    pub device_id: String,
    pub prediction_date: DateTime<Utc>,
    pub days_until_maintenance: i64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub inference_location: String,
    pub model_version: String,
    pub features: Features,
}
