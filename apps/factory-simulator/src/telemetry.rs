use crate::device::DeviceStatus;
use crate::profile::DeviceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tick's worth of telemetry for a device, as published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub power: f64,
    pub status: DeviceStatus,
    pub operational_hours: f64,
    // Older consumers and stored payloads carry the misspelled key.
    #[serde(alias = "daysSinceMaintenace")]
    pub days_since_maintenance: i64,
    pub line: String,
    pub device_type: DeviceType,
}

impl TelemetryReading {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
