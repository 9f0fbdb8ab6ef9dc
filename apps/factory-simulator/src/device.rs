use crate::error::{SimError, SimResult};
use crate::profile::{DeviceProfile, DeviceType, Quantity};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::fmt;

/// Upper bound (inclusive) of the random maintenance age given to new devices.
pub const MAX_INITIAL_MAINTENANCE_AGE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    Running,
    Warning,
    Critical,
}

impl DeviceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceStatus::Running => "Running",
            DeviceStatus::Warning => "Warning",
            DeviceStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the factory layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSpec {
    pub device_id: String,
    pub line: String,
    pub device_type: DeviceType,
    /// Replaces the built-in profile for `device_type` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<DeviceProfile>,
}

impl DeviceSpec {
    pub fn new(device_id: impl Into<String>, line: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            device_id: device_id.into(),
            line: line.into(),
            device_type,
            profile: None,
        }
    }

    pub fn resolved_profile(&self) -> DeviceProfile {
        self.profile.unwrap_or_else(|| self.device_type.profile())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub device_id: String,
    pub line: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub operational_hours: f64,
    pub last_maintenance: DateTime<Utc>,
    pub cycle: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub line: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub operational_hours: f64,
    pub cycle: u64,
    pub last_maintenance: DateTime<Utc>,
}

/// A simulated machine: its mutable state plus the validated profile it draws from.
#[derive(Debug, Clone)]
pub struct Device {
    pub(crate) state: DeviceState,
    pub(crate) profile: DeviceProfile,
    pub(crate) noise: [Normal; 4],
}

impl Device {
    pub fn new(spec: DeviceSpec, last_maintenance: DateTime<Utc>) -> SimResult<Self> {
        if spec.device_id.trim().is_empty() {
            return Err(SimError::config("device id must not be empty"));
        }
        let profile = spec.resolved_profile();
        profile
            .validate()
            .map_err(|err| SimError::config(format!("{}: {err}", spec.device_id)))?;

        let build = |quantity: Quantity| {
            Normal::new(0.0, profile.get(quantity).variance).map_err(|err| {
                SimError::config(format!("{} {quantity}: {err}", spec.device_id))
            })
        };
        // Indexed by `Quantity::index`.
        let noise = [
            build(Quantity::Temperature)?,
            build(Quantity::Vibration)?,
            build(Quantity::Pressure)?,
            build(Quantity::Power)?,
        ];

        Ok(Self {
            state: DeviceState {
                device_id: spec.device_id,
                line: spec.line,
                device_type: spec.device_type,
                status: DeviceStatus::Running,
                operational_hours: 0.0,
                last_maintenance,
                cycle: 0,
            },
            profile,
            noise,
        })
    }

    /// Builds a device whose last maintenance happened 1..=90 whole days before `now`.
    pub fn with_random_maintenance<R: Rng + ?Sized>(
        spec: DeviceSpec,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> SimResult<Self> {
        let age_days = rng.gen_range(1..=MAX_INITIAL_MAINTENANCE_AGE_DAYS);
        Self::new(spec, now - Duration::days(age_days))
    }

    pub fn device_id(&self) -> &str {
        &self.state.device_id
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn set_last_maintenance(&mut self, at: DateTime<Utc>) {
        self.state.last_maintenance = at;
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            device_id: self.state.device_id.clone(),
            line: self.state.line.clone(),
            device_type: self.state.device_type,
            status: self.state.status,
            operational_hours: self.state.operational_hours,
            cycle: self.state.cycle,
            last_maintenance: self.state.last_maintenance,
        }
    }
}
