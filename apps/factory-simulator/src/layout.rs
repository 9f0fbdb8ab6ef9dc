use crate::device::{Device, DeviceSpec};
use crate::error::{SimError, SimResult};
use crate::profile::DeviceType;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_LINES: usize = 3;

/// Ordered list of simulated devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryLayout {
    pub devices: Vec<DeviceSpec>,
}

impl Default for FactoryLayout {
    /// Three lines, each with one CNC, one robot and one conveyor.
    fn default() -> Self {
        let mut devices = Vec::with_capacity(DEFAULT_LINES * DeviceType::ALL.len());
        for line_no in 1..=DEFAULT_LINES {
            let line = format!("LINE_{line_no}");
            for device_type in DeviceType::ALL {
                devices.push(DeviceSpec::new(
                    format!("{line}_{}_{line_no:02}", device_type.as_str()),
                    line.clone(),
                    device_type,
                ));
            }
        }
        Self { devices }
    }
}

impl FactoryLayout {
    pub fn load(path: &Path) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            SimError::config(format!("failed to read layout {}: {err}", path.display()))
        })?;
        let layout: FactoryLayout = serde_json::from_str(&contents).map_err(|err| {
            SimError::config(format!("failed to parse layout {}: {err}", path.display()))
        })?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.devices.is_empty() {
            return Err(SimError::config("layout has no devices"));
        }
        let mut seen = HashSet::new();
        for spec in &self.devices {
            if !seen.insert(spec.device_id.as_str()) {
                return Err(SimError::config(format!(
                    "duplicate device id {}",
                    spec.device_id
                )));
            }
        }
        Ok(())
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.device_id.clone()).collect()
    }

    /// Builds every device, each with a random maintenance age.
    pub fn build_devices<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> SimResult<Vec<Device>> {
        self.validate()?;
        self.devices
            .iter()
            .cloned()
            .map(|spec| Device::with_random_maintenance(spec, now, &mut *rng))
            .collect()
    }
}
