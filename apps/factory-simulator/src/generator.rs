//! Per-tick telemetry synthesis.
//!
//! Each tick combines the profile baseline, a slow sinusoidal cycle, a wear offset that grows
//! with days since maintenance, and Gaussian noise. Values are clamped to the profile range
//! before a rare anomaly multiplier is applied, so an anomalous reading may leave the range.

use crate::device::{Device, DeviceStatus};
use crate::error::{SimError, SimResult};
use crate::profile::{DeviceProfile, Quantity};
use crate::telemetry::{round_to, TelemetryReading};
use chrono::{DateTime, Utc};
use rand::distributions::Distribution;
use rand::Rng;

pub const HOURS_PER_TICK: f64 = 0.5;
pub const MAX_WEAR_FACTOR: f64 = 1.5;
pub const ANOMALY_PROBABILITY: f64 = 0.05;

const CYCLE_PHASE_STEP: f64 = 0.1;
const CYCLE_AMPLITUDE: f64 = 0.1;
const WEAR_SENSITIVITY: f64 = 0.3;
const WARNING_TEMPERATURE_RATIO: f64 = 0.9;
const WARNING_VIBRATION_RATIO: f64 = 0.8;

/// The four measured values of one tick, indexed by [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    values: [f64; 4],
}

impl Measurements {
    pub fn get(&self, quantity: Quantity) -> f64 {
        self.values[quantity.index()]
    }

    pub fn set(&mut self, quantity: Quantity, value: f64) {
        self.values[quantity.index()] = value;
    }

    /// Output precision: one decimal, three for vibration.
    pub fn rounded(&self) -> Self {
        let mut out = *self;
        for quantity in Quantity::ALL {
            out.set(quantity, round_to(self.get(quantity), quantity.precision()));
        }
        out
    }
}

/// Degradation multiplier; reaches its cap 50 days after maintenance.
pub fn wear_factor(days_since_maintenance: i64) -> f64 {
    (1.0 + days_since_maintenance as f64 / 100.0).min(MAX_WEAR_FACTOR)
}

pub fn wear_adjustment(wear_factor: f64, normal: f64) -> f64 {
    (wear_factor - 1.0) * normal * WEAR_SENSITIVITY
}

pub fn cycle_variation(cycle: u64) -> f64 {
    (cycle as f64 * CYCLE_PHASE_STEP).sin() * CYCLE_AMPLITUDE
}

pub fn days_since(last_maintenance: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_maintenance).num_days().max(0)
}

pub fn derive_status(profile: &DeviceProfile, temperature: f64, vibration: f64) -> DeviceStatus {
    let temp_max = profile.temperature.max;
    let vib_max = profile.vibration.max;

    if temperature > temp_max || vibration > vib_max {
        DeviceStatus::Critical
    } else if temperature > temp_max * WARNING_TEMPERATURE_RATIO
        || vibration > vib_max * WARNING_VIBRATION_RATIO
    {
        DeviceStatus::Warning
    } else {
        DeviceStatus::Running
    }
}

/// Rolls the 5% anomaly chance; on a hit multiplies one random quantity by its factor.
pub fn maybe_inject_anomaly<R: Rng + ?Sized>(
    values: &mut Measurements,
    rng: &mut R,
) -> Option<Quantity> {
    if !rng.gen_bool(ANOMALY_PROBABILITY) {
        return None;
    }
    let quantity = Quantity::ALL[rng.gen_range(0..Quantity::ALL.len())];
    values.set(quantity, values.get(quantity) * quantity.anomaly_factor());
    Some(quantity)
}

impl Device {
    /// Pre-anomaly values for the given cycle and maintenance age, each within its profile range.
    pub fn sample_measurements<R: Rng + ?Sized>(
        &self,
        cycle: u64,
        days_since_maintenance: i64,
        rng: &mut R,
    ) -> SimResult<Measurements> {
        let wear = wear_factor(days_since_maintenance);
        let cycle_variation = cycle_variation(cycle);
        let mut values = Measurements { values: [0.0; 4] };

        for quantity in Quantity::ALL {
            let config = self.profile.get(quantity);
            let base_value = config.normal + wear_adjustment(wear, config.normal);
            let noise = self.noise[quantity.index()].sample(rng);
            let raw = base_value + noise + cycle_variation * config.normal;
            if !raw.is_finite() {
                return Err(SimError::computation(format!(
                    "{} {quantity}: non-finite sample {raw}",
                    self.state.device_id
                )));
            }
            values.set(quantity, config.clamp(raw));
        }

        Ok(values)
    }

    /// Advances the device by one tick and returns the reading.
    ///
    /// The device is only mutated once the full reading has been produced, so a failed
    /// tick leaves hours, cycle and status untouched.
    pub fn generate_telemetry<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> SimResult<TelemetryReading> {
        let operational_hours = self.state.operational_hours + HOURS_PER_TICK;
        let cycle = self.state.cycle + 1;
        let days_since_maintenance = days_since(self.state.last_maintenance, now);

        let mut values = self.sample_measurements(cycle, days_since_maintenance, rng)?;
        if let Some(quantity) = maybe_inject_anomaly(&mut values, rng) {
            tracing::debug!(
                device_id = %self.state.device_id,
                quantity = %quantity,
                "injected telemetry anomaly"
            );
        }

        // Status is judged on the emitted precision so consumers can recompute it from the payload.
        let values = values.rounded();
        let temperature = values.get(Quantity::Temperature);
        let vibration = values.get(Quantity::Vibration);
        let status = derive_status(&self.profile, temperature, vibration);

        self.state.operational_hours = operational_hours;
        self.state.cycle = cycle;
        self.state.status = status;

        Ok(TelemetryReading {
            device_id: self.state.device_id.clone(),
            timestamp: now,
            temperature,
            vibration,
            pressure: values.get(Quantity::Pressure),
            power: values.get(Quantity::Power),
            status,
            operational_hours,
            days_since_maintenance,
            line: self.state.line.clone(),
            device_type: self.state.device_type,
        })
    }
}
