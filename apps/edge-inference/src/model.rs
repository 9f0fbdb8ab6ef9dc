//! Fixed linear maintenance-risk model run at the edge.
//!
//! The weights stand in for a trained classifier; there is no online learning, so every
//! prediction is a pure function of the reading and the prediction time.

use crate::error::{InferenceError, InferenceResult};
use crate::prediction::{
    Features, RiskLevel, RiskPrediction, TelemetryData, INFERENCE_LOCATION, MODEL_VERSION,
};
use chrono::{DateTime, Utc};

pub const MIN_DAYS_UNTIL_MAINTENANCE: i64 = 5;
pub const MAX_DAYS_UNTIL_MAINTENANCE: i64 = 30;
pub const MIN_CONFIDENCE: f64 = 0.65;
pub const MAX_CONFIDENCE: f64 = 0.95;

const SCORE_OFFSET: f64 = 50.0;
const SCORE_RANGE: f64 = 100.0;
const DAYS_SPAN: f64 = 25.0;
const BASE_CONFIDENCE: f64 = 0.75;
const DISPERSION_PIVOT: f64 = 0.2;
const HIGH_RISK_SCORE: f64 = 20.0;
const MEDIUM_RISK_SCORE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelWeights {
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub power: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            temperature: 0.234,
            vibration: 0.456,
            pressure: -0.123,
            power: 0.789,
        }
    }
}

impl ModelWeights {
    pub fn as_array(&self) -> [f64; 4] {
        [self.temperature, self.vibration, self.pressure, self.power]
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeModel {
    weights: ModelWeights,
}

impl EdgeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ModelWeights) -> InferenceResult<Self> {
        if weights.as_array().iter().any(|w| !w.is_finite()) {
            return Err(InferenceError::Configuration(format!(
                "model weights must be finite: {weights:?}"
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    pub fn raw_score(&self, features: &Features) -> f64 {
        features.temperature * self.weights.temperature
            + features.vibration * self.weights.vibration
            + features.pressure * self.weights.pressure
            + features.power * self.weights.power
    }

    pub fn predict(
        &self,
        telemetry: &TelemetryData,
        now: DateTime<Utc>,
    ) -> InferenceResult<RiskPrediction> {
        let features = Features::from(telemetry);
        let values = [
            features.temperature,
            features.vibration,
            features.pressure,
            features.power,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::Computation(format!(
                "{}: non-finite feature in {values:?}",
                telemetry.device_id
            )));
        }

        let raw_score = self.raw_score(&features);
        let confidence = confidence(dispersion(&features));

        Ok(RiskPrediction {
            device_id: telemetry.device_id.clone(),
            prediction_date: now,
            days_until_maintenance: days_until_maintenance(normalized_score(raw_score)),
            confidence: (confidence * 1000.0).round() / 1000.0,
            risk_level: risk_level(raw_score),
            inference_location: INFERENCE_LOCATION.to_string(),
            model_version: MODEL_VERSION.to_string(),
            features,
        })
    }
}

pub fn normalized_score(raw_score: f64) -> f64 {
    ((raw_score + SCORE_OFFSET) / SCORE_RANGE).clamp(0.0, 1.0)
}

pub fn days_until_maintenance(normalized_score: f64) -> i64 {
    let days = (MAX_DAYS_UNTIL_MAINTENANCE as f64 - normalized_score * DAYS_SPAN).floor() as i64;
    days.clamp(MIN_DAYS_UNTIL_MAINTENANCE, MAX_DAYS_UNTIL_MAINTENANCE)
}

/// Population standard deviation of the readings with temperature, pressure and power
/// scaled by 1/100. Only used as a confidence proxy; the units are mixed.
pub fn dispersion(features: &Features) -> f64 {
    let values = [
        features.temperature / 100.0,
        features.vibration,
        features.pressure / 100.0,
        features.power / 100.0,
    ];
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn confidence(dispersion: f64) -> f64 {
    (BASE_CONFIDENCE + (DISPERSION_PIVOT - dispersion)).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

pub fn risk_level(raw_score: f64) -> RiskLevel {
    if raw_score > HIGH_RISK_SCORE {
        RiskLevel::High
    } else if raw_score > MEDIUM_RISK_SCORE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
