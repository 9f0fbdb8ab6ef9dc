use crate::error::{AppError, AppResult};
use crate::prediction::{RiskPrediction, TelemetryData};
use crate::state::EdgeState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MODULE_NAME: &str = "smart-factory-ml";
pub const MODULE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub module: &'static str,
    pub version: &'static str,
    pub devices: usize,
}

async fn health(State(state): State<EdgeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        module: MODULE_NAME,
        version: MODULE_VERSION,
        devices: state.known_devices.len(),
    })
}

async fn predict(
    State(state): State<EdgeState>,
    payload: Result<Json<TelemetryData>, JsonRejection>,
) -> AppResult<Json<RiskPrediction>> {
    let Json(telemetry) = payload.map_err(|err| {
        tracing::warn!(error=%err, "rejected prediction request body");
        AppError::bad_request("Invalid telemetry payload")
    })?;

    if !state.known_devices.contains(&telemetry.device_id) {
        return Err(AppError::bad_request("Invalid deviceId"));
    }

    let prediction = state.model.predict(&telemetry, Utc::now()).map_err(|err| {
        tracing::error!(device_id=%telemetry.device_id, error=%err, "prediction error");
        AppError::internal("Prediction failed")
    })?;
    Ok(Json(prediction))
}

pub fn router(state: EdgeState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let resp = router(EdgeState::default()).oneshot(request).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn predict_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_module_and_device_count() {
        let (status, body) = send(Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["module"], "smart-factory-ml");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["devices"], 9);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn predict_scores_known_device() {
        let (status, body) = send(predict_request(json!({
            "deviceId": "LINE_1_CNC_01",
            "timestamp": "2026-01-16T10:00:00Z",
            "temperature": 75.5,
            "vibration": 0.45,
            "pressure": 32.1,
            "power": 78.3,
            "status": "Running"
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deviceId"], "LINE_1_CNC_01");
        assert_eq!(body["daysUntilMaintenance"], 5);
        assert_eq!(body["riskLevel"], "High");
        assert_eq!(body["confidence"], 0.753);
        assert_eq!(body["inferenceLocation"], "edge");
        assert_eq!(body["features"]["temperature"], 75.5);
    }

    #[tokio::test]
    async fn predict_rejects_unknown_device() {
        let (status, body) = send(predict_request(json!({
            "deviceId": "LINE_9_CNC_09",
            "timestamp": "2026-01-16T10:00:00Z",
            "temperature": 75.5,
            "vibration": 0.45,
            "pressure": 32.1,
            "power": 78.3,
            "status": "Running"
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid deviceId");
    }

    #[tokio::test]
    async fn predict_rejects_malformed_body() {
        let (status, body) = send(predict_request(json!({ "deviceId": "LINE_1_CNC_01" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid telemetry payload");
    }
}
