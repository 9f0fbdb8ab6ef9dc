use crate::device::DeviceSnapshot;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::watch;

#[derive(Clone)]
pub struct HttpState {
    pub devices: watch::Receiver<Vec<DeviceSnapshot>>,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_devices(State(state): State<HttpState>) -> Json<Vec<DeviceSnapshot>> {
    let devices = state.devices.borrow().clone();
    Json(devices)
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/devices", get(get_devices))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, DeviceSpec};
    use crate::profile::DeviceType;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    fn state() -> HttpState {
        let device = Device::new(
            DeviceSpec::new("LINE_1_ROBOT_01", "LINE_1", DeviceType::Robot),
            Utc::now(),
        )
        .unwrap();
        let (_tx, rx) = watch::channel(vec![device.snapshot()]);
        HttpState { devices: rx }
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let resp = router(state())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn devices_lists_current_snapshots() {
        let resp = router(state())
            .oneshot(Request::builder().uri("/v1/devices").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value[0]["deviceId"], "LINE_1_ROBOT_01");
        assert_eq!(value[0]["status"], "Running");
    }
}
