use crate::model::{risk_level, EdgeModel};
use crate::mqtt::handle_telemetry_message;
use crate::prediction::{Features, RiskPrediction, TelemetryData};
use crate::state::EdgeState;
use chrono::{DateTime, Duration, Utc};
use factory_simulator::{
    derive_status, Device, DeviceSpec, DeviceStatus, DeviceType, FactoryLayout,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn now() -> DateTime<Utc> {
    "2026-04-02T12:00:00Z".parse().unwrap()
}

fn to_edge_input(reading: &factory_simulator::TelemetryReading) -> TelemetryData {
    let bytes = reading.to_json().unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn worn_conveyor_reading_flows_into_a_consistent_prediction() {
    let mut rng = StdRng::seed_from_u64(90);
    let mut device = Device::new(
        DeviceSpec::new("LINE_1_CONV_01", "LINE_1", DeviceType::Conv),
        now(),
    )
    .unwrap();
    device.set_last_maintenance(now() - Duration::days(90));

    let reading = device.generate_telemetry(now(), &mut rng).unwrap();
    assert_eq!(reading.days_since_maintenance, 90);

    // CONV thresholds: temperature normal 52 / max 65, vibration normal 0.2 / max 0.6.
    let profile = DeviceType::Conv.profile();
    assert_eq!(profile.temperature.normal, 52.0);
    assert_eq!(profile.temperature.max, 65.0);
    assert_eq!(profile.vibration.normal, 0.2);
    assert_eq!(profile.vibration.max, 0.6);
    assert_eq!(
        reading.status,
        derive_status(&profile, reading.temperature, reading.vibration)
    );

    let telemetry = to_edge_input(&reading);
    let model = EdgeModel::new();
    let prediction = model.predict(&telemetry, now()).unwrap();

    let raw = model.raw_score(&Features::from(&telemetry));
    assert_eq!(prediction.risk_level, risk_level(raw));
    assert_eq!(prediction.device_id, reading.device_id);
    assert_eq!(prediction.features.temperature, reading.temperature);
    assert_eq!(prediction.features.vibration, reading.vibration);
    assert_eq!(prediction.features.pressure, reading.pressure);
    assert_eq!(prediction.features.power, reading.power);
    assert!((5..=30).contains(&prediction.days_until_maintenance));
    assert!((0.65..=0.95).contains(&prediction.confidence));
}

#[test]
fn critical_status_only_comes_from_excursions_past_max() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut device = Device::new(
        DeviceSpec::new("LINE_2_CNC_02", "LINE_2", DeviceType::Cnc),
        now() - Duration::days(45),
    )
    .unwrap();
    let profile = *device.profile();

    for _ in 0..5_000 {
        let reading = device.generate_telemetry(now(), &mut rng).unwrap();
        let exceeds = reading.temperature > profile.temperature.max
            || reading.vibration > profile.vibration.max;
        assert_eq!(reading.status == DeviceStatus::Critical, exceeds);
    }
}

#[test]
fn every_factory_device_is_scored_over_the_bus_handler() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut devices = FactoryLayout::default()
        .build_devices(now(), &mut rng)
        .unwrap();
    let state = EdgeState::default();

    for device in &mut devices {
        let reading = device.generate_telemetry(now(), &mut rng).unwrap();
        let topic = format!("factory/{}/telemetry", reading.device_id);
        let outgoing = handle_telemetry_message(
            &state,
            "factory",
            &topic,
            &reading.to_json().unwrap(),
            now(),
        )
        .unwrap()
        .expect("factory devices are known to the edge module");

        let prediction: RiskPrediction = serde_json::from_slice(&outgoing.payload).unwrap();
        assert_eq!(prediction.device_id, reading.device_id);
        assert_eq!(outgoing.topic, format!("factory/{}/prediction", reading.device_id));
    }
}
