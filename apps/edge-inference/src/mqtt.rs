use crate::config::Config;
use crate::prediction::TelemetryData;
use crate::state::EdgeState;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::time::{sleep, Duration};

pub fn telemetry_filter(prefix: &str) -> String {
    format!("{prefix}/+/telemetry")
}

pub fn prediction_topic(prefix: &str, device_id: &str) -> String {
    format!("{prefix}/{device_id}/prediction")
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingPrediction {
    pub device_id: String,
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Decodes one telemetry publish and scores it.
///
/// Returns `Ok(None)` for topics outside `{prefix}/<device>/telemetry`, for payloads whose
/// `deviceId` differs from the topic's device segment, and for devices that are not in the
/// known-device registry.
pub fn handle_telemetry_message(
    state: &EdgeState,
    prefix: &str,
    topic: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<Option<OutgoingPrediction>> {
    let parts: Vec<&str> = topic.split('/').collect();
    if parts.len() != 3 || parts[0] != prefix || parts[2] != "telemetry" {
        return Ok(None);
    }

    let telemetry: TelemetryData = serde_json::from_slice(payload)?;
    if telemetry.device_id != parts[1] {
        tracing::debug!(
            topic = %topic,
            device_id = %telemetry.device_id,
            "ignoring telemetry whose deviceId does not match its topic"
        );
        return Ok(None);
    }
    if !state.known_devices.contains(&telemetry.device_id) {
        tracing::debug!(device_id=%telemetry.device_id, "ignoring telemetry from unknown device");
        return Ok(None);
    }

    let prediction = state.model.predict(&telemetry, now)?;
    Ok(Some(OutgoingPrediction {
        topic: prediction_topic(prefix, &prediction.device_id),
        payload: serde_json::to_vec(&prediction)?,
        device_id: prediction.device_id,
    }))
}

pub async fn run_listener(config: Config, state: EdgeState) -> Result<()> {
    let filter = telemetry_filter(&config.mqtt_topic_prefix);
    loop {
        let mut mqttoptions = MqttOptions::new(
            config.mqtt_client_id.clone(),
            config.mqtt_host.clone(),
            config.mqtt_port,
        );
        mqttoptions.set_keep_alive(config.mqtt_keepalive());
        if let Some(username) = &config.mqtt_username {
            mqttoptions.set_credentials(
                username.clone(),
                config.mqtt_password.clone().unwrap_or_default(),
            );
        }

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, 32);
        if let Err(err) = client.subscribe(filter.clone(), QoS::AtLeastOnce).await {
            tracing::warn!(error=%err, "failed to subscribe to MQTT; retrying");
            sleep(Duration::from_secs(2)).await;
            continue;
        }
        tracing::info!(topic=%filter, "subscribed to telemetry feed");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    let outgoing = match handle_telemetry_message(
                        &state,
                        &config.mqtt_topic_prefix,
                        &publish.topic,
                        &publish.payload,
                        Utc::now(),
                    ) {
                        Ok(Some(outgoing)) => outgoing,
                        Ok(None) => continue,
                        Err(err) => {
                            tracing::warn!(error=%err, topic=%publish.topic, "error processing message");
                            continue;
                        }
                    };

                    // try_publish: awaiting the request queue here would stall the poller that drains it.
                    match client.try_publish(
                        outgoing.topic.clone(),
                        QoS::AtLeastOnce,
                        false,
                        outgoing.payload,
                    ) {
                        Ok(()) => {
                            tracing::info!(device_id=%outgoing.device_id, "Sent prediction for {}", outgoing.device_id);
                        }
                        Err(err) => {
                            tracing::warn!(error=%err, topic=%outgoing.topic, "failed to publish prediction");
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error=%err, "MQTT connection error; reconnecting");
                    sleep(Duration::from_secs(2)).await;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::RiskPrediction;
    use serde_json::json;

    fn payload(device_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "deviceId": device_id,
            "timestamp": "2026-01-16T10:00:00Z",
            "temperature": 62.0,
            "vibration": 0.3,
            "pressure": 32.0,
            "power": 65.0,
            "status": "Running"
        }))
        .unwrap()
    }

    #[test]
    fn known_device_gets_a_prediction_on_its_own_topic() {
        let state = EdgeState::default();
        let now = Utc::now();
        let outgoing = handle_telemetry_message(
            &state,
            "factory",
            "factory/LINE_2_ROBOT_02/telemetry",
            &payload("LINE_2_ROBOT_02"),
            now,
        )
        .unwrap()
        .unwrap();

        assert_eq!(outgoing.topic, "factory/LINE_2_ROBOT_02/prediction");
        let prediction: RiskPrediction = serde_json::from_slice(&outgoing.payload).unwrap();
        assert_eq!(prediction.device_id, "LINE_2_ROBOT_02");
        assert_eq!(prediction.prediction_date, now);
    }

    #[test]
    fn unknown_device_and_foreign_topics_are_ignored() {
        let state = EdgeState::default();
        let now = Utc::now();
        let unknown = handle_telemetry_message(
            &state,
            "factory",
            "factory/LINE_9_CNC_09/telemetry",
            &payload("LINE_9_CNC_09"),
            now,
        )
        .unwrap();
        assert!(unknown.is_none());

        let foreign = handle_telemetry_message(
            &state,
            "factory",
            "factory/LINE_1_CNC_01/prediction",
            &payload("LINE_1_CNC_01"),
            now,
        )
        .unwrap();
        assert!(foreign.is_none());
    }

    #[test]
    fn payload_for_another_device_than_the_topic_is_dropped() {
        let state = EdgeState::default();
        let outgoing = handle_telemetry_message(
            &state,
            "factory",
            "factory/ROGUE/telemetry",
            &payload("LINE_1_CNC_01"),
            Utc::now(),
        )
        .unwrap();
        assert!(outgoing.is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let state = EdgeState::default();
        let result = handle_telemetry_message(
            &state,
            "factory",
            "factory/LINE_1_CNC_01/telemetry",
            b"{not json",
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn topic_helpers() {
        assert_eq!(telemetry_filter("factory"), "factory/+/telemetry");
        assert_eq!(prediction_topic("plant", "X"), "plant/X/prediction");
    }
}
