use crate::config::Config;
use crate::telemetry::TelemetryReading;
use anyhow::Result;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tokio::task::JoinHandle;

pub fn telemetry_topic(prefix: &str, device_id: &str) -> String {
    format!("{prefix}/{device_id}/telemetry")
}

#[derive(Debug, Clone)]
pub struct TelemetryPublisher {
    client: AsyncClient,
    topic_prefix: String,
}

impl TelemetryPublisher {
    pub fn new(config: &Config) -> (Self, JoinHandle<()>) {
        let mut options = MqttOptions::new(
            config.mqtt_client_id.clone(),
            config.mqtt_host.clone(),
            config.mqtt_port,
        );
        options.set_keep_alive(Duration::from_secs(15));
        if let Some(username) = &config.mqtt_username {
            options.set_credentials(
                username.clone(),
                config.mqtt_password.clone().unwrap_or_default(),
            );
        }

        let (client, mut eventloop) = AsyncClient::new(options, 64);
        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "mqtt event loop error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });

        (
            Self {
                client,
                topic_prefix: config.mqtt_topic_prefix.clone(),
            },
            handle,
        )
    }

    pub async fn publish(&self, reading: &TelemetryReading) -> Result<()> {
        let topic = telemetry_topic(&self.topic_prefix, &reading.device_id);
        let payload = reading.to_json()?;
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}
