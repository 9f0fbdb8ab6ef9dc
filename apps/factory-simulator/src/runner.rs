use crate::config::Config;
use crate::device::{Device, DeviceSnapshot};
use crate::error::{SimError, SimResult};
use crate::mqtt::TelemetryPublisher;
use crate::telemetry::TelemetryReading;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{sleep, MissedTickBehavior};

/// Sole owner of the simulated devices. Devices are ticked one at a time.
pub struct Simulation<R> {
    devices: Vec<Device>,
    rng: R,
    snapshots: watch::Sender<Vec<DeviceSnapshot>>,
}

impl<R: Rng> Simulation<R> {
    pub fn new(devices: Vec<Device>, rng: R) -> (Self, watch::Receiver<Vec<DeviceSnapshot>>) {
        let initial = devices.iter().map(Device::snapshot).collect();
        let (snapshots, rx) = watch::channel(initial);
        (
            Self {
                devices,
                rng,
                snapshots,
            },
            rx,
        )
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn tick_device(&mut self, index: usize, now: DateTime<Utc>) -> SimResult<TelemetryReading> {
        let count = self.devices.len();
        let device = self
            .devices
            .get_mut(index)
            .ok_or_else(|| SimError::config(format!("no device at index {index} of {count}")))?;
        let reading = device.generate_telemetry(now, &mut self.rng)?;
        let snapshot = device.snapshot();
        self.snapshots.send_modify(|all| {
            if let Some(slot) = all.get_mut(index) {
                *slot = snapshot;
            }
        });
        Ok(reading)
    }

    /// One pass over every device, in layout order.
    pub fn tick_all(&mut self, now: DateTime<Utc>) -> Vec<SimResult<TelemetryReading>> {
        (0..self.devices.len())
            .map(|index| self.tick_device(index, now))
            .collect()
    }
}

pub async fn run<R: Rng>(
    config: Config,
    mut simulation: Simulation<R>,
    publisher: TelemetryPublisher,
) -> Result<()> {
    tracing::info!(
        devices = simulation.len(),
        "starting factory simulation with {} devices",
        simulation.len()
    );
    tracing::info!(
        interval_secs = config.telemetry_interval.as_secs(),
        "telemetry interval configured"
    );

    let mut ticker = tokio::time::interval(config.telemetry_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for index in 0..simulation.len() {
            let device_id = simulation.devices()[index].device_id().to_string();
            match simulation.tick_device(index, Utc::now()) {
                Ok(reading) => match publisher.publish(&reading).await {
                    Ok(()) => {
                        tracing::info!(
                            device_id = %reading.device_id,
                            status = %reading.status,
                            "Sent telemetry for {}: {}",
                            reading.device_id,
                            reading.status
                        );
                    }
                    Err(err) => {
                        tracing::warn!(device_id = %device_id, error = %err, "failed to publish telemetry");
                    }
                },
                Err(err) => {
                    tracing::error!(device_id = %device_id, error = %err, "telemetry tick failed");
                }
            }
            if !config.device_delay.is_zero() {
                sleep(config.device_delay).await;
            }
        }
    }
}
