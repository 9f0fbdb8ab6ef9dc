pub mod config;
pub mod device;
pub mod error;
pub mod generator;
pub mod http;
pub mod layout;
pub mod mqtt;
pub mod profile;
pub mod runner;
pub mod telemetry;

pub use device::{Device, DeviceSnapshot, DeviceSpec, DeviceState, DeviceStatus};
pub use error::{SimError, SimResult};
pub use generator::{derive_status, wear_adjustment, wear_factor, Measurements};
pub use layout::FactoryLayout;
pub use profile::{DeviceProfile, DeviceType, Quantity, QuantityProfile};
pub use telemetry::TelemetryReading;
