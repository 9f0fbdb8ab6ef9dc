use crate::devices::KnownDevices;
use crate::model::EdgeModel;
use std::sync::Arc;

/// Shared by the HTTP handlers and the MQTT handler. Read-only after startup.
#[derive(Debug, Clone)]
pub struct EdgeState {
    pub model: Arc<EdgeModel>,
    pub known_devices: Arc<KnownDevices>,
}

impl EdgeState {
    pub fn new(model: EdgeModel, known_devices: KnownDevices) -> Self {
        Self {
            model: Arc::new(model),
            known_devices: Arc::new(known_devices),
        }
    }
}

impl Default for EdgeState {
    fn default() -> Self {
        Self::new(EdgeModel::new(), KnownDevices::default())
    }
}
