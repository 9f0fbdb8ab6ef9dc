use std::collections::HashSet;

pub const FACTORY_DEVICES: [&str; 9] = [
    "LINE_1_CNC_01",
    "LINE_1_ROBOT_01",
    "LINE_1_CONV_01",
    "LINE_2_CNC_02",
    "LINE_2_ROBOT_02",
    "LINE_2_CONV_02",
    "LINE_3_CNC_03",
    "LINE_3_ROBOT_03",
    "LINE_3_CONV_03",
];

/// Devices the edge module will score; telemetry from anything else is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownDevices {
    ids: HashSet<String>,
}

impl Default for KnownDevices {
    fn default() -> Self {
        Self::new(FACTORY_DEVICES.iter().map(|id| id.to_string()))
    }
}

impl KnownDevices {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Comma-separated list; blank entries are skipped.
    pub fn parse_list(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        )
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.ids.contains(device_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
