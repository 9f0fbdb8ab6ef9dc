use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Temperature,
    Vibration,
    Pressure,
    Power,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::Temperature,
        Quantity::Vibration,
        Quantity::Pressure,
        Quantity::Power,
    ];

    pub fn index(self) -> usize {
        match self {
            Quantity::Temperature => 0,
            Quantity::Vibration => 1,
            Quantity::Pressure => 2,
            Quantity::Power => 3,
        }
    }

    /// Multiplier applied when an anomaly hits this quantity.
    pub fn anomaly_factor(self) -> f64 {
        match self {
            Quantity::Temperature => 1.2,
            Quantity::Vibration => 1.5,
            Quantity::Pressure => 0.7,
            Quantity::Power => 1.3,
        }
    }

    /// Decimal places kept on the wire.
    pub fn precision(self) -> i32 {
        match self {
            Quantity::Vibration => 3,
            _ => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Vibration => "vibration",
            Quantity::Pressure => "pressure",
            Quantity::Power => "power",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityProfile {
    pub min: f64,
    pub max: f64,
    pub normal: f64,
    /// Standard deviation of the Gaussian noise added each tick.
    pub variance: f64,
}

impl QuantityProfile {
    pub const fn new(min: f64, max: f64, normal: f64, variance: f64) -> Self {
        Self {
            min,
            max,
            normal,
            variance,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    fn validate(&self, quantity: Quantity) -> SimResult<()> {
        let finite = [self.min, self.max, self.normal, self.variance]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(SimError::config(format!(
                "{quantity}: profile parameters must be finite"
            )));
        }
        if self.variance <= 0.0 {
            return Err(SimError::config(format!(
                "{quantity}: variance must be > 0 (got {})",
                self.variance
            )));
        }
        if self.min > self.max {
            return Err(SimError::config(format!(
                "{quantity}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if self.normal < self.min || self.normal > self.max {
            return Err(SimError::config(format!(
                "{quantity}: normal {} outside [{}, {}]",
                self.normal, self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub temperature: QuantityProfile,
    pub vibration: QuantityProfile,
    pub pressure: QuantityProfile,
    pub power: QuantityProfile,
}

impl DeviceProfile {
    pub fn get(&self, quantity: Quantity) -> &QuantityProfile {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Vibration => &self.vibration,
            Quantity::Pressure => &self.pressure,
            Quantity::Power => &self.power,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        for quantity in Quantity::ALL {
            self.get(quantity).validate(quantity)?;
        }
        Ok(())
    }
}

const CNC_PROFILE: DeviceProfile = DeviceProfile {
    temperature: QuantityProfile::new(65.0, 85.0, 72.0, 3.0),
    vibration: QuantityProfile::new(0.1, 1.2, 0.4, 0.1),
    pressure: QuantityProfile::new(15.0, 50.0, 30.0, 5.0),
    power: QuantityProfile::new(60.0, 95.0, 78.0, 8.0),
};

const ROBOT_PROFILE: DeviceProfile = DeviceProfile {
    temperature: QuantityProfile::new(55.0, 75.0, 62.0, 2.0),
    vibration: QuantityProfile::new(0.2, 0.8, 0.3, 0.05),
    pressure: QuantityProfile::new(20.0, 45.0, 32.0, 4.0),
    power: QuantityProfile::new(45.0, 80.0, 65.0, 6.0),
};

const CONV_PROFILE: DeviceProfile = DeviceProfile {
    temperature: QuantityProfile::new(45.0, 65.0, 52.0, 2.0),
    vibration: QuantityProfile::new(0.1, 0.6, 0.2, 0.03),
    pressure: QuantityProfile::new(10.0, 25.0, 18.0, 2.0),
    power: QuantityProfile::new(25.0, 55.0, 35.0, 4.0),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "CNC")]
    Cnc,
    #[serde(rename = "ROBOT")]
    Robot,
    /// Conveyor.
    #[serde(rename = "CONV")]
    Conv,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [DeviceType::Cnc, DeviceType::Robot, DeviceType::Conv];

    pub fn profile(self) -> DeviceProfile {
        match self {
            DeviceType::Cnc => CNC_PROFILE,
            DeviceType::Robot => ROBOT_PROFILE,
            DeviceType::Conv => CONV_PROFILE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Cnc => "CNC",
            DeviceType::Robot => "ROBOT",
            DeviceType::Conv => "CONV",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = SimError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CNC" => Ok(DeviceType::Cnc),
            "ROBOT" => Ok(DeviceType::Robot),
            "CONV" => Ok(DeviceType::Conv),
            other => Err(SimError::config(format!("unknown device type {other:?}"))),
        }
    }
}
