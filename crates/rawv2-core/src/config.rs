//! Sensor alias configuration (TOML).
//!
//! ```toml
//! strip_manufacturer_id = true
//!
//! [[sensors]]
//! name = "sauna"
//! address = "CB:B8:33:4C:88:4F"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::address::Address;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("address {address} is configured more than once")]
    DuplicateAddress { address: Address },
}

/// Human-readable name for one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorAlias {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Payloads carry the `99 04` manufacturer ID ahead of the format tag.
    pub strip_manufacturer_id: bool,
    pub sensors: Vec<SensorAlias>,
}

impl SensorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(
            path = %path.display(),
            sensors = config.sensors.len(),
            "loaded sensor configuration"
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn name_for(&self, address: &Address) -> Option<&str> {
        self.sensors
            .iter()
            .find(|sensor| &sensor.address == address)
            .map(|sensor| sensor.name.as_str())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if !seen.insert(sensor.address) {
                return Err(ConfigError::DuplicateAddress {
                    address: sensor.address,
                });
            }
        }
        Ok(())
    }
}
