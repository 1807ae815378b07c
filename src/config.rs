use crate::error::BoxedError;
use crate::scheduler::SchedulerConfig;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

#[derive(Debug, Deserialize)]
pub struct KioskConfig {
    pub database_url: String,
    pub server_address: String,
    pub log_level: String,
    pub fulfill_after_secs: u64,
    pub sweep_interval_ms: u64,
}

impl KioskConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BoxedError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            fulfill_after: Duration::from_secs(self.fulfill_after_secs),
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
        }
    }
}
