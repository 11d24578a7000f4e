use std::time::Duration;

use anyhow::Result;
use common::Config;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkerOptions {
    pub coordinator_url: String,
    /// Hidden size of the default parameters used when no weights can be pulled.
    pub hidden_size: usize,
    /// Stop once an iteration finishes after this many minutes. Runs indefinitely when unset.
    pub duration_mins: Option<u64>,
    pub fetch_timeout_secs: u64,
    pub report_timeout_secs: u64,
}

impl WorkerOptions {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_mins.map(|mins| Duration::from_secs(mins * 60))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            coordinator_url: "http://localhost:8000".to_string(),
            hidden_size: 256,
            duration_mins: None,
            fetch_timeout_secs: 10,
            report_timeout_secs: 30,
        }
    }
}

impl Config for WorkerOptions {
    fn load(config: &common::ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            coordinator_url: config
                .get("coordinator_url")
                .and_then(|v| v.as_string())
                .unwrap_or(defaults.coordinator_url),
            hidden_size: config
                .get("hidden_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.hidden_size),
            duration_mins: config
                .get("duration_mins")
                .and_then(|v| v.as_u64())
                .or(defaults.duration_mins),
            fetch_timeout_secs: config
                .get("fetch_timeout_secs")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.fetch_timeout_secs),
            report_timeout_secs: config
                .get("report_timeout_secs")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.report_timeout_secs),
        })
    }
}
