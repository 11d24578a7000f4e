use std::path::PathBuf;

use anyhow::Result;
use common::{Config, FsExt};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoordinatorOptions {
    pub bind_address: String,
    pub weights_path: PathBuf,
    pub triplets_path: PathBuf,
    /// Oldest triplets are discarded once the aggregate store holds more than this.
    pub max_triplets: usize,
    /// Reports waiting for the trainer beyond this are not forwarded.
    pub trainer_channel_size: usize,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            weights_path: PathBuf::from("weights/latest.json"),
            triplets_path: PathBuf::from("data/triplets.json"),
            max_triplets: 10_000,
            trainer_channel_size: 1000,
        }
    }
}

impl Config for CoordinatorOptions {
    fn load(config: &common::ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            bind_address: config
                .get("bind_address")
                .and_then(|v| v.as_string())
                .unwrap_or(defaults.bind_address),
            weights_path: match config.get_relative_path("weights_path") {
                Ok(path) => path,
                Err(_) => defaults.weights_path.relative_to_cwd()?,
            },
            triplets_path: match config.get_relative_path("triplets_path") {
                Ok(path) => path,
                Err(_) => defaults.triplets_path.relative_to_cwd()?,
            },
            max_triplets: config
                .get("max_triplets")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.max_triplets),
            trainer_channel_size: config
                .get("trainer_channel_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.trainer_channel_size),
        })
    }
}
