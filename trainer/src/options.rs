use anyhow::Result;
use common::Config;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainerOptions {
    pub replay_capacity: usize,
    /// Training starts once the buffer holds at least this many triplets.
    pub min_batch_size: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// A new weight bundle is published after this many games.
    pub checkpoint_interval: usize,
    pub hidden_size: usize,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            replay_capacity: 2000,
            min_batch_size: 64,
            batch_size: 64,
            learning_rate: 1e-3,
            checkpoint_interval: 5,
            hidden_size: 256,
        }
    }
}

impl Config for TrainerOptions {
    fn load(config: &common::ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            replay_capacity: config
                .get("replay_capacity")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.replay_capacity),
            min_batch_size: config
                .get("min_batch_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.min_batch_size),
            batch_size: config
                .get("batch_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.batch_size),
            learning_rate: config
                .get("learning_rate")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.learning_rate),
            checkpoint_interval: config
                .get("checkpoint_interval")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.checkpoint_interval),
            hidden_size: config
                .get("hidden_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.hidden_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ConfigLoader;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigLoader::from_string("{}", "coordinator".to_string()).unwrap();

        assert_eq!(config.load::<TrainerOptions>().unwrap(), TrainerOptions::default());
    }

    #[test]
    fn test_top_level_values_apply_to_every_scope() {
        let config = ConfigLoader::from_string(
            "checkpoint_interval = 2\ncoordinator { batch_size = 16 }",
            "coordinator".to_string(),
        )
        .unwrap();
        let options = config.load::<TrainerOptions>().unwrap();

        assert_eq!(options.checkpoint_interval, 2);
        assert_eq!(options.batch_size, 16);
        assert_eq!(options.min_batch_size, 64);
    }
}
