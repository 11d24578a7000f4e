use anyhow::Result;
use common::Config;
use mcts::{DirichletOptions, MCTSOptions};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelfPlayOptions {
    /// Simulations per move.
    pub simulations: usize,
    pub cpuct: f32,
    /// Moves are sampled in proportion to visits for this many plies, then played greedily.
    pub exploration_plies: usize,
    /// Games still running after this many plies are stopped and scored as a draw.
    pub max_plies: usize,
    pub dirichlet_alpha: f32,
    /// Weight of the root noise. `0.0` disables it.
    pub dirichlet_epsilon: f32,
    pub search_threads: usize,
}

impl SelfPlayOptions {
    pub fn mcts_options(&self) -> MCTSOptions {
        let dirichlet = if self.dirichlet_epsilon > 0.0 {
            Some(DirichletOptions {
                alpha: self.dirichlet_alpha,
                epsilon: self.dirichlet_epsilon,
            })
        } else {
            None
        };

        MCTSOptions::new(self.cpuct, dirichlet)
    }
}

impl Default for SelfPlayOptions {
    fn default() -> Self {
        Self {
            simulations: 50,
            cpuct: 1.4,
            exploration_plies: 30,
            max_plies: 200,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.0,
            search_threads: 1,
        }
    }
}

impl Config for SelfPlayOptions {
    fn load(config: &common::ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            simulations: config
                .get("simulations")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.simulations),
            cpuct: config
                .get("cpuct")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.cpuct),
            exploration_plies: config
                .get("exploration_plies")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.exploration_plies),
            max_plies: config
                .get("max_plies")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.max_plies),
            dirichlet_alpha: config
                .get("dirichlet_alpha")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.dirichlet_alpha),
            dirichlet_epsilon: config
                .get("dirichlet_epsilon")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.dirichlet_epsilon),
            search_threads: config
                .get("search_threads")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.search_threads),
        })
    }
}
