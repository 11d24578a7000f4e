use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{error, info, warn};
use rand::thread_rng;
use uuid::Uuid;

use engine::{GameEngine, GameState};
use model::Network;
use self_play::{play_self_one, SelfPlayOptions};

use super::{CoordinatorClient, WorkerOptions};

/// What a single pull, play and report iteration did.
#[derive(Clone, Debug, PartialEq)]
pub struct Iteration {
    /// Version of the weights the game was played with.
    pub version: u64,
    /// Whether the default parameters were used because no usable weights were pulled.
    pub default_weights: bool,
    pub plies: usize,
    pub result: f32,
    /// Number of triplets the coordinator acknowledged, if the report went through.
    pub reported: Option<usize>,
}

/// Repeatedly pulls weights, plays one self-play game and reports its triplets. Iterations
/// share nothing, so the worker can be stopped between any two of them.
pub struct Worker<E> {
    id: Uuid,
    client: CoordinatorClient,
    game_engine: Arc<E>,
    options: WorkerOptions,
    self_play_options: SelfPlayOptions,
}

impl<E> Worker<E>
where
    E: GameEngine + Send + Sync + 'static,
    E::State: GameState + Send + Sync,
    E::Action: Clone + Debug + Send,
{
    pub fn new(game_engine: E, options: WorkerOptions, self_play_options: SelfPlayOptions) -> Self {
        let client = CoordinatorClient::new(
            &options.coordinator_url,
            options.fetch_timeout(),
            options.report_timeout(),
        );

        Self {
            id: Uuid::new_v4(),
            client,
            game_engine: Arc::new(game_engine),
            options,
            self_play_options,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Runs iterations until the configured duration has passed, or forever without one.
    pub async fn run(&self) -> Result<()> {
        self.run_for(self.options.duration()).await?;

        Ok(())
    }

    /// Runs iterations until one finishes after `duration` has elapsed and returns how many
    /// completed. A failed iteration is logged and the next one starts fresh.
    pub async fn run_for(&self, duration: Option<Duration>) -> Result<usize> {
        let start = Instant::now();
        let mut iterations: usize = 0;

        info!(
            "Worker {} starting against {}, duration: {}",
            self.id,
            self.client.base_url(),
            duration.map_or_else(|| "indefinite".to_string(), |d| format!("{:.1}m", d.as_secs_f32() / 60.0))
        );

        while duration.map_or(true, |duration| start.elapsed() < duration) {
            match self.run_iteration().await {
                Ok(iteration) => {
                    iterations += 1;
                    info!(
                        "Worker {}, Iteration: {}, Version: {}, Plies: {}, Result: {}, Reported: {}, Elapsed: {:.2}m",
                        self.id,
                        iterations,
                        iteration.version,
                        iteration.plies,
                        iteration.result,
                        iteration.reported.map_or_else(|| "no".to_string(), |n| n.to_string()),
                        start.elapsed().as_secs_f32() / 60.0
                    );
                }
                Err(err) => error!("Worker {} iteration failed: {:#}", self.id, err),
            }
        }

        info!("Worker {} finished after {} iterations", self.id, iterations);

        Ok(iterations)
    }

    pub async fn run_iteration(&self) -> Result<Iteration> {
        let (network, default_weights) = self.pull_network().await;
        let version = network.version();

        let game_engine = self.game_engine.clone();
        let self_play_options = self.self_play_options.clone();
        let game = tokio::task::spawn_blocking(move || {
            play_self_one(&*game_engine, &network, &self_play_options, &mut thread_rng())
        })
        .await??;

        let plies = game.plies;
        let result = game.result;
        let triplets = game.into_triplets();

        let reported = match self.client.report_triplets(&triplets).await {
            Ok(ack) => Some(ack.received),
            Err(err) => {
                warn!(
                    "Worker {} failed to report {} triplets: {:#}",
                    self.id,
                    triplets.len(),
                    err
                );
                None
            }
        };

        Ok(Iteration {
            version,
            default_weights,
            plies,
            result,
            reported,
        })
    }

    /// The pulled network, or the default parameters when the pull fails or does not fit
    /// the game.
    async fn pull_network(&self) -> (Network, bool) {
        let input_size = self.game_engine.input_size();
        let policy_size = self.game_engine.action_space_size();

        match self.client.fetch_weights().await {
            Ok(Some(bundle)) if bundle.matches_dimensions(input_size, policy_size) => {
                let version = bundle.version;
                match Network::from_bundle(bundle) {
                    Ok(network) => {
                        info!("Worker {} pulled weights version {}", self.id, version);
                        return (network, false);
                    }
                    Err(err) => warn!("Worker {} pulled unusable weights: {:#}", self.id, err),
                }
            }
            Ok(Some(bundle)) => warn!(
                "Worker {} pulled weights of {}x{} which do not fit the game's {}x{}",
                self.id,
                bundle.parameters.input_size(),
                bundle.parameters.policy_size(),
                input_size,
                policy_size
            ),
            Ok(None) => info!("Worker {}: no weights persisted yet", self.id),
            Err(err) => warn!("Worker {} failed to pull weights: {:#}", self.id, err),
        }

        info!("Worker {} using default parameters", self.id);

        (
            Network::default_parameters(input_size, self.options.hidden_size, policy_size),
            true,
        )
    }
}
