use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use axum::Router;
use log::{error, info, warn};
use model::{Network, TrainingTriplet};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, Receiver};
use trainer::{Trainer, TrainerOptions};

use super::{router, AppState, CoordinatorOptions, TripletStore, WeightStore};

/// The weight and triplet stores behind the HTTP surface, optionally with a trainer thread
/// consuming every accepted report.
pub struct Coordinator {
    state: AppState,
    trainer_handle: Option<JoinHandle<()>>,
}

impl Coordinator {
    pub fn open(options: &CoordinatorOptions) -> Self {
        let weights = Arc::new(WeightStore::open(options.weights_path.clone()));
        let triplets = Arc::new(TripletStore::open(
            options.triplets_path.clone(),
            options.max_triplets,
        ));

        Self {
            state: AppState {
                weights,
                triplets,
                trainer_tx: None,
            },
            trainer_handle: None,
        }
    }

    /// Starts a trainer thread that checkpoints into the weight store. Training resumes from
    /// the persisted bundle when it fits the game, otherwise from the default parameters.
    pub fn with_trainer(
        mut self,
        trainer_options: TrainerOptions,
        input_size: usize,
        policy_size: usize,
        channel_size: usize,
    ) -> Result<Self> {
        let network = initial_network(
            &self.state.weights,
            input_size,
            trainer_options.hidden_size,
            policy_size,
        );

        let trainer = Trainer::new(network, trainer_options, self.state.weights.clone());
        let (trainer_tx, trainer_rx) = mpsc::channel(channel_size.max(1));

        let handle = std::thread::Builder::new()
            .name("trainer".to_string())
            .spawn(move || run_trainer(trainer, trainer_rx))
            .context("Failed to spawn trainer thread")?;

        self.state.trainer_tx = Some(trainer_tx);
        self.trainer_handle = Some(handle);

        Ok(self)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn serve(self, bind_address: &str) -> Result<()> {
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", bind_address))?;

        info!("Coordinator listening on {}", listener.local_addr()?);

        let app = self.router();
        let Coordinator {
            state,
            trainer_handle,
        } = self;

        axum::serve(listener, app).await?;

        drop(state);
        if let Some(handle) = trainer_handle {
            if handle.join().is_err() {
                error!("Trainer thread panicked");
            }
        }

        Ok(())
    }
}

/// Runs the coordinator until the server stops.
pub async fn serve(
    options: CoordinatorOptions,
    trainer_options: TrainerOptions,
    input_size: usize,
    policy_size: usize,
) -> Result<()> {
    info!("Starting coordinator with {:?}", options);

    Coordinator::open(&options)
        .with_trainer(
            trainer_options,
            input_size,
            policy_size,
            options.trainer_channel_size,
        )?
        .serve(&options.bind_address)
        .await
}

fn initial_network(
    weights: &WeightStore,
    input_size: usize,
    hidden_size: usize,
    policy_size: usize,
) -> Network {
    match weights.current_bundle() {
        Some(bundle) if bundle.matches_dimensions(input_size, policy_size) => {
            let version = bundle.version;
            match Network::from_bundle(bundle) {
                Ok(network) => {
                    info!("Resuming training from weights version {}", version);
                    return network;
                }
                Err(err) => warn!("Persisted weights could not be loaded: {:#}", err),
            }
        }
        Some(_) => warn!("Persisted weights do not match the game dimensions, starting fresh"),
        None => info!("No weights persisted, starting from default parameters"),
    }

    Network::default_parameters(input_size, hidden_size, policy_size)
}

fn run_trainer(mut trainer: Trainer<Arc<WeightStore>>, mut trainer_rx: Receiver<Vec<TrainingTriplet>>) {
    while let Some(triplets) = trainer_rx.blocking_recv() {
        if let Err(err) = trainer.add_game(triplets) {
            error!("Failed to train on report: {:#}", err);
        }
    }

    info!("Trainer stopped after {} games", trainer.games());
}
