mod cli;
mod game;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use common::{get_env_usize, ConfigLoader, FsExt};
use coordinator::{read_triplets, CoordinatorOptions};
use dotenv::dotenv;
use engine::GameEngine;
use env_logger::Env;
use log::{info, warn};
use model::Network;
use self_play::SelfPlayOptions;
use trainer::{self_learn, FileWeightSink, Trainer, TrainerOptions};
use worker::{Worker, WorkerOptions};

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut builder = tokio::runtime::Builder::new_multi_thread();

    builder.enable_all();

    if let Some(worker_threads) = get_env_usize("TOKIO_THREADS") {
        builder.worker_threads(worker_threads);
    }

    info!("{:?}", builder);

    builder.build()?.block_on(async_main())?;

    Ok(())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Coordinator(coordinator_args) => {
            let config = load_config(&coordinator_args.config, "coordinator")?;

            let coordinator_options: CoordinatorOptions = config.load()?;
            let trainer_options: TrainerOptions = config.load()?;
            let engine = game::engine();

            coordinator::serve(
                coordinator_options,
                trainer_options,
                engine.input_size(),
                engine.action_space_size(),
            )
            .await?
        }
        Commands::Worker(worker_args) => {
            let config = load_config(&worker_args.config, "worker")?;

            let mut worker_options: WorkerOptions = config.load()?;
            let self_play_options: SelfPlayOptions = config.load()?;

            if let Some(coordinator_url) = worker_args.coordinator_url {
                worker_options.coordinator_url = coordinator_url;
            }

            if let Some(duration) = worker_args.duration {
                worker_options.duration_mins = Some(duration);
            }

            let worker = Worker::new(game::engine(), worker_options, self_play_options);

            worker.run().await?
        }
        Commands::SelfLearn(self_learn_args) => {
            let config = load_config(&self_learn_args.config, "self_learn")?;

            let self_play_options: SelfPlayOptions = config.load()?;
            let trainer_options: TrainerOptions = config.load()?;
            let weights_path = path_or_default(&config, "weights_path", "weights/latest.json")?;
            let games = config.get("games").and_then(|v| v.as_usize());

            tokio::task::spawn_blocking(move || -> Result<()> {
                let engine = game::engine();
                let network = resume_network(&engine, &weights_path, trainer_options.hidden_size);
                let mut trainer =
                    Trainer::new(network, trainer_options, FileWeightSink::new(weights_path));

                self_learn(&engine, &mut trainer, &self_play_options, games)
            })
            .await??
        }
        Commands::Train(train_args) => {
            let config = load_config(&train_args.config, "train")?;

            let trainer_options: TrainerOptions = config.load()?;
            let triplets_path = path_or_default(&config, "triplets_path", "data/triplets.json")?;
            let weights_path = path_or_default(&config, "weights_path", "weights/latest.json")?;
            let epochs = train_args
                .epochs
                .or_else(|| config.get("epochs").and_then(|v| v.as_usize()))
                .unwrap_or(10);

            tokio::task::spawn_blocking(move || -> Result<()> {
                let triplets = read_triplets(&triplets_path)?;
                info!("Loaded {} triplets from {:?}", triplets.len(), triplets_path);

                let engine = game::engine();
                let network = resume_network(&engine, &weights_path, trainer_options.hidden_size);
                let mut trainer =
                    Trainer::new(network, trainer_options, FileWeightSink::new(weights_path));

                trainer.train_epochs(&triplets, epochs)?;

                Ok(())
            })
            .await??
        }
    }

    Ok(())
}

fn load_config(path: &str, scope: &str) -> Result<ConfigLoader> {
    let config_path = path.to_string().relative_to_cwd()?;

    ConfigLoader::new_or_default(config_path, scope.to_string())
}

fn path_or_default(config: &ConfigLoader, name: &str, default: &'static str) -> Result<PathBuf> {
    config
        .get_relative_path(name)
        .or_else(|_| default.relative_to_cwd())
}

/// The network stored at `weights_path` when it fits the game, otherwise the default parameters.
fn resume_network<E: GameEngine>(engine: &E, weights_path: &Path, hidden_size: usize) -> Network {
    let input_size = engine.input_size();
    let policy_size = engine.action_space_size();

    if weights_path.is_file() {
        match Network::open(weights_path) {
            Ok(network) if network.matches_dimensions(input_size, policy_size) => {
                info!("Resuming from weights version {}", network.version());
                return network;
            }
            Ok(_) => warn!("Weights at {:?} do not fit the game", weights_path),
            Err(err) => warn!("Weights at {:?} could not be loaded: {:#}", weights_path, err),
        }
    }

    info!("Starting from default parameters");

    Network::default_parameters(input_size, hidden_size, policy_size)
}
