use anyhow::Result;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use model::{Network, TrainingTriplet, WeightBundle};
use replay_buffer::ReplayBuffer;

use super::{TrainerOptions, WeightSink};

/// Accumulates finished games, trains the network once enough triplets are buffered and
/// publishes a new bundle every `checkpoint_interval` games.
pub struct Trainer<W> {
    network: Network,
    buffer: ReplayBuffer<TrainingTriplet>,
    options: TrainerOptions,
    sink: W,
    games: usize,
    rng: StdRng,
}

impl<W: WeightSink> Trainer<W> {
    pub fn new(network: Network, options: TrainerOptions, sink: W) -> Self {
        Self {
            buffer: ReplayBuffer::new(options.replay_capacity),
            network,
            options,
            sink,
            games: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn games(&self) -> usize {
        self.games
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Adds the triplets of one finished game. Returns the loss if a training step ran.
    pub fn add_game(&mut self, triplets: Vec<TrainingTriplet>) -> Result<Option<f32>> {
        let received = triplets.len();
        let valid = triplets
            .into_iter()
            .filter(|t| self.fits(t))
            .collect::<Vec<_>>();

        if valid.len() != received {
            warn!(
                "Dropped {} triplets that are malformed or do not match the network dimensions",
                received - valid.len()
            );
        }

        self.buffer.extend(valid);
        self.games += 1;

        let loss = match self.train_batch() {
            Ok(loss) => loss,
            Err(err) => {
                warn!("Skipped training step: {:#}", err);
                None
            }
        };

        if self.options.checkpoint_interval > 0 && self.games % self.options.checkpoint_interval == 0 {
            self.checkpoint(loss)?;
        }

        Ok(loss)
    }

    /// One gradient step over a random batch, if enough triplets are buffered.
    pub fn train_batch(&mut self) -> Result<Option<f32>> {
        if self.buffer.is_empty() || self.buffer.len() < self.options.min_batch_size {
            return Ok(None);
        }

        let batch = self.buffer.sample(self.options.batch_size, &mut self.rng);
        let states = batch.iter().map(|t| t.state.as_slice()).collect::<Vec<_>>();
        let policies = batch.iter().map(|t| t.policy.as_slice()).collect::<Vec<_>>();
        let values = batch.iter().map(|t| t.outcome).collect::<Vec<_>>();

        let loss = self
            .network
            .train_step(&states, &policies, &values, self.options.learning_rate)?;

        Ok(Some(loss))
    }

    /// Runs `epochs` passes of shuffled mini-batches over `triplets` and publishes a single
    /// checkpoint at the end. Returns the mean loss of the final epoch.
    pub fn train_epochs(&mut self, triplets: &[TrainingTriplet], epochs: usize) -> Result<Option<f32>> {
        let triplets = triplets.iter().filter(|t| self.fits(t)).collect::<Vec<_>>();
        let batch_size = self.options.batch_size.max(1);
        let mut last_loss = None;

        if triplets.is_empty() {
            warn!("No usable triplets to train on");
            return Ok(None);
        }

        for epoch in 0..epochs {
            let mut order = (0..triplets.len()).collect::<Vec<_>>();
            order.shuffle(&mut self.rng);

            let mut total = 0.0;
            let mut batches = 0;

            for chunk in order.chunks(batch_size) {
                let states = chunk.iter().map(|i| triplets[*i].state.as_slice()).collect::<Vec<_>>();
                let policies = chunk.iter().map(|i| triplets[*i].policy.as_slice()).collect::<Vec<_>>();
                let values = chunk.iter().map(|i| triplets[*i].outcome).collect::<Vec<_>>();

                total += self
                    .network
                    .train_step(&states, &policies, &values, self.options.learning_rate)?;
                batches += 1;
            }

            let mean = total / batches as f32;
            info!("Epoch: {}/{}, Loss: {:.4}", epoch + 1, epochs, mean);
            last_loss = Some(mean);
        }

        self.checkpoint(last_loss)?;

        Ok(last_loss)
    }

    /// Publishes the current parameters under the next version. The version only advances
    /// once the sink accepted the bundle.
    pub fn checkpoint(&mut self, loss: Option<f32>) -> Result<WeightBundle> {
        let bundle = WeightBundle::new(
            self.network.parameters().clone(),
            self.network.version() + 1,
        );
        self.sink.publish(bundle.clone())?;
        self.network.set_version(bundle.version);

        info!(
            "Checkpoint, Version: {}, Games: {}, Buffered: {}, Loss: {}",
            bundle.version,
            self.games,
            self.buffer.len(),
            loss.map_or_else(|| "n/a".to_string(), |l| format!("{:.4}", l))
        );

        Ok(bundle)
    }

    fn fits(&self, triplet: &TrainingTriplet) -> bool {
        triplet.state.len() == self.network.input_size()
            && triplet.policy.len() == self.network.policy_size()
            && triplet.validate().is_ok()
    }
}
