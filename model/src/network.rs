use std::path::Path;

use anyhow::{anyhow, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::layers;
use super::{Parameters, Prediction, Predictor, WeightBundle};

/// Seed of the parameter set every process falls back to before any checkpoint exists.
pub const DEFAULT_SEED: u64 = 0x5eed_a1fa;

/// A single hidden layer policy/value network.
#[derive(Clone, Debug)]
pub struct Network {
    parameters: Parameters,
    version: u64,
}

impl Network {
    pub fn new(parameters: Parameters, version: u64) -> Result<Self> {
        parameters.validate()?;

        Ok(Self {
            parameters,
            version,
        })
    }

    pub fn with_seed(input_size: usize, hidden_size: usize, policy_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        Self {
            parameters: Parameters::new_random(input_size, hidden_size, policy_size, &mut rng),
            version: 0,
        }
    }

    /// The deterministic network of the given dimensions. Identical in every process.
    pub fn default_parameters(input_size: usize, hidden_size: usize, policy_size: usize) -> Self {
        Self::with_seed(input_size, hidden_size, policy_size, DEFAULT_SEED)
    }

    pub fn from_bundle(bundle: WeightBundle) -> Result<Self> {
        Self::new(bundle.parameters, bundle.version)
    }

    pub fn to_bundle(&self) -> WeightBundle {
        WeightBundle::new(self.parameters.clone(), self.version)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn input_size(&self) -> usize {
        self.parameters.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.parameters.hidden_size()
    }

    pub fn policy_size(&self) -> usize {
        self.parameters.policy_size()
    }

    pub fn matches_dimensions(&self, input_size: usize, policy_size: usize) -> bool {
        self.input_size() == input_size && self.policy_size() == policy_size
    }

    pub fn forward(&self, input: &[f32]) -> Result<Prediction> {
        if input.len() != self.input_size() {
            return Err(anyhow!(
                "Expected an input of size {} but received {}",
                self.input_size(),
                input.len()
            ));
        }

        let activations = layers::forward(&self.parameters, input);

        Ok(Prediction::new(activations.logits, activations.value))
    }

    /// Runs one step of gradient descent over the batch and returns the loss measured before
    /// the update. A step that would leave any parameter non-finite is refused and the
    /// network is left unchanged.
    pub fn train_step<S, P>(
        &mut self,
        states: &[S],
        policy_targets: &[P],
        value_targets: &[f32],
        learning_rate: f32,
    ) -> Result<f32>
    where
        S: AsRef<[f32]>,
        P: AsRef<[f32]>,
    {
        let (loss, gradients) =
            layers::gradients(&self.parameters, states, policy_targets, value_targets)?;

        if !loss.is_finite() {
            return Err(anyhow!("Loss is not finite, skipping the update"));
        }

        let mut parameters = self.parameters.clone();
        parameters.add_scaled(&gradients, -learning_rate);
        parameters
            .validate()
            .map_err(|err| anyhow!("Update would corrupt the parameters: {:#}", err))?;

        self.parameters = parameters;

        Ok(loss)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_bundle().write(path)?;

        info!("Saved network version {} to {:?}", self.version, path);

        Ok(())
    }

    /// Replaces every parameter with the bundle at `path`. On any error the network is left
    /// untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bundle = WeightBundle::read(path)?;

        self.parameters = bundle.parameters;
        self.version = bundle.version;

        info!("Loaded network version {} from {:?}", self.version, path);

        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::from_bundle(WeightBundle::read(path)?)
    }
}

impl Predictor for Network {
    fn predict(&self, input: &[f32]) -> Result<Prediction> {
        self.forward(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::fs;

    fn input(size: usize) -> Vec<f32> {
        (0..size).map(|i| if i % 3 == 0 { 1.0 } else { 0.0 }).collect()
    }

    #[test]
    fn test_default_parameters_are_deterministic() {
        let left = Network::default_parameters(12, 8, 4);
        let right = Network::default_parameters(12, 8, 4);

        assert_eq!(left.parameters(), right.parameters());
        assert_eq!(left.version(), 0);
    }

    #[test]
    fn test_different_seeds_differ() {
        let left = Network::with_seed(12, 8, 4, 1);
        let right = Network::with_seed(12, 8, 4, 2);

        assert_ne!(left.parameters(), right.parameters());
    }

    #[test]
    fn test_forward_shapes_and_bounds() {
        let network = Network::default_parameters(12, 8, 4);
        let prediction = network.forward(&input(12)).unwrap();

        assert_eq!(prediction.logits.len(), 4);
        assert!(prediction.value >= -1.0 && prediction.value <= 1.0);
    }

    #[test]
    fn test_forward_rejects_wrong_input_size() {
        let network = Network::default_parameters(12, 8, 4);

        assert!(network.forward(&input(11)).is_err());
    }

    #[test]
    fn test_save_and_load_preserves_forward() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");

        let mut network = Network::with_seed(12, 8, 4, 3);
        network.set_version(4);
        network.save(&path).unwrap();

        let mut restored = Network::default_parameters(12, 8, 4);
        restored.load(&path).unwrap();

        assert_eq!(restored.version(), 4);

        let expected = network.forward(&input(12)).unwrap();
        let actual = restored.forward(&input(12)).unwrap();

        assert_approx_eq!(expected.value, actual.value, 1e-6);
        for (l, r) in expected.logits.iter().zip(actual.logits.iter()) {
            assert_approx_eq!(l, r, 1e-6);
        }
    }

    #[test]
    fn test_failed_load_leaves_network_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        fs::write(&path, br#"{"version": 9, "W1": [[1.0]]"#).unwrap();

        let mut network = Network::default_parameters(12, 8, 4);
        let before = network.parameters().clone();

        assert!(network.load(&path).is_err());
        assert_eq!(network.parameters(), &before);
        assert_eq!(network.version(), 0);
    }

    #[test]
    fn test_train_step_reduces_loss() {
        let mut network = Network::with_seed(6, 16, 3, 11);
        let states = vec![
            vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        ];
        let policies = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let values = vec![1.0, -1.0, 0.0];

        let first = network.train_step(&states, &policies, &values, 0.05).unwrap();
        let mut last = first;
        for _ in 0..200 {
            last = network.train_step(&states, &policies, &values, 0.05).unwrap();
        }

        assert!(last < first, "loss went from {} to {}", first, last);
    }

    #[test]
    fn test_train_step_refuses_overflowing_targets() {
        let mut network = Network::with_seed(3, 4, 2, 11);
        let before = network.parameters().clone();
        let states = vec![vec![1.0, 0.0, 1.0]];
        let policies = vec![vec![0.5, 0.5]];

        assert!(network.train_step(&states, &policies, &[1e30], 0.1).is_err());
        assert_eq!(network.parameters(), &before);

        let states = vec![vec![f32::INFINITY, 0.0, 1.0]];
        assert!(network.train_step(&states, &policies, &[1.0], 0.1).is_err());
        assert_eq!(network.parameters(), &before);

        let states = vec![vec![1.0, 0.0, 1.0]];
        assert!(network.train_step(&states, &policies, &[1.0], 0.1).is_ok());
        assert!(network.parameters().validate().is_ok());
    }

    #[test]
    fn test_bundle_round_trip_keeps_version() {
        let mut network = Network::with_seed(3, 2, 2, 5);
        network.set_version(12);

        let restored = Network::from_bundle(network.to_bundle()).unwrap();

        assert_eq!(restored.version(), 12);
        assert_eq!(restored.parameters(), network.parameters());
    }
}
