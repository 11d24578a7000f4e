use std::sync::Arc;

use anyhow::{anyhow, Result};

/// Raw output of a policy/value model for a single encoded state.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Unnormalized scores over the full action space.
    pub logits: Vec<f32>,
    /// Expected result for the player to move, in [-1, 1].
    pub value: f32,
}

impl Prediction {
    pub fn new(logits: Vec<f32>, value: f32) -> Self {
        Self { logits, value }
    }
}

pub trait Predictor {
    fn predict(&self, input: &[f32]) -> Result<Prediction>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, input: &[f32]) -> Result<Prediction> {
        (**self).predict(input)
    }
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, input: &[f32]) -> Result<Prediction> {
        (**self).predict(input)
    }
}

/// Returns the same prediction for every state. Useful as a stand-in model when exercising search.
#[derive(Clone, Debug)]
pub struct ConstantPredictor {
    input_size: usize,
    prediction: Prediction,
}

impl ConstantPredictor {
    pub fn new(input_size: usize, logits: Vec<f32>, value: f32) -> Self {
        Self {
            input_size,
            prediction: Prediction::new(logits, value),
        }
    }

    pub fn uniform(input_size: usize, action_space_size: usize, value: f32) -> Self {
        Self::new(input_size, vec![0.0; action_space_size], value)
    }
}

impl Predictor for ConstantPredictor {
    fn predict(&self, input: &[f32]) -> Result<Prediction> {
        if input.len() != self.input_size {
            return Err(anyhow!(
                "Expected an input of size {} but received {}",
                self.input_size,
                input.len()
            ));
        }

        Ok(self.prediction.clone())
    }
}
