use anyhow::{anyhow, Result};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// The full parameter set of the network. Matrices are stored row-major as `[fan_in][fan_out]`,
/// matching the layout of the persisted weight bundles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "W1")]
    pub w1: Vec<Vec<f32>>,
    pub b1: Vec<f32>,
    #[serde(rename = "Wp")]
    pub wp: Vec<Vec<f32>>,
    pub bp: Vec<f32>,
    #[serde(rename = "Wv")]
    pub wv: Vec<Vec<f32>>,
    pub bv: Vec<f32>,
}

impl Parameters {
    /// He initialized weights with zeroed biases.
    pub fn new_random<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        policy_size: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            w1: random_matrix(input_size, hidden_size, rng),
            b1: vec![0.0; hidden_size],
            wp: random_matrix(hidden_size, policy_size, rng),
            bp: vec![0.0; policy_size],
            wv: random_matrix(hidden_size, 1, rng),
            bv: vec![0.0; 1],
        }
    }

    pub fn zeros(input_size: usize, hidden_size: usize, policy_size: usize) -> Self {
        Self {
            w1: vec![vec![0.0; hidden_size]; input_size],
            b1: vec![0.0; hidden_size],
            wp: vec![vec![0.0; policy_size]; hidden_size],
            bp: vec![0.0; policy_size],
            wv: vec![vec![0.0; 1]; hidden_size],
            bv: vec![0.0; 1],
        }
    }

    pub fn zeros_like(other: &Self) -> Self {
        Self::zeros(other.input_size(), other.hidden_size(), other.policy_size())
    }

    pub fn input_size(&self) -> usize {
        self.w1.len()
    }

    pub fn hidden_size(&self) -> usize {
        self.b1.len()
    }

    pub fn policy_size(&self) -> usize {
        self.bp.len()
    }

    /// Verifies that every array agrees with the dimensions implied by the biases and that
    /// all values are finite.
    pub fn validate(&self) -> Result<()> {
        let input_size = self.input_size();
        let hidden_size = self.hidden_size();
        let policy_size = self.policy_size();

        if input_size == 0 || hidden_size == 0 || policy_size == 0 {
            return Err(anyhow!(
                "Parameters must have non-empty layers but were {}x{}x{}",
                input_size,
                hidden_size,
                policy_size
            ));
        }

        check_matrix("W1", &self.w1, input_size, hidden_size)?;
        check_matrix("Wp", &self.wp, hidden_size, policy_size)?;
        check_matrix("Wv", &self.wv, hidden_size, 1)?;

        if self.bv.len() != 1 {
            return Err(anyhow!("bv must hold exactly 1 value but held {}", self.bv.len()));
        }

        let all_finite = self
            .w1
            .iter()
            .chain(self.wp.iter())
            .chain(self.wv.iter())
            .flatten()
            .chain(self.b1.iter())
            .chain(self.bp.iter())
            .chain(self.bv.iter())
            .all(|v| v.is_finite());

        if !all_finite {
            return Err(anyhow!("Parameters contain non-finite values"));
        }

        Ok(())
    }

    /// `self += scale * other`, element-wise over every array.
    pub fn add_scaled(&mut self, other: &Self, scale: f32) {
        add_scaled_matrix(&mut self.w1, &other.w1, scale);
        add_scaled_vec(&mut self.b1, &other.b1, scale);
        add_scaled_matrix(&mut self.wp, &other.wp, scale);
        add_scaled_vec(&mut self.bp, &other.bp, scale);
        add_scaled_matrix(&mut self.wv, &other.wv, scale);
        add_scaled_vec(&mut self.bv, &other.bv, scale);
    }
}

fn random_matrix<R: Rng>(fan_in: usize, fan_out: usize, rng: &mut R) -> Vec<Vec<f32>> {
    let scale = (2.0 / fan_in as f32).sqrt();

    (0..fan_in)
        .map(|_| {
            (0..fan_out)
                .map(|_| rng.sample::<f32, _>(StandardNormal) * scale)
                .collect()
        })
        .collect()
}

fn check_matrix(name: &str, matrix: &[Vec<f32>], rows: usize, cols: usize) -> Result<()> {
    if matrix.len() != rows {
        return Err(anyhow!("{} must have {} rows but had {}", name, rows, matrix.len()));
    }

    if let Some(row) = matrix.iter().find(|row| row.len() != cols) {
        return Err(anyhow!(
            "{} must have {} columns but a row had {}",
            name,
            cols,
            row.len()
        ));
    }

    Ok(())
}

fn add_scaled_matrix(target: &mut [Vec<f32>], source: &[Vec<f32>], scale: f32) {
    for (target_row, source_row) in target.iter_mut().zip(source) {
        add_scaled_vec(target_row, source_row, scale);
    }
}

fn add_scaled_vec(target: &mut [f32], source: &[f32], scale: f32) {
    for (t, s) in target.iter_mut().zip(source) {
        *t += scale * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_parameters_have_expected_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let parameters = Parameters::new_random(5, 4, 3, &mut rng);

        assert_eq!(parameters.input_size(), 5);
        assert_eq!(parameters.hidden_size(), 4);
        assert_eq!(parameters.policy_size(), 3);
        assert!(parameters.validate().is_ok());
        assert!(parameters.b1.iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_validate_rejects_ragged_matrix() {
        let mut parameters = Parameters::zeros(3, 2, 2);
        parameters.wp[1].pop();

        assert!(parameters.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_rows() {
        let mut parameters = Parameters::zeros(3, 2, 2);
        parameters.wv.push(vec![0.0]);

        assert!(parameters.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut parameters = Parameters::zeros(3, 2, 2);
        parameters.bp[0] = f32::NAN;

        assert!(parameters.validate().is_err());
    }

    #[test]
    fn test_add_scaled() {
        let mut parameters = Parameters::zeros(2, 2, 2);
        let mut step = Parameters::zeros(2, 2, 2);
        step.w1[0][1] = 2.0;
        step.bv[0] = -1.0;

        parameters.add_scaled(&step, -0.5);

        assert_eq!(parameters.w1[0][1], -1.0);
        assert_eq!(parameters.bv[0], 0.5);
        assert_eq!(parameters.w1[1][1], 0.0);
    }
}
