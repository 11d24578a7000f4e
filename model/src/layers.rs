//! Forward and backward passes of the network as pure functions over [`Parameters`].
//!
//! The loss of a batch of `B` examples is
//! `1/B * Σ_b [ (v_b - z_b)² - Σ_k π_bk * log_softmax(logits_b)_k ]`
//! and [`gradients`] returns its exact gradient with respect to every parameter.

use anyhow::{anyhow, Result};
use common::{log_softmax, softmax};

use super::Parameters;

/// Every intermediate value of a forward pass for a single input.
#[derive(Clone, Debug)]
pub struct Activations {
    pub hidden_pre: Vec<f32>,
    pub hidden: Vec<f32>,
    pub logits: Vec<f32>,
    pub value_pre: f32,
    pub value: f32,
}

pub fn forward(parameters: &Parameters, input: &[f32]) -> Activations {
    let mut hidden_pre = parameters.b1.clone();
    for (x, row) in input.iter().zip(&parameters.w1) {
        if *x == 0.0 {
            continue;
        }

        for (h, w) in hidden_pre.iter_mut().zip(row) {
            *h += x * w;
        }
    }

    let hidden: Vec<f32> = hidden_pre.iter().map(|h| h.max(0.0)).collect();

    let mut logits = parameters.bp.clone();
    for (h, row) in hidden.iter().zip(&parameters.wp) {
        if *h == 0.0 {
            continue;
        }

        for (l, w) in logits.iter_mut().zip(row) {
            *l += h * w;
        }
    }

    let value_pre = parameters.bv[0]
        + hidden
            .iter()
            .zip(&parameters.wv)
            .map(|(h, w)| h * w[0])
            .sum::<f32>();

    Activations {
        hidden_pre,
        hidden,
        logits,
        value_pre,
        value: value_pre.tanh(),
    }
}

/// The loss contributed by a single example, before averaging over the batch.
fn example_loss(activations: &Activations, policy_target: &[f32], value_target: f32) -> f32 {
    let value_loss = (activations.value - value_target).powi(2);
    let policy_loss = -log_softmax(&activations.logits)
        .iter()
        .zip(policy_target)
        .map(|(lp, p)| if *p == 0.0 { 0.0 } else { p * lp })
        .sum::<f32>();

    value_loss + policy_loss
}

pub fn loss<S, P>(
    parameters: &Parameters,
    states: &[S],
    policy_targets: &[P],
    value_targets: &[f32],
) -> Result<f32>
where
    S: AsRef<[f32]>,
    P: AsRef<[f32]>,
{
    validate_batch(parameters, states, policy_targets, value_targets)?;

    let batch_size = states.len() as f32;
    let total = states
        .iter()
        .zip(policy_targets)
        .zip(value_targets)
        .map(|((state, policy), value)| {
            let activations = forward(parameters, state.as_ref());
            example_loss(&activations, policy.as_ref(), *value)
        })
        .sum::<f32>();

    Ok(total / batch_size)
}

/// Computes the batch loss together with its gradient, one layer at a time from the heads
/// back to the input.
pub fn gradients<S, P>(
    parameters: &Parameters,
    states: &[S],
    policy_targets: &[P],
    value_targets: &[f32],
) -> Result<(f32, Parameters)>
where
    S: AsRef<[f32]>,
    P: AsRef<[f32]>,
{
    validate_batch(parameters, states, policy_targets, value_targets)?;

    let batch_size = states.len() as f32;
    let mut grads = Parameters::zeros_like(parameters);
    let mut total_loss = 0.0;

    for ((state, policy), value_target) in states.iter().zip(policy_targets).zip(value_targets) {
        let input = state.as_ref();
        let policy = policy.as_ref();
        let activations = forward(parameters, input);

        total_loss += example_loss(&activations, policy, *value_target);

        let d_value_pre = value_head_delta(&activations, *value_target) / batch_size;
        let d_logits: Vec<f32> = policy_head_delta(&activations, policy)
            .into_iter()
            .map(|d| d / batch_size)
            .collect();

        let d_hidden = heads_backward(parameters, &activations, &d_logits, d_value_pre, &mut grads);

        hidden_backward(&activations, input, &d_hidden, &mut grads);
    }

    Ok((total_loss / batch_size, grads))
}

/// d/d(value_pre) of (tanh(value_pre) - z)².
fn value_head_delta(activations: &Activations, value_target: f32) -> f32 {
    let v = activations.value;
    2.0 * (v - value_target) * (1.0 - v * v)
}

/// d/d(logits) of -Σ π log_softmax(logits). Reduces to softmax - π when π sums to one.
fn policy_head_delta(activations: &Activations, policy_target: &[f32]) -> Vec<f32> {
    let target_mass = policy_target.iter().sum::<f32>();

    softmax(&activations.logits, 1.0)
        .iter()
        .zip(policy_target)
        .map(|(p, t)| p * target_mass - t)
        .collect()
}

/// Accumulates the gradients of both heads and returns the gradient flowing into the
/// hidden activations.
fn heads_backward(
    parameters: &Parameters,
    activations: &Activations,
    d_logits: &[f32],
    d_value_pre: f32,
    grads: &mut Parameters,
) -> Vec<f32> {
    for (gb, d) in grads.bp.iter_mut().zip(d_logits) {
        *gb += d;
    }
    grads.bv[0] += d_value_pre;

    let mut d_hidden = vec![0.0; activations.hidden.len()];

    for (j, h) in activations.hidden.iter().enumerate() {
        if *h != 0.0 {
            for (g, d) in grads.wp[j].iter_mut().zip(d_logits) {
                *g += h * d;
            }
            grads.wv[j][0] += h * d_value_pre;
        }

        d_hidden[j] = parameters.wp[j]
            .iter()
            .zip(d_logits)
            .map(|(w, d)| w * d)
            .sum::<f32>()
            + parameters.wv[j][0] * d_value_pre;
    }

    d_hidden
}

fn hidden_backward(activations: &Activations, input: &[f32], d_hidden: &[f32], grads: &mut Parameters) {
    let d_hidden_pre: Vec<f32> = d_hidden
        .iter()
        .zip(&activations.hidden_pre)
        .map(|(d, z)| if *z > 0.0 { *d } else { 0.0 })
        .collect();

    for (gb, d) in grads.b1.iter_mut().zip(&d_hidden_pre) {
        *gb += d;
    }

    for (x, row) in input.iter().zip(grads.w1.iter_mut()) {
        if *x == 0.0 {
            continue;
        }

        for (g, d) in row.iter_mut().zip(&d_hidden_pre) {
            *g += x * d;
        }
    }
}

fn validate_batch<S, P>(
    parameters: &Parameters,
    states: &[S],
    policy_targets: &[P],
    value_targets: &[f32],
) -> Result<()>
where
    S: AsRef<[f32]>,
    P: AsRef<[f32]>,
{
    if states.is_empty() {
        return Err(anyhow!("Cannot train on an empty batch"));
    }

    if states.len() != policy_targets.len() || states.len() != value_targets.len() {
        return Err(anyhow!(
            "Batch sizes disagree: {} states, {} policies, {} values",
            states.len(),
            policy_targets.len(),
            value_targets.len()
        ));
    }

    if let Some(state) = states
        .iter()
        .find(|s| s.as_ref().len() != parameters.input_size())
    {
        return Err(anyhow!(
            "Expected states of size {} but found {}",
            parameters.input_size(),
            state.as_ref().len()
        ));
    }

    if let Some(policy) = policy_targets
        .iter()
        .find(|p| p.as_ref().len() != parameters.policy_size())
    {
        return Err(anyhow!(
            "Expected policies of size {} but found {}",
            parameters.policy_size(),
            policy.as_ref().len()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const EPSILON: f32 = 1e-2;
    const TOLERANCE: f32 = 2e-3;

    // Hand picked so that every hidden pre-activation stays at least 0.1 away from the
    // ReLU kink under any single perturbation of size EPSILON.
    fn fixture() -> Parameters {
        Parameters {
            w1: vec![vec![0.5, -0.4, 0.3], vec![0.2, 0.1, -0.6]],
            b1: vec![0.1, 0.05, -0.2],
            wp: vec![
                vec![0.3, -0.2, 0.1],
                vec![-0.1, 0.4, 0.2],
                vec![0.25, 0.15, -0.35],
            ],
            bp: vec![0.05, -0.05, 0.0],
            wv: vec![vec![0.4], vec![-0.3], vec![0.2]],
            bv: vec![0.1],
        }
    }

    fn batch() -> (Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<f32>) {
        let states = vec![vec![1.0, 0.5], vec![0.8, -1.0]];
        let policies = vec![vec![0.2, 0.8, 0.0], vec![0.0, 0.0, 1.0]];
        let values = vec![1.0, -1.0];
        (states, policies, values)
    }

    fn numeric_gradient(mut perturb: impl FnMut(&mut Parameters, f32)) -> f32 {
        let (states, policies, values) = batch();

        let mut plus = fixture();
        perturb(&mut plus, EPSILON);
        let mut minus = fixture();
        perturb(&mut minus, -EPSILON);

        let loss_plus = loss(&plus, &states, &policies, &values).unwrap();
        let loss_minus = loss(&minus, &states, &policies, &values).unwrap();

        (loss_plus - loss_minus) / (2.0 * EPSILON)
    }

    fn analytic_gradients() -> Parameters {
        let (states, policies, values) = batch();
        gradients(&fixture(), &states, &policies, &values).unwrap().1
    }

    #[test]
    fn test_forward_matches_hand_computation() {
        let activations = forward(&fixture(), &[1.0, 0.5]);

        // hidden_pre = b1 + 1.0 * W1[0] + 0.5 * W1[1]
        assert_approx_eq!(activations.hidden_pre[0], 0.7, 1e-6);
        assert_approx_eq!(activations.hidden_pre[1], -0.3, 1e-6);
        assert_approx_eq!(activations.hidden_pre[2], -0.2, 1e-6);
        assert_eq!(activations.hidden, vec![activations.hidden_pre[0], 0.0, 0.0]);

        assert_approx_eq!(activations.logits[0], 0.05 + 0.7 * 0.3, 1e-6);
        assert_approx_eq!(activations.value, (0.1f32 + 0.7 * 0.4).tanh(), 1e-6);
    }

    #[test]
    fn test_loss_matches_gradients_loss() {
        let (states, policies, values) = batch();
        let (loss_from_gradients, _) = gradients(&fixture(), &states, &policies, &values).unwrap();
        let loss_direct = loss(&fixture(), &states, &policies, &values).unwrap();

        assert_approx_eq!(loss_from_gradients, loss_direct, 1e-6);
    }

    #[test]
    fn test_value_head_gradients_match_finite_differences() {
        let grads = analytic_gradients();

        for j in 0..3 {
            let numeric = numeric_gradient(|p, e| p.wv[j][0] += e);
            assert_approx_eq!(grads.wv[j][0], numeric, TOLERANCE);
        }

        let numeric = numeric_gradient(|p, e| p.bv[0] += e);
        assert_approx_eq!(grads.bv[0], numeric, TOLERANCE);
    }

    #[test]
    fn test_policy_head_gradients_match_finite_differences() {
        let grads = analytic_gradients();

        for j in 0..3 {
            for k in 0..3 {
                let numeric = numeric_gradient(|p, e| p.wp[j][k] += e);
                assert_approx_eq!(grads.wp[j][k], numeric, TOLERANCE);
            }
        }

        for k in 0..3 {
            let numeric = numeric_gradient(|p, e| p.bp[k] += e);
            assert_approx_eq!(grads.bp[k], numeric, TOLERANCE);
        }
    }

    #[test]
    fn test_hidden_layer_gradients_match_finite_differences() {
        let grads = analytic_gradients();

        for i in 0..2 {
            for j in 0..3 {
                let numeric = numeric_gradient(|p, e| p.w1[i][j] += e);
                assert_approx_eq!(grads.w1[i][j], numeric, TOLERANCE);
            }
        }

        for j in 0..3 {
            let numeric = numeric_gradient(|p, e| p.b1[j] += e);
            assert_approx_eq!(grads.b1[j], numeric, TOLERANCE);
        }
    }

    #[test]
    fn test_inactive_units_receive_no_input_gradient() {
        let states = vec![vec![1.0, 0.5]];
        let policies = vec![vec![0.2, 0.8, 0.0]];
        let values = vec![1.0];

        let (_, grads) = gradients(&fixture(), &states, &policies, &values).unwrap();

        // Units 1 and 2 are inactive for this input.
        assert_eq!(grads.b1[1], 0.0);
        assert_eq!(grads.b1[2], 0.0);
        assert_eq!(grads.w1[0][1], 0.0);
        assert_eq!(grads.wp[1], vec![0.0; 3]);
    }

    #[test]
    fn test_mismatched_batch_is_rejected() {
        let states = vec![vec![1.0, 0.5]];
        let policies = vec![vec![0.2, 0.8, 0.0], vec![0.0, 0.0, 1.0]];
        let values = vec![1.0];

        assert!(gradients(&fixture(), &states, &policies, &values).is_err());
    }

    #[test]
    fn test_wrong_state_size_is_rejected() {
        let states = vec![vec![1.0, 0.5, 0.0]];
        let policies = vec![vec![0.2, 0.8, 0.0]];
        let values = vec![1.0];

        assert!(loss(&fixture(), &states, &policies, &values).is_err());
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let states: Vec<Vec<f32>> = vec![];
        let policies: Vec<Vec<f32>> = vec![];

        assert!(gradients(&fixture(), &states, &policies, &[]).is_err());
    }
}
