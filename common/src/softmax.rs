// Both functions shift by the largest logit before exponentiating, so search priors and
// training targets are normalized the same way.

// (exp(p-max_p))^(1/T) = exp((p-max_p)/T).
pub fn softmax(logits: &[f32], temperature: f32) -> Vec<f32> {
    let max_p = max_logit(logits);
    let softmaxed = logits
        .iter()
        .map(|&p| ((p - max_p) / temperature).exp())
        .collect::<Vec<_>>();
    let sum = softmaxed.iter().sum::<f32>();

    softmaxed.iter().map(|p| p / sum).collect()
}

// log(softmax(p)) = (p - max_p) - ln(sum(exp(p - max_p))).
pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max_p = max_logit(logits);
    let log_sum = logits
        .iter()
        .map(|&p| (p - max_p).exp())
        .sum::<f32>()
        .ln();

    logits.iter().map(|&p| p - max_p - log_sum).collect()
}

fn max_logit(logits: &[f32]) -> f32 {
    logits.iter().cloned().fold(f32::MIN, f32::max)
}
