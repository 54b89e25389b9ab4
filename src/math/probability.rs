//! Discrete distribution helpers used by weighting and entropy scoring

/// Scale weights so they sum to one
///
/// Returns all zeros when the total is not positive, leaving the caller to
/// decide how to treat a degenerate distribution.
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter().map(|weight| weight / total).collect()
    } else {
        vec![0.0; weights.len()]
    }
}

/// Shannon entropy of an unnormalized weight vector, in nats
///
/// Computes `ln(Σw) - Σ(w·ln w)/Σw`, which equals the entropy of the
/// normalized distribution without dividing every weight first. Zero weights
/// contribute nothing (`0·ln 0 = 0`); a non-positive total yields zero.
pub fn shannon_entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted_log_sum: f64 = weights
        .iter()
        .filter(|&&weight| weight > 0.0)
        .map(|&weight| weight * weight.ln())
        .sum();

    total.ln() - weighted_log_sum / total
}
