//! Weighted soft voting over probability vectors.
//!
//! The engine always fuses exactly two providers with the fixed
//! [`SEMANTIC_WEIGHT`]/[`STATISTICAL_WEIGHT`] split, but the vote itself
//! works for any number of weighted members.

/// Weight of the semantic (higher-capacity) provider.
pub const SEMANTIC_WEIGHT: f64 = 0.6;

/// Weight of the statistical (lighter) provider.
pub const STATISTICAL_WEIGHT: f64 = 0.4;

/// One weighted ensemble member.
#[derive(Debug, Clone, Copy)]
pub struct WeightedVote<'a> {
    pub weight: f64,
    pub probabilities: &'a [f64],
}

impl<'a> WeightedVote<'a> {
    pub fn new(weight: f64, probabilities: &'a [f64]) -> Self {
        Self {
            weight,
            probabilities,
        }
    }
}

/// The default two-member vote: semantic at 0.6, statistical at 0.4.
///
/// Members are summed in this order, so the result is bit-identical to
/// `0.6 * semantic[i] + 0.4 * statistical[i]`.
pub fn default_votes<'a>(statistical: &'a [f64], semantic: &'a [f64]) -> [WeightedVote<'a>; 2] {
    [
        WeightedVote::new(SEMANTIC_WEIGHT, semantic),
        WeightedVote::new(STATISTICAL_WEIGHT, statistical),
    ]
}

/// Fuse the votes into one vector of `len` scores.
///
/// Members shorter than `len` contribute nothing past their end; callers
/// validate lengths first.
pub fn soft_vote(votes: &[WeightedVote<'_>], len: usize) -> Vec<f64> {
    let mut fused = vec![0.0; len];
    for vote in votes {
        for (slot, p) in fused.iter_mut().zip(vote.probabilities) {
            *slot += vote.weight * p;
        }
    }
    fused
}

/// Index and value of the maximum. Ties go to the lowest index.
pub fn argmax_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
