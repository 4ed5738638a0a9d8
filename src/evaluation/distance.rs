use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{EvaluationResult, stars_at_most};
use crate::config::DEFAULT_RESAMPLE_POINTS;
use crate::point::{self, Point};
use crate::resample::resample;

/// Thresholds for a stroke-path step.
///
/// `pass` and `stars` are judged against separate thresholds on purpose: an
/// attempt outside `max_distance_pass` can still earn partial stars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeRubric {
    pub max_distance_pass: f32,
    /// `[t3, t2, t1]`, tightest first.
    pub star_thresholds: [f32; 3],
    /// Falls back to the engine-wide setting when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample_points: Option<usize>,
}

impl Default for StrokeRubric {
    fn default() -> Self {
        Self {
            max_distance_pass: 18.0,
            star_thresholds: [8.0, 14.0, 22.0],
            resample_points: None,
        }
    }
}

impl StrokeRubric {
    pub fn sample_count(&self) -> usize {
        self.resample_points.unwrap_or(DEFAULT_RESAMPLE_POINTS)
    }
}

/// Score `attempt` against `guide`.
pub fn evaluate_stroke_path(guide: &[Point], attempt: &[Point], rubric: &StrokeRubric) -> EvaluationResult {
    if guide.is_empty() || attempt.is_empty() {
        return EvaluationResult::failed();
    }

    let samples = rubric.sample_count();
    let guide_norm = resample(guide, samples);
    let attempt_norm = resample(attempt, samples);
    if guide_norm.is_empty() || attempt_norm.is_empty() {
        return EvaluationResult::failed();
    }

    let distance = shape_distance(&guide_norm, &attempt_norm);
    // Normalized by the authored length, before resampling.
    let guide_length = point::path_length(guide);
    let score = (1.0 - distance / guide_length.max(1.0)).clamp(0.0, 1.0);

    let result = EvaluationResult {
        pass: distance <= rubric.max_distance_pass,
        score,
        stars: stars_at_most(distance, &rubric.star_thresholds),
        distance_or_coverage: distance,
    };
    debug!(
        "stroke path: distance {:.2} over guide length {:.1} -> {:?}",
        distance, guide_length, result
    );
    result
}

/// Discrete Fréchet distance with the Hausdorff distance as a fallback when
/// the coupling table produces something unusable.
pub fn shape_distance(guide: &[Point], attempt: &[Point]) -> f32 {
    let frechet = discrete_frechet(guide, attempt);
    if frechet.is_finite() && frechet >= 0.0 {
        return frechet;
    }
    warn!("Fréchet distance was {frechet}, falling back to Hausdorff");
    hausdorff(guide, attempt)
}

/// Discrete Fréchet distance between two point sequences.
///
/// Fills the full `n × m` coupling table, so every `(i, j)` pair is computed
/// exactly once. Empty input yields `NaN`.
pub fn discrete_frechet(a: &[Point], b: &[Point]) -> f32 {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return f32::NAN;
    }

    let mut table = vec![0.0f32; n * m];
    let at = |i: usize, j: usize| i * m + j;

    for i in 0..n {
        for j in 0..m {
            let d = a[i].distance(&b[j]);
            let value = match (i, j) {
                (0, 0) => d,
                (_, 0) => table[at(i - 1, 0)].max(d),
                (0, _) => table[at(0, j - 1)].max(d),
                _ => {
                    let reach = table[at(i - 1, j)]
                        .min(table[at(i - 1, j - 1)])
                        .min(table[at(i, j - 1)]);
                    reach.max(d)
                }
            };
            table[at(i, j)] = value;
        }
    }

    table[at(n - 1, m - 1)]
}

/// Greatest distance from a point of `from` to its nearest point in `to`.
pub fn directed_hausdorff(from: &[Point], to: &[Point]) -> f32 {
    if from.is_empty() {
        return 0.0;
    }
    if to.is_empty() {
        return f32::INFINITY;
    }
    from.iter()
        .map(|p| to.iter().map(|q| p.distance(q)).fold(f32::INFINITY, f32::min))
        .fold(0.0, f32::max)
}

/// Symmetric Hausdorff distance.
pub fn hausdorff(a: &[Point], b: &[Point]) -> f32 {
    directed_hausdorff(a, b).max(directed_hausdorff(b, a))
}
