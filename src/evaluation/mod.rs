//! Scoring of learner attempts against authored guides.
//!
//! Nothing in here fails loudly: degenerate geometry, mismatched buffers and
//! numeric trouble all end up as a failing [`EvaluationResult`].

mod area_fill;
mod distance;
mod sequence;
mod trace;

pub use area_fill::{AreaFillEvaluator, AreaFillReport, evaluate_area_fill};
pub use distance::{
    StrokeRubric, directed_hausdorff, discrete_frechet, evaluate_stroke_path, hausdorff,
    shape_distance,
};
pub use sequence::{evaluate_dot_to_dot, evaluate_layer_order};
pub use trace::{is_trace_pixel, trace_hit_ratio};

use serde::{Deserialize, Serialize};

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub pass: bool,
    /// Normalized to `[0, 1]`.
    pub score: f32,
    /// 0 to 3.
    pub stars: u8,
    /// Raw distance for path steps, coverage for fill steps.
    pub distance_or_coverage: f32,
}

impl EvaluationResult {
    /// The result for input that could not be scored at all.
    pub fn failed() -> Self {
        Self::default()
    }

    /// All-or-nothing result used by the sequence steps.
    pub fn from_sequence(pass: bool) -> Self {
        if pass {
            Self {
                pass,
                score: 1.0,
                stars: 3,
                distance_or_coverage: 0.0,
            }
        } else {
            Self::failed()
        }
    }
}

/// Stars for a measure where smaller is better (`[t3, t2, t1]`, tightest first).
pub(crate) fn stars_at_most(value: f32, thresholds: &[f32; 3]) -> u8 {
    let [t3, t2, t1] = *thresholds;
    if value <= t3 {
        3
    } else if value <= t2 {
        2
    } else if value <= t1 {
        1
    } else {
        0
    }
}

/// Stars for a measure where larger is better (`[c3, c2, c1]`, strictest first).
pub(crate) fn stars_at_least(value: f32, thresholds: &[f32; 3]) -> u8 {
    let [c3, c2, c1] = *thresholds;
    if value >= c3 {
        3
    } else if value >= c2 {
        2
    } else if value >= c1 {
        1
    } else {
        0
    }
}
