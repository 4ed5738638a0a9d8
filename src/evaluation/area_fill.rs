use image::RgbaImage;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{EvaluationResult, stars_at_least};
use crate::color::{HslColor, HslTolerance};
use crate::config::{DEFAULT_COLOR_OK_RATIO, EngineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFillReport {
    pub coverage: f32,
    pub color_ok: bool,
    pub pass: bool,
}

impl AreaFillReport {
    /// Fold the report into a scored result. Stars require the color check to
    /// pass and then follow `star_thresholds` (`[c3, c2, c1]`) on coverage.
    pub fn to_result(&self, star_thresholds: &[f32; 3]) -> EvaluationResult {
        let stars = if self.color_ok {
            stars_at_least(self.coverage, star_thresholds)
        } else {
            0
        };
        EvaluationResult {
            pass: self.pass,
            score: self.coverage.clamp(0.0, 1.0),
            stars,
            distance_or_coverage: self.coverage,
        }
    }
}

/// Coverage and color scoring of a painted region.
#[derive(Debug, Clone, Copy)]
pub struct AreaFillEvaluator {
    /// Share of filled pixels that must be within tolerance of the target.
    pub color_ok_ratio: f32,
}

impl Default for AreaFillEvaluator {
    fn default() -> Self {
        Self {
            color_ok_ratio: DEFAULT_COLOR_OK_RATIO,
        }
    }
}

impl AreaFillEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            color_ok_ratio: config.color_ok_ratio,
        }
    }

    /// Score `canvas` against the region marked by non-transparent `mask`
    /// pixels. Only canvas pixels inside the mask are considered.
    pub fn evaluate(
        &self,
        canvas: &RgbaImage,
        mask: &RgbaImage,
        target: &HslColor,
        tolerance: &HslTolerance,
        coverage_threshold: f32,
    ) -> AreaFillReport {
        if canvas.dimensions() != mask.dimensions() {
            debug!(
                "area fill: canvas {:?} does not match mask {:?}",
                canvas.dimensions(),
                mask.dimensions()
            );
            return AreaFillReport::default();
        }

        let mut mask_count = 0usize;
        let mut filled = 0usize;
        let mut correct = 0usize;

        for (canvas_px, mask_px) in canvas.pixels().zip(mask.pixels()) {
            if mask_px.0[3] == 0 {
                continue;
            }
            mask_count += 1;

            let [r, g, b, a] = canvas_px.0;
            if a == 0 {
                continue;
            }
            filled += 1;
            if HslColor::from_rgb(r, g, b).matches(target, tolerance) {
                correct += 1;
            }
        }

        if mask_count == 0 {
            return AreaFillReport::default();
        }

        let coverage = filled as f32 / mask_count as f32;
        let color_ok = filled > 0 && correct as f32 / filled as f32 >= self.color_ok_ratio;
        let report = AreaFillReport {
            coverage,
            color_ok,
            pass: coverage >= coverage_threshold && color_ok,
        };
        debug!(
            "area fill: {filled}/{mask_count} filled, {correct} on target -> {:?}",
            report
        );
        report
    }
}

/// [`AreaFillEvaluator::evaluate`] with the default color ratio.
pub fn evaluate_area_fill(
    canvas: &RgbaImage,
    mask: &RgbaImage,
    target: &HslColor,
    tolerance: &HslTolerance,
    coverage_threshold: f32,
) -> AreaFillReport {
    AreaFillEvaluator::default().evaluate(canvas, mask, target, tolerance, coverage_threshold)
}
