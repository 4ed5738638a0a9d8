//! Exercise steps as delivered by the authoring side, and grading of one
//! attempt against a step.

use image::RgbaImage;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::color::{HslColor, HslTolerance};
use crate::config::EngineConfig;
use crate::error::StepError;
use crate::evaluation::{
    AreaFillEvaluator, EvaluationResult, StrokeRubric, evaluate_dot_to_dot, evaluate_layer_order,
    evaluate_stroke_path,
};
use crate::point::Point;
use crate::tool::Constraints;

/// An RGBA pixel buffer carried inside a step payload.
///
/// On the wire it is `{ "width", "height", "rgba": [..] }`; the byte count is
/// checked when the payload is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer(pub RgbaImage);

#[derive(Serialize, Deserialize)]
struct PixelBufferRepr {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TryFrom<PixelBufferRepr> for PixelBuffer {
    type Error = StepError;

    fn try_from(repr: PixelBufferRepr) -> Result<Self, Self::Error> {
        let expected = repr.width as usize * repr.height as usize * 4;
        let actual = repr.rgba.len();
        RgbaImage::from_raw(repr.width, repr.height, repr.rgba)
            .filter(|_| actual == expected)
            .map(PixelBuffer)
            .ok_or(StepError::BufferSize {
                width: repr.width,
                height: repr.height,
                expected,
                actual,
            })
    }
}

impl From<PixelBuffer> for PixelBufferRepr {
    fn from(buffer: PixelBuffer) -> Self {
        let (width, height) = buffer.0.dimensions();
        Self {
            width,
            height,
            rgba: buffer.0.into_raw(),
        }
    }
}

impl Serialize for PixelBuffer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PixelBufferRepr::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PixelBuffer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = PixelBufferRepr::deserialize(deserializer)?;
        PixelBuffer::try_from(repr).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFillGuide {
    /// Non-transparent pixels mark the region to be filled.
    pub mask: PixelBuffer,
    pub target_hsl: HslColor,
    pub tolerance: HslTolerance,
    /// Authored outline the fill tool floods against.
    #[serde(default)]
    pub boundary: Option<PixelBuffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFillRubric {
    pub coverage_threshold: f32,
    /// `[c3, c2, c1]` coverage needed for each star count. Defaults to
    /// `[0.98, 0.9, coverage_threshold]`.
    #[serde(default)]
    pub coverage_star_thresholds: Option<[f32; 3]>,
}

impl AreaFillRubric {
    pub fn star_thresholds(&self) -> [f32; 3] {
        self.coverage_star_thresholds
            .unwrap_or([0.98, 0.9, self.coverage_threshold])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DotToDotRubric {
    pub tolerance_px: f32,
}

/// The guide payload and rubric for each kind of exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Exercise {
    StrokePath {
        guide: Vec<Point>,
        rubric: StrokeRubric,
    },
    AreaFill {
        guide: AreaFillGuide,
        rubric: AreaFillRubric,
    },
    DotToDot {
        guide: Vec<Point>,
        rubric: DotToDotRubric,
    },
    LayerOrder {
        guide: Vec<String>,
    },
}

impl Exercise {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::StrokePath { .. } => "stroke-path",
            Self::AreaFill { .. } => "area-fill",
            Self::DotToDot { .. } => "dot-to-dot",
            Self::LayerOrder { .. } => "layer-order",
        }
    }
}

/// One exercise step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(flatten)]
    pub exercise: Exercise,
}

/// What the learner submitted for grading.
#[derive(Debug, Clone, Copy)]
pub enum Attempt<'a> {
    Stroke(&'a [Point]),
    Fill(&'a RgbaImage),
    Taps(&'a [Point]),
    Order(&'a [String]),
}

impl StepSpec {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            id: None,
            constraints: Constraints::default(),
            exercise,
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Parse and validate a step payload.
    pub fn from_json_str(json: &str) -> Result<Self, StepError> {
        let step: Self = serde_json::from_str(json)?;
        step.validate()?;
        info!(
            "Loaded {} step {}",
            step.exercise.kind_name(),
            step.id.as_deref().unwrap_or("<unnamed>")
        );
        Ok(step)
    }

    /// Reject payloads no attempt could ever be graded against.
    ///
    /// Empty guides are not rejected here; they grade as a failed attempt.
    pub fn validate(&self) -> Result<(), StepError> {
        match &self.exercise {
            Exercise::StrokePath { rubric, .. } => {
                if let Some(samples) = rubric.resample_points.filter(|&n| n < 2) {
                    return Err(StepError::InvalidPayload(format!(
                        "resamplePoints must be at least 2, got {samples}"
                    )));
                }
            }
            Exercise::AreaFill { guide, .. } => {
                if let Some(boundary) = &guide.boundary {
                    if boundary.0.dimensions() != guide.mask.0.dimensions() {
                        return Err(StepError::InvalidPayload(
                            "boundary and mask sizes differ".into(),
                        ));
                    }
                }
            }
            Exercise::DotToDot { rubric, .. } => {
                if !(rubric.tolerance_px.is_finite() && rubric.tolerance_px >= 0.0) {
                    return Err(StepError::InvalidPayload(format!(
                        "tolerancePx must be non-negative, got {}",
                        rubric.tolerance_px
                    )));
                }
            }
            Exercise::LayerOrder { .. } => {}
        }
        Ok(())
    }

    /// Grade `attempt` against this step. An attempt of the wrong kind fails.
    pub fn evaluate(&self, attempt: Attempt<'_>, config: &EngineConfig) -> EvaluationResult {
        match (&self.exercise, attempt) {
            (Exercise::StrokePath { guide, rubric }, Attempt::Stroke(points)) => {
                let rubric = StrokeRubric {
                    resample_points: rubric.resample_points.or(Some(config.resample_points)),
                    ..*rubric
                };
                evaluate_stroke_path(guide, points, &rubric)
            }
            (Exercise::AreaFill { guide, rubric }, Attempt::Fill(canvas)) => {
                AreaFillEvaluator::new(config)
                    .evaluate(
                        canvas,
                        &guide.mask.0,
                        &guide.target_hsl,
                        &guide.tolerance,
                        rubric.coverage_threshold,
                    )
                    .to_result(&rubric.star_thresholds())
            }
            (Exercise::DotToDot { guide, rubric }, Attempt::Taps(taps)) => {
                EvaluationResult::from_sequence(evaluate_dot_to_dot(taps, guide, rubric.tolerance_px))
            }
            (Exercise::LayerOrder { guide }, Attempt::Order(order)) => {
                EvaluationResult::from_sequence(evaluate_layer_order(order, guide.as_slice()))
            }
            (exercise, attempt) => {
                warn!(
                    "{} attempt submitted to a {} step",
                    attempt_name(&attempt),
                    exercise.kind_name()
                );
                EvaluationResult::failed()
            }
        }
    }
}

fn attempt_name(attempt: &Attempt<'_>) -> &'static str {
    match attempt {
        Attempt::Stroke(_) => "stroke",
        Attempt::Fill(_) => "fill",
        Attempt::Taps(_) => "taps",
        Attempt::Order(_) => "order",
    }
}
