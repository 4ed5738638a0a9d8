use image::{Rgba, RgbaImage};

use crate::fill::{brightness, pixel_at};
use crate::point::Point;

/// A visible outline pixel the trace tool can follow.
pub fn is_trace_pixel(pixel: &Rgba<u8>, trace_brightness: u8) -> bool {
    pixel.0[3] > 0 && brightness(pixel) < trace_brightness as f32
}

/// Fraction of `points` that have a trace pixel of `outline` within
/// `radius_px` (Chebyshev neighbourhood).
///
/// Points outside the buffer count as misses. Empty input scores 0.
pub fn trace_hit_ratio(outline: &RgbaImage, points: &[Point], radius_px: u32, trace_brightness: u8) -> f32 {
    let (width, height) = outline.dimensions();
    if points.is_empty() || width == 0 || height == 0 {
        return 0.0;
    }

    let hits = points
        .iter()
        .filter(|p| {
            let Some((x, y)) = pixel_at(**p, width, height) else {
                return false;
            };
            let x0 = x.saturating_sub(radius_px);
            let y0 = y.saturating_sub(radius_px);
            let x1 = x.saturating_add(radius_px).min(width - 1);
            let y1 = y.saturating_add(radius_px).min(height - 1);
            (y0..=y1).any(|ny| (x0..=x1).any(|nx| is_trace_pixel(outline.get_pixel(nx, ny), trace_brightness)))
        })
        .count();

    hits as f32 / points.len() as f32
}
