//! Flood fill into the document's fill bitmap.

use egui::Color32;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Average of the RGB channels, ignoring alpha.
pub fn brightness(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, _] = pixel.0;
    (r as u16 + g as u16 + b as u16) as f32 / 3.0
}

/// A pixel stops the fill when it is darker than `threshold`.
pub fn is_boundary(pixel: &Rgba<u8>, threshold: u8) -> bool {
    brightness(pixel) < threshold as f32
}

/// Map a canvas position to the pixel it falls in, if any.
pub fn pixel_at(point: Point, width: u32, height: u32) -> Option<(u32, u32)> {
    if !(point.x.is_finite() && point.y.is_finite()) || point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let (x, y) = (point.x.floor() as u64, point.y.floor() as u64);
    if x >= width as u64 || y >= height as u64 {
        return None;
    }
    Some((x as u32, y as u32))
}

/// Flat indices (`y * width + x`) of every pixel reachable from `seed` through
/// 4-connected non-boundary pixels of `boundary`, sorted ascending.
///
/// Returns `None` when the seed is outside the buffer or sits on a boundary.
pub fn flood_region(seed: Point, boundary: &RgbaImage, threshold: u8) -> Option<Vec<u32>> {
    let (width, height) = boundary.dimensions();
    let (sx, sy) = pixel_at(seed, width, height)?;
    if is_boundary(boundary.get_pixel(sx, sy), threshold) {
        return None;
    }

    let w = width as usize;
    let h = height as usize;
    // doubles as the visited set; each pixel is pushed at most once
    let mut visited = vec![false; w * h];
    let mut region = Vec::new();
    let mut stack = Vec::with_capacity(1024);

    let seed_idx = sy as usize * w + sx as usize;
    visited[seed_idx] = true;
    stack.push(seed_idx);

    while let Some(idx) = stack.pop() {
        region.push(idx as u32);
        let x = idx % w;
        let y = idx / w;

        let mut visit = |nx: usize, ny: usize| {
            let ni = ny * w + nx;
            if !visited[ni] && !is_boundary(boundary.get_pixel(nx as u32, ny as u32), threshold) {
                visited[ni] = true;
                stack.push(ni);
            }
        };

        if x > 0 {
            visit(x - 1, y);
        }
        if x + 1 < w {
            visit(x + 1, y);
        }
        if y > 0 {
            visit(x, y - 1);
        }
        if y + 1 < h {
            visit(x, y + 1);
        }
    }

    region.sort_unstable();
    Some(region)
}

/// Paint `fill_color` into `output` over the region reachable from `seed` in
/// `boundary`. Returns how many pixels were painted.
///
/// Out-of-bounds or boundary seeds and mismatched buffer sizes are silent
/// no-ops.
pub fn flood_fill(
    seed: Point,
    fill_color: Rgba<u8>,
    boundary: &RgbaImage,
    output: &mut RgbaImage,
    threshold: u8,
) -> usize {
    if boundary.dimensions() != output.dimensions() {
        return 0;
    }
    let Some(region) = flood_region(seed, boundary, threshold) else {
        return 0;
    };
    let width = output.width();
    for &idx in &region {
        output.put_pixel(idx % width, idx / width, fill_color);
    }
    region.len()
}

/// The RGBA value a fill of `color` at `opacity` writes to each pixel.
pub fn fill_pixel(color: Color32, opacity: f32) -> Rgba<u8> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Rgba([r, g, b, alpha])
}

/// The pixels a fill touches together with their values before the fill.
///
/// Carrying the previous values lets a fill be undone without consulting the
/// bitmap history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPatch {
    width: u32,
    height: u32,
    indices: Vec<u32>,
    before: Vec<[u8; 4]>,
}

impl FillPatch {
    /// Record the current values of `region` in `bitmap`.
    pub fn capture(region: Vec<u32>, bitmap: &RgbaImage) -> Self {
        let (width, height) = bitmap.dimensions();
        let before = region
            .iter()
            .map(|&idx| bitmap.get_pixel(idx % width, idx / width).0)
            .collect();
        Self {
            width,
            height,
            indices: region,
            before,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether this patch was captured from a bitmap of `bitmap`'s size.
    pub fn fits(&self, bitmap: &RgbaImage) -> bool {
        bitmap.dimensions() == (self.width, self.height)
    }

    pub fn paint(&self, bitmap: &mut RgbaImage, pixel: Rgba<u8>) {
        for &idx in &self.indices {
            bitmap.put_pixel(idx % self.width, idx / self.width, pixel);
        }
    }

    pub fn restore(&self, bitmap: &mut RgbaImage) {
        for (&idx, before) in self.indices.iter().zip(&self.before) {
            bitmap.put_pixel(idx % self.width, idx / self.width, Rgba(*before));
        }
    }
}
