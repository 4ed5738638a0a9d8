use egui::Color32;
use serde::{Deserialize, Serialize};

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Symmetric per-channel allowance used when comparing two [`HslColor`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HslTolerance {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl HslTolerance {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}

impl HslColor {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = r as f32 / 255.0;
        let g = g as f32 / 255.0;
        let b = b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return Self::new(0.0, 0.0, l * 100.0);
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };

        let h = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        Self::new((h * 60.0) % 360.0, s * 100.0, l * 100.0)
    }

    pub fn from_color32(color: Color32) -> Self {
        Self::from_rgb(color.r(), color.g(), color.b())
    }

    /// Convert back to 8-bit RGB.
    pub fn to_rgb(&self) -> [u8; 3] {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = to_byte(l);
            return [v, v, v];
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        [
            to_byte(hue_to_channel(p, q, h + 1.0 / 3.0)),
            to_byte(hue_to_channel(p, q, h)),
            to_byte(hue_to_channel(p, q, h - 1.0 / 3.0)),
        ]
    }

    pub fn to_color32(&self) -> Color32 {
        let [r, g, b] = self.to_rgb();
        Color32::from_rgb(r, g, b)
    }

    /// Shortest angular distance between two hues, in degrees.
    pub fn hue_distance(&self, other: &HslColor) -> f32 {
        let diff = (self.h - other.h).abs() % 360.0;
        diff.min(360.0 - diff)
    }

    pub fn matches(&self, target: &HslColor, tolerance: &HslTolerance) -> bool {
        self.hue_distance(target) <= tolerance.h
            && (self.s - target.s).abs() <= tolerance.s
            && (self.l - target.l).abs() <= tolerance.l
    }
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
