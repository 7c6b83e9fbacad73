//! Color-space conversion: HSL -> sRGB -> linear RGB -> CIE XYZ -> xy.
//!
//! The XYZ matrix is the wide-gamut one used by Hue bridges rather than the
//! plain sRGB D65 matrix.

use serde::{Deserialize, Serialize};

/// Point on the CIE 1931 chromaticity diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CieXy {
    pub x: f64,
    pub y: f64,
}

impl CieXy {
    /// Neutral white, also the fallback for degenerate input.
    pub const NEUTRAL: Self = Self { x: 0.33, y: 0.33 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.664511, 0.154324, 0.162028],
    [0.283881, 0.668433, 0.047685],
    [0.000088, 0.072310, 0.986039],
];

/// HSL (all components in [0, 1]) to gamma-encoded sRGB in [0, 1].
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// sRGB transfer function, gamma-encoded -> linear light.
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Gamma-encoded RGB to chromaticity, rounded to 4 decimals.
pub fn rgb_to_xy(r: f64, g: f64, b: f64) -> CieXy {
    let lin = [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)];
    let [x_row, y_row, z_row] = RGB_TO_XYZ;
    let dot = |row: [f64; 3]| row[0] * lin[0] + row[1] * lin[1] + row[2] * lin[2];

    let (x, y, z) = (dot(x_row), dot(y_row), dot(z_row));
    let sum = x + y + z;
    if sum == 0.0 || !sum.is_finite() {
        return CieXy::NEUTRAL;
    }
    CieXy::new(round4(x / sum), round4(y / sum))
}

/// `h` in degrees, `s` and `l` in percent.
///
/// Achromatic input (saturation 0) is pinned to [`CieXy::NEUTRAL`] whatever
/// the lightness.
pub fn hsl_to_xy(h_deg: f64, s_pct: f64, l_pct: f64) -> CieXy {
    if s_pct == 0.0 {
        return CieXy::NEUTRAL;
    }
    let [r, g, b] = hsl_to_rgb(h_deg / 360.0, s_pct / 100.0, l_pct / 100.0);
    rgb_to_xy(r, g, b)
}

#[inline]
fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
