//! The color transform port and its profile-less fallback.
//!
//! The table builder is agnostic to how device colors are actually
//! converted: it consumes the [`ColorConverter`] trait and nothing else.
//! An ICC-profile-driven provider lives in the `inkmap-icc` crate;
//! [`NaiveConverter`] here is the closed-form fallback used when no profile
//! is supplied. The fallback makes no colorimetric-accuracy claim, it only
//! has to be deterministic and perceptually reasonable for collision
//! ranking.

use crate::color::{CmykColor, LabColor, Rgb8, RgbColor};

/// Conversion capability a table build consumes.
///
/// Providers must be deterministic within a batch: the same input yields
/// the same output for the lifetime of the converter instance. A converter
/// is owned for exactly one batch; dropping it releases any underlying
/// transform resource exactly once, on every exit path.
pub trait ColorConverter {
    /// Converts a device CMYK color to display RGB.
    fn cmyk_to_rgb(&self, cmyk: CmykColor) -> RgbColor;

    /// Converts a device CMYK color to its Lab appearance.
    fn cmyk_to_lab(&self, cmyk: CmykColor) -> LabColor;

    /// Converts a quantized RGB triple to its Lab appearance.
    fn rgb_to_lab(&self, rgb: Rgb8) -> LabColor;
}

/// Closed-form CMYK conversion without an ICC profile.
///
/// CMYK to RGB uses the textbook ink-coverage formula
/// `channel = 255 * (1 - x) * (1 - k)`; RGB to Lab goes through the sRGB
/// EOTF, the sRGB D65 matrix, and the CIELAB transfer function.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveConverter;

impl NaiveConverter {
    /// Creates the fallback converter.
    pub fn new() -> Self {
        Self
    }

    fn float_rgb(&self, cmyk: CmykColor) -> [f64; 3] {
        let [c, m, y, k] = cmyk.components();
        let w = 1.0 - k;
        [
            255.0 * (1.0 - c) * w,
            255.0 * (1.0 - m) * w,
            255.0 * (1.0 - y) * w,
        ]
    }
}

impl ColorConverter for NaiveConverter {
    fn cmyk_to_rgb(&self, cmyk: CmykColor) -> RgbColor {
        let [r, g, b] = self.float_rgb(cmyk);
        RgbColor::new(r, g, b)
    }

    fn cmyk_to_lab(&self, cmyk: CmykColor) -> LabColor {
        // Lab appearance comes from the continuous RGB value, not the
        // quantized one, so colors that collide after rounding still rank
        // distinctly.
        let [r, g, b] = self.float_rgb(cmyk);
        srgb_to_lab([r / 255.0, g / 255.0, b / 255.0])
    }

    fn rgb_to_lab(&self, rgb: Rgb8) -> LabColor {
        srgb_to_lab([
            f64::from(rgb.r) / 255.0,
            f64::from(rgb.g) / 255.0,
            f64::from(rgb.b) / 255.0,
        ])
    }
}

// D65 reference white.
const D65_XN: f64 = 0.95047;
const D65_YN: f64 = 1.00000;
const D65_ZN: f64 = 1.08883;

/// sRGB EOTF (gamma expansion), IEC 61966-2-1.
fn srgb_eotf(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// CIELAB transfer function.
fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBE: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBE {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Converts normalized sRGB in [0, 1] to CIELAB under D65.
fn srgb_to_lab(rgb: [f64; 3]) -> LabColor {
    let r = srgb_eotf(rgb[0]);
    let g = srgb_eotf(rgb[1]);
    let b = srgb_eotf(rgb[2]);

    // Linear sRGB to XYZ (D65).
    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / D65_XN);
    let fy = lab_f(y / D65_YN);
    let fz = lab_f(z / D65_ZN);

    // The matrix rows do not sum to exactly 1, so white lands a few ulps
    // above L* = 100 without the clamp.
    LabColor::clamped(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_black_ink_is_black() {
        let conv = NaiveConverter::new();
        let rgb = conv.cmyk_to_rgb(CmykColor::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(rgb.quantize(), Rgb8::new(0, 0, 0));
    }

    #[test]
    fn no_ink_is_white() {
        let conv = NaiveConverter::new();
        let rgb = conv.cmyk_to_rgb(CmykColor::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(rgb.quantize(), Rgb8::new(255, 255, 255));
    }

    #[test]
    fn cyan_ink_removes_red() {
        let conv = NaiveConverter::new();
        let rgb = conv.cmyk_to_rgb(CmykColor::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(rgb.quantize(), Rgb8::new(0, 255, 255));
    }

    #[test]
    fn white_maps_to_full_lightness() {
        let conv = NaiveConverter::new();
        let lab = conv.rgb_to_lab(Rgb8::new(255, 255, 255));
        // Strictly within the comparison domain, not merely close to 100:
        // the distance calculator rejects any overshoot.
        assert!(lab.l <= 100.0, "white lightness out of domain: {}", lab.l);
        assert_relative_eq!(lab.l, 100.0, epsilon = 1e-6);
        assert_relative_eq!(lab.a, 0.0, epsilon = 1e-3);
        assert_relative_eq!(lab.b, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn near_white_lab_stays_in_domain() {
        let conv = NaiveConverter::new();
        for cmyk in [
            CmykColor::new(0.0, 0.0, 0.0, 0.0),
            CmykColor::new(0.0, 0.0, 0.0, 0.001),
            CmykColor::new(0.001, 0.0, 0.0, 0.0),
        ] {
            let lab = conv.cmyk_to_lab(cmyk);
            assert!(lab.l <= 100.0, "{cmyk} lightness out of domain: {}", lab.l);
        }
    }

    #[test]
    fn black_maps_to_zero_lightness() {
        let conv = NaiveConverter::new();
        let lab = conv.rgb_to_lab(Rgb8::new(0, 0, 0));
        assert_relative_eq!(lab.l, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn lab_from_float_tracks_unquantized_value() {
        // Two CMYK blacks that quantize to the same RGB triple must still
        // have distinct Lab appearances.
        let conv = NaiveConverter::new();
        let a = conv.cmyk_to_lab(CmykColor::new(0.0, 0.0, 0.0, 1.0));
        let b = conv.cmyk_to_lab(CmykColor::new(0.0, 0.0, 0.0, 0.999));
        assert!(b.l > a.l);
    }

    #[test]
    fn deterministic_across_calls() {
        let conv = NaiveConverter::new();
        let cmyk = CmykColor::new(0.3, 0.4, 0.5, 0.1);
        assert_eq!(conv.cmyk_to_rgb(cmyk), conv.cmyk_to_rgb(cmyk));
        assert_eq!(conv.cmyk_to_lab(cmyk), conv.cmyk_to_lab(cmyk));
    }
}
