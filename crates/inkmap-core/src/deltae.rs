//! CIEDE2000 perceptual color difference.
//!
//! Implements the CIE 2000 revision of the color-difference formula
//! (CIE Technical Report 142-2001). Every collision-resolution decision in
//! the table builder ranks colors by this metric, so the intermediate
//! quantities are exposed alongside the final scalar for downstream ranking
//! and debugging.
//!
//! # Reference
//!
//! Sharma, Wu, Dalal, "The CIEDE2000 Color-Difference Formula:
//! Implementation Notes, Supplementary Test Data, and Mathematical
//! Observations" (2005).

use crate::color::LabColor;
use crate::error::{Error, Result};

/// Parametric weighting factors for the lightness, chroma, and hue
/// contributions.
///
/// The graphic-arts reference conditions use 1.0 for all three, which is
/// what [`Default`] provides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KWeights {
    /// Lightness weight kL.
    pub k_l: f64,
    /// Chroma weight kC.
    pub k_c: f64,
    /// Hue weight kH.
    pub k_h: f64,
}

impl Default for KWeights {
    fn default() -> Self {
        Self {
            k_l: 1.0,
            k_c: 1.0,
            k_h: 1.0,
        }
    }
}

/// The CIEDE2000 difference together with its intermediate quantities.
///
/// `delta_e` is the symmetric, non-negative final value. The remaining
/// fields follow the primed notation of the formula; the signed
/// intermediates are not symmetric under swapping the inputs even though
/// `delta_e` is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaE2000 {
    /// Gray-axis corrected a* of the first color.
    pub a1_prime: f64,
    /// Gray-axis corrected a* of the second color.
    pub a2_prime: f64,
    /// Adjusted chroma C′ of the first color.
    pub c1_prime: f64,
    /// Adjusted chroma C′ of the second color.
    pub c2_prime: f64,
    /// Adjusted hue angle h′ of the first color, degrees in [0, 360).
    pub h1_prime: f64,
    /// Adjusted hue angle h′ of the second color, degrees in [0, 360).
    pub h2_prime: f64,
    /// Mean hue angle h̄′ in degrees.
    pub h_bar_prime: f64,
    /// Gray-axis correction factor G.
    pub g: f64,
    /// Hue weighting factor T.
    pub t: f64,
    /// Lightness weighting term S_L.
    pub s_l: f64,
    /// Chroma weighting term S_C.
    pub s_c: f64,
    /// Hue weighting term S_H.
    pub s_h: f64,
    /// Hue rotation term R_T.
    pub r_t: f64,
    /// The final color difference ΔE00.
    pub delta_e: f64,
}

/// 25^7, the constant in the chroma-dependent correction factors.
const POW25_7: f64 = 6_103_515_625.0;

/// Computes the CIEDE2000 difference with unit weighting factors.
///
/// # Errors
///
/// [`Error::InvalidLabComponent`] if either input is outside the valid
/// L*a*b* domain.
///
/// # Example
///
/// ```rust
/// use inkmap_core::{ciede2000, LabColor};
///
/// let d = ciede2000(
///     LabColor::new(50.0, 2.6772, -79.7751),
///     LabColor::new(50.0, 0.0, -82.7485),
/// )
/// .unwrap();
/// assert!((d.delta_e - 2.0425).abs() < 1e-4);
/// ```
pub fn ciede2000(x: LabColor, y: LabColor) -> Result<DeltaE2000> {
    ciede2000_weighted(x, y, KWeights::default())
}

/// Computes the CIEDE2000 difference with explicit weighting factors.
///
/// # Errors
///
/// [`Error::InvalidLabComponent`] if either input is outside the valid
/// L*a*b* domain.
pub fn ciede2000_weighted(x: LabColor, y: LabColor, k: KWeights) -> Result<DeltaE2000> {
    validate(x)?;
    validate(y)?;

    let (l1, a1, b1) = (x.l, x.a, x.b);
    let (l2, a2, b2) = (y.l, y.a, y.b);

    let c1_star = a1.hypot(b1);
    let c2_star = a2.hypot(b2);
    let c_bar_star = (c1_star + c2_star) / 2.0;

    let c_bar_star_7 = c_bar_star.powi(7);
    let g = 0.5 * (1.0 - (c_bar_star_7 / (c_bar_star_7 + POW25_7)).sqrt());

    let a1_prime = (1.0 + g) * a1;
    let a2_prime = (1.0 + g) * a2;
    let c1_prime = a1_prime.hypot(b1);
    let c2_prime = a2_prime.hypot(b2);
    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;

    // Hue delta is 0 when either chroma vanishes; otherwise the raw
    // difference wraps at +/-180 degrees.
    let delta_h_prime = if c1_prime * c2_prime == 0.0 {
        0.0
    } else {
        let d = h2_prime - h1_prime;
        if d.abs() <= 180.0 {
            d
        } else if d > 180.0 {
            d - 360.0
        } else {
            d + 360.0
        }
    };

    let delta_h_big =
        2.0 * (c1_prime * c2_prime).sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let l_bar_prime = (l1 + l2) / 2.0;
    let c_bar_prime = (c1_prime + c2_prime) / 2.0;

    // Mean hue: when the two hues straddle 0/360 by more than 180 degrees
    // the sum is corrected by 360 before halving, the sign chosen by
    // whether the raw sum is below 360.
    let h_bar_prime = if c1_prime * c2_prime == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar_prime - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_prime).to_radians().cos()
        + 0.32 * (3.0 * h_bar_prime + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_prime - 63.0).to_radians().cos();

    let delta_theta = 30.0 * (-((h_bar_prime - 275.0) / 25.0).powi(2)).exp();

    let c_bar_prime_7 = c_bar_prime.powi(7);
    let r_c = 2.0 * (c_bar_prime_7 / (c_bar_prime_7 + POW25_7)).sqrt();

    let l_minus_50_sq = (l_bar_prime - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l_minus_50_sq / (20.0 + l_minus_50_sq).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_prime;
    let s_h = 1.0 + 0.015 * c_bar_prime * t;
    let r_t = -r_c * (2.0 * delta_theta.to_radians()).sin();

    let term_l = delta_l_prime / (k.k_l * s_l);
    let term_c = delta_c_prime / (k.k_c * s_c);
    let term_h = delta_h_big / (k.k_h * s_h);

    let delta_e =
        (term_l * term_l + term_c * term_c + term_h * term_h + r_t * term_c * term_h).sqrt();

    Ok(DeltaE2000 {
        a1_prime,
        a2_prime,
        c1_prime,
        c2_prime,
        h1_prime,
        h2_prime,
        h_bar_prime,
        g,
        t,
        s_l,
        s_c,
        s_h,
        r_t,
        delta_e,
    })
}

/// Hue angle of (a, b) in degrees, normalized to [0, 360).
fn hue_angle(a: f64, b: f64) -> f64 {
    let h = b.atan2(a).to_degrees();
    if h < 0.0 { h + 360.0 } else { h }
}

fn validate(lab: LabColor) -> Result<()> {
    if !(0.0..=100.0).contains(&lab.l) {
        return Err(Error::InvalidLabComponent { value: lab.l });
    }
    for v in [lab.a, lab.b] {
        if !(-128.0..=127.0).contains(&v) {
            return Err(Error::InvalidLabComponent { value: v });
        }
    }
    Ok(())
}
