//! Color value types and canonical encodings.
//!
//! Three color spaces flow through the table builder:
//!
//! - [`CmykColor`] - device ink coverage, each channel normalized to [0, 1]
//! - [`RgbColor`] / [`Rgb8`] - display color, as continuous values in
//!   [0, 255] and as the quantized 8-bit triple collisions are detected on
//! - [`LabColor`] - CIELAB, used only for perceptual comparison
//!
//! Every persistable type has a canonical string encoding (`encode`) and a
//! strict decoder (`decode`) that is a total inverse of it for all values
//! this crate produces. The string form exists for sidecar files; inside the
//! process the numeric values themselves act as structural map keys.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Clamps one CMYK channel to [0, 1].
///
/// Non-finite input collapses to 0 and negative zero is normalized so every
/// constructed value has a single bit pattern per numeric value.
fn sanitize_unit(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    let v = v.clamp(0.0, 1.0);
    if v == 0.0 { 0.0 } else { v }
}

/// Clamps one RGB channel to [0, 255], same normalization rules.
fn sanitize_channel(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    let v = v.clamp(0.0, 255.0);
    if v == 0.0 { 0.0 } else { v }
}

/// One sanitized `device-cmyk()` component as it comes out of a style-sheet
/// parser.
///
/// The CSS syntax allows a plain number, a percentage, or the `none`
/// keyword; resolving all three to a [0, 1] channel value is the value
/// model's job even though the textual parsing itself lives outside this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmykComponent {
    /// A plain number, nominally already in [0, 1].
    Number(f64),
    /// A percentage in [0, 100], scaled down by 100.
    Percentage(f64),
    /// The `none` keyword, treated as 0.
    None,
}

impl CmykComponent {
    /// Resolves the component to a clamped [0, 1] channel value.
    pub fn resolve(self) -> f64 {
        match self {
            CmykComponent::Number(n) => sanitize_unit(n),
            CmykComponent::Percentage(p) => sanitize_unit(p / 100.0),
            CmykComponent::None => 0.0,
        }
    }
}

/// An immutable device-CMYK color with channels normalized to [0, 1].
///
/// Out-of-range construction input is clamped rather than rejected. After
/// construction all channels are finite and non-negative, which makes the
/// raw bit patterns a valid total order; the type is therefore usable
/// directly as an ordered, hashable map key.
#[derive(Debug, Clone, Copy)]
pub struct CmykColor {
    c: f64,
    m: f64,
    y: f64,
    k: f64,
}

impl CmykColor {
    /// Creates a CMYK color, clamping each channel to [0, 1].
    pub fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self {
            c: sanitize_unit(c),
            m: sanitize_unit(m),
            y: sanitize_unit(y),
            k: sanitize_unit(k),
        }
    }

    /// Builds a color from four sanitized syntax components in c, m, y, k
    /// order.
    pub fn from_components(parts: [CmykComponent; 4]) -> Self {
        let [c, m, y, k] = parts;
        Self::new(c.resolve(), m.resolve(), y.resolve(), k.resolve())
    }

    /// Cyan channel in [0, 1].
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Magenta channel in [0, 1].
    pub fn m(&self) -> f64 {
        self.m
    }

    /// Yellow channel in [0, 1].
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Black (key) channel in [0, 1].
    pub fn k(&self) -> f64 {
        self.k
    }

    /// The four channels as an array in c, m, y, k order.
    pub fn components(&self) -> [f64; 4] {
        [self.c, self.m, self.y, self.k]
    }

    /// Canonical string encoding, `"c,m,y,k"`.
    ///
    /// Uses the shortest decimal representation that round-trips each
    /// channel exactly, so [`decode`](Self::decode) is a total inverse.
    pub fn encode(&self) -> String {
        format!("{},{},{},{}", self.c, self.m, self.y, self.k)
    }

    /// Decodes a canonical string produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedColorEncoding`] if the input is not four
    /// comma-separated finite numbers in [0, 1], each in its shortest
    /// decimal form.
    pub fn decode(input: &str) -> Result<Self> {
        let mut parts = [0.0f64; 4];
        let mut n = 0;
        for piece in input.split(',') {
            if n == 4 {
                return Err(malformed(input));
            }
            let v = parse_canonical_f64(piece).ok_or_else(|| malformed(input))?;
            if !(0.0..=1.0).contains(&v) {
                return Err(malformed(input));
            }
            parts[n] = v;
            n += 1;
        }
        if n != 4 {
            return Err(malformed(input));
        }
        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    fn bits(&self) -> [u64; 4] {
        [
            self.c.to_bits(),
            self.m.to_bits(),
            self.y.to_bits(),
            self.k.to_bits(),
        ]
    }
}

// Channels are finite and non-negative after construction, so bit-pattern
// equality and ordering coincide with numeric equality and ordering.
impl PartialEq for CmykColor {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for CmykColor {}

impl Hash for CmykColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl PartialOrd for CmykColor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CmykColor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bits().cmp(&other.bits())
    }
}

impl fmt::Display for CmykColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmyk({})", self.encode())
    }
}

/// A continuous RGB color with channels clamped to [0, 255].
///
/// This is what a transform port hands back: the ICC provider produces
/// already-integral values, the naive fallback produces fractional ones.
/// Collision detection never operates on this type directly; it goes
/// through [`quantize`](Self::quantize) first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    r: f64,
    g: f64,
    b: f64,
}

impl RgbColor {
    /// Creates an RGB color, clamping each channel to [0, 255].
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: sanitize_channel(r),
            g: sanitize_channel(g),
            b: sanitize_channel(b),
        }
    }

    /// Red channel in [0, 255].
    pub fn r(&self) -> f64 {
        self.r
    }

    /// Green channel in [0, 255].
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Blue channel in [0, 255].
    pub fn b(&self) -> f64 {
        self.b
    }

    /// The three channels as an array in r, g, b order.
    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Rounds each channel to the quantized 8-bit triple.
    pub fn quantize(&self) -> Rgb8 {
        Rgb8 {
            r: self.r.round() as u8,
            g: self.g.round() as u8,
            b: self.b.round() as u8,
        }
    }
}

impl From<Rgb8> for RgbColor {
    fn from(rgb: Rgb8) -> Self {
        Self {
            r: f64::from(rgb.r),
            g: f64::from(rgb.g),
            b: f64::from(rgb.b),
        }
    }
}

/// A quantized 8-bit RGB triple.
///
/// This is the identity collisions are detected on and the key the
/// restoration sidecar is written under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Creates a quantized RGB triple.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Canonical string encoding, `"r,g,b"` with integer channels.
    pub fn encode(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }

    /// Decodes a canonical string produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedColorEncoding`] if the input is not three
    /// comma-separated plain decimal integers in [0, 255]. Forms the
    /// encoder never produces, such as a leading `+` or leading zeros,
    /// are rejected.
    pub fn decode(input: &str) -> Result<Self> {
        let mut parts = [0u8; 3];
        let mut n = 0;
        for piece in input.split(',') {
            if n == 3 {
                return Err(malformed(input));
            }
            parts[n] = parse_canonical_u8(piece).ok_or_else(|| malformed(input))?;
            n += 1;
        }
        if n != 3 {
            return Err(malformed(input));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({})", self.encode())
    }
}

/// A CIELAB color.
///
/// Used exclusively for perceptual comparison; never persisted or
/// re-quantized. Range validation happens at the point of use, in the
/// distance calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabColor {
    /// Lightness L* in [0, 100].
    pub l: f64,
    /// Green-red axis a* in [-128, 127].
    pub a: f64,
    /// Blue-yellow axis b* in [-128, 127].
    pub b: f64,
}

impl LabColor {
    /// Creates a Lab color from raw components.
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Creates a Lab color clamped into the comparison domain: L* in
    /// [0, 100], a* and b* in [-128, 127].
    ///
    /// Transform backends overshoot the nominal ranges by rounding amounts
    /// (an sRGB luminance row summing to one plus a few ulps puts white
    /// marginally above L* = 100), so providers clamp at the producing edge
    /// and every value they emit is valid for the distance calculator.
    pub fn clamped(l: f64, a: f64, b: f64) -> Self {
        Self {
            l: l.clamp(0.0, 100.0),
            a: a.clamp(-128.0, 127.0),
            b: b.clamp(-128.0, 127.0),
        }
    }

    /// Canonical string encoding, `"L,a,b"`.
    pub fn encode(&self) -> String {
        format!("{},{},{}", self.l, self.a, self.b)
    }

    /// Decodes a canonical string produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedColorEncoding`] if the input is not three
    /// comma-separated finite numbers in their shortest decimal form.
    pub fn decode(input: &str) -> Result<Self> {
        let mut parts = [0.0f64; 3];
        let mut n = 0;
        for piece in input.split(',') {
            if n == 3 {
                return Err(malformed(input));
            }
            parts[n] = parse_canonical_f64(piece).ok_or_else(|| malformed(input))?;
            n += 1;
        }
        if n != 3 {
            return Err(malformed(input));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl TryFrom<&[f64]> for LabColor {
    type Error = Error;

    /// Converts a raw transform output buffer, requiring exactly three
    /// components.
    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [l, a, b] => Ok(Self::new(*l, *a, *b)),
            _ => Err(Error::InvalidColorTuple { len: values.len() }),
        }
    }
}

impl fmt::Display for LabColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lab({})", self.encode())
    }
}

fn malformed(input: &str) -> Error {
    Error::MalformedColorEncoding {
        input: input.to_owned(),
    }
}

/// Strict integer channel parse: plain decimal digits, no sign, no leading
/// zeros. Accepts exactly the forms the encoder emits.
fn parse_canonical_u8(piece: &str) -> Option<u8> {
    if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if piece.len() > 1 && piece.starts_with('0') {
        return None;
    }
    piece.parse().ok()
}

/// Strict float channel parse: the piece must be the shortest round-trip
/// decimal form, which is exactly what the encoder emits.
fn parse_canonical_f64(piece: &str) -> Option<f64> {
    let v: f64 = piece.parse().ok()?;
    if !v.is_finite() || v.to_string() != piece {
        return None;
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmyk_clamps_out_of_range() {
        let c = CmykColor::new(-0.5, 1.5, 0.25, f64::NAN);
        assert_eq!(c.components(), [0.0, 1.0, 0.25, 0.0]);
    }

    #[test]
    fn cmyk_negative_zero_normalized() {
        assert_eq!(CmykColor::new(-0.0, 0.0, 0.0, 0.0), CmykColor::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(CmykColor::new(-0.0, 0.0, 0.0, 0.0).encode(), "0,0,0,0");
    }

    #[test]
    fn cmyk_components_resolve() {
        let c = CmykColor::from_components([
            CmykComponent::Number(0.25),
            CmykComponent::Percentage(50.0),
            CmykComponent::None,
            CmykComponent::Percentage(150.0),
        ]);
        assert_eq!(c.components(), [0.25, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn cmyk_encode_round_trip() {
        for c in [
            CmykColor::new(0.0, 0.0, 0.0, 1.0),
            CmykColor::new(0.1, 0.2, 0.3, 0.4),
            CmykColor::new(1.0 / 3.0, 0.996, 1e-9, 1.0),
        ] {
            assert_eq!(CmykColor::decode(&c.encode()).unwrap(), c);
        }
    }

    #[test]
    fn cmyk_decode_rejects_malformed() {
        for bad in ["", "1,2,3", "0,0,0,0,0", "0,0,0,x", "0,0,0,2", "0,0,0,inf"] {
            assert!(matches!(
                CmykColor::decode(bad),
                Err(Error::MalformedColorEncoding { .. })
            ));
        }
    }

    #[test]
    fn cmyk_ordering_matches_numeric() {
        let a = CmykColor::new(0.1, 0.0, 0.0, 0.0);
        let b = CmykColor::new(0.2, 0.0, 0.0, 0.0);
        assert!(a < b);
        let c = CmykColor::new(0.1, 0.0, 0.0, 0.5);
        assert!(a < c);
    }

    #[test]
    fn rgb_quantize_rounds_and_clamps() {
        assert_eq!(RgbColor::new(254.6, 0.4, 127.5).quantize(), Rgb8::new(255, 0, 128));
        assert_eq!(RgbColor::new(-3.0, 300.0, 0.0).quantize(), Rgb8::new(0, 255, 0));
    }

    #[test]
    fn rgb8_encode_round_trip() {
        let rgb = Rgb8::new(0, 128, 255);
        assert_eq!(rgb.encode(), "0,128,255");
        assert_eq!(Rgb8::decode(&rgb.encode()).unwrap(), rgb);
    }

    #[test]
    fn rgb8_decode_rejects_malformed() {
        for bad in ["", "1,2", "1,2,3,4", "1,2,256", "1,2,-1", "a,b,c"] {
            assert!(matches!(
                Rgb8::decode(bad),
                Err(Error::MalformedColorEncoding { .. })
            ));
        }
    }

    #[test]
    fn rgb8_decode_rejects_non_canonical_integers() {
        // Parseable, but not forms the encoder ever writes.
        for bad in ["+1,2,3", "0,0,007", "01,2,3", " 1,2,3"] {
            assert!(
                matches!(Rgb8::decode(bad), Err(Error::MalformedColorEncoding { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn cmyk_decode_rejects_non_canonical_numbers() {
        for bad in ["0.5000,0,0,0", "+0.5,0,0,0", "0,0,0,1.", "0,0,0,1e0", "0,0,0,01"] {
            assert!(
                matches!(
                    CmykColor::decode(bad),
                    Err(Error::MalformedColorEncoding { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn lab_encode_round_trip() {
        let lab = LabColor::new(53.24, 80.09, 67.2);
        assert_eq!(LabColor::decode(&lab.encode()).unwrap(), lab);
    }

    #[test]
    fn lab_clamped_into_comparison_domain() {
        let lab = LabColor::clamped(100.00000386666655, 130.0, -130.0);
        assert_eq!(lab, LabColor::new(100.0, 127.0, -128.0));
        // In-domain values pass through untouched.
        assert_eq!(
            LabColor::clamped(53.24, 80.09, 67.2),
            LabColor::new(53.24, 80.09, 67.2)
        );
    }

    #[test]
    fn lab_from_slice() {
        let lab = LabColor::try_from([50.0, 10.0, -10.0].as_slice()).unwrap();
        assert_eq!(lab, LabColor::new(50.0, 10.0, -10.0));

        let err = LabColor::try_from([50.0, 10.0].as_slice()).unwrap_err();
        assert_eq!(err, Error::InvalidColorTuple { len: 2 });
    }
}
