//! ICC-profile-driven implementation of the color transform port.

use crate::{IccError, IccResult};
use inkmap_core::{CmykColor, ColorConverter, LabColor, Rgb8, RgbColor};
use lcms2::{ColorSpaceSignature, Flags, Intent, PixelFormat, Profile, Transform};
use std::path::Path;

/// Scale factor between normalized CMYK channels and 16-bit transform input.
const CHANNEL_MAX: f64 = 65535.0;

/// A transform port backed by an ICC CMYK profile.
///
/// Owns three Little CMS transforms built once per batch: CMYK to sRGB,
/// CMYK to Lab, and sRGB to Lab, all with the relative-colorimetric
/// rendering intent and optional black-point compensation. Dropping the
/// converter releases the underlying lcms2 handles exactly once, on every
/// exit path.
///
/// # Example
///
/// ```rust,no_run
/// use inkmap_core::{build_transformation_table, CmykColor};
/// use inkmap_icc::IccConverter;
/// use std::collections::BTreeSet;
///
/// let profile = std::fs::read("Coated_FOGRA39.icc").unwrap();
/// let converter = IccConverter::new(&profile, true).unwrap();
///
/// let colors: BTreeSet<_> = [CmykColor::new(0.0, 0.0, 0.0, 1.0)].into();
/// let table = build_transformation_table(&colors, &converter).unwrap();
/// ```
pub struct IccConverter {
    cmyk_to_rgb: Transform<[u16; 4], [u8; 3]>,
    cmyk_to_lab: Transform<[u16; 4], [f64; 3]>,
    rgb_to_lab: Transform<[u8; 3], [f64; 3]>,
}

impl IccConverter {
    /// Creates a converter from raw ICC profile bytes.
    ///
    /// # Arguments
    ///
    /// * `cmyk_profile` - Raw bytes of a CMYK ICC profile
    /// * `black_point_compensation` - Enable black-point compensation on
    ///   all three transforms
    ///
    /// # Errors
    ///
    /// [`IccError::InvalidProfile`] if the bytes are not a valid profile,
    /// [`IccError::ColorSpaceMismatch`] if the profile is not CMYK, and
    /// [`IccError::TransformFailed`] if a transform cannot be built.
    pub fn new(cmyk_profile: &[u8], black_point_compensation: bool) -> IccResult<Self> {
        let cmyk = Profile::new_icc(cmyk_profile)
            .map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        if cmyk.color_space() != ColorSpaceSignature::CmykData {
            return Err(IccError::ColorSpaceMismatch {
                actual: format!("{:?}", cmyk.color_space()),
            });
        }

        let srgb = Profile::new_srgb();
        let lab = Profile::new_lab4_context(lcms2::GlobalContext::new(), &lcms2::CIExyY::d50())
            .map_err(|e| IccError::CreateFailed(e.to_string()))?;

        Ok(Self {
            cmyk_to_rgb: create_transform(
                &cmyk,
                PixelFormat::CMYK_16,
                &srgb,
                PixelFormat::RGB_8,
                black_point_compensation,
            )?,
            cmyk_to_lab: create_transform(
                &cmyk,
                PixelFormat::CMYK_16,
                &lab,
                PixelFormat::Lab_DBL,
                black_point_compensation,
            )?,
            rgb_to_lab: create_transform(
                &srgb,
                PixelFormat::RGB_8,
                &lab,
                PixelFormat::Lab_DBL,
                black_point_compensation,
            )?,
        })
    }

    /// Creates a converter from a profile file on disk.
    ///
    /// # Errors
    ///
    /// [`IccError::Io`] if the file cannot be read, otherwise as
    /// [`new`](Self::new).
    pub fn from_profile_file(path: &Path, black_point_compensation: bool) -> IccResult<Self> {
        let data = std::fs::read(path)?;
        Self::new(&data, black_point_compensation)
    }
}

impl ColorConverter for IccConverter {
    fn cmyk_to_rgb(&self, cmyk: CmykColor) -> RgbColor {
        let src = [encode_cmyk16(cmyk)];
        let mut dst = [[0u8; 3]];
        self.cmyk_to_rgb.transform_pixels(&src, &mut dst);
        let [r, g, b] = dst[0];
        RgbColor::new(f64::from(r), f64::from(g), f64::from(b))
    }

    fn cmyk_to_lab(&self, cmyk: CmykColor) -> LabColor {
        let src = [encode_cmyk16(cmyk)];
        let mut dst = [[0f64; 3]];
        self.cmyk_to_lab.transform_pixels(&src, &mut dst);
        let [l, a, b] = dst[0];
        // Lab_DBL output is not guaranteed to stay inside the nominal
        // encoding ranges; clamp into the comparison domain.
        LabColor::clamped(l, a, b)
    }

    fn rgb_to_lab(&self, rgb: Rgb8) -> LabColor {
        let src = [[rgb.r, rgb.g, rgb.b]];
        let mut dst = [[0f64; 3]];
        self.rgb_to_lab.transform_pixels(&src, &mut dst);
        let [l, a, b] = dst[0];
        LabColor::clamped(l, a, b)
    }
}

impl std::fmt::Debug for IccConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IccConverter").finish_non_exhaustive()
    }
}

fn create_transform<I: Copy + Clone + lcms2::Pod, O: Copy + Clone + lcms2::Pod>(
    src: &Profile,
    src_format: PixelFormat,
    dst: &Profile,
    dst_format: PixelFormat,
    black_point_compensation: bool,
) -> IccResult<Transform<I, O>> {
    let result = if black_point_compensation {
        Transform::new_flags(
            src,
            src_format,
            dst,
            dst_format,
            Intent::RelativeColorimetric,
            Flags::BLACKPOINT_COMPENSATION,
        )
    } else {
        Transform::new(src, src_format, dst, dst_format, Intent::RelativeColorimetric)
    };
    result.map_err(|e| IccError::TransformFailed(e.to_string()))
}

/// Scales normalized CMYK channels to the 16-bit transform input range.
fn encode_cmyk16(cmyk: CmykColor) -> [u16; 4] {
    cmyk.components().map(|v| (v * CHANNEL_MAX).round() as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_garbage_profile_bytes() {
        let err = IccConverter::new(b"not an icc profile", false).unwrap_err();
        assert!(matches!(err, IccError::InvalidProfile(_)));
    }

    #[test]
    fn rejects_non_cmyk_profile() {
        let srgb_bytes = Profile::new_srgb().icc().unwrap();
        let err = IccConverter::new(&srgb_bytes, false).unwrap_err();
        assert!(matches!(err, IccError::ColorSpaceMismatch { .. }));
    }

    #[test]
    fn missing_profile_file_is_io_error() {
        let err =
            IccConverter::from_profile_file(Path::new("/nonexistent/profile.icc"), false)
                .unwrap_err();
        assert!(matches!(err, IccError::Io(_)));
    }

    #[test]
    fn cmyk16_scaling() {
        assert_eq!(
            encode_cmyk16(CmykColor::new(0.0, 1.0, 0.5, 0.25)),
            [0, 65535, 32768, 16384]
        );
    }

    #[test]
    fn srgb_lab_leg_matches_reference_white() {
        // The converter's RGB->Lab leg, built standalone: sRGB white must
        // land at the top of the lightness axis with no chroma.
        let srgb = Profile::new_srgb();
        let lab = Profile::new_lab4_context(lcms2::GlobalContext::new(), &lcms2::CIExyY::d50())
            .unwrap();
        let transform: Transform<[u8; 3], [f64; 3]> = create_transform(
            &srgb,
            PixelFormat::RGB_8,
            &lab,
            PixelFormat::Lab_DBL,
            false,
        )
        .unwrap();

        let mut dst = [[0f64; 3]];
        transform.transform_pixels(&[[255u8, 255, 255]], &mut dst);
        let [l, a, b] = dst[0];
        assert_relative_eq!(l, 100.0, epsilon = 0.5);
        assert_relative_eq!(a, 0.0, epsilon = 0.5);
        assert_relative_eq!(b, 0.0, epsilon = 0.5);
    }
}
