//! # inkmap-icc
//!
//! ICC-profile-driven color transforms for inkmap, built on the
//! industry-standard Little CMS 2 library.
//!
//! [`IccConverter`] implements the `inkmap-core` transform port with a real
//! CMYK press profile: CMYK to sRGB for the table entries themselves, and
//! CMYK/sRGB to Lab for the perceptual ranking the collision resolver
//! performs. All transforms use the relative-colorimetric rendering intent,
//! with black-point compensation as an option, matching common prepress
//! practice.
//!
//! # Example
//!
//! ```rust,no_run
//! use inkmap_core::{build_transformation_table, CmykColor};
//! use inkmap_icc::IccConverter;
//! use std::collections::BTreeSet;
//! use std::path::Path;
//!
//! let converter =
//!     IccConverter::from_profile_file(Path::new("Coated_FOGRA39.icc"), true).unwrap();
//!
//! let colors: BTreeSet<_> = [
//!     CmykColor::new(0.0, 0.0, 0.0, 1.0),
//!     CmykColor::new(0.0, 0.0, 0.0, 0.996),
//! ]
//! .into();
//!
//! let table = build_transformation_table(&colors, &converter).unwrap();
//! let restore = table.invert();
//! ```
//!
//! # Resource lifecycle
//!
//! A converter is intended to be scoped to one batch: create it, run the
//! build, and let it drop. The lcms2 transform handles it owns are released
//! exactly once when it goes out of scope, whether the batch succeeded or
//! failed.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod converter;
mod error;

pub use converter::IccConverter;
pub use error::{IccError, IccResult};
