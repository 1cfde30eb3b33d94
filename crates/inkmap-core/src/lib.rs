//! # inkmap-core
//!
//! Reversible conversion of device-CMYK colors to device-independent RGB.
//!
//! Style sheets can carry colors expressed directly in a printing ink space
//! (`device-cmyk()`). Converting them to RGB for display is easy; converting
//! them **reversibly** is not, because common ICC transforms are many-to-one
//! at 8-bit output precision: distinct CMYK inputs quantize to the identical
//! RGB triple. This crate builds conversion tables that are guaranteed
//! injective, so the original device color can always be recovered from the
//! emitted RGB value.
//!
//! # Components
//!
//! - [`CmykColor`], [`RgbColor`], [`Rgb8`], [`LabColor`] - range-validated
//!   color values with canonical string encodings
//! - [`ciede2000`] - the CIEDE2000 perceptual color difference, with
//!   intermediates exposed for ranking and debugging
//! - [`ColorConverter`] - the transform port the builder consumes; backed by
//!   an ICC profile (the `inkmap-icc` crate) or by [`NaiveConverter`]
//! - [`TableBuilder`] - detects quantization collisions and deterministically
//!   reassigns colliding entries to nearby but distinguishable values,
//!   minimizing perceptual drift
//! - [`RestorationTable`] - the structural inverse of a finished table,
//!   serializable as a sidecar JSON document
//!
//! # Example
//!
//! ```rust
//! use inkmap_core::{build_transformation_table, CmykColor, NaiveConverter};
//! use std::collections::BTreeSet;
//!
//! let colors: BTreeSet<_> = [
//!     CmykColor::new(0.0, 0.0, 0.0, 1.0),
//!     CmykColor::new(0.0, 0.0, 0.0, 0.999),
//! ]
//! .into();
//!
//! // Both inputs quantize to rgb(0,0,0); the builder keeps the closer one
//! // there and nudges the other to a distinguishable neighbor.
//! let table = build_transformation_table(&colors, &NaiveConverter::new()).unwrap();
//! let restore = table.invert();
//! for cmyk in &colors {
//!     assert_eq!(restore.get(table.get(cmyk).unwrap()), Some(*cmyk));
//! }
//! ```
//!
//! # Concurrency
//!
//! A batch is single-threaded and synchronous; it either returns an
//! injective table or fails with a fatal error. Independent batches may run
//! concurrently as long as each owns its converter; the crate holds no
//! process-wide mutable state.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod convert;
pub mod deltae;
pub mod error;
pub mod table;

pub use color::{CmykColor, CmykComponent, LabColor, Rgb8, RgbColor};
pub use convert::{ColorConverter, NaiveConverter};
pub use deltae::{ciede2000, ciede2000_weighted, DeltaE2000, KWeights};
pub use error::{Error, Result};
pub use table::{
    build_transformation_table, RestorationTable, TableBuilder, TransformationTable,
    DEFAULT_SEARCH_RADIUS,
};
