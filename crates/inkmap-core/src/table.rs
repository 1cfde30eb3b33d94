//! Collision-free CMYK to RGB transformation tables.
//!
//! Common ICC transforms are many-to-one at 8-bit output precision:
//! distinct CMYK inputs quantize to the identical RGB triple, which would
//! make a later inverse lookup ambiguous. [`TableBuilder`] detects these
//! quantization collisions and deterministically reassigns colliding
//! entries to nearby but distinguishable values, ranked by CIEDE2000 so the
//! visible drift stays minimal. The finished [`TransformationTable`] is
//! injective, and [`TransformationTable::invert`] produces the
//! [`RestorationTable`] callers persist to recover the original device
//! colors from emitted RGB values exactly.

use crate::color::{CmykColor, LabColor, Rgb8};
use crate::convert::ColorConverter;
use crate::deltae::ciede2000;
use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Per-channel search radius for reassignment candidates.
///
/// Not derived from any bound on collision density; it is simply large
/// enough that exhaustion has never been observed for realistic batches.
/// Exhaustion remains a reported error, never an infinite loop.
pub const DEFAULT_SEARCH_RADIUS: u8 = 10;

/// An injective mapping from device CMYK colors to quantized RGB triples.
///
/// Produced only by [`TableBuilder::build`]; the injectivity invariant
/// holds for every table this type exposes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformationTable {
    map: BTreeMap<CmykColor, Rgb8>,
}

impl TransformationTable {
    /// Looks up the assigned RGB value for a CMYK color.
    pub fn get(&self, cmyk: &CmykColor) -> Option<Rgb8> {
        self.map.get(cmyk).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates entries in deterministic CMYK order.
    pub fn iter(&self) -> impl Iterator<Item = (&CmykColor, &Rgb8)> {
        self.map.iter()
    }

    /// Structurally inverts the table into an RGB-keyed restoration table.
    ///
    /// Well-defined because the table is injective; no entry can be lost.
    pub fn invert(&self) -> RestorationTable {
        RestorationTable {
            map: self.map.iter().map(|(&cmyk, &rgb)| (rgb, cmyk)).collect(),
        }
    }
}

/// The inverse of a [`TransformationTable`]: emitted RGB triple back to the
/// original device CMYK color.
///
/// Serializes to the sidecar format callers persist next to a converted
/// document: a JSON object keyed by the `"r,g,b"` string, valued by a
/// `[c, m, y, k]` array in [0, 1].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestorationTable {
    map: BTreeMap<Rgb8, CmykColor>,
}

impl RestorationTable {
    /// Looks up the original CMYK color for an emitted RGB value.
    pub fn get(&self, rgb: Rgb8) -> Option<CmykColor> {
        self.map.get(&rgb).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates entries in deterministic RGB order.
    pub fn iter(&self) -> impl Iterator<Item = (&Rgb8, &CmykColor)> {
        self.map.iter()
    }
}

impl Serialize for RestorationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.map.len()))?;
        for (rgb, cmyk) in &self.map {
            map.serialize_entry(&rgb.encode(), &cmyk.components())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RestorationTable {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, [f64; 4]>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (key, [c, m, y, k]) in raw {
            let rgb = Rgb8::decode(&key).map_err(D::Error::custom)?;
            map.insert(rgb, CmykColor::new(c, m, y, k));
        }
        Ok(Self { map })
    }
}

/// A colliding color's ranked reassignment sequence with a cursor.
///
/// The sequence is derived once, when the color first loses a collision:
/// every RGB triple within the search radius of the contested value, ranked
/// ascending by CIEDE2000 distance to the contested value's own Lab
/// appearance, with the contested value itself at index 0. Advancing moves
/// the cursor one entry forward. Owning the sequence and the cursor
/// together means the only way to desynchronize is external mutation of the
/// working table, which is checked on every advance.
struct CandidateWalk {
    candidates: Vec<Rgb8>,
    cursor: usize,
}

impl CandidateWalk {
    fn new<C>(shared: Rgb8, lab_shared: LabColor, radius: u8, converter: &C) -> Result<Self>
    where
        C: ColorConverter + ?Sized,
    {
        let mut scored = Vec::new();
        for r in channel_range(shared.r, radius) {
            for g in channel_range(shared.g, radius) {
                for b in channel_range(shared.b, radius) {
                    let candidate = Rgb8::new(r, g, b);
                    if candidate == shared {
                        continue;
                    }
                    let d = ciede2000(lab_shared, converter.rgb_to_lab(candidate))?.delta_e;
                    scored.push((d, candidate));
                }
            }
        }
        // Stable sort: ties keep channel-enumeration order, so builds are
        // reproducible.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut candidates = Vec::with_capacity(scored.len() + 1);
        candidates.push(shared);
        candidates.extend(scored.into_iter().map(|(_, c)| c));
        Ok(Self {
            candidates,
            cursor: 0,
        })
    }

    /// Steps to the next candidate, verifying the cursor still agrees with
    /// the working table's current assignment.
    fn advance(&mut self, cmyk: CmykColor, current: Rgb8) -> Result<Rgb8> {
        if self.candidates.get(self.cursor).copied() != Some(current) {
            return Err(Error::CandidateListDesync { cmyk });
        }
        self.cursor += 1;
        self.candidates
            .get(self.cursor)
            .copied()
            .ok_or(Error::CandidateExhaustion { cmyk })
    }
}

/// The clamped inclusive range of channel values within `radius` of
/// `center`. Clamping at 0 and 255 shrinks the range instead of producing
/// duplicates.
fn channel_range(center: u8, radius: u8) -> std::ops::RangeInclusive<u8> {
    center.saturating_sub(radius)..=center.saturating_add(radius)
}

/// Groups the working table by assigned RGB value and keeps only the
/// contested ones. Member vectors follow CMYK order.
fn collision_groups(map: &BTreeMap<CmykColor, Rgb8>) -> Vec<(Rgb8, Vec<CmykColor>)> {
    let mut by_rgb: BTreeMap<Rgb8, Vec<CmykColor>> = BTreeMap::new();
    for (&cmyk, &rgb) in map {
        by_rgb.entry(rgb).or_default().push(cmyk);
    }
    by_rgb
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .collect()
}

/// Builds injective CMYK to RGB tables.
///
/// # Example
///
/// ```rust
/// use inkmap_core::{CmykColor, NaiveConverter, TableBuilder};
/// use std::collections::BTreeSet;
///
/// let colors: BTreeSet<_> = [
///     CmykColor::new(0.0, 0.0, 0.0, 1.0),
///     CmykColor::new(0.0, 0.0, 0.0, 0.999),
/// ]
/// .into();
///
/// let table = TableBuilder::new()
///     .build(&colors, &NaiveConverter::new())
///     .unwrap();
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder {
    radius: u8,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Creates a builder with [`DEFAULT_SEARCH_RADIUS`].
    pub fn new() -> Self {
        Self {
            radius: DEFAULT_SEARCH_RADIUS,
        }
    }

    /// Overrides the per-channel candidate search radius.
    pub fn with_radius(mut self, radius: u8) -> Self {
        self.radius = radius;
        self
    }

    /// The configured search radius.
    pub fn radius(&self) -> u8 {
        self.radius
    }

    /// Builds the injective transformation table for a batch of distinct
    /// CMYK colors.
    ///
    /// Converts every input through the port, then resolves quantization
    /// collisions until no two inputs share an RGB value. Expect port calls
    /// proportional to batch size plus collision-resolution work.
    ///
    /// # Errors
    ///
    /// [`Error::CandidateExhaustion`] if a colliding color runs out of
    /// candidates within the search radius, and
    /// [`Error::CandidateListDesync`] if the working table is mutated out
    /// from under the resolution loop. Both abort the batch; no partially
    /// resolved table is ever returned.
    pub fn build<C>(
        &self,
        colors: &BTreeSet<CmykColor>,
        converter: &C,
    ) -> Result<TransformationTable>
    where
        C: ColorConverter + ?Sized,
    {
        // Raw pass: no ordering requirement among collision-free colors.
        let mut map: BTreeMap<CmykColor, Rgb8> = BTreeMap::new();
        for &cmyk in colors {
            map.insert(cmyk, converter.cmyk_to_rgb(cmyk).quantize());
        }
        debug!(colors = map.len(), "raw transformation table built");

        let mut walks: BTreeMap<CmykColor, CandidateWalk> = BTreeMap::new();
        let mut sweep = 0usize;
        loop {
            // Reassignments in the previous sweep may have collided with
            // previously clean entries, so the grouping is recomputed from
            // the full working table every time.
            let groups = collision_groups(&map);
            if groups.is_empty() {
                break;
            }
            sweep += 1;
            debug!(sweep, groups = groups.len(), "resolving quantization collisions");

            for (shared, members) in groups {
                let lab_shared = converter.rgb_to_lab(shared);

                // Rank members by how closely their true appearance matches
                // what the contested value looks like; the closest keeps it.
                let mut ranked = Vec::with_capacity(members.len());
                for cmyk in members {
                    let d = ciede2000(lab_shared, converter.cmyk_to_lab(cmyk))?.delta_e;
                    ranked.push((d, cmyk));
                }
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

                for &(_, loser) in &ranked[1..] {
                    let walk = match walks.entry(loser) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => entry.insert(CandidateWalk::new(
                            shared,
                            lab_shared,
                            self.radius,
                            converter,
                        )?),
                    };
                    let next = walk.advance(loser, shared)?;
                    trace!(cmyk = %loser, from = %shared, to = %next, "reassigned colliding color");
                    map.insert(loser, next);
                }
            }
        }
        debug!(sweeps = sweep, "transformation table is injective");

        Ok(TransformationTable { map })
    }
}

/// Builds a table with the default search radius.
///
/// Convenience wrapper around [`TableBuilder::build`].
pub fn build_transformation_table<C>(
    colors: &BTreeSet<CmykColor>,
    converter: &C,
) -> Result<TransformationTable>
where
    C: ColorConverter + ?Sized,
{
    TableBuilder::new().build(colors, converter)
}
