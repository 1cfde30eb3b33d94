//! End-to-end batch conversion and restoration.
//!
//! Drives the public API the way a style-sheet converter would: collect the
//! distinct device colors of a document, build the table, rewrite (not
//! modeled here), persist the restoration sidecar, and later recover every
//! original color from its emitted RGB value.

use inkmap_core::{
    build_transformation_table, CmykColor, CmykComponent, NaiveConverter, RestorationTable,
};
use std::collections::BTreeSet;

/// A plausible document: brand colors, a gray ramp, and a cluster of deep
/// blacks dense enough to collide after quantization.
fn document_colors() -> BTreeSet<CmykColor> {
    let mut colors = BTreeSet::new();

    colors.insert(CmykColor::from_components([
        CmykComponent::Percentage(100.0),
        CmykComponent::Number(0.1),
        CmykComponent::None,
        CmykComponent::Number(0.05),
    ]));
    colors.insert(CmykColor::new(0.0, 0.85, 0.9, 0.0));
    colors.insert(CmykColor::new(0.2, 0.0, 0.95, 0.0));

    for i in 0..20 {
        let g = f64::from(i) / 20.0;
        colors.insert(CmykColor::new(0.0, 0.0, 0.0, g));
    }

    // 255 * (1 - k) spans less than 3 RGB steps here, so these ten blacks
    // fight over two or three triples.
    for i in 0..10 {
        colors.insert(CmykColor::new(0.0, 0.0, 0.0, 0.99 + f64::from(i) * 0.001));
    }

    colors
}

#[test]
fn every_document_color_restores_exactly() {
    let colors = document_colors();
    let table = build_transformation_table(&colors, &NaiveConverter::new()).unwrap();

    assert_eq!(table.len(), colors.len());

    // Injective: as many distinct RGB values as entries.
    let assigned: BTreeSet<_> = table.iter().map(|(_, &rgb)| rgb).collect();
    assert_eq!(assigned.len(), table.len());

    let restore = table.invert();
    for cmyk in &colors {
        let rgb = table.get(cmyk).expect("every input has an assignment");
        assert_eq!(restore.get(rgb), Some(*cmyk));
    }
}

#[test]
fn sidecar_survives_persistence() {
    let colors = document_colors();
    let table = build_transformation_table(&colors, &NaiveConverter::new()).unwrap();
    let restore = table.invert();

    // What the external layer writes next to the converted document.
    let sidecar = serde_json::to_string_pretty(&restore).unwrap();
    let reloaded: RestorationTable = serde_json::from_str(&sidecar).unwrap();

    assert_eq!(reloaded, restore);
    for (rgb, cmyk) in restore.iter() {
        assert_eq!(reloaded.get(*rgb), Some(*cmyk));
    }
}

#[test]
fn rebuilding_the_same_batch_is_reproducible() {
    let colors = document_colors();
    let first = build_transformation_table(&colors, &NaiveConverter::new()).unwrap();
    let second = build_transformation_table(&colors, &NaiveConverter::new()).unwrap();
    assert_eq!(first, second);
}
