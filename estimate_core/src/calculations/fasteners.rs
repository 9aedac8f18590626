//! # Fasteners and Temporary Bracing
//!
//! Nails are bought by the box. Each nail category converts a pooled piece or
//! sheet count into nails with a fixed ratio, then divides by the box size:
//!
//! | Category        | Nails per unit         | Box size | Waste |
//! |-----------------|------------------------|----------|-------|
//! | Concrete nails  | 25 per PT plate piece  | 100      | 40%   |
//! | Sheathing nails | 80 per sheet           | 2700     | 40%   |
//! | Framing nails   | 25 per plate piece     | 2500     | 40%   |
//!
//! Temporary bracing is three 2x4x16 pieces per panel across the whole
//! project, shared evenly between levels.

use crate::catalog::CatalogItem;
use crate::parsing::{at_least_one, finite_or_zero};

use super::Row;

pub const CONCRETE_NAILS_PER_PT_PIECE: f64 = 25.0;
pub const CONCRETE_NAILS_PER_BOX: f64 = 100.0;
pub const SHEATHING_NAILS_PER_SHEET: f64 = 80.0;
pub const SHEATHING_NAILS_PER_BOX: f64 = 2700.0;
pub const FRAMING_NAILS_PER_PLATE_PIECE: f64 = 25.0;
pub const FRAMING_NAILS_PER_BOX: f64 = 2500.0;
pub const BRACES_PER_PANEL: f64 = 3.0;

/// Generic box-counted fastener.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxCountInput<'a> {
    /// Number of fasteners needed
    pub count: f64,
    /// Fasteners per box
    pub per_box: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Boxes: `count / max(1, per_box)`.
pub fn calc_box_count(input: &BoxCountInput) -> Row {
    let qty_raw = finite_or_zero(input.count) / at_least_one(input.per_box);
    Row::finalize(qty_raw, input.waste_pct, input.item, "box")
}

/// Concrete nails for PT plates: `(pt_pieces * 25) / 100` boxes.
pub fn calc_concrete_nails(pt_pieces: f64, waste_pct: f64, item: Option<&CatalogItem>) -> Row {
    calc_box_count(&BoxCountInput {
        count: finite_or_zero(pt_pieces) * CONCRETE_NAILS_PER_PT_PIECE,
        per_box: CONCRETE_NAILS_PER_BOX,
        waste_pct,
        item,
    })
}

/// Sheathing nails: `(sheets * 80) / 2700` boxes.
pub fn calc_sheathing_nails(total_sheets: f64, waste_pct: f64, item: Option<&CatalogItem>) -> Row {
    calc_box_count(&BoxCountInput {
        count: finite_or_zero(total_sheets) * SHEATHING_NAILS_PER_SHEET,
        per_box: SHEATHING_NAILS_PER_BOX,
        waste_pct,
        item,
    })
}

/// Framing nails for every plate piece, PT or not: `(pieces * 25) / 2500` boxes.
pub fn calc_framing_nails(plate_pieces: f64, waste_pct: f64, item: Option<&CatalogItem>) -> Row {
    calc_box_count(&BoxCountInput {
        count: finite_or_zero(plate_pieces) * FRAMING_NAILS_PER_PLATE_PIECE,
        per_box: FRAMING_NAILS_PER_BOX,
        waste_pct,
        item,
    })
}

/// One level's share of temporary bracing: `(all_panels * 3) / levels`, no waste.
pub fn calc_temporary_bracing(
    all_panels: f64,
    levels_count: usize,
    item: Option<&CatalogItem>,
) -> Row {
    let qty_raw = finite_or_zero(all_panels) * BRACES_PER_PANEL / at_least_one(levels_count as f64);
    Row::finalize(qty_raw, 0.0, item, "pcs")
}
