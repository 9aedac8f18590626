//! # Sheathing and Tape
//!
//! Sheets are 4x8 (32 sq ft). Tape is bought in rolls and rounded twice:
//! first to whole rolls, then again after waste is applied to that roll count.

use crate::catalog::CatalogItem;
use crate::parsing::{apply_waste, at_least_one, finite_or_zero};
use crate::units::{Feet, SqFt};

use super::Row;

/// ZIP flashing tape: one roll per this many sheets
pub const SHEETS_PER_TAPE_ROLL: f64 = 6.0;

/// Sheathing over a wall face.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheathingInput<'a> {
    /// Run length in linear feet
    pub length_lf: f64,
    /// Sheathed height in feet
    pub height_ft: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Sheathing: `(length_lf * height_ft) / 32` sheets.
pub fn calc_sheathing(input: &SheathingInput) -> Row {
    let area = SqFt::from_rect(
        Feet(finite_or_zero(input.length_lf)),
        Feet(finite_or_zero(input.height_ft)),
    );
    Row::finalize(area.sheets(), input.waste_pct, input.item, "sheet")
}

/// Seam tape.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapeInput<'a> {
    /// Seam length to cover, in linear feet
    pub seam_lf: f64,
    /// Roll length in feet
    pub roll_len_ft: f64,
    /// Waste in percent, applied to the rounded roll count
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Tape: `ceil(seam_lf / max(1, roll_len_ft))` rolls, then waste on the
/// rounded count.
///
/// ```rust
/// use estimate_core::calculations::sheathing::{calc_tape, TapeInput};
///
/// let row = calc_tape(&TapeInput {
///     seam_lf: 151.0,
///     roll_len_ft: 75.0,
///     waste_pct: 10.0,
///     item: None,
/// });
/// assert_eq!(row.qty_raw, 3.0);
/// assert_eq!(row.qty_final, 4);
/// ```
pub fn calc_tape(input: &TapeInput) -> Row {
    let rolls = finite_or_zero(input.seam_lf) / at_least_one(input.roll_len_ft);
    rolls_row(rolls, input.waste_pct, input.item)
}

/// ZIP flashing tape from a pooled sheet count: `ceil(sheets / 6)` rolls,
/// then waste on the rounded count.
pub fn calc_zip_flashing_tape(
    total_sheets: f64,
    waste_pct: f64,
    item: Option<&CatalogItem>,
) -> Row {
    let rolls = finite_or_zero(total_sheets) / SHEETS_PER_TAPE_ROLL;
    rolls_row(rolls, waste_pct, item)
}

fn rolls_row(rolls: f64, waste_pct: f64, item: Option<&CatalogItem>) -> Row {
    let rolls_base = rolls.ceil().max(0.0);
    Row::from_final(rolls_base, apply_waste(rolls_base, waste_pct), item, "roll")
}
