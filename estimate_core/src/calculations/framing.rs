//! # Framing Calculators
//!
//! Plates, studs, blocking, headers, posts and headers infill.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculations::framing::{calc_studs, StudsInput};
//!
//! let row = calc_studs(&StudsInput {
//!     length_lf: 10.0,
//!     spacing_in: 16.0,
//!     multiplier: 1.0,
//!     ..Default::default()
//! });
//! // floor(120 / 16) + 1 end stud
//! assert_eq!(row.qty_final, 8);
//! ```

use crate::catalog::CatalogItem;
use crate::families::{is_lvl, is_versa_column};
use crate::parsing::{at_least_one, finite_or_zero};
use crate::units::{Feet, Inches, SHEET_AREA_SQFT};

use super::Row;

/// Nominal infill height per header run, in feet
pub const INFILL_HEIGHT_FT: f64 = 3.0;
/// Infill covers both wall faces
pub const INFILL_FACES: f64 = 2.0;
/// One row of blocking per this many feet of wall height
pub const BLOCKING_ROW_SPACING_FT: f64 = 4.0;

/// Bottom or top plates along a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatesInput<'a> {
    /// Run length in linear feet
    pub length_lf: f64,
    /// Stock board length in feet
    pub board_len_ft: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Plates: `length_lf / max(1, board_len_ft)` pieces.
pub fn calc_plates(input: &PlatesInput) -> Row {
    let qty_raw = finite_or_zero(input.length_lf) / at_least_one(input.board_len_ft);
    Row::finalize(qty_raw, input.waste_pct, input.item, "pcs")
}

/// Studs along a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudsInput<'a> {
    /// Run length in linear feet
    pub length_lf: f64,
    /// On-center spacing in inches
    pub spacing_in: f64,
    /// Studs per location (2 = doubled), applied to the whole run
    pub multiplier: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Studs: `(floor(length_in / max(1, spacing)) + 1) * max(1, multiplier)`.
///
/// The `+ 1` is the end stud.
pub fn calc_studs(input: &StudsInput) -> Row {
    let run: Inches = Feet(finite_or_zero(input.length_lf)).into();
    let studs_along = (run.0 / at_least_one(input.spacing_in)).floor() + 1.0;
    let qty_raw = studs_along * at_least_one(input.multiplier);
    Row::finalize(qty_raw, input.waste_pct, input.item, "pcs")
}

/// Horizontal blocking rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingInput<'a> {
    /// Run length in linear feet
    pub length_lf: f64,
    /// Wall height in feet
    pub height_ft: f64,
    /// Stock board length in feet
    pub board_len_ft: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Number of blocking rows for a wall height: `ceil(h / 4 - 1)`, never negative.
pub fn blocking_rows(height_ft: f64) -> f64 {
    (finite_or_zero(height_ft) / BLOCKING_ROW_SPACING_FT - 1.0).ceil().max(0.0)
}

/// Blocking: `length_lf / max(1, board_len_ft)` pieces per row, times the row count.
pub fn calc_blocking(input: &BlockingInput) -> Row {
    let per_row = finite_or_zero(input.length_lf) / at_least_one(input.board_len_ft);
    let qty_raw = per_row * blocking_rows(input.height_ft);
    Row::finalize(qty_raw, input.waste_pct, input.item, "pcs")
}

/// A header over an opening run.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderInput<'a> {
    /// Family label; LVL switches to linear-foot mode
    pub family: &'a str,
    /// Header linear feet (lumber mode)
    pub header_lf: f64,
    /// Stock board length in feet (lumber mode)
    pub board_len_ft: f64,
    /// LVL piece count (LVL mode)
    pub lvl_pieces: f64,
    /// LVL piece length in feet (LVL mode)
    pub lvl_length_ft: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Header: LVL is bought by the foot (`lvl_pieces * lvl_length_ft`, "lf"),
/// dimensional lumber by the piece (`header_lf / max(1, board_len_ft)`, "pcs").
pub fn calc_header(input: &HeaderInput) -> Row {
    if is_lvl(input.family) {
        let qty_raw = finite_or_zero(input.lvl_pieces) * finite_or_zero(input.lvl_length_ft);
        Row::finalize_with_unit(qty_raw, input.waste_pct, input.item, "lf")
    } else {
        let qty_raw = finite_or_zero(input.header_lf) / at_least_one(input.board_len_ft);
        Row::finalize_with_unit(qty_raw, input.waste_pct, input.item, "pcs")
    }
}

/// Posts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostInput<'a> {
    /// Family label; LVL or Versa switches to linear-foot mode
    pub family: &'a str,
    /// Piece count (linear mode)
    pub pieces: f64,
    /// Post height in feet (linear mode)
    pub height_ft: f64,
    /// Plies per post (lumber mode)
    pub pieces_per_post: f64,
    /// Number of posts (lumber mode)
    pub num_posts: f64,
    /// Waste in percent
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Post: engineered columns by the foot (`pieces * height_ft`), lumber by the
/// piece (`pieces_per_post * num_posts`).
pub fn calc_post(input: &PostInput) -> Row {
    if is_lvl(input.family) || is_versa_column(input.family) {
        let qty_raw = finite_or_zero(input.pieces) * finite_or_zero(input.height_ft);
        Row::finalize_with_unit(qty_raw, input.waste_pct, input.item, "lf")
    } else {
        let qty_raw = finite_or_zero(input.pieces_per_post) * finite_or_zero(input.num_posts);
        Row::finalize_with_unit(qty_raw, input.waste_pct, input.item, "pcs")
    }
}

/// Infill sheets behind dimensional lumber headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadersInfillInput<'a> {
    /// Pooled header linear feet of infill-eligible families
    pub header_lf_pool: f64,
    /// Waste in percent (5 by default)
    pub waste_pct: f64,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Headers infill: `(pool / 3 / 32) * 2` sheets.
pub fn calc_headers_infill(input: &HeadersInfillInput) -> Row {
    let qty_raw =
        finite_or_zero(input.header_lf_pool) / INFILL_HEIGHT_FT / SHEET_AREA_SQFT * INFILL_FACES;
    Row::finalize(qty_raw, input.waste_pct, input.item, "sheet")
}
