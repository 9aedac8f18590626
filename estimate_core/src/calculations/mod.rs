//! # Quantity Calculators
//!
//! Pure functions that turn wall geometry plus an optional catalog item into
//! a purchasable [`Row`]. Each calculator follows the pattern:
//!
//! - `*Input` - geometry, waste and an optional `&CatalogItem`
//! - `calc_*(&input) -> Row` - never fails; degenerate input degrades to zero
//!
//! Every row is finalized the same way:
//!
//! ```text
//! qty_final = ceil(qty_raw * (1 + waste_pct / 100))
//! subtotal  = qty_final * unit_price
//! ```
//!
//! Quantities never depend on pricing: an absent item still yields the full
//! quantity with a zero unit price and subtotal.
//!
//! ## Modules
//!
//! - [`framing`] - plates, studs, blocking, headers, posts, headers infill
//! - [`sheathing`] - sheets and seam tape
//! - [`fasteners`] - box-counted nails and temporary bracing
//! - [`loose`] - loose (non-panelized) material categories

pub mod fasteners;
pub mod framing;
pub mod loose;
pub mod sheathing;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{unit_price_from, CatalogItem};
use crate::parsing::{apply_waste, finite_or_zero};

pub use fasteners::{
    calc_box_count, calc_concrete_nails, calc_framing_nails, calc_sheathing_nails,
    calc_temporary_bracing, BoxCountInput,
};
pub use framing::{
    calc_blocking, calc_header, calc_headers_infill, calc_plates, calc_post, calc_studs,
    BlockingInput, HeaderInput, HeadersInfillInput, PlatesInput, PostInput, StudsInput,
};
pub use loose::{calc_loose, LooseCategory, LooseInput};
pub use sheathing::{calc_sheathing, calc_tape, calc_zip_flashing_tape, SheathingInput, TapeInput};

/// Default waste for most categories
pub const DEFAULT_WASTE_PCT: f64 = 10.0;
/// Default waste for the headers-infill row
pub const INFILL_WASTE_PCT: f64 = 5.0;
/// Default waste for panel-band sheathing
pub const BAND_WASTE_PCT: f64 = 20.0;
/// Default waste for interior plates shipped loose
pub const INTERIOR_LOOSE_WASTE_PCT: f64 = 5.0;
/// Default waste for boxed nails
pub const NAIL_WASTE_PCT: f64 = 40.0;

/// One computed material row.
///
/// ## JSON Example
///
/// ```json
/// {
///   "qty_raw": 8.333,
///   "qty_final": 10,
///   "unit": "pcs",
///   "unit_price": 5.0,
///   "subtotal": 50.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Quantity before waste
    pub qty_raw: f64,

    /// Purchasable quantity after waste, rounded up
    pub qty_final: u64,

    /// Purchase unit
    pub unit: String,

    /// Unit price (0 when no priced item is selected)
    pub unit_price: f64,

    /// `qty_final * unit_price`; `qty_raw * unit_price` for rate rows
    pub subtotal: f64,
}

impl Row {
    /// Finalize a raw quantity: apply waste, price against the item.
    ///
    /// The unit comes from the item when it names one, else `default_unit`.
    pub fn finalize(
        qty_raw: f64,
        waste_pct: f64,
        item: Option<&CatalogItem>,
        default_unit: &str,
    ) -> Self {
        let unit = item
            .map(|i| i.unit.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or(default_unit);
        Self::finalize_with_unit(qty_raw, waste_pct, item, unit)
    }

    /// Finalize with a fixed unit regardless of the item's own unit.
    pub fn finalize_with_unit(
        qty_raw: f64,
        waste_pct: f64,
        item: Option<&CatalogItem>,
        unit: &str,
    ) -> Self {
        let qty_raw = finite_or_zero(qty_raw);
        Self::from_final(qty_raw, apply_waste(qty_raw, waste_pct), item, unit)
    }

    /// Build a row from an already-final quantity.
    pub(crate) fn from_final(
        qty_raw: f64,
        qty_final: u64,
        item: Option<&CatalogItem>,
        unit: &str,
    ) -> Self {
        let unit_price = unit_price_from(item);
        Row {
            qty_raw,
            qty_final,
            unit: unit.to_string(),
            unit_price,
            subtotal: qty_final as f64 * unit_price,
        }
    }

    /// A row priced at a flat rate instead of a catalog item.
    ///
    /// Labor has no purchase unit, so the subtotal is charged on the exact
    /// quantity. `qty_final` is only the rounded-up count for display.
    pub fn at_rate(qty_raw: f64, unit: &str, rate: f64) -> Self {
        let qty_raw = finite_or_zero(qty_raw);
        let unit_price = finite_or_zero(rate);
        Row {
            qty_raw,
            qty_final: apply_waste(qty_raw, 0.0),
            unit: unit.to_string(),
            unit_price,
            subtotal: qty_raw * unit_price,
        }
    }
}

/// A labelled row as shown in a section listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display label
    pub label: String,

    /// Id of the source row when it has one (extras, panel nails)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Computed row
    pub row: Row,
}

impl LineItem {
    pub fn new(label: impl Into<String>, row: Row) -> Self {
        LineItem {
            label: label.into(),
            id: None,
            row,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

/// Sum of row subtotals
pub fn sum_subtotals<'a>(rows: impl IntoIterator<Item = &'a Row>) -> f64 {
    rows.into_iter().map(|r| r.subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_prices_rows() {
        let item = CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_supplier_price(5.0, 0.0);
        let row = Row::finalize(100.0 / 12.0, 10.0, Some(&item), "pcs");
        assert_eq!(row.qty_final, 10);
        assert_eq!(row.unit_price, 5.0);
        assert_eq!(row.subtotal, 50.0);
    }

    #[test]
    fn test_finalize_without_item_keeps_quantity() {
        let priced = CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_price(4.0);
        let with_item = Row::finalize(12.4, 10.0, Some(&priced), "pcs");
        let without = Row::finalize(12.4, 10.0, None, "pcs");
        assert_eq!(with_item.qty_final, without.qty_final);
        assert_eq!(without.unit_price, 0.0);
        assert_eq!(without.subtotal, 0.0);
    }

    #[test]
    fn test_unit_falls_back_to_default() {
        let blank = CatalogItem::new("ZIP", "4x8", "  ");
        assert_eq!(Row::finalize(1.0, 0.0, Some(&blank), "sheet").unit, "sheet");
        let boxed = CatalogItem::new("Nails", "2700ct", "box");
        assert_eq!(Row::finalize(1.0, 0.0, Some(&boxed), "pcs").unit, "box");
    }

    #[test]
    fn test_nan_raw_quantity_finalizes_to_zero() {
        let row = Row::finalize(f64::NAN, 10.0, None, "pcs");
        assert_eq!(row.qty_raw, 0.0);
        assert_eq!(row.qty_final, 0);
    }

    #[test]
    fn test_at_rate() {
        // Fractional LF is charged exactly, not rounded up
        let row = Row::at_rate(120.5, "lf", 2.0);
        assert_eq!(row.qty_final, 121);
        assert_eq!(row.subtotal, 241.0);
        assert_eq!(Row::at_rate(10.0, "lf", f64::NAN).subtotal, 0.0);
    }

    fn every_calculator(item: Option<&CatalogItem>) -> Vec<(&'static str, Row)> {
        let mut rows = vec![
            (
                "plates",
                calc_plates(&PlatesInput {
                    length_lf: 37.0,
                    board_len_ft: 16.0,
                    waste_pct: 10.0,
                    item,
                }),
            ),
            (
                "studs",
                calc_studs(&StudsInput {
                    length_lf: 37.0,
                    spacing_in: 16.0,
                    multiplier: 1.0,
                    waste_pct: 10.0,
                    item,
                }),
            ),
            (
                "blocking",
                calc_blocking(&BlockingInput {
                    length_lf: 37.0,
                    height_ft: 9.0,
                    board_len_ft: 16.0,
                    waste_pct: 10.0,
                    item,
                }),
            ),
            (
                "sheathing",
                calc_sheathing(&SheathingInput {
                    length_lf: 37.0,
                    height_ft: 9.0,
                    waste_pct: 10.0,
                    item,
                }),
            ),
            (
                "header",
                calc_header(&HeaderInput {
                    family: "SPF #2",
                    header_lf: 30.0,
                    board_len_ft: 12.0,
                    waste_pct: 10.0,
                    item,
                    ..Default::default()
                }),
            ),
            (
                "lvl header",
                calc_header(&HeaderInput {
                    family: "LVL",
                    lvl_pieces: 3.0,
                    lvl_length_ft: 11.5,
                    waste_pct: 10.0,
                    item,
                    ..Default::default()
                }),
            ),
            (
                "post",
                calc_post(&PostInput {
                    family: "SPF #2",
                    pieces_per_post: 3.0,
                    num_posts: 4.0,
                    waste_pct: 10.0,
                    item,
                    ..Default::default()
                }),
            ),
            (
                "headers infill",
                calc_headers_infill(&HeadersInfillInput {
                    header_lf_pool: 100.0,
                    waste_pct: 5.0,
                    item,
                }),
            ),
            (
                "tape",
                calc_tape(&TapeInput {
                    seam_lf: 151.0,
                    roll_len_ft: 75.0,
                    waste_pct: 10.0,
                    item,
                }),
            ),
            ("zip tape", calc_zip_flashing_tape(40.0, 10.0, item)),
            (
                "box count",
                calc_box_count(&BoxCountInput {
                    count: 250.0,
                    per_box: 100.0,
                    waste_pct: 40.0,
                    item,
                }),
            ),
            ("concrete nails", calc_concrete_nails(14.0, 40.0, item)),
            ("sheathing nails", calc_sheathing_nails(60.0, 40.0, item)),
            ("framing nails", calc_framing_nails(30.0, 40.0, item)),
            ("bracing", calc_temporary_bracing(17.0, 2, item)),
        ];
        for category in LooseCategory::ALL {
            let input = LooseInput {
                length_lf: 37.0,
                height_ft: 9.0,
                board_len_ft: 16.0,
                sheets: 40.0,
                waste_pct: None,
                item,
            };
            rows.push((category.display_name(), calc_loose(category, &input)));
        }
        rows
    }

    #[test]
    fn test_quantities_do_not_depend_on_pricing() {
        let item = CatalogItem::new("Any", "Any", "ea").with_price(7.25);
        let priced = every_calculator(Some(&item));
        let unpriced = every_calculator(None);
        assert_eq!(priced.len(), unpriced.len());

        for ((name, with_item), (_, without)) in priced.iter().zip(&unpriced) {
            assert!(with_item.qty_final > 0, "{name} should produce a quantity");
            assert_eq!(with_item.qty_raw, without.qty_raw, "{name}");
            assert_eq!(with_item.qty_final, without.qty_final, "{name}");
            assert_eq!(with_item.subtotal, with_item.qty_final as f64 * 7.25, "{name}");
            assert_eq!(without.unit_price, 0.0, "{name}");
            assert_eq!(without.subtotal, 0.0, "{name}");
        }
    }

    #[test]
    fn test_sum_subtotals() {
        let item = CatalogItem::new("X", "Y", "pcs").with_price(2.0);
        let rows = [
            Row::finalize(3.0, 0.0, Some(&item), "pcs"),
            Row::finalize(4.0, 0.0, Some(&item), "pcs"),
        ];
        assert_eq!(sum_subtotals(&rows), 14.0);
    }
}
