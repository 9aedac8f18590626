//! # Loose Materials
//!
//! Non-panelized material shipped loose to the site. Every category is a thin
//! specialization of a base calculator with its own default waste and input
//! wiring; the wiring itself (which level totals feed which row) lives in
//! [`crate::level`].

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

use super::framing::{calc_plates, PlatesInput};
use super::sheathing::{calc_sheathing, calc_zip_flashing_tape, SheathingInput};
use super::{Row, BAND_WASTE_PCT, DEFAULT_WASTE_PCT, INTERIOR_LOOSE_WASTE_PCT};

/// Panel band sheathing is always a 4 ft strip
pub const BAND_HEIGHT_FT: f64 = 4.0;

/// Loose material categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LooseCategory {
    PtBottomPlates,
    TopPlates,
    PanelBandSheathing,
    ExtraSheathing,
    OpeningsBlocking,
    SecondBottomPlate,
    Interior2x6Pt,
    Interior2x6,
    Interior2x4Pt,
    Interior2x4,
    CabinetBlocking,
    ZipFlashingTape,
}

impl LooseCategory {
    pub const ALL: [LooseCategory; 12] = [
        LooseCategory::PtBottomPlates,
        LooseCategory::TopPlates,
        LooseCategory::PanelBandSheathing,
        LooseCategory::ExtraSheathing,
        LooseCategory::OpeningsBlocking,
        LooseCategory::SecondBottomPlate,
        LooseCategory::Interior2x6Pt,
        LooseCategory::Interior2x6,
        LooseCategory::Interior2x4Pt,
        LooseCategory::Interior2x4,
        LooseCategory::CabinetBlocking,
        LooseCategory::ZipFlashingTape,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LooseCategory::PtBottomPlates => "PT bottom plates (loose)",
            LooseCategory::TopPlates => "Top plates (loose)",
            LooseCategory::PanelBandSheathing => "Panel band sheathing",
            LooseCategory::ExtraSheathing => "Extra sheathing",
            LooseCategory::OpeningsBlocking => "Openings blocking",
            LooseCategory::SecondBottomPlate => "Second bottom plate",
            LooseCategory::Interior2x6Pt => "Interior 2x6 PT plates",
            LooseCategory::Interior2x6 => "Interior 2x6 plates",
            LooseCategory::Interior2x4Pt => "Interior 2x4 PT plates",
            LooseCategory::Interior2x4 => "Interior 2x4 plates",
            LooseCategory::CabinetBlocking => "Cabinet blocking (bath/kitchen)",
            LooseCategory::ZipFlashingTape => "ZIP flashing tape",
        }
    }

    /// Waste applied when the user has not overridden it
    pub fn default_waste_pct(&self) -> f64 {
        match self {
            LooseCategory::PanelBandSheathing => BAND_WASTE_PCT,
            LooseCategory::Interior2x6Pt
            | LooseCategory::Interior2x6
            | LooseCategory::Interior2x4Pt
            | LooseCategory::Interior2x4 => INTERIOR_LOOSE_WASTE_PCT,
            LooseCategory::ZipFlashingTape => 0.0,
            _ => DEFAULT_WASTE_PCT,
        }
    }

    /// Optional rows are off until the user enables them
    pub fn is_optional(&self) -> bool {
        matches!(self, LooseCategory::ExtraSheathing | LooseCategory::SecondBottomPlate)
    }
}

/// Inputs for one loose row. Unused fields are ignored by the category.
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseInput<'a> {
    /// Linear feet feeding the row
    pub length_lf: f64,
    /// Sheathed height (extra sheathing only)
    pub height_ft: f64,
    /// Stock board length in feet
    pub board_len_ft: f64,
    /// Pooled sheet count (ZIP tape only)
    pub sheets: f64,
    /// Waste override; `None` uses the category default
    pub waste_pct: Option<f64>,
    /// Selected catalog item
    pub item: Option<&'a CatalogItem>,
}

/// Compute one loose row.
pub fn calc_loose(category: LooseCategory, input: &LooseInput) -> Row {
    let waste_pct = input.waste_pct.unwrap_or_else(|| category.default_waste_pct());
    match category {
        LooseCategory::PanelBandSheathing => calc_sheathing(&SheathingInput {
            length_lf: input.length_lf,
            height_ft: BAND_HEIGHT_FT,
            waste_pct,
            item: input.item,
        }),
        LooseCategory::ExtraSheathing => calc_sheathing(&SheathingInput {
            length_lf: input.length_lf,
            height_ft: input.height_ft,
            waste_pct,
            item: input.item,
        }),
        LooseCategory::ZipFlashingTape => {
            calc_zip_flashing_tape(input.sheets, waste_pct, input.item)
        }
        _ => calc_plates(&PlatesInput {
            length_lf: input.length_lf,
            board_len_ft: input.board_len_ft,
            waste_pct,
            item: input.item,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wastes() {
        assert_eq!(LooseCategory::PtBottomPlates.default_waste_pct(), 10.0);
        assert_eq!(LooseCategory::PanelBandSheathing.default_waste_pct(), 20.0);
        assert_eq!(LooseCategory::Interior2x4Pt.default_waste_pct(), 5.0);
        assert_eq!(LooseCategory::CabinetBlocking.default_waste_pct(), 10.0);
    }

    #[test]
    fn test_band_height_is_fixed() {
        let row = calc_loose(
            LooseCategory::PanelBandSheathing,
            &LooseInput {
                length_lf: 80.0,
                height_ft: 12.0,
                ..Default::default()
            },
        );
        // 80 * 4 / 32 = 10 sheets, 20% waste
        assert_eq!(row.qty_raw, 10.0);
        assert_eq!(row.qty_final, 12);
    }

    #[test]
    fn test_extra_sheathing_uses_height() {
        let row = calc_loose(
            LooseCategory::ExtraSheathing,
            &LooseInput {
                length_lf: 32.0,
                height_ft: 8.0,
                waste_pct: Some(0.0),
                ..Default::default()
            },
        );
        assert_eq!(row.qty_final, 8);
    }

    #[test]
    fn test_plate_categories_divide_by_board_length() {
        let row = calc_loose(
            LooseCategory::Interior2x6,
            &LooseInput {
                length_lf: 160.0,
                board_len_ft: 16.0,
                ..Default::default()
            },
        );
        assert_eq!(row.qty_raw, 10.0);
        assert_eq!(row.qty_final, 11);
    }

    #[test]
    fn test_zip_tape_reads_sheets() {
        let row = calc_loose(
            LooseCategory::ZipFlashingTape,
            &LooseInput {
                length_lf: 1000.0,
                sheets: 12.0,
                ..Default::default()
            },
        );
        assert_eq!(row.qty_final, 2);
        assert_eq!(row.unit, "roll");
    }

    #[test]
    fn test_optional_flags() {
        assert!(LooseCategory::SecondBottomPlate.is_optional());
        assert!(LooseCategory::ExtraSheathing.is_optional());
        assert!(!LooseCategory::TopPlates.is_optional());
    }
}
