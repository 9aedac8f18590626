//! # Estimate Settings
//!
//! Project-wide defaults stored with the project file: panel length used for
//! panel counts, stock board lengths used when a size label carries no
//! length, top plate rows, and manufacture rates.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::settings::EstimateSettings;
//!
//! let settings = EstimateSettings::default();
//! assert_eq!(settings.panel_length_ft, 8.0);
//! assert!(settings.validate().is_ok());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::wall_group::{MaterialCategory, WallKind};

/// Project-wide calculation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateSettings {
    /// Length of one prefabricated panel in feet
    pub panel_length_ft: f64,

    /// Number of stacked top plates
    pub top_plate_rows: f64,

    /// Plate stock length when the size label has none
    pub plate_board_len_ft: f64,

    /// Blocking stock length when the size label has none
    pub blocking_board_len_ft: f64,

    /// Header stock length when neither the row nor the label gives one
    pub header_board_len_ft: f64,

    /// Project default waste per wall category; group overrides win
    pub default_waste: BTreeMap<MaterialCategory, f64>,

    /// Manufacture (shop labor) rates
    pub manufacture: ManufactureRates,
}

impl Default for EstimateSettings {
    fn default() -> Self {
        EstimateSettings {
            panel_length_ft: 8.0,
            top_plate_rows: 2.0,
            plate_board_len_ft: 16.0,
            blocking_board_len_ft: 16.0,
            header_board_len_ft: 12.0,
            default_waste: BTreeMap::new(),
            manufacture: ManufactureRates::default(),
        }
    }
}

impl EstimateSettings {
    /// Validate settings loaded from a file or config override.
    pub fn validate(&self) -> EstimateResult<()> {
        let positive = [
            ("panel_length_ft", self.panel_length_ft),
            ("plate_board_len_ft", self.plate_board_len_ft),
            ("blocking_board_len_ft", self.blocking_board_len_ft),
            ("header_board_len_ft", self.header_board_len_ft),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EstimateError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a positive length",
                ));
            }
        }
        if !self.top_plate_rows.is_finite() || self.top_plate_rows < 0.0 {
            return Err(EstimateError::invalid_input(
                "top_plate_rows",
                self.top_plate_rows.to_string(),
                "Top plate rows cannot be negative",
            ));
        }
        for (category, waste) in &self.default_waste {
            if !waste.is_finite() {
                return Err(EstimateError::invalid_input(
                    format!("default_waste.{}", category.display_name()),
                    waste.to_string(),
                    "Waste must be a number",
                ));
            }
        }
        self.manufacture.validate()
    }
}

/// Shop labor rates for the manufacture estimate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManufactureRates {
    /// Price per LF of exterior wall
    pub exterior_per_lf: f64,
    /// Price per LF of partition wall
    pub partition_per_lf: f64,
    /// Price per LF of bearing wall
    pub bearing_per_lf: f64,
    /// Price per LF of shear wall
    pub shear_per_lf: f64,
    /// Price per LF of knee wall
    pub knee_per_lf: f64,
    /// Handling price per panel
    pub per_panel: f64,
}

impl ManufactureRates {
    /// Rate per LF for a wall kind
    pub fn per_lf(&self, kind: WallKind) -> f64 {
        match kind {
            WallKind::Exterior => self.exterior_per_lf,
            WallKind::Partition => self.partition_per_lf,
            WallKind::Bearing => self.bearing_per_lf,
            WallKind::Shear => self.shear_per_lf,
            WallKind::Knee => self.knee_per_lf,
        }
    }

    fn validate(&self) -> EstimateResult<()> {
        let rates = [
            ("exterior_per_lf", self.exterior_per_lf),
            ("partition_per_lf", self.partition_per_lf),
            ("bearing_per_lf", self.bearing_per_lf),
            ("shear_per_lf", self.shear_per_lf),
            ("knee_per_lf", self.knee_per_lf),
            ("per_panel", self.per_panel),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimateError::invalid_input(
                    format!("manufacture.{field}"),
                    value.to_string(),
                    "Rates cannot be negative",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EstimateSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_panel_length() {
        let settings = EstimateSettings {
            panel_length_ft: 0.0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_rejects_negative_rate() {
        let mut settings = EstimateSettings::default();
        settings.manufacture.per_panel = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EstimateSettings =
            serde_json::from_str(r#"{"panel_length_ft": 10}"#).unwrap();
        assert_eq!(settings.panel_length_ft, 10.0);
        assert_eq!(settings.top_plate_rows, 2.0);
        assert_eq!(settings.manufacture, ManufactureRates::default());
    }

    #[test]
    fn test_default_waste_table() {
        let json = r#"{"default_waste": {"Sheathing": 15}}"#;
        let settings: EstimateSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.default_waste[&MaterialCategory::Sheathing], 15.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rate_per_kind() {
        let rates = ManufactureRates {
            exterior_per_lf: 4.0,
            shear_per_lf: 6.0,
            ..Default::default()
        };
        assert_eq!(rates.per_lf(WallKind::Exterior), 4.0);
        assert_eq!(rates.per_lf(WallKind::Shear), 6.0);
        assert_eq!(rates.per_lf(WallKind::Knee), 0.0);
    }
}
