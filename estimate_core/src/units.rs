//! # Unit Types
//!
//! Lightweight newtype wrappers for the handful of units the takeoff math
//! converts between. They serialize as bare numbers.
//!
//! - Length: feet (ft, also "LF" when measured along a wall), inches (in)
//! - Area: square feet (sq ft), and 4x8 sheets of 32 sq ft
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{Feet, Inches, SqFt};
//!
//! let run = Feet(10.0);
//! let run_in: Inches = run.into();
//! assert_eq!(run_in.0, 120.0);
//!
//! let wall = SqFt::from_rect(Feet(32.0), Feet(8.0));
//! assert_eq!(wall.sheets(), 8.0);
//! ```

use serde::{Deserialize, Serialize};

/// Area of one 4x8 sheathing sheet
pub const SHEET_AREA_SQFT: f64 = 32.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * 12.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

impl SqFt {
    /// Area of a rectangle (e.g. a wall face)
    pub fn from_rect(length: Feet, height: Feet) -> Self {
        SqFt(length.0 * height.0)
    }

    /// Fractional number of 4x8 sheets covering this area
    pub fn sheets(self) -> f64 {
        self.0 / SHEET_AREA_SQFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_to_inches() {
        let inches: Inches = Feet(10.0).into();
        assert_eq!(inches.0, 120.0);
    }

    #[test]
    fn test_sheet_area() {
        assert_eq!(SqFt::from_rect(Feet(32.0), Feet(8.0)).sheets(), 8.0);
        assert_eq!(SqFt(16.0).sheets(), 0.5);
    }

    #[test]
    fn test_serialization() {
        let ft = Feet(12.5);
        let json = serde_json::to_string(&ft).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Feet = serde_json::from_str(&json).unwrap();
        assert_eq!(ft, roundtrip);
    }
}
