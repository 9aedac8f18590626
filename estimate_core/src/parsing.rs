//! # Parsing and Rounding Utilities
//!
//! Small pure helpers shared by every calculator:
//!
//! - [`parse_board_length_ft`] - board length from a catalog size label
//! - [`normalize_family_token`] - join key for family matching
//! - [`apply_waste`] - waste inflation and round-up to whole purchase units
//! - [`finite_or_zero`] / [`at_least_one`] - the numeric coercion and
//!   divide-by-zero clamp used at every call site
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::parsing::{apply_waste, parse_board_length_ft};
//!
//! assert_eq!(parse_board_length_ft("2x4-16'"), Some(16.0));
//! assert_eq!(apply_waste(100.0 / 12.0, 10.0), 10);
//! ```

/// Parse a board length in feet from the trailing digits of a size label.
///
/// Trailing non-digit characters (a foot mark, whitespace) are skipped, then
/// the contiguous run of digits before them is returned. This is a naive scan:
/// `"2x4"` yields `4`, so callers must supply labels that end in a length.
pub fn parse_board_length_ft(size_label: &str) -> Option<f64> {
    let trimmed = size_label.trim_end_matches(|c: char| !c.is_ascii_digit());
    let run = trimmed.chars().rev().take_while(char::is_ascii_digit).count();
    if run == 0 {
        return None;
    }
    // ASCII digits are one byte each
    trimmed[trimmed.len() - run..].parse().ok()
}

/// Lowercase a family label and keep only `[a-z0-9# ]`, trimmed.
pub fn normalize_family_token(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '#' || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Inflate a raw quantity by a waste percentage and round up.
///
/// `ceil(qty_raw * (1 + waste_pct / 100))`. A non-finite waste counts as 0.
/// Negative waste is allowed and shrinks the quantity; results never go
/// below zero and non-finite products finalize to zero.
pub fn apply_waste(qty_raw: f64, waste_pct: f64) -> u64 {
    let inflated = qty_raw * (1.0 + finite_or_zero(waste_pct) / 100.0);
    if !inflated.is_finite() || inflated <= 0.0 {
        return 0;
    }
    inflated.ceil() as u64
}

/// Coerce NaN and infinities to zero.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Denominator clamp: never divide by less than one.
#[inline]
pub fn at_least_one(value: f64) -> f64 {
    finite_or_zero(value).max(1.0)
}
