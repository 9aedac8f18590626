//! # Family Classifiers
//!
//! Boolean predicates over catalog family labels. Every predicate normalizes
//! its input with [`normalize_family_token`] first, so display labels and
//! already-normalized tokens classify the same way.
//!
//! The lumber and infill allow-lists are kept separate on purpose: infill
//! applies only to dimensional lumber headers, never to engineered lumber.

use crate::parsing::normalize_family_token;

/// Substrings (spaces removed) that mark general dimensional lumber
const LUMBER_MARKERS: &[&str] = &[
    "spf#2",
    "syp#1",
    "syp#2",
    "treated",
    "frt",
    "firerated",
    "douglasfir",
    "hemfir",
];

/// Substrings (spaces removed) that make a header contribute to the infill pool
const INFILL_MARKERS: &[&str] = &[
    "spf#2",
    "treated",
    "hemfir",
    "syp#1",
    "syp#2",
    "frt",
    "douglasfir",
];

fn compact(family: &str) -> String {
    normalize_family_token(family).replace(' ', "")
}

/// "PT" as its own word ("pt", "pt #2", "pt syp"), not inside another word
fn has_pt_word(family: &str) -> bool {
    normalize_family_token(family)
        .split_whitespace()
        .any(|word| word == "pt" || word.starts_with("pt#"))
}

/// Laminated veneer lumber
pub fn is_lvl(family: &str) -> bool {
    normalize_family_token(family).contains("lvl")
}

/// Versa-Lam style engineered columns
pub fn is_versa_column(family: &str) -> bool {
    normalize_family_token(family).contains("versa")
}

/// Pressure-treated lumber ("PT" or "treated")
pub fn is_pressure_treated(family: &str) -> bool {
    has_pt_word(family) || compact(family).contains("treated")
}

/// Dimensional lumber families (SPF, SYP, PT, FRT, Douglas fir, hem-fir)
pub fn is_lumber_family(family: &str) -> bool {
    let token = compact(family);
    has_pt_word(family) || LUMBER_MARKERS.iter().any(|m| token.contains(m))
}

/// Header families whose linear feet feed the headers-infill pool
pub fn is_infill_family(family: &str) -> bool {
    let token = compact(family);
    has_pt_word(family) || INFILL_MARKERS.iter().any(|m| token.contains(m))
}
