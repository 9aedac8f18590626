//! # Catalog Items
//!
//! A [`CatalogItem`] is a priced, purchasable SKU resolved by the catalog
//! service (vendor + family + size). The engine only reads it: the unit is
//! copied onto computed rows and the unit price is derived by
//! [`CatalogItem::unit_price`].
//!
//! ## Price Precedence
//!
//! 1. `base_price * (1 + markup_pct / 100)` when both are present
//! 2. otherwise `price_with_markup` when present
//! 3. otherwise `0`
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::catalog::CatalogItem;
//!
//! let item = CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_supplier_price(5.0, 20.0);
//! assert_eq!(item.unit_price(), 6.0);
//! ```
//!
//! [`Catalog`] is an explicit read-only lookup table keyed by
//! vendor, normalized family and size. It is passed in by the caller; the
//! engine never holds a global catalog.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::parsing::{normalize_family_token, parse_board_length_ft};

/// A priced catalog SKU.
///
/// ## JSON Example
///
/// ```json
/// {
///   "vendor": "Acme Lumber",
///   "family_label": "SPF #2",
///   "size_label": "2x4-16'",
///   "unit": "pcs",
///   "base_price": 5.25,
///   "markup_pct": 18.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Vendor name (catalog key, not used by the math)
    #[serde(default)]
    pub vendor: String,

    /// Family display label (e.g. "SPF #2", "LVL 2.0E")
    #[serde(default)]
    pub family_label: String,

    /// Size display label (e.g. "2x4-16'")
    #[serde(default)]
    pub size_label: String,

    /// Purchase unit ("pcs", "sheet", "lf", "box", "roll")
    #[serde(default)]
    pub unit: String,

    /// Supplier price before markup
    #[serde(default, alias = "supplier_price")]
    pub base_price: Option<f64>,

    /// Markup in percent
    #[serde(default)]
    pub markup_pct: Option<f64>,

    /// Flat price including markup, used when supplier + markup is incomplete
    #[serde(default)]
    pub price_with_markup: Option<f64>,
}

impl CatalogItem {
    /// Create an unpriced item
    pub fn new(
        family_label: impl Into<String>,
        size_label: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        CatalogItem {
            family_label: family_label.into(),
            size_label: size_label.into(),
            unit: unit.into(),
            ..Default::default()
        }
    }

    /// Set the vendor
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Set supplier price and markup percent
    pub fn with_supplier_price(mut self, base_price: f64, markup_pct: f64) -> Self {
        self.base_price = Some(base_price);
        self.markup_pct = Some(markup_pct);
        self
    }

    /// Set a flat price including markup
    pub fn with_price(mut self, price_with_markup: f64) -> Self {
        self.price_with_markup = Some(price_with_markup);
        self
    }

    /// Unit price per the precedence rule. Non-finite prices count as absent.
    pub fn unit_price(&self) -> f64 {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        match (finite(self.base_price), finite(self.markup_pct)) {
            (Some(base), Some(markup)) => base * (1.0 + markup / 100.0),
            _ => finite(self.price_with_markup).unwrap_or(0.0),
        }
    }

    /// Board length parsed from the size label
    pub fn board_length_ft(&self) -> Option<f64> {
        parse_board_length_ft(&self.size_label)
    }

    /// Normalized family join key
    pub fn family_token(&self) -> String {
        normalize_family_token(&self.family_label)
    }
}

/// Unit price of an optional item; an absent item prices at zero.
pub fn unit_price_from(item: Option<&CatalogItem>) -> f64 {
    item.map_or(0.0, CatalogItem::unit_price)
}

type CatalogKey = (String, String, String);

/// Read-only catalog lookup table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<CatalogKey, CatalogItem>,
}

impl Catalog {
    /// Build a table from items. Later duplicates of the same key win.
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (Self::key(&item.vendor, &item.family_label, &item.size_label), item))
            .collect();
        Catalog { items }
    }

    /// Parse a JSON array of items.
    pub fn from_json(json: &str) -> EstimateResult<Self> {
        let items: Vec<CatalogItem> =
            serde_json::from_str(json).map_err(|e| EstimateError::serialization(e.to_string()))?;
        Ok(Self::from_items(items))
    }

    fn key(vendor: &str, family: &str, size: &str) -> CatalogKey {
        (
            vendor.trim().to_string(),
            normalize_family_token(family),
            size.trim().to_string(),
        )
    }

    /// Number of items in the table
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the table holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item. Family matching goes through [`normalize_family_token`].
    pub fn get(&self, vendor: &str, family: &str, size: &str) -> Option<&CatalogItem> {
        self.items.get(&Self::key(vendor, family, size))
    }

    /// Like [`Catalog::get`] but missing keys are an error.
    pub fn require(&self, vendor: &str, family: &str, size: &str) -> EstimateResult<&CatalogItem> {
        self.get(vendor, family, size)
            .ok_or_else(|| EstimateError::catalog_item_not_found(vendor, family, size))
    }

    /// Distinct vendor names, sorted
    pub fn vendors(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.items.keys().map(|(v, _, _)| v.as_str()).collect();
        set.into_iter().collect()
    }

    /// Distinct family labels offered by a vendor, sorted by join key
    pub fn families(&self, vendor: &str) -> Vec<&str> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for ((v, token, _), item) in &self.items {
            if v == vendor.trim() {
                seen.entry(token.as_str()).or_insert(item.family_label.as_str());
            }
        }
        seen.into_values().collect()
    }

    /// Sizes offered by a vendor for a family
    pub fn sizes(&self, vendor: &str, family: &str) -> Vec<&CatalogItem> {
        let token = normalize_family_token(family);
        self.items
            .iter()
            .filter(|((v, t, _), _)| v == vendor.trim() && *t == token)
            .map(|(_, item)| item)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::from_items(vec![
            CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_vendor("Acme").with_price(6.5),
            CatalogItem::new("SPF #2", "2x6-16'", "pcs").with_vendor("Acme").with_price(9.0),
            CatalogItem::new("PT", "2x4-16'", "pcs")
                .with_vendor("Acme")
                .with_supplier_price(8.0, 25.0),
            CatalogItem::new("ZIP System", "4x8 7/16", "sheet")
                .with_vendor("Builders")
                .with_price(32.0),
        ])
    }

    #[test]
    fn test_supplier_markup_takes_precedence() {
        let item = CatalogItem::new("SPF #2", "2x4-16'", "pcs")
            .with_supplier_price(5.0, 20.0)
            .with_price(99.0);
        assert!((item.unit_price() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_price_fallback() {
        let item = CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_price(7.25);
        assert_eq!(item.unit_price(), 7.25);

        // Supplier price without markup is incomplete
        let mut partial = item.clone();
        partial.base_price = Some(5.0);
        assert_eq!(partial.unit_price(), 7.25);
    }

    #[test]
    fn test_unpriced_item_is_zero() {
        let item = CatalogItem::new("SPF #2", "2x4-16'", "pcs");
        assert_eq!(item.unit_price(), 0.0);
        assert_eq!(unit_price_from(None), 0.0);
    }

    #[test]
    fn test_non_finite_price_counts_as_absent() {
        let mut item = CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_price(4.0);
        item.base_price = Some(f64::NAN);
        item.markup_pct = Some(10.0);
        assert_eq!(item.unit_price(), 4.0);
    }

    #[test]
    fn test_supplier_price_alias() {
        let json = r#"{"family_label":"PT","size_label":"2x4-16'","unit":"pcs",
            "supplier_price":10.0,"markup_pct":10.0}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!((item.unit_price() - 11.0).abs() < 1e-9);
        assert_eq!(item.board_length_ft(), Some(16.0));
    }

    #[test]
    fn test_catalog_lookup_normalizes_family() {
        let catalog = sample_catalog();
        assert!(catalog.get("Acme", "spf#2", "2x4-16'").is_none());
        assert!(catalog.get("Acme", "SPF #2", "2x4-16'").is_some());
        assert!(catalog.get("Acme", "spf #2", "2x4-16'").is_some());
        assert!(catalog.require("Acme", "LVL", "1-3/4x9-1/2").is_err());
    }

    #[test]
    fn test_catalog_listing() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.vendors(), vec!["Acme", "Builders"]);
        assert_eq!(catalog.families("Acme"), vec!["PT", "SPF #2"]);
        assert_eq!(catalog.sizes("Acme", "SPF #2").len(), 2);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[{"vendor":"Acme","family_label":"LVL","size_label":"1-3/4x11-7/8",
            "unit":"lf","price_with_markup":6.1}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(Catalog::from_json("{not json").is_err());
    }
}
