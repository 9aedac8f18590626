//! # Wall Groups
//!
//! A [`WallGroup`] is a named run of exterior or interior framing with its
//! geometry, per-category catalog selections and waste overrides, and a list
//! of ad-hoc [`Extra`] rows (headers, posts, headers infill).
//!
//! ## Headers Infill
//!
//! Dimensional lumber headers need infill sheathing behind them. The group
//! keeps exactly one system-managed `HeadersInfill` extra whenever the pooled
//! header LF of infill-eligible families is positive, and none otherwise.
//! The rule is re-derived from the current extras after every mutation:
//!
//! 1. [`desired_infill_state`] looks at the extras (pure)
//! 2. [`plan_infill_patch`] diffs desired against current (pure)
//! 3. [`WallGroup::reconcile_infill`] applies the minimal insert/remove
//!
//! Edits that leave the [`InfillSignature`] unchanged skip the reconcile.
//! The infill row itself is excluded from the signature.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::settings::EstimateSettings;
//! use estimate_core::wall_group::{Extra, WallGroup, WallKind};
//!
//! let mut group = WallGroup::new("North wall", WallKind::Exterior).with_geometry(40.0, 9.0);
//! let header = group.add_extra(Extra::header("SPF #2", 0.0)).unwrap();
//! assert!(!group.has_infill());
//!
//! group.update_extra(header, |e| e.set_header_lf(10.0)).unwrap();
//! assert!(group.has_infill());
//!
//! let summary = group.compute(&EstimateSettings::default());
//! assert_eq!(summary.extras.len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{
    calc_blocking, calc_header, calc_headers_infill, calc_plates, calc_post, calc_sheathing,
    calc_studs, sum_subtotals, BlockingInput, HeaderInput, HeadersInfillInput, LineItem,
    PlatesInput, PostInput, Row, SheathingInput, StudsInput, DEFAULT_WASTE_PCT, INFILL_WASTE_PCT,
};
use crate::catalog::CatalogItem;
use crate::errors::{EstimateError, EstimateResult};
use crate::families::{is_infill_family, is_pressure_treated};
use crate::parsing::{at_least_one, finite_or_zero, normalize_family_token};
use crate::settings::EstimateSettings;

/// Panel counts from LF are over-counted by 10%
pub const PANEL_OVERCOUNT: f64 = 1.1;

// ============================================================================
// Kinds and Categories
// ============================================================================

/// Exterior wall or one of the interior wall kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum WallKind {
    #[default]
    Exterior,
    Partition,
    Bearing,
    Shear,
    Knee,
}

impl WallKind {
    pub const INTERIOR: [WallKind; 4] = [
        WallKind::Partition,
        WallKind::Bearing,
        WallKind::Shear,
        WallKind::Knee,
    ];

    pub fn is_interior(&self) -> bool {
        !matches!(self, WallKind::Exterior)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WallKind::Exterior => "Exterior",
            WallKind::Partition => "Partition",
            WallKind::Bearing => "Bearing",
            WallKind::Shear => "Shear",
            WallKind::Knee => "Knee",
        }
    }

    /// Base rows computed for this kind, in display order
    pub fn base_categories(&self) -> &'static [MaterialCategory] {
        use MaterialCategory::{Blocking, BottomPlate, Sheathing, Studs, TopPlate};
        match self {
            WallKind::Exterior | WallKind::Shear => {
                &[BottomPlate, TopPlate, Studs, Blocking, Sheathing]
            }
            WallKind::Bearing => &[BottomPlate, TopPlate, Studs, Blocking],
            WallKind::Partition | WallKind::Knee => &[BottomPlate, TopPlate, Studs],
        }
    }
}

/// Nominal stud width of a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudWidth {
    #[default]
    #[serde(rename = "2x4")]
    TwoByFour,
    #[serde(rename = "2x6")]
    TwoBySix,
}

/// Material categories selectable on a wall group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialCategory {
    BottomPlate,
    TopPlate,
    Studs,
    Blocking,
    Sheathing,
    HeadersInfill,
}

impl MaterialCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::BottomPlate => "Bottom plate",
            MaterialCategory::TopPlate => "Top plates",
            MaterialCategory::Studs => "Studs",
            MaterialCategory::Blocking => "Blocking",
            MaterialCategory::Sheathing => "Sheathing",
            MaterialCategory::HeadersInfill => "Headers infill",
        }
    }

    pub fn default_waste_pct(&self) -> f64 {
        match self {
            MaterialCategory::HeadersInfill => INFILL_WASTE_PCT,
            _ => DEFAULT_WASTE_PCT,
        }
    }
}

// ============================================================================
// Extras
// ============================================================================

/// What an extra row computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtraSpec {
    /// Header over openings
    Header {
        #[serde(default)]
        header_lf: f64,
        /// Overrides the board length parsed from the item
        #[serde(default)]
        board_len_ft: Option<f64>,
        #[serde(default)]
        lvl_pieces: f64,
        #[serde(default)]
        lvl_length_ft: f64,
    },
    /// Posts / columns
    Post {
        #[serde(default)]
        pieces: f64,
        #[serde(default)]
        height_ft: f64,
        #[serde(default)]
        pieces_per_post: f64,
        #[serde(default)]
        num_posts: f64,
    },
    /// Infill sheets behind lumber headers (system-managed)
    HeadersInfill,
}

impl ExtraSpec {
    pub fn type_name(&self) -> &'static str {
        match self {
            ExtraSpec::Header { .. } => "Header",
            ExtraSpec::Post { .. } => "Post",
            ExtraSpec::HeadersInfill => "HeadersInfill",
        }
    }
}

/// An ad-hoc row on a wall group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    /// Stable row id
    pub id: Uuid,

    /// Selected family label; falls back to the item's family when blank
    #[serde(default)]
    pub family: String,

    /// Selected catalog item
    #[serde(default)]
    pub item: Option<CatalogItem>,

    /// Row waste override in percent. Without one, user rows use the default
    /// extra waste and the infill row follows its group's `HeadersInfill` waste.
    #[serde(default)]
    pub waste_pct: Option<f64>,

    /// Set only on the auto-managed infill row
    #[serde(default)]
    pub system_managed: bool,

    /// Row type and its inputs
    pub spec: ExtraSpec,
}

impl Extra {
    /// New user row with default waste
    pub fn new(family: impl Into<String>, spec: ExtraSpec) -> Self {
        Extra {
            id: Uuid::new_v4(),
            family: family.into(),
            item: None,
            waste_pct: None,
            system_managed: false,
            spec,
        }
    }

    /// Dimensional lumber header of `header_lf` linear feet
    pub fn header(family: impl Into<String>, header_lf: f64) -> Self {
        Self::new(
            family,
            ExtraSpec::Header {
                header_lf,
                board_len_ft: None,
                lvl_pieces: 0.0,
                lvl_length_ft: 0.0,
            },
        )
    }

    /// LVL header bought by the foot
    pub fn lvl_header(family: impl Into<String>, lvl_pieces: f64, lvl_length_ft: f64) -> Self {
        Self::new(
            family,
            ExtraSpec::Header {
                header_lf: 0.0,
                board_len_ft: None,
                lvl_pieces,
                lvl_length_ft,
            },
        )
    }

    /// Post row; which fields matter depends on the family
    pub fn post(
        family: impl Into<String>,
        pieces: f64,
        height_ft: f64,
        pieces_per_post: f64,
        num_posts: f64,
    ) -> Self {
        Self::new(
            family,
            ExtraSpec::Post {
                pieces,
                height_ft,
                pieces_per_post,
                num_posts,
            },
        )
    }

    fn headers_infill(item: Option<CatalogItem>) -> Self {
        Extra {
            id: Uuid::new_v4(),
            family: String::new(),
            item,
            waste_pct: None,
            system_managed: true,
            spec: ExtraSpec::HeadersInfill,
        }
    }

    pub fn with_item(mut self, item: CatalogItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_waste(mut self, waste_pct: f64) -> Self {
        self.waste_pct = Some(waste_pct);
        self
    }

    pub fn is_infill(&self) -> bool {
        matches!(self.spec, ExtraSpec::HeadersInfill)
    }

    /// Family used for classification
    pub fn family_label(&self) -> &str {
        if self.family.trim().is_empty() {
            self.item.as_ref().map_or("", |i| i.family_label.as_str())
        } else {
            &self.family
        }
    }

    /// Header LF, or 0 for anything that is not a header
    pub fn header_lf(&self) -> f64 {
        match self.spec {
            ExtraSpec::Header { header_lf, .. } => finite_or_zero(header_lf),
            _ => 0.0,
        }
    }

    /// Set header LF; no-op on other row types
    pub fn set_header_lf(&mut self, value: f64) {
        if let ExtraSpec::Header { header_lf, .. } = &mut self.spec {
            *header_lf = value;
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.spec, self.family_label()) {
            (ExtraSpec::HeadersInfill, _) => "Headers infill".to_string(),
            (spec, "") => spec.type_name().to_string(),
            (spec, family) => format!("{} ({})", spec.type_name(), family),
        }
    }

    /// Compute this row outside a group. `header_lf_pool` feeds the infill row.
    ///
    /// Without a row override the infill row takes the project's
    /// `HeadersInfill` default waste; [`WallGroup::compute`] also applies the
    /// group's own override.
    pub fn compute(&self, header_lf_pool: f64, settings: &EstimateSettings) -> Row {
        let fallback = if self.is_infill() {
            settings
                .default_waste
                .get(&MaterialCategory::HeadersInfill)
                .copied()
                .unwrap_or(INFILL_WASTE_PCT)
        } else {
            DEFAULT_WASTE_PCT
        };
        self.compute_with_waste(header_lf_pool, self.waste_pct.unwrap_or(fallback), settings)
    }

    fn compute_with_waste(
        &self,
        header_lf_pool: f64,
        waste_pct: f64,
        settings: &EstimateSettings,
    ) -> Row {
        let item = self.item.as_ref();
        match self.spec {
            ExtraSpec::Header {
                header_lf,
                board_len_ft,
                lvl_pieces,
                lvl_length_ft,
            } => calc_header(&HeaderInput {
                family: self.family_label(),
                header_lf,
                board_len_ft: board_len_ft
                    .or_else(|| item.and_then(CatalogItem::board_length_ft))
                    .unwrap_or(settings.header_board_len_ft),
                lvl_pieces,
                lvl_length_ft,
                waste_pct,
                item,
            }),
            ExtraSpec::Post {
                pieces,
                height_ft,
                pieces_per_post,
                num_posts,
            } => calc_post(&PostInput {
                family: self.family_label(),
                pieces,
                height_ft,
                pieces_per_post,
                num_posts,
                waste_pct,
                item,
            }),
            ExtraSpec::HeadersInfill => calc_headers_infill(&HeadersInfillInput {
                header_lf_pool,
                waste_pct,
                item,
            }),
        }
    }
}

// ============================================================================
// Infill Rule
// ============================================================================

/// Change-detection key over the extras that can affect the infill rule.
///
/// One entry per non-infill extra: (type, normalized family, header LF bits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InfillSignature(Vec<(&'static str, String, u64)>);

/// Signature of a set of extras, excluding infill rows.
pub fn infill_signature(extras: &[Extra]) -> InfillSignature {
    InfillSignature(
        extras
            .iter()
            .filter(|e| !e.is_infill())
            .map(|e| {
                (
                    e.spec.type_name(),
                    normalize_family_token(e.family_label()),
                    e.header_lf().to_bits(),
                )
            })
            .collect(),
    )
}

/// Sum of header LF over headers of infill-eligible families.
pub fn header_lf_pool(extras: &[Extra]) -> f64 {
    extras
        .iter()
        .filter(|e| {
            matches!(e.spec, ExtraSpec::Header { .. }) && is_infill_family(e.family_label())
        })
        .map(Extra::header_lf)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfillState {
    Absent,
    Present,
}

/// Whether an infill row should exist for these extras.
pub fn desired_infill_state(extras: &[Extra]) -> InfillState {
    if header_lf_pool(extras) > 0.0 {
        InfillState::Present
    } else {
        InfillState::Absent
    }
}

/// Minimal change bringing the extras in line with [`desired_infill_state`].
#[derive(Debug, Clone, PartialEq)]
pub enum InfillPatch {
    Unchanged,
    Insert,
    Remove(Vec<Uuid>),
}

/// Diff the desired infill state against the current extras.
pub fn plan_infill_patch(extras: &[Extra]) -> InfillPatch {
    let infill_ids: Vec<Uuid> = extras.iter().filter(|e| e.is_infill()).map(|e| e.id).collect();
    match desired_infill_state(extras) {
        InfillState::Present if infill_ids.is_empty() => InfillPatch::Insert,
        // Duplicates (e.g. from a hand-edited file) collapse to the first
        InfillState::Present if infill_ids.len() > 1 => {
            InfillPatch::Remove(infill_ids[1..].to_vec())
        }
        InfillState::Present => InfillPatch::Unchanged,
        InfillState::Absent if infill_ids.is_empty() => InfillPatch::Unchanged,
        InfillState::Absent => InfillPatch::Remove(infill_ids),
    }
}

// ============================================================================
// Wall Group
// ============================================================================

fn default_height() -> f64 {
    9.0
}

fn default_spacing() -> f64 {
    16.0
}

fn default_multiplier() -> f64 {
    1.0
}

/// A named exterior or interior wall section.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "4c5f0a9e-6a52-4a0c-9a3f-1a2b3c4d5e6f",
///   "name": "North wall",
///   "kind": "Exterior",
///   "stud_width": "2x6",
///   "length_lf": 42.0,
///   "height_ft": 9.0,
///   "stud_spacing_in": 16.0,
///   "stud_multiplier": 1.0,
///   "waste": { "Sheathing": 12.0 },
///   "sel": {
///     "Studs": {
///       "family_label": "SPF #2",
///       "size_label": "2x6-9'",
///       "unit": "pcs",
///       "price_with_markup": 7.1
///     }
///   },
///   "extras": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallGroup {
    /// Stable group id
    pub id: Uuid,

    /// User label (e.g. "North wall")
    pub name: String,

    #[serde(default)]
    pub kind: WallKind,

    #[serde(default)]
    pub stud_width: StudWidth,

    /// Run length in linear feet
    #[serde(default)]
    pub length_lf: f64,

    /// Wall height in feet
    #[serde(default = "default_height")]
    pub height_ft: f64,

    /// Stud spacing on center, inches
    #[serde(default = "default_spacing")]
    pub stud_spacing_in: f64,

    /// Studs per location, applied uniformly to the run
    #[serde(default = "default_multiplier")]
    pub stud_multiplier: f64,

    /// Waste overrides per category
    #[serde(default)]
    pub waste: BTreeMap<MaterialCategory, f64>,

    /// Catalog selections per category
    #[serde(default)]
    pub sel: BTreeMap<MaterialCategory, CatalogItem>,

    /// Extras; mutate only through the group so the infill rule holds
    #[serde(default)]
    extras: Vec<Extra>,
}

impl WallGroup {
    /// New group with default geometry (9 ft walls, 16" o.c., single studs)
    pub fn new(name: impl Into<String>, kind: WallKind) -> Self {
        WallGroup {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            stud_width: StudWidth::default(),
            length_lf: 0.0,
            height_ft: default_height(),
            stud_spacing_in: default_spacing(),
            stud_multiplier: default_multiplier(),
            waste: BTreeMap::new(),
            sel: BTreeMap::new(),
            extras: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, length_lf: f64, height_ft: f64) -> Self {
        self.length_lf = length_lf;
        self.height_ft = height_ft;
        self
    }

    pub fn with_stud_width(mut self, stud_width: StudWidth) -> Self {
        self.stud_width = stud_width;
        self
    }

    pub fn set_length(&mut self, length_lf: f64) {
        self.length_lf = length_lf;
    }

    pub fn set_height(&mut self, height_ft: f64) {
        self.height_ft = height_ft;
    }

    pub fn set_spacing(&mut self, stud_spacing_in: f64) {
        self.stud_spacing_in = stud_spacing_in;
    }

    pub fn set_multiplier(&mut self, stud_multiplier: f64) {
        self.stud_multiplier = stud_multiplier;
    }

    pub fn extras(&self) -> &[Extra] {
        &self.extras
    }

    pub fn extra(&self, id: Uuid) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == id)
    }

    pub fn has_infill(&self) -> bool {
        self.extras.iter().any(Extra::is_infill)
    }

    /// Waste used by [`WallGroup::compute`]: the group override, else the
    /// project default table, else the category default
    pub fn resolved_waste(&self, category: MaterialCategory, settings: &EstimateSettings) -> f64 {
        self.waste
            .get(&category)
            .or_else(|| settings.default_waste.get(&category))
            .copied()
            .unwrap_or_else(|| category.default_waste_pct())
    }

    /// Override waste for a category. Setting `HeadersInfill` clears any
    /// row override on the infill row so it follows the category again.
    pub fn set_waste(&mut self, category: MaterialCategory, waste_pct: f64) {
        self.waste.insert(category, waste_pct);
        if category == MaterialCategory::HeadersInfill {
            for extra in self.extras.iter_mut().filter(|e| e.is_infill()) {
                extra.waste_pct = None;
            }
        }
    }

    pub fn item(&self, category: MaterialCategory) -> Option<&CatalogItem> {
        self.sel.get(&category)
    }

    /// Select (or clear) the catalog item for a category.
    pub fn select(&mut self, category: MaterialCategory, item: Option<CatalogItem>) {
        match &item {
            Some(item) => {
                self.sel.insert(category, item.clone());
            }
            None => {
                self.sel.remove(&category);
            }
        }
        if category == MaterialCategory::HeadersInfill {
            for extra in self.extras.iter_mut().filter(|e| e.is_infill()) {
                extra.item = item.clone();
            }
        }
    }

    /// Add a user extra. Infill rows are managed by the group and rejected here.
    pub fn add_extra(&mut self, extra: Extra) -> EstimateResult<Uuid> {
        if extra.is_infill() || extra.system_managed {
            return Err(EstimateError::system_managed_row(
                extra.id,
                "Headers infill rows are added automatically",
            ));
        }
        let id = extra.id;
        self.extras.push(extra);
        self.reconcile_infill();
        Ok(id)
    }

    /// Edit an extra in place.
    ///
    /// On the system-managed infill row only `item` and `waste_pct` are kept
    /// from the edit. The infill rule is re-run when the edit changes the
    /// [`InfillSignature`].
    pub fn update_extra(&mut self, id: Uuid, edit: impl FnOnce(&mut Extra)) -> EstimateResult<()> {
        let before = self.infill_signature();
        let idx = self
            .extras
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| {
                EstimateError::invalid_input("extra_id", id.to_string(), "No such extra row")
            })?;

        let mut draft = self.extras[idx].clone();
        edit(&mut draft);

        let current = &mut self.extras[idx];
        if current.is_infill() {
            current.item = draft.item;
            current.waste_pct = draft.waste_pct;
        } else {
            if draft.is_infill() || draft.system_managed {
                return Err(EstimateError::system_managed_row(
                    id,
                    "Rows cannot be turned into headers infill",
                ));
            }
            draft.id = id;
            *current = draft;
        }

        if self.infill_signature() != before {
            self.reconcile_infill();
        }
        Ok(())
    }

    /// Remove a user extra. The infill row cannot be removed directly.
    pub fn remove_extra(&mut self, id: Uuid) -> EstimateResult<Extra> {
        let idx = self
            .extras
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| {
                EstimateError::invalid_input("extra_id", id.to_string(), "No such extra row")
            })?;
        if self.extras[idx].is_infill() {
            return Err(EstimateError::system_managed_row(
                id,
                "Headers infill is removed when no eligible header LF remains",
            ));
        }
        let removed = self.extras.remove(idx);
        self.reconcile_infill();
        Ok(removed)
    }

    pub fn infill_signature(&self) -> InfillSignature {
        infill_signature(&self.extras)
    }

    pub fn header_lf_pool(&self) -> f64 {
        header_lf_pool(&self.extras)
    }

    /// Bring the infill row in line with the current extras.
    ///
    /// Idempotent: a second call always returns [`InfillPatch::Unchanged`].
    pub fn reconcile_infill(&mut self) -> InfillPatch {
        let patch = plan_infill_patch(&self.extras);
        match &patch {
            InfillPatch::Unchanged => {}
            InfillPatch::Insert => {
                let row =
                    Extra::headers_infill(self.item(MaterialCategory::HeadersInfill).cloned());
                debug!(
                    group = %self.name,
                    infill_id = %row.id,
                    pool_lf = self.header_lf_pool(),
                    "Adding headers infill"
                );
                self.extras.push(row);
            }
            InfillPatch::Remove(ids) => {
                debug!(group = %self.name, removed = ids.len(), "Removing headers infill");
                self.extras.retain(|e| !ids.contains(&e.id));
            }
        }
        for extra in self.extras.iter_mut().filter(|e| e.is_infill()) {
            extra.system_managed = true;
        }
        patch
    }

    /// Board length for a category: from the item's size label, else `default`
    fn board_len(&self, category: MaterialCategory, default: f64) -> f64 {
        self.item(category)
            .and_then(CatalogItem::board_length_ft)
            .unwrap_or(default)
    }

    pub fn panel_count(&self, settings: &EstimateSettings) -> u64 {
        panel_count(self.length_lf, settings.panel_length_ft)
    }

    /// Compute one base row.
    pub fn base_row(&self, category: MaterialCategory, settings: &EstimateSettings) -> Row {
        let item = self.item(category);
        let waste_pct = self.resolved_waste(category, settings);
        match category {
            MaterialCategory::BottomPlate => calc_plates(&PlatesInput {
                length_lf: self.length_lf,
                board_len_ft: self.board_len(category, settings.plate_board_len_ft),
                waste_pct,
                item,
            }),
            MaterialCategory::TopPlate => calc_plates(&PlatesInput {
                length_lf: finite_or_zero(self.length_lf) * finite_or_zero(settings.top_plate_rows),
                board_len_ft: self.board_len(category, settings.plate_board_len_ft),
                waste_pct,
                item,
            }),
            MaterialCategory::Studs => calc_studs(&StudsInput {
                length_lf: self.length_lf,
                spacing_in: self.stud_spacing_in,
                multiplier: self.stud_multiplier,
                waste_pct,
                item,
            }),
            MaterialCategory::Blocking => calc_blocking(&BlockingInput {
                length_lf: self.length_lf,
                height_ft: self.height_ft,
                board_len_ft: self.board_len(category, settings.blocking_board_len_ft),
                waste_pct,
                item,
            }),
            MaterialCategory::Sheathing => calc_sheathing(&SheathingInput {
                length_lf: self.length_lf,
                height_ft: self.height_ft,
                waste_pct,
                item,
            }),
            MaterialCategory::HeadersInfill => calc_headers_infill(&HeadersInfillInput {
                header_lf_pool: self.header_lf_pool(),
                waste_pct,
                item,
            }),
        }
    }

    fn is_pt_plate(&self, category: MaterialCategory) -> bool {
        let pt_item = self
            .item(category)
            .is_some_and(|item| is_pressure_treated(&item.family_label));
        match category {
            MaterialCategory::BottomPlate => self.kind == WallKind::Exterior || pt_item,
            MaterialCategory::TopPlate => pt_item,
            _ => false,
        }
    }

    /// Compute every active row, the extras and the group stats.
    pub fn compute(&self, settings: &EstimateSettings) -> GroupSummary {
        let header_lf_pool = self.header_lf_pool();
        let mut stats = GroupStats {
            length_lf: finite_or_zero(self.length_lf),
            panels: self.panel_count(settings),
            header_lf_pool,
            ..Default::default()
        };

        let mut rows = Vec::new();
        for &category in self.kind.base_categories() {
            let row = self.base_row(category, settings);
            match category {
                MaterialCategory::BottomPlate | MaterialCategory::TopPlate => {
                    stats.plate_pieces += row.qty_final;
                    if self.is_pt_plate(category) {
                        stats.pt_pieces += row.qty_final;
                    }
                }
                MaterialCategory::Sheathing => stats.sheets += row.qty_final,
                _ => {}
            }
            rows.push(LineItem::new(category.display_name(), row));
        }

        let infill_waste = self.resolved_waste(MaterialCategory::HeadersInfill, settings);
        let extras: Vec<LineItem> = self
            .extras
            .iter()
            .map(|e| {
                let row = if e.is_infill() {
                    let waste_pct = e.waste_pct.unwrap_or(infill_waste);
                    e.compute_with_waste(header_lf_pool, waste_pct, settings)
                } else {
                    e.compute(header_lf_pool, settings)
                };
                LineItem::new(e.display_name(), row).with_id(e.id)
            })
            .collect();

        let subtotal = sum_subtotals(rows.iter().chain(&extras).map(|line| &line.row));

        GroupSummary {
            group_id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            rows,
            extras,
            stats,
            subtotal,
        }
    }
}

/// Panels for a run: `ceil(length_lf / panel_length_ft * 1.1)`.
pub fn panel_count(length_lf: f64, panel_length_ft: f64) -> u64 {
    let panels = finite_or_zero(length_lf) / at_least_one(panel_length_ft) * PANEL_OVERCOUNT;
    if panels <= 0.0 {
        0
    } else {
        panels.ceil() as u64
    }
}

/// Counts a group pushes up to its level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupStats {
    pub length_lf: f64,
    /// Panel count (bracing and manufacture only)
    pub panels: u64,
    /// Final sheathing sheets
    pub sheets: u64,
    /// Final bottom + top plate pieces
    pub plate_pieces: u64,
    /// Final plate pieces of pressure-treated stock
    pub pt_pieces: u64,
    /// Infill-eligible header LF
    pub header_lf_pool: f64,
}

/// Computed rows and totals for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: Uuid,
    pub name: String,
    pub kind: WallKind,
    pub rows: Vec<LineItem>,
    pub extras: Vec<LineItem>,
    pub stats: GroupStats,
    pub subtotal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(family: &str, size: &str, unit: &str, price: f64) -> CatalogItem {
        CatalogItem::new(family, size, unit).with_price(price)
    }

    fn infill_count(group: &WallGroup) -> usize {
        group.extras().iter().filter(|e| e.is_infill()).count()
    }

    #[test]
    fn test_infill_state_transition() {
        let mut group = WallGroup::new("Front", WallKind::Exterior).with_geometry(40.0, 9.0);
        let header = group.add_extra(Extra::header("SPF #2", 0.0)).unwrap();
        assert_eq!(infill_count(&group), 0);

        group.update_extra(header, |e| e.set_header_lf(10.0)).unwrap();
        assert_eq!(infill_count(&group), 1);
        assert_eq!(group.extras().len(), 2);

        // Same value again must not duplicate
        group.update_extra(header, |e| e.set_header_lf(10.0)).unwrap();
        assert_eq!(infill_count(&group), 1);

        group.update_extra(header, |e| e.set_header_lf(0.0)).unwrap();
        assert_eq!(infill_count(&group), 0);
        assert_eq!(group.extras().len(), 1);
    }

    #[test]
    fn test_engineered_headers_do_not_trigger_infill() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.add_extra(Extra::lvl_header("LVL 2.0E", 2.0, 12.0)).unwrap();
        let mut lvl_by_lf = Extra::header("LVL 2.0E", 24.0);
        lvl_by_lf.waste_pct = Some(0.0);
        group.add_extra(lvl_by_lf).unwrap();
        assert!(!group.has_infill());
        assert_eq!(group.header_lf_pool(), 0.0);
    }

    #[test]
    fn test_infill_family_change_toggles_row() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        let header = group.add_extra(Extra::header("LVL", 12.0)).unwrap();
        assert!(!group.has_infill());

        group.update_extra(header, |e| e.family = "Hem-Fir".to_string()).unwrap();
        assert!(group.has_infill());

        group.remove_extra(header).unwrap();
        assert!(!group.has_infill());
        assert!(group.extras().is_empty());
    }

    #[test]
    fn test_family_falls_back_to_item() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        let extra = Extra::header("", 8.0).with_item(priced("SYP #2", "2x10-12'", "pcs", 14.0));
        group.add_extra(extra).unwrap();
        assert!(group.has_infill());
    }

    #[test]
    fn test_infill_row_is_not_user_removable() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.add_extra(Extra::header("SPF #2", 10.0)).unwrap();
        let infill_id = group.extras().iter().find(|e| e.is_infill()).unwrap().id;

        let err = group.remove_extra(infill_id).unwrap_err();
        assert_eq!(err.error_code(), "SYSTEM_MANAGED_ROW");
        assert_eq!(infill_count(&group), 1);
    }

    #[test]
    fn test_infill_row_cannot_be_added_by_hand() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        let manual = Extra::new("", ExtraSpec::HeadersInfill);
        assert!(group.add_extra(manual).is_err());
        assert!(group.extras().is_empty());
    }

    #[test]
    fn test_infill_row_edits_keep_only_item_and_waste() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.add_extra(Extra::header("SPF #2", 96.0)).unwrap();
        let infill_id = group.extras().iter().find(|e| e.is_infill()).unwrap().id;

        group
            .update_extra(infill_id, |e| {
                e.waste_pct = Some(0.0);
                e.system_managed = false;
                e.item = Some(CatalogItem::new("OSB", "4x8 7/16", "sheet").with_price(20.0));
            })
            .unwrap();

        let infill = group.extra(infill_id).unwrap();
        assert!(infill.system_managed);
        assert_eq!(infill.waste_pct, Some(0.0));

        let summary = group.compute(&EstimateSettings::default());
        let line = summary.extras.iter().find(|l| l.id == Some(infill_id)).unwrap();
        assert_eq!(line.row.qty_final, 2);
        assert_eq!(line.row.subtotal, 40.0);
    }

    #[test]
    fn test_user_rows_cannot_become_infill() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        let header = group.add_extra(Extra::header("SPF #2", 0.0)).unwrap();
        let err = group
            .update_extra(header, |e| e.spec = ExtraSpec::HeadersInfill)
            .unwrap_err();
        assert_eq!(err.error_code(), "SYSTEM_MANAGED_ROW");
        assert!(matches!(group.extra(header).unwrap().spec, ExtraSpec::Header { .. }));
    }

    #[test]
    fn test_signature_ignores_infill_and_waste() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        let header = group.add_extra(Extra::header("SPF #2", 10.0)).unwrap();
        let sig = group.infill_signature();
        group.update_extra(header, |e| e.waste_pct = Some(25.0)).unwrap();
        assert_eq!(group.infill_signature(), sig);
        // Only the header contributes
        assert_eq!(sig.0.len(), 1);
    }

    #[test]
    fn test_reconcile_collapses_duplicates() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.add_extra(Extra::header("SPF #2", 10.0)).unwrap();
        group.extras.push(Extra::headers_infill(None));
        assert_eq!(infill_count(&group), 2);

        assert!(matches!(group.reconcile_infill(), InfillPatch::Remove(ids) if ids.len() == 1));
        assert_eq!(infill_count(&group), 1);
        assert_eq!(group.reconcile_infill(), InfillPatch::Unchanged);
    }

    #[test]
    fn test_infill_follows_category_selection() {
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.set_waste(MaterialCategory::HeadersInfill, 0.0);
        group.select(
            MaterialCategory::HeadersInfill,
            Some(priced("OSB", "4x8 7/16", "sheet", 18.0)),
        );
        group.add_extra(Extra::header("SPF #2", 96.0)).unwrap();

        let infill = group.extras().iter().find(|e| e.is_infill()).unwrap();
        assert_eq!(infill.waste_pct, None);
        assert_eq!(infill.item.as_ref().unwrap().unit_price(), 18.0);
        let infill_id = infill.id;
        let line = |group: &WallGroup| {
            let summary = group.compute(&EstimateSettings::default());
            summary.extras.into_iter().find(|l| l.id == Some(infill_id)).unwrap().row
        };
        assert_eq!(line(&group).qty_final, 2);

        // Row override wins until the category waste is set again
        group.update_extra(infill_id, |e| e.waste_pct = Some(50.0)).unwrap();
        assert_eq!(line(&group).qty_final, 3);
        group.set_waste(MaterialCategory::HeadersInfill, 0.0);
        assert_eq!(line(&group).qty_final, 2);

        group.select(MaterialCategory::HeadersInfill, None);
        assert!(group.extras().iter().find(|e| e.is_infill()).unwrap().item.is_none());
    }

    #[test]
    fn test_exterior_rows_and_stats() {
        let mut group = WallGroup::new("Front", WallKind::Exterior).with_geometry(32.0, 8.0);
        for category in [
            MaterialCategory::BottomPlate,
            MaterialCategory::TopPlate,
            MaterialCategory::Studs,
            MaterialCategory::Blocking,
            MaterialCategory::Sheathing,
        ] {
            group.set_waste(category, 0.0);
        }
        group.select(MaterialCategory::BottomPlate, Some(priced("PT", "2x6-16'", "pcs", 12.0)));
        group.select(MaterialCategory::Sheathing, Some(priced("ZIP System", "4x8", "sheet", 30.0)));

        let summary = group.compute(&EstimateSettings::default());
        let qty: Vec<u64> = summary.rows.iter().map(|l| l.row.qty_final).collect();
        // bottom 32/16, top 64/16, studs floor(384/16)+1, blocking 2 * 1 row, sheets 8
        assert_eq!(qty, vec![2, 4, 25, 2, 8]);

        assert_eq!(summary.stats.plate_pieces, 6);
        assert_eq!(summary.stats.pt_pieces, 2);
        assert_eq!(summary.stats.sheets, 8);
        assert_eq!(summary.stats.panels, 5);
        assert_eq!(summary.subtotal, 2.0 * 12.0 + 8.0 * 30.0);
    }

    #[test]
    fn test_project_waste_table_yields_to_group_override() {
        let mut settings = EstimateSettings::default();
        settings.default_waste.insert(MaterialCategory::Sheathing, 0.0);
        let mut group = WallGroup::new("Front", WallKind::Exterior).with_geometry(32.0, 8.0);
        assert_eq!(group.base_row(MaterialCategory::Sheathing, &settings).qty_final, 8);

        group.set_waste(MaterialCategory::Sheathing, 25.0);
        assert_eq!(group.base_row(MaterialCategory::Sheathing, &settings).qty_final, 10);
    }

    #[test]
    fn test_infill_row_uses_project_waste_table() {
        let mut settings = EstimateSettings::default();
        settings.default_waste.insert(MaterialCategory::HeadersInfill, 0.0);
        let mut group = WallGroup::new("Front", WallKind::Exterior);
        group.add_extra(Extra::header("SPF #2", 96.0)).unwrap();

        let summary = group.compute(&settings);
        let infill = summary.extras.iter().find(|l| l.label == "Headers infill").unwrap();
        assert_eq!(infill.row.qty_final, 2);
        assert_eq!(group.base_row(MaterialCategory::HeadersInfill, &settings).qty_final, 2);

        // Later settings changes reach the existing row
        settings.default_waste.insert(MaterialCategory::HeadersInfill, 5.0);
        let summary = group.compute(&settings);
        let infill = summary.extras.iter().find(|l| l.label == "Headers infill").unwrap();
        assert_eq!(infill.row.qty_final, 3);
    }

    #[test]
    fn test_interior_kinds_activate_rows() {
        let settings = EstimateSettings::default();
        let rows = |kind| {
            let group = WallGroup::new("I", kind).with_geometry(20.0, 9.0);
            group.compute(&settings).rows.len()
        };
        assert_eq!(rows(WallKind::Partition), 3);
        assert_eq!(rows(WallKind::Knee), 3);
        assert_eq!(rows(WallKind::Bearing), 4);
        assert_eq!(rows(WallKind::Shear), 5);
    }

    #[test]
    fn test_interior_bottom_plate_pt_by_family() {
        let settings = EstimateSettings::default();
        let mut group = WallGroup::new("Hall", WallKind::Partition).with_geometry(16.0, 9.0);
        group.set_waste(MaterialCategory::BottomPlate, 0.0);
        assert_eq!(group.compute(&settings).stats.pt_pieces, 0);

        group.select(MaterialCategory::BottomPlate, Some(priced("PT #2", "2x4-16'", "pcs", 6.0)));
        assert_eq!(group.compute(&settings).stats.pt_pieces, 1);
    }

    #[test]
    fn test_extras_add_to_subtotal() {
        let settings = EstimateSettings::default();
        let mut group = WallGroup::new("Front", WallKind::Partition);
        let base = group.compute(&settings).subtotal;

        let post = Extra::post("SPF #2", 0.0, 0.0, 3.0, 2.0)
            .with_item(priced("SPF #2", "2x4-9'", "pcs", 4.0))
            .with_waste(0.0);
        group.add_extra(post).unwrap();
        let summary = group.compute(&settings);
        assert_eq!(summary.subtotal, base + 24.0);
    }

    #[test]
    fn test_header_board_length_sources() {
        let settings = EstimateSettings::default();
        let no_item = Extra::header("SPF #2", 24.0).with_waste(0.0);
        assert_eq!(no_item.compute(0.0, &settings).qty_raw, 2.0);

        let with_item = no_item.clone().with_item(priced("SPF #2", "2x10-8'", "pcs", 1.0));
        assert_eq!(with_item.compute(0.0, &settings).qty_raw, 3.0);
    }

    #[test]
    fn test_compute_is_stable() {
        let mut group = WallGroup::new("Front", WallKind::Exterior).with_geometry(57.5, 10.0);
        group.add_extra(Extra::header("SPF #2", 18.0)).unwrap();
        let settings = EstimateSettings::default();
        assert_eq!(group.compute(&settings), group.compute(&settings));
    }

    #[test]
    fn test_panel_count() {
        assert_eq!(panel_count(40.0, 8.0), 6);
        assert_eq!(panel_count(0.0, 8.0), 0);
        assert_eq!(panel_count(10.0, 0.0), 11);
    }

    #[test]
    fn test_group_serialization_roundtrip() {
        let mut group =
            WallGroup::new("Front", WallKind::Shear).with_stud_width(StudWidth::TwoBySix);
        group.set_waste(MaterialCategory::Sheathing, 12.0);
        group.add_extra(Extra::header("SPF #2", 10.0)).unwrap();

        let json = serde_json::to_string_pretty(&group).unwrap();
        assert!(json.contains("\"2x6\""));
        assert!(json.contains("\"type\": \"HeadersInfill\""));

        let roundtrip: WallGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, group);
    }
}
