//! # Levels
//!
//! A [`Level`] is one floor of the building: exterior and interior wall
//! groups, a loose materials section and any panel-nail rows entered by hand.
//!
//! Summarizing a level pools group stats into the loose section:
//!
//! | Loose row             | Fed by                                        |
//! |-----------------------|-----------------------------------------------|
//! | PT bottom plates      | exterior LF                                   |
//! | Top plates            | exterior LF                                   |
//! | Panel band sheathing  | band LF (default exterior LF) at 4 ft         |
//! | Extra sheathing       | user LF and height                            |
//! | Openings / cabinet    | user LF                                       |
//! | Second bottom plate   | exterior LF                                   |
//! | Interior PT plates    | interior LF of matching stud width            |
//! | Interior plates       | twice that LF (double top plate)              |
//! | ZIP flashing tape     | exterior ZIP + band + extra sheets            |
//!
//! Nails and temporary bracing are computed per level but kept out of
//! `level_total`; the project adds them once at the end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{
    calc_box_count, calc_concrete_nails, calc_framing_nails, calc_loose, calc_sheathing_nails,
    calc_temporary_bracing, sum_subtotals, BoxCountInput, LineItem, LooseCategory, LooseInput, Row,
    NAIL_WASTE_PCT,
};
use crate::catalog::CatalogItem;
use crate::errors::{EstimateError, EstimateResult};
use crate::parsing::finite_or_zero;
use crate::settings::EstimateSettings;
use crate::wall_group::{GroupSummary, StudWidth, WallGroup, WallKind};

// ============================================================================
// Loose Materials Configuration
// ============================================================================

/// User configuration of one loose row. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LooseRowConfig {
    /// `None` follows the category default (optional rows start off)
    pub enabled: Option<bool>,
    pub item: Option<CatalogItem>,
    pub waste_pct: Option<f64>,
    /// Overrides the LF wired from the level
    pub length_lf: Option<f64>,
    /// Sheathed height, extra sheathing only
    pub height_ft: Option<f64>,
}

/// Loose materials section of a level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LooseMaterials {
    #[serde(default)]
    pub rows: BTreeMap<LooseCategory, LooseRowConfig>,
}

impl LooseMaterials {
    pub fn row(&self, category: LooseCategory) -> Option<&LooseRowConfig> {
        self.rows.get(&category)
    }

    pub fn row_mut(&mut self, category: LooseCategory) -> &mut LooseRowConfig {
        self.rows.entry(category).or_default()
    }

    pub fn is_enabled(&self, category: LooseCategory) -> bool {
        self.row(category)
            .and_then(|r| r.enabled)
            .unwrap_or(!category.is_optional())
    }

    pub fn set_enabled(&mut self, category: LooseCategory, enabled: bool) {
        self.row_mut(category).enabled = Some(enabled);
    }

    pub fn select(&mut self, category: LooseCategory, item: Option<CatalogItem>) {
        self.row_mut(category).item = item;
    }

    pub fn set_waste(&mut self, category: LooseCategory, waste_pct: f64) {
        self.row_mut(category).waste_pct = Some(waste_pct);
    }

    pub fn set_length(&mut self, category: LooseCategory, length_lf: f64) {
        self.row_mut(category).length_lf = Some(length_lf);
    }

    pub fn set_height(&mut self, category: LooseCategory, height_ft: f64) {
        self.row_mut(category).height_ft = Some(height_ft);
    }
}

/// A box-counted fastener row entered per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelNailRow {
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    /// Nails needed
    #[serde(default)]
    pub count: f64,
    /// Nails per box
    #[serde(default)]
    pub per_box: f64,
    #[serde(default = "default_nail_waste")]
    pub waste_pct: f64,
    #[serde(default)]
    pub item: Option<CatalogItem>,
}

fn default_nail_waste() -> f64 {
    NAIL_WASTE_PCT
}

impl PanelNailRow {
    pub fn new(label: impl Into<String>, count: f64, per_box: f64) -> Self {
        PanelNailRow {
            id: Uuid::new_v4(),
            label: label.into(),
            count,
            per_box,
            waste_pct: NAIL_WASTE_PCT,
            item: None,
        }
    }

    pub fn compute(&self) -> Row {
        calc_box_count(&BoxCountInput {
            count: self.count,
            per_box: self.per_box,
            waste_pct: self.waste_pct,
            item: self.item.as_ref(),
        })
    }
}

// ============================================================================
// Fasteners
// ============================================================================

/// Item and waste override for one nail category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FastenerChoice {
    pub item: Option<CatalogItem>,
    /// `None` uses the nail default (40%)
    pub waste_pct: Option<f64>,
}

impl FastenerChoice {
    fn waste_pct(&self) -> f64 {
        self.waste_pct.unwrap_or(NAIL_WASTE_PCT)
    }
}

/// Project-wide nail and bracing selections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FastenerSelection {
    pub concrete_nails: FastenerChoice,
    pub sheathing_nails: FastenerChoice,
    pub framing_nails: FastenerChoice,
    /// Bracing takes no waste
    pub bracing_item: Option<CatalogItem>,
}

/// Project-wide inputs for one level's share of temporary bracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BracingShare {
    pub all_panels: u64,
    pub levels_count: usize,
}

/// Nails and bracing computed for one level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NailsBracing {
    pub concrete_nails: Row,
    pub sheathing_nails: Row,
    pub framing_nails: Row,
    pub temporary_bracing: Row,
    pub total: f64,
}

impl NailsBracing {
    pub fn compute(
        stats: &LevelStats,
        fasteners: &FastenerSelection,
        bracing: BracingShare,
    ) -> Self {
        let concrete_nails = calc_concrete_nails(
            stats.pt_pieces as f64,
            fasteners.concrete_nails.waste_pct(),
            fasteners.concrete_nails.item.as_ref(),
        );
        let sheathing_nails = calc_sheathing_nails(
            stats.nailed_sheets() as f64,
            fasteners.sheathing_nails.waste_pct(),
            fasteners.sheathing_nails.item.as_ref(),
        );
        let framing_nails = calc_framing_nails(
            stats.plate_pieces as f64,
            fasteners.framing_nails.waste_pct(),
            fasteners.framing_nails.item.as_ref(),
        );
        let temporary_bracing = calc_temporary_bracing(
            bracing.all_panels as f64,
            bracing.levels_count,
            fasteners.bracing_item.as_ref(),
        );
        let total = sum_subtotals([
            &concrete_nails,
            &sheathing_nails,
            &framing_nails,
            &temporary_bracing,
        ]);
        NailsBracing {
            concrete_nails,
            sheathing_nails,
            framing_nails,
            temporary_bracing,
            total,
        }
    }

    pub fn lines(&self) -> Vec<LineItem> {
        vec![
            LineItem::new("Concrete nails", self.concrete_nails.clone()),
            LineItem::new("Sheathing nails", self.sheathing_nails.clone()),
            LineItem::new("Framing nails", self.framing_nails.clone()),
            LineItem::new("Temporary bracing", self.temporary_bracing.clone()),
        ]
    }
}

// ============================================================================
// Level
// ============================================================================

/// One floor of the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub exterior: Vec<WallGroup>,
    #[serde(default)]
    pub interior: Vec<WallGroup>,
    #[serde(default)]
    pub panel_nails: Vec<PanelNailRow>,
    #[serde(default)]
    pub loose: LooseMaterials,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Level {
            id: Uuid::new_v4(),
            name: name.into(),
            exterior: Vec::new(),
            interior: Vec::new(),
            panel_nails: Vec::new(),
            loose: LooseMaterials::default(),
        }
    }

    /// Add an exterior group. Interior kinds are rejected.
    pub fn add_exterior(&mut self, group: WallGroup) -> EstimateResult<Uuid> {
        if group.kind.is_interior() {
            return Err(EstimateError::invalid_input(
                "kind",
                group.kind.display_name(),
                "Exterior section only takes exterior walls",
            ));
        }
        let id = group.id;
        self.exterior.push(group);
        Ok(id)
    }

    /// Add an interior group. Exterior walls are rejected.
    pub fn add_interior(&mut self, group: WallGroup) -> EstimateResult<Uuid> {
        if !group.kind.is_interior() {
            return Err(EstimateError::invalid_input(
                "kind",
                group.kind.display_name(),
                "Interior section only takes interior walls",
            ));
        }
        let id = group.id;
        self.interior.push(group);
        Ok(id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &WallGroup> {
        self.exterior.iter().chain(self.interior.iter())
    }

    pub fn group_mut(&mut self, id: Uuid) -> Option<&mut WallGroup> {
        self.exterior
            .iter_mut()
            .chain(self.interior.iter_mut())
            .find(|g| g.id == id)
    }

    pub fn remove_group(&mut self, id: Uuid) -> EstimateResult<WallGroup> {
        if let Some(idx) = self.exterior.iter().position(|g| g.id == id) {
            return Ok(self.exterior.remove(idx));
        }
        if let Some(idx) = self.interior.iter().position(|g| g.id == id) {
            return Ok(self.interior.remove(idx));
        }
        Err(EstimateError::invalid_input("group_id", id.to_string(), "No such wall group"))
    }

    pub fn add_panel_nails(&mut self, row: PanelNailRow) -> Uuid {
        let id = row.id;
        self.panel_nails.push(row);
        id
    }

    pub fn remove_panel_nails(&mut self, id: Uuid) -> EstimateResult<PanelNailRow> {
        let idx = self
            .panel_nails
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| {
                EstimateError::invalid_input("panel_nail_id", id.to_string(), "No such nail row")
            })?;
        Ok(self.panel_nails.remove(idx))
    }

    /// Panels across every group on this level
    pub fn panel_count(&self, settings: &EstimateSettings) -> u64 {
        self.groups().map(|g| g.panel_count(settings)).sum()
    }

    /// Re-run the infill rule on every group (e.g. after loading a file)
    pub fn reconcile(&mut self) {
        for group in self.exterior.iter_mut().chain(self.interior.iter_mut()) {
            group.reconcile_infill();
        }
    }

    /// Compute every group, the loose section and this level's nails/bracing.
    pub fn summarize(
        &self,
        settings: &EstimateSettings,
        fasteners: &FastenerSelection,
        bracing: BracingShare,
    ) -> LevelSummary {
        let exterior: Vec<GroupSummary> =
            self.exterior.iter().map(|g| g.compute(settings)).collect();
        let interior: Vec<GroupSummary> =
            self.interior.iter().map(|g| g.compute(settings)).collect();

        let mut stats = LevelStats::default();
        for summary in &exterior {
            stats.exterior_lf += summary.stats.length_lf;
            stats.exterior_sheets += summary.stats.sheets;
            stats.add_group(summary);
        }
        for (group, summary) in self.interior.iter().zip(&interior) {
            *stats.interior_lf.entry(group.kind).or_insert(0.0) += summary.stats.length_lf;
            match group.stud_width {
                StudWidth::TwoByFour => stats.interior_2x4_lf += summary.stats.length_lf,
                StudWidth::TwoBySix => stats.interior_2x6_lf += summary.stats.length_lf,
            }
            stats.interior_sheets += summary.stats.sheets;
            stats.add_group(summary);
        }

        let loose = self.compute_loose(settings, &mut stats);
        let panel_nails: Vec<LineItem> = self
            .panel_nails
            .iter()
            .map(|r| LineItem::new(r.label.clone(), r.compute()).with_id(r.id))
            .collect();

        let groups_subtotal: f64 = exterior.iter().chain(&interior).map(|g| g.subtotal).sum();
        let loose_subtotal = sum_subtotals(
            loose
                .iter()
                .map(|l| &l.row)
                .chain(panel_nails.iter().map(|l| &l.row)),
        );
        let nails_bracing = NailsBracing::compute(&stats, fasteners, bracing);
        let level_total = groups_subtotal + loose_subtotal;

        debug!(
            level = %self.name,
            groups = exterior.len() + interior.len(),
            panels = stats.panels,
            level_total,
            nails_bracing = nails_bracing.total,
            "Summarized level"
        );

        LevelSummary {
            level_id: self.id,
            name: self.name.clone(),
            exterior,
            interior,
            loose,
            panel_nails,
            nails_bracing,
            stats,
            groups_subtotal,
            loose_subtotal,
            level_total,
        }
    }

    /// Loose rows in display order. The ZIP tape row runs last since it pools
    /// the band and extra sheathing sheets.
    fn compute_loose(&self, settings: &EstimateSettings, stats: &mut LevelStats) -> Vec<LooseLine> {
        let mut lines = Vec::new();
        let mut tape = None;

        for category in LooseCategory::ALL {
            if !self.loose.is_enabled(category) {
                continue;
            }
            if category == LooseCategory::ZipFlashingTape {
                tape = Some(lines.len());
                continue;
            }
            let config = self.loose.row(category);
            let row = calc_loose(category, &self.loose_input(category, config, settings, stats));
            match category {
                LooseCategory::PanelBandSheathing => stats.band_sheets += row.qty_final,
                LooseCategory::ExtraSheathing => stats.extra_sheets += row.qty_final,
                LooseCategory::SecondBottomPlate => stats.plate_pieces += row.qty_final,
                _ => {}
            }
            lines.push(LooseLine { category, row });
        }

        if let Some(position) = tape {
            let category = LooseCategory::ZipFlashingTape;
            let config = self.loose.row(category);
            let row = calc_loose(category, &self.loose_input(category, config, settings, stats));
            lines.insert(position, LooseLine { category, row });
        }
        lines
    }

    fn loose_input<'a>(
        &self,
        category: LooseCategory,
        config: Option<&'a LooseRowConfig>,
        settings: &EstimateSettings,
        stats: &LevelStats,
    ) -> LooseInput<'a> {
        let item = config.and_then(|c| c.item.as_ref());
        let wired_lf = match category {
            LooseCategory::PtBottomPlates
            | LooseCategory::TopPlates
            | LooseCategory::PanelBandSheathing
            | LooseCategory::SecondBottomPlate => stats.exterior_lf,
            LooseCategory::Interior2x6Pt => stats.interior_2x6_lf,
            LooseCategory::Interior2x6 => 2.0 * stats.interior_2x6_lf,
            LooseCategory::Interior2x4Pt => stats.interior_2x4_lf,
            LooseCategory::Interior2x4 => 2.0 * stats.interior_2x4_lf,
            LooseCategory::ExtraSheathing
            | LooseCategory::OpeningsBlocking
            | LooseCategory::CabinetBlocking
            | LooseCategory::ZipFlashingTape => 0.0,
        };
        let default_board = match category {
            LooseCategory::OpeningsBlocking | LooseCategory::CabinetBlocking => {
                settings.blocking_board_len_ft
            }
            _ => settings.plate_board_len_ft,
        };
        LooseInput {
            length_lf: config.and_then(|c| c.length_lf).unwrap_or(wired_lf),
            height_ft: config.and_then(|c| c.height_ft).unwrap_or(0.0),
            board_len_ft: item.and_then(CatalogItem::board_length_ft).unwrap_or(default_board),
            sheets: stats.zip_pool() as f64,
            waste_pct: config.and_then(|c| c.waste_pct),
            item,
        }
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Totals pooled across a level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelStats {
    pub exterior_lf: f64,
    /// Interior LF by wall kind
    pub interior_lf: BTreeMap<WallKind, f64>,
    pub interior_2x4_lf: f64,
    pub interior_2x6_lf: f64,
    pub panels: u64,
    /// Sheathing sheets of exterior groups (ZIP)
    pub exterior_sheets: u64,
    /// Sheathing sheets of interior groups (shear walls)
    pub interior_sheets: u64,
    /// Panel band sheathing sheets (loose)
    pub band_sheets: u64,
    /// Optional extra sheathing sheets (loose)
    pub extra_sheets: u64,
    /// Every plate piece, PT or not, plus the second bottom plate
    pub plate_pieces: u64,
    /// Pressure-treated plate pieces
    pub pt_pieces: u64,
}

impl LevelStats {
    fn add_group(&mut self, summary: &GroupSummary) {
        self.panels += summary.stats.panels;
        self.plate_pieces += summary.stats.plate_pieces;
        self.pt_pieces += summary.stats.pt_pieces;
    }

    /// Sheets pooled for ZIP flashing tape
    pub fn zip_pool(&self) -> u64 {
        self.exterior_sheets + self.band_sheets + self.extra_sheets
    }

    /// Sheets counted for sheathing nails
    pub fn nailed_sheets(&self) -> u64 {
        self.zip_pool()
    }

    pub fn interior_lf_total(&self) -> f64 {
        self.interior_lf.values().map(|lf| finite_or_zero(*lf)).sum()
    }
}

/// One computed loose row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LooseLine {
    pub category: LooseCategory,
    pub row: Row,
}

impl LooseLine {
    pub fn label(&self) -> &'static str {
        self.category.display_name()
    }
}

/// Everything computed for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level_id: Uuid,
    pub name: String,
    pub exterior: Vec<GroupSummary>,
    pub interior: Vec<GroupSummary>,
    pub loose: Vec<LooseLine>,
    pub panel_nails: Vec<LineItem>,
    /// Kept out of `level_total`
    pub nails_bracing: NailsBracing,
    pub stats: LevelStats,
    pub groups_subtotal: f64,
    /// Loose rows plus panel nails
    pub loose_subtotal: f64,
    /// Groups plus loose section
    pub level_total: f64,
}
