//! # Project Data Structures
//!
//! The `Project` struct is the root container for an estimate. Projects
//! serialize to `.fwe` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, estimator, job info, timestamps)
//! ├── settings: EstimateSettings (panel length, board lengths, rates)
//! ├── fasteners: FastenerSelection (nail and bracing items)
//! └── levels: Vec<Level>
//!     ├── exterior: Vec<WallGroup>
//!     ├── interior: Vec<WallGroup>
//!     ├── panel_nails: Vec<PanelNailRow>
//!     └── loose: LooseMaterials
//! ```
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::level::Level;
//! use estimate_core::project::Project;
//! use estimate_core::wall_group::{WallGroup, WallKind};
//!
//! let mut project = Project::new("Sam Estimator", "25-042", "ACME Homes");
//! let level = project.add_level(Level::new("Level 1"));
//! project
//!     .level_mut(level)
//!     .unwrap()
//!     .add_exterior(WallGroup::new("North", WallKind::Exterior).with_geometry(40.0, 9.0))
//!     .unwrap();
//!
//! let summary = project.summarize();
//! assert_eq!(summary.aggregate.exterior_lf, 40.0);
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{EstimateError, EstimateResult};
use crate::level::{BracingShare, FastenerSelection, Level, LevelSummary};
use crate::manufacture::ManufactureEstimate;
use crate::settings::EstimateSettings;
use crate::wall_group::WallKind;

/// Current schema version for .fwe files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// This is the top-level struct that gets serialized to `.fwe` files.
/// Levels keep their display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, estimator, job info)
    pub meta: ProjectMetadata,

    /// Calculation defaults and manufacture rates
    #[serde(default)]
    pub settings: EstimateSettings,

    /// Nail and bracing selections shared by every level
    #[serde(default)]
    pub fasteners: FastenerSelection,

    /// Building levels, bottom up
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use estimate_core::project::Project;
    ///
    /// let project = Project::new("Sam Estimator", "25-001", "Client Corp");
    /// assert_eq!(project.meta.estimator, "Sam Estimator");
    /// assert!(project.levels.is_empty());
    /// ```
    pub fn new(
        estimator: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                estimator: estimator.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: EstimateSettings::default(),
            fasteners: FastenerSelection::default(),
            levels: Vec::new(),
        }
    }

    /// Append a level. Returns its id.
    pub fn add_level(&mut self, level: Level) -> Uuid {
        let id = level.id;
        self.levels.push(level);
        self.touch();
        id
    }

    /// Remove a level by id.
    pub fn remove_level(&mut self, id: Uuid) -> EstimateResult<Level> {
        let idx = self
            .levels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| {
                EstimateError::invalid_input("level_id", id.to_string(), "No such level")
            })?;
        let level = self.levels.remove(idx);
        self.touch();
        Ok(level)
    }

    pub fn level(&self, id: Uuid) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Get a mutable reference to a level.
    ///
    /// Note: this marks the project as modified when the level is found.
    pub fn level_mut(&mut self, id: Uuid) -> Option<&mut Level> {
        let idx = self.levels.iter().position(|l| l.id == id)?;
        self.meta.modified = Utc::now();
        self.levels.get_mut(idx)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Re-run the infill rule across every group.
    pub fn reconcile(&mut self) {
        for level in &mut self.levels {
            level.reconcile();
        }
    }

    /// Panels across every level
    pub fn panel_count(&self) -> u64 {
        self.levels.iter().map(|l| l.panel_count(&self.settings)).sum()
    }

    /// Compute every level, the project aggregate, manufacture and the grand total.
    pub fn summarize(&self) -> ProjectSummary {
        let bracing = BracingShare {
            all_panels: self.panel_count(),
            levels_count: self.levels.len(),
        };
        let levels: Vec<LevelSummary> = self
            .levels
            .iter()
            .map(|l| l.summarize(&self.settings, &self.fasteners, bracing))
            .collect();

        let aggregate = ProjectAggregate::from_levels(&levels);
        let manufacture = ManufactureEstimate::calculate(&aggregate, &self.settings.manufacture);
        let levels_total: f64 = levels.iter().map(|l| l.level_total).sum();
        let nails_bracing_total: f64 = levels.iter().map(|l| l.nails_bracing.total).sum();
        let grand_total = levels_total + manufacture.total + nails_bracing_total;

        debug!(
            job_id = %self.meta.job_id,
            levels = levels.len(),
            panels = aggregate.panels,
            grand_total,
            "Summarized project"
        );

        ProjectSummary {
            levels,
            aggregate,
            manufacture,
            levels_total,
            nails_bracing_total,
            grand_total,
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the estimator
    pub estimator: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Totals pooled across every level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectAggregate {
    pub exterior_lf: f64,
    /// Interior LF by wall kind
    pub interior_lf: BTreeMap<WallKind, f64>,
    /// Panels across every group (bracing and manufacture only)
    pub panels: u64,
    pub plate_pieces: u64,
    pub pt_pieces: u64,
    pub exterior_sheets: u64,
    pub interior_sheets: u64,
    pub band_sheets: u64,
    pub extra_sheets: u64,
}

impl ProjectAggregate {
    pub fn from_levels(levels: &[LevelSummary]) -> Self {
        let mut aggregate = ProjectAggregate::default();
        for stats in levels.iter().map(|l| &l.stats) {
            aggregate.exterior_lf += stats.exterior_lf;
            for (kind, lf) in &stats.interior_lf {
                *aggregate.interior_lf.entry(*kind).or_insert(0.0) += lf;
            }
            aggregate.panels += stats.panels;
            aggregate.plate_pieces += stats.plate_pieces;
            aggregate.pt_pieces += stats.pt_pieces;
            aggregate.exterior_sheets += stats.exterior_sheets;
            aggregate.interior_sheets += stats.interior_sheets;
            aggregate.band_sheets += stats.band_sheets;
            aggregate.extra_sheets += stats.extra_sheets;
        }
        aggregate
    }

    pub fn interior_lf_total(&self) -> f64 {
        self.interior_lf.values().sum()
    }
}

/// Everything computed for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub levels: Vec<LevelSummary>,
    pub aggregate: ProjectAggregate,
    pub manufacture: ManufactureEstimate,
    /// Sum of level totals
    pub levels_total: f64,
    /// Nails and bracing across every level
    pub nails_bracing_total: f64,
    /// Levels + manufacture + nails/bracing
    pub grand_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use crate::settings::ManufactureRates;
    use crate::wall_group::{Extra, MaterialCategory, WallGroup};

    fn two_level_project() -> Project {
        let mut project = Project::new("Sam", "25-001", "Acme Homes");
        for (name, lf) in [("Level 1", 40.0), ("Level 2", 24.0)] {
            let mut level = Level::new(name);
            level
                .add_exterior(WallGroup::new("Outside", WallKind::Exterior).with_geometry(lf, 9.0))
                .unwrap();
            level
                .add_interior(WallGroup::new("Hall", WallKind::Partition).with_geometry(16.0, 9.0))
                .unwrap();
            project.add_level(level);
        }
        project
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Sam", "25-001", "Acme Homes");
        assert_eq!(project.meta.estimator, "Sam");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Homes");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_project_serialization() {
        let project = two_level_project();
        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("Acme Homes"));
        assert!(json.contains("panel_length_ft"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.levels, project.levels);
        assert_eq!(roundtrip.settings, project.settings);
    }

    #[test]
    fn test_add_remove_level() {
        let mut project = Project::default();
        let id = project.add_level(Level::new("Basement"));
        assert!(project.level(id).is_some());
        assert_eq!(project.remove_level(id).unwrap().name, "Basement");
        assert!(project.remove_level(id).is_err());
    }

    #[test]
    fn test_aggregate_across_levels() {
        let summary = two_level_project().summarize();
        assert_eq!(summary.aggregate.exterior_lf, 64.0);
        assert_eq!(summary.aggregate.interior_lf[&WallKind::Partition], 32.0);
        assert_eq!(summary.aggregate.interior_lf_total(), 32.0);
        // ceil(40/8*1.1) + ceil(24/8*1.1) + 2 * ceil(16/8*1.1)
        assert_eq!(summary.aggregate.panels, 6 + 4 + 3 + 3);
    }

    #[test]
    fn test_bracing_is_split_evenly() {
        let mut project = two_level_project();
        project.fasteners.bracing_item =
            Some(CatalogItem::new("SPF #2", "2x4-16'", "pcs").with_price(5.0));
        let summary = project.summarize();

        // 16 panels * 3 / 2 levels
        for level in &summary.levels {
            assert_eq!(level.nails_bracing.temporary_bracing.qty_final, 24);
        }
        assert_eq!(summary.nails_bracing_total, 2.0 * 24.0 * 5.0);
    }

    #[test]
    fn test_grand_total_composition() {
        let mut project = two_level_project();
        project.settings.manufacture = ManufactureRates {
            per_panel: 10.0,
            ..Default::default()
        };
        let level_id = project.levels[0].id;
        let group = &mut project.level_mut(level_id).unwrap().exterior[0];
        group.select(
            MaterialCategory::Sheathing,
            Some(CatalogItem::new("ZIP System", "4x8", "sheet").with_price(30.0)),
        );
        group.add_extra(Extra::header("SPF #2", 12.0)).unwrap();

        let summary = project.summarize();
        assert_eq!(summary.manufacture.total, 160.0);
        assert!(summary.levels_total > 0.0);
        assert_eq!(
            summary.grand_total,
            summary.levels_total + summary.manufacture.total + summary.nails_bracing_total
        );
    }

    #[test]
    fn test_summarize_is_stable() {
        let project = two_level_project();
        assert_eq!(project.summarize(), project.summarize());
    }

    #[test]
    fn test_empty_project_totals_zero() {
        let summary = Project::default().summarize();
        assert!(summary.levels.is_empty());
        assert_eq!(summary.grand_total, 0.0);
    }
}
