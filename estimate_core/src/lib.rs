//! # estimate_core - Wall Framing Estimating Engine
//!
//! `estimate_core` turns wall geometry plus selected catalog items into
//! purchasable material rows: plates, studs, blocking, sheathing, headers,
//! posts, loose materials, nails and bracing. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure calculators**: identical inputs always give identical rows
//! - **Degrade, don't fail**: missing prices and bad geometry fall back to zero
//! - **Rich Errors**: structured error types at the I/O and editing edges
//! - **Explicit lookups**: the catalog is a value passed in, never global state
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::level::Level;
//! use estimate_core::project::Project;
//! use estimate_core::wall_group::{Extra, WallGroup, WallKind};
//!
//! let mut project = Project::new("Sam Estimator", "25-001", "Acme Homes");
//!
//! let mut north = WallGroup::new("North", WallKind::Exterior).with_geometry(42.0, 9.0);
//! north.add_extra(Extra::header("SPF #2", 12.0)).unwrap();
//!
//! let mut level = Level::new("Level 1");
//! level.add_exterior(north).unwrap();
//! project.add_level(level);
//!
//! let summary = project.summarize();
//! println!("Grand total: {:.2}", summary.grand_total);
//! ```
//!
//! ## Modules
//!
//! - [`parsing`] - board lengths, family tokens, waste rounding
//! - [`families`] - LVL / Versa / PT / lumber / infill classifiers
//! - [`catalog`] - catalog items, price resolution and the lookup table
//! - [`calculations`] - base, loose and fastener calculators
//! - [`wall_group`] - wall groups, extras and the headers infill rule
//! - [`level`] - levels, loose materials and nails/bracing
//! - [`manufacture`] - shop labor estimate
//! - [`project`] - project container, metadata and the grand total
//! - [`settings`] - calculation defaults and manufacture rates
//! - [`units`] - type-safe unit wrappers
//! - [`errors`] - structured error types
//! - [`file_io`] - `.fwe` files with atomic saves and locking

pub mod calculations;
pub mod catalog;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod families;
pub mod level;
pub mod manufacture;
pub mod parsing;
pub mod project;
pub mod settings;
pub mod units;
pub mod wall_group;

// Re-export commonly used types at crate root for convenience
pub use calculations::{LineItem, Row};
pub use catalog::{Catalog, CatalogItem};
pub use errors::{EstimateError, EstimateResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use level::{Level, LevelSummary};
pub use project::{Project, ProjectMetadata, ProjectSummary};
pub use settings::EstimateSettings;
pub use wall_group::{Extra, WallGroup, WallKind};
