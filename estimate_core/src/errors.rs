//! # Error Types
//!
//! Structured error types for estimate_core.
//!
//! The calculators never fail: missing prices, zero board lengths and other
//! degenerate geometry degrade to neutral values instead (see [`crate::calculations`]).
//! Errors are reserved for the edges of the engine: file I/O, catalog lookups
//! by key, configuration, and attempts to edit rows the engine manages itself.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{EstimateError, EstimateResult};
//!
//! fn validate_panel_length(panel_length_ft: f64) -> EstimateResult<()> {
//!     if panel_length_ft <= 0.0 {
//!         return Err(EstimateError::invalid_input(
//!             "panel_length_ft",
//!             panel_length_ft.to_string(),
//!             "Panel length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_panel_length(8.0).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimating operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid (out of range, wrong shape, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No catalog entry for the vendor/family/size key
    #[error("Catalog item not found: {vendor} / {family} / {size}")]
    CatalogItemNotFound {
        vendor: String,
        family: String,
        size: String,
    },

    /// The row is owned by the engine and cannot be edited directly
    #[error("Row {row_id} is system-managed: {reason}")]
    SystemManagedRow { row_id: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        EstimateError::MissingField {
            field: field.into(),
        }
    }

    /// Create a CatalogItemNotFound error
    pub fn catalog_item_not_found(
        vendor: impl Into<String>,
        family: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        EstimateError::CatalogItemNotFound {
            vendor: vendor.into(),
            family: family.into(),
            size: size.into(),
        }
    }

    /// Create a SystemManagedRow error
    pub fn system_managed_row(row_id: impl ToString, reason: impl Into<String>) -> Self {
        EstimateError::SystemManagedRow {
            row_id: row_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        EstimateError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        EstimateError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::MissingField { .. } => "MISSING_FIELD",
            EstimateError::CatalogItemNotFound { .. } => "CATALOG_ITEM_NOT_FOUND",
            EstimateError::SystemManagedRow { .. } => "SYSTEM_MANAGED_ROW",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::FileLocked { .. } => "FILE_LOCKED",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error =
            EstimateError::invalid_input("panel_length_ft", "-8", "Panel length must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: EstimateError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EstimateError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(
            EstimateError::catalog_item_not_found("Acme", "SPF#2", "2x4-16'").error_code(),
            "CATALOG_ITEM_NOT_FOUND"
        );
        assert_eq!(
            EstimateError::system_managed_row("abc", "auto infill").error_code(),
            "SYSTEM_MANAGED_ROW"
        );
    }

    #[test]
    fn test_display_message() {
        let err = EstimateError::catalog_item_not_found("Acme", "LVL", "1-3/4x11-7/8");
        assert_eq!(err.to_string(), "Catalog item not found: Acme / LVL / 1-3/4x11-7/8");
    }
}
