//! Custom error types for the churn feature pipeline.
//!
//! Every fatal condition of a run (missing assets, unreadable inputs,
//! malformed data) surfaces as a [`PipelineError`]. Row-level problems are
//! never errors: they are handled by the cleaning rules.
//!
//! Errors are serializable so a run report can carry the failure reason.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the churn feature pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A column required by the event schema is absent from the input.
    #[error("Column '{0}' not found in event data")]
    ColumnNotFound(String),

    /// A column holds values that cannot be read as its expected type.
    #[error("Column '{column}' cannot be read as {expected}: {reason}")]
    InvalidColumnType {
        column: String,
        expected: String,
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The state-to-region asset does not exist.
    #[error("Region lookup asset not found: {}", .0.display())]
    RegionAssetNotFound(PathBuf),

    /// A state code is listed under more than one region.
    #[error("State '{state}' is mapped to both '{first}' and '{second}'")]
    RegionConflict {
        state: String,
        first: String,
        second: String,
    },

    /// An input event file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::RegionAssetNotFound(_) => "REGION_ASSET_NOT_FOUND",
            Self::RegionConflict { .. } => "REGION_CONFLICT",
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error was caused by the static region asset rather than user data.
    pub fn is_asset_error(&self) -> bool {
        match self {
            Self::RegionAssetNotFound(_) | Self::RegionConflict { .. } => true,
            Self::WithContext { source, .. } => source.is_asset_error(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for PipelineError {
    fn from(err: ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::ColumnNotFound("userId".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PipelineError::RegionAssetNotFound(PathBuf::from("x.json")).error_code(),
            "REGION_ASSET_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_asset_error() {
        let conflict = PipelineError::RegionConflict {
            state: "OH".to_string(),
            first: "Midwest".to_string(),
            second: "South".to_string(),
        };
        assert!(conflict.is_asset_error());
        assert!(conflict.with_context("Loading regions").is_asset_error());
        assert!(!PipelineError::InputNotFound(PathBuf::from("train.json")).is_asset_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::ColumnNotFound("userAgent".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("userAgent"));
    }

    #[test]
    fn test_with_context() {
        let error =
            PipelineError::ColumnNotFound("ts".to_string()).with_context("During cleaning");
        assert!(error.to_string().contains("During cleaning"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: PipelineError = ConfigValidationError::InvalidEpsilon(0.0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
