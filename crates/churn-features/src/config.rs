//! Configuration types for the churn feature pipeline.
//!
//! The defaults reproduce the fixed feature definitions: the churn label
//! comes from "Cancellation Confirmation" pages, likes and dislikes from
//! "Thumbs Up"/"Thumbs Down", and errors are statuses of 400 and above.

use serde::{Deserialize, Serialize};

/// Page that marks a user as churned.
pub const DEFAULT_CHURN_PAGE: &str = "Cancellation Confirmation";
/// Page counted as a like.
pub const DEFAULT_LIKE_PAGE: &str = "Thumbs Up";
/// Page counted as a dislike.
pub const DEFAULT_DISLIKE_PAGE: &str = "Thumbs Down";
/// Lowest status code counted as an error.
pub const DEFAULT_ERROR_STATUS: i64 = 400;
/// Smoothing term of the like ratio denominator.
pub const DEFAULT_LIKE_RATIO_EPSILON: f64 = 1e-5;
/// Region assigned when a state code has no mapping.
pub const DEFAULT_UNKNOWN_REGION: &str = "unknown";

/// Configuration for feature extraction.
///
/// Use [`FeatureConfig::builder()`] to override individual values.
///
/// # Example
///
/// ```rust,ignore
/// use churn_features::FeatureConfig;
///
/// let config = FeatureConfig::builder()
///     .unknown_region("n/a")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Page whose presence anywhere in a user's history sets `label = 1`.
    /// Default: "Cancellation Confirmation"
    pub churn_page: String,

    /// Page counted into the like ratio numerator.
    /// Default: "Thumbs Up"
    pub like_page: String,

    /// Page counted into the like ratio denominator alongside likes.
    /// Default: "Thumbs Down"
    pub dislike_page: String,

    /// Events with `status >= error_status_threshold` count as errors.
    /// Default: 400
    pub error_status_threshold: i64,

    /// Added to the like ratio denominator so users without ratings get ~0.
    /// Default: 1e-5
    pub like_ratio_epsilon: f64,

    /// Region value for locations whose state code is not in the lookup.
    /// Default: "unknown"
    pub unknown_region: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            churn_page: DEFAULT_CHURN_PAGE.to_string(),
            like_page: DEFAULT_LIKE_PAGE.to_string(),
            dislike_page: DEFAULT_DISLIKE_PAGE.to_string(),
            error_status_threshold: DEFAULT_ERROR_STATUS,
            like_ratio_epsilon: DEFAULT_LIKE_RATIO_EPSILON,
            unknown_region: DEFAULT_UNKNOWN_REGION.to_string(),
        }
    }
}

impl FeatureConfig {
    /// Create a new configuration builder.
    pub fn builder() -> FeatureConfigBuilder {
        FeatureConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.like_ratio_epsilon.is_finite() || self.like_ratio_epsilon <= 0.0 {
            return Err(ConfigValidationError::InvalidEpsilon(
                self.like_ratio_epsilon,
            ));
        }

        for (field, value) in [
            ("churn_page", &self.churn_page),
            ("like_page", &self.like_page),
            ("dislike_page", &self.dislike_page),
            ("unknown_region", &self.unknown_region),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyValue(field.to_string()));
            }
        }

        if self.like_page == self.dislike_page {
            return Err(ConfigValidationError::SameRatingPages(self.like_page.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid like ratio epsilon: {0} (must be finite and greater than 0)")]
    InvalidEpsilon(f64),

    #[error("Configuration value '{0}' must not be empty")]
    EmptyValue(String),

    #[error("Like and dislike pages must differ, both are '{0}'")]
    SameRatingPages(String),
}

/// Builder for [`FeatureConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct FeatureConfigBuilder {
    churn_page: Option<String>,
    like_page: Option<String>,
    dislike_page: Option<String>,
    error_status_threshold: Option<i64>,
    like_ratio_epsilon: Option<f64>,
    unknown_region: Option<String>,
}

impl FeatureConfigBuilder {
    /// Set the page that defines the churn label.
    pub fn churn_page(mut self, page: impl Into<String>) -> Self {
        self.churn_page = Some(page.into());
        self
    }

    /// Set the page counted as a like.
    pub fn like_page(mut self, page: impl Into<String>) -> Self {
        self.like_page = Some(page.into());
        self
    }

    /// Set the page counted as a dislike.
    pub fn dislike_page(mut self, page: impl Into<String>) -> Self {
        self.dislike_page = Some(page.into());
        self
    }

    /// Set the lowest status code counted as an error.
    pub fn error_status_threshold(mut self, status: i64) -> Self {
        self.error_status_threshold = Some(status);
        self
    }

    /// Set the like ratio smoothing term.
    pub fn like_ratio_epsilon(mut self, epsilon: f64) -> Self {
        self.like_ratio_epsilon = Some(epsilon);
        self
    }

    /// Set the region used for unmapped state codes.
    pub fn unknown_region(mut self, region: impl Into<String>) -> Self {
        self.unknown_region = Some(region.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `FeatureConfig` or an error if validation fails.
    pub fn build(self) -> Result<FeatureConfig, ConfigValidationError> {
        let config = FeatureConfig {
            churn_page: self
                .churn_page
                .unwrap_or_else(|| DEFAULT_CHURN_PAGE.to_string()),
            like_page: self
                .like_page
                .unwrap_or_else(|| DEFAULT_LIKE_PAGE.to_string()),
            dislike_page: self
                .dislike_page
                .unwrap_or_else(|| DEFAULT_DISLIKE_PAGE.to_string()),
            error_status_threshold: self.error_status_threshold.unwrap_or(DEFAULT_ERROR_STATUS),
            like_ratio_epsilon: self
                .like_ratio_epsilon
                .unwrap_or(DEFAULT_LIKE_RATIO_EPSILON),
            unknown_region: self
                .unknown_region
                .unwrap_or_else(|| DEFAULT_UNKNOWN_REGION.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.churn_page, "Cancellation Confirmation");
        assert_eq!(config.error_status_threshold, 400);
        assert_eq!(config.like_ratio_epsilon, 1e-5);
        assert_eq!(config.unknown_region, "unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_matches_default() {
        let config = FeatureConfig::builder().build().unwrap();
        assert_eq!(config, FeatureConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = FeatureConfig::builder()
            .churn_page("Downgrade")
            .error_status_threshold(500)
            .unknown_region("other")
            .build()
            .unwrap();

        assert_eq!(config.churn_page, "Downgrade");
        assert_eq!(config.error_status_threshold, 500);
        assert_eq!(config.unknown_region, "other");
        assert_eq!(config.like_page, DEFAULT_LIKE_PAGE);
    }

    #[test]
    fn test_invalid_epsilon() {
        assert!(FeatureConfig::builder().like_ratio_epsilon(0.0).build().is_err());
        assert!(FeatureConfig::builder().like_ratio_epsilon(-1.0).build().is_err());
        assert!(
            FeatureConfig::builder()
                .like_ratio_epsilon(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_empty_values_rejected() {
        let err = FeatureConfig::builder().unknown_region("  ").build().unwrap_err();
        assert!(err.to_string().contains("unknown_region"));
    }

    #[test]
    fn test_same_rating_pages_rejected() {
        let result = FeatureConfig::builder()
            .like_page("Thumbs Up")
            .dislike_page("Thumbs Up")
            .build();
        assert!(matches!(result, Err(ConfigValidationError::SameRatingPages(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = FeatureConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FeatureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
