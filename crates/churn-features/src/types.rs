use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the raw event log.
///
/// The event log uses camelCase field names (`userId`, `firstName`, ...).
pub mod columns {
    pub const USER_ID: &str = "userId";
    pub const SESSION_ID: &str = "sessionId";
    pub const TS: &str = "ts";
    pub const PAGE: &str = "page";
    pub const STATUS: &str = "status";
    pub const LEVEL: &str = "level";
    pub const LENGTH: &str = "length";
    pub const ARTIST: &str = "artist";
    pub const SONG: &str = "song";
    pub const GENDER: &str = "gender";
    pub const REGISTRATION: &str = "registration";
    pub const LOCATION: &str = "location";
    pub const USER_AGENT: &str = "userAgent";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";

    /// Per-event columns added during feature extraction.
    pub const REGION: &str = "region";
    pub const USER_AGENT_PROCESSED: &str = "userAgent_processed";

    /// Grouping keys; records missing either are dropped during cleaning.
    pub const KEYS: [&str; 2] = [USER_ID, SESSION_ID];

    /// Records missing any of these are dropped during cleaning.
    pub const USER_INFO: [&str; 6] = [LOCATION, USER_AGENT, LAST_NAME, FIRST_NAME, REGISTRATION, GENDER];

    /// Columns a non-empty event log must provide.
    pub const REQUIRED: [&str; 10] = [
        USER_ID,
        SESSION_ID,
        TS,
        PAGE,
        STATUS,
        LEVEL,
        GENDER,
        REGISTRATION,
        LOCATION,
        USER_AGENT,
    ];

    /// Raw identity columns removed before aggregation.
    pub const IDENTITY: [&str; 4] = [FIRST_NAME, LAST_NAME, USER_AGENT, LOCATION];
}

/// Column names of the per-user feature table.
pub mod feature_columns {
    pub const USER_ID: &str = "userId";
    pub const GENDER: &str = "gender";
    pub const REGISTRATION: &str = "registration";
    pub const REGION: &str = "region";
    pub const USER_AGENT: &str = "user_agent";
    pub const INITIAL_LEVEL: &str = "initial_level";
    pub const FINAL_LEVEL: &str = "final_level";
    pub const TOTAL_SESSIONS: &str = "total_sessions";
    pub const TOTAL_ERRORS: &str = "total_errors";
    pub const AVG_LISTEN_TIME: &str = "avg_listen_time";
    pub const LIKE_RATIO: &str = "like_ratio";
    pub const LABEL: &str = "label";

    /// Intermediate counts, dropped once the like ratio is derived.
    pub const LIKE_COUNT: &str = "like_count";
    pub const DISLIKE_COUNT: &str = "dislike_count";

    /// Output columns in the order they are written.
    pub const ALL: [&str; 12] = [
        USER_ID,
        GENDER,
        REGISTRATION,
        REGION,
        USER_AGENT,
        INITIAL_LEVEL,
        FINAL_LEVEL,
        TOTAL_SESSIONS,
        TOTAL_ERRORS,
        AVG_LISTEN_TIME,
        LIKE_RATIO,
        LABEL,
    ];
}

/// Canonical types of the event log columns.
///
/// Known columns are cast to these types before cleaning; unknown columns
/// keep whatever type the reader inferred.
pub fn event_column_types() -> Vec<(&'static str, DataType)> {
    use columns::*;
    vec![
        (USER_ID, DataType::String),
        (SESSION_ID, DataType::Int64),
        (TS, DataType::Int64),
        (PAGE, DataType::String),
        (STATUS, DataType::Int64),
        (LEVEL, DataType::String),
        (LENGTH, DataType::Float64),
        (ARTIST, DataType::String),
        (SONG, DataType::String),
        (GENDER, DataType::String),
        (REGISTRATION, DataType::Int64),
        (LOCATION, DataType::String),
        (USER_AGENT, DataType::String),
        (FIRST_NAME, DataType::String),
        (LAST_NAME, DataType::String),
    ]
}

/// Schema of an event log containing exactly the known columns.
pub fn event_schema() -> Schema {
    Schema::from_iter(
        event_column_types()
            .into_iter()
            .map(|(name, dtype)| Field::new(name.into(), dtype)),
    )
}

/// Row counts recorded by the cleaner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    /// Rows dropped for a null `userId` or `sessionId`.
    pub rows_missing_key: usize,
    /// Rows dropped for a missing identity-critical field.
    pub rows_missing_user_info: usize,
    /// Exact duplicates removed.
    pub rows_duplicate: usize,
    pub rows_after: usize,
    /// Human-readable description of each cleaning step.
    pub actions: Vec<String>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Summary of one dataset's run through the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    pub cleaning: CleaningReport,
    /// Number of feature rows (distinct users after cleaning).
    pub users: usize,
    /// Users with `label == 1`.
    pub churned_users: usize,
    /// Locations whose state code had no region mapping.
    pub unmapped_locations: usize,
}

impl PipelineSummary {
    /// Share of users labeled as churned (0.0 - 1.0).
    pub fn churn_rate(&self) -> f64 {
        if self.users == 0 {
            0.0
        } else {
            self.churned_users as f64 / self.users as f64
        }
    }
}

/// Output of [`ChurnPipeline::process`](crate::ChurnPipeline::process).
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One row per user, columns as in [`feature_columns::ALL`].
    pub features: DataFrame,
    pub summary: PipelineSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_schema_contains_all_known_columns() {
        let schema = event_schema();
        assert_eq!(schema.len(), event_column_types().len());
        for name in columns::REQUIRED {
            assert!(schema.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_churn_rate() {
        let summary = PipelineSummary {
            users: 4,
            churned_users: 1,
            ..Default::default()
        };
        assert_eq!(summary.churn_rate(), 0.25);
        assert_eq!(PipelineSummary::default().churn_rate(), 0.0);
    }

    #[test]
    fn test_rows_removed() {
        let report = CleaningReport {
            rows_before: 10,
            rows_after: 7,
            ..Default::default()
        };
        assert_eq!(report.rows_removed(), 3);
    }
}
