//! Event cleaning.
//!
//! Cleaning applies four rules, in order:
//! - Dropping records without a `userId` or `sessionId`
//! - Dropping records that miss an identity-critical field
//! - Filling missing song metadata with defaults
//! - Removing exact duplicate records

mod converters;

pub use converters::empty_events;

use crate::error::{Result, ResultExt};
use crate::types::{CleaningReport, columns};
use crate::utils::require_columns;
use converters::coerce_event_types;
use polars::prelude::*;
use tracing::{debug, info};

/// Value used for missing `artist` and `song`.
pub const UNKNOWN_TEXT: &str = "Unknown";
/// Value used for missing `length`.
pub const DEFAULT_LENGTH: f64 = 0.0;

/// Clean a raw event frame.
///
/// An empty frame (even one without columns) cleans to an empty frame with
/// the event schema. A non-empty frame must contain every column of
/// [`columns::REQUIRED`].
///
/// Cleaning is idempotent: running it on its own output removes nothing.
pub fn clean(events: DataFrame) -> Result<(DataFrame, CleaningReport)> {
    info!("Cleaning data...");

    let mut report = CleaningReport {
        rows_before: events.height(),
        ..Default::default()
    };

    let events = if events.height() == 0 {
        empty_events()
    } else {
        require_columns(&events, &columns::REQUIRED)?;
        coerce_event_types(events).context("Normalizing event column types")?
    };

    // 1. Drop rows without a grouping key
    let df = events
        .lazy()
        .filter(all_not_null(&columns::KEYS))
        .collect()
        .context("Filtering records without userId or sessionId")?;

    report.rows_missing_key = report.rows_before - df.height();
    if report.rows_missing_key > 0 {
        report.actions.push(format!(
            "Removed {} rows without userId or sessionId ({:.1}%)",
            report.rows_missing_key,
            percentage(report.rows_missing_key, report.rows_before)
        ));
        debug!("Removed {} rows without a key", report.rows_missing_key);
    }

    // 2. Drop rows missing critical user info
    let before_user_info = df.height();
    let df = df
        .lazy()
        .filter(all_not_null(&columns::USER_INFO))
        // 3. Fill missing song info
        .with_columns([
            col(columns::LENGTH).fill_null(lit(DEFAULT_LENGTH)),
            col(columns::ARTIST).fill_null(lit(UNKNOWN_TEXT)),
            col(columns::SONG).fill_null(lit(UNKNOWN_TEXT)),
        ])
        .collect()
        .context("Filtering records without user info")?;

    report.rows_missing_user_info = before_user_info - df.height();
    if report.rows_missing_user_info > 0 {
        report.actions.push(format!(
            "Removed {} rows missing user info ({:.1}%)",
            report.rows_missing_user_info,
            percentage(report.rows_missing_user_info, before_user_info)
        ));
        debug!(
            "Removed {} rows missing user info",
            report.rows_missing_user_info
        );
    } else {
        report.actions.push("No rows missing user info".to_string());
    }
    report
        .actions
        .push("Filled missing length with 0 and artist/song with 'Unknown'".to_string());

    // 4. Drop exact duplicates, keeping the first occurrence in input order
    let before_duplicates = df.height();
    let df = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .context("Removing duplicate records")?;

    report.rows_duplicate = before_duplicates - df.height();
    if report.rows_duplicate > 0 {
        report.actions.push(format!(
            "Removed {} duplicate rows ({:.1}%)",
            report.rows_duplicate,
            percentage(report.rows_duplicate, before_duplicates)
        ));
        debug!("Removed {} duplicate rows", report.rows_duplicate);
    } else {
        report.actions.push("No duplicate rows found".to_string());
    }

    report.rows_after = df.height();
    info!("Data cleaned: {} rows remaining.", report.rows_after);

    Ok((df, report))
}

/// True where every column in `names` is non-null.
fn all_not_null(names: &[&str]) -> Expr {
    names
        .iter()
        .map(|name| col(*name).is_not_null())
        .reduce(|acc, expr| acc.and(expr))
        .unwrap_or_else(|| lit(true))
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, event_frame};
    use pretty_assertions::assert_eq;

    fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_drops_rows_missing_user_info() {
        let df = event_frame(&[
            Event::new("1", 1, "Home"),
            Event::new("2", 1, "Home").location(None),
            Event::new("3", 1, "Home").user_agent(None),
            Event::new("4", 1, "Home").first_name(None),
            Event::new("5", 1, "Home").last_name(None),
            Event::new("6", 1, "Home").registration(None),
            Event::new("7", 1, "Home").gender(None),
        ]);

        let (cleaned, report) = clean(df).unwrap();

        assert_eq!(cleaned.height(), 1);
        assert_eq!(str_values(&cleaned, columns::USER_ID), vec![Some("1".to_string())]);
        assert_eq!(report.rows_before, 7);
        assert_eq!(report.rows_missing_user_info, 6);
        assert_eq!(report.rows_after, 1);
    }

    #[test]
    fn test_drops_rows_without_user_or_session_id() {
        let df = event_frame(&[
            Event::new("1", 1, "Home"),
            Event::new("1", 2, "Home").missing_session(),
            Event::new("9", 3, "Home").session(5).missing_user_id(),
        ]);

        let (cleaned, report) = clean(df).unwrap();

        assert_eq!(cleaned.height(), 1);
        assert_eq!(report.rows_missing_key, 2);
        assert_eq!(report.rows_missing_user_info, 0);
        assert_eq!(report.rows_removed(), 2);
        for name in columns::KEYS {
            assert_eq!(cleaned.column(name).unwrap().null_count(), 0);
        }
    }

    #[test]
    fn test_non_numeric_timestamp_is_rejected() {
        let mut df = event_frame(&[Event::new("1", 1, "Home")]);
        df.with_column(Series::new(columns::TS.into(), ["2018-10-01"]))
            .unwrap();

        let err = clean(df).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_COLUMN_TYPE");
        assert!(err.to_string().contains(columns::TS));
    }

    #[test]
    fn test_fills_missing_song_info() {
        let df = event_frame(&[
            Event::new("1", 1, "NextSong").length(Some(200.5)).song(Some("Song A")),
            Event::new("1", 2, "Home").length(None).artist(None).song(None),
        ]);

        let (cleaned, report) = clean(df).unwrap();

        assert_eq!(report.rows_missing_user_info, 0);
        let lengths: Vec<Option<f64>> = cleaned
            .column(columns::LENGTH)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(lengths, vec![Some(200.5), Some(0.0)]);
        assert_eq!(
            str_values(&cleaned, columns::SONG),
            vec![Some("Song A".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(str_values(&cleaned, columns::ARTIST)[1], Some("Unknown".to_string()));
    }

    #[test]
    fn test_removes_exact_duplicates_only() {
        let df = event_frame(&[
            Event::new("1", 1, "Home"),
            Event::new("1", 1, "Home"),
            Event::new("1", 2, "Home"),
            Event::new("1", 1, "Home").status(404),
        ]);

        let (cleaned, report) = clean(df).unwrap();

        assert_eq!(cleaned.height(), 3);
        assert_eq!(report.rows_duplicate, 1);
    }

    #[test]
    fn test_rows_differing_only_in_filled_value_become_duplicates() {
        // A null length and an explicit 0.0 are indistinguishable after filling.
        let df = event_frame(&[
            Event::new("1", 1, "Home").length(None),
            Event::new("1", 1, "Home").length(Some(0.0)),
        ]);

        let (cleaned, report) = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(report.rows_duplicate, 1);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let df = event_frame(&[
            Event::new("1", 1, "Home"),
            Event::new("1", 1, "Home"),
            Event::new("2", 1, "Home").gender(None),
            Event::new("3", 5, "NextSong").length(None),
        ]);

        let (once, _) = clean(df).unwrap();
        let (twice, report) = clean(once.clone()).unwrap();

        assert_eq!(report.rows_missing_user_info, 0);
        assert_eq!(report.rows_duplicate, 0);
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_empty_input() {
        let (cleaned, report) = clean(DataFrame::empty()).unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(report.rows_after, 0);
        assert!(cleaned.column(columns::USER_ID).is_ok());
    }

    #[test]
    fn test_missing_required_column() {
        let df = event_frame(&[Event::new("1", 1, "Home")]).drop(columns::STATUS).unwrap();
        let err = clean(df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_missing_name_columns_drop_every_row() {
        let df = event_frame(&[Event::new("1", 1, "Home")])
            .drop(columns::FIRST_NAME)
            .unwrap();

        let (cleaned, report) = clean(df).unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(report.rows_missing_user_info, 1);
    }
}
