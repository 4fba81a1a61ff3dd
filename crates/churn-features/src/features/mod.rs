//! Per-user feature extraction.
//!
//! Turns cleaned events into one feature row per user:
//! 1. Derive `region` and the normalized browser for every event
//! 2. Drop the raw identity columns
//! 3. Sort by (userId, ts) and reduce each user's events
//! 4. Derive `like_ratio` from the like/dislike counts
//!
//! "First" and "last" always refer to chronological order within a user,
//! never to input order.

mod region;
mod user_agent;

pub use region::{RegionLookup, state_code};
pub use user_agent::Browser;

use crate::config::FeatureConfig;
use crate::error::{Result, ResultExt};
use crate::types::{columns, feature_columns as out};
use crate::utils::require_columns;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Event-level columns the aggregation reads.
const AGGREGATION_INPUT: [&str; 10] = [
    columns::USER_ID,
    columns::SESSION_ID,
    columns::TS,
    columns::PAGE,
    columns::STATUS,
    columns::LEVEL,
    columns::LENGTH,
    columns::GENDER,
    columns::REGISTRATION,
    columns::LOCATION,
];

/// Aggregate cleaned events into the per-user feature table.
///
/// Produces exactly one row per distinct `userId`, ordered by `userId`.
/// Locations whose state code is not in `lookup` get
/// [`FeatureConfig::unknown_region`] instead of failing.
pub fn aggregate(
    events: DataFrame,
    lookup: &RegionLookup,
    config: &FeatureConfig,
) -> Result<DataFrame> {
    Ok(extract_features(events, lookup, config)?.0)
}

/// Like [`aggregate`], also returning how many events had an unmapped location.
pub(crate) fn extract_features(
    events: DataFrame,
    lookup: &RegionLookup,
    config: &FeatureConfig,
) -> Result<(DataFrame, usize)> {
    info!("Starting feature extraction...");

    require_columns(&events, &AGGREGATION_INPUT)?;
    let (events, unmapped) = derive_event_features(events, lookup, config)?;

    if unmapped > 0 {
        warn!(
            "{} events have a location without region mapping, using '{}'",
            unmapped, config.unknown_region
        );
    }

    let features = events
        .lazy()
        // null keys form no user
        .filter(col(columns::USER_ID).is_not_null())
        .sort(
            [columns::USER_ID, columns::TS],
            SortMultipleOptions::default()
                .with_maintain_order(true)
                .with_nulls_last(true),
        )
        .group_by_stable([col(columns::USER_ID)])
        .agg(user_aggregations(config))
        .with_column(like_ratio(config.like_ratio_epsilon))
        .select(out::ALL.map(col))
        .collect()
        .context("Aggregating user features")?;

    info!(
        "Feature extraction completed: {} users.",
        features.height()
    );
    Ok((features, unmapped))
}

/// Add `region` and `userAgent_processed`, then drop the raw identity columns.
fn derive_event_features(
    mut df: DataFrame,
    lookup: &RegionLookup,
    config: &FeatureConfig,
) -> Result<(DataFrame, usize)> {
    let mut unmapped = 0;

    let regions: Vec<&str> = {
        let locations = df.column(columns::LOCATION)?.as_materialized_series().str()?;
        locations
            .into_iter()
            .map(|location| {
                match location.and_then(|loc| lookup.region_for_location(loc)) {
                    Some(region) => region,
                    None => {
                        unmapped += 1;
                        config.unknown_region.as_str()
                    }
                }
            })
            .collect()
    };

    let browsers: Vec<&'static str> = match df.column(columns::USER_AGENT) {
        Ok(column) => match column.as_materialized_series().str() {
            Ok(agents) => agents
                .into_iter()
                .map(|ua| Browser::classify(ua).as_str())
                .collect(),
            Err(_) => {
                debug!("userAgent is not a string column, classifying all as Other");
                vec![Browser::Other.as_str(); df.height()]
            }
        },
        Err(_) => vec![Browser::Other.as_str(); df.height()],
    };

    df.with_column(Series::new(columns::REGION.into(), regions))?;
    df.with_column(Series::new(columns::USER_AGENT_PROCESSED.into(), browsers))?;

    // drop raw identity columns
    let cols_to_drop: Vec<PlSmallStr> = columns::IDENTITY.iter().map(|c| (*c).into()).collect();
    let df = df.drop_many(cols_to_drop);

    Ok((df, unmapped))
}

/// One expression per aggregated column, evaluated over a user's events in
/// chronological order.
fn user_aggregations(config: &FeatureConfig) -> Vec<Expr> {
    vec![
        first_valid(columns::GENDER).alias(out::GENDER),
        first_valid(columns::REGISTRATION).alias(out::REGISTRATION),
        col(columns::REGION).last().alias(out::REGION),
        col(columns::USER_AGENT_PROCESSED)
            .last()
            .alias(out::USER_AGENT),
        first_valid(columns::LEVEL).alias(out::INITIAL_LEVEL),
        last_valid(columns::LEVEL).alias(out::FINAL_LEVEL),
        col(columns::SESSION_ID)
            .drop_nulls()
            .n_unique()
            .cast(DataType::Int64)
            .alias(out::TOTAL_SESSIONS),
        col(columns::STATUS)
            .gt_eq(lit(config.error_status_threshold))
            .sum()
            .cast(DataType::Int64)
            .alias(out::TOTAL_ERRORS),
        count_page(&config.like_page).alias(out::LIKE_COUNT),
        count_page(&config.dislike_page).alias(out::DISLIKE_COUNT),
        col(columns::LENGTH).mean().alias(out::AVG_LISTEN_TIME),
        count_page(&config.churn_page)
            .gt(lit(0i64))
            .cast(DataType::Int32)
            .alias(out::LABEL),
    ]
}

/// Earliest non-null value of `name` in the group.
fn first_valid(name: &str) -> Expr {
    col(name).drop_nulls().first()
}

/// Latest non-null value of `name` in the group.
fn last_valid(name: &str) -> Expr {
    col(name).drop_nulls().last()
}

/// Number of events in the group whose page equals `page`.
fn count_page(page: &str) -> Expr {
    col(columns::PAGE)
        .eq(lit(page.to_string()))
        .sum()
        .cast(DataType::Int64)
}

/// `like_count / (like_count + dislike_count + epsilon)`.
fn like_ratio(epsilon: f64) -> Expr {
    let likes = col(out::LIKE_COUNT).cast(DataType::Float64);
    let dislikes = col(out::DISLIKE_COUNT).cast(DataType::Float64);
    (likes.clone() / (likes + dislikes + lit(epsilon))).alias(out::LIKE_RATIO)
}
