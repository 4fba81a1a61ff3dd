//! State code to region lookup.
//!
//! The lookup is loaded once per run from a JSON asset shaped as
//! `{ "Region": ["ST", ...], ... }` and inverted into state code → region.
//! It is immutable after construction and shared by reference (or `Arc`)
//! between datasets.

use crate::error::{PipelineError, Result, ResultExt};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Immutable mapping from US state code to region name.
///
/// Lookups are exact: codes are neither case-folded nor reformatted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionLookup {
    state_to_region: HashMap<String, String>,
}

static_assertions::assert_impl_all!(RegionLookup: Send, Sync);

impl RegionLookup {
    /// Invert a region → states mapping.
    ///
    /// Listing a state twice under the same region is harmless; listing it
    /// under two different regions is rejected.
    pub fn from_regions<I, R, S>(regions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (R, Vec<S>)>,
        R: Into<String>,
        S: Into<String>,
    {
        let mut state_to_region: HashMap<String, String> = HashMap::new();

        for (region, states) in regions {
            let region = region.into();
            for state in states {
                let state = state.into();
                match state_to_region.get(&state) {
                    Some(existing) if existing != &region => {
                        return Err(PipelineError::RegionConflict {
                            state,
                            first: existing.clone(),
                            second: region,
                        });
                    }
                    Some(_) => {}
                    None => {
                        state_to_region.insert(state, region.clone());
                    }
                }
            }
        }

        Ok(Self { state_to_region })
    }

    /// Parse the JSON asset format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let regions: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::from_regions(regions)
    }

    /// Load and invert the JSON asset at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading state to region mapping...");

        if !path.exists() {
            return Err(PipelineError::RegionAssetNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .context(format!("Reading region lookup {}", path.display()))?;
        let lookup = Self::from_json_str(&content)
            .context(format!("Parsing region lookup {}", path.display()))?;

        info!("Mapping loaded: {} states.", lookup.len());
        Ok(lookup)
    }

    /// Region of a state code, if mapped.
    pub fn region_for_state(&self, state: &str) -> Option<&str> {
        self.state_to_region.get(state).map(String::as_str)
    }

    /// Region of a "city, STATE" location string, if its state is mapped.
    pub fn region_for_location(&self, location: &str) -> Option<&str> {
        let state = state_code(location);
        let region = self.region_for_state(state);
        if region.is_none() {
            debug!("No region for state code '{}'", state);
        }
        region
    }

    /// Number of mapped state codes.
    pub fn len(&self) -> usize {
        self.state_to_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_to_region.is_empty()
    }
}

/// The trailing comma-separated token of a location, trimmed.
///
/// `"Bakersfield, CA"` yields `"CA"`; a location without commas yields the
/// whole trimmed string.
pub fn state_code(location: &str) -> &str {
    location.rsplit(',').next().unwrap_or(location).trim()
}
