use crate::error::{ExtractError, Result};
use crate::utils::constants::{COUNTY_CODE_WIDTH, EXAMPLE_COUNTY_COUNT, STATE_CODE_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the county FIPS reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FipsRecord {
    pub state_abbr: String,
    pub county_name: String,
    pub state_code: u32,
    pub county_code: u32,
}

impl FipsRecord {
    pub fn new(state_abbr: &str, county_name: &str, state_code: u32, county_code: u32) -> Self {
        Self {
            state_abbr: state_abbr.to_string(),
            county_name: county_name.to_string(),
            state_code,
            county_code,
        }
    }

    pub fn codes(&self) -> FipsCodes {
        FipsCodes::from_numeric(self.state_code, self.county_code)
    }
}

/// Zero-padded state (2 digit) and county (3 digit) codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FipsCodes {
    pub state: String,
    pub county: String,
}

impl FipsCodes {
    pub fn from_numeric(state_code: u32, county_code: u32) -> Self {
        Self {
            state: format!("{:0width$}", state_code, width = STATE_CODE_WIDTH),
            county: format!("{:0width$}", county_code, width = COUNTY_CODE_WIDTH),
        }
    }

    /// Five digit county GEOID
    pub fn geoid(&self) -> String {
        format!("{}{}", self.state, self.county)
    }
}

impl fmt::Display for FipsCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state {} county {}", self.state, self.county)
    }
}

/// The loaded reference table.
///
/// Built once per run (see [`crate::readers::FipsReader`]) and passed by
/// reference to whatever needs to resolve codes. It is never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct FipsLookup {
    records: Vec<FipsRecord>,
}

impl FipsLookup {
    pub fn new(records: Vec<FipsRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FipsRecord] {
        &self.records
    }

    /// Resolve a state abbreviation and county name to padded FIPS codes.
    ///
    /// The state abbreviation is compared case-insensitively, the county name
    /// exactly once surrounding whitespace is removed. Rows repeating the same
    /// codes count as a single match.
    pub fn resolve(&self, state_abbr: &str, county_name: &str) -> Result<FipsCodes> {
        let state = state_abbr.trim();
        let county = county_name.trim();

        let mut matches: Vec<FipsCodes> = Vec::new();
        for record in self.records_for_state(state) {
            if record.county_name.trim() == county {
                let codes = record.codes();
                if !matches.contains(&codes) {
                    matches.push(codes);
                }
            }
        }

        match matches.len() {
            0 => Err(ExtractError::LookupNotFound {
                state: state.to_string(),
                county: county.to_string(),
                suggestions: self.example_counties(state, EXAMPLE_COUNTY_COUNT),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(ExtractError::LookupAmbiguous {
                state: state.to_string(),
                county: county.to_string(),
                candidates: matches.iter().map(FipsCodes::geoid).collect(),
            }),
        }
    }

    /// County names listed for a state, in table order
    pub fn counties_for_state(&self, state_abbr: &str) -> Vec<&str> {
        self.records_for_state(state_abbr.trim())
            .map(|r| r.county_name.as_str())
            .collect()
    }

    /// First `limit` county names for a state, used as prompt hints
    pub fn example_counties(&self, state_abbr: &str, limit: usize) -> Vec<String> {
        self.counties_for_state(state_abbr)
            .into_iter()
            .take(limit)
            .map(str::to_string)
            .collect()
    }

    pub fn has_state(&self, state_abbr: &str) -> bool {
        self.records_for_state(state_abbr.trim()).next().is_some()
    }

    fn records_for_state<'a, 'b>(
        &'a self,
        state: &'b str,
    ) -> impl Iterator<Item = &'a FipsRecord> + 'b
    where
        'a: 'b,
    {
        self.records
            .iter()
            .filter(move |r| r.state_abbr.trim().eq_ignore_ascii_case(state))
    }
}
