use crate::error::{ExtractError, Result};
use crate::utils::constants::{
    COUNTY_COLUMN, FIRST_ACS5_YEAR, LABEL_COLUMN, STATE_COLUMN, TRACT_COLUMN,
};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

/// ACS 5-year table families exposed by the Census data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcsDataset {
    /// Detailed tables (B/C prefixed variables)
    Detailed,
    /// Data profiles (DP prefixed variables)
    #[default]
    Profile,
    /// Subject tables (S prefixed variables)
    Subject,
    /// Comparison profiles (CP prefixed variables)
    Comparison,
}

impl AcsDataset {
    pub fn api_path(&self) -> &'static str {
        match self {
            AcsDataset::Detailed => "acs/acs5",
            AcsDataset::Profile => "acs/acs5/profile",
            AcsDataset::Subject => "acs/acs5/subject",
            AcsDataset::Comparison => "acs/acs5/cprofile",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AcsDataset::Detailed => "ACS 5-year detailed tables",
            AcsDataset::Profile => "ACS 5-year data profiles",
            AcsDataset::Subject => "ACS 5-year subject tables",
            AcsDataset::Comparison => "ACS 5-year comparison profiles",
        }
    }

    /// Census page listing the variable names for a year
    pub fn variables_url(&self, year: u16) -> String {
        format!(
            "https://api.census.gov/data/{}/{}/variables.html",
            year,
            self.api_path()
        )
    }
}

impl FromStr for AcsDataset {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "detailed" | "acs5" => Ok(AcsDataset::Detailed),
            "profile" => Ok(AcsDataset::Profile),
            "subject" => Ok(AcsDataset::Subject),
            "comparison" | "cprofile" => Ok(AcsDataset::Comparison),
            other => Err(ExtractError::InvalidInput(format!(
                "Unknown dataset '{}' (expected detailed, profile, subject or comparison)",
                other
            ))),
        }
    }
}

impl fmt::Display for AcsDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_path())
    }
}

/// A fully collected extraction request, checked before any network call.
#[derive(Debug, Clone, Validate)]
pub struct ExtractRequest {
    #[validate(length(equal = 2))]
    pub state_abbr: String,

    #[validate(length(min = 1))]
    pub county_name: String,

    #[validate(range(min = 2009, max = 2100))]
    pub year: u16,

    #[validate(length(min = 1))]
    pub variables: Vec<String>,

    pub output_dir: PathBuf,

    pub dataset: AcsDataset,

    /// Abort on the first non-numeric statistic instead of nulling it
    pub strict: bool,

    /// Bundle the shapefile components into a zip archive
    pub zip: bool,
}

impl ExtractRequest {
    pub fn new(
        state_abbr: &str,
        county_name: &str,
        year: u16,
        variables: Vec<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            state_abbr: state_abbr.trim().to_uppercase(),
            county_name: county_name.trim().to_string(),
            year,
            variables: dedupe_variables(variables),
            output_dir,
            dataset: AcsDataset::default(),
            strict: false,
            zip: false,
        }
    }

    pub fn with_dataset(mut self, dataset: AcsDataset) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_zip(mut self, zip: bool) -> Self {
        self.zip = zip;
        self
    }

    /// Run the derived field checks plus the rules the derive cannot express.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !self.state_abbr.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ExtractError::InvalidInput(format!(
                "State abbreviation must be two letters, got '{}'",
                self.state_abbr
            )));
        }

        let current_year = Local::now().year();
        if self.year < FIRST_ACS5_YEAR || i32::from(self.year) > current_year {
            return Err(ExtractError::InvalidInput(format!(
                "Year {} is outside the ACS 5-year range {}-{}",
                self.year, FIRST_ACS5_YEAR, current_year
            )));
        }

        for variable in &self.variables {
            check_variable_name(variable)?;
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ExtractError::InvalidInput(
                "Output directory must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Columns requested from the statistics API, label first
    pub fn requested_columns(&self) -> Vec<String> {
        std::iter::once(LABEL_COLUMN.to_string())
            .chain(self.variables.iter().cloned())
            .collect()
    }
}

/// Split free-text variable input on whitespace or commas.
pub fn parse_variables(input: &str) -> Vec<String> {
    let variables = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    dedupe_variables(variables)
}

fn dedupe_variables(variables: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(variables.len());
    for variable in variables {
        let variable = variable.trim().to_string();
        if !variable.is_empty() && !unique.contains(&variable) {
            unique.push(variable);
        }
    }
    unique
}

fn check_variable_name(variable: &str) -> Result<()> {
    if !variable
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ExtractError::InvalidInput(format!(
            "Variable '{}' may only contain letters, digits and underscores",
            variable
        )));
    }

    let reserved = [LABEL_COLUMN, STATE_COLUMN, COUNTY_COLUMN, TRACT_COLUMN];
    if reserved.iter().any(|r| r.eq_ignore_ascii_case(variable)) {
        return Err(ExtractError::InvalidInput(format!(
            "Variable '{}' is requested automatically and cannot be listed",
            variable
        )));
    }

    Ok(())
}
