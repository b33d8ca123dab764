use crate::error::{ExtractError, Result};
use crate::models::{FipsLookup, FipsRecord};
use crate::utils::constants::{COUNTY_CODE_WIDTH, DEFAULT_LOOKUP_ENCODING, STATE_CODE_WIDTH};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct RawFipsRow {
    state_abbr: String,
    county_name: String,
    state: String,
    county: String,
}

/// Loads the county FIPS reference CSV into a [`FipsLookup`].
pub struct FipsReader {
    fallback_encoding: &'static Encoding,
}

impl FipsReader {
    pub fn new() -> Self {
        Self {
            fallback_encoding: encoding_rs::GBK,
        }
    }

    /// Use a different legacy encoding for files that are not valid UTF-8
    pub fn with_encoding(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            ExtractError::InvalidInput(format!("Unknown lookup encoding: '{}'", label))
        })?;
        Ok(Self {
            fallback_encoding: encoding,
        })
    }

    pub fn read_lookup(&self, path: &Path) -> Result<FipsLookup> {
        let bytes =
            std::fs::read(path).map_err(ExtractError::file_access("read FIPS lookup", path))?;

        let lookup = self.parse_lookup(&bytes)?;
        info!(
            path = %path.display(),
            rows = lookup.len(),
            "loaded FIPS lookup table"
        );
        Ok(lookup)
    }

    pub fn parse_lookup(&self, bytes: &[u8]) -> Result<FipsLookup> {
        let text = self.decode(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for (row_index, row) in reader.deserialize::<RawFipsRow>().enumerate() {
            let row = row?;
            // header is line 1
            let line = row_index + 2;
            let state_code = parse_code(&row.state, STATE_CODE_WIDTH, "state", line)?;
            let county_code = parse_code(&row.county, COUNTY_CODE_WIDTH, "county", line)?;
            records.push(FipsRecord {
                state_abbr: row.state_abbr,
                county_name: row.county_name,
                state_code,
                county_code,
            });
        }

        if records.is_empty() {
            return Err(ExtractError::InvalidFormat(
                "FIPS lookup table contains no rows".to_string(),
            ));
        }

        Ok(FipsLookup::new(records))
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text.trim_start_matches('\u{feff}')),
            Err(_) => {
                debug!(
                    encoding = self.fallback_encoding.name(),
                    "lookup is not UTF-8, decoding with fallback encoding"
                );
                let (text, _, had_errors) = self.fallback_encoding.decode(bytes);
                if had_errors {
                    debug!("lookup contained unmappable bytes; replaced");
                }
                text
            }
        }
    }
}

impl Default for FipsReader {
    fn default() -> Self {
        Self::with_encoding(DEFAULT_LOOKUP_ENCODING).unwrap_or_else(|_| Self::new())
    }
}

/// Parse a numeric code column, accepting `6` and `6.0` forms
fn parse_code(raw: &str, width: usize, column: &str, line: usize) -> Result<u32> {
    let invalid = || {
        ExtractError::InvalidFormat(format!(
            "Invalid {} code '{}' on lookup line {}",
            column, raw, line
        ))
    };

    let value = match raw.parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            let float = raw.parse::<f64>().map_err(|_| invalid())?;
            if float < 0.0 || float.fract() != 0.0 {
                return Err(invalid());
            }
            float as u32
        }
    };

    if value.to_string().len() > width {
        return Err(ExtractError::InvalidFormat(format!(
            "{} code {} on lookup line {} exceeds {} digits",
            column, value, line, width
        )));
    }

    Ok(value)
}
