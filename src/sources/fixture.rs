use crate::error::{ExtractError, Result};
use crate::models::{ExtractRequest, FipsCodes};
use crate::sources::CensusSource;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

/// Serves canned response bodies instead of calling the network.
pub struct FixtureSource {
    statistics_body: String,
    geometry_body: String,
    requested: Mutex<Vec<FipsCodes>>,
}

impl FixtureSource {
    pub fn new(statistics_body: impl Into<String>, geometry_body: impl Into<String>) -> Self {
        Self {
            statistics_body: statistics_body.into(),
            geometry_body: geometry_body.into(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Load saved responses, e.g. captured from a previous run
    pub fn from_files(statistics_path: &Path, geometry_path: &Path) -> Result<Self> {
        Ok(Self::new(
            std::fs::read_to_string(statistics_path)
                .map_err(ExtractError::file_access("read", statistics_path))?,
            std::fs::read_to_string(geometry_path)
                .map_err(ExtractError::file_access("read", geometry_path))?,
        ))
    }

    /// Codes passed to either method, in call order
    pub fn requested_codes(&self) -> Vec<FipsCodes> {
        self.requested
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }

    fn note(&self, codes: &FipsCodes) {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(codes.clone());
        }
    }
}

#[async_trait]
impl CensusSource for FixtureSource {
    async fn statistics(&self, _request: &ExtractRequest, codes: &FipsCodes) -> Result<String> {
        self.note(codes);
        Ok(self.statistics_body.clone())
    }

    async fn geometry(&self, codes: &FipsCodes) -> Result<String> {
        self.note(codes);
        Ok(self.geometry_body.clone())
    }
}
