pub mod census_api;
pub mod fixture;

pub use census_api::CensusApiClient;
pub use fixture::FixtureSource;

use crate::error::Result;
use crate::models::{ExtractRequest, FipsCodes};
use async_trait::async_trait;

/// Where the statistics table and the tract boundaries come from.
///
/// Both methods return the raw response body; parsing lives in
/// [`crate::readers`] so any source yields the same typed errors.
#[async_trait]
pub trait CensusSource: Send + Sync {
    /// Statistics table (JSON array of arrays) for every tract in the county.
    async fn statistics(&self, request: &ExtractRequest, codes: &FipsCodes) -> Result<String>;
    /// Tract boundaries (GeoJSON FeatureCollection) for the county.
    async fn geometry(&self, codes: &FipsCodes) -> Result<String>;
}
