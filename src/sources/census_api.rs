use crate::error::{ExtractError, Result};
use crate::models::{ExtractRequest, FipsCodes};
use crate::readers::statistics_parser::excerpt;
use crate::settings::Settings;
use crate::sources::CensusSource;
use crate::utils::constants::{GEOMETRY_TRACT_FIELD, TRACT_COLUMN};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

const STATISTICS_SERVICE: &str = "Census statistics";
const GEOMETRY_SERVICE: &str = "TIGERweb geometry";

/// Census data API and TIGERweb over HTTP. One attempt per call.
pub struct CensusApiClient {
    client: Client,
    statistics_base_url: String,
    geometry_query_url: String,
}

impl CensusApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| ExtractError::Network {
                url: settings.statistics_base_url.clone(),
                source,
            })?;

        Ok(Self::with_client(
            client,
            &settings.statistics_base_url,
            &settings.geometry_query_url,
        ))
    }

    pub fn with_client(
        client: Client,
        statistics_base_url: &str,
        geometry_query_url: &str,
    ) -> Self {
        Self {
            client,
            statistics_base_url: statistics_base_url.trim_end_matches('/').to_string(),
            geometry_query_url: geometry_query_url.to_string(),
        }
    }

    /// `{base}/{year}/{dataset}?get=NAME,...&for=tract:*&in=state:SS&in=county:CCC`
    pub fn statistics_url(&self, request: &ExtractRequest, codes: &FipsCodes) -> String {
        format!(
            "{}/{}/{}?get={}&for={}:*&in=state:{}&in=county:{}",
            self.statistics_base_url,
            request.year,
            request.dataset.api_path(),
            request.requested_columns().join(","),
            TRACT_COLUMN,
            codes.state,
            codes.county
        )
    }

    /// Tract layer query filtered to one county, returned as WGS 84 GeoJSON
    pub fn geometry_url(&self, codes: &FipsCodes) -> String {
        format!(
            "{}?where=STATE+%3D+%27{}%27+AND+COUNTY+%3D+%27{}%27\
             &geometryType=esriGeometryPolygon&spatialRel=esriSpatialRelIntersects\
             &outFields={}&returnGeometry=true&outSR=4326&f=geojson",
            self.geometry_query_url, codes.state, codes.county, GEOMETRY_TRACT_FIELD
        )
    }

    async fn get(&self, service: &'static str, url: &str) -> Result<String> {
        debug!(service, %url, "sending request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ExtractError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ExtractError::Network {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                service,
                url: url.to_string(),
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Err(ExtractError::MalformedResponse {
                service,
                details: format!("no data returned for {}", url),
            });
        }

        info!(service, bytes = body.len(), "response received");
        Ok(body)
    }
}

#[async_trait]
impl CensusSource for CensusApiClient {
    async fn statistics(&self, request: &ExtractRequest, codes: &FipsCodes) -> Result<String> {
        let url = self.statistics_url(request, codes);
        self.get(STATISTICS_SERVICE, &url).await
    }

    async fn geometry(&self, codes: &FipsCodes) -> Result<String> {
        let url = self.geometry_url(codes);
        self.get(GEOMETRY_SERVICE, &url).await
    }
}
