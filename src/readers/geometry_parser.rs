use crate::error::{ExtractError, Result};
use crate::models::{GeometryCollection, PolygonPart, Ring, TractFeature};
use crate::readers::statistics_parser::excerpt;
use crate::utils::constants::{GEOMETRY_TRACT_FIELD, TRACT_CODE_WIDTH};
use geojson::{Feature, GeoJson, PolygonType, Position};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

const SERVICE: &str = "TIGERweb geometry";

/// Reads the tract layer query response (GeoJSON) into tract features.
pub struct GeometryParser;

impl GeometryParser {
    pub fn new() -> Self {
        Self
    }

    pub fn read_collection(&self, path: &Path) -> Result<GeometryCollection> {
        let body = std::fs::read_to_string(path)
            .map_err(ExtractError::file_access("read geometry response", path))?;
        self.parse(&body)
    }

    pub fn parse(&self, body: &str) -> Result<GeometryCollection> {
        if body.trim().is_empty() {
            return Err(malformed("empty response body".to_string()));
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| malformed(format!("{} in body: {}", e, excerpt(body))))?;

        if let Some(error) = value.get("error") {
            return Err(ExtractError::Service {
                service: SERVICE,
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        let transfer_limit_exceeded = value
            .get("exceededTransferLimit")
            .or_else(|| value.pointer("/properties/exceededTransferLimit"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let collection = match GeoJson::from_json_value(value) {
            Ok(GeoJson::FeatureCollection(collection)) => collection,
            Ok(_) => {
                return Err(malformed(
                    "expected a FeatureCollection at the top level".to_string(),
                ))
            }
            Err(e) => return Err(malformed(e.to_string())),
        };

        let mut result = GeometryCollection {
            transfer_limit_exceeded,
            ..Default::default()
        };

        for (index, feature) in collection.features.iter().enumerate() {
            match self.convert_feature(index, feature)? {
                Some(tract) => result.features.push(tract),
                None => result.skipped_features += 1,
            }
        }

        if result.skipped_features > 0 {
            warn!(
                skipped = result.skipped_features,
                "features without a tract id or geometry were skipped"
            );
        }
        if transfer_limit_exceeded {
            warn!(
                features = result.features.len(),
                "geometry service truncated the result; some tracts are missing"
            );
        }

        Ok(result)
    }

    fn convert_feature(&self, index: usize, feature: &Feature) -> Result<Option<TractFeature>> {
        let tract = match feature.property(GEOMETRY_TRACT_FIELD).and_then(tract_id) {
            Some(tract) => tract,
            None => {
                debug!(index, "feature has no {} property", GEOMETRY_TRACT_FIELD);
                return Ok(None);
            }
        };

        let geometry = match &feature.geometry {
            Some(geometry) => geometry,
            None => {
                debug!(index, %tract, "feature has no geometry");
                return Ok(None);
            }
        };

        let parts = match &geometry.value {
            geojson::Value::Polygon(rings) => vec![convert_polygon(&tract, rings)?],
            geojson::Value::MultiPolygon(polygons) => polygons
                .iter()
                .map(|rings| convert_polygon(&tract, rings))
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(malformed(format!(
                    "tract {} has unsupported geometry type {}",
                    tract,
                    other.type_name()
                )))
            }
        };

        let feature = TractFeature { tract, parts };
        debug!(tract = %feature.tract, vertices = feature.vertex_count(), "tract geometry read");
        Ok(Some(feature))
    }
}

impl Default for GeometryParser {
    fn default() -> Self {
        Self::new()
    }
}

fn tract_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n
            .as_u64()
            .map(|n| format!("{:0width$}", n, width = TRACT_CODE_WIDTH)),
        _ => None,
    }
}

fn convert_polygon(tract: &str, rings: &PolygonType) -> Result<PolygonPart> {
    let mut rings = rings.iter().map(|ring| convert_ring(tract, ring));
    let exterior = rings
        .next()
        .ok_or_else(|| malformed(format!("tract {} has a polygon with no rings", tract)))??;
    let holes = rings.collect::<Result<Vec<_>>>()?;
    Ok(PolygonPart::new(exterior, holes))
}

fn convert_ring(tract: &str, positions: &[Position]) -> Result<Ring> {
    if positions.len() < 3 {
        return Err(malformed(format!(
            "tract {} has a ring with {} positions",
            tract,
            positions.len()
        )));
    }

    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(malformed(format!(
                "tract {} has a position with fewer than two coordinates",
                tract
            ))),
        })
        .collect()
}

fn malformed(details: String) -> ExtractError {
    ExtractError::MalformedResponse {
        service: SERVICE,
        details,
    }
}
