use crate::error::{ExtractError, Result};
use crate::models::{CoercionReport, ExtractRequest, FipsCodes, FipsLookup, JoinReport};
use crate::processors::TractJoiner;
use crate::readers::{GeometryParser, StatisticsParser};
use crate::sources::CensusSource;
use crate::utils::filename::shapefile_path;
use crate::utils::progress::ProgressReporter;
use crate::utils::scratch::ScratchSpace;
use crate::writers::{ArchiveWriter, ShapefileInfo, ShapefileWriter};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

const GEOMETRY_SCRATCH_FILE: &str = "tracts.geojson";

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub codes: FipsCodes,
    pub shapefile: ShapefileInfo,
    pub archive: Option<PathBuf>,
    pub kept_geojson: Option<PathBuf>,
    pub coercion: CoercionReport,
    pub join: JoinReport,
}

impl ExtractSummary {
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("FIPS: {} (GEOID {})", self.codes, self.codes.geoid()),
            self.join.summary(),
            self.coercion.summary(),
            self.shapefile.summary(),
        ];
        if let Some(archive) = &self.archive {
            lines.push(format!("Archive: {}", archive.display()));
        }
        if let Some(geojson) = &self.kept_geojson {
            lines.push(format!("GeoJSON: {}", geojson.display()));
        }
        lines.join("\n")
    }
}

/// The extraction run: resolve codes, fetch both responses, join, write.
pub struct ExtractPipeline<'a, S: CensusSource> {
    lookup: &'a FipsLookup,
    source: S,
    silent: bool,
    keep_geojson: bool,
}

impl<'a, S: CensusSource> ExtractPipeline<'a, S> {
    pub fn new(lookup: &'a FipsLookup, source: S) -> Self {
        Self {
            lookup,
            source,
            silent: false,
            keep_geojson: false,
        }
    }

    /// Suppress spinners
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Copy the raw geometry response next to the shapefile
    pub fn with_keep_geojson(mut self, keep_geojson: bool) -> Self {
        self.keep_geojson = keep_geojson;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[instrument(
        skip(self, request),
        fields(state = %request.state_abbr, county = %request.county_name, year = request.year)
    )]
    pub async fn run(&self, request: &ExtractRequest) -> Result<ExtractSummary> {
        request.check()?;

        let codes = self
            .lookup
            .resolve(&request.state_abbr, &request.county_name)?;
        info!(state = %codes.state, county = %codes.county, "resolved FIPS codes");

        let progress = ProgressReporter::new_spinner("Pulling the Census data...", self.silent);
        let statistics_body = self.source.statistics(request, &codes).await?;
        let (statistics, coercion) = StatisticsParser::with_strict(request.strict)
            .parse(&statistics_body, &request.variables)?;
        progress.finish_with_message(&format!("Census data: {} tracts", statistics.len()));
        if statistics.is_empty() {
            warn!("statistics response has no data rows");
        }

        let progress = ProgressReporter::new_spinner("Pulling spatial data...", self.silent);
        let geometry_body = self.source.geometry(&codes).await?;
        let mut scratch = ScratchSpace::new()?;
        let staged = scratch.stage(GEOMETRY_SCRATCH_FILE, &geometry_body)?;
        drop(geometry_body);
        let geometry = GeometryParser::new().read_collection(&staged)?;
        progress.finish_with_message(&format!("Spatial data: {} tracts", geometry.len()));

        if geometry.is_empty() {
            return Err(ExtractError::EmptyJoin {
                state: request.state_abbr.clone(),
                county: request.county_name.clone(),
            });
        }

        let joined = TractJoiner::new().join(geometry, &statistics);

        let output_path = shapefile_path(request);
        let progress = ProgressReporter::new_spinner("Creating shapefile...", self.silent);
        let shapefile = ShapefileWriter::new().write(&joined, &output_path)?;
        progress.finish_with_message(&format!("Saved {}", output_path.display()));

        let archive = if request.zip {
            Some(ArchiveWriter::new().bundle(&output_path, &shapefile.files)?)
        } else {
            None
        };

        let kept_geojson = if self.keep_geojson {
            Some(scratch.keep(GEOMETRY_SCRATCH_FILE, &output_path.with_extension("geojson"))?)
        } else {
            None
        };

        Ok(ExtractSummary {
            codes,
            shapefile,
            archive,
            kept_geojson,
            coercion,
            join: joined.report,
        })
    }
}
