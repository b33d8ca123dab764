use crate::error::{ExtractError, Result};
use crate::models::{JoinedTable, JoinedTract, TractFeature};
use crate::utils::constants::{
    CPG_ENCODING, DBF_CHARACTER_MAX, DBF_FIELD_NAME_MAX, DBF_NUMERIC_DECIMALS,
    DBF_NUMERIC_LENGTH, TRACT_CODE_WIDTH, WGS84_PRJ,
};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TRACT_FIELD: &str = "TRACT";
const NAME_FIELD: &str = "NAME";
const STATE_FIELD: &str = "STATE";
const COUNTY_FIELD: &str = "COUNTY";
const SHAPEFILE_SET_EXTENSIONS: [&str; 5] = ["shp", "shx", "dbf", "prj", "cpg"];

/// Writes a [`JoinedTable`] as an ESRI shapefile set (.shp/.shx/.dbf/.prj/.cpg).
pub struct ShapefileWriter {
    write_sidecars: bool,
}

/// What ended up on disk.
#[derive(Debug, Clone)]
pub struct ShapefileInfo {
    pub shp_path: PathBuf,
    pub files: Vec<PathBuf>,
    pub records: usize,
    /// (variable, dBASE field name) for every variable column
    pub field_names: Vec<(String, String)>,
}

impl ShapefileInfo {
    pub fn summary(&self) -> String {
        let renamed: Vec<String> = self
            .field_names
            .iter()
            .filter(|(variable, field)| variable != field)
            .map(|(variable, field)| format!("{} -> {}", variable, field))
            .collect();

        let mut summary = format!(
            "Shapefile: {}\n  Records: {}\n  Files: {}",
            self.shp_path.display(),
            self.records,
            self.files.len()
        );
        if !renamed.is_empty() {
            summary.push_str(&format!("\n  Renamed fields: {}", renamed.join(", ")));
        }
        summary
    }
}

impl ShapefileWriter {
    pub fn new() -> Self {
        Self {
            write_sidecars: true,
        }
    }

    /// Skip the .prj and .cpg files
    pub fn without_sidecars() -> Self {
        Self {
            write_sidecars: false,
        }
    }

    /// Write the full set; on failure nothing of the set is left at `path`.
    pub fn write(&self, table: &JoinedTable, path: &Path) -> Result<ShapefileInfo> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ExtractError::ShapefileWrite {
                    path: path.display().to_string(),
                    details: format!("cannot create directory {}: {}", parent.display(), e),
                })?;
            }
        }

        let field_names = dbf_field_names(&table.variables);
        for (variable, field) in table.variables.iter().zip(&field_names) {
            if variable != field {
                warn!(%variable, %field, "variable name shortened for dBASE field limit");
            }
        }

        let files = match self.write_set(table, path, &field_names) {
            Ok(files) => files,
            Err(e) => {
                discard_partial(path);
                return Err(e);
            }
        };

        info!(
            path = %path.display(),
            records = table.rows.len(),
            "shapefile written"
        );

        Ok(ShapefileInfo {
            shp_path: path.to_path_buf(),
            files,
            records: table.rows.len(),
            field_names: table.variables.iter().cloned().zip(field_names).collect(),
        })
    }

    fn write_set(
        &self,
        table: &JoinedTable,
        path: &Path,
        field_names: &[String],
    ) -> Result<Vec<PathBuf>> {
        let name_length = text_field_length(table.rows.iter().map(|r| row_name(r)));
        let mut builder = TableWriterBuilder::new()
            .add_character_field(field_name(TRACT_FIELD, path)?, TRACT_CODE_WIDTH as u8)
            .add_character_field(field_name(NAME_FIELD, path)?, name_length)
            .add_character_field(field_name(STATE_FIELD, path)?, 2)
            .add_character_field(field_name(COUNTY_FIELD, path)?, 3);
        for field in field_names {
            builder = builder.add_numeric_field(
                field_name(field, path)?,
                DBF_NUMERIC_LENGTH,
                DBF_NUMERIC_DECIMALS,
            );
        }

        {
            let mut writer =
                shapefile::Writer::from_path(path, builder).map_err(|e| write_error(path, e))?;

            for row in &table.rows {
                let polygon = to_polygon(&row.feature);
                let record = to_record(row, field_names, name_length);
                writer
                    .write_shape_and_record(&polygon, &record)
                    .map_err(|e| write_error(path, e))?;
            }
        }

        let mut files = vec![
            path.to_path_buf(),
            path.with_extension("shx"),
            path.with_extension("dbf"),
        ];

        if self.write_sidecars {
            for (extension, contents) in [("prj", WGS84_PRJ), ("cpg", CPG_ENCODING)] {
                let sidecar = path.with_extension(extension);
                std::fs::write(&sidecar, contents).map_err(|e| ExtractError::ShapefileWrite {
                    path: sidecar.display().to_string(),
                    details: e.to_string(),
                })?;
                files.push(sidecar);
            }
        }

        Ok(files)
    }
}

impl Default for ShapefileWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// dBASE field names for the variable columns.
///
/// Names longer than ten characters are cut to ten; a cut that collides with
/// an earlier name gets a `_N` suffix in its last characters instead.
pub fn dbf_field_names(variables: &[String]) -> Vec<String> {
    let reserved = [TRACT_FIELD, NAME_FIELD, STATE_FIELD, COUNTY_FIELD];
    let mut taken: Vec<String> = reserved.iter().map(|s| s.to_string()).collect();
    let mut names = Vec::with_capacity(variables.len());

    for variable in variables {
        let base: String = variable.chars().take(DBF_FIELD_NAME_MAX).collect();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.iter().any(|t| t.eq_ignore_ascii_case(&candidate)) {
            let tail = format!("_{}", suffix);
            let keep = DBF_FIELD_NAME_MAX.saturating_sub(tail.len());
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), tail);
            suffix += 1;
        }
        taken.push(candidate.clone());
        names.push(candidate);
    }

    names
}

fn field_name(name: &str, path: &Path) -> Result<FieldName> {
    FieldName::try_from(name).map_err(|e| ExtractError::ShapefileWrite {
        path: path.display().to_string(),
        details: format!("invalid field name '{}': {:?}", name, e),
    })
}

/// Remove whatever part of the set a failed write left behind
fn discard_partial(path: &Path) {
    for extension in SHAPEFILE_SET_EXTENSIONS {
        let file = path.with_extension(extension);
        if file.is_file() && std::fs::remove_file(&file).is_ok() {
            debug!(path = %file.display(), "removed partial output");
        }
    }
}

fn write_error(path: &Path, error: shapefile::Error) -> ExtractError {
    ExtractError::ShapefileWrite {
        path: path.display().to_string(),
        details: error.to_string(),
    }
}

fn row_name(row: &JoinedTract) -> &str {
    row.statistics
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or_default()
}

fn text_field_length<'a>(values: impl Iterator<Item = &'a str>) -> u8 {
    values
        .map(str::len)
        .max()
        .unwrap_or(1)
        .clamp(1, DBF_CHARACTER_MAX) as u8
}

/// Cut to at most `max_bytes` without splitting a character
fn truncate_bytes(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut cut = max_bytes;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    value[..cut].to_string()
}

fn optional_text(value: Option<&str>, max_bytes: usize) -> FieldValue {
    FieldValue::Character(
        value
            .filter(|v| !v.is_empty())
            .map(|v| truncate_bytes(v, max_bytes)),
    )
}

fn to_record(row: &JoinedTract, field_names: &[String], name_length: u8) -> Record {
    let statistics = row.statistics.as_ref();
    let mut record = Record::default();

    record.insert(
        TRACT_FIELD.to_string(),
        FieldValue::Character(Some(row.tract().to_string())),
    );
    record.insert(
        NAME_FIELD.to_string(),
        optional_text(statistics.map(|s| s.name.as_str()), name_length as usize),
    );
    record.insert(
        STATE_FIELD.to_string(),
        optional_text(statistics.map(|s| s.state.as_str()), 2),
    );
    record.insert(
        COUNTY_FIELD.to_string(),
        optional_text(statistics.map(|s| s.county.as_str()), 3),
    );

    for (column, field) in field_names.iter().enumerate() {
        record.insert(field.clone(), FieldValue::Numeric(row.value(column)));
    }

    record
}

fn to_polygon(feature: &TractFeature) -> Polygon {
    let to_points = |ring: &[(f64, f64)]| -> Vec<Point> {
        ring.iter().map(|&(x, y)| Point::new(x, y)).collect()
    };

    let mut rings = Vec::new();
    for part in &feature.parts {
        rings.push(PolygonRing::Outer(to_points(&part.exterior)));
        for hole in &part.holes {
            rings.push(PolygonRing::Inner(to_points(hole)));
        }
    }

    Polygon::with_rings(rings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JoinReport, PolygonPart, TractStatistics};
    use pretty_assertions::assert_eq;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn joined_table() -> JoinedTable {
        let feature = |tract: &str| {
            TractFeature::new(
                tract,
                vec![PolygonPart::new(
                    vec![
                        (-118.3, 34.0),
                        (-118.3, 34.1),
                        (-118.2, 34.1),
                        (-118.2, 34.0),
                        (-118.3, 34.0),
                    ],
                    vec![],
                )],
            )
        };

        JoinedTable {
            variables: vars(&["B01001_001E", "DP05_0001E"]),
            rows: vec![
                JoinedTract {
                    feature: feature("101110"),
                    statistics: Some(TractStatistics {
                        tract: "101110".to_string(),
                        name: "Census Tract 1011.10, Los Angeles County, California"
                            .to_string(),
                        state: "06".to_string(),
                        county: "037".to_string(),
                        values: vec![Some(4283.0), None],
                    }),
                },
                JoinedTract {
                    feature: feature("101122"),
                    statistics: None,
                },
            ],
            report: JoinReport::default(),
        }
    }

    #[test]
    fn test_field_names_short_names_unchanged() {
        assert_eq!(
            dbf_field_names(&vars(&["DP05_0001E", "DP03_0062E"])),
            vec!["DP05_0001E", "DP03_0062E"]
        );
    }

    #[test]
    fn test_field_names_truncated_and_deduplicated() {
        assert_eq!(
            dbf_field_names(&vars(&["B01001_001E", "B01001_001M", "B01001_002E"])),
            vec!["B01001_001", "B01001_0_1", "B01001_002"]
        );
    }

    #[test]
    fn test_field_names_avoid_fixed_columns() {
        assert_eq!(dbf_field_names(&vars(&["TRACT"])), vec!["TRACT_1"]);
    }

    #[test]
    fn test_truncate_bytes_respects_char_boundaries() {
        assert_eq!(truncate_bytes("Doña Ana", 4), "Do\u{f1}");
        assert_eq!(truncate_bytes("Doña Ana", 3), "Do");
        assert_eq!(truncate_bytes("Kern", 10), "Kern");
    }

    #[test]
    fn test_write_shapefile_set() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("tracts.shp");

        let info = ShapefileWriter::new().write(&joined_table(), &path)?;

        assert_eq!(info.records, 2);
        assert_eq!(info.files.len(), 5);
        for file in &info.files {
            assert!(file.exists(), "{} missing", file.display());
        }
        assert_eq!(std::fs::read_to_string(path.with_extension("cpg"))?, "UTF-8");
        assert!(info.summary().contains("B01001_001E -> B01001_001"));
        Ok(())
    }

    #[test]
    fn test_output_directory_that_is_a_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("output");
        std::fs::write(&blocker, "already a file")?;
        let path = blocker.join("tracts.shp");

        let err = ShapefileWriter::new().write(&joined_table(), &path).unwrap_err();
        match err {
            ExtractError::ShapefileWrite { path: reported, details } => {
                assert_eq!(reported, path.display().to_string());
                assert!(details.contains(&blocker.display().to_string()), "{}", details);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_no_partial_set() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tracts.shp");
        // a directory where the .dbf has to go makes the write fail part-way
        let occupied = path.with_extension("dbf");
        std::fs::create_dir(&occupied)?;
        std::fs::write(occupied.join("keep.txt"), "x")?;

        let err = ShapefileWriter::new().write(&joined_table(), &path).unwrap_err();

        assert!(matches!(err, ExtractError::ShapefileWrite { .. }));
        assert!(!path.exists());
        assert!(!path.with_extension("shx").exists());
        assert!(!path.with_extension("prj").exists());
        assert!(occupied.join("keep.txt").exists());
        Ok(())
    }

    #[test]
    fn test_written_shapefile_reads_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tracts.shp");
        ShapefileWriter::without_sidecars().write(&joined_table(), &path)?;

        let shapes = shapefile::read_shapes_as::<_, Polygon>(&path)
            .map_err(|e| write_error(&path, e))?;
        assert_eq!(shapes.len(), 2);
        assert!(!path.with_extension("prj").exists());
        Ok(())
    }
}
