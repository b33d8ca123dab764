use acs_tract_extractor::models::{ExtractRequest, FipsLookup, FipsRecord};
use acs_tract_extractor::processors::ExtractPipeline;
use acs_tract_extractor::readers::FipsReader;
use acs_tract_extractor::sources::FixtureSource;
use acs_tract_extractor::utils::shapefile_name;
use acs_tract_extractor::ExtractError;
use pretty_assertions::assert_eq;
use shapefile::dbase::{FieldValue, Record};
use shapefile::Polygon;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn kern_lookup() -> FipsLookup {
    FipsLookup::new(vec![
        FipsRecord::new("CA", "Kern County", 6, 29),
        FipsRecord::new("CA", "Kings County", 6, 31),
    ])
}

fn kern_request(output_dir: &Path) -> ExtractRequest {
    ExtractRequest::new(
        "CA",
        "Kern County",
        2018,
        vec!["B01001_001E".to_string(), "B19013_001E".to_string()],
        output_dir.to_path_buf(),
    )
}

#[tokio::test]
async fn test_extract_writes_joined_shapefile() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let lookup = kern_lookup();
    let source = FixtureSource::from_files(
        &fixture("statistics.json"),
        &fixture("tracts.geojson"),
    )
    .unwrap();

    let request = kern_request(temp_dir.path()).with_zip(true);
    let pipeline = ExtractPipeline::new(&lookup, source)
        .with_silent(true)
        .with_keep_geojson(true);
    let summary = pipeline.run(&request).await.unwrap();

    // codes were resolved before either fetch
    let requested = pipeline.source().requested_codes();
    assert_eq!(requested.len(), 2);
    assert_eq!(requested[0].geoid(), "06029");

    // three boundaries, two with statistics, one statistics row without a boundary
    assert_eq!(summary.join.geometry_rows, 3);
    assert_eq!(summary.join.matched_rows, 2);
    assert_eq!(summary.join.unmatched_geometry, vec!["000300"]);
    assert_eq!(summary.join.orphaned_statistics, vec!["990100"]);
    assert_eq!(summary.coercion.total_cells, 6);
    assert_eq!(summary.coercion.issues.len(), 2);

    let shp = temp_dir.path().join(shapefile_name(&request));
    assert_eq!(summary.shapefile.shp_path, shp);
    for ext in ["shp", "shx", "dbf", "prj", "cpg", "zip", "geojson"] {
        assert!(shp.with_extension(ext).exists(), "missing .{}", ext);
    }

    let rows = shapefile::read_as::<_, Polygon, Record>(&shp).unwrap();
    assert_eq!(rows.len(), 3);

    let tract = |record: &Record| match record.get("TRACT") {
        Some(FieldValue::Character(Some(tract))) => tract.trim().to_string(),
        other => panic!("unexpected TRACT value: {:?}", other),
    };
    let tracts: Vec<String> = rows.iter().map(|(_, record)| tract(record)).collect();
    assert_eq!(tracts, vec!["000100", "000200", "000300"]);

    match rows[0].1.get("B01001_001") {
        Some(FieldValue::Numeric(Some(value))) => assert!((value - 3124.0).abs() < 1e-9),
        other => panic!("unexpected population value: {:?}", other),
    }
    assert!(matches!(
        rows[1].1.get("B19013_001"),
        Some(FieldValue::Numeric(None))
    ));
    assert!(matches!(
        rows[2].1.get("B01001_001"),
        Some(FieldValue::Numeric(None))
    ));

    // multipolygon tract keeps both parts
    assert_eq!(rows[1].0.rings().len(), 2);
}

#[tokio::test]
async fn test_unknown_county_reports_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let lookup = kern_lookup();
    let source = FixtureSource::new("[]", "{}");
    let pipeline = ExtractPipeline::new(&lookup, source).with_silent(true);

    let mut request = kern_request(temp_dir.path());
    request.county_name = "Cook County".to_string();

    let err = pipeline.run(&request).await.unwrap_err();
    match err {
        ExtractError::LookupNotFound {
            state,
            county,
            suggestions,
        } => {
            assert_eq!(state, "CA");
            assert_eq!(county, "Cook County");
            assert_eq!(suggestions, vec!["Kern County", "Kings County"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_strict_mode_aborts_without_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let lookup = kern_lookup();
    let statistics = r#"[["NAME","B01001_001E","state","county","tract"],
        ["Census Tract 1","(X)","06","029","000100"]]"#;
    let geometry = std::fs::read_to_string(fixture("tracts.geojson")).unwrap();
    let pipeline =
        ExtractPipeline::new(&lookup, FixtureSource::new(statistics, geometry)).with_silent(true);

    let request = ExtractRequest::new(
        "CA",
        "Kern County",
        2018,
        vec!["B01001_001E".to_string()],
        temp_dir.path().to_path_buf(),
    )
    .with_strict(true);

    let err = pipeline.run(&request).await.unwrap_err();
    assert!(matches!(err, ExtractError::TypeCoercion { .. }));
    assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_output_directory_that_is_a_file_is_named_in_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("output");
    std::fs::write(&blocker, "not a directory").unwrap();

    let lookup = kern_lookup();
    let source = FixtureSource::from_files(
        &fixture("statistics.json"),
        &fixture("tracts.geojson"),
    )
    .unwrap();
    let pipeline = ExtractPipeline::new(&lookup, source).with_silent(true);

    let err = pipeline.run(&kern_request(&blocker)).await.unwrap_err();
    assert!(matches!(err, ExtractError::ShapefileWrite { .. }));
    assert!(
        err.to_string().contains(&blocker.display().to_string()),
        "{}",
        err
    );
}

#[tokio::test]
async fn test_geometry_service_error_surfaces() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let lookup = kern_lookup();
    let statistics = std::fs::read_to_string(fixture("statistics.json")).unwrap();
    let geometry = r#"{"error":{"code":500,"message":"Failed to execute query.","details":[]}}"#;
    let pipeline =
        ExtractPipeline::new(&lookup, FixtureSource::new(statistics, geometry)).with_silent(true);

    let err = pipeline
        .run(&kern_request(temp_dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Service { code: 500, .. }));
}

#[test]
fn test_lookup_from_csv_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("county_fips_master.csv");
    std::fs::write(
        &path,
        "fips,county_name,state_abbr,state,county\n6029,Kern County,CA,6,29\n36047,Kings County,NY,36,47\n",
    )
    .unwrap();

    let lookup = FipsReader::new().read_lookup(&path).unwrap();
    let codes = lookup.resolve("NY", "Kings County").unwrap();

    assert_eq!(codes.state, "36");
    assert_eq!(codes.county, "047");
}
