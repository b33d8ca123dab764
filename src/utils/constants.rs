/// Census data API root; the year and dataset path are appended per request
pub const DEFAULT_STATISTICS_BASE_URL: &str = "https://api.census.gov/data";

/// TIGERweb census tract layer query endpoint
pub const DEFAULT_GEOMETRY_QUERY_URL: &str =
    "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb/Tracts_Blocks/MapServer/10/query";

/// Lookup file
pub const DEFAULT_LOOKUP_PATH: &str = "county_fips_master.csv";
pub const DEFAULT_LOOKUP_ENCODING: &str = "gbk";

/// Network defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_USER_AGENT: &str = concat!("acs-tract-extractor/", env!("CARGO_PKG_VERSION"));

/// Environment variable prefix for settings overrides
pub const SETTINGS_ENV_PREFIX: &str = "ACS_EXTRACT";

/// Column names in the statistics response
pub const LABEL_COLUMN: &str = "NAME";
pub const STATE_COLUMN: &str = "state";
pub const COUNTY_COLUMN: &str = "county";
pub const TRACT_COLUMN: &str = "tract";

/// Tract identifier field in the geometry layer
pub const GEOMETRY_TRACT_FIELD: &str = "TRACT";

/// ACS 5-year estimates start with the 2009 release
pub const FIRST_ACS5_YEAR: u16 = 2009;

/// Widths of zero-padded FIPS codes
pub const STATE_CODE_WIDTH: usize = 2;
pub const COUNTY_CODE_WIDTH: usize = 3;
pub const TRACT_CODE_WIDTH: usize = 6;

/// Annotation values the Census API returns in place of an estimate
pub const ANNOTATION_SENTINELS: [f64; 6] = [
    -999_999_999.0,
    -888_888_888.0,
    -666_666_666.0,
    -555_555_555.0,
    -333_333_333.0,
    -222_222_222.0,
];

/// Output naming
pub const OUTPUT_PREFIX: &str = "ACSData";
pub const VARIABLE_SEPARATOR: &str = "__";

/// dBASE limits
pub const DBF_FIELD_NAME_MAX: usize = 10;
pub const DBF_CHARACTER_MAX: usize = 254;
pub const DBF_NUMERIC_LENGTH: u8 = 20;
pub const DBF_NUMERIC_DECIMALS: u8 = 4;

/// Shapefile sidecar contents
pub const WGS84_PRJ: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]";
pub const CPG_ENCODING: &str = "UTF-8";

/// Bytes of a response body kept in error messages
pub const ERROR_BODY_EXCERPT: usize = 300;

/// Number of example counties shown in prompts and lookup errors
pub const EXAMPLE_COUNTY_COUNT: usize = 3;
