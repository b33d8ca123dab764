use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot {action} {path}: {source}")]
    FileAccess {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No FIPS entry for county '{county}' in state '{state}'{}", format_suggestions(.suggestions))]
    LookupNotFound {
        state: String,
        county: String,
        suggestions: Vec<String>,
    },

    #[error("County '{county}' in state '{state}' matches several FIPS entries: {}", .candidates.join(", "))]
    LookupAmbiguous {
        state: String,
        county: String,
        candidates: Vec<String>,
    },

    #[error("Network request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status} for {url}: {body}")]
    HttpStatus {
        service: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Malformed {service} response: {details}")]
    MalformedResponse {
        service: &'static str,
        details: String,
    },

    #[error("{service} reported an error (code {code}): {message}")]
    Service {
        service: &'static str,
        code: i64,
        message: String,
    },

    #[error("Variable {variable} for tract {tract} is not numeric: '{value}'")]
    TypeCoercion {
        variable: String,
        tract: String,
        value: String,
    },

    #[error("No tract geometry found for county '{county}' in state '{state}'")]
    EmptyJoin { state: String, county: String },

    #[error("Shapefile write error for {path}: {details}")]
    ShapefileWrite { path: String, details: String },

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Input cancelled by user")]
    Cancelled,
}

impl ExtractError {
    /// Wraps an I/O error with the file it happened on, for use in `map_err`
    pub fn file_access(
        action: &'static str,
        path: &Path,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.display().to_string();
        move |source| ExtractError::FileAccess {
            action,
            path,
            source,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (examples: {})", suggestions.join(", "))
    }
}
