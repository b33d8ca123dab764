use crate::error::Result;
use crate::models::AcsDataset;
use crate::utils::constants::{
    DEFAULT_GEOMETRY_QUERY_URL, DEFAULT_LOOKUP_ENCODING, DEFAULT_LOOKUP_PATH,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STATISTICS_BASE_URL, DEFAULT_USER_AGENT,
    SETTINGS_ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings.
///
/// Layered as built-in defaults, then an optional settings file (any format
/// the `config` crate recognises from its extension), then `ACS_EXTRACT_*`
/// environment variables, e.g. `ACS_EXTRACT_LOOKUP_PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub lookup_path: PathBuf,
    pub lookup_encoding: String,
    pub statistics_base_url: String,
    pub geometry_query_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub default_dataset: AcsDataset,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("lookup_path", DEFAULT_LOOKUP_PATH)?
            .set_default("lookup_encoding", DEFAULT_LOOKUP_ENCODING)?
            .set_default("statistics_base_url", DEFAULT_STATISTICS_BASE_URL)?
            .set_default("geometry_query_url", DEFAULT_GEOMETRY_QUERY_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("default_dataset", "profile")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix(SETTINGS_ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookup_path: PathBuf::from(DEFAULT_LOOKUP_PATH),
            lookup_encoding: DEFAULT_LOOKUP_ENCODING.to_string(),
            statistics_base_url: DEFAULT_STATISTICS_BASE_URL.to_string(),
            geometry_query_url: DEFAULT_GEOMETRY_QUERY_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_dataset: AcsDataset::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_settings_file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "lookup_path = \"data/fips.csv\"")?;
        writeln!(file, "request_timeout_secs = 15")?;
        writeln!(file, "default_dataset = \"detailed\"")?;

        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(settings.lookup_path, PathBuf::from("data/fips.csv"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.default_dataset, AcsDataset::Detailed);
        assert_eq!(settings.statistics_base_url, DEFAULT_STATISTICS_BASE_URL);
        Ok(())
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let result = Settings::load(Some(Path::new("does/not/exist.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_matches_constants() {
        let settings = Settings::default();
        assert_eq!(settings.lookup_encoding, "gbk");
        assert_eq!(settings.default_dataset, AcsDataset::Profile);
    }
}
