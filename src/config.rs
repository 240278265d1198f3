/// Service configuration.
///
/// Settings come from two places: an optional TOML file for run-shape
/// options (region list, log file) and the environment for the database
/// URL. The file may also carry a `database_url`, which overrides the
/// environment; `.env` loading is the caller's responsibility.

use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Default settings file, read from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "./ecobs.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Region codes to ingest. `None` means every registered region.
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// Optional log file appended to alongside console output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Overrides the DATABASE_URL environment variable when present.
    #[serde(default)]
    pub database_url: Option<String>,
}

/// Loads settings from `path`. A missing file is not an error; it just
/// yields the defaults.
pub fn load(path: &str) -> Result<Settings, Box<dyn Error>> {
    if !Path::new(path).exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)?;
    let settings = toml::from_str(&raw)?;
    Ok(settings)
}

/// Resolves the database URL from settings or the environment.
pub fn database_url(settings: &Settings) -> Result<String, Box<dyn Error>> {
    if let Some(url) = &settings.database_url {
        return Ok(url.clone());
    }
    env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL not set and no database_url in settings".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load("./does-not-exist.toml").expect("missing file is not an error");
        assert!(settings.regions.is_none());
        assert!(settings.log_file.is_none());
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn test_settings_parse_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            regions = ["ON", "QC"]
            log_file = "/var/log/ecobs.log"
            "#,
        )
        .unwrap();
        assert_eq!(settings.regions.as_deref(), Some(&["ON".to_string(), "QC".to_string()][..]));
        assert_eq!(settings.log_file.as_deref(), Some("/var/log/ecobs.log"));
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn test_database_url_prefers_settings_over_environment() {
        let settings = Settings {
            database_url: Some("postgres://settings".to_string()),
            ..Settings::default()
        };
        assert_eq!(database_url(&settings).unwrap(), "postgres://settings");
    }
}
