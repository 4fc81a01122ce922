//! Configuration loader
//!
//! Loads application configuration from a file and environment variables.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment if one is present
//! 2. Reads the file named by `METRICSPACE_CONFIG`, or the first file found
//!    by [`probe_config_paths`], or starts from the defaults
//! 3. Applies `METRICSPACE_*` environment overrides on top
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `METRICSPACE_CONFIG`: Path to the config file
//! - `METRICSPACE_NAME_PATTERN`: Regular expression names must match
//! - `METRICSPACE_MIN_LENGTH` / `METRICSPACE_MAX_LENGTH`: Name length bounds
//! - `METRICSPACE_MIN_DOTS` / `METRICSPACE_MAX_DOTS`: Dot count bounds
//! - `METRICSPACE_MAX_SUBDIRS_PER_DIR`: Subdirectory cap (0 = unlimited)
//! - `METRICSPACE_MAX_METRICS_PER_DIR`: Metric cap (0 = unlimited)
//! - `METRICSPACE_LOG_LEVEL`: Log filter used when `RUST_LOG` is unset
//! - `METRICSPACE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./metricspace.toml` or `./metricspace.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use metricspace_common::{CommonError, ErrorClassification, ErrorSeverity};
use metricspace_domain::{Config, MetricspaceError, Result};

/// Variable naming the config file to load.
pub const CONFIG_PATH_VAR: &str = "METRICSPACE_CONFIG";

const FILE_NAMES: [&str; 4] = ["metricspace.toml", "metricspace.json", "config.toml", "config.json"];

/// Load configuration with the full fallback strategy
///
/// # Errors
/// Returns `MetricspaceError::Config` if:
/// - The file named by `METRICSPACE_CONFIG` does not exist
/// - The config file cannot be read or parsed
/// - An environment override has an invalid value
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let explicit = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let base = match explicit.or_else(probe_config_paths) {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::info!("No config file found, starting from defaults");
            Config::default()
        }
    };

    let config = apply_env_overrides(base)?;
    warn_on_anomalies(&config);
    Ok(config)
}

/// Load configuration from environment variables over the defaults
///
/// Every variable is optional. See module documentation for the list.
///
/// # Errors
/// Returns `MetricspaceError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections missing from the file keep their defaults.
///
/// # Errors
/// Returns `MetricspaceError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(config_error(CommonError::NotFound {
                    resource_type: "Config file".to_string(),
                    identifier: Some(p.display().to_string()),
                }));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            config_error(CommonError::config(
                "No config file found in any of the standard locations",
            ))
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| config_error(CommonError::persistence_op("read config file", e.to_string())))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| config_error(CommonError::from(e))),
        "json" => serde_json::from_str(contents).map_err(|e| config_error(CommonError::from(e))),
        _ => Err(config_error(CommonError::config_field(
            "format",
            format!("Unsupported config format: {}", extension),
        ))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(FILE_NAMES.iter().map(|name| cwd.join(name)));
        candidates.push(cwd.join("../config.toml"));
        candidates.push(cwd.join("../config.json"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(pattern) = env_opt("METRICSPACE_NAME_PATTERN") {
        config.validation.pattern = pattern;
    }
    if let Some(value) = env_parse("METRICSPACE_MIN_LENGTH")? {
        config.validation.min_length = value;
    }
    if let Some(value) = env_parse("METRICSPACE_MAX_LENGTH")? {
        config.validation.max_length = value;
    }
    if let Some(value) = env_parse("METRICSPACE_MIN_DOTS")? {
        config.validation.min_dots = value;
    }
    if let Some(value) = env_parse("METRICSPACE_MAX_DOTS")? {
        config.validation.max_dots = value;
    }
    if let Some(value) = env_parse("METRICSPACE_MAX_SUBDIRS_PER_DIR")? {
        config.limits.max_subdirs_per_dir = value;
    }
    if let Some(value) = env_parse("METRICSPACE_MAX_METRICS_PER_DIR")? {
        config.limits.max_metrics_per_dir = value;
    }
    if let Some(level) = env_opt("METRICSPACE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("METRICSPACE_LOG_JSON", config.logging.json);
    Ok(config)
}

/// Settings that are legal but reject every name.
fn warn_on_anomalies(config: &Config) {
    let validation = &config.validation;
    if validation.min_length > validation.max_length {
        tracing::warn!(
            min_length = validation.min_length,
            max_length = validation.max_length,
            "min_length exceeds max_length, every metric will be rejected"
        );
    }
    if validation.min_dots > validation.max_dots {
        tracing::warn!(
            min_dots = validation.min_dots,
            max_dots = validation.max_dots,
            "min_dots exceeds max_dots, every metric will be rejected"
        );
    }
}

/// Maps a classified error into the domain error, logging it by severity.
fn config_error(err: CommonError) -> MetricspaceError {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => tracing::error!(
            error_type = err.error_type_name(),
            retryable = err.is_retryable(),
            "{}",
            err
        ),
        ErrorSeverity::Warning | ErrorSeverity::Info => tracing::warn!(
            error_type = err.error_type_name(),
            retryable = err.is_retryable(),
            "{}",
            err
        ),
    }
    MetricspaceError::Config(err.to_string())
}

/// Get an optional, non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `MetricspaceError::Config` if the variable is set but does not
/// parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                config_error(CommonError::config_field(key, format!("invalid value '{}': {}", raw, e)))
            })
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const OVERRIDE_VARS: [&str; 9] = [
        "METRICSPACE_NAME_PATTERN",
        "METRICSPACE_MIN_LENGTH",
        "METRICSPACE_MAX_LENGTH",
        "METRICSPACE_MIN_DOTS",
        "METRICSPACE_MAX_DOTS",
        "METRICSPACE_MAX_SUBDIRS_PER_DIR",
        "METRICSPACE_MAX_METRICS_PER_DIR",
        "METRICSPACE_LOG_LEVEL",
        "METRICSPACE_LOG_JSON",
    ];

    fn clear_overrides() {
        for key in OVERRIDE_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("METRICSPACE_TEST_BOOL_YES", "yes");
        std::env::set_var("METRICSPACE_TEST_BOOL_UPPER", "TRUE");
        std::env::set_var("METRICSPACE_TEST_BOOL_OFF", "off");

        assert!(env_bool("METRICSPACE_TEST_BOOL_YES", false));
        assert!(env_bool("METRICSPACE_TEST_BOOL_UPPER", false));
        assert!(!env_bool("METRICSPACE_TEST_BOOL_OFF", true));

        std::env::remove_var("METRICSPACE_TEST_BOOL_MISSING");
        assert!(env_bool("METRICSPACE_TEST_BOOL_MISSING", true));
        assert!(!env_bool("METRICSPACE_TEST_BOOL_MISSING", false));

        std::env::remove_var("METRICSPACE_TEST_BOOL_YES");
        std::env::remove_var("METRICSPACE_TEST_BOOL_UPPER");
        std::env::remove_var("METRICSPACE_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        let config = load_from_env().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("METRICSPACE_MIN_LENGTH", "4");
        std::env::set_var("METRICSPACE_MAX_DOTS", " 20 ");
        std::env::set_var("METRICSPACE_MAX_METRICS_PER_DIR", "5000");
        std::env::set_var("METRICSPACE_LOG_LEVEL", "metricspace_core=debug");
        std::env::set_var("METRICSPACE_LOG_JSON", "1");

        let result = load_from_env();
        clear_overrides();

        let config = result.unwrap();
        assert_eq!(config.validation.min_length, 4);
        assert_eq!(config.validation.max_dots, 20);
        assert_eq!(config.limits.max_metrics_per_dir, 5000);
        assert_eq!(config.limits.max_subdirs_per_dir, 0);
        assert_eq!(config.logging.level, "metricspace_core=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("METRICSPACE_MAX_SUBDIRS_PER_DIR", "lots");
        let result = load_from_env();
        clear_overrides();

        let err = result.unwrap_err();
        assert!(matches!(err, MetricspaceError::Config(_)), "Should be a Config error");
        assert!(err.to_string().contains("METRICSPACE_MAX_SUBDIRS_PER_DIR"));
    }

    #[test]
    fn test_load_from_file_toml_partial() {
        let (_temp, path) = write_config(
            r#"
[limits]
max_subdirs_per_dir = 100

[[status_policy]]
status = "BAN"
restricted = ["SIMPLE"]
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.limits.max_subdirs_per_dir, 100);
        assert_eq!(config.validation.min_length, 10);
        assert_eq!(config.status_policy.len(), 1);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) =
            write_config(r#"{ "validation": { "min_dots": 2 }, "logging": { "json": true } }"#, "json");

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.validation.min_dots, 2);
        assert!(config.logging.json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/metricspace.toml")));

        let err = result.unwrap_err();
        assert!(matches!(err, MetricspaceError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let (_temp, path) = write_config(r#"{ "limits": { "max_subdirs_per_dir": "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(result.is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("limits: {}", &PathBuf::from("metricspace.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_parse_config_defaults_to_toml_without_extension() {
        let config = parse_config("[logging]\nlevel = \"warn\"\n", &PathBuf::from("metricspace"))
            .unwrap();
        assert_eq!(config.logging.level, "warn");
    }
}
