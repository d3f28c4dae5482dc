// Configuration loading and parsing (config/dashboard.toml).

use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single config file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub data: DataConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Browser tab title of the page.
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Sold-players CSV, relative to the working directory.
    pub players_csv: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub ws_port: u16,
}

impl ServerConfig {
    /// The bind address; only valid after `validate` has accepted `host`.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate configuration text. `path` is only used in errors.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` at startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    parse_config(&text, &path)
}

/// Copy `defaults/dashboard.toml` to `config/` if the latter is missing.
/// Returns the copied path, or `None` when nothing had to be copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/{CONFIG_FILE} nor config/{CONFIG_FILE} found in {}; \
                 run from the project root",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying the default file first when needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.dashboard.title.trim().is_empty() {
        return Err(invalid("dashboard.title", "must not be empty"));
    }

    if config.data.players_csv.trim().is_empty() {
        return Err(invalid("data.players_csv", "must not be empty"));
    }

    let server = &config.server;
    if server.ip().is_none() {
        return Err(invalid(
            "server.host",
            format!("`{}` is not an IP address", server.host),
        ));
    }
    if server.http_port == 0 {
        return Err(invalid("server.http_port", "must be greater than 0"));
    }
    if server.ws_port == 0 {
        return Err(invalid("server.ws_port", "must be greater than 0"));
    }
    if server.http_port == server.ws_port {
        return Err(invalid(
            "server.ws_port",
            format!("must differ from server.http_port ({})", server.http_port),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VALID: &str = r#"
[dashboard]
title = "IPL Auction Dash Board"

[data]
players_csv = "data/IPL_2022_Sold_Players.csv"

[server]
host = "127.0.0.1"
http_port = 8050
ws_port = 8051
"#;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("dashboard.toml"))
    }

    fn expect_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn parses_valid_config() {
        let config = parse(VALID).expect("should parse");
        assert_eq!(config.dashboard.title, "IPL Auction Dash Board");
        assert_eq!(config.data.players_csv, "data/IPL_2022_Sold_Players.csv");
        assert_eq!(config.server.http_port, 8050);
        assert_eq!(config.server.ws_port, 8051);
        assert_eq!(config.server.ip(), Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn rejects_zero_port() {
        let text = VALID.replace("http_port = 8050", "http_port = 0");
        expect_field(parse(&text).unwrap_err(), "server.http_port");
    }

    #[test]
    fn rejects_shared_port() {
        let text = VALID.replace("ws_port = 8051", "ws_port = 8050");
        expect_field(parse(&text).unwrap_err(), "server.ws_port");
    }

    #[test]
    fn rejects_bad_host() {
        let text = VALID.replace("127.0.0.1", "localhost");
        expect_field(parse(&text).unwrap_err(), "server.host");
    }

    #[test]
    fn rejects_empty_data_path() {
        let text = VALID.replace("data/IPL_2022_Sold_Players.csv", "");
        expect_field(parse(&text).unwrap_err(), "data.players_csv");
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let err = parse("this is not valid [[[ toml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn parse_error_for_missing_section() {
        let text = VALID.replace("[server]", "[servers]");
        assert!(matches!(parse(&text).unwrap_err(), ConfigError::ParseError { .. }));
    }

    #[test]
    fn file_not_found_without_config_dir() {
        let tmp = std::env::temp_dir().join("auctiondash_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_default() {
        let tmp = std::env::temp_dir().join("auctiondash_config_copy");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), VALID).unwrap();

        let copied = ensure_config_files(&tmp).expect("should copy");
        assert!(copied.is_some_and(|p| p.ends_with(CONFIG_FILE)));

        let config = load_config_from(&tmp).expect("copied config should load");
        assert_eq!(config.server.ws_port, 8051);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_keeps_existing() {
        let tmp = std::env::temp_dir().join("auctiondash_config_keep");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), VALID).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();

        assert!(ensure_config_files(&tmp).unwrap().is_none());
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_missing() {
        let tmp = std::env::temp_dir().join("auctiondash_config_none");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
