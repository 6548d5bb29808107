// Configuration loading and parsing (client.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const CLIENT_FILE: &str = "client.toml";
const CREDENTIALS_FILE: &str = "credentials.toml";

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
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub season: SeasonConfig,
    pub output: OutputConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// client.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire client.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ClientFile {
    server: ServerConfig,
    season: SeasonConfig,
    output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Root of the pick'em API, e.g. `https://pickem.example.com/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    /// Regular-season length. Weekly totals outside `1..=weeks` are rejected.
    pub weeks: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Csv,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsConfig {
    /// Both halves of the login, if configured.
    pub fn login(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/client.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- client.toml (required) ---
    let client_path = config_dir.join(CLIENT_FILE);
    let client_text = read_file(&client_path)?;
    let client_file: ClientFile =
        toml::from_str(&client_text).map_err(|e| ConfigError::ParseError {
            path: client_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join(CREDENTIALS_FILE);
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        server: client_file.server,
        season: client_file.season,
        output: client_file.output,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/client.toml` from `defaults/client.toml` on first run.
///
/// Returns the path written, or `None` when the client is already
/// configured. Credentials are never seeded: the example file holds
/// placeholders and the user copies it by hand.
pub fn seed_client_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CLIENT_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CLIENT_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} is missing and there is no {} to seed it from",
                target.display(),
                source.display()
            ),
        });
    }

    let seed_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(seed_err)?;
    std::fs::copy(&source, &target).map_err(seed_err)?;
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// into place first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(seeded) = seed_client_config(&cwd)? {
        info!("Seeded {} from defaults", seeded.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Longest season the client accepts (regular season plus playoffs).
const MAX_SEASON_WEEKS: u32 = 22;

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.server.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".into(),
            message: format!("must start with http:// or https://, got `{url}`"),
        });
    }

    if config.server.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let weeks = config.season.weeks;
    if !(1..=MAX_SEASON_WEEKS).contains(&weeks) {
        return Err(ConfigError::ValidationError {
            field: "season.weeks".into(),
            message: format!("must be between 1 and {MAX_SEASON_WEEKS}, got {weeks}"),
        });
    }

    if config.credentials.password.is_some() && config.credentials.username.is_none() {
        return Err(ConfigError::ValidationError {
            field: "credentials.username".into(),
            message: "required when a password is set".into(),
        });
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
    use std::path::PathBuf;

    /// Path to the pickem-client crate root, from either the crate or the
    /// workspace root.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/pickem-client/defaults").exists() {
            cwd.join("crates/pickem-client")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir with `config/client.toml` copied from defaults.
    fn temp_with_defaults(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            project_root().join("defaults/client.toml"),
            tmp.join("config/client.toml"),
        )
        .unwrap();
        tmp
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        match load_config_from(tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_with_defaults("pickem_config_defaults");
        let config = load_config_from(&tmp).expect("should load defaults");

        assert_eq!(config.server.base_url, "http://localhost:61389");
        assert_eq!(config.server.timeout_secs, 10);
        assert_eq!(config.season.weeks, 17);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(config.credentials.login().is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_is_read() {
        let tmp = temp_with_defaults("pickem_config_creds");
        fs::write(
            tmp.join("config/credentials.toml"),
            "username = \"alice\"\npassword = \"hunter2\"\n",
        )
        .unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.credentials.login(), Some(("alice", "hunter2")));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_password_without_username() {
        let tmp = temp_with_defaults("pickem_config_pw_only");
        fs::write(tmp.join("config/credentials.toml"), "password = \"x\"\n").unwrap();
        expect_validation_field(&tmp, "credentials.username");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let tmp = temp_with_defaults("pickem_config_bad_url");
        let text = fs::read_to_string(tmp.join("config/client.toml")).unwrap();
        fs::write(
            tmp.join("config/client.toml"),
            text.replace("http://localhost:61389", "localhost:61389"),
        )
        .unwrap();
        expect_validation_field(&tmp, "server.base_url");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_season_weeks() {
        let tmp = temp_with_defaults("pickem_config_zero_weeks");
        let text = fs::read_to_string(tmp.join("config/client.toml")).unwrap();
        fs::write(tmp.join("config/client.toml"), text.replace("weeks = 17", "weeks = 0")).unwrap();
        expect_validation_field(&tmp, "season.weeks");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let tmp = temp_with_defaults("pickem_config_bad_format");
        let text = fs::read_to_string(tmp.join("config/client.toml")).unwrap();
        fs::write(
            tmp.join("config/client.toml"),
            text.replace("format = \"table\"", "format = \"html\""),
        )
        .unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("client.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_client_toml() {
        let tmp = std::env::temp_dir().join("pickem_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("client.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seed_copies_client_toml_only_once() {
        let tmp = std::env::temp_dir().join("pickem_config_seed");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/client.toml"), defaults_dir.join("client.toml")).unwrap();
        fs::copy(
            root.join("defaults/credentials.toml.example"),
            defaults_dir.join("credentials.toml.example"),
        )
        .unwrap();

        let seeded = seed_client_config(&tmp).unwrap();
        assert_eq!(seeded, Some(tmp.join("config/client.toml")));
        assert!(load_config_from(&tmp).is_ok());
        assert!(!tmp.join("config/credentials.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // An existing client.toml is never overwritten.
        fs::write(tmp.join("config/client.toml"), "# custom\n").unwrap();
        assert_eq!(seed_client_config(&tmp).unwrap(), None);
        assert_eq!(fs::read_to_string(tmp.join("config/client.toml")).unwrap(), "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seed_without_defaults_keeps_existing_config() {
        let tmp = temp_with_defaults("pickem_config_seed_no_defaults");
        assert_eq!(seed_client_config(&tmp).unwrap(), None);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seed_errors_when_nothing_to_seed_from() {
        let tmp = std::env::temp_dir().join("pickem_config_seed_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match seed_client_config(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("no "), "message: {message}");
                assert!(message.contains("defaults"), "message: {message}");
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn example_credentials_parse() {
        let text = fs::read_to_string(project_root().join("defaults/credentials.toml.example")).unwrap();
        let creds: CredentialsConfig = toml::from_str(&text).unwrap();
        assert!(creds.login().is_some());
    }
}
