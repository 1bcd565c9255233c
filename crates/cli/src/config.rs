//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML/YAML file, then `CORRETAJE__*` environment variables
//! (`CORRETAJE__API__HOST`, `CORRETAJE__AUTH__IDENTITY_TOKEN`, ...).

use config::{Config, ConfigError, Environment, File};
use corretaje_session::config::DEFAULT_SESSION_WINDOW_SECS;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{Level, warn};

const SESSION_FILE: &str = "session.json";

/// Upper bound for `auth.session_window_secs` (ten years)
pub const MAX_SESSION_WINDOW_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    /// Where the session file lives; platform data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Origin of the back-office API, without the `/api` prefix
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Identity provider token presented on login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
    /// Lifetime assumed for tokens without an `exp` claim
    #[serde(default = "default_session_window_secs")]
    pub session_window_secs: u64,
}

fn default_api_host() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_session_window_secs() -> u64 {
    DEFAULT_SESSION_WINDOW_SECS.unsigned_abs()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            identity_token: None,
            session_window_secs: default_session_window_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            auth: AuthSettings::default(),
            state_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CORRETAJE")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let window = self.auth.session_window_secs;
        if window == 0 || window > MAX_SESSION_WINDOW_SECS {
            return Err(ConfigError::Message(format!(
                "auth.session_window_secs must be between 1 and {MAX_SESSION_WINDOW_SECS}, got {window}"
            )));
        }
        Ok(())
    }

    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }

        match ProjectDirs::from("cl", "Corretaje", "corretaje") {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => {
                warn!("Failed to determine platform data directory, using ./.corretaje");
                PathBuf::from(".corretaje")
            }
        }
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir().join(SESSION_FILE)
    }

    /// Configured log level; unknown names fall back to `warn`
    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or_else(|_| {
            eprintln!("Unknown log level {:?}, using warn", self.log_level);
            Level::WARN
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.host, "http://localhost:3000");
        assert_eq!(settings.auth.session_window_secs, 7200);
        assert_eq!(settings.log_level(), Level::WARN);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corretaje.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"
state_dir = "/tmp/corretaje-state"

[api]
host = "https://backoffice.example.cl"

[auth]
identity_token = "id-123"
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.api.host, "https://backoffice.example.cl");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.auth.identity_token.as_deref(), Some("id-123"));
        assert_eq!(settings.log_level(), Level::DEBUG);
        assert_eq!(
            settings.session_file(),
            PathBuf::from("/tmp/corretaje-state/session.json")
        );
    }

    #[test]
    fn test_session_window_is_range_checked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corretaje.toml");

        fs::write(&path, "[auth]\nsession_window_secs = 9000000000000\n").unwrap();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("session_window_secs"));

        fs::write(&path, "[auth]\nsession_window_secs = 0\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());

        fs::write(&path, "[auth]\nsession_window_secs = 3600\n").unwrap();
        assert_eq!(
            Settings::load(Some(&path)).unwrap().auth.session_window_secs,
            3600
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
