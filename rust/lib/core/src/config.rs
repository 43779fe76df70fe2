use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default Directus instance when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://directus.example.com";

/// Connection settings for a Directus instance.
///
/// Built once at startup and handed to the resource client. The credential
/// lives here rather than in a global so that every client carries the token
/// it was constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectusConfig {
    /// Base URL of the Directus instance, without a trailing slash.
    pub base_url: String,

    /// Static bearer token. A token stored in local state takes precedence.
    pub token: Option<String>,

    /// Directory holding local state.
    /// Defaults to `~/.pabrik` if not specified.
    pub state_dir: Option<PathBuf>,

    /// Path to the local state database.
    /// Defaults to `{state_dir}/state.redb` if not specified.
    pub state_path: Option<PathBuf>,

    /// Request timeout in seconds. `None` leaves requests pending until the
    /// remote answers or the connection drops.
    pub timeout_secs: Option<u64>,
}

impl Default for DirectusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            state_dir: None,
            state_path: None,
            timeout_secs: None,
        }
    }
}

impl DirectusConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--base-url=URL`
    /// - `--token=TOKEN`
    /// - `--state-dir=PATH`
    /// - `--state=PATH`
    /// - `--timeout=SECS`
    ///
    /// Unknown arguments are ignored.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut config = DirectusConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--base-url=") {
                config.base_url = normalize_base_url(val);
            } else if let Some(val) = arg.strip_prefix("--token=") {
                config.token = non_empty(val);
            } else if let Some(val) = arg.strip_prefix("--state-dir=") {
                config.state_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--state=") {
                config.state_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                config.timeout_secs = Some(parse_secs("--timeout", val)?);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Overlay values from a variable lookup (`PABRIK_BASE_URL`,
    /// `PABRIK_TOKEN`, `PABRIK_STATE_DIR`, `PABRIK_TIMEOUT`).
    ///
    /// Takes a lookup function so tests don't have to touch the process
    /// environment; pass `|k| std::env::var(k).ok()` in binaries.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PABRIK_BASE_URL") {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(token) = lookup("PABRIK_TOKEN") {
            self.token = non_empty(&token);
        }
        if let Some(dir) = lookup("PABRIK_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("PABRIK_TIMEOUT") {
            self.timeout_secs = Some(parse_secs("PABRIK_TIMEOUT", &secs)?);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.as_str();
        if url.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BaseUrl(url.to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolve the state directory, falling back to `~/.pabrik`.
    pub fn resolve_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(home_state_dir)
    }

    /// Resolve the local state database path, falling back to
    /// `{state_dir}/state.redb`.
    pub fn resolve_state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| self.resolve_state_dir().join("state.redb"))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty(val: &str) -> Option<String> {
    let val = val.trim();
    if val.is_empty() {
        None
    } else {
        Some(val.to_string())
    }
}

fn parse_secs(flag: &'static str, val: &str) -> Result<u64, ConfigError> {
    val.trim().parse().map_err(|_| ConfigError::Number {
        flag,
        value: val.to_string(),
    })
}

fn home_state_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pabrik")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_args() {
        let config = DirectusConfig::from_args(&args(&[
            "--base-url=http://localhost:8055/",
            "--token=abc",
            "--state-dir=/tmp/pabrik",
            "--timeout=15",
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8055");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(
            config.resolve_state_path(),
            PathBuf::from("/tmp/pabrik/state.redb")
        );
    }

    #[test]
    fn test_defaults_have_no_timeout() {
        let config = DirectusConfig::from_args(&[]).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.token.is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_bad_timeout() {
        let err = DirectusConfig::from_args(&args(&["--timeout=later"])).unwrap_err();
        assert!(matches!(err, ConfigError::Number { flag: "--timeout", .. }));
    }

    #[test]
    fn test_bad_base_url() {
        let err = DirectusConfig::from_args(&args(&["--base-url=ftp://x"])).unwrap_err();
        assert_eq!(err, ConfigError::BaseUrl("ftp://x".into()));
    }

    #[test]
    fn test_env_overlay() {
        let mut config = DirectusConfig::new("http://a");
        config
            .apply_env(|key| match key {
                "PABRIK_BASE_URL" => Some("http://b/".into()),
                "PABRIK_TOKEN" => Some("  ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url, "http://b");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_explicit_state_path_wins() {
        let config = DirectusConfig {
            state_dir: Some(PathBuf::from("/data")),
            state_path: Some(PathBuf::from("/elsewhere/s.redb")),
            ..Default::default()
        };
        assert_eq!(config.resolve_state_path(), PathBuf::from("/elsewhere/s.redb"));
    }
}
