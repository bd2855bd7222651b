use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

const ENV_KEYS: [&str; 4] = [
    "TWITTER_CONSUMER_KEY",
    "TWITTER_CONSUMER_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_TOKEN_SECRET",
];

/// The four opaque secrets used for OAuth 1.0a. No validation, no rotation;
/// the service is the only judge of whether they are good.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub credentials: Credentials,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_stream_url")]
    pub stream_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.twitter.com/1.1".into()
}

fn default_stream_url() -> String {
    "https://stream.twitter.com/1.1".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Resolve configuration in order: explicit path, environment variables,
    /// then the default config file. An explicit config struct is the only
    /// way credentials travel; there is no process-wide singleton.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Some(config) = Self::from_env() {
            return Ok(config);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Err(Error::Config(format!(
                "no credentials found: set {} or create {}",
                ENV_KEYS.join(", "),
                Self::default_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "a credentials file".into())
            ))),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Build a config from `TWITTER_*` environment variables. All four must
    /// be present; a partial set falls through to the config file.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            credentials: Credentials {
                consumer_key: std::env::var("TWITTER_CONSUMER_KEY").ok()?,
                consumer_secret: std::env::var("TWITTER_CONSUMER_SECRET").ok()?,
                access_token: std::env::var("TWITTER_ACCESS_TOKEN").ok()?,
                access_token_secret: std::env::var("TWITTER_ACCESS_TOKEN_SECRET").ok()?,
            },
            api_url: default_api_url(),
            stream_url: default_stream_url(),
            timeout_secs: default_timeout_secs(),
        })
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tweetlens").join("credentials.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_file_minimal() {
        let file = write_config(
            r#"
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.credentials.consumer_key, "ck");
        assert_eq!(config.api_url, "https://api.twitter.com/1.1");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_file_overrides() {
        let file = write_config(
            r#"
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
api_url = "http://localhost:8080"
timeout_secs = 5
"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_file_missing_key_fails() {
        let file = write_config("consumer_key = \"ck\"\n");
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = Config::from_file(Path::new("/nonexistent/credentials.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
