//! Configuration management for tastemixer.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! - Linux: `~/.local/share/tastemixer/.env`
//! - macOS: `~/Library/Application Support/tastemixer/.env`
//! - Windows: `%LOCALAPPDATA%/tastemixer/.env`
//!
//! Variables already present in the process environment take precedence
//! over the file. Configuration is split in two: [`ClientConfig`] is what
//! the user-facing side needs and never carries the client secret;
//! [`IntermediaryConfig`] is only built by the token intermediary.

use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use secrecy::SecretString;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_SKEW_MARGIN_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Scopes the application cannot work without: reading the user's id and
/// creating (private) playlists on their behalf.
pub const REQUIRED_SCOPES: &[&str] = &["user-read-private", "playlist-modify-private"];

pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-top-read",
    "playlist-modify-public",
    "playlist-modify-private",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("cannot load environment file: {0}")]
    Env(String),
}

/// Loads environment variables from `<data_local_dir>/tastemixer/.env`.
///
/// A missing file is not an error; every variable can also be supplied
/// through the environment directly.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Env(e.to_string()))?;
    }
    Ok(())
}

pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tastemixer/.env");
    path
}

/// Settings for the user-facing side: building the authorization URL,
/// talking to the intermediary and calling the Web API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub api_url: String,
    pub intermediary_url: String,
    pub server_addr: SocketAddr,
    pub skew_margin: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_addr: SocketAddr = parsed("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)?;
        let scopes = match env::var("SPOTIFY_API_AUTH_SCOPE") {
            Ok(raw) if !raw.trim().is_empty() => parse_scopes(&raw),
            _ => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(ClientConfig {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scopes,
            auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            intermediary_url: optional("INTERMEDIARY_URL", &format!("http://{server_addr}")),
            server_addr,
            skew_margin: Duration::from_secs(parsed(
                "TOKEN_SKEW_MARGIN_SECS",
                &DEFAULT_SKEW_MARGIN_SECS.to_string(),
            )?),
            request_timeout: Duration::from_secs(parsed(
                "REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )?),
        })
    }

    /// Required scopes that are not in the configured list.
    pub fn missing_scopes(&self) -> Vec<String> {
        REQUIRED_SCOPES
            .iter()
            .filter(|required| !self.scopes.iter().any(|s| s == *required))
            .map(|s| s.to_string())
            .collect()
    }
}

/// Settings for the token intermediary, the only place the client secret
/// is ever loaded.
#[derive(Clone)]
pub struct IntermediaryConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub token_url: String,
    pub server_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl IntermediaryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(IntermediaryConfig {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: SecretString::new(required("SPOTIFY_API_AUTH_CLIENT_SECRET")?),
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            server_addr: parsed("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)?,
            request_timeout: Duration::from_secs(parsed(
                "REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )?),
        })
    }

    /// Whether a client secret is available in this environment.
    pub fn secret_available() -> bool {
        env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").is_ok_and(|s| !s.is_empty())
    }
}

impl fmt::Debug for IntermediaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntermediaryConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("server_addr", &self.server_addr)
            .finish()
    }
}

/// Splits a space- or comma-delimited scope list.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional(var: &'static str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = optional(var, default);
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_scopes(scopes: &[&str]) -> ClientConfig {
        ClientConfig {
            client_id: "id".to_string(),
            redirect_uri: "http://127.0.0.1:3000/callback".to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            intermediary_url: "http://127.0.0.1:3000".to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.parse().unwrap(),
            skew_margin: Duration::from_secs(60),
            request_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn parse_scopes_accepts_spaces_and_commas() {
        assert_eq!(
            parse_scopes("user-read-private, playlist-modify-private  user-top-read"),
            vec![
                "user-read-private",
                "playlist-modify-private",
                "user-top-read"
            ]
        );
    }

    #[test]
    fn default_scopes_cover_required() {
        assert!(config_with_scopes(DEFAULT_SCOPES).missing_scopes().is_empty());
    }

    #[test]
    fn missing_scopes_reported() {
        let config = config_with_scopes(&["user-read-private"]);
        assert_eq!(config.missing_scopes(), vec!["playlist-modify-private"]);
    }

    #[test]
    fn intermediary_debug_hides_secret() {
        let config = IntermediaryConfig {
            client_id: "id".to_string(),
            client_secret: SecretString::new("hunter2".to_string()),
            redirect_uri: "http://127.0.0.1:3000/callback".to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.parse().unwrap(),
            request_timeout: Duration::from_secs(10),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
