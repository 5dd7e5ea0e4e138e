//! Configuration management for the Spotify remote relay.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. All values are read once at startup into an
//! immutable [`Settings`] snapshot that is shared by the request handlers.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command line flags (highest priority, applied by the binary)
//! 2. Environment variables
//! 3. `.env` file in the local data directory, then in the working directory
//! 4. Application defaults (where applicable)

use std::{
    env, fmt,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SCOPE: &str =
    "user-read-private user-modify-playback-state user-read-playback-state";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;

/// Path of the OAuth callback route, relative to the relay's public URL.
pub const CALLBACK_PATH: &str = "/callback/q";

/// Loads environment variables from `.env` files.
///
/// Looks for a `.env` file in the platform-specific local data directory under
/// `spotremote/.env` first and then in the current working directory. Variables
/// that are already set in the process environment are never overwritten.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spotremote/.env`
/// - macOS: `~/Library/Application Support/spotremote/.env`
/// - Windows: `%LOCALAPPDATA%/spotremote/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created. Missing
/// `.env` files are not an error, a deployment may configure everything
/// through the environment.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotremote/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.exists() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    dotenv::dotenv().ok();
    Ok(())
}

/// Error raised while building [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(String),
    Invalid { name: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "{} has an invalid value: {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// How the relay keeps the access token fresh.
///
/// `Timer` refreshes in the background shortly before the token expires,
/// `Reactive` refreshes when Spotify rejects a call with 401 and retries that
/// call once. `Both` does both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RefreshStrategy {
    Timer,
    Reactive,
    #[default]
    Both,
}

impl RefreshStrategy {
    pub fn uses_timer(self) -> bool {
        matches!(self, RefreshStrategy::Timer | RefreshStrategy::Both)
    }

    pub fn uses_reactive(self) -> bool {
        matches!(self, RefreshStrategy::Reactive | RefreshStrategy::Both)
    }
}

impl FromStr for RefreshStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timer" => Ok(RefreshStrategy::Timer),
            "reactive" => Ok(RefreshStrategy::Reactive),
            "both" => Ok(RefreshStrategy::Both),
            other => Err(format!("unknown refresh strategy: {}", other)),
        }
    }
}

/// Immutable runtime configuration of the relay.
///
/// Built once at startup by [`Settings::from_env`]. The URLs of Spotify's
/// accounts service and Web API are configurable so the relay can be pointed
/// at a test double.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub show_dialog: bool,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub refresh_strategy: RefreshStrategy,
    pub refresh_margin_secs: u64,
}

impl Settings {
    /// Builds the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `SPOTIFY_CLIENT_ID`,
    /// `SPOTIFY_CLIENT_SECRET` or (when no explicit `SPOTIFY_REDIRECT_URI` is
    /// given) `CLIENT_SIDE_URL` is unset, and [`ConfigError::Invalid`] for
    /// values that cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// let settings = Settings::from_env()?;
    /// println!("callback: {}", settings.redirect_uri);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the settings from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| get(name).ok_or_else(|| ConfigError::Missing(name.to_string()));

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let host = parse_or(&get, "SERVER_HOST", IpAddr::from([0, 0, 0, 0]))?;

        let redirect_uri = match get("SPOTIFY_REDIRECT_URI") {
            Some(uri) => uri,
            None => {
                let client_side_url = require("CLIENT_SIDE_URL")?;
                format!(
                    "{}:{}{}",
                    client_side_url.trim_end_matches('/'),
                    port,
                    CALLBACK_PATH
                )
            }
        };

        Ok(Settings {
            client_id: require("SPOTIFY_CLIENT_ID")?,
            client_secret: require("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri,
            scope: get("SPOTIFY_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            show_dialog: parse_bool(&get, "SPOTIFY_SHOW_DIALOG")?,
            auth_url: get("SPOTIFY_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: get("SPOTIFY_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            host,
            port,
            refresh_strategy: parse_or(&get, "REFRESH_STRATEGY", RefreshStrategy::default())?,
            refresh_margin_secs: parse_or(
                &get,
                "REFRESH_MARGIN_SECS",
                DEFAULT_REFRESH_MARGIN_SECS,
            )?,
        })
    }

    /// Address the HTTP server binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Address a browser on this machine can use to reach the relay.
    pub fn local_url(&self) -> String {
        let host = if self.host.is_unspecified() {
            "127.0.0.1".to_string()
        } else {
            self.host.to_string()
        };
        format!("http://{}:{}/", host, self.port)
    }
}

fn parse_or<G, T>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, name: &str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name: name.to_string(),
                value,
            }),
        },
        None => Ok(false),
    }
}
