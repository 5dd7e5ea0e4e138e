//! # Spotify Integration Module
//!
//! This module is the relay's only path to Spotify. It owns the shared HTTP
//! client, the single in-memory token slot and the logic that keeps that token
//! usable.
//!
//! ## Architecture
//!
//! ```text
//! API Layer (axum handlers)
//!          ↓
//! SpotifyClient
//!     ├── Authentication (authorization-code and refresh-token grants)
//!     └── Player (play, pause, volume, shuffle, devices, profile)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify accounts service / Web API
//! ```
//!
//! ## Token Lifecycle
//!
//! 1. **Authorization**: the browser is redirected to [`auth::authorize_url`]
//! 2. **Code Exchange**: the callback code is exchanged for access and refresh
//!    tokens using HTTP Basic client authentication
//! 3. **Timer Refresh**: a background task refreshes the token shortly before
//!    it expires (when the refresh strategy includes the timer)
//! 4. **Reactive Refresh**: a 401 from the Web API triggers one refresh and one
//!    retry of the rejected call (when the strategy includes it)
//!
//! ## Error Types
//!
//! Every operation returns [`SpotifyError`]. The API layer turns it into an
//! HTTP response for the browser.

pub mod auth;
pub mod player;

use std::{fmt, sync::Arc};

use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode,
    header::CONTENT_LENGTH,
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{config::Settings, management::TokenManager, utils, warning};

#[derive(Debug)]
pub enum SpotifyError {
    /// No token has been obtained yet, or it was discarded.
    NotAuthorized,
    /// The accounts service refused a token request.
    TokenRequest { status: StatusCode, message: String },
    /// The Web API answered with a non-success status.
    Api { status: StatusCode, message: String },
    /// A command needs an active playback session and there is none.
    NoActivePlayback,
    InvalidUrl(String),
    Http(reqwest::Error),
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::NotAuthorized => write!(f, "not authorized with Spotify"),
            SpotifyError::TokenRequest { status, message } => {
                write!(f, "token request failed ({}): {}", status, message)
            }
            SpotifyError::Api { status, message } => {
                write!(f, "Spotify API error ({}): {}", status, message)
            }
            SpotifyError::NoActivePlayback => write!(f, "no active playback session"),
            SpotifyError::InvalidUrl(e) => write!(f, "invalid URL: {}", e),
            SpotifyError::Http(e) => write!(f, "request to Spotify failed: {}", e),
        }
    }
}

impl std::error::Error for SpotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpotifyError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}

/// Handle to Spotify shared by all request handlers.
///
/// Clones share the HTTP connection pool, the settings and the token slot.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: Arc<Settings>,
    tokens: TokenManager,
    refresh_lock: Arc<Mutex<()>>,
}

impl SpotifyClient {
    pub fn new(settings: Settings) -> Self {
        Self::with_http_client(settings, Client::new())
    }

    pub fn with_http_client(settings: Settings, http: Client) -> Self {
        SpotifyClient {
            http,
            settings: Arc::new(settings),
            tokens: TokenManager::new(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Sends an authenticated Web API request.
    ///
    /// On a 401 the token is refreshed and the request is repeated once, if the
    /// configured strategy allows reactive refreshes.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response, SpotifyError> {
        let token = self
            .tokens
            .access_token()
            .await
            .ok_or(SpotifyError::NotAuthorized)?;

        let res = self
            .request(method.clone(), path, query, body, &token)
            .send()
            .await?;

        if res.status() != StatusCode::UNAUTHORIZED
            || !self.settings.refresh_strategy.uses_reactive()
        {
            return check_status(res).await;
        }

        warning!("Spotify rejected the access token for {} {}, refreshing", method, path);
        let token = self.refresh_after_rejection(&token).await?;
        let res = self.request(method, path, query, body, &token).send().await?;
        check_status(res).await
    }

    /// Returns a usable access token after `rejected` was refused.
    ///
    /// Concurrent rejections of the same token lead to a single refresh, the
    /// others pick up the token it produced.
    async fn refresh_after_rejection(&self, rejected: &str) -> Result<String, SpotifyError> {
        let _guard = self.refresh_lock.lock().await;
        match self.tokens.access_token().await {
            Some(current) if current != rejected => Ok(current),
            Some(_) => Ok(self.refresh_access_token().await?.access_token),
            None => Err(SpotifyError::NotAuthorized),
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: &str,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.settings.api_url, path);
        let has_payload = method != Method::GET;
        let mut req = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            req = req.query(query);
        }
        match body {
            Some(body) => req.json(body),
            None if has_payload => req.header(CONTENT_LENGTH, "0"),
            None => req,
        }
    }
}

async fn check_status(res: Response) -> Result<Response, SpotifyError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = error_message(status, &res.text().await.unwrap_or_default());
    Err(SpotifyError::Api { status, message })
}

fn error_message(status: StatusCode, body: &str) -> String {
    let message = utils::spotify_error_message(body);
    if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    }
}
