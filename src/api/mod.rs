//! # API Module
//!
//! HTTP endpoints served to the browser client. Each endpoint is an async axum
//! handler that receives the shared [`AppState`](crate::server::AppState)
//! through an `Extension` layer.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`index`] - `GET /`, redirects to Spotify's authorization page
//! - [`callback`] - `GET /callback/q`, exchanges the authorization code and
//!   renders the control page
//!
//! ### Playback
//!
//! - [`play`] - `POST /play`
//! - [`pause`] - `POST /pause`
//! - [`volume`] - `POST /volume`
//! - [`shuffle`] - `POST /shuffle`
//!
//! Command bodies are optional JSON and parsed leniently: a missing or
//! malformed body counts as an empty command.
//!
//! ### Information
//!
//! - [`devices`] - `GET /devices`, the user's Spotify Connect devices
//! - [`status`] - `GET /status`, whether the relay holds a token
//! - [`health`] - `GET /health`, liveness and version
//!
//! ## Errors
//!
//! Failures are reported as plain-text bodies:
//!
//! | Condition | Status |
//! |---|---|
//! | no token stored, or the refresh was refused | 401 |
//! | invalid command | 400 |
//! | no active playback for a shuffle toggle | 404 |
//! | Spotify API error | Spotify's status |
//! | Spotify unreachable | 502 |

mod callback;
mod devices;
mod health;
mod index;
mod page;
mod player;
mod status;

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{spotify::SpotifyError, warning};

pub use callback::callback;
pub use devices::devices;
pub use health::health;
pub use index::index;
pub use player::{pause, play, shuffle, volume};
pub use status::status;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Spotify(SpotifyError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(message) => write!(f, "bad request: {}", message),
            ApiError::Spotify(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SpotifyError> for ApiError {
    fn from(err: SpotifyError) -> Self {
        ApiError::Spotify(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Spotify(e) => match e {
                SpotifyError::NotAuthorized | SpotifyError::TokenRequest { .. } => {
                    StatusCode::UNAUTHORIZED
                }
                SpotifyError::Api { status, .. } => *status,
                SpotifyError::NoActivePlayback => StatusCode::NOT_FOUND,
                SpotifyError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
                SpotifyError::Http(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Spotify(SpotifyError::NotAuthorized) => {
                "Not authorized with Spotify. Visit / to log in.".to_string()
            }
            ApiError::Spotify(SpotifyError::TokenRequest { message, .. }) => format!(
                "Spotify refused to renew the session ({}). Visit / to log in again.",
                message
            ),
            ApiError::Spotify(SpotifyError::Api { message, .. }) => message.clone(),
            ApiError::Spotify(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warning!("Request failed with {}: {}", status, self);
        (status, self.message()).into_response()
    }
}
