use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::AppState;

/// Liveness probe. Also tells whether a Spotify session is held, without
/// exposing anything about the token itself.
pub async fn health(Extension(state): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "authorized": state.spotify.tokens().is_authorized().await,
    }))
}
