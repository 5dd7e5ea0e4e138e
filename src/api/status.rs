use axum::{Extension, response::Json};
use chrono::DateTime;

use crate::{server::AppState, types::StatusResponse};

pub async fn status(Extension(state): Extension<AppState>) -> Json<StatusResponse> {
    let token = state.spotify.tokens().current().await;
    let strategy = format!("{:?}", state.spotify.settings().refresh_strategy).to_lowercase();

    Json(StatusResponse {
        authorized: token.is_some(),
        expires_at: token
            .as_ref()
            .and_then(|t| DateTime::from_timestamp(t.expires_at() as i64, 0))
            .map(|d| d.to_rfc3339()),
        scope: token.map(|t| t.scope),
        refresh_strategy: strategy,
    })
}
