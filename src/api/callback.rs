use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{server::AppState, success, warning};

use super::page;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Html(page::message_page("Login failed", message))).into_response()
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<AppState>,
) -> Response {
    let known_state = match params.state.as_deref() {
        Some(value) => state.states.consume(value).await,
        None => false,
    };
    if !known_state {
        warning!("Rejected callback with unknown OAuth state");
        return failure(
            StatusCode::BAD_REQUEST,
            "This login attempt is unknown or has expired.",
        );
    }

    if let Some(error) = params.error {
        warning!("Spotify denied authorization: {}", error);
        return failure(
            StatusCode::BAD_REQUEST,
            &format!("Spotify reported: {}", error),
        );
    }

    let Some(code) = params.code else {
        return failure(StatusCode::BAD_REQUEST, "Missing authorization code.");
    };

    if let Err(e) = state.spotify.exchange_code(&code).await {
        warning!("Token exchange failed: {}", e);
        return failure(StatusCode::BAD_GATEWAY, "Could not obtain a token from Spotify.");
    }
    state.spotify.start_refresh_timer().await;

    let (profile, devices) = tokio::join!(state.spotify.profile(), state.spotify.devices());
    let profile = profile
        .map_err(|e| warning!("Failed to load profile: {}", e))
        .ok();
    let devices = devices.unwrap_or_else(|e| {
        warning!("Failed to load devices: {}", e);
        Vec::new()
    });

    success!(
        "Authorized as {} ({} device(s) available)",
        profile.as_ref().map(|p| p.name()).unwrap_or("unknown user"),
        devices.len()
    );
    Html(page::control_page(profile.as_ref(), &devices)).into_response()
}
