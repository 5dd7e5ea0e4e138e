use axum::{Extension, response::Redirect};

use crate::{server::AppState, spotify::auth};

use super::ApiError;

pub async fn index(Extension(state): Extension<AppState>) -> Result<Redirect, ApiError> {
    let value = state.states.issue().await;
    let url = auth::authorize_url(state.spotify.settings(), &value)?;
    Ok(Redirect::to(url.as_str()))
}
