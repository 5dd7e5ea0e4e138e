use axum::{Extension, response::Json};

use crate::{server::AppState, types::DevicesResponse};

use super::ApiError;

pub async fn devices(
    Extension(state): Extension<AppState>,
) -> Result<Json<DevicesResponse>, ApiError> {
    let devices = state.spotify.devices().await?;
    Ok(Json(DevicesResponse { devices }))
}
