use axum::{Extension, body::Bytes};

use crate::{
    info,
    server::AppState,
    types::{DeviceCommand, PlayCommand, ShuffleCommand, VolumeCommand},
    utils,
};

use super::ApiError;

fn target(device_id: Option<&str>) -> String {
    match device_id {
        Some(id) if !id.trim().is_empty() => format!(" on device {}", id),
        _ => String::new(),
    }
}

pub async fn play(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let command: PlayCommand = utils::parse_command(&body);
    state.spotify.play(&command).await?;
    info!("Playback started{}", target(command.device_id.as_deref()));
    Ok("Playback Started!")
}

pub async fn pause(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let command: DeviceCommand = utils::parse_command(&body);
    state.spotify.pause(command.device_id.as_deref()).await?;
    info!("Playback paused{}", target(command.device_id.as_deref()));
    Ok("Playback Paused!")
}

pub async fn volume(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<String, ApiError> {
    let command: VolumeCommand = utils::parse_command(&body);
    let requested = command
        .volume_percent
        .ok_or_else(|| ApiError::BadRequest("volume_percent is required".to_string()))?;
    let percent = u8::try_from(requested)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "volume_percent must be between 0 and 100, got {}",
                requested
            ))
        })?;

    state
        .spotify
        .set_volume(percent, command.device_id.as_deref())
        .await?;
    info!("Volume set to {}%{}", percent, target(command.device_id.as_deref()));
    Ok(format!("Volume set to {}%!", percent))
}

/// Sets shuffle to the requested state, or flips it when none is given.
pub async fn shuffle(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let command: ShuffleCommand = utils::parse_command(&body);
    let device_id = command.device_id.as_deref();

    let enabled = match command.state {
        Some(enabled) => {
            state.spotify.set_shuffle(enabled, device_id).await?;
            enabled
        }
        None => state.spotify.toggle_shuffle(device_id).await?,
    };

    info!(
        "Shuffle {}{}",
        if enabled { "enabled" } else { "disabled" },
        target(device_id)
    );
    Ok(if enabled {
        "Shuffle Enabled!"
    } else {
        "Shuffle Disabled!"
    })
}
