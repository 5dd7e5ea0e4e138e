use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use crate::types::{
    Device, DevicesResponse, PlayCommand, PlaybackState, UserProfile,
};

use super::{SpotifyClient, SpotifyError};

fn device_query(device_id: Option<&str>) -> Vec<(&'static str, String)> {
    device_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| vec![("device_id", id.to_string())])
        .unwrap_or_default()
}

fn play_body(command: &PlayCommand) -> Option<Value> {
    let mut body = serde_json::Map::new();
    if let Some(context_uri) = &command.context_uri {
        body.insert("context_uri".to_string(), json!(context_uri));
    }
    if let Some(uris) = &command.uris {
        body.insert("uris".to_string(), json!(uris));
    }
    if body.is_empty() {
        None
    } else {
        Some(Value::Object(body))
    }
}

impl SpotifyClient {
    /// Starts or resumes playback, optionally on a given device or context.
    pub async fn play(&self, command: &PlayCommand) -> Result<(), SpotifyError> {
        let body = play_body(command);
        self.send(
            Method::PUT,
            "/me/player/play",
            &device_query(command.device_id.as_deref()),
            body.as_ref(),
        )
        .await?;
        Ok(())
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Result<(), SpotifyError> {
        self.send(Method::PUT, "/me/player/pause", &device_query(device_id), None)
            .await?;
        Ok(())
    }

    pub async fn set_volume(&self, percent: u8, device_id: Option<&str>) -> Result<(), SpotifyError> {
        let mut query = vec![("volume_percent", percent.to_string())];
        query.extend(device_query(device_id));
        self.send(Method::PUT, "/me/player/volume", &query, None).await?;
        Ok(())
    }

    pub async fn set_shuffle(&self, state: bool, device_id: Option<&str>) -> Result<(), SpotifyError> {
        let mut query = vec![("state", state.to_string())];
        query.extend(device_query(device_id));
        self.send(Method::PUT, "/me/player/shuffle", &query, None).await?;
        Ok(())
    }

    /// Flips the current shuffle state and returns the new one.
    pub async fn toggle_shuffle(&self, device_id: Option<&str>) -> Result<bool, SpotifyError> {
        let playback = self
            .playback_state()
            .await?
            .ok_or(SpotifyError::NoActivePlayback)?;
        let next = !playback.shuffle_state;
        self.set_shuffle(next, device_id).await?;
        Ok(next)
    }

    /// Current playback, or `None` when nothing is playing on any device.
    pub async fn playback_state(&self) -> Result<Option<PlaybackState>, SpotifyError> {
        let res = self.send(Method::GET, "/me/player", &[], None).await?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = res.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body).map(Some).map_err(|e| SpotifyError::Api {
            status: StatusCode::BAD_GATEWAY,
            message: format!("unexpected playback state: {}", e),
        })
    }

    pub async fn devices(&self) -> Result<Vec<Device>, SpotifyError> {
        let res = self
            .send(Method::GET, "/me/player/devices", &[], None)
            .await?;
        Ok(res.json::<DevicesResponse>().await?.devices)
    }

    pub async fn profile(&self) -> Result<UserProfile, SpotifyError> {
        let res = self.send(Method::GET, "/me", &[], None).await?;
        Ok(res.json::<UserProfile>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_device_ids_are_dropped() {
        assert!(device_query(None).is_empty());
        assert!(device_query(Some("  ")).is_empty());
        assert_eq!(
            device_query(Some("abc")),
            vec![("device_id", "abc".to_string())]
        );
    }

    #[test]
    fn play_body_only_when_context_given() {
        assert!(play_body(&PlayCommand::default()).is_none());

        let command = PlayCommand {
            device_id: Some("abc".to_string()),
            context_uri: Some("spotify:album:1".to_string()),
            uris: None,
        };
        assert_eq!(
            play_body(&command),
            Some(json!({ "context_uri": "spotify:album:1" }))
        );
    }
}
