use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// Builds a token from an accounts service response.
    ///
    /// Spotify may leave out `refresh_token` when answering a refresh request,
    /// in which case the previous refresh token stays valid and is carried over.
    pub fn from_response(res: TokenResponse, previous_refresh_token: Option<&str>) -> Self {
        Token {
            access_token: res.access_token,
            refresh_token: res
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous_refresh_token.map(str::to_string))
                .unwrap_or_default(),
            token_type: res.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: res.scope.unwrap_or_default(),
            expires_in: res.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }

    pub fn expires_at(&self) -> u64 {
        self.obtained_at.saturating_add(self.expires_in)
    }

    /// Seconds from now until the token should be refreshed, leaving `margin`
    /// seconds of validity.
    ///
    /// A margin that covers the whole lifetime is halved relative to the
    /// lifetime, so short-lived tokens are not refreshed back to back.
    pub fn refresh_delay(&self, margin: u64) -> u64 {
        let margin = if margin >= self.expires_in {
            self.expires_in / 2
        } else {
            margin
        };
        let now = Utc::now().timestamp() as u64;
        self.expires_at().saturating_sub(now.saturating_add(margin))
    }

    pub fn is_expired(&self, margin: u64) -> bool {
        let now = Utc::now().timestamp() as u64;
        now.saturating_add(margin) >= self.expires_at()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_restricted: bool,
    pub volume_percent: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl UserProfile {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    pub device: Option<Device>,
    #[serde(default)]
    pub shuffle_state: bool,
    #[serde(default)]
    pub is_playing: bool,
    pub repeat_state: Option<String>,
}

/// Decodes one command field, turning a value of the wrong type into `None`
/// so the remaining fields of the body still apply.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceCommand {
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayCommand {
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub uris: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeCommand {
    #[serde(default, deserialize_with = "lenient")]
    pub volume_percent: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShuffleCommand {
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub authorized: bool,
    pub expires_at: Option<String>,
    pub scope: Option<String>,
    pub refresh_strategy: String,
}
