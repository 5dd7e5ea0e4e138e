use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const STATE_LENGTH: usize = 32;

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for the accounts service: `Basic base64(id:secret)`.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Parses a command body, falling back to the default command for empty or
/// malformed JSON.
///
/// Only bodies that are not a JSON object are discarded as a whole. Inside an
/// object, a field with the wrong type is dropped on its own.
pub fn parse_command<T>(body: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_default()
}

/// Pulls a human readable message out of a Spotify error body.
///
/// The Web API answers with `{"error": {"status": .., "message": ..}}` while the
/// accounts service uses `{"error": .., "error_description": ..}`.
pub fn spotify_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
