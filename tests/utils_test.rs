use spotremote::types::{DeviceCommand, PlayCommand, VolumeCommand};
use spotremote::utils::*;

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly STATE_LENGTH characters
    assert_eq!(state.len(), STATE_LENGTH);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    assert_ne!(state, generate_state());
}

#[test]
fn test_basic_auth_header() {
    assert_eq!(
        basic_auth_header("client-id", "client-secret"),
        "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ="
    );
}

#[test]
fn test_parse_command_with_device() {
    let command: DeviceCommand = parse_command(br#"{"device_id": "abc"}"#);
    assert_eq!(command.device_id.as_deref(), Some("abc"));
}

#[test]
fn test_parse_command_is_lenient() {
    // Empty and whitespace-only bodies
    let command: DeviceCommand = parse_command(b"");
    assert!(command.device_id.is_none());
    let command: DeviceCommand = parse_command(b"  \n");
    assert!(command.device_id.is_none());

    // Malformed JSON falls back to an empty command
    let command: PlayCommand = parse_command(b"device_id=abc");
    assert!(command.device_id.is_none());
    assert!(command.uris.is_none());

    // JSON null is not an object either
    let command: VolumeCommand = parse_command(b"null");
    assert!(command.volume_percent.is_none());
}

#[test]
fn test_parse_command_ignores_unknown_fields() {
    let command: PlayCommand =
        parse_command(br#"{"device_id": "abc", "uris": ["spotify:track:1"], "extra": 1}"#);
    assert_eq!(command.device_id.as_deref(), Some("abc"));
    assert_eq!(command.uris, Some(vec!["spotify:track:1".to_string()]));
}

#[test]
fn test_spotify_error_message() {
    // Web API error shape
    assert_eq!(
        spotify_error_message(
            r#"{"error": {"status": 404, "message": "Player command failed: No active device found", "reason": "NO_ACTIVE_DEVICE"}}"#
        ),
        "Player command failed: No active device found"
    );

    // Accounts service error shape
    assert_eq!(
        spotify_error_message(
            r#"{"error": "invalid_grant", "error_description": "Refresh token revoked"}"#
        ),
        "Refresh token revoked"
    );
    assert_eq!(
        spotify_error_message(r#"{"error": "invalid_client"}"#),
        "invalid_client"
    );

    // Not JSON at all
    assert_eq!(spotify_error_message(" Bad gateway \n"), "Bad gateway");
    assert_eq!(spotify_error_message(""), "");
}

#[test]
fn test_html_escape() {
    assert_eq!(
        html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
    );
    assert_eq!(html_escape("plain"), "plain");
}

#[test]
fn test_parse_command_drops_only_mistyped_fields() {
    let command: PlayCommand =
        parse_command(br#"{"device_id": "abc", "uris": "spotify:track:1", "context_uri": null}"#);
    assert_eq!(command.device_id.as_deref(), Some("abc"));
    assert!(command.uris.is_none());
    assert!(command.context_uri.is_none());

    let command: VolumeCommand = parse_command(br#"{"volume_percent": "loud", "device_id": "abc"}"#);
    assert!(command.volume_percent.is_none());
    assert_eq!(command.device_id.as_deref(), Some("abc"));
}
