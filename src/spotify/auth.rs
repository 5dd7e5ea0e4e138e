use std::time::Duration;

use reqwest::{Url, header::AUTHORIZATION};
use tokio::time::sleep;

use crate::{
    config::Settings,
    success,
    types::{Token, TokenResponse},
    utils, warning,
};

use super::{SpotifyClient, SpotifyError, error_message};

/// Lower bound for the wait between two scheduled refreshes.
pub const MIN_REFRESH_DELAY_SECS: u64 = 1;

/// Builds the URL of Spotify's authorization page.
///
/// The user is redirected here to grant the relay access to their account.
/// After approval Spotify redirects back to `settings.redirect_uri` with a
/// one-time `code` and the `state` value passed in here.
///
/// # Arguments
///
/// * `settings` - Client ID, redirect URI, scope and authorization endpoint
/// * `state` - Opaque value echoed back on the callback, checked there
///
/// # Query Parameters
///
/// - `client_id`, `response_type=code`, `redirect_uri`, `scope`, `state`
/// - `show_dialog=true` when `SPOTIFY_SHOW_DIALOG` is enabled, forcing the
///   approval dialog even for users who already approved the app
///
/// # Errors
///
/// Returns [`SpotifyError::InvalidUrl`] if the configured authorization
/// endpoint is not a valid URL.
///
/// # Example
///
/// ```
/// let url = authorize_url(&settings, "a1b2c3")?;
/// assert!(url.as_str().starts_with("https://accounts.spotify.com/authorize?"));
/// ```
pub fn authorize_url(settings: &Settings, state: &str) -> Result<Url, SpotifyError> {
    let mut params = vec![
        ("client_id", settings.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", settings.redirect_uri.as_str()),
        ("scope", settings.scope.as_str()),
        ("state", state),
    ];
    if settings.show_dialog {
        params.push(("show_dialog", "true"));
    }

    Url::parse_with_params(&settings.auth_url, &params)
        .map_err(|e| SpotifyError::InvalidUrl(format!("{}: {}", settings.auth_url, e)))
}

impl SpotifyClient {
    /// Exchanges an authorization code for access and refresh tokens.
    ///
    /// Completes the authorization-code flow by posting the code received on
    /// the callback to the accounts service. The client authenticates with an
    /// HTTP Basic header built from the client ID and secret. The resulting
    /// token replaces whatever was stored before.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code received on the OAuth callback
    ///
    /// # Request
    ///
    /// `POST {token_url}` with form fields `grant_type=authorization_code`,
    /// `code` and `redirect_uri` (which must match the one used to authorize).
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::TokenRequest`] if the accounts service refuses the
    ///   code (expired, already used, redirect URI mismatch)
    /// - [`SpotifyError::Http`] for network failures or malformed responses
    ///
    /// # Example
    ///
    /// ```
    /// let token = spotify.exchange_code("AQA...auth_code").await?;
    /// println!("Access token expires in {} seconds", token.expires_in);
    /// ```
    pub async fn exchange_code(&self, code: &str) -> Result<Token, SpotifyError> {
        let res = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ])
            .await?;

        let token = Token::from_response(res, None);
        self.tokens.store(token.clone()).await;
        Ok(token)
    }

    /// Refreshes the stored access token using its refresh token.
    ///
    /// Uses the `refresh_token` grant. When Spotify rotates the refresh token
    /// the new one is kept, otherwise the previous one is carried over.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::NotAuthorized`] if no token is stored
    /// - [`SpotifyError::TokenRequest`] if the refresh token was revoked, in
    ///   which case the stored token is discarded and the refresh task stopped
    /// - [`SpotifyError::Http`] for network failures or malformed responses
    pub async fn refresh_access_token(&self) -> Result<Token, SpotifyError> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .await
            .ok_or(SpotifyError::NotAuthorized)?;

        let res = match self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await
        {
            Ok(res) => res,
            Err(SpotifyError::TokenRequest { status, message }) if status.is_client_error() => {
                // The grant is dead, the stored token cannot be renewed anymore
                warning!("Spotify refused the refresh token, discarding the session");
                self.tokens.clear().await;
                return Err(SpotifyError::TokenRequest { status, message });
            }
            Err(e) => return Err(e),
        };

        let token = Token::from_response(res, Some(&refresh_token));
        self.tokens.store(token.clone()).await;
        Ok(token)
    }

    /// Starts (or restarts) the background refresh task.
    ///
    /// Does nothing unless the refresh strategy includes the timer. The task
    /// sleeps until `REFRESH_MARGIN_SECS` before expiry, refreshes, and repeats
    /// with the new token's lifetime. Refreshes share the client's refresh lock
    /// with the reactive path, and a token renewed in the meantime is not
    /// refreshed again. The task stops when a refresh fails or the token slot
    /// is cleared (a refused refresh grant clears it), leaving recovery to the
    /// reactive path or a new login.
    pub async fn start_refresh_timer(&self) {
        if !self.settings.refresh_strategy.uses_timer() {
            return;
        }

        let client = self.clone();
        let handle = tokio::spawn(async move { client.run_refresh_timer().await });
        self.tokens.replace_refresh_task(handle).await;
    }

    async fn run_refresh_timer(self) {
        let margin = self.settings.refresh_margin_secs;
        loop {
            let Some(token) = self.tokens.current().await else {
                return;
            };
            let delay = token.refresh_delay(margin).max(MIN_REFRESH_DELAY_SECS);
            sleep(Duration::from_secs(delay)).await;

            let _guard = self.refresh_lock.lock().await;
            if self.tokens.access_token().await.as_deref() != Some(token.access_token.as_str()) {
                // Renewed by a reactive refresh while sleeping, reschedule
                continue;
            }

            match self.refresh_access_token().await {
                Ok(token) => success!("Access token refreshed, valid for {}s", token.expires_in),
                Err(e) => {
                    warning!("Scheduled token refresh failed: {}", e);
                    return;
                }
            }
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let res = self
            .http
            .post(&self.settings.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(&self.settings.client_id, &self.settings.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = error_message(status, &res.text().await.unwrap_or_default());
            return Err(SpotifyError::TokenRequest { status, message });
        }

        Ok(res.json::<TokenResponse>().await?)
    }
}
