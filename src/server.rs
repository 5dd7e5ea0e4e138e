use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::{
    Res, api,
    config::{CALLBACK_PATH, Settings},
    info,
    management::StateManager,
    spotify::SpotifyClient,
    warning,
};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub spotify: SpotifyClient,
    pub states: StateManager,
}

impl AppState {
    pub fn new(spotify: SpotifyClient) -> Self {
        AppState {
            spotify,
            states: StateManager::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route(CALLBACK_PATH, get(api::callback))
        .route("/play", post(api::play))
        .route("/pause", post(api::pause))
        .route("/volume", post(api::volume))
        .route("/shuffle", post(api::shuffle))
        .route("/devices", get(api::devices))
        .route("/status", get(api::status))
        .route("/health", get(api::health))
        .layer(Extension(state))
}

pub async fn start_api_server(settings: Settings) -> Res<()> {
    let addr = settings.listen_addr();
    let state = AppState::new(SpotifyClient::new(settings));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warning!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
