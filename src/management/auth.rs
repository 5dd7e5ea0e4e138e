use std::sync::Arc;

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};

use crate::types::Token;

/// The relay's single token slot.
///
/// Cloning is cheap and every clone shares the same slot, so request handlers
/// and the background refresh task all see the latest token.
#[derive(Clone, Default)]
pub struct TokenManager {
    token: Arc<RwLock<Option<Token>>>,
    refresh_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, token: Token) {
        *self.token.write().await = Some(token);
    }

    pub async fn current(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.refresh_token.clone())
            .filter(|t| !t.is_empty())
    }

    pub async fn is_authorized(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Installs a new background refresh task, aborting the previous one.
    pub async fn replace_refresh_task(&self, handle: JoinHandle<()>) {
        let mut slot = self.refresh_task.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
        if let Some(task) = self.refresh_task.lock().await.take() {
            task.abort();
        }
    }
}
