use std::{collections::VecDeque, sync::Arc};

use tokio::sync::Mutex;

use crate::utils;

pub const MAX_PENDING_STATES: usize = 16;

/// OAuth `state` values handed out with authorization redirects.
///
/// Each value is accepted once. Only the most recent [`MAX_PENDING_STATES`]
/// are remembered so abandoned logins do not pile up.
#[derive(Clone, Default)]
pub struct StateManager {
    state: Arc<Mutex<VecDeque<String>>>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self) -> String {
        let value = utils::generate_state();
        let mut state = self.state.lock().await;
        if state.len() >= MAX_PENDING_STATES {
            state.pop_front();
        }
        state.push_back(value.clone());
        value
    }

    pub async fn consume(&self, value: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.iter().position(|s| s == value) {
            Some(idx) => {
                state.remove(idx);
                true
            }
            None => false,
        }
    }

    pub async fn pending(&self) -> usize {
        self.state.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_is_single_use() {
        let manager = StateManager::new();
        let state = manager.issue().await;
        assert!(manager.consume(&state).await);
        assert!(!manager.consume(&state).await);
        assert!(!manager.consume("unknown").await);
    }

    #[tokio::test]
    async fn oldest_state_is_dropped() {
        let manager = StateManager::new();
        let first = manager.issue().await;
        for _ in 0..MAX_PENDING_STATES {
            manager.issue().await;
        }
        assert_eq!(manager.pending().await, MAX_PENDING_STATES);
        assert!(!manager.consume(&first).await);
    }
}
