mod auth;
mod state;

pub use auth::TokenManager;
pub use state::MAX_PENDING_STATES;
pub use state::StateManager;
