//! Application State
//!
//! Shared, read-only state across all handlers.

use std::sync::Arc;

use tutor_agent::TutorAgent;
use tutor_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub agent: Arc<TutorAgent>,
}

impl AppState {
    pub fn new(settings: Settings, agent: TutorAgent) -> Self {
        Self {
            settings: Arc::new(settings),
            agent: Arc::new(agent),
        }
    }
}
