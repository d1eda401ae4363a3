// src/state.rs

use crate::{config::Config, services::Services, session::SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    pub fn new(services: Services, config: Config) -> Self {
        Self {
            services,
            sessions: SessionManager::new(),
            config,
        }
    }
}
