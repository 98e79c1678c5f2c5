use std::sync::Arc;
use threadline_persist::{PersistenceClient, ThreadService, UserService};
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The storage handle is opened once at startup and shared by both services.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub users: UserService,
    pub threads: ThreadService,
}

impl AppState {
    pub fn new(config: Config, persist: Arc<dyn PersistenceClient>) -> Self {
        Self {
            config: Arc::new(config),
            users: UserService::new(persist.clone()),
            threads: ThreadService::new(persist.clone()),
            persist,
        }
    }
}
