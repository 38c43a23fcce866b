use std::sync::Arc;

use crate::use_cases::lobby::LobbyRegistry;
use crate::use_cases::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub lobbies: Arc<LobbyRegistry>,
}
