// Session Manager — §4.1. Process-wide registry of connected players, their
// identity/activity bookkeeping, and the idle sweep. Instantiated once at
// startup and injected via `AppState`, mirroring how the teacher's
// `LobbyRegistry` is a single value built in `frameworks::server::build_state`
// rather than an ambient global.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info};

use crate::interface_adapters::protocol::ServerMessage;
use crate::interface_adapters::utils::palette;
use crate::use_cases::lobby::LobbyRegistry;
use crate::use_cases::types::{LobbyCommand, ServerStats};

struct SessionEntry {
    name: String,
    color: &'static str,
    outbound: UnboundedSender<ServerMessage>,
    last_activity: Instant,
    connected_at: Instant,
    current_lobby: Option<String>,
    games_played: Arc<AtomicU32>,
    games_won: Arc<AtomicU32>,
    /// Signaled by the idle sweep to ask the connection task to close.
    shutdown: Arc<Notify>,
}

pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    started_at: Instant,
    idle_timeout: Duration,
    next_color: std::sync::atomic::AtomicUsize,
}

/// Public snapshot of a session's identity, returned to the caller on register.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: String,
    pub color: &'static str,
    pub shutdown: Arc<Notify>,
}

impl SessionManager {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            started_at: Instant::now(),
            idle_timeout,
            next_color: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Registers a new session, assigning the next color from the fixed palette.
    pub async fn register(
        &self,
        id: String,
        default_name: String,
        outbound: UnboundedSender<ServerMessage>,
    ) -> SessionHandle {
        let slot = self.next_color.fetch_add(1, Ordering::Relaxed);
        let color = palette::color_for_slot(slot);
        let shutdown = Arc::new(Notify::new());
        let now = Instant::now();

        let entry = SessionEntry {
            name: default_name,
            color,
            outbound,
            last_activity: now,
            connected_at: now,
            current_lobby: None,
            games_played: Arc::new(AtomicU32::new(0)),
            games_won: Arc::new(AtomicU32::new(0)),
            shutdown: shutdown.clone(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), entry);
        info!(session_id = %id, color, "session registered");

        SessionHandle {
            id,
            color,
            shutdown,
        }
    }

    pub async fn unregister(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        debug!(session_id = %id, "session unregistered");
    }

    pub async fn touch(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(id) {
            entry.last_activity = Instant::now();
        }
    }

    pub async fn name(&self, id: &str) -> Option<String> {
        self.sessions.read().await.get(id).map(|e| e.name.clone())
    }

    pub async fn set_name(&self, id: &str, name: String) {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.name = name;
        }
    }

    pub async fn color(&self, id: &str) -> Option<&'static str> {
        self.sessions.read().await.get(id).map(|e| e.color)
    }

    pub async fn current_lobby(&self, id: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(id)
            .and_then(|e| e.current_lobby.clone())
    }

    pub async fn set_current_lobby(&self, id: &str, lobby_id: Option<String>) {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.current_lobby = lobby_id;
        }
    }

    pub async fn game_counters(&self, id: &str) -> Option<(Arc<AtomicU32>, Arc<AtomicU32>)> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|e| (e.games_played.clone(), e.games_won.clone()))
    }

    pub async fn send(&self, id: &str, message: ServerMessage) {
        let sessions = self.sessions.read().await;
        if let Some(entry) = sessions.get(id) {
            let _ = entry.outbound.send(message);
        }
    }

    pub async fn server_stats(&self, lobby_registry: &LobbyRegistry) -> ServerStats {
        let sessions = self.sessions.read().await;
        let (total_lobbies, active_games) = lobby_registry.counts().await;
        ServerStats {
            total_players: sessions.len(),
            total_lobbies,
            active_games,
            uptime_secs: self.started_at.elapsed().as_secs(),
            memory_usage_bytes: current_memory_usage_bytes(),
        }
    }

    pub async fn player_stats(&self, id: &str) -> Option<(String, u32, u32)> {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|e| {
            (
                e.name.clone(),
                e.games_played.load(Ordering::Relaxed),
                e.games_won.load(Ordering::Relaxed),
            )
        })
    }

    pub async fn connected_since(&self, id: &str) -> Option<Instant> {
        self.sessions.read().await.get(id).map(|e| e.connected_at)
    }

    /// Runs forever, evicting sessions idle past `idle_timeout` and asking
    /// their connection tasks to close. Spawned once at startup.
    pub async fn run_idle_sweep(self: Arc<Self>, lobby_registry: Arc<LobbyRegistry>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.sweep_idle(&lobby_registry).await;
            lobby_registry.sweep_empty().await;
        }
    }

    async fn sweep_idle(&self, lobby_registry: &LobbyRegistry) {
        let now = Instant::now();
        let expired: Vec<(String, Option<String>, Arc<Notify>)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter(|(_, e)| now.duration_since(e.last_activity) >= self.idle_timeout)
                .map(|(id, e)| (id.clone(), e.current_lobby.clone(), e.shutdown.clone()))
                .collect()
        };

        for (id, lobby_id, shutdown) in expired {
            info!(session_id = %id, "evicting idle session");
            if let Some(lobby_id) = lobby_id {
                lobby_registry
                    .send_command(&lobby_id, LobbyCommand::Leave {
                        session_id: id.clone(),
                    })
                    .await;
            }
            self.unregister(&id).await;
            shutdown.notify_waiters();
        }
    }

    pub async fn broadcast_shutdown(&self, reason: &str) {
        let sessions = self.sessions.read().await;
        for entry in sessions.values() {
            let _ = entry.outbound.send(ServerMessage::ServerShutdown {
                reason: reason.to_string(),
            });
            entry.shutdown.notify_waiters();
        }
    }
}

#[cfg(target_os = "linux")]
fn current_memory_usage_bytes() -> u64 {
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .and_then(|pages| pages.parse::<u64>().ok())
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
fn current_memory_usage_bytes() -> u64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_assigns_distinct_colors() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let (tx_a, _rx_a) = tokio::sync::mpsc::unbounded_channel();
        let (tx_b, _rx_b) = tokio::sync::mpsc::unbounded_channel();
        let a = manager.register("a".into(), "Guest".into(), tx_a).await;
        let b = manager.register("b".into(), "Guest".into(), tx_b).await;
        assert_ne!(a.color, b.color);
    }

    #[tokio::test]
    async fn touch_updates_last_activity() {
        let manager = SessionManager::new(Duration::from_millis(50));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        manager.register("a".into(), "Guest".into(), tx).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        manager.touch("a").await;
        // Not directly observable without exposing last_activity; registration
        // succeeding and touch not panicking is the behavior under test here.
        assert!(manager.name("a").await.is_some());
    }
}
