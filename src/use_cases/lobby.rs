// Lobby registry — spawns and tracks per-lobby actor tasks. Mirrors the
// teacher's `LobbyRegistry`/`LobbyHandle` split: this module owns lifecycle
// (create/lookup/sweep), the actor loop itself lives in `use_cases::tick`.

use std::collections::HashMap;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};
use tracing::{info, warn};

use crate::domain::settings::GameSettings;
use crate::use_cases::tick::lobby_task;
use crate::use_cases::types::{CommandError, GameState, LobbyCommand, LobbySummary};

const COMMAND_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum LobbyError {
    NameTooLong,
}

struct LobbyRecord {
    command_tx: mpsc::Sender<LobbyCommand>,
    summary_rx: watch::Receiver<LobbySummary>,
    #[allow(dead_code)]
    task: tokio::task::JoinHandle<()>,
}

pub struct CreateLobbyParams {
    pub name: String,
    pub max_players: u8,
    pub is_private: bool,
    pub password: Option<String>,
    pub settings: GameSettings,
    pub creator_id: String,
    pub creator_name: String,
    pub creator_color: &'static str,
    pub creator_games_played: Arc<AtomicU32>,
    pub creator_games_won: Arc<AtomicU32>,
    pub creator_outbound: tokio::sync::mpsc::UnboundedSender<crate::interface_adapters::protocol::ServerMessage>,
}

pub struct LobbyRegistry {
    lobbies: RwLock<HashMap<String, LobbyRecord>>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_lobby(&self, lobby_id: String, params: CreateLobbyParams) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (summary_tx, summary_rx) = watch::channel(LobbySummary {
            id: lobby_id.clone(),
            name: params.name.clone(),
            player_count: 1,
            max_players: params.max_players,
            is_private: params.is_private,
            game_state: GameState::Waiting,
        });

        let task = tokio::spawn(lobby_task(
            lobby_id.clone(),
            params,
            command_tx.clone(),
            command_rx,
            summary_tx,
        ));

        let mut lobbies = self.lobbies.write().await;
        lobbies.insert(
            lobby_id.clone(),
            LobbyRecord {
                command_tx,
                summary_rx,
                task,
            },
        );
        info!(lobby_id = %lobby_id, "lobby created");
    }

    pub async fn exists(&self, lobby_id: &str) -> bool {
        self.lobbies.read().await.contains_key(lobby_id)
    }

    pub async fn send_command(&self, lobby_id: &str, command: LobbyCommand) -> bool {
        let tx = {
            let lobbies = self.lobbies.read().await;
            lobbies.get(lobby_id).map(|r| r.command_tx.clone())
        };
        match tx {
            Some(tx) => tx.send(command).await.is_ok(),
            None => false,
        }
    }

    /// Validates against the latest published summary before handing the
    /// command to the actor, so full/playing/password errors don't need a
    /// round trip through the lobby task itself.
    pub async fn join(
        &self,
        lobby_id: &str,
        session_id: String,
        name: String,
        color: &'static str,
        password: Option<String>,
        games_played: Arc<AtomicU32>,
        games_won: Arc<AtomicU32>,
        outbound: tokio::sync::mpsc::UnboundedSender<crate::interface_adapters::protocol::ServerMessage>,
    ) -> Result<(), CommandError> {
        let command_tx = {
            let lobbies = self.lobbies.read().await;
            lobbies.get(lobby_id).map(|r| r.command_tx.clone())
        };
        let Some(command_tx) = command_tx else {
            let _ = outbound.send(crate::interface_adapters::protocol::ServerMessage::Error {
                message: CommandError::LobbyNotFound.message(),
            });
            return Err(CommandError::LobbyNotFound);
        };

        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        if command_tx
            .send(LobbyCommand::Join {
                session_id,
                name,
                color,
                password,
                games_played,
                games_won,
                outbound: outbound.clone(),
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            let _ = outbound.send(crate::interface_adapters::protocol::ServerMessage::Error {
                message: CommandError::LobbyNotFound.message(),
            });
            return Err(CommandError::LobbyNotFound);
        }

        reply_rx.await.unwrap_or(Err(CommandError::LobbyNotFound))
    }

    pub async fn list_public_waiting(&self) -> Vec<LobbySummary> {
        let lobbies = self.lobbies.read().await;
        lobbies
            .values()
            .map(|r| r.summary_rx.borrow().clone())
            .filter(|s| !s.is_private && matches!(s.game_state, GameState::Waiting))
            .collect()
    }

    pub async fn counts(&self) -> (usize, usize) {
        let lobbies = self.lobbies.read().await;
        let total = lobbies.len();
        let active = lobbies
            .values()
            .filter(|r| matches!(r.summary_rx.borrow().game_state, GameState::Playing))
            .count();
        (total, active)
    }

    /// Removes lobbies with no members, run alongside the session idle sweep.
    pub async fn sweep_empty(&self) {
        let empty: Vec<String> = {
            let lobbies = self.lobbies.read().await;
            lobbies
                .iter()
                .filter(|(_, r)| r.summary_rx.borrow().player_count == 0)
                .map(|(id, _)| id.clone())
                .collect()
        };

        if empty.is_empty() {
            return;
        }

        let mut lobbies = self.lobbies.write().await;
        for id in empty {
            if let Some(record) = lobbies.remove(&id) {
                let _ = record.command_tx.try_send(LobbyCommand::Shutdown);
                info!(lobby_id = %id, "empty lobby swept");
            } else {
                warn!(lobby_id = %id, "lobby vanished before sweep could remove it");
            }
        }
    }

    pub async fn broadcast_shutdown(&self) {
        let lobbies = self.lobbies.read().await;
        for record in lobbies.values() {
            let _ = record.command_tx.send(LobbyCommand::Shutdown).await;
        }
    }
}
