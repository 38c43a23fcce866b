// Use-case level enums shared between the session and lobby layers.

use crate::domain::position::Direction;
use crate::domain::settings::GameSettingsPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Waiting,
    Starting,
    Playing,
    Finished,
}

/// Player-originated actions forwarded by a session to its current lobby.
#[derive(Debug, Clone)]
pub enum PlayerInput {
    Direction(Direction),
    UseWeapon,
}

/// Commands a session's connection task submits to a lobby actor. Every
/// mutation of lobby state funnels through this channel so no two commands
/// for the same lobby interleave (§5).
#[derive(Debug)]
pub enum LobbyCommand {
    /// A non-creator joining an existing lobby. `reply` carries the accept/
    /// reject decision back to the connecting session's net-layer task so it
    /// can update the session's `current_lobby` only on success; the lobby
    /// state or error itself is delivered separately through `outbound`.
    Join {
        session_id: String,
        name: String,
        color: &'static str,
        password: Option<String>,
        games_played: std::sync::Arc<std::sync::atomic::AtomicU32>,
        games_won: std::sync::Arc<std::sync::atomic::AtomicU32>,
        outbound: tokio::sync::mpsc::UnboundedSender<crate::interface_adapters::protocol::ServerMessage>,
        reply: tokio::sync::oneshot::Sender<Result<(), CommandError>>,
    },
    Leave {
        session_id: String,
    },
    SetReady {
        session_id: String,
        ready: bool,
    },
    Input {
        session_id: String,
        input: PlayerInput,
    },
    Chat {
        session_id: String,
        name: String,
        message: String,
    },
    UpdateSettings {
        session_id: String,
        patch: GameSettingsPatch,
    },
    NameChanged {
        session_id: String,
        name: String,
    },
    /// Internal: re-validates and, if still eligible, begins the countdown.
    /// Submitted by a delayed task rather than applied directly (§5).
    AutoStartCheck,
    /// Internal: one second of the three-second countdown has elapsed.
    CountdownTick { remaining: u32 },
    /// Internal: countdown finished; transition to `playing`.
    BeginPlaying,
    /// Internal: the ten-second post-game delay elapsed.
    PostGameReset,
    /// Internal: registry is tearing this lobby down (e.g. swept empty).
    Shutdown,
}

/// Errors surfaced to the offending session only (§7 Command validation).
#[derive(Debug, Clone)]
pub enum CommandError {
    AlreadyInLobby,
    NotInLobby,
    LobbyNotFound,
    LobbyFull,
    WrongPassword,
    WrongState,
    NotLobbyCreator,
    InvalidPayload(String),
}

impl CommandError {
    pub fn message(&self) -> String {
        match self {
            CommandError::AlreadyInLobby => "already in a lobby".to_string(),
            CommandError::NotInLobby => "not in a lobby".to_string(),
            CommandError::LobbyNotFound => "lobby not found".to_string(),
            CommandError::LobbyFull => "lobby is full".to_string(),
            CommandError::WrongPassword => "incorrect password".to_string(),
            CommandError::WrongState => "lobby is not accepting that action right now".to_string(),
            CommandError::NotLobbyCreator => "only the lobby creator can do that".to_string(),
            CommandError::InvalidPayload(detail) => detail.clone(),
        }
    }
}

/// Read-only process-wide stats exposed by `get_player_stats` (§4.1).
#[derive(Debug, Clone, Copy)]
pub struct ServerStats {
    pub total_players: usize,
    pub total_lobbies: usize,
    pub active_games: usize,
    pub uptime_secs: u64,
    pub memory_usage_bytes: u64,
}

/// Summary row for `get_lobbies`: public, `waiting` lobbies only.
#[derive(Debug, Clone)]
pub struct LobbySummary {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: u8,
    pub is_private: bool,
    pub game_state: GameState,
}