// Per-connection WebSocket handling — wires a transport to the Session
// Manager and, through it, to whichever Lobby the session currently belongs
// to. Mirrors the shape of the teacher's `net::run_client_loop`: one
// `tokio::select!` over incoming frames, outgoing session messages, and a
// shutdown signal.

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::{info, info_span, warn};

use crate::domain::settings::{GameSettings, GameSettingsPatch};
use crate::interface_adapters::protocol::{
    ClientMessage, GameSettingsDto, LobbySummaryDto, LobbyStateDto, PlayerPublicDto,
    PlayerStatsDto, ServerMessage, ServerStatsDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng;
use crate::use_cases::lobby::CreateLobbyParams;
use crate::use_cases::session::SessionHandle;
use crate::use_cases::types::{CommandError, GameState, LobbyCommand};

const MAX_NAME_LEN: usize = 20;
const DEFAULT_MAX_PLAYERS: u8 = 4;
const MIN_MAX_PLAYERS: u8 = 2;
const MAX_MAX_PLAYERS: u8 = 8;

const KNOWN_TYPES: &[&str] = &[
    "connect_player",
    "update_player_name",
    "create_lobby",
    "join_lobby",
    "leave_lobby",
    "set_ready",
    "player_input",
    "chat_message",
    "get_lobbies",
    "get_player_stats",
    "update_lobby_settings",
];

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = rng::rand_id();
    let span = info_span!("conn", session_id = %session_id);
    let _enter = span.enter();

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let short = &session_id[..session_id.len().min(6)];
    let default_name = format!("Guest{short}");

    let handle = state
        .sessions
        .register(session_id.clone(), default_name, outbound_tx.clone())
        .await;

    state
        .sessions
        .send(&handle.id, ServerMessage::Welcome {
            player_id: handle.id.clone(),
            color: handle.color,
        })
        .await;

    info!("client connected");
    let close_reason = run_client_loop(socket, &state, &handle, outbound_tx, outbound_rx).await;
    cleanup(&state, &handle).await;
    info!(?close_reason, "client disconnected");
}

async fn cleanup(state: &Arc<AppState>, handle: &SessionHandle) {
    if let Some(lobby_id) = state.sessions.current_lobby(&handle.id).await {
        state
            .lobbies
            .send_command(&lobby_id, LobbyCommand::Leave {
                session_id: handle.id.clone(),
            })
            .await;
    }
    state.sessions.unregister(&handle.id).await;
}

#[derive(Debug)]
enum CloseReason {
    ClientClosed,
    RecvError,
    Idle,
    ServerShutdown,
}

async fn run_client_loop(
    mut socket: WebSocket,
    state: &Arc<AppState>,
    handle: &SessionHandle,
    outbound_tx: mpsc::UnboundedSender<ServerMessage>,
    mut outbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
) -> CloseReason {
    loop {
        let outcome = tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        state.sessions.touch(&handle.id).await;
                        dispatch(&text, state, handle, &outbound_tx).await;
                        None
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => None,
                    Some(Ok(Message::Binary(_))) => None,
                    Some(Ok(Message::Close(_))) | None => Some(CloseReason::ClientClosed),
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket recv error");
                        Some(CloseReason::RecvError)
                    }
                }
            }
            msg = outbound_rx.recv() => {
                match msg {
                    Some(ServerMessage::ServerShutdown { reason }) => {
                        let _ = send_message(&mut socket, &ServerMessage::ServerShutdown { reason }).await;
                        Some(CloseReason::ServerShutdown)
                    }
                    Some(msg) => {
                        if let Err(e) = send_message(&mut socket, &msg).await {
                            warn!(error = ?e, "failed to send outbound message");
                            Some(CloseReason::RecvError)
                        } else {
                            None
                        }
                    }
                    None => Some(CloseReason::ServerShutdown),
                }
            }
            _ = handle.shutdown.notified() => Some(CloseReason::Idle),
        };

        if let Some(reason) = outcome {
            send_close_frame(&mut socket, &reason).await;
            return reason;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), axum::Error> {
    use futures::SinkExt;
    let text = serde_json::to_string(msg).expect("ServerMessage always serializes");
    socket.send(Message::Text(text.into())).await
}

async fn send_close_frame(socket: &mut WebSocket, reason: &CloseReason) {
    use futures::SinkExt;
    let frame = match reason {
        CloseReason::Idle => Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "Inactive".into(),
        }),
        CloseReason::ServerShutdown => Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "Manual disconnect".into(),
        }),
        CloseReason::ClientClosed | CloseReason::RecvError => None,
    };
    if let Some(frame) = frame {
        let _ = socket.send(Message::Close(Some(frame))).await;
    }
    let _ = socket.close().await;
}

fn parse_client_message(text: &str) -> Result<ClientMessage, String> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| "Invalid message format".to_string())?;
    match serde_json::from_value::<ClientMessage>(value.clone()) {
        Ok(msg) => Ok(msg),
        Err(_) => match value.get("type").and_then(|t| t.as_str()) {
            Some(t) if !KNOWN_TYPES.contains(&t) => Err(format!("Unknown command type: {t}")),
            _ => Err("Invalid message format".to_string()),
        },
    }
}

async fn dispatch(
    text: &str,
    state: &Arc<AppState>,
    handle: &SessionHandle,
    outbound_tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    let msg = match parse_client_message(text) {
        Ok(msg) => msg,
        Err(message) => {
            state
                .sessions
                .send(&handle.id, ServerMessage::Error { message })
                .await;
            return;
        }
    };

    match msg {
        ClientMessage::ConnectPlayer { name } => handle_connect_player(state, handle, name).await,
        ClientMessage::UpdatePlayerName { name } => handle_update_name(state, handle, name).await,
        ClientMessage::CreateLobby {
            name,
            max_players,
            is_private,
            password,
            game_settings,
        } => {
            handle_create_lobby(
                state,
                handle,
                outbound_tx,
                name,
                max_players,
                is_private,
                password,
                game_settings.map(Into::into),
            )
            .await
        }
        ClientMessage::JoinLobby { lobby_id, password } => {
            handle_join_lobby(state, handle, outbound_tx, lobby_id, password).await
        }
        ClientMessage::LeaveLobby => handle_leave_lobby(state, handle).await,
        ClientMessage::SetReady { ready } => handle_set_ready(state, handle, ready).await,
        ClientMessage::PlayerInput(dto) => handle_player_input(state, handle, dto.into()).await,
        ClientMessage::ChatMessage { message } => handle_chat(state, handle, message).await,
        ClientMessage::GetLobbies => handle_get_lobbies(state, handle).await,
        ClientMessage::GetPlayerStats => handle_get_player_stats(state, handle).await,
        ClientMessage::UpdateLobbySettings { settings } => {
            handle_update_settings(state, handle, settings.into()).await
        }
    }
}

fn valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.chars().count())
}

async fn require_lobby(state: &Arc<AppState>, handle: &SessionHandle) -> Option<String> {
    let lobby_id = state.sessions.current_lobby(&handle.id).await;
    if lobby_id.is_none() {
        state
            .sessions
            .send(&handle.id, ServerMessage::Error {
                message: CommandError::NotInLobby.message(),
            })
            .await;
    }
    lobby_id
}

async fn handle_connect_player(state: &Arc<AppState>, handle: &SessionHandle, name: Option<String>) {
    if let Some(name) = name {
        let trimmed = name.trim();
        if valid_name(trimmed) {
            state.sessions.set_name(&handle.id, trimmed.to_string()).await;
        }
    }
    let name = state.sessions.name(&handle.id).await.unwrap_or_default();
    state
        .sessions
        .send(&handle.id, ServerMessage::ConnectionConfirmed {
            player_id: handle.id.clone(),
            name,
            color: handle.color,
        })
        .await;
}

async fn handle_update_name(state: &Arc<AppState>, handle: &SessionHandle, name: String) {
    let trimmed = name.trim();
    if !valid_name(trimmed) {
        state
            .sessions
            .send(&handle.id, ServerMessage::Error {
                message: CommandError::InvalidPayload(
                    "name must be 1-20 characters".to_string(),
                )
                .message(),
            })
            .await;
        return;
    }

    state.sessions.set_name(&handle.id, trimmed.to_string()).await;
    state
        .sessions
        .send(&handle.id, ServerMessage::NameUpdated {
            name: trimmed.to_string(),
        })
        .await;

    if let Some(lobby_id) = state.sessions.current_lobby(&handle.id).await {
        state
            .lobbies
            .send_command(&lobby_id, LobbyCommand::NameChanged {
                session_id: handle.id.clone(),
                name: trimmed.to_string(),
            })
            .await;
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_create_lobby(
    state: &Arc<AppState>,
    handle: &SessionHandle,
    outbound_tx: &mpsc::UnboundedSender<ServerMessage>,
    name: Option<String>,
    max_players: Option<u8>,
    is_private: Option<bool>,
    password: Option<String>,
    settings_patch: Option<GameSettingsPatch>,
) {
    if state.sessions.current_lobby(&handle.id).await.is_some() {
        state
            .sessions
            .send(&handle.id, ServerMessage::Error {
                message: CommandError::AlreadyInLobby.message(),
            })
            .await;
        return;
    }

    let Some(creator_name) = state.sessions.name(&handle.id).await else {
        return;
    };
    let Some((games_played, games_won)) = state.sessions.game_counters(&handle.id).await else {
        return;
    };

    let lobby_name = name.unwrap_or_else(|| format!("{creator_name}'s Lobby"));
    let max_players = max_players
        .unwrap_or(DEFAULT_MAX_PLAYERS)
        .clamp(MIN_MAX_PLAYERS, MAX_MAX_PLAYERS);
    let is_private = is_private.unwrap_or(false);
    let mut settings = GameSettings::default();
    if let Some(patch) = &settings_patch {
        settings.apply_patch(patch);
    }

    let lobby_id = format!("lobby-{}", rng::rand_id());
    let params = CreateLobbyParams {
        name: lobby_name.clone(),
        max_players,
        is_private,
        password,
        settings,
        creator_id: handle.id.clone(),
        creator_name: creator_name.clone(),
        creator_color: handle.color,
        creator_games_played: games_played,
        creator_games_won: games_won,
        creator_outbound: outbound_tx.clone(),
    };
    state.lobbies.create_lobby(lobby_id.clone(), params).await;
    state
        .sessions
        .set_current_lobby(&handle.id, Some(lobby_id.clone()))
        .await;

    let creator_public = PlayerPublicDto {
        id: handle.id.clone(),
        name: creator_name,
        color: handle.color,
        score: 0,
        kills: 0,
        deaths: 0,
        is_alive: true,
        is_ready: false,
    };
    state
        .sessions
        .send(&handle.id, ServerMessage::LobbyCreated {
            lobby: LobbyStateDto {
                id: lobby_id.clone(),
                name: lobby_name,
                max_players,
                is_private,
                game_state: GameState::Waiting.into(),
                settings: GameSettingsDto::from(&settings),
                players: vec![creator_public],
                created_by: handle.id.clone(),
            },
        })
        .await;
}

async fn handle_join_lobby(
    state: &Arc<AppState>,
    handle: &SessionHandle,
    outbound_tx: &mpsc::UnboundedSender<ServerMessage>,
    lobby_id: String,
    password: Option<String>,
) {
    if state.sessions.current_lobby(&handle.id).await.is_some() {
        state
            .sessions
            .send(&handle.id, ServerMessage::Error {
                message: CommandError::AlreadyInLobby.message(),
            })
            .await;
        return;
    }

    let Some(name) = state.sessions.name(&handle.id).await else {
        return;
    };
    let Some((games_played, games_won)) = state.sessions.game_counters(&handle.id).await else {
        return;
    };

    if state
        .lobbies
        .join(
            &lobby_id,
            handle.id.clone(),
            name,
            handle.color,
            password,
            games_played,
            games_won,
            outbound_tx.clone(),
        )
        .await
        .is_ok()
    {
        state
            .sessions
            .set_current_lobby(&handle.id, Some(lobby_id))
            .await;
    }
}

async fn handle_leave_lobby(state: &Arc<AppState>, handle: &SessionHandle) {
    let Some(lobby_id) = require_lobby(state, handle).await else {
        return;
    };
    state
        .lobbies
        .send_command(&lobby_id, LobbyCommand::Leave {
            session_id: handle.id.clone(),
        })
        .await;
    state.sessions.set_current_lobby(&handle.id, None).await;
    state
        .sessions
        .send(&handle.id, ServerMessage::LobbyLeft { lobby_id })
        .await;
}

async fn handle_set_ready(state: &Arc<AppState>, handle: &SessionHandle, ready: bool) {
    let Some(lobby_id) = require_lobby(state, handle).await else {
        return;
    };
    state
        .lobbies
        .send_command(&lobby_id, LobbyCommand::SetReady {
            session_id: handle.id.clone(),
            ready,
        })
        .await;
}

async fn handle_player_input(
    state: &Arc<AppState>,
    handle: &SessionHandle,
    input: crate::use_cases::types::PlayerInput,
) {
    let Some(lobby_id) = require_lobby(state, handle).await else {
        return;
    };
    state
        .lobbies
        .send_command(&lobby_id, LobbyCommand::Input {
            session_id: handle.id.clone(),
            input,
        })
        .await;
}

async fn handle_chat(state: &Arc<AppState>, handle: &SessionHandle, message: String) {
    let Some(lobby_id) = require_lobby(state, handle).await else {
        return;
    };
    let Some(name) = state.sessions.name(&handle.id).await else {
        return;
    };
    state
        .lobbies
        .send_command(&lobby_id, LobbyCommand::Chat {
            session_id: handle.id.clone(),
            name,
            message,
        })
        .await;
}

async fn handle_get_lobbies(state: &Arc<AppState>, handle: &SessionHandle) {
    let lobbies = state.lobbies.list_public_waiting().await;
    let lobbies: Vec<LobbySummaryDto> = lobbies.iter().map(LobbySummaryDto::from).collect();
    state
        .sessions
        .send(&handle.id, ServerMessage::LobbiesList { lobbies })
        .await;
}

async fn handle_get_player_stats(state: &Arc<AppState>, handle: &SessionHandle) {
    let Some((name, games_played, games_won)) = state.sessions.player_stats(&handle.id).await
    else {
        return;
    };
    let server = state.sessions.server_stats(&state.lobbies).await;
    state
        .sessions
        .send(&handle.id, ServerMessage::PlayerStats {
            stats: PlayerStatsDto {
                player_id: handle.id.clone(),
                name,
                games_played,
                games_won,
            },
            server: ServerStatsDto::from(server),
        })
        .await;
}

async fn handle_update_settings(
    state: &Arc<AppState>,
    handle: &SessionHandle,
    patch: GameSettingsPatch,
) {
    let Some(lobby_id) = require_lobby(state, handle).await else {
        return;
    };
    state
        .lobbies
        .send_command(&lobby_id, LobbyCommand::UpdateSettings {
            session_id: handle.id.clone(),
            patch,
        })
        .await;
}
