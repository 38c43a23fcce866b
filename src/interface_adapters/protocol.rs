// Wire protocol DTOs — §6. Inbound frames are `{type, data?}`; outbound
// frames flatten their fields alongside `type` rather than nesting under a
// `data` key, so the two directions use different serde tagging schemes.

use serde::{Deserialize, Serialize};

use crate::domain::items::{FoodItem, FoodType, WeaponPickup};
use crate::domain::player::PlayerState;
use crate::domain::position::{Direction, Position};
use crate::domain::settings::{GameSettings, GameSettingsPatch, WinCondition};
use crate::domain::weapons::WeaponType;
use crate::use_cases::types::{GameState, LobbySummary, PlayerInput, ServerStats};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectPlayer {
        #[serde(default)]
        name: Option<String>,
    },
    UpdatePlayerName {
        name: String,
    },
    CreateLobby {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        max_players: Option<u8>,
        #[serde(default)]
        is_private: Option<bool>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        game_settings: Option<GameSettingsPatchDto>,
    },
    JoinLobby {
        lobby_id: String,
        #[serde(default)]
        password: Option<String>,
    },
    LeaveLobby,
    SetReady {
        ready: bool,
    },
    PlayerInput(PlayerInputDto),
    ChatMessage {
        message: String,
    },
    GetLobbies,
    GetPlayerStats,
    UpdateLobbySettings {
        settings: GameSettingsPatchDto,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerInputDto {
    Direction { direction: Direction },
    UseWeapon,
}

impl From<PlayerInputDto> for PlayerInput {
    fn from(dto: PlayerInputDto) -> Self {
        match dto {
            PlayerInputDto::Direction { direction } => PlayerInput::Direction(direction),
            PlayerInputDto::UseWeapon => PlayerInput::UseWeapon,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameSettingsPatchDto {
    #[serde(default)]
    pub board_size: Option<u32>,
    #[serde(default)]
    pub game_speed: Option<u32>,
    #[serde(default)]
    pub weapons_enabled: Option<bool>,
    #[serde(default)]
    pub max_game_time: Option<u64>,
    #[serde(default)]
    pub win_condition: Option<WinConditionDto>,
}

impl From<GameSettingsPatchDto> for GameSettingsPatch {
    fn from(dto: GameSettingsPatchDto) -> Self {
        Self {
            board_size: dto.board_size,
            game_speed_ms: dto.game_speed,
            weapons_enabled: dto.weapons_enabled,
            max_game_time_ms: dto.max_game_time,
            win_condition: dto.win_condition.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinConditionDto {
    LastStanding,
    TimeLimit,
}

impl From<WinConditionDto> for WinCondition {
    fn from(dto: WinConditionDto) -> Self {
        match dto {
            WinConditionDto::LastStanding => WinCondition::LastStanding,
            WinConditionDto::TimeLimit => WinCondition::TimeLimit,
        }
    }
}

impl From<WinCondition> for WinConditionDto {
    fn from(wc: WinCondition) -> Self {
        match wc {
            WinCondition::LastStanding => WinConditionDto::LastStanding,
            WinCondition::TimeLimit => WinConditionDto::TimeLimit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        player_id: String,
        color: &'static str,
    },
    ConnectionConfirmed {
        player_id: String,
        name: String,
        color: &'static str,
    },
    PlayerInfo {
        player: PlayerPublicDto,
    },
    LobbiesList {
        lobbies: Vec<LobbySummaryDto>,
    },
    LobbyCreated {
        lobby: LobbyStateDto,
    },
    LobbyJoined {
        lobby: LobbyStateDto,
    },
    LobbyLeft {
        lobby_id: String,
    },
    LobbyReset {
        lobby_id: String,
    },
    LobbySettingsUpdated {
        settings: GameSettingsDto,
    },
    PlayerJoined {
        player: PlayerPublicDto,
    },
    PlayerLeft {
        player_id: String,
    },
    PlayerReadyChanged {
        player_id: String,
        ready: bool,
        ready_count: usize,
        total_count: usize,
    },
    PlayerNameChanged {
        player_id: String,
        name: String,
    },
    GameStarting {
        countdown: u32,
    },
    Countdown {
        count: u32,
    },
    GameStarted {},
    GameUpdate {
        game_state: GameUpdateDto,
    },
    GameEnded {
        winner: Option<PlayerPublicDto>,
        rankings: Vec<RankingEntryDto>,
        game_stats: GameStatsDto,
    },
    Killed {
        killer: Option<String>,
    },
    KillAwarded {
        victim: String,
        score: u32,
    },
    WeaponAcquired {
        weapon: WeaponType,
    },
    ChatMessage {
        player_id: String,
        name: String,
        message: String,
    },
    NameUpdated {
        name: String,
    },
    PlayerStats {
        stats: PlayerStatsDto,
        server: ServerStatsDto,
    },
    ServerShutdown {
        reason: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionDto {
    pub x: i32,
    pub y: i32,
}

impl From<Position> for PositionDto {
    fn from(p: Position) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPublicDto {
    pub id: String,
    pub name: String,
    pub color: &'static str,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub is_alive: bool,
    pub is_ready: bool,
}

impl From<&PlayerState> for PlayerPublicDto {
    fn from(p: &PlayerState) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            color: p.color,
            score: p.score,
            kills: p.kills,
            deaths: p.deaths,
            is_alive: p.is_alive,
            is_ready: p.is_ready,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshotDto {
    #[serde(flatten)]
    pub public: PlayerPublicDto,
    pub snake: Vec<PositionDto>,
    pub direction: Direction,
}

impl From<&PlayerState> for PlayerSnapshotDto {
    fn from(p: &PlayerState) -> Self {
        Self {
            public: p.into(),
            snake: p.snake.iter().copied().map(Into::into).collect(),
            direction: p.direction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodDto {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub food_type: &'static str,
    pub value: u32,
}

impl From<&FoodItem> for FoodDto {
    fn from(f: &FoodItem) -> Self {
        Self {
            id: f.id,
            x: f.pos.x,
            y: f.pos.y,
            food_type: match f.food_type {
                FoodType::Normal => "normal",
            },
            value: f.value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponDto {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
}

impl From<&WeaponPickup> for WeaponDto {
    fn from(w: &WeaponPickup) -> Self {
        Self {
            id: w.id,
            x: w.pos.x,
            y: w.pos.y,
            weapon_type: w.weapon_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameUpdateDto {
    pub players: Vec<PlayerSnapshotDto>,
    pub food: Vec<FoodDto>,
    pub weapons: Vec<WeaponDto>,
    pub game_time: u64,
    pub board_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSettingsDto {
    pub board_size: u32,
    pub game_speed: u32,
    pub weapons_enabled: bool,
    pub max_game_time: u64,
    pub win_condition: WinConditionDto,
}

impl From<&GameSettings> for GameSettingsDto {
    fn from(s: &GameSettings) -> Self {
        Self {
            board_size: s.board_size,
            game_speed: s.game_speed_ms,
            weapons_enabled: s.weapons_enabled,
            max_game_time: s.max_game_time_ms,
            win_condition: s.win_condition.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbySummaryDto {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: u8,
    pub is_private: bool,
    pub game_state: GameStateDto,
}

impl From<&LobbySummary> for LobbySummaryDto {
    fn from(s: &LobbySummary) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            player_count: s.player_count,
            max_players: s.max_players,
            is_private: s.is_private,
            game_state: s.game_state.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStateDto {
    Waiting,
    Starting,
    Playing,
    Finished,
}

impl From<GameState> for GameStateDto {
    fn from(s: GameState) -> Self {
        match s {
            GameState::Waiting => GameStateDto::Waiting,
            GameState::Starting => GameStateDto::Starting,
            GameState::Playing => GameStateDto::Playing,
            GameState::Finished => GameStateDto::Finished,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyStateDto {
    pub id: String,
    pub name: String,
    pub max_players: u8,
    pub is_private: bool,
    pub game_state: GameStateDto,
    pub settings: GameSettingsDto,
    pub players: Vec<PlayerPublicDto>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingEntryDto {
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub is_alive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStatsDto {
    pub duration_ms: u64,
    pub total_players: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatsDto {
    pub player_id: String,
    pub name: String,
    pub games_played: u32,
    pub games_won: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServerStatsDto {
    pub total_players: usize,
    pub total_lobbies: usize,
    pub active_games: usize,
    pub uptime: u64,
    pub memory_usage: u64,
}

impl From<ServerStats> for ServerStatsDto {
    fn from(s: ServerStats) -> Self {
        Self {
            total_players: s.total_players,
            total_lobbies: s.total_lobbies,
            active_games: s.active_games,
            uptime: s.uptime_secs,
            memory_usage: s.memory_usage_bytes,
        }
    }
}
