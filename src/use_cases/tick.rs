// Lobby actor: fuses the Lobby Controller (§4.2) and Tick Engine (§4.3) into
// one task, since the tick loop only ever touches lobby-local state. All
// mutation of this lobby's players/items/settings happens here and nowhere
// else, giving the single-writer-per-lobby guarantee from §5. Mirrors the
// shape of the teacher's `use_cases::game::world_task`: one `tokio::select!`
// loop pulling commands off an `mpsc::Receiver` alongside a tick interval.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::domain::items::{FoodItem, WeaponPickup};
use crate::domain::player::PlayerState;
use crate::domain::position::Position;
use crate::domain::settings::GameSettings;
use crate::domain::systems::collision::TickEvents;
use crate::domain::systems::{effects, spawn, win_condition};
use crate::domain::tuning::{
    AUTO_START_DELAY_SECS, COUNTDOWN_SECONDS, FOOD_SPAWN_CHANCE, POST_GAME_RESET_DELAY_SECS,
    SPAWN_SAFE_MARGIN, STARTING_FOOD_COUNT, STARTING_WEAPON_COUNT, WEAPON_SPAWN_CHANCE,
};
use crate::domain::weapons::{WeaponCatalog, WeaponType};
use crate::interface_adapters::protocol::{
    FoodDto, GameSettingsDto, GameStatsDto, GameUpdateDto, LobbyStateDto, PlayerPublicDto,
    PlayerSnapshotDto, RankingEntryDto, ServerMessage, WeaponDto,
};
use crate::use_cases::lobby::CreateLobbyParams;
use crate::use_cases::types::{CommandError, GameState, LobbyCommand, LobbySummary, PlayerInput};

struct Member {
    outbound: UnboundedSender<ServerMessage>,
}

struct LobbyActor {
    id: String,
    name: String,
    max_players: u8,
    is_private: bool,
    password: Option<String>,
    created_by: String,

    settings: GameSettings,
    game_state: GameState,

    players: IndexMap<String, PlayerState>,
    members: IndexMap<String, Member>,

    food: Vec<FoodItem>,
    weapons: Vec<WeaponPickup>,
    next_item_id: u64,

    game_start_time: Option<Instant>,
    rng: StdRng,

    command_tx: mpsc::Sender<LobbyCommand>,
    summary_tx: watch::Sender<LobbySummary>,
    tick_interval: Option<tokio::time::Interval>,
}

pub async fn lobby_task(
    id: String,
    params: CreateLobbyParams,
    command_tx: mpsc::Sender<LobbyCommand>,
    mut command_rx: mpsc::Receiver<LobbyCommand>,
    summary_tx: watch::Sender<LobbySummary>,
) {
    let mut players = IndexMap::new();
    let mut members = IndexMap::new();

    let mut creator = PlayerState::new(
        params.creator_id.clone(),
        params.creator_name.clone(),
        params.creator_color,
        params.creator_games_played,
        params.creator_games_won,
    );
    creator.reset_for_lobby();
    players.insert(params.creator_id.clone(), creator);
    members.insert(
        params.creator_id.clone(),
        Member {
            outbound: params.creator_outbound,
        },
    );

    let mut actor = LobbyActor {
        id,
        name: params.name,
        max_players: params.max_players,
        is_private: params.is_private,
        password: params.password,
        created_by: params.creator_id,
        settings: params.settings,
        game_state: GameState::Waiting,
        players,
        members,
        food: Vec::new(),
        weapons: Vec::new(),
        next_item_id: 1,
        game_start_time: None,
        rng: StdRng::from_entropy(),
        command_tx,
        summary_tx,
        tick_interval: None,
    };

    actor.publish_summary();
    info!(lobby_id = %actor.id, "lobby actor started");

    loop {
        let disconnect = tokio::select! {
            cmd = command_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        if matches!(cmd, LobbyCommand::Shutdown) {
                            true
                        } else {
                            actor.handle_command(cmd).await;
                            false
                        }
                    }
                    None => true,
                }
            }
            _ = tick_wait(&mut actor.tick_interval) => {
                actor.run_tick();
                false
            }
        };

        if disconnect {
            break;
        }
    }

    info!(lobby_id = %actor.id, "lobby actor stopped");
}

async fn tick_wait(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

impl LobbyActor {
    fn publish_summary(&self) {
        let _ = self.summary_tx.send(LobbySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            max_players: self.max_players,
            is_private: self.is_private,
            game_state: self.game_state,
        });
    }

    fn send_to(&self, session_id: &str, message: ServerMessage) {
        if let Some(member) = self.members.get(session_id) {
            let _ = member.outbound.send(message);
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for member in self.members.values() {
            let _ = member.outbound.send(message.clone());
        }
    }

    fn broadcast_except(&self, except: &str, message: ServerMessage) {
        for (id, member) in &self.members {
            if id != except {
                let _ = member.outbound.send(message.clone());
            }
        }
    }

    fn lobby_state_dto(&self) -> LobbyStateDto {
        LobbyStateDto {
            id: self.id.clone(),
            name: self.name.clone(),
            max_players: self.max_players,
            is_private: self.is_private,
            game_state: self.game_state.into(),
            settings: GameSettingsDto::from(&self.settings),
            players: self.players.values().map(PlayerPublicDto::from).collect(),
            created_by: self.created_by.clone(),
        }
    }

    async fn handle_command(&mut self, cmd: LobbyCommand) {
        match cmd {
            LobbyCommand::Join {
                session_id,
                name,
                color,
                password,
                games_played,
                games_won,
                outbound,
                reply,
            } => {
                let result = self.handle_join(session_id, name, color, password, games_played, games_won, outbound);
                let _ = reply.send(result);
            }
            LobbyCommand::Leave { session_id } => self.handle_leave(&session_id),
            LobbyCommand::SetReady { session_id, ready } => self.handle_set_ready(&session_id, ready),
            LobbyCommand::Input { session_id, input } => self.handle_input(&session_id, input),
            LobbyCommand::Chat { session_id, name, message } => {
                self.broadcast(ServerMessage::ChatMessage {
                    player_id: session_id,
                    name,
                    message,
                });
            }
            LobbyCommand::UpdateSettings { session_id, patch } => {
                if session_id != self.created_by {
                    self.send_to(&session_id, ServerMessage::Error {
                        message: CommandError::NotLobbyCreator.message(),
                    });
                } else if self.game_state != GameState::Waiting {
                    self.send_to(&session_id, ServerMessage::Error {
                        message: CommandError::WrongState.message(),
                    });
                } else {
                    self.settings.apply_patch(&patch);
                    self.broadcast(ServerMessage::LobbySettingsUpdated {
                        settings: GameSettingsDto::from(&self.settings),
                    });
                }
            }
            LobbyCommand::NameChanged { session_id, name } => {
                if let Some(p) = self.players.get_mut(&session_id) {
                    p.name = name.clone();
                }
                self.broadcast(ServerMessage::PlayerNameChanged {
                    player_id: session_id,
                    name,
                });
            }
            LobbyCommand::AutoStartCheck => self.handle_auto_start_check(),
            LobbyCommand::CountdownTick { remaining } => self.handle_countdown_tick(remaining),
            LobbyCommand::BeginPlaying => self.begin_playing(),
            LobbyCommand::PostGameReset => self.handle_post_game_reset(),
            LobbyCommand::Shutdown => {}
        }
        self.publish_summary();
    }

    fn handle_join(
        &mut self,
        session_id: String,
        name: String,
        color: &'static str,
        password: Option<String>,
        games_played: Arc<AtomicU32>,
        games_won: Arc<AtomicU32>,
        outbound: UnboundedSender<ServerMessage>,
    ) -> Result<(), CommandError> {
        if self.players.len() >= self.max_players as usize {
            let _ = outbound.send(ServerMessage::Error {
                message: CommandError::LobbyFull.message(),
            });
            return Err(CommandError::LobbyFull);
        }
        if self.game_state == GameState::Playing {
            let _ = outbound.send(ServerMessage::Error {
                message: CommandError::WrongState.message(),
            });
            return Err(CommandError::WrongState);
        }
        if let Some(expected) = &self.password {
            if password.as_deref() != Some(expected.as_str()) {
                let _ = outbound.send(ServerMessage::Error {
                    message: CommandError::WrongPassword.message(),
                });
                return Err(CommandError::WrongPassword);
            }
        }

        let mut player = PlayerState::new(session_id.clone(), name, color, games_played, games_won);
        player.reset_for_lobby();
        let public = PlayerPublicDto::from(&player);
        self.players.insert(session_id.clone(), player);
        self.members.insert(
            session_id.clone(),
            Member {
                outbound: outbound.clone(),
            },
        );

        let _ = outbound.send(ServerMessage::LobbyJoined {
            lobby: self.lobby_state_dto(),
        });
        self.broadcast_except(&session_id, ServerMessage::PlayerJoined { player: public });
        Ok(())
    }

    fn handle_leave(&mut self, session_id: &str) {
        let Some(_) = self.players.shift_remove(session_id) else {
            return;
        };
        self.members.shift_remove(session_id);

        if session_id == self.created_by {
            if let Some((next_id, _)) = self.players.iter().next() {
                self.created_by = next_id.clone();
            }
        }

        self.broadcast(ServerMessage::PlayerLeft {
            player_id: session_id.to_string(),
        });

        if self.game_state == GameState::Playing {
            let alive = self.players.values().filter(|p| p.is_alive).count();
            if alive <= 1 {
                self.end_game();
            }
        }
    }

    fn handle_set_ready(&mut self, session_id: &str, ready: bool) {
        let Some(player) = self.players.get_mut(session_id) else {
            return;
        };
        player.is_ready = ready;

        let ready_count = self.players.values().filter(|p| p.is_ready).count();
        let total_count = self.players.len();
        self.broadcast(ServerMessage::PlayerReadyChanged {
            player_id: session_id.to_string(),
            ready,
            ready_count,
            total_count,
        });

        if self.can_start_game() {
            let tx = self.command_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(AUTO_START_DELAY_SECS)).await;
                let _ = tx.send(LobbyCommand::AutoStartCheck).await;
            });
        }
    }

    fn can_start_game(&self) -> bool {
        self.game_state == GameState::Waiting
            && self.players.len() >= 2
            && self.players.values().all(|p| p.is_ready)
    }

    fn handle_auto_start_check(&mut self) {
        // Re-validates preconditions: a player may have un-readied during the
        // delay, in which case the start attempt is silently dropped (§5).
        if self.can_start_game() {
            self.begin_countdown();
        }
    }

    fn handle_input(&mut self, session_id: &str, input: PlayerInput) {
        if self.game_state != GameState::Playing {
            return;
        }
        let Some(player) = self.players.get_mut(session_id) else {
            return;
        };
        if !player.is_alive {
            return;
        }

        match input {
            PlayerInput::Direction(direction) => {
                player.try_set_direction(direction);
            }
            PlayerInput::UseWeapon => {
                let Some(weapon_type) = player.weapon else {
                    return;
                };
                let spawned = effects::apply_weapon_effect(
                    player,
                    weapon_type,
                    Instant::now(),
                    &mut self.food,
                    &mut self.next_item_id,
                );
                if weapon_type == WeaponType::Teleport {
                    if let Some(target) = effects::find_teleport_target(
                        &mut self.rng,
                        self.settings.board_size,
                        &self.players,
                        &self.food,
                        &self.weapons,
                    ) {
                        if let Some(p) = self.players.get_mut(session_id) {
                            if let Some(front) = p.snake.front_mut() {
                                *front = target;
                            }
                        }
                    }
                }
                if !spawned.is_empty() {
                    debug!(lobby_id = %self.id, count = spawned.len(), "food_bomb scattered food");
                }
            }
        }
    }

    fn begin_countdown(&mut self) {
        self.game_state = GameState::Starting;
        self.game_start_time = Some(Instant::now());

        let board = self.settings.board_size;
        let ids: Vec<String> = self.players.keys().cloned().collect();
        for id in ids {
            let head = self.safe_spawn_cell(board);
            if let Some(p) = self.players.get_mut(&id) {
                p.reset_for_game(head, crate::domain::position::Direction::Right);
            }
        }

        self.food.clear();
        self.weapons.clear();
        for _ in 0..STARTING_FOOD_COUNT {
            spawn::spawn_food(
                &mut self.rng,
                board,
                &self.players,
                &mut self.food,
                &self.weapons,
                &mut self.next_item_id,
            );
        }
        if self.settings.weapons_enabled {
            for _ in 0..STARTING_WEAPON_COUNT {
                let weapon_type = WeaponCatalog::random(&mut self.rng).weapon_type;
                spawn::spawn_weapon(
                    &mut self.rng,
                    board,
                    &self.players,
                    &self.food,
                    &mut self.weapons,
                    weapon_type,
                    &mut self.next_item_id,
                );
            }
        }

        self.broadcast(ServerMessage::GameStarting {
            countdown: COUNTDOWN_SECONDS,
        });

        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = tx.send(LobbyCommand::CountdownTick { remaining: 2 }).await;
        });
    }

    /// Picks a start cell such that head and the two trailing body segments
    /// stay within `[margin, boardSize-1-margin]` on each axis (§4.2).
    fn safe_spawn_cell(&mut self, board_size: u32) -> Position {
        let lo = SPAWN_SAFE_MARGIN;
        let hi = board_size as i32 - 1 - SPAWN_SAFE_MARGIN;
        if lo > hi {
            return Position::new(board_size as i32 / 2, board_size as i32 / 2);
        }
        for _ in 0..100 {
            let candidate = Position::new(self.rng.gen_range(lo..=hi), self.rng.gen_range(lo..=hi));
            if !self.players.values().any(|p| p.occupies(candidate)) {
                return candidate;
            }
        }
        Position::new((lo + hi) / 2, (lo + hi) / 2)
    }

    fn handle_countdown_tick(&mut self, remaining: u32) {
        self.broadcast(ServerMessage::Countdown { count: remaining });
        let tx = self.command_tx.clone();
        if remaining > 1 {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let _ = tx
                    .send(LobbyCommand::CountdownTick {
                        remaining: remaining - 1,
                    })
                    .await;
            });
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let _ = tx.send(LobbyCommand::BeginPlaying).await;
            });
        }
    }

    fn begin_playing(&mut self) {
        if self.game_state != GameState::Starting {
            return;
        }
        self.game_state = GameState::Playing;
        self.tick_interval = Some(tokio::time::interval(Duration::from_millis(
            self.settings.game_speed_ms as u64,
        )));
        self.broadcast(ServerMessage::GameStarted {});
    }

    fn run_tick(&mut self) {
        if self.game_state != GameState::Playing {
            return;
        }

        let mut substep_counts: HashMap<String, u32> = HashMap::new();
        for (id, p) in &mut self.players {
            if !p.is_alive {
                continue;
            }
            p.move_progress += p.effects.speed_multiplier;
            let mut count = 0;
            while p.move_progress >= 1.0 {
                p.move_progress -= 1.0;
                count += 1;
            }
            if count > 0 {
                substep_counts.insert(id.clone(), count);
            }
        }
        let max_substeps = substep_counts.values().copied().max().unwrap_or(0);

        for substep in 0..max_substeps {
            let moving: Vec<String> = substep_counts
                .iter()
                .filter(|(_, &count)| count > substep)
                .map(|(id, _)| id.clone())
                .collect();
            if moving.is_empty() {
                continue;
            }
            let events = crate::domain::systems::run_movement_pass(
                &mut self.players,
                &mut self.food,
                &mut self.weapons,
                self.settings.board_size,
                &moving,
            );
            self.dispatch_tick_events(&events);
        }

        let now = Instant::now();
        for p in self.players.values_mut() {
            effects::expire_effects(p, now);
        }

        if self.rng.gen_bool(FOOD_SPAWN_CHANCE) {
            if !spawn::spawn_food(
                &mut self.rng,
                self.settings.board_size,
                &self.players,
                &mut self.food,
                &self.weapons,
                &mut self.next_item_id,
            ) {
                debug!(lobby_id = %self.id, "food spawn skipped: no free cell");
            }
        }
        if self.settings.weapons_enabled && self.rng.gen_bool(WEAPON_SPAWN_CHANCE) {
            let weapon_type = WeaponCatalog::random(&mut self.rng).weapon_type;
            if !spawn::spawn_weapon(
                &mut self.rng,
                self.settings.board_size,
                &self.players,
                &self.food,
                &mut self.weapons,
                weapon_type,
                &mut self.next_item_id,
            ) {
                debug!(lobby_id = %self.id, "weapon spawn skipped: no free cell");
            }
        }

        let elapsed = self
            .game_start_time
            .map(|t| t.elapsed())
            .unwrap_or_default();
        if win_condition::evaluate_win_condition(&self.players, &self.settings, elapsed) {
            self.end_game();
            return;
        }

        self.broadcast_game_update(elapsed);
    }

    fn dispatch_tick_events(&self, events: &TickEvents) {
        for kill in &events.kills {
            self.send_to(&kill.victim, ServerMessage::Killed {
                killer: kill.killer.clone(),
            });
            if let Some(killer) = &kill.killer {
                self.send_to(killer, ServerMessage::KillAwarded {
                    victim: kill.victim.clone(),
                    score: crate::domain::tuning::KILL_SCORE_BONUS,
                });
            }
        }
        for weapon_event in &events.weapons {
            self.send_to(&weapon_event.player, ServerMessage::WeaponAcquired {
                weapon: weapon_event.weapon,
            });
        }
    }

    fn broadcast_game_update(&self, elapsed: Duration) {
        let players: Vec<PlayerSnapshotDto> = self.players.values().map(PlayerSnapshotDto::from).collect();
        let food: Vec<FoodDto> = self.food.iter().map(FoodDto::from).collect();
        let weapons: Vec<WeaponDto> = self.weapons.iter().map(WeaponDto::from).collect();
        self.broadcast(ServerMessage::GameUpdate {
            game_state: GameUpdateDto {
                players,
                food,
                weapons,
                game_time: elapsed.as_millis() as u64,
                board_size: self.settings.board_size,
            },
        });
    }

    fn end_game(&mut self) {
        self.tick_interval = None;
        self.game_state = GameState::Finished;

        let alive: Vec<&String> = self
            .players
            .iter()
            .filter(|(_, p)| p.is_alive)
            .map(|(id, _)| id)
            .collect();
        let winner_id = if alive.len() == 1 {
            Some(alive[0].clone())
        } else {
            None
        };

        for (id, p) in &self.players {
            p.games_played.fetch_add(1, Ordering::Relaxed);
            if Some(id) == winner_id.as_ref() {
                p.games_won.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut ranked: Vec<&PlayerState> = self.players.values().collect();
        ranked.sort_by(|a, b| {
            b.is_alive
                .cmp(&a.is_alive)
                .then(b.score.cmp(&a.score))
                .then(b.kills.cmp(&a.kills))
        });
        let rankings: Vec<RankingEntryDto> = ranked
            .iter()
            .enumerate()
            .map(|(i, p)| RankingEntryDto {
                rank: i + 1,
                player_id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                kills: p.kills,
                deaths: p.deaths,
                is_alive: p.is_alive,
            })
            .collect();

        let winner = winner_id
            .as_ref()
            .and_then(|id| self.players.get(id))
            .map(PlayerPublicDto::from);

        let duration_ms = self
            .game_start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.broadcast(ServerMessage::GameEnded {
            winner,
            rankings,
            game_stats: GameStatsDto {
                duration_ms,
                total_players: self.players.len(),
            },
        });

        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(POST_GAME_RESET_DELAY_SECS)).await;
            let _ = tx.send(LobbyCommand::PostGameReset).await;
        });
    }

    fn handle_post_game_reset(&mut self) {
        if self.game_state != GameState::Finished {
            return;
        }
        self.food.clear();
        self.weapons.clear();
        self.game_start_time = None;
        for p in self.players.values_mut() {
            p.reset_for_lobby();
        }
        self.game_state = GameState::Waiting;
        self.broadcast(ServerMessage::LobbyReset {
            lobby_id: self.id.clone(),
        });
    }
}
