// Lobby-scoped gameplay state for a single player (§3: Player/Session data model).
//
// Session-level identity (name, color, activity clock, cumulative stats) lives in
// `use_cases::session::SessionManager`; this struct only holds what resets per game.

use std::collections::VecDeque;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use crate::domain::position::{Direction, Position};
use crate::domain::weapons::WeaponType;

#[derive(Debug, Clone, Copy, Default)]
pub struct EffectFlags {
    pub speed_multiplier: f32,
    pub is_invincible: bool,
    pub can_phase_through: bool,
    pub score_multiplier: u32,
}

impl EffectFlags {
    pub fn resting() -> Self {
        Self {
            speed_multiplier: 1.0,
            is_invincible: false,
            can_phase_through: false,
            score_multiplier: 1,
        }
    }
}

pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub color: &'static str,

    pub snake: VecDeque<Position>,
    pub direction: Direction,
    pub is_alive: bool,
    pub is_ready: bool,

    pub score: u32,
    pub kills: u32,
    pub deaths: u32,

    pub weapon: Option<WeaponType>,
    pub effects: EffectFlags,
    /// Expiry instants for timed effects, checked once per tick.
    pub effect_expirations: Vec<(EffectKind, std::time::Instant)>,
    /// Sub-tick accumulator driving extra head advances under speed_boost.
    pub move_progress: f32,

    /// Shared with the owning session so cumulative totals survive lobby resets.
    pub games_played: Arc<AtomicU32>,
    pub games_won: Arc<AtomicU32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    SpeedBoost,
    Shield,
    Ghost,
    DoubleScore,
}

impl PlayerState {
    pub fn new(
        id: String,
        name: String,
        color: &'static str,
        games_played: Arc<AtomicU32>,
        games_won: Arc<AtomicU32>,
    ) -> Self {
        Self {
            id,
            name,
            color,
            snake: VecDeque::new(),
            direction: Direction::Right,
            is_alive: false,
            is_ready: false,
            score: 0,
            kills: 0,
            deaths: 0,
            weapon: None,
            effects: EffectFlags::resting(),
            effect_expirations: Vec::new(),
            move_progress: 0.0,
            games_played,
            games_won,
        }
    }

    /// Applied on `startGame`: places the snake and clears per-game counters.
    pub fn reset_for_game(&mut self, head: Position, direction: Direction) {
        self.snake.clear();
        let (dx, dy) = direction.delta();
        // Body trails behind the head so the first two segments sit inside the
        // same safe spawn box as the head (§4.2 countdown).
        self.snake.push_back(head);
        self.snake
            .push_back(Position::new(head.x - dx, head.y - dy));
        self.snake
            .push_back(Position::new(head.x - 2 * dx, head.y - 2 * dy));
        self.direction = direction;
        self.is_alive = true;
        self.is_ready = false;
        self.score = 0;
        self.kills = 0;
        self.deaths = 0;
        self.weapon = None;
        self.effects = EffectFlags::resting();
        self.effect_expirations.clear();
        self.move_progress = 0.0;
    }

    /// Applied on `resetLobby`: returns to a pre-game waiting state.
    pub fn reset_for_lobby(&mut self) {
        self.snake.clear();
        self.direction = Direction::Right;
        self.is_alive = true;
        self.is_ready = false;
        self.score = 0;
        self.kills = 0;
        self.deaths = 0;
        self.weapon = None;
        self.effects = EffectFlags::resting();
        self.effect_expirations.clear();
        self.move_progress = 0.0;
    }

    /// Rejects 180-degree reversals; applied immediately on receipt (§4.3).
    pub fn try_set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction.is_opposite(self.direction) {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn head(&self) -> Option<Position> {
        self.snake.front().copied()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.snake.iter().any(|seg| *seg == pos)
    }
}
