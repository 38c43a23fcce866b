// Gameplay tuning constants (distinct from process/runtime configuration, see
// `frameworks::config`). Mirrors the split the teacher keeps between
// `domain::tuning` and `frameworks::config`.

/// Kill credit awarded to the owner of a segment another snake ran into.
pub const KILL_SCORE_BONUS: u32 = 50;

/// Per-tick probability of spawning one food item.
pub const FOOD_SPAWN_CHANCE: f64 = 0.10;

/// Per-tick probability of spawning one weapon item (when weapons are enabled).
pub const WEAPON_SPAWN_CHANCE: f64 = 0.05;

/// Spawn placement gives up after this many rejected attempts (§4.3 step 4).
pub const MAX_SPAWN_ATTEMPTS: u32 = 100;

/// Number of food items scattered on countdown.
pub const STARTING_FOOD_COUNT: usize = 5;

/// Number of weapon pickups scattered on countdown (when enabled).
pub const STARTING_WEAPON_COUNT: usize = 3;

/// Food scattered by the `food_bomb` weapon.
pub const FOOD_BOMB_COUNT: usize = 5;

/// Radius (in grid cells) of the `food_bomb` scatter circle.
pub const FOOD_BOMB_RADIUS: f64 = 2.0;

/// Seconds of countdown between `game_starting` and `playing`.
pub const COUNTDOWN_SECONDS: u32 = 3;

/// Delay after all players ready up before the countdown begins.
pub const AUTO_START_DELAY_SECS: u64 = 2;

/// Delay after `game_ended` before the lobby resets to `waiting`.
pub const POST_GAME_RESET_DELAY_SECS: u64 = 10;

/// Safe spawn box margin: head and first two body segments land within
/// `[margin, boardSize - 1 - margin]` on each axis.
pub const SPAWN_SAFE_MARGIN: i32 = 3;
