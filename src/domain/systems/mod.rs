// Tick Engine systems: movement/collision, item spawning, win-condition checks,
// and weapon effect expiry. Pure functions over domain types — no I/O.

pub mod collision;
pub mod effects;
pub mod spawn;
pub mod win_condition;

pub use collision::{run_movement_pass, TickEvents};
pub use spawn::{spawn_food, spawn_weapon};
pub use win_condition::evaluate_win_condition;
