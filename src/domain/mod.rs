// Domain layer: core simulation types and rules. No I/O, no async.

pub mod items;
pub mod player;
pub mod position;
pub mod settings;
pub mod systems;
pub mod tuning;
pub mod weapons;

pub use items::{FoodItem, WeaponPickup};
pub use player::{EffectFlags, PlayerState};
pub use position::{Direction, Position};
pub use settings::GameSettings;
pub use weapons::{Rarity, WeaponCatalog, WeaponEntry, WeaponType};
