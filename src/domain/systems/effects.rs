// Weapon effect activation/expiry — §4.4. Timed effects are tracked as an
// expiry `Instant` checked once per tick rather than spawned cancellable
// timers: the tick loop already provides that periodic check point, and a
// dead lobby simply stops ticking, so "survive death / cancel on game end"
// falls out for free (see DESIGN.md).

use indexmap::IndexMap;
use rand::Rng;
use std::f64::consts::TAU;
use std::time::Instant;

use crate::domain::items::FoodItem;
use crate::domain::player::{EffectKind, PlayerState};
use crate::domain::position::Position;
use crate::domain::tuning::{FOOD_BOMB_COUNT, FOOD_BOMB_RADIUS};
use crate::domain::weapons::{WeaponCatalog, WeaponType};

/// Applies the held weapon's effect and clears it. Returns the positions of
/// any food spawned by `food_bomb`, for the caller to broadcast/log.
pub fn apply_weapon_effect(
    player: &mut PlayerState,
    weapon_type: WeaponType,
    now: Instant,
    food: &mut Vec<FoodItem>,
    next_item_id: &mut u64,
) -> Vec<Position> {
    let entry = WeaponCatalog::entry(weapon_type);
    let mut spawned_food = Vec::new();

    match weapon_type {
        WeaponType::SpeedBoost => {
            player.effects.speed_multiplier = 1.5;
            schedule_expiry(player, EffectKind::SpeedBoost, now + entry.duration);
        }
        WeaponType::Shield => {
            player.effects.is_invincible = true;
            schedule_expiry(player, EffectKind::Shield, now + entry.duration);
        }
        WeaponType::Ghost => {
            player.effects.can_phase_through = true;
            schedule_expiry(player, EffectKind::Ghost, now + entry.duration);
        }
        WeaponType::DoubleScore => {
            player.effects.score_multiplier = 2;
            schedule_expiry(player, EffectKind::DoubleScore, now + entry.duration);
        }
        WeaponType::FoodBomb => {
            if let Some(head) = player.head() {
                for i in 0..FOOD_BOMB_COUNT {
                    let angle = TAU * (i as f64) / (FOOD_BOMB_COUNT as f64);
                    let dx = (FOOD_BOMB_RADIUS * angle.cos()).round() as i32;
                    let dy = (FOOD_BOMB_RADIUS * angle.sin()).round() as i32;
                    let pos = Position::new(head.x + dx, head.y + dy);
                    let id = *next_item_id;
                    *next_item_id += 1;
                    food.push(FoodItem::normal(id, pos));
                    spawned_food.push(pos);
                }
            }
        }
        WeaponType::Teleport => {
            // Actual target-cell selection needs board/occupancy context and is
            // resolved by the caller (use_cases::weapons::teleport_player);
            // activation here only consumes the weapon.
        }
        WeaponType::Laser | WeaponType::Shrink | WeaponType::Freeze | WeaponType::Magnet => {
            // Reserved: catalog entry exists and activation consumes the
            // weapon, but no gameplay effect is implemented (§4.4).
        }
    }

    player.weapon = None;
    spawned_food
}

fn schedule_expiry(player: &mut PlayerState, kind: EffectKind, at: Instant) {
    player.effect_expirations.retain(|(k, _)| *k != kind);
    player.effect_expirations.push((kind, at));
}

/// Reverts any effect whose expiry has passed. Called once per tick.
pub fn expire_effects(player: &mut PlayerState, now: Instant) {
    let (expired, remaining): (Vec<_>, Vec<_>) = player
        .effect_expirations
        .drain(..)
        .partition(|(_, at)| *at <= now);
    player.effect_expirations = remaining;

    for (kind, _) in expired {
        match kind {
            EffectKind::SpeedBoost => player.effects.speed_multiplier = 1.0,
            EffectKind::Shield => player.effects.is_invincible = false,
            EffectKind::Ghost => player.effects.can_phase_through = false,
            EffectKind::DoubleScore => player.effects.score_multiplier = 1,
        }
    }
}

/// Finds a cell free of any snake or item, for the `teleport` weapon.
pub fn find_teleport_target(
    rng: &mut impl Rng,
    board_size: u32,
    players: &IndexMap<String, PlayerState>,
    food: &[FoodItem],
    weapons: &[crate::domain::items::WeaponPickup],
) -> Option<Position> {
    crate::domain::systems::spawn::find_free_cell(rng, board_size, players, food, weapons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;
    use std::time::Duration;

    fn player() -> PlayerState {
        PlayerState::new(
            "p".into(),
            "p".into(),
            "red",
            Arc::new(AtomicU32::new(0)),
            Arc::new(AtomicU32::new(0)),
        )
    }

    #[test]
    fn speed_boost_reverts_after_duration() {
        let mut p = player();
        let mut food = Vec::new();
        let mut next_id = 1;
        let now = Instant::now();
        apply_weapon_effect(&mut p, WeaponType::SpeedBoost, now, &mut food, &mut next_id);
        assert_eq!(p.effects.speed_multiplier, 1.5);
        assert!(p.weapon.is_none());

        expire_effects(&mut p, now + Duration::from_millis(1));
        assert_eq!(p.effects.speed_multiplier, 1.5, "not expired yet");

        expire_effects(&mut p, now + Duration::from_secs(9));
        assert_eq!(p.effects.speed_multiplier, 1.0);
    }

    #[test]
    fn food_bomb_scatters_food_around_head() {
        let mut p = player();
        p.reset_for_game(Position::new(10, 10), crate::domain::position::Direction::Right);
        let mut food = Vec::new();
        let mut next_id = 1;
        let spawned =
            apply_weapon_effect(&mut p, WeaponType::FoodBomb, Instant::now(), &mut food, &mut next_id);
        assert_eq!(spawned.len(), FOOD_BOMB_COUNT);
        assert_eq!(food.len(), FOOD_BOMB_COUNT);
    }
}
