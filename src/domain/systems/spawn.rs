// Item spawning — §4.3 step 4: rejection-sample a free cell, give up after
// `MAX_SPAWN_ATTEMPTS` tries (a skipped spawn is not an error, §7).

use indexmap::IndexMap;
use rand::Rng;

use crate::domain::items::{FoodItem, WeaponPickup};
use crate::domain::player::PlayerState;
use crate::domain::position::Position;
use crate::domain::tuning::MAX_SPAWN_ATTEMPTS;
use crate::domain::weapons::WeaponType;

fn cell_is_free(
    pos: Position,
    players: &IndexMap<String, PlayerState>,
    food: &[FoodItem],
    weapons: &[WeaponPickup],
) -> bool {
    if food.iter().any(|f| f.pos == pos) {
        return false;
    }
    if weapons.iter().any(|w| w.pos == pos) {
        return false;
    }
    !players.values().any(|p| p.is_alive && p.occupies(pos))
}

pub(crate) fn find_free_cell(
    rng: &mut impl Rng,
    board_size: u32,
    players: &IndexMap<String, PlayerState>,
    food: &[FoodItem],
    weapons: &[WeaponPickup],
) -> Option<Position> {
    let board = board_size as i32;
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let candidate = Position::new(rng.gen_range(0..board), rng.gen_range(0..board));
        if cell_is_free(candidate, players, food, weapons) {
            return Some(candidate);
        }
    }
    None
}

/// Spawns one food item if a free cell is found within the attempt budget.
pub fn spawn_food(
    rng: &mut impl Rng,
    board_size: u32,
    players: &IndexMap<String, PlayerState>,
    food: &mut Vec<FoodItem>,
    weapons: &[WeaponPickup],
    next_item_id: &mut u64,
) -> bool {
    let Some(pos) = find_free_cell(rng, board_size, players, food, weapons) else {
        return false;
    };
    let id = *next_item_id;
    *next_item_id += 1;
    food.push(FoodItem::normal(id, pos));
    true
}

/// Spawns one weapon pickup if a free cell is found within the attempt budget.
pub fn spawn_weapon(
    rng: &mut impl Rng,
    board_size: u32,
    players: &IndexMap<String, PlayerState>,
    food: &[FoodItem],
    weapons: &mut Vec<WeaponPickup>,
    weapon_type: WeaponType,
    next_item_id: &mut u64,
) -> bool {
    let Some(pos) = find_free_cell(rng, board_size, players, food, weapons) else {
        return false;
    };
    let id = *next_item_id;
    *next_item_id += 1;
    weapons.push(WeaponPickup {
        id,
        pos,
        weapon_type,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn spawn_skips_when_board_is_saturated() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let players = IndexMap::new();
        // A 1x1 board with one food already on the only cell has no free spot.
        let mut food = vec![FoodItem::normal(1, Position::new(0, 0))];
        let weapons = Vec::new();
        let mut next_id = 2;
        let spawned = spawn_food(&mut rng, 1, &players, &mut food, &weapons, &mut next_id);
        assert!(!spawned);
        assert_eq!(food.len(), 1);
    }

    #[test]
    fn spawn_places_item_on_free_cell() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let players = IndexMap::new();
        let mut food = Vec::new();
        let weapons = Vec::new();
        let mut next_id = 1;
        let spawned = spawn_food(&mut rng, 5, &players, &mut food, &weapons, &mut next_id);
        assert!(spawned);
        assert_eq!(food.len(), 1);
        assert!(food[0].pos.in_bounds(5));
    }
}
