// Movement + collision resolution — §4.3 Tick Engine, steps 2 and 3.
//
// Runs as a two-phase pass over the players moving this sub-step: first decide
// every player's outcome by reading the board's current (pre-mutation) state,
// then apply all mutations together. This keeps the result independent of
// iteration order for anything except the documented kill-credit tie-break.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::domain::items::{FoodItem, WeaponPickup};
use crate::domain::player::PlayerState;
use crate::domain::position::Position;
use crate::domain::tuning::KILL_SCORE_BONUS;
use crate::domain::weapons::WeaponType;

#[derive(Debug, Clone)]
pub struct KillEvent {
    pub victim: String,
    /// `None` for wall/self/head-to-head deaths, where no killer is credited.
    pub killer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FoodEvent {
    pub player: String,
    pub food_id: u64,
    pub awarded: u32,
}

#[derive(Debug, Clone)]
pub struct WeaponEvent {
    pub player: String,
    pub weapon: WeaponType,
}

#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    pub kills: Vec<KillEvent>,
    pub food: Vec<FoodEvent>,
    pub weapons: Vec<WeaponEvent>,
}

enum Outcome {
    Died { killer: Option<String> },
    Grew { food_id: u64, food_value: u32 },
    Moved { picked_weapon: Option<(u64, WeaponType)> },
}

/// Runs one movement+collision pass for the given (already alive) player ids,
/// in `players`' current iteration order. Mutates `players`, `food`, and
/// `weapons` in place and returns the events worth broadcasting/logging.
pub fn run_movement_pass(
    players: &mut IndexMap<String, PlayerState>,
    food: &mut Vec<FoodItem>,
    weapons: &mut Vec<WeaponPickup>,
    board_size: u32,
    moving: &[String],
) -> TickEvents {
    let board = board_size as i32;
    let mut events = TickEvents::default();

    // Advance heads for everyone moving this pass.
    let mut new_heads: HashMap<String, Position> = HashMap::new();
    for id in moving {
        if let Some(p) = players.get(id) {
            if p.is_alive {
                if let Some(head) = p.head() {
                    new_heads.insert(id.clone(), head.translated(p.direction));
                }
            }
        }
    }

    // Head-to-head: two or more moving players land on the same new cell this tick.
    let mut landings: HashMap<Position, Vec<String>> = HashMap::new();
    for (id, pos) in &new_heads {
        landings.entry(*pos).or_default().push(id.clone());
    }

    let mut outcomes: HashMap<String, Outcome> = HashMap::new();
    for ids in landings.values() {
        if ids.len() > 1 {
            for id in ids {
                outcomes.insert(id.clone(), Outcome::Died { killer: None });
            }
        }
    }

    let order: Vec<String> = players.keys().cloned().collect();
    for id in &order {
        if outcomes.contains_key(id) {
            continue;
        }
        let Some(&raw_head) = new_heads.get(id) else {
            continue;
        };
        let invincible = players[id].effects.is_invincible;
        let phasing = players[id].effects.can_phase_through;

        // Wall: invincibility keeps the snake on the board instead of dying,
        // preserving the "segments always in bounds" invariant (§8).
        let out_of_bounds = !raw_head.in_bounds(board);
        if out_of_bounds && !invincible {
            outcomes.insert(id.clone(), Outcome::Died { killer: None });
            continue;
        }
        let new_head = if out_of_bounds {
            clamp_to_board(raw_head, board)
        } else {
            raw_head
        };

        if !phasing && !invincible && players[id].occupies(new_head) {
            outcomes.insert(id.clone(), Outcome::Died { killer: None });
            continue;
        }

        if !phasing && !invincible {
            let mut killed_by = None;
            for other_id in &order {
                if other_id == id {
                    continue;
                }
                let Some(other) = players.get(other_id) else {
                    continue;
                };
                if other.is_alive && other.occupies(new_head) {
                    killed_by = Some(other_id.clone());
                    break;
                }
            }
            if let Some(killer) = killed_by {
                outcomes.insert(id.clone(), Outcome::Died {
                    killer: Some(killer),
                });
                continue;
            }
        }

        if let Some(idx) = food.iter().position(|f| f.pos == new_head) {
            outcomes.insert(id.clone(), Outcome::Grew {
                food_id: food[idx].id,
                food_value: food[idx].value,
            });
            continue;
        }

        if let Some(idx) = weapons.iter().position(|w| w.pos == new_head) {
            outcomes.insert(id.clone(), Outcome::Moved {
                picked_weapon: Some((weapons[idx].id, weapons[idx].weapon_type)),
            });
            continue;
        }

        outcomes.insert(id.clone(), Outcome::Moved { picked_weapon: None });
    }

    for id in &order {
        let Some(outcome) = outcomes.remove(id) else {
            continue;
        };
        let new_head = new_heads.get(id).copied();
        match outcome {
            Outcome::Died { killer } => {
                if let Some(p) = players.get_mut(id) {
                    p.is_alive = false;
                    p.deaths += 1;
                }
                if let Some(killer_id) = &killer {
                    if let Some(k) = players.get_mut(killer_id) {
                        k.kills += 1;
                        k.score += KILL_SCORE_BONUS;
                    }
                }
                events.kills.push(KillEvent {
                    victim: id.clone(),
                    killer,
                });
            }
            Outcome::Grew {
                food_id,
                food_value,
            } => {
                let Some(new_head) = new_head else { continue };
                food.retain(|f| f.id != food_id);
                if let Some(p) = players.get_mut(id) {
                    let awarded = food_value * p.effects.score_multiplier;
                    p.score += awarded;
                    p.snake.push_front(new_head);
                    events.food.push(FoodEvent {
                        player: id.clone(),
                        food_id,
                        awarded,
                    });
                }
            }
            Outcome::Moved { picked_weapon } => {
                let Some(new_head) = new_head else { continue };
                if let Some((weapon_id, weapon_type)) = picked_weapon {
                    weapons.retain(|w| w.id != weapon_id);
                    if let Some(p) = players.get_mut(id) {
                        p.weapon = Some(weapon_type);
                        events.weapons.push(WeaponEvent {
                            player: id.clone(),
                            weapon: weapon_type,
                        });
                    }
                }
                if let Some(p) = players.get_mut(id) {
                    p.snake.push_front(new_head);
                    p.snake.pop_back();
                }
            }
        }
    }

    events
}

fn clamp_to_board(pos: Position, board: i32) -> Position {
    Position::new(pos.x.clamp(0, board - 1), pos.y.clamp(0, board - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Direction;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn make_player(id: &str, head: Position, dir: Direction) -> PlayerState {
        let mut p = PlayerState::new(
            id.to_string(),
            id.to_string(),
            "red",
            Arc::new(AtomicU32::new(0)),
            Arc::new(AtomicU32::new(0)),
        );
        p.reset_for_game(head, dir);
        p
    }

    #[test]
    fn wall_collision_kills_with_no_killer() {
        let mut players = IndexMap::new();
        let a = make_player("a", Position::new(19, 5), Direction::Right);
        players.insert("a".to_string(), a);

        let mut food = Vec::new();
        let mut weapons = Vec::new();
        let events = run_movement_pass(&mut players, &mut food, &mut weapons, 20, &[
            "a".to_string(),
        ]);

        assert!(!players["a"].is_alive);
        assert_eq!(players["a"].deaths, 1);
        assert_eq!(events.kills.len(), 1);
        assert!(events.kills[0].killer.is_none());
    }

    #[test]
    fn food_pickup_grows_and_scores() {
        let mut players = IndexMap::new();
        let a = make_player("a", Position::new(5, 5), Direction::Right);
        let len_before = a.snake.len();
        players.insert("a".to_string(), a);

        let mut food = vec![FoodItem::normal(1, Position::new(6, 5))];
        let mut weapons = Vec::new();
        run_movement_pass(&mut players, &mut food, &mut weapons, 20, &["a".to_string()]);

        assert_eq!(players["a"].snake.len(), len_before + 1);
        assert_eq!(players["a"].score, 10);
        assert!(food.is_empty());
    }

    #[test]
    fn head_on_head_kills_both_with_no_credit() {
        let mut players = IndexMap::new();
        players.insert(
            "a".to_string(),
            make_player("a", Position::new(9, 10), Direction::Right),
        );
        players.insert(
            "b".to_string(),
            make_player("b", Position::new(11, 10), Direction::Left),
        );

        let mut food = Vec::new();
        let mut weapons = Vec::new();
        let events = run_movement_pass(&mut players, &mut food, &mut weapons, 20, &[
            "a".to_string(),
            "b".to_string(),
        ]);

        assert!(!players["a"].is_alive);
        assert!(!players["b"].is_alive);
        assert_eq!(events.kills.len(), 2);
        assert!(events.kills.iter().all(|k| k.killer.is_none()));
    }

    #[test]
    fn other_player_collision_credits_killer() {
        let mut players = IndexMap::new();
        let mut victim = make_player("victim", Position::new(5, 5), Direction::Right);
        victim.snake = [Position::new(5, 5), Position::new(4, 5)].into();
        let mut owner = make_player("owner", Position::new(6, 6), Direction::Up);
        // Owner's body occupies (6, 5), which victim's head will move onto.
        owner.snake = [Position::new(6, 6), Position::new(6, 5)].into();
        players.insert("victim".to_string(), victim);
        players.insert("owner".to_string(), owner);

        let mut food = Vec::new();
        let mut weapons = Vec::new();
        let events = run_movement_pass(&mut players, &mut food, &mut weapons, 20, &[
            "victim".to_string(),
        ]);

        assert!(!players["victim"].is_alive);
        assert_eq!(players["owner"].kills, 1);
        assert_eq!(players["owner"].score, KILL_SCORE_BONUS);
        assert_eq!(events.kills[0].killer.as_deref(), Some("owner"));
    }

    #[test]
    fn reverse_direction_is_rejected_before_movement() {
        let mut p = make_player("a", Position::new(5, 5), Direction::Right);
        assert!(!p.try_set_direction(Direction::Left));
        assert_eq!(p.direction, Direction::Right);
    }
}
