// Win condition evaluation — §4.3 step 5.

use indexmap::IndexMap;
use std::time::Duration;

use crate::domain::player::PlayerState;
use crate::domain::settings::{GameSettings, WinCondition};

pub fn evaluate_win_condition(
    players: &IndexMap<String, PlayerState>,
    settings: &GameSettings,
    elapsed: Duration,
) -> bool {
    let alive = players.values().filter(|p| p.is_alive).count();
    match settings.win_condition {
        WinCondition::LastStanding => alive <= 1,
        WinCondition::TimeLimit => elapsed.as_millis() as u64 >= settings.max_game_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn player(alive: bool) -> PlayerState {
        let mut p = PlayerState::new(
            "p".into(),
            "p".into(),
            "red",
            Arc::new(AtomicU32::new(0)),
            Arc::new(AtomicU32::new(0)),
        );
        p.is_alive = alive;
        p
    }

    #[test]
    fn last_standing_triggers_at_one_or_fewer_alive() {
        let mut players = IndexMap::new();
        players.insert("a".to_string(), player(true));
        players.insert("b".to_string(), player(false));
        let settings = GameSettings::default();
        assert!(evaluate_win_condition(&players, &settings, Duration::ZERO));
    }

    #[test]
    fn last_standing_does_not_trigger_with_two_alive() {
        let mut players = IndexMap::new();
        players.insert("a".to_string(), player(true));
        players.insert("b".to_string(), player(true));
        let settings = GameSettings::default();
        assert!(!evaluate_win_condition(&players, &settings, Duration::ZERO));
    }

    #[test]
    fn time_limit_triggers_once_elapsed_reaches_max() {
        let mut players = IndexMap::new();
        players.insert("a".to_string(), player(true));
        players.insert("b".to_string(), player(true));
        let mut settings = GameSettings::default();
        settings.win_condition = WinCondition::TimeLimit;
        settings.max_game_time_ms = 1_000;
        assert!(!evaluate_win_condition(
            &players,
            &settings,
            Duration::from_millis(999)
        ));
        assert!(evaluate_win_condition(
            &players,
            &settings,
            Duration::from_millis(1_000)
        ));
    }
}
