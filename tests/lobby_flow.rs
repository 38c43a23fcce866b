mod support;

use serde_json::json;
use support::{connect, recv_until, send};

#[tokio::test]
async fn two_players_join_ready_and_start_a_game() {
    let mut host = connect().await;
    let mut guest = connect().await;

    let welcome = recv_until(&mut host, "welcome").await;
    let host_id = welcome["player_id"].as_str().unwrap().to_string();
    recv_until(&mut guest, "welcome").await;

    send(&mut host, json!({"type": "connect_player", "data": {"name": "Alice"}})).await;
    recv_until(&mut host, "connection_confirmed").await;
    send(&mut guest, json!({"type": "connect_player", "data": {"name": "Bob"}})).await;
    recv_until(&mut guest, "connection_confirmed").await;

    send(
        &mut host,
        json!({"type": "create_lobby", "data": {"name": "Arena", "max_players": 2}}),
    )
    .await;
    let created = recv_until(&mut host, "lobby_created").await;
    let lobby_id = created["lobby"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["lobby"]["created_by"], host_id);

    send(
        &mut guest,
        json!({"type": "join_lobby", "data": {"lobby_id": lobby_id}}),
    )
    .await;
    let joined = recv_until(&mut guest, "lobby_joined").await;
    assert_eq!(joined["lobby"]["players"].as_array().unwrap().len(), 2);
    let host_saw_join = recv_until(&mut host, "player_joined").await;
    assert_eq!(host_saw_join["player"]["name"], "Bob");

    send(&mut host, json!({"type": "set_ready", "data": {"ready": true}})).await;
    recv_until(&mut host, "player_ready_changed").await;
    recv_until(&mut guest, "player_ready_changed").await;

    send(&mut guest, json!({"type": "set_ready", "data": {"ready": true}})).await;
    let both_ready = recv_until(&mut host, "player_ready_changed").await;
    assert_eq!(both_ready["ready_count"], 2);
    assert_eq!(both_ready["total_count"], 2);

    // Auto-start delay (2s) then a 3-2-1 countdown (1s apiece, §4.2) precede
    // the transition to `playing`.
    let starting = recv_until(&mut host, "game_starting").await;
    assert_eq!(starting["countdown"], 3);
    recv_until(&mut host, "countdown").await;
    recv_until(&mut host, "countdown").await;
    recv_until(&mut host, "game_started").await;

    // Reverse the host's starting direction (right); §4.3 rejects the 180
    // and the next snapshot should still show it moving right.
    send(
        &mut host,
        json!({"type": "player_input", "data": {"type": "direction", "direction": "left"}}),
    )
    .await;
    let update = recv_until(&mut host, "game_update").await;
    let host_player = update["game_state"]["players"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == host_id)
        .expect("host present in snapshot");
    assert_eq!(host_player["direction"], "right");
}

#[tokio::test]
async fn get_lobbies_excludes_private_and_non_waiting_rooms() {
    let mut host = connect().await;
    recv_until(&mut host, "welcome").await;

    send(
        &mut host,
        json!({"type": "create_lobby", "data": {"name": "Hidden", "is_private": true}}),
    )
    .await;
    recv_until(&mut host, "lobby_created").await;

    send(&mut host, json!({"type": "get_lobbies"})).await;
    let list = recv_until(&mut host, "lobbies_list").await;
    let lobbies = list["lobbies"].as_array().unwrap();
    assert!(lobbies.iter().all(|l| l["name"] != "Hidden"));
}
