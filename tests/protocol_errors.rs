mod support;

use futures::SinkExt;
use serde_json::json;
use support::{connect, recv_json, recv_until, send};
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn malformed_frame_gets_an_error_and_stays_connected() {
    let mut socket = connect().await;
    recv_until(&mut socket, "welcome").await;

    socket
        .send(Message::Text("not json at all".into()))
        .await
        .expect("send should succeed");
    let err = recv_json(&mut socket).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["message"], "Invalid message format");

    // The socket is still alive: a well-formed command still gets a reply.
    send(&mut socket, json!({"type": "get_lobbies"})).await;
    recv_until(&mut socket, "lobbies_list").await;
}

#[tokio::test]
async fn unknown_command_type_is_reported_by_name() {
    let mut socket = connect().await;
    recv_until(&mut socket, "welcome").await;

    send(&mut socket, json!({"type": "launch_missiles"})).await;
    let err = recv_until(&mut socket, "error").await;
    assert!(err["message"]
        .as_str()
        .unwrap()
        .contains("launch_missiles"));
}

#[tokio::test]
async fn player_input_outside_a_lobby_is_rejected() {
    let mut socket = connect().await;
    recv_until(&mut socket, "welcome").await;

    send(
        &mut socket,
        json!({"type": "player_input", "data": {"type": "use_weapon"}}),
    )
    .await;
    let err = recv_until(&mut socket, "error").await;
    assert_eq!(err["message"], "not in a lobby");
}
