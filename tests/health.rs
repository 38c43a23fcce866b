mod support;

#[tokio::test]
async fn health_route_reports_players_and_lobbies() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let res = client
        .get(base_url)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = res.json().await.expect("response should be JSON");
    assert!(body["message"].is_string());
    assert!(body["players"].is_u64());
    assert!(body["lobbies"].is_u64());
}
