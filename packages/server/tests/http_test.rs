//! HTTP inspection API tests.

mod common;

use serde_json::{Value, json};

use common::{TestClient, TestServer};

async fn get_json(url: &str) -> (reqwest::StatusCode, Option<Value>) {
    let response = reqwest::get(url).await.expect("Request failed");
    let status = response.status();
    let body = response.json::<Value>().await.ok();
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (status, body) = get_json(&server.http_url("/api/health")).await;

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, Some(json!({"status": "ok"})));
}

#[tokio::test]
async fn test_rooms_list_reflects_connections() {
    // テスト項目: ルーム一覧に接続で作られたルーム・参加者・オブジェクト数が出る
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut alice, _) = TestClient::connect_whiteboard(&server.ws_url("whiteboard", "abc")).await;
    alice.join("alice").await;
    alice
        .send_json(json!({"type": "draw_complete", "points": [[0, 0]]}))
        .await;
    // イベントは順番に処理されるので、エラー応答が来た時点で描画は反映済み
    alice.send_text("sync").await;
    alice.expect("error").await;
    let mut bob = TestClient::connect(&server.ws_url("chat", "lobby")).await;
    bob.join("bob").await;

    // when (操作):
    let (status, body) = get_json(&server.http_url("/api/rooms")).await;

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::OK);
    let rooms = body.expect("rooms body");
    let rooms = rooms.as_array().expect("array of rooms");
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0]["kind"], "whiteboard");
    assert_eq!(rooms[0]["id"], "abc");
    assert_eq!(rooms[0]["users"], json!(["alice"]));
    assert_eq!(rooms[0]["connections"], 1);
    assert_eq!(rooms[0]["objectCount"], 1);
    assert!(rooms[0]["createdAt"].is_string());
    assert_eq!(rooms[1]["kind"], "chat");
    assert_eq!(rooms[1]["users"], json!(["bob"]));
}

#[tokio::test]
async fn test_room_detail_includes_objects() {
    // テスト項目: ルーム詳細に描画オブジェクトが含まれ、未作成のルームは 404 になる
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut alice, _) = TestClient::connect_whiteboard(&server.ws_url("whiteboard", "abc")).await;
    alice.join("alice").await;
    alice
        .send_json(json!({"type": "draw_complete", "shape": "rect", "points": [], "width": 3}))
        .await;
    alice.send_text("sync").await;
    alice.expect("error").await;

    // when (操作):
    let (status, body) = get_json(&server.http_url("/api/rooms/whiteboard/abc")).await;
    let (missing, _) = get_json(&server.http_url("/api/rooms/whiteboard/nope")).await;
    let (bad_kind, _) = get_json(&server.http_url("/api/rooms/poll/abc")).await;

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::OK);
    let detail = body.expect("detail body");
    assert_eq!(detail["objects"][0]["type"], "rect");
    assert_eq!(detail["objects"][0]["width"], 3);
    assert_eq!(detail["objects"][0]["user"], "alice");
    assert_eq!(detail["connections"], 1);
    assert_eq!(detail["users"], json!(["alice"]));
    assert_eq!(missing, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(bad_kind, reqwest::StatusCode::NOT_FOUND);
}
