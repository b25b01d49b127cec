//! Shared helpers for integration tests.
//!
//! The server runs in-process on an ephemeral port; clients are real
//! WebSocket connections.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::HeaderValue},
};
use tsudoi_server::{
    domain::{EchoPolicy, RoomDirectory},
    infrastructure::{
        broadcast_bus::WebSocketBroadcastBus, directory::OpenRoomDirectory,
        repository::InMemoryRoomRepository,
    },
    ui::{AUTHENTICATED_USER_HEADER, Server, state::AppState},
};
use tsudoi_shared::time::SystemClock;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// Helper struct to manage server lifecycle
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with the default configuration
    pub async fn start() -> Self {
        Self::start_with(EchoPolicy::default(), Arc::new(OpenRoomDirectory)).await
    }

    pub async fn start_with(echo_policy: EchoPolicy, directory: Arc<dyn RoomDirectory>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let state = Arc::new(AppState::new(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketBroadcastBus::new()),
            directory,
            Arc::new(SystemClock),
            echo_policy,
        ));
        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            Server::new(state)
                .serve(listener, async {
                    let _ = signal.await;
                })
                .await
                .expect("Server failed");
        });

        TestServer {
            addr,
            shutdown: Some(shutdown),
            handle,
        }
    }

    /// Get the WebSocket URL for a room
    pub fn ws_url(&self, kind: &str, room_id: &str) -> String {
        format!("ws://{}/ws/{}/{}", self.addr, kind, room_id)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.abort();
    }
}

/// Helper struct wrapping one client WebSocket
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Self {
        let (ws, _) = connect_async(url).await.expect("Failed to connect");
        TestClient { ws }
    }

    /// Connect with the identity header an auth proxy would set
    pub async fn connect_as(url: &str, user: &str) -> Self {
        let mut request = url.into_client_request().expect("Invalid URL");
        request.headers_mut().insert(
            AUTHENTICATED_USER_HEADER,
            HeaderValue::from_str(user).expect("Invalid header value"),
        );
        let (ws, _) = connect_async(request).await.expect("Failed to connect");
        TestClient { ws }
    }

    /// Connect to a whiteboard and consume its state_sync
    pub async fn connect_whiteboard(url: &str) -> (Self, Value) {
        let mut client = Self::connect(url).await;
        let sync = client.expect("state_sync").await;
        (client, sync)
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::text(text))
            .await
            .expect("Failed to send");
    }

    pub async fn send_binary(&mut self, bytes: Vec<u8>) {
        self.ws
            .send(Message::binary(bytes))
            .await
            .expect("Failed to send");
    }

    /// Receive the next JSON frame, skipping control frames
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("Timed out waiting for a message")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
            }
        }
    }

    /// Receive the next frame and check its type
    pub async fn expect(&mut self, message_type: &str) -> Value {
        let message = self.recv_json().await;
        assert_eq!(
            message["type"], message_type,
            "unexpected message: {}",
            message
        );
        message
    }

    /// Assert nothing arrives for a short while
    pub async fn expect_silence(&mut self) {
        if let Ok(Some(Ok(Message::Text(text)))) =
            tokio::time::timeout(SILENCE_WINDOW, self.ws.next()).await
        {
            panic!("expected no message, got {}", text.as_str());
        }
    }

    /// Send join and wait for the user_list that confirms it
    pub async fn join(&mut self, username: &str) -> Value {
        self.send_json(serde_json::json!({"type": "join", "username": username}))
            .await;
        self.expect("user_list").await
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
