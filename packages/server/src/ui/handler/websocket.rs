//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{DisplayName, ProtocolError, RoomKey, ServerEvent, ValueObjectError},
    infrastructure::dto::websocket::decode_client_event,
    ui::state::AppState,
    usecase::{Session, SessionError},
};

/// Header carrying the identity established by the upstream auth proxy.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((kind, room_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert path segments -> RoomKey (Domain Model)
    let key = match RoomKey::from_parts(&kind, &room_id) {
        Ok(key) => key,
        Err(ValueObjectError::UnknownRoomKind(kind)) => {
            tracing::warn!("Rejected connection to unknown room kind '{}'", kind);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::warn!("Rejected connection to room '{}': {}", room_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let identity = authenticated_identity(&headers)?;
    let session = Session::new(key, identity);
    tracing::info!(
        "Connection '{}' upgrading for '{}'",
        session.connection_id(),
        session.key()
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session)))
}

/// An absent header means anonymous; a present but unusable one is refused.
fn authenticated_identity(headers: &HeaderMap) -> Result<Option<DisplayName>, StatusCode> {
    let Some(value) = headers.get(AUTHENTICATED_USER_HEADER) else {
        return Ok(None);
    };
    let name = value.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;
    DisplayName::new(name.to_string()).map(Some).map_err(|e| {
        tracing::warn!("Invalid {} header: {}", AUTHENTICATED_USER_HEADER, e);
        StatusCode::BAD_REQUEST
    })
}

/// Spawns a task that drains the connection's channel into the WebSocket.
///
/// Everything addressed to this client (room broadcasts, `state_sync`,
/// `error` replies) arrives on `rx`; the task ends when the socket refuses a
/// frame or every sender is gone.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::debug!("WebSocket send failed: {}", e);
                break;
            }
        }
    })
}

/// Spawns a task that handles inbound frames one at a time, in arrival order.
fn recv_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session: Arc<Mutex<Session>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error: {}", e);
                    break;
                }
            };

            let result = match msg {
                Message::Text(text) => {
                    tracing::trace!("Received text: {}", text.as_str());
                    let mut session = session.lock().await;
                    handle_text(&state, &mut session, text.as_str()).await
                }
                Message::Binary(_) => Err(SessionError::from(ProtocolError::BinaryFrame)),
                Message::Close(_) => break,
                // Ping/pong is answered by the WebSocket layer
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            if let Err(e) = result {
                if e.is_fatal() {
                    tracing::warn!("Closing connection: {}", e);
                    break;
                }
                let session = session.lock().await;
                reply_error(&state, &session, &e).await;
            }
        }
    })
}

async fn handle_text(
    state: &AppState,
    session: &mut Session,
    text: &str,
) -> Result<(), SessionError> {
    let event = decode_client_event(text)?;
    state.handle_event_usecase.execute(session, event).await
}

async fn reply_error(state: &AppState, session: &Session, error: &SessionError) {
    match error {
        SessionError::Internal(_) => tracing::error!(
            "Internal error on '{}' in '{}': {}",
            session.connection_id(),
            session.key(),
            error
        ),
        _ => tracing::warn!(
            "Rejected event from '{}' in '{}': {}",
            session.connection_id(),
            session.key(),
            error
        ),
    }

    let reply = ServerEvent::Error {
        message: error.client_message(),
    };
    if let Err(e) = state
        .bus
        .push_to(session.key(), &session.connection_id(), &reply)
        .await
    {
        tracing::warn!("Failed to send error reply: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session: Session) {
    let (sender, receiver) = socket.split();
    let key = session.key().clone();
    let connection_id = session.connection_id();
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn the pusher first so state_sync goes out as soon as it is queued
    let mut send_task = pusher_loop(rx, sender);

    // Use ConnectParticipantUseCase to register and hydrate the connection
    let session = Arc::new(Mutex::new(session));
    let mut recv_task = match state
        .connect_participant_usecase
        .execute(&key, connection_id, tx)
        .await
    {
        Ok(_) => {
            tracing::info!("Connection '{}' registered to '{}'", connection_id, key);
            recv_loop(receiver, state.clone(), session.clone())
        }
        Err(e) => {
            tracing::error!("Failed to connect '{}' to '{}': {}", connection_id, key, e);
            tokio::spawn(async {})
        }
    };

    // If any one of the tasks completes, abort the other and wait for it
    tokio::select! {
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
    };

    // Single cleanup path
    let mut session = session.lock().await;
    if !session.close() {
        return;
    }
    match state
        .disconnect_participant_usecase
        .execute(&key, &connection_id)
        .await
    {
        Ok(Some(username)) => {
            tracing::info!("'{}' disconnected from '{}'", username, key);
        }
        Ok(None) => {
            tracing::info!("Connection '{}' closed in '{}'", connection_id, key);
        }
        Err(e) => {
            tracing::error!("Failed to clean up '{}' in '{}': {}", connection_id, key, e);
        }
    }
}
