//! Tsudoi relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-server
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin tsudoi-server -- --redis-url redis://127.0.0.1:6379 --echo-drawings
//! ```

use std::sync::Arc;

use clap::Parser;
use tsudoi_server::{
    config::ServerConfig,
    domain::{BroadcastBus, RoomDirectory},
    infrastructure::{
        broadcast_bus::{RedisBroadcastBus, WebSocketBroadcastBus},
        directory::{InMemoryRoomDirectory, OpenRoomDirectory},
        repository::InMemoryRoomRepository,
    },
    ui::{Server, state::AppState},
};
use tsudoi_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing (the library and binary share the `tsudoi_server` target)
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &config.log_level);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Repository
    // 2. BroadcastBus
    // 3. RoomDirectory
    // 4. AppState (UseCases)
    // 5. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create BroadcastBus (Redis when configured, in-process otherwise)
    let (bus, subscriber): (Arc<dyn BroadcastBus>, _) = match &config.redis_url {
        Some(url) => {
            let (bus, subscriber) = RedisBroadcastBus::connect(url).await?;
            tracing::info!("Using Redis broadcast bus");
            (Arc::new(bus), Some(subscriber))
        }
        None => (Arc::new(WebSocketBroadcastBus::new()), None),
    };

    // 3. Create RoomDirectory
    let directory: Arc<dyn RoomDirectory> = if config.restricts_rooms() {
        let directory = InMemoryRoomDirectory::new(
            config.rooms.iter().cloned(),
            config.inactive_rooms.iter().cloned(),
        );
        tracing::info!("Room directory restricted to {} room(s)", directory.len());
        Arc::new(directory)
    } else {
        Arc::new(OpenRoomDirectory)
    };

    // 4. Create AppState with every UseCase
    let state = Arc::new(AppState::new(
        repository,
        bus,
        directory,
        Arc::new(SystemClock),
        config.echo_policy(),
    ));

    // 5. Create and run the server (losing the Redis subscription stops it)
    let server = Server::new(state).run(config.host, config.port);
    let Some(subscriber) = subscriber else {
        return server.await;
    };
    tokio::select! {
        result = server => result,
        stopped = subscriber => {
            let reason = match stopped {
                Ok(e) => e.to_string(),
                Err(e) => e.to_string(),
            };
            Err(format!("Redis relay stopped: {}", reason).into())
        }
    }
}
