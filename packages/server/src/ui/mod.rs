//! UI layer: the axum router, WebSocket and HTTP handlers, and shutdown.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::AUTHENTICATED_USER_HEADER;
pub use server::Server;
