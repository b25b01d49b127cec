//! Request handlers.

mod http;
mod websocket;

pub use http::{get_room_detail, get_rooms, health_check};
pub use websocket::{AUTHENTICATED_USER_HEADER, websocket_handler};
