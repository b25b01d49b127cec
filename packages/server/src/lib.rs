//! Tsudoi server library.
//!
//! A room-scoped presence and broadcast relay: WebSocket clients join a
//! whiteboard, chat or code room and every event they send is fanned out to
//! the other members of that room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
