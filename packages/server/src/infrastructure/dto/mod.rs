//! Data Transfer Objects.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound event decoding and outbound event encoding
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
