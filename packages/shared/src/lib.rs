//! Utilities shared by the Tsudoi packages: logging setup and time handling.

pub mod logger;
pub mod time;
