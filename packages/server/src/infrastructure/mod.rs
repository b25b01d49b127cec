//! Infrastructure layer: concrete implementations of the domain traits and
//! the wire DTOs.

pub mod broadcast_bus;
pub mod directory;
pub mod dto;
pub mod repository;
