//! Room repository implementations.

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
