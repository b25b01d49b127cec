//! In-memory storage, for a single process.

mod room;

pub use room::InMemoryRoomRepository;
