//! Client-side conversation state: a namespaced key-value store over a
//! pluggable backend, thread CRUD, and stream-delta reconciliation.
//!
//! The server keeps no conversation state between requests, so everything a
//! thread remembers lives here and is replayed as history on every turn.

pub mod controller;
pub mod error;
pub mod store;

pub use controller::{ChatController, OutboundTurn, TurnPhase};
pub use error::ClientError;
pub use store::{FileBackend, LocalStore, MemoryBackend, StorageBackend};
