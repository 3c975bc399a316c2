pub mod checkpoint;
pub mod store;
pub mod hydrator;
pub mod error;

pub use checkpoint::{ChannelValues, Checkpoint};
pub use store::{CheckpointStore, MemorySaver};
pub use hydrator::hydrate;
pub use error::MemoryError;
