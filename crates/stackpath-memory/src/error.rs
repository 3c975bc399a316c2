use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Checkpoint store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
