use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no turn is awaiting an approval decision")]
    NoPendingApproval,

    #[error("a turn is already in flight for thread {0}")]
    TurnInFlight(String),
}
