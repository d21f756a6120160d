use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("destination namespace exhausted: all {capacity} typed slots are assigned")]
    NamespaceExhausted { capacity: usize },

    #[error("destination namespace needs at least 2 slots, got {0}")]
    InvalidNamespaceSize(usize),

    #[error("invalid route `{0}`")]
    InvalidRoute(String),

    #[error("back stack snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NavError>;
