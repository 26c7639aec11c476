use crate::NodeId;
use thiserror::Error;

/// Failure reported by a [`FlowStore`](crate::FlowStore)
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

/// Why a save attempt did not complete
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{} node(s) have no connections", .0.len())]
    InvalidFlow(Vec<NodeId>),

    #[error("Failed to persist flow: {0}")]
    Persistence(#[from] PersistenceError),
}
