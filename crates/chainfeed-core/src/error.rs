//! Error types for the chainfeed pipeline.

use alloy_primitives::B256;
use thiserror::Error;

use crate::types::ChainPosition;

/// Errors reported by a chain engine's positioned block source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("block {0} is not known to the chain engine")]
    UnknownPosition(B256),

    #[error("chain storage error: {0}")]
    Storage(String),
}

/// Errors surfaced to chainfeed callers.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("chain read failed for reader rooted at {position}: {source}")]
    ChainRead {
        position: ChainPosition,
        #[source]
        source: ChainError,
    },

    #[error("log store error: {0}")]
    LogStore(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("config error: {0}")]
    Config(String),
}

impl FeedError {
    /// Returns `true` if the error ends the current subscription session.
    ///
    /// The caller must restart from a fresh position rather than retry.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::ChainRead { .. })
    }
}
