//! Position-tracked block reader.
//!
//! A [`BlockReader`] wraps a cursor obtained from the chain engine. The engine
//! owns reorg handling: when the cursor's block drops off the canonical chain
//! it re-emits the abandoned segment flagged `obsolete` and then the new
//! canonical segment. The reader turns every returned block into exactly one
//! [`BlockMessage`] in the same order and keeps no memory of block ids.

use crate::block::{BlockMessage, ExtendedBlock};
use crate::error::{ChainError, FeedError};
use crate::types::ChainPosition;

/// A cursor into the canonical chain, owned by the chain engine.
pub trait BlockSource {
    /// Return the blocks that became available since the last read.
    ///
    /// An empty result means the cursor is at the chain tip. Must not block.
    fn read(&mut self) -> Result<Vec<ExtendedBlock>, ChainError>;
}

/// A chain engine able to hand out positioned cursors.
pub trait ChainStore {
    type Reader: BlockSource;

    /// Create a cursor rooted at `position`. Does not read.
    fn block_reader(&self, position: ChainPosition) -> Self::Reader;
}

/// Result of one [`BlockReader::read`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadBatch {
    pub messages: Vec<BlockMessage>,
    /// `true` if this read returned blocks, so calling again right away may
    /// return more. `false` means caught up: wait before retrying.
    pub has_more: bool,
}

/// Session-scoped block reader. Not shareable between callers.
pub struct BlockReader<S> {
    source: S,
    position: ChainPosition,
}

impl<S: BlockSource> BlockReader<S> {
    /// Bind a reader to `chain`, rooted at `position`.
    pub fn new<C>(chain: &C, position: ChainPosition) -> Self
    where
        C: ChainStore<Reader = S>,
    {
        Self { source: chain.block_reader(position), position }
    }

    /// Wrap an already positioned source.
    pub fn from_source(source: S, position: ChainPosition) -> Self {
        Self { source, position }
    }

    /// The position this reader was created at.
    pub fn position(&self) -> ChainPosition {
        self.position
    }

    /// Read the next batch of block messages.
    pub fn read(&mut self) -> Result<ReadBatch, FeedError> {
        let blocks = self.source.read().map_err(|source| {
            tracing::error!(position = %self.position, error = %source, "Chain read failed");
            FeedError::ChainRead { position: self.position, source }
        })?;

        let obsolete = blocks.iter().filter(|b| b.obsolete).count();
        if obsolete > 0 {
            tracing::warn!(
                position = %self.position,
                obsolete,
                "Chain reorganized; re-emitting abandoned blocks"
            );
        }

        let messages: Vec<BlockMessage> = blocks.iter().map(BlockMessage::from).collect();
        tracing::debug!(
            position = %self.position,
            count = messages.len(),
            first = ?messages.first().map(|m| m.number),
            last = ?messages.last().map(|m| m.number),
            "Read block batch"
        );

        Ok(ReadBatch { has_more: !messages.is_empty(), messages })
    }
}
