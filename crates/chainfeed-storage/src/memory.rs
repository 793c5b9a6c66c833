//! In-memory chain engine and log store.
//!
//! [`InMemoryChain`] keeps every block it has seen plus the current canonical
//! chain. A newly pushed block always becomes the best block, so pushing
//! onto anything but the head is a reorganization. Cursors handed out by the
//! chain rewind across reorgs by re-emitting the abandoned blocks as obsolete
//! (newest first) before moving forward along the new canonical chain.
//!
//! All data is lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use alloy_primitives::B256;
use chainfeed_core::block::{ExtendedBlock, RawBlock};
use chainfeed_core::error::{ChainError, FeedError};
use chainfeed_core::event::RawLog;
use chainfeed_core::filter::LogQuery;
use chainfeed_core::query::LogStore;
use chainfeed_core::reader::{BlockSource, ChainStore};
use chainfeed_core::types::{ChainPosition, Order, Range, RangeUnit};

// ─── Chain ────────────────────────────────────────────────────────────────────

struct ChainState {
    blocks: HashMap<B256, RawBlock>,
    /// Canonical ids; index `i` holds block number `base + i`.
    canonical: Vec<B256>,
    base: u32,
}

impl ChainState {
    fn head(&self) -> &RawBlock {
        let id = self.canonical.last().expect("canonical chain always holds genesis");
        &self.blocks[id]
    }

    fn canonical_id(&self, number: u32) -> Option<B256> {
        let idx = number.checked_sub(self.base)? as usize;
        self.canonical.get(idx).copied()
    }

    fn is_canonical(&self, block: &RawBlock) -> bool {
        self.canonical_id(block.number) == Some(block.id)
    }

    fn parent_of(&self, block: &RawBlock) -> Result<&RawBlock, ChainError> {
        self.blocks.get(&block.parent_id).ok_or_else(|| {
            ChainError::Storage(format!(
                "parent {} of block {} is missing",
                block.parent_id, block.id
            ))
        })
    }
}

/// In-memory chain engine. Clones share the same chain.
#[derive(Clone)]
pub struct InMemoryChain {
    state: Arc<RwLock<ChainState>>,
    batch_limit: Option<usize>,
}

impl InMemoryChain {
    /// Create a chain holding only `genesis`.
    pub fn new(genesis: RawBlock) -> Self {
        let mut blocks = HashMap::new();
        let base = genesis.number;
        let canonical = vec![genesis.id];
        blocks.insert(genesis.id, genesis);
        Self {
            state: Arc::new(RwLock::new(ChainState { blocks, canonical, base })),
            batch_limit: None,
        }
    }

    /// Cap the number of blocks a cursor returns per read.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit.max(1));
        self
    }

    /// Add `block` and make it the best block.
    ///
    /// Its parent must already be known. If the parent is not the current
    /// head, the canonical chain is rewritten from the fork point. Pushing a
    /// block that is already known switches back to it without storing it
    /// again; pushing the current head is a no-op.
    pub fn push(&self, block: RawBlock) -> Result<(), ChainError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.head().id == block.id {
            return Ok(());
        }
        let known = state.blocks.contains_key(&block.id);
        let parent = state
            .blocks
            .get(&block.parent_id)
            .ok_or(ChainError::UnknownPosition(block.parent_id))?;
        if parent.number.checked_add(1) != Some(block.number) {
            return Err(ChainError::Storage(format!(
                "block {} has number {} but its parent is at {}",
                block.id, block.number, parent.number
            )));
        }

        // Walk back from the new block to the first canonical ancestor.
        let mut branch = vec![block.id];
        let mut cursor = parent;
        while !state.is_canonical(cursor) {
            branch.push(cursor.id);
            cursor = state.parent_of(cursor)?;
        }
        let fork_number = cursor.number;
        let keep = (fork_number - state.base) as usize + 1;
        let dropped = state.canonical.len() - keep;
        if dropped > 0 {
            tracing::info!(
                fork_number,
                depth = dropped,
                new_head = block.number,
                "Chain reorganized"
            );
        }

        state.canonical.truncate(keep);
        state.canonical.extend(branch.into_iter().rev());
        if !known {
            state.blocks.insert(block.id, block);
        }
        Ok(())
    }

    /// The current best block.
    pub fn best(&self) -> RawBlock {
        self.state.read().unwrap_or_else(PoisonError::into_inner).head().clone()
    }

    /// The canonical block id at `number`, if any.
    pub fn canonical_id(&self, number: u32) -> Option<B256> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).canonical_id(number)
    }

    /// Look up any known block, canonical or not.
    pub fn get(&self, id: &B256) -> Option<RawBlock> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).blocks.get(id).cloned()
    }
}

impl ChainStore for InMemoryChain {
    type Reader = MemoryBlockCursor;

    fn block_reader(&self, position: ChainPosition) -> MemoryBlockCursor {
        let cursor = match position {
            ChainPosition::Best => self.best().id,
            ChainPosition::Block(id) => id,
        };
        MemoryBlockCursor {
            state: Arc::clone(&self.state),
            cursor,
            batch_limit: self.batch_limit,
        }
    }
}

/// A positioned cursor over an [`InMemoryChain`].
///
/// `cursor` is the id of the last block handed out (or the starting block).
pub struct MemoryBlockCursor {
    state: Arc<RwLock<ChainState>>,
    cursor: B256,
    batch_limit: Option<usize>,
}

impl BlockSource for MemoryBlockCursor {
    fn read(&mut self) -> Result<Vec<ExtendedBlock>, ChainError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let limit = self.batch_limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();

        let mut current = state
            .blocks
            .get(&self.cursor)
            .ok_or(ChainError::UnknownPosition(self.cursor))?;

        // Abandoned fork: undo back to the fork point, newest first.
        while !state.is_canonical(current) && out.len() < limit {
            out.push(ExtendedBlock::obsolete(current.clone()));
            current = state.parent_of(current)?;
        }

        if state.is_canonical(current) {
            let mut next = current.number + 1;
            while out.len() < limit {
                let Some(id) = state.canonical_id(next) else { break };
                current = &state.blocks[&id];
                out.push(ExtendedBlock::canonical(current.clone()));
                next += 1;
            }
        }

        self.cursor = current.id;
        Ok(out)
    }
}

// ─── Log store ────────────────────────────────────────────────────────────────

/// In-memory log database.
#[derive(Default)]
pub struct InMemoryLogStore {
    logs: Mutex<Vec<RawLog>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a log.
    pub fn insert(&self, log: RawLog) {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).push(log);
    }

    /// Number of stored logs.
    pub fn len(&self) -> usize {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no logs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn in_range(range: Option<&Range>, log: &RawLog) -> bool {
    match range {
        None => true,
        Some(r) => match r.unit {
            RangeUnit::Block => r.contains(u64::from(log.block_number)),
            RangeUnit::Time => r.contains(log.block_time),
        },
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn filter_events(&self, query: &LogQuery) -> Result<Vec<RawLog>, FeedError> {
        let logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);

        let mut matched: Vec<RawLog> = logs
            .iter()
            .filter(|log| in_range(query.range.as_ref(), log) && query.matches(log))
            .cloned()
            .collect();
        drop(logs);

        // Stable: logs within a block keep insertion order.
        matched.sort_by_key(|log| log.block_number);
        if query.order == Order::Desc {
            matched.reverse();
        }

        if let Some(opts) = query.options {
            let offset = usize::try_from(opts.offset).unwrap_or(usize::MAX);
            let limit = usize::try_from(opts.limit).unwrap_or(usize::MAX);
            matched = matched.into_iter().skip(offset).take(limit).collect();
        }

        tracing::trace!(matched = matched.len(), "In-memory log query");
        Ok(matched)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
