//! chainfeed-storage — reference chain engine and log store backends.
//!
//! Backends:
//! - [`memory`] — in-memory chain with reorg-aware cursors and an in-memory
//!   log store (dev/testing, no persistence)

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::{InMemoryChain, InMemoryLogStore, MemoryBlockCursor};
