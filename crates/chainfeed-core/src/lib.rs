//! chainfeed-core — client-facing block streaming and event queries.
//!
//! # Architecture
//!
//! ```text
//! EventFilter ──translate──▶ LogQuery ──LogStore──▶ RawLog ──project──▶ FilteredEvent
//!
//! ChainPosition ──ChainStore──▶ BlockSource ──BlockReader──▶ BlockMessage
//!                                 (reorg rewind lives here)
//! ```
//!
//! The chain engine and the log database are external collaborators, reached
//! through the [`ChainStore`]/[`BlockSource`] and [`LogStore`] traits.

pub mod block;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod query;
pub mod reader;
pub mod types;

pub use block::{project_block, BlockMessage, ExtendedBlock, RawBlock};
pub use config::{FeedConfig, LogConfig, QueryConfig, ReaderConfig};
pub use error::{ChainError, FeedError};
pub use event::{project_event, FilteredEvent, LogMeta, RawLog};
pub use filter::{translate, EventCriteria, EventFilter, LogQuery, TopicSet};
pub use query::{EventQueryService, LogStore};
pub use reader::{BlockReader, BlockSource, ChainStore, ReadBatch};
pub use types::{ChainPosition, Options, Order, Range, RangeUnit};
