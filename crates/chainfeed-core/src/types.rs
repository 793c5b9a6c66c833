//! Shared types: chain positions and the opaque query range/options/order.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

// ─── ChainPosition ────────────────────────────────────────────────────────────

/// A point in the canonical chain from which a reader starts.
///
/// Only the chain engine interprets a position; the reader passes it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainPosition {
    /// The chain tip at the moment the reader is created.
    Best,
    /// A specific block id.
    Block(B256),
}

impl From<B256> for ChainPosition {
    fn from(id: B256) -> Self {
        Self::Block(id)
    }
}

impl std::fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::Block(id) => write!(f, "{id}"),
        }
    }
}

// ─── Range / Options / Order ──────────────────────────────────────────────────

/// Unit of a query [`Range`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    /// Block numbers.
    #[default]
    Block,
    /// Block timestamps (Unix seconds).
    Time,
}

/// Inclusive range of blocks or timestamps a log query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub unit: RangeUnit,
    pub from: u64,
    pub to: u64,
}

impl Range {
    pub fn blocks(from: u64, to: u64) -> Self {
        Self { unit: RangeUnit::Block, from, to }
    }

    pub fn time(from: u64, to: u64) -> Self {
        Self { unit: RangeUnit::Time, from, to }
    }

    /// Returns `true` if `value` lies within `[from, to]`.
    pub fn contains(&self, value: u64) -> bool {
        self.from <= value && value <= self.to
    }
}

/// Pagination applied by the log store after matching and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub offset: u64,
    pub limit: u64,
}

/// Result ordering of a log query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive() {
        let r = Range::blocks(10, 20);
        assert!(r.contains(10));
        assert!(r.contains(20));
        assert!(!r.contains(21));
        assert!(!r.contains(9));
    }

    #[test]
    fn position_display() {
        assert_eq!(ChainPosition::Best.to_string(), "best");
        let id = B256::repeat_byte(0xab);
        assert_eq!(ChainPosition::from(id).to_string(), id.to_string());
    }

    #[test]
    fn order_and_unit_deserialize_lowercase() {
        let order: Order = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, Order::Desc);
        let range: Range = serde_json::from_str(r#"{"unit":"time","from":1,"to":2}"#).unwrap();
        assert_eq!(range, Range::time(1, 2));
        let range: Range = serde_json::from_str(r#"{"from":5,"to":6}"#).unwrap();
        assert_eq!(range.unit, RangeUnit::Block);
    }
}
