//! Raw log records and their wire projection.
//!
//! The wire shape drops absent topic slots and keeps the order of the present
//! ones, so `[None, T1, None, T2, None]` becomes `[T1, T2]`. Existing consumers
//! rely on that compacted array; it must not be widened back to five slots.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Number of topic slots a log record carries.
pub const TOPIC_SLOTS: usize = 5;

// ─── RawLog ───────────────────────────────────────────────────────────────────

/// An indexed event log as stored by the log database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// Contract that emitted the log.
    pub address: Address,
    /// Topic slots 0..4; slot 0 is conventionally the event signature.
    pub topics: [Option<B256>; TOPIC_SLOTS],
    /// Non-indexed payload.
    pub data: Bytes,
    #[serde(rename = "blockID")]
    pub block_id: B256,
    pub block_number: u32,
    pub block_time: u64,
    #[serde(rename = "txID")]
    pub tx_id: B256,
    pub tx_origin: Address,
    /// Position of the emitting clause within its transaction.
    pub clause_index: u32,
}

// ─── Wire shapes ──────────────────────────────────────────────────────────────

/// Location of an event in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMeta {
    #[serde(rename = "blockID")]
    pub block_id: B256,
    #[serde(rename = "blockNumber")]
    pub block_number: u32,
    #[serde(rename = "blockTimestamp")]
    pub block_timestamp: u64,
    #[serde(rename = "txID")]
    pub tx_id: B256,
    #[serde(rename = "txOrigin")]
    pub tx_origin: Address,
    #[serde(rename = "clauseIndex")]
    pub clause_index: u32,
}

/// An event as returned to clients. Always from a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredEvent {
    pub address: Address,
    /// Present topics only, in slot order.
    pub topics: Vec<B256>,
    /// `0x`-prefixed lowercase hex.
    pub data: String,
    pub meta: LogMeta,
}

impl From<&RawLog> for FilteredEvent {
    fn from(log: &RawLog) -> Self {
        Self {
            address: log.address,
            topics: log.topics.iter().flatten().copied().collect(),
            data: encode_data(&log.data),
            meta: LogMeta {
                block_id: log.block_id,
                block_number: log.block_number,
                block_timestamp: log.block_time,
                tx_id: log.tx_id,
                tx_origin: log.tx_origin,
                clause_index: log.clause_index,
            },
        }
    }
}

/// Project a raw log record into its wire shape.
pub fn project_event(log: &RawLog) -> FilteredEvent {
    FilteredEvent::from(log)
}

fn encode_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

impl std::fmt::Display for FilteredEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics: Vec<String> = self.topics.iter().map(|t| t.to_string()).collect();
        writeln!(f, "Event(")?;
        writeln!(f, "    address:        {},", self.address)?;
        writeln!(f, "    topics:         [{}],", topics.join(", "))?;
        writeln!(f, "    data:           {},", self.data)?;
        writeln!(f, "    meta: (blockID        {},", self.meta.block_id)?;
        writeln!(f, "           blockNumber    {},", self.meta.block_number)?;
        writeln!(f, "           blockTimestamp {},", self.meta.block_timestamp)?;
        writeln!(f, "           txID           {},", self.meta.tx_id)?;
        writeln!(f, "           txOrigin       {},", self.meta.tx_origin)?;
        writeln!(f, "           clauseIndex    {})", self.meta.clause_index)?;
        write!(f, ")")
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(b: u8) -> B256 {
        B256::repeat_byte(b)
    }

    fn raw(topics: [Option<B256>; TOPIC_SLOTS], data: &[u8]) -> RawLog {
        RawLog {
            address: Address::repeat_byte(0xaa),
            topics,
            data: Bytes::copy_from_slice(data),
            block_id: topic(0x01),
            block_number: 42,
            block_time: 1_700_000_000,
            tx_id: topic(0x02),
            tx_origin: Address::repeat_byte(0xbb),
            clause_index: 3,
        }
    }

    #[test]
    fn topics_drop_nulls_and_keep_order() {
        let log = raw([None, Some(topic(1)), None, Some(topic(2)), None], &[]);
        let ev = project_event(&log);
        assert_eq!(ev.topics, vec![topic(1), topic(2)]);
    }

    #[test]
    fn all_topics_present_are_kept_in_slot_order() {
        let slots = [1u8, 2, 3, 4, 5].map(|b| Some(topic(b)));
        let ev = project_event(&raw(slots, &[]));
        assert_eq!(ev.topics, (1u8..=5).map(topic).collect::<Vec<_>>());
    }

    #[test]
    fn no_topics_yields_empty_array() {
        let ev = project_event(&raw([None; TOPIC_SLOTS], &[]));
        assert!(ev.topics.is_empty());
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["topics"], serde_json::json!([]));
    }

    #[test]
    fn data_is_prefixed_lowercase_hex() {
        let ev = project_event(&raw([None; TOPIC_SLOTS], &[0xde, 0xAD, 0x0f]));
        assert_eq!(ev.data, "0xdead0f");
        let empty = project_event(&raw([None; TOPIC_SLOTS], &[]));
        assert_eq!(empty.data, "0x");
    }

    #[test]
    fn meta_copied_verbatim() {
        let log = raw([Some(topic(9)), None, None, None, None], &[1]);
        let ev = project_event(&log);
        assert_eq!(ev.address, log.address);
        assert_eq!(ev.meta.block_id, log.block_id);
        assert_eq!(ev.meta.block_number, 42);
        assert_eq!(ev.meta.block_timestamp, 1_700_000_000);
        assert_eq!(ev.meta.tx_id, log.tx_id);
        assert_eq!(ev.meta.tx_origin, log.tx_origin);
        assert_eq!(ev.meta.clause_index, 3);
    }

    #[test]
    fn wire_field_names() {
        let ev = project_event(&raw([None; TOPIC_SLOTS], &[]));
        let json = serde_json::to_value(&ev).unwrap();
        let meta = json["meta"].as_object().unwrap();
        for key in ["blockID", "blockNumber", "blockTimestamp", "txID", "txOrigin", "clauseIndex"] {
            assert!(meta.contains_key(key), "missing {key}");
        }
        assert_eq!(json["meta"]["blockNumber"], 42);
    }

    #[test]
    fn display_lists_every_field() {
        let ev = project_event(&raw([Some(topic(7)), None, None, None, None], &[0xff]));
        let text = ev.to_string();
        assert!(text.starts_with("Event("));
        assert!(text.contains("data:           0xff"));
        assert!(text.contains("clauseIndex    3"));
    }
}
