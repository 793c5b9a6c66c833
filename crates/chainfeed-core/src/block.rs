//! Block records and their wire projection.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A block as held by the chain engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub id: B256,
    pub number: u32,
    #[serde(rename = "parentID")]
    pub parent_id: B256,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub gas_limit: u64,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub beneficiary: Address,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub txs_root: B256,
    #[serde(default)]
    pub state_root: B256,
    #[serde(default)]
    pub receipts_root: B256,
    #[serde(default)]
    pub signer: Address,
    #[serde(default)]
    pub transactions: Vec<B256>,
}

/// A block returned by a positioned chain read.
///
/// `obsolete` is set when the engine re-emits a block that has left the
/// canonical chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedBlock {
    pub block: RawBlock,
    pub obsolete: bool,
}

impl ExtendedBlock {
    pub fn canonical(block: RawBlock) -> Self {
        Self { block, obsolete: false }
    }

    pub fn obsolete(block: RawBlock) -> Self {
        Self { block, obsolete: true }
    }
}

/// Block message sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMessage {
    pub number: u32,
    pub id: B256,
    pub size: u32,
    #[serde(rename = "parentID")]
    pub parent_id: B256,
    pub timestamp: u64,
    pub gas_limit: u64,
    pub beneficiary: Address,
    pub gas_used: u64,
    pub total_score: u64,
    pub txs_root: B256,
    pub state_root: B256,
    pub receipts_root: B256,
    pub signer: Address,
    pub transactions: Vec<B256>,
    pub obsolete: bool,
}

impl From<&ExtendedBlock> for BlockMessage {
    fn from(ext: &ExtendedBlock) -> Self {
        let b = &ext.block;
        Self {
            number: b.number,
            id: b.id,
            size: b.size,
            parent_id: b.parent_id,
            timestamp: b.timestamp,
            gas_limit: b.gas_limit,
            beneficiary: b.beneficiary,
            gas_used: b.gas_used,
            total_score: b.total_score,
            txs_root: b.txs_root,
            state_root: b.state_root,
            receipts_root: b.receipts_root,
            signer: b.signer,
            transactions: b.transactions.clone(),
            obsolete: ext.obsolete,
        }
    }
}

/// Project a chain block into a subscriber message.
pub fn project_block(block: &ExtendedBlock) -> BlockMessage {
    BlockMessage::from(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> RawBlock {
        RawBlock {
            id: B256::repeat_byte(2),
            number: 2,
            parent_id: B256::repeat_byte(1),
            timestamp: 1_000,
            size: 512,
            gas_limit: 10_000_000,
            gas_used: 21_000,
            beneficiary: Address::repeat_byte(0xbe),
            total_score: 7,
            txs_root: B256::repeat_byte(0x10),
            state_root: B256::repeat_byte(0x20),
            receipts_root: B256::repeat_byte(0x30),
            signer: Address::repeat_byte(0x51),
            transactions: vec![B256::repeat_byte(0x77)],
        }
    }

    #[test]
    fn message_copies_block_fields() {
        let msg = project_block(&ExtendedBlock::canonical(block()));
        assert_eq!(msg.number, 2);
        assert_eq!(msg.id, B256::repeat_byte(2));
        assert_eq!(msg.parent_id, B256::repeat_byte(1));
        assert_eq!(msg.gas_used, 21_000);
        assert_eq!(msg.signer, Address::repeat_byte(0x51));
        assert_eq!(msg.transactions, vec![B256::repeat_byte(0x77)]);
        assert!(!msg.obsolete);
    }

    #[test]
    fn obsolete_flag_is_carried() {
        let msg = project_block(&ExtendedBlock::obsolete(block()));
        assert!(msg.obsolete);
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_value(project_block(&ExtendedBlock::canonical(block()))).unwrap();
        let keys = [
            "parentID",
            "gasLimit",
            "gasUsed",
            "totalScore",
            "txsRoot",
            "receiptsRoot",
            "obsolete",
        ];
        for key in keys {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
