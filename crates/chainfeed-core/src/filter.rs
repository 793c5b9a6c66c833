//! Event filter translation.
//!
//! A client [`EventFilter`] holds one optional address and a list of
//! [`TopicSet`]s. Topic sets are alternatives (OR); inside a set every present
//! slot must match (AND); an absent slot matches anything. The log store only
//! understands a flat list of [`EventCriteria`], each an (address, five-slot)
//! pair, and ORs across the list. [`translate`] maps one onto the other.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::event::{RawLog, TOPIC_SLOTS};
use crate::types::{Options, Order, Range};

// ─── Client filter ────────────────────────────────────────────────────────────

/// One alternative of an event filter. Absent slots are "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSet {
    #[serde(default)]
    pub topic0: Option<B256>,
    #[serde(default)]
    pub topic1: Option<B256>,
    #[serde(default)]
    pub topic2: Option<B256>,
    #[serde(default)]
    pub topic3: Option<B256>,
    #[serde(default)]
    pub topic4: Option<B256>,
}

impl TopicSet {
    /// A set constraining only slot 0 (the event signature).
    pub fn signature(topic0: B256) -> Self {
        Self { topic0: Some(topic0), ..Default::default() }
    }

    /// Constrain slot `index`. Indices past the last slot are ignored.
    pub fn with_topic(mut self, index: usize, topic: B256) -> Self {
        match index {
            0 => self.topic0 = Some(topic),
            1 => self.topic1 = Some(topic),
            2 => self.topic2 = Some(topic),
            3 => self.topic3 = Some(topic),
            4 => self.topic4 = Some(topic),
            _ => {}
        }
        self
    }

    /// The five slots in position order.
    pub fn slots(&self) -> [Option<B256>; TOPIC_SLOTS] {
        [self.topic0, self.topic1, self.topic2, self.topic3, self.topic4]
    }
}

/// Event filter as accepted from clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub topic_sets: Vec<TopicSet>,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default)]
    pub options: Option<Options>,
    #[serde(default)]
    pub order: Order,
}

impl EventFilter {
    /// A filter for a single contract address.
    pub fn address(address: Address) -> Self {
        Self { address: Some(address), ..Default::default() }
    }

    /// Add a topic set alternative.
    pub fn topic_set(mut self, set: TopicSet) -> Self {
        self.topic_sets.push(set);
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn options(mut self, offset: u64, limit: u64) -> Self {
        self.options = Some(Options { offset, limit });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

// ─── Canonical criteria ───────────────────────────────────────────────────────

/// One disjunct of a log query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCriteria {
    pub address: Option<Address>,
    pub topics: [Option<B256>; TOPIC_SLOTS],
}

impl EventCriteria {
    /// Returns `true` if `log` satisfies every constraint of this criteria.
    ///
    /// A present slot requires the log to carry exactly that topic at the same
    /// position; a log with no topic there does not match.
    pub fn matches(&self, log: &RawLog) -> bool {
        if self.address.is_some_and(|a| a != log.address) {
            return false;
        }
        self.topics
            .iter()
            .zip(log.topics.iter())
            .all(|(want, have)| want.is_none() || want == have)
    }
}

/// The query handed to the log store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    /// Alternatives; empty means "match every log".
    pub criteria_set: Vec<EventCriteria>,
    pub range: Option<Range>,
    pub options: Option<Options>,
    pub order: Order,
}

impl LogQuery {
    /// Returns `true` if `log` satisfies any criteria, or the set is empty.
    pub fn matches(&self, log: &RawLog) -> bool {
        self.criteria_set.is_empty() || self.criteria_set.iter().any(|c| c.matches(log))
    }
}

impl From<&EventFilter> for LogQuery {
    fn from(filter: &EventFilter) -> Self {
        Self {
            criteria_set: translate(filter),
            range: filter.range,
            options: filter.options,
            order: filter.order,
        }
    }
}

/// Translate a client filter into canonical criteria. Never fails.
///
/// - one criteria per topic set, in input order, each carrying the filter address;
/// - no topic sets but an address: a single address-only criteria;
/// - neither: an empty list.
pub fn translate(filter: &EventFilter) -> Vec<EventCriteria> {
    if !filter.topic_sets.is_empty() {
        return filter
            .topic_sets
            .iter()
            .map(|set| EventCriteria { address: filter.address, topics: set.slots() })
            .collect();
    }
    match filter.address {
        Some(address) => vec![EventCriteria { address: Some(address), ..Default::default() }],
        None => Vec::new(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    fn t(b: u8) -> B256 {
        B256::repeat_byte(b)
    }

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    fn log(address: Address, topics: [Option<B256>; TOPIC_SLOTS]) -> RawLog {
        RawLog {
            address,
            topics,
            data: Bytes::new(),
            block_id: B256::ZERO,
            block_number: 1,
            block_time: 10,
            tx_id: B256::ZERO,
            tx_origin: Address::ZERO,
            clause_index: 0,
        }
    }

    #[test]
    fn two_topic_sets_share_the_address() {
        let sig1 = t(0x51);
        let sig2 = t(0x52);
        let arg = t(0xa1);
        let filter = EventFilter::address(addr(0xaa))
            .topic_set(TopicSet::signature(sig1))
            .topic_set(TopicSet::signature(sig2).with_topic(1, arg));

        let criteria = translate(&filter);
        assert_eq!(
            criteria,
            vec![
                EventCriteria {
                    address: Some(addr(0xaa)),
                    topics: [Some(sig1), None, None, None, None],
                },
                EventCriteria {
                    address: Some(addr(0xaa)),
                    topics: [Some(sig2), Some(arg), None, None, None],
                },
            ]
        );
    }

    #[test]
    fn one_entry_per_topic_set_without_address() {
        let filter = EventFilter::default()
            .topic_set(TopicSet::signature(t(1)))
            .topic_set(TopicSet::default().with_topic(4, t(2)))
            .topic_set(TopicSet::default().with_topic(2, t(3)));
        let criteria = translate(&filter);
        assert_eq!(criteria.len(), 3);
        assert!(criteria.iter().all(|c| c.address.is_none()));
        assert_eq!(criteria[1].topics, [None, None, None, None, Some(t(2))]);
        assert_eq!(criteria[2].topics, [None, None, Some(t(3)), None, None]);
    }

    #[test]
    fn address_only_yields_single_unconstrained_entry() {
        let criteria = translate(&EventFilter::address(addr(0xaa)));
        assert_eq!(
            criteria,
            vec![EventCriteria { address: Some(addr(0xaa)), topics: [None; TOPIC_SLOTS] }]
        );
    }

    #[test]
    fn empty_filter_yields_empty_set() {
        assert!(translate(&EventFilter::default()).is_empty());
        let query = LogQuery::from(&EventFilter::default());
        assert!(query.matches(&log(addr(1), [None; TOPIC_SLOTS])));
    }

    #[test]
    fn all_dont_care_set_is_kept() {
        let filter = EventFilter::default().topic_set(TopicSet::default());
        let criteria = translate(&filter);
        assert_eq!(criteria, vec![EventCriteria::default()]);
        assert!(criteria[0].matches(&log(addr(7), [Some(t(1)), None, None, None, None])));
    }

    #[test]
    fn translation_is_order_stable() {
        let filter = EventFilter::address(addr(2))
            .topic_set(TopicSet::signature(t(9)))
            .topic_set(TopicSet::signature(t(8)));
        assert_eq!(translate(&filter), translate(&filter));
        assert_eq!(translate(&filter)[0].topics[0], Some(t(9)));
    }

    #[test]
    fn query_carries_range_options_order() {
        let filter = EventFilter::address(addr(1))
            .range(Range::blocks(5, 9))
            .options(2, 10)
            .order(Order::Desc);
        let query = LogQuery::from(&filter);
        assert_eq!(query.range, Some(Range::blocks(5, 9)));
        assert_eq!(query.options, Some(Options { offset: 2, limit: 10 }));
        assert_eq!(query.order, Order::Desc);
        assert_eq!(query.criteria_set.len(), 1);
    }

    #[test]
    fn criteria_and_within_set() {
        let c = EventCriteria {
            address: None,
            topics: [Some(t(1)), Some(t(2)), None, None, None],
        };
        assert!(c.matches(&log(addr(1), [Some(t(1)), Some(t(2)), Some(t(3)), None, None])));
        assert!(!c.matches(&log(addr(1), [Some(t(1)), Some(t(3)), None, None, None])));
        // A present slot never matches an absent log topic.
        assert!(!c.matches(&log(addr(1), [Some(t(1)), None, None, None, None])));
    }

    #[test]
    fn criteria_address_is_anded() {
        let c = EventCriteria {
            address: Some(addr(0xaa)),
            topics: [Some(t(1)), None, None, None, None],
        };
        assert!(c.matches(&log(addr(0xaa), [Some(t(1)), None, None, None, None])));
        assert!(!c.matches(&log(addr(0xbb), [Some(t(1)), None, None, None, None])));
    }

    #[test]
    fn query_ors_across_sets() {
        let filter = EventFilter::address(addr(0xaa))
            .topic_set(TopicSet::signature(t(1)))
            .topic_set(TopicSet::signature(t(2)).with_topic(1, t(3)));
        let query = LogQuery::from(&filter);
        assert!(query.matches(&log(addr(0xaa), [Some(t(1)), Some(t(9)), None, None, None])));
        assert!(query.matches(&log(addr(0xaa), [Some(t(2)), Some(t(3)), None, None, None])));
        assert!(!query.matches(&log(addr(0xaa), [Some(t(2)), Some(t(4)), None, None, None])));
        assert!(!query.matches(&log(addr(0xbb), [Some(t(1)), None, None, None, None])));
    }

    #[test]
    fn filter_deserializes_from_client_json() {
        let sets = format!(
            r#"{{"topic0":"{}"}},{{"topic0":"{}","topic1":"{}"}}"#,
            t(1),
            t(2),
            t(3)
        );
        let json = format!(
            r#"{{"address":"{}","topicSets":[{}],"order":"desc"}}"#,
            addr(0xaa),
            sets
        );
        let filter: EventFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(filter.address, Some(addr(0xaa)));
        assert_eq!(filter.topic_sets.len(), 2);
        assert_eq!(filter.topic_sets[1].topic1, Some(t(3)));
        assert_eq!(filter.topic_sets[1].topic2, None);
        assert_eq!(filter.order, Order::Desc);
        assert!(filter.range.is_none());
    }
}
