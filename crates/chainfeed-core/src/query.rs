//! Event query service: translate a client filter, run it against the log
//! store, and project the results.

use async_trait::async_trait;

use crate::config::QueryConfig;
use crate::error::FeedError;
use crate::event::{FilteredEvent, RawLog};
use crate::filter::{EventFilter, LogQuery};
use crate::types::Options;

/// The log database. Range, pagination and ordering semantics are its own.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Return the logs matching `query`.
    async fn filter_events(&self, query: &LogQuery) -> Result<Vec<RawLog>, FeedError>;
}

/// Answers event filter requests against a [`LogStore`].
pub struct EventQueryService<S> {
    store: S,
    config: QueryConfig,
}

impl<S: LogStore> EventQueryService<S> {
    pub fn new(store: S, config: QueryConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `filter` and return matching events in store order.
    ///
    /// Requests without options get `limit = logs_limit`; requests asking for
    /// more than `logs_limit` are rejected.
    pub async fn filter(&self, mut filter: EventFilter) -> Result<Vec<FilteredEvent>, FeedError> {
        let limit = self.config.logs_limit;
        match filter.options {
            None => filter.options = Some(Options { offset: 0, limit }),
            Some(opts) if opts.limit > limit => {
                return Err(FeedError::InvalidFilter(format!(
                    "options.limit {} exceeds the maximum allowed value of {limit}",
                    opts.limit
                )));
            }
            Some(_) => {}
        }

        let query = LogQuery::from(&filter);
        tracing::debug!(
            criteria = query.criteria_set.len(),
            order = ?query.order,
            range = ?query.range,
            "Filtering events"
        );

        let logs = self.store.filter_events(&query).await?;
        Ok(logs.iter().map(FilteredEvent::from).collect())
    }
}
