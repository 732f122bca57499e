use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::metrics::{Counters, MetricRow, RowIdentity};

type KeyFn<K> = Box<dyn Fn(&MetricRow) -> K + Send + Sync>;
type IdentityFn<K> = Box<dyn Fn(&K, &MetricRow) -> RowIdentity + Send + Sync>;

/// Groups rows by a key and sums their counters. Ratios are derived once per
/// group from the sums, never averaged across source rows.
pub struct BaseMetricsAggregator<K> {
    key_fn: KeyFn<K>,
    identity_fn: IdentityFn<K>,
}

impl<K> BaseMetricsAggregator<K>
where
    K: Eq + Hash + Clone,
{
    /// Groups by `key_fn`; each group keeps the identity of its first row.
    pub fn new(key_fn: impl Fn(&MetricRow) -> K + Send + Sync + 'static) -> Self {
        Self {
            key_fn: Box::new(key_fn),
            identity_fn: Box::new(|_, first| first.identity.clone()),
        }
    }

    /// Overrides how a group's identity is built from its key and first row.
    pub fn with_identity(
        mut self,
        identity_fn: impl Fn(&K, &MetricRow) -> RowIdentity + Send + Sync + 'static,
    ) -> Self {
        self.identity_fn = Box::new(identity_fn);
        self
    }

    /// One row per key, in the order keys were first seen.
    pub fn aggregate(&self, rows: &[MetricRow]) -> Vec<(K, MetricRow)> {
        let mut positions: HashMap<K, usize> = HashMap::new();
        let mut buckets: Vec<(K, RowIdentity, Counters)> = Vec::new();

        for row in rows {
            let key = (self.key_fn)(row);
            match positions.get(&key) {
                Some(&idx) => buckets[idx].2.add(&row.counters),
                None => {
                    positions.insert(key.clone(), buckets.len());
                    let identity = (self.identity_fn)(&key, row);
                    buckets.push((key, identity, row.counters));
                }
            }
        }

        debug!("Aggregated {} rows into {} groups", rows.len(), buckets.len());

        buckets
            .into_iter()
            .map(|(key, identity, counters)| (key, MetricRow::new(identity, counters)))
            .collect()
    }
}

/// Groups `rows` by `key_fn`, keeping each group's first identity.
pub fn aggregate_by_key<K, F>(rows: &[MetricRow], key_fn: F) -> Vec<(K, MetricRow)>
where
    K: Eq + Hash + Clone,
    F: Fn(&MetricRow) -> K + Send + Sync + 'static,
{
    BaseMetricsAggregator::new(key_fn).aggregate(rows)
}

/// Sums every row into a single row carrying `label` as its name.
pub fn totals(rows: &[MetricRow], label: &str) -> MetricRow {
    let mut counters = Counters::default();
    for row in rows {
        counters.add(&row.counters);
    }
    MetricRow::new(RowIdentity::named(label), counters)
}
