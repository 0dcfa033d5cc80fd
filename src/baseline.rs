use crate::{
    metrics,
    snapshot::Snapshot,
};
use std::collections::HashMap;

/// Cumulative counter values of the previous sample, per entity and metric.
///
/// Always built from a single snapshot. An entity that is missing from that
/// snapshot has no entry, so it cannot produce deltas against stale values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    values: HashMap<String, HashMap<&'static str, i64>>,
}

impl Baseline {
    pub fn rebuild(snapshot: &Snapshot) -> Self {
        let mut values: HashMap<String, HashMap<&'static str, i64>> = HashMap::new();
        for record in snapshot.aggregates() {
            if values.contains_key(record.name()) {
                warn!(entity = record.name(), "Several backends share this name once dots are replaced, keeping the last");
            }
            let counters = values.entry(record.name().to_string()).or_default();
            for def in metrics::counters() {
                match record.value(def.position) {
                    Ok(value) => {
                        counters.insert(def.name, value);
                    }
                    Err(err) => {
                        debug!(entity = record.name(), metric = def.name, %err, "No baseline for metric");
                    }
                }
            }
        }
        Self { values }
    }

    pub fn get(&self, entity: &str, metric: &str) -> Option<i64> {
        self.values.get(entity)?.get(metric).copied()
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.values.contains_key(entity)
    }

    /// Number of entities with a baseline.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
