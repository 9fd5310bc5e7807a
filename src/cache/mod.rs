//! Partitioned page cache for the four paginated collection queries.
//!
//! Each collection owns a [`CollectionCache`]: partitions keyed by
//! [`Fingerprint`], each accumulating pages for one logical filter. All
//! mutation flows through the merge engine; consumers only read snapshots.

mod fingerprint;
mod merge;

pub use fingerprint::Fingerprint;
pub use merge::{CollectionPage, MergePolicy, merge};

use std::collections::HashMap;

use crate::api::{Entity, QueryName};

pub struct CollectionCache<T> {
    query: QueryName,
    policy: MergePolicy,
    partitions: HashMap<Fingerprint, CollectionPage<T>>,
}

impl<T: Entity> CollectionCache<T> {
    pub fn new(query: QueryName, policy: MergePolicy) -> Self {
        Self {
            query,
            policy,
            partitions: HashMap::new(),
        }
    }

    pub fn query(&self) -> QueryName {
        self.query
    }

    pub fn get(&self, fingerprint: Fingerprint) -> Option<&CollectionPage<T>> {
        self.partitions.get(&fingerprint)
    }

    pub fn len(&self, fingerprint: Fingerprint) -> usize {
        self.get(fingerprint).map(CollectionPage::len).unwrap_or(0)
    }

    pub fn is_empty(&self, fingerprint: Fingerprint) -> bool {
        self.len(fingerprint) == 0
    }

    /// Whether the partition may have more pages. A partition that has never
    /// received a page reports true: nothing is known about its total yet,
    /// and a failed first fetch must stay retryable.
    pub fn has_more(&self, fingerprint: Fingerprint) -> bool {
        self.get(fingerprint)
            .map(CollectionPage::has_more)
            .unwrap_or(true)
    }

    /// Merge an incoming page into the partition, creating it on first use.
    pub fn apply(
        &mut self,
        fingerprint: Fingerprint,
        incoming: CollectionPage<T>,
    ) -> &CollectionPage<T> {
        let merged = merge(self.partitions.get(&fingerprint), incoming, self.policy);
        let slot = self.partitions.entry(fingerprint).or_default();
        *slot = merged;
        slot
    }

    /// Drop every partition except the active one. Called when the filter
    /// changes: superseded partitions are unreferenced and never revisited.
    pub fn evict_stale(&mut self, active: Fingerprint) {
        self.partitions.retain(|fp, _| *fp == active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Performer;
    use crate::filter::{FindFilter, SortDirection};

    fn performers(ids: &[&str]) -> Vec<Performer> {
        ids.iter()
            .map(|id| Performer {
                id: (*id).to_string(),
                name: format!("performer-{id}"),
                image_path: None,
            })
            .collect()
    }

    fn fp(q: &str) -> Fingerprint {
        Fingerprint::of(
            QueryName::Performers,
            &FindFilter::new().query(q).sort("name", SortDirection::Asc),
            None,
        )
    }

    #[test]
    fn unknown_partition_reports_more_available() {
        let cache = CollectionCache::<Performer>::new(QueryName::Performers, MergePolicy::DedupById);
        assert!(cache.has_more(fp("anna")));
        assert_eq!(cache.len(fp("anna")), 0);
    }

    #[test]
    fn apply_accumulates_pages_per_partition() {
        let mut cache =
            CollectionCache::<Performer>::new(QueryName::Performers, MergePolicy::DedupById);

        cache.apply(fp("anna"), CollectionPage::new(performers(&["1", "2"]), 3));
        cache.apply(fp("anna"), CollectionPage::new(performers(&["2", "3"]), 3));
        cache.apply(fp("ben"), CollectionPage::new(performers(&["9"]), 1));

        assert_eq!(cache.len(fp("anna")), 3);
        assert!(!cache.has_more(fp("anna")));
        assert_eq!(cache.len(fp("ben")), 1);
    }

    #[test]
    fn evict_stale_keeps_only_the_active_partition() {
        let mut cache =
            CollectionCache::<Performer>::new(QueryName::Performers, MergePolicy::DedupById);
        cache.apply(fp("anna"), CollectionPage::new(performers(&["1"]), 2));
        cache.apply(fp("ben"), CollectionPage::new(performers(&["9"]), 1));

        cache.evict_stale(fp("ben"));

        assert!(cache.get(fp("anna")).is_none());
        assert!(cache.get(fp("ben")).is_some());
    }
}
