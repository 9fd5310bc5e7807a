use std::collections::HashSet;

use crate::api::Entity;

/// One page of results as reported by the catalog, or the accumulated set of
/// pages for a cache partition. `total` is the server-reported count of items
/// available under the partition's filter.
#[derive(Debug, Clone)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub total: u32,
}

impl<T> CollectionPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn new(items: Vec<T>, total: u32) -> Self {
        Self { items, total }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True while the accumulated items have not reached the server count.
    pub fn has_more(&self) -> bool {
        self.items.len() < self.total as usize
    }
}

impl<T> Default for CollectionPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// How an incoming page combines with a partition's accumulated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Append only items whose id is not already present. Used where pages
    /// can overlap, e.g. a page refetched after an upstream deletion shifted
    /// the offsets. Idempotent: merging the same page twice is a no-op.
    DedupById,
    /// Straight append. Used where the paginated source guarantees disjoint
    /// pages, so the id scan is unnecessary.
    Append,
}

/// Merge an incoming page into the accumulated set for a partition.
///
/// Accumulated items keep their relative order; incoming items append after
/// them, so prior scroll positions stay stable. The result's `total` is
/// always the incoming page's count: the remote is authoritative and may
/// revise it between pages.
pub fn merge<T: Entity>(
    existing: Option<&CollectionPage<T>>,
    incoming: CollectionPage<T>,
    policy: MergePolicy,
) -> CollectionPage<T> {
    let Some(existing) = existing else {
        return incoming;
    };

    let mut items = existing.items.clone();
    match policy {
        MergePolicy::DedupById => {
            let seen: HashSet<&str> = items.iter().map(|item| item.id()).collect();
            let fresh: Vec<T> = incoming
                .items
                .into_iter()
                .filter(|item| !seen.contains(item.id()))
                .collect();
            items.extend(fresh);
        }
        MergePolicy::Append => {
            items.extend(incoming.items);
        }
    }

    CollectionPage {
        items,
        total: incoming.total,
    }
}
