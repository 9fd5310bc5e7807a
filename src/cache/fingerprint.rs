use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::api::QueryName;
use crate::filter::{FindFilter, SceneFilter};

/// Stable identity for "the same logical query, different page".
///
/// Derived from the semantic filter fields only; two requests that differ
/// only in `page`/`per_page` map to the same fingerprint so their results
/// accumulate into one cache partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(query: QueryName, filter: &FindFilter, scene_filter: Option<&SceneFilter>) -> Self {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        filter.semantic_query().hash(&mut hasher);
        filter.sort.hash(&mut hasher);
        filter.direction.hash(&mut hasher);
        // An empty structured filter and an absent one are the same query.
        scene_filter.filter(|f| !f.is_empty()).hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
