//! Client-side core for browsing a Stash-compatible GraphQL media catalog.
//!
//! The interesting part is the caching/pagination layer between a UI and the
//! remote catalog: cache partitions keyed by a filter fingerprint, per-query
//! merge policies that append pages while de-duplicating by id, and a
//! visibility-triggered fetch coordinator that decides when to request the
//! next page for each of the independently paginated collections.

pub mod api;
pub mod cache;
pub mod cli;
pub mod filter;
pub mod paginate;
pub mod recommend;
pub mod scroll;
pub mod settings;

#[cfg(test)]
mod test_utils;

pub use api::{ApiError, Entity, Performer, QueryName, Scene, StashClient, Studio, Tag};
pub use cache::{CollectionCache, CollectionPage, Fingerprint, MergePolicy};
pub use filter::{FindFilter, SceneFilter, SortDirection};
pub use paginate::{FetchCoordinator, PaginatedSnapshot, PartitionChanged};
pub use scroll::{ObserverConfig, OffsetObserver, SentinelId, TriggerSensor, VisibilityObserver};
