mod client;
mod error;
mod types;
pub mod urls;

pub use client::StashClient;
pub use error::ApiError;
pub use types::{
    Entity, Performer, PerformerRef, QueryName, Scene, SceneFiles, ScenePaths, Studio, StudioRef,
    Tag, TagRef, format_duration,
};
