//! Test data builders for cache and pagination testing.

use crate::api::{Scene, SceneFiles, ScenePaths, StudioRef, Tag, TagRef};
use crate::cache::CollectionPage;

pub struct SceneBuilder {
    id: String,
    title: Option<String>,
    date: Option<String>,
    rating100: Option<u32>,
    duration: Option<f64>,
    screenshot: Option<String>,
    studio: Option<StudioRef>,
    tags: Vec<TagRef>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            id: "1".to_string(),
            title: Some("Test Scene".to_string()),
            date: Some("2024-06-01".to_string()),
            rating100: Some(80),
            duration: Some(615.0),
            screenshot: Some("/scene/1/screenshot".to_string()),
            studio: None,
            tags: Vec::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn rating100(mut self, rating: u32) -> Self {
        self.rating100 = Some(rating);
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn studio(mut self, id: &str, name: &str) -> Self {
        self.studio = Some(StudioRef {
            id: id.to_string(),
            name: name.to_string(),
            image_path: None,
        });
        self
    }

    pub fn tags(mut self, ids: &[&str]) -> Self {
        self.tags = ids
            .iter()
            .map(|id| TagRef {
                id: (*id).to_string(),
                name: format!("tag-{id}"),
            })
            .collect();
        self
    }

    pub fn build(self) -> Scene {
        Scene {
            id: self.id,
            title: self.title,
            date: self.date,
            details: None,
            rating100: self.rating100,
            files: SceneFiles {
                duration: self.duration,
            },
            paths: ScenePaths {
                screenshot: self.screenshot,
                preview: None,
                stream: None,
            },
            studio: self.studio,
            performers: Vec::new(),
            tags: self.tags,
        }
    }
}

pub struct TagBuilder {
    id: String,
    name: String,
}

impl Default for TagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TagBuilder {
    pub fn new() -> Self {
        Self {
            id: "1".to_string(),
            name: "test-tag".to_string(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn build(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
        }
    }
}

/// A page of tags with ids as given and generated names.
pub fn page_of_tags(ids: &[&str], total: u32) -> CollectionPage<Tag> {
    let items = ids
        .iter()
        .map(|id| TagBuilder::new().id(id).name(&format!("tag-{id}")).build())
        .collect();
    CollectionPage::new(items, total)
}

pub fn sample_scenes() -> Vec<Scene> {
    vec![
        SceneBuilder::new()
            .id("1")
            .title("Dawn over the ridge")
            .studio("s1", "Northlight")
            .tags(&["mountain", "sunrise"])
            .duration(432.0)
            .build(),
        SceneBuilder::new()
            .id("2")
            .title("Harbor timelapse")
            .studio("s2", "Sealine")
            .tags(&["ocean", "city"])
            .duration(180.0)
            .build(),
        SceneBuilder::new()
            .id("3")
            .title("Forest walk")
            .tags(&["forest", "mountain"])
            .duration(1520.0)
            .build(),
        SceneBuilder::new()
            .id("4")
            .untitled()
            .tags(&["ocean"])
            .build(),
    ]
}
