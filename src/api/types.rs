use serde::Deserialize;

/// Anything cached in a collection partition. The id is the identity used
/// for de-duplication when pages overlap.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

/// The four paginated collection queries used by the browse UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryName {
    Scenes,
    Tags,
    Performers,
    Studios,
}

impl QueryName {
    pub fn label(&self) -> &'static str {
        match self {
            QueryName::Scenes => "scenes",
            QueryName::Tags => "tags",
            QueryName::Performers => "performers",
            QueryName::Studios => "studios",
        }
    }

    pub fn all() -> &'static [QueryName] {
        &[
            QueryName::Scenes,
            QueryName::Tags,
            QueryName::Performers,
            QueryName::Studios,
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    pub id: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub details: Option<String>,
    pub rating100: Option<u32>,
    #[serde(default)]
    pub files: SceneFiles,
    #[serde(default)]
    pub paths: ScenePaths,
    pub studio: Option<StudioRef>,
    #[serde(default)]
    pub performers: Vec<PerformerRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl Scene {
    pub fn duration_secs(&self) -> f64 {
        self.files.duration.unwrap_or(0.0)
    }

    /// Title to display, falling back to the scene id for untitled scenes.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.id,
        }
    }

    /// Rating on a 0-10 scale, from the catalog's 0-100 representation.
    pub fn rating(&self) -> f64 {
        self.rating100.map(|r| f64::from(r) / 10.0).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneFiles {
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenePaths {
    pub screenshot: Option<String>,
    pub preview: Option<String>,
    pub stream: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudioRef {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformerRef {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Performer {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Studio {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
}

impl Entity for Scene {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Tag {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Performer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Studio {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Format a duration in seconds as `h:mm:ss`, or `m:ss` under an hour.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
