use serde::Serialize;

/// Common find filter sent with every collection query.
///
/// `page` and `per_page` are pagination cursor fields; everything else is
/// semantic and participates in cache partitioning (see [`crate::cache`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FindFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl FindFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = Some(direction);
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    /// The free-text query, normalized so that an empty string and an absent
    /// field are the same thing.
    pub fn semantic_query(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// How a multi-valued criterion matches against an entity's references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CriterionModifier {
    #[serde(rename = "INCLUDES_ALL")]
    IncludesAll,
    #[serde(rename = "INCLUDES_ANY")]
    IncludesAny,
    #[serde(rename = "EXCLUDES")]
    Excludes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MultiCriterion {
    pub value: Vec<String>,
    pub modifier: CriterionModifier,
}

impl MultiCriterion {
    pub fn includes_all(ids: Vec<String>) -> Self {
        Self {
            value: ids,
            modifier: CriterionModifier::IncludesAll,
        }
    }

    pub fn includes_any(ids: Vec<String>) -> Self {
        Self {
            value: ids,
            modifier: CriterionModifier::IncludesAny,
        }
    }
}

/// Structured predicate for scene queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SceneFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<MultiCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studios: Option<MultiCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performers: Option<MultiCriterion>,
}

impl SceneFilter {
    /// True when no criterion is set; an empty filter is sent as absent.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.studios.is_none() && self.performers.is_none()
    }
}
