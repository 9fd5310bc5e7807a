use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::error::ApiError;
use super::types::{Performer, QueryName, Scene, Studio, Tag};
use crate::cache::{CollectionPage, MergePolicy};
use crate::filter::{FindFilter, SceneFilter};
use crate::paginate::{FetchCoordinator, PageRequest, PageResult, PageSource};
use crate::scroll::ObserverConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Scenes prefetch slightly before the sentinel is visible; the search
/// dropdown collections fetch right at the edge.
const SCENES_ROOT_MARGIN: f64 = 100.0;

const FIND_SCENES: &str = "\
query FindScenes($filter: FindFilterType, $scene_filter: SceneFilterType) {
  findScenes(filter: $filter, scene_filter: $scene_filter) {
    count
    scenes {
      id
      title
      date
      details
      rating100
      files { duration }
      paths { screenshot preview stream }
      studio { id name image_path }
      performers { id name image_path }
      tags { id name }
    }
  }
}";

const FIND_SCENE: &str = "\
query FindScene($id: ID!) {
  findScene(id: $id) {
    id
    title
    date
    details
    rating100
    files { duration }
    paths { screenshot preview stream }
    studio { id name image_path }
    performers { id name image_path }
    tags { id name }
  }
}";

const FIND_TAGS: &str = "\
query FindTags($filter: FindFilterType) {
  findTags(filter: $filter) {
    count
    tags { id name }
  }
}";

const FIND_PERFORMERS: &str = "\
query FindPerformers($filter: FindFilterType) {
  findPerformers(filter: $filter) {
    count
    performers { id name image_path }
  }
}";

const FIND_STUDIOS: &str = "\
query FindStudios($filter: FindFilterType) {
  findStudios(filter: $filter) {
    count
    studios { id name image_path }
  }
}";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct FindScenesData {
    #[serde(rename = "findScenes", default)]
    find_scenes: Paged<Scene>,
}

#[derive(Deserialize)]
struct FindSceneData {
    #[serde(rename = "findScene")]
    find_scene: Option<Scene>,
}

#[derive(Deserialize)]
struct FindTagsData {
    #[serde(rename = "findTags", default)]
    find_tags: Paged<Tag>,
}

#[derive(Deserialize)]
struct FindPerformersData {
    #[serde(rename = "findPerformers", default)]
    find_performers: Paged<Performer>,
}

#[derive(Deserialize)]
struct FindStudiosData {
    #[serde(rename = "findStudios", default)]
    find_studios: Paged<Studio>,
}

/// Raw paged result. A malformed payload with missing fields degrades to an
/// empty page instead of an error.
#[derive(Deserialize)]
struct Paged<T> {
    #[serde(default)]
    count: u32,
    #[serde(default, alias = "scenes", alias = "tags", alias = "performers", alias = "studios")]
    items: Vec<T>,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            count: 0,
            items: Vec::new(),
        }
    }
}

impl<T> From<Paged<T>> for CollectionPage<T> {
    fn from(paged: Paged<T>) -> Self {
        CollectionPage::new(paged.items, paged.count)
    }
}

/// Client for a Stash-compatible GraphQL catalog endpoint.
#[derive(Clone)]
pub struct StashClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl StashClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    async fn post<D: DeserializeOwned>(
        &self,
        operation: &'static str,
        document: &'static str,
        variables: Value,
    ) -> Result<D, ApiError> {
        debug!(operation, "posting query");
        let mut request = self.http.post(&self.endpoint).json(&json!({
            "query": document,
            "variables": variables,
        }));
        if let Some(key) = &self.api_key {
            request = request.header("ApiKey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(
                status.as_u16(),
                status.canonical_reason().unwrap_or("").into(),
            ));
        }

        let envelope: GraphQlResponse<D> = response.json().await?;
        if let Some(err) = envelope.errors.first() {
            return Err(ApiError::GraphQl(err.message.clone()));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Parse("response missing data".into()))
    }

    pub async fn find_scenes(
        &self,
        filter: &FindFilter,
        scene_filter: Option<&SceneFilter>,
    ) -> PageResult<Scene> {
        let scene_filter = scene_filter.filter(|f| !f.is_empty());
        let variables = json!({ "filter": filter, "scene_filter": scene_filter });
        let data: FindScenesData = self.post("FindScenes", FIND_SCENES, variables).await?;
        Ok(data.find_scenes.into())
    }

    pub async fn find_scene(&self, id: &str) -> Result<Option<Scene>, ApiError> {
        let data: FindSceneData = self
            .post("FindScene", FIND_SCENE, json!({ "id": id }))
            .await?;
        Ok(data.find_scene)
    }

    pub async fn find_tags(&self, filter: &FindFilter) -> PageResult<Tag> {
        let data: FindTagsData = self
            .post("FindTags", FIND_TAGS, json!({ "filter": filter }))
            .await?;
        Ok(data.find_tags.into())
    }

    pub async fn find_performers(&self, filter: &FindFilter) -> PageResult<Performer> {
        let data: FindPerformersData = self
            .post("FindPerformers", FIND_PERFORMERS, json!({ "filter": filter }))
            .await?;
        Ok(data.find_performers.into())
    }

    pub async fn find_studios(&self, filter: &FindFilter) -> PageResult<Studio> {
        let data: FindStudiosData = self
            .post("FindStudios", FIND_STUDIOS, json!({ "filter": filter }))
            .await?;
        Ok(data.find_studios.into())
    }

    /// Coordinator for the browse grid. Scene pages can overlap after
    /// upstream deletions shift offsets, so they merge with dedup.
    pub fn paginated_scenes(&self, page_size: u32) -> FetchCoordinator<Scene> {
        FetchCoordinator::new(
            QueryName::Scenes,
            MergePolicy::DedupById,
            Arc::new(ScenesSource {
                client: self.clone(),
            }),
            page_size,
            ObserverConfig {
                root_margin: SCENES_ROOT_MARGIN,
                ..Default::default()
            },
        )
    }

    pub fn paginated_tags(&self, page_size: u32) -> FetchCoordinator<Tag> {
        FetchCoordinator::new(
            QueryName::Tags,
            MergePolicy::Append,
            Arc::new(TagsSource {
                client: self.clone(),
            }),
            page_size,
            ObserverConfig::default(),
        )
    }

    pub fn paginated_performers(&self, page_size: u32) -> FetchCoordinator<Performer> {
        FetchCoordinator::new(
            QueryName::Performers,
            MergePolicy::DedupById,
            Arc::new(PerformersSource {
                client: self.clone(),
            }),
            page_size,
            ObserverConfig::default(),
        )
    }

    pub fn paginated_studios(&self, page_size: u32) -> FetchCoordinator<Studio> {
        FetchCoordinator::new(
            QueryName::Studios,
            MergePolicy::Append,
            Arc::new(StudiosSource {
                client: self.clone(),
            }),
            page_size,
            ObserverConfig::default(),
        )
    }
}

struct ScenesSource {
    client: StashClient,
}

impl PageSource<Scene> for ScenesSource {
    fn fetch(&self, request: PageRequest) -> BoxFuture<'static, PageResult<Scene>> {
        let client = self.client.clone();
        Box::pin(async move {
            client
                .find_scenes(&request.filter, request.scene_filter.as_ref())
                .await
        })
    }
}

struct TagsSource {
    client: StashClient,
}

impl PageSource<Tag> for TagsSource {
    fn fetch(&self, request: PageRequest) -> BoxFuture<'static, PageResult<Tag>> {
        let client = self.client.clone();
        Box::pin(async move { client.find_tags(&request.filter).await })
    }
}

struct PerformersSource {
    client: StashClient,
}

impl PageSource<Performer> for PerformersSource {
    fn fetch(&self, request: PageRequest) -> BoxFuture<'static, PageResult<Performer>> {
        let client = self.client.clone();
        Box::pin(async move { client.find_performers(&request.filter).await })
    }
}

struct StudiosSource {
    client: StashClient,
}

impl PageSource<Studio> for StudiosSource {
    fn fetch(&self, request: PageRequest) -> BoxFuture<'static, PageResult<Studio>> {
        let client = self.client.clone();
        Box::pin(async move { client.find_studios(&request.filter).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StashClient {
        StashClient::new(format!("{}/graphql", server.uri()), Some("secret".into()))
    }

    #[tokio::test]
    async fn find_tags_parses_count_and_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("ApiKey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "findTags": {
                        "count": 12,
                        "tags": [
                            { "id": "1", "name": "alpine" },
                            { "id": "2", "name": "alps" }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .find_tags(&FindFilter::new().query("al").page(1, 20))
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "alpine");
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn find_scenes_sends_scene_filter_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": {
                    "filter": { "q": "sunset", "page": 2, "per_page": 40 },
                    "scene_filter": {
                        "tags": { "value": ["3"], "modifier": "INCLUDES_ALL" }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "findScenes": { "count": 1, "scenes": [{ "id": "10" }] } }
            })))
            .mount(&server)
            .await;

        let scene_filter = SceneFilter {
            tags: Some(crate::filter::MultiCriterion::includes_all(vec![
                "3".into(),
            ])),
            ..Default::default()
        };
        let page = client_for(&server)
            .find_scenes(
                &FindFilter::new().query("sunset").page(2, 40),
                Some(&scene_filter),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "10");
    }

    #[tokio::test]
    async fn graphql_errors_surface_as_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "unknown field 'bogus'" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .find_tags(&FindFilter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::GraphQl(_)));
        assert!(err.user_message().contains("unknown field"));
    }

    #[tokio::test]
    async fn http_failure_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .find_tags(&FindFilter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::HttpStatus(500, _)));
    }

    #[tokio::test]
    async fn malformed_page_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "findTags": { "count": 3 } }
            })))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .find_tags(&FindFilter::new())
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn find_scene_returns_none_for_unknown_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "findScene": null }
            })))
            .mount(&server)
            .await;

        let scene = client_for(&server).find_scene("999").await.unwrap();
        assert!(scene.is_none());
    }
}
