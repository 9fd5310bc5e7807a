//! Authenticated media URL construction.
//!
//! Catalog responses carry image/video path locators that may be absolute,
//! relative to the server, or unusable blob handles. These helpers turn them
//! into displayable URLs carrying the API key as a query parameter.

/// Origin (`scheme://host[:port]`) of the GraphQL endpoint URL.
fn origin(endpoint: &str) -> Option<String> {
    let (scheme, rest) = endpoint.split_once("://")?;
    let host = rest.split('/').next()?;
    if host.is_empty() {
        return None;
    }
    Some(format!("{scheme}://{host}"))
}

fn with_api_key(url: String, api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}apikey={key}")
        }
        None => url,
    }
}

fn entity_endpoint(
    endpoint: &str,
    api_key: Option<&str>,
    entity_type: &str,
    entity_id: &str,
) -> Option<String> {
    let origin = origin(endpoint)?;
    Some(with_api_key(
        format!("{origin}/image/{entity_type}/{entity_id}"),
        api_key,
    ))
}

/// Build an authenticated image URL from a path locator.
///
/// `entity` is `(entity_type, entity_id)` context used to fall back to the
/// server's image endpoint when the path is a blob handle or absent.
pub fn image_url(
    endpoint: &str,
    api_key: Option<&str>,
    image_path: Option<&str>,
    entity: Option<(&str, &str)>,
) -> Option<String> {
    if let Some(path) = image_path {
        // Blob handles only mean something to the session that created
        // them; use the entity image endpoint instead when possible.
        if path.starts_with("blob:") {
            return entity.and_then(|(t, id)| entity_endpoint(endpoint, api_key, t, id));
        }

        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(with_api_key(path.to_string(), api_key));
        }

        let origin = origin(endpoint)?;
        return Some(with_api_key(format!("{origin}{path}"), api_key));
    }

    entity.and_then(|(t, id)| entity_endpoint(endpoint, api_key, t, id))
}

/// Build an authenticated video URL from a path locator.
pub fn video_url(endpoint: &str, api_key: Option<&str>, video_path: Option<&str>) -> Option<String> {
    let path = video_path?;

    if path.starts_with("http") {
        return Some(with_api_key(path.to_string(), api_key));
    }

    let origin = origin(endpoint)?;
    Some(with_api_key(format!("{origin}{path}"), api_key))
}
