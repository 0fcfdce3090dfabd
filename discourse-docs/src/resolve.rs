//! Resolution of request paths to topic ids

use crate::error::ResolveError;
use crate::url_map::{prefixed_path, RedirectMap, UrlMap};
use regex::Regex;
use std::sync::LazyLock;

/// Forum-native topic paths: `/t/{slug}/{id}`, `/{slug}/{id}`, `/{id}`,
/// optionally followed by a post number
static TOPIC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/t)?(?:/(?P<slug>[^/]+))?/(?P<topic_id>\d+)(?:/\d+)?/?$")
        .unwrap_or_else(|e| panic!("invalid topic path pattern: {e}"))
});

/// Topic id of a forum-native path such as `/t/my-slug/42`
pub fn forum_topic_id(path: &str) -> Option<u64> {
    TOPIC_PATH
        .captures(path)
        .and_then(|captures| captures.name("topic_id"))
        .and_then(|id| id.as_str().parse().ok())
}

/// Topic id of a link to a forum topic, absolute or relative
///
/// `https://forum.example/t/my-slug/42?u=someone` -> `Some(42)`
pub fn topic_id_from_url(href: &str) -> Option<u64> {
    let path = match url::Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    forum_topic_id(&path)
}

/// Resolve a path against the URL map only
///
/// # Parameters
/// * `path` - Request path, with or without the URL prefix
/// * `url_map` - Map built from the index topic
/// * `url_prefix` - Prefix the collection is served under
///
/// # Returns
/// * `Ok(u64)` - The mapped topic id
/// * `Err(ResolveError::PathNotFound)` - The normalized path is not mapped
pub fn resolve(path: &str, url_map: &UrlMap, url_prefix: &str) -> Result<u64, ResolveError> {
    let full_path = prefixed_path(url_prefix, path);
    url_map
        .topic_id(&full_path)
        .ok_or_else(|| ResolveError::not_found(path))
}

/// Resolve a path the way documentation sites do
///
/// Explicit redirects are honoured first. Mapped paths resolve to their
/// topic, redirecting when the path is not the topic's canonical one.
/// Forum-native paths resolve by pattern, redirecting to the canonical path
/// when the topic is mapped.
///
/// # Returns
/// * `Ok(u64)` - Render this topic (callers redirect to the root when it is
///   the index topic)
/// * `Err(ResolveError::RedirectFound)` - Redirect to `target`
/// * `Err(ResolveError::PathNotFound)` - Nothing matches
pub fn resolve_docs(
    path: &str,
    url_map: &UrlMap,
    redirects: &RedirectMap,
    url_prefix: &str,
) -> Result<u64, ResolveError> {
    let full_path = prefixed_path(url_prefix, path);

    if let Some(target) = redirects.target(&full_path) {
        return Err(ResolveError::redirect(path, target));
    }

    if let Some(topic_id) = url_map.topic_id(&full_path) {
        return match url_map.canonical_path(topic_id) {
            Some(canonical) if canonical != full_path => {
                Err(ResolveError::redirect(path, canonical))
            }
            _ => Ok(topic_id),
        };
    }

    let topic_id = forum_topic_id(path).ok_or_else(|| ResolveError::not_found(path))?;

    match url_map.canonical_path(topic_id) {
        Some(canonical) if canonical != path => Err(ResolveError::redirect(path, canonical)),
        _ => Ok(topic_id),
    }
}
