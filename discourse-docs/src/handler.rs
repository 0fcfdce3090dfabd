//! Request outcomes for a path
//!
//! These functions are the whole of what a web handler needs: parse the
//! index, resolve the path, then render, redirect or answer not found.

use crate::document::{self, Document};
use crate::error::{PageError, ResolveError};
use crate::index::{DocsParser, EngageParser};
use crate::resolve;
use crate::topic::TopicSource;
use crate::url_map::home_path;

/// What to answer for a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Render this document
    Render(Box<Document>),

    /// Redirect to this location
    Redirect(String),

    /// Answer 404
    NotFound,
}

impl Outcome {
    fn render(document: Document) -> Self {
        Self::Render(Box::new(document))
    }
}

impl From<ResolveError> for Outcome {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::PathNotFound { .. } => Self::NotFound,
            ResolveError::RedirectFound { target, .. } => Self::Redirect(target),
        }
    }
}

/// Whether `path` addresses the collection's home page
fn is_home(path: &str, url_prefix: &str) -> bool {
    path.trim_matches('/').is_empty() || path.trim_end_matches('/') == home_path(url_prefix)
}

/// Answer a request for `path` in a documentation collection
///
/// # Parameters
/// * `parser` - Parser of the collection; it is re-parsed for every request
/// * `path` - Request path, with or without the URL prefix
///
/// # Returns
/// * `Ok(Outcome)` - Render, redirect or not found
/// * `Err(PageError)` - Fetch failures (with their status) and unreadable topics
pub fn docs_outcome<S: TopicSource>(
    parser: &DocsParser<S>,
    path: &str,
) -> Result<Outcome, PageError> {
    let snapshot = parser.parse()?;
    let config = parser.config();

    if is_home(path, &config.url_prefix) {
        return Ok(Outcome::render(snapshot.index_document.clone()));
    }

    let topic_id = match resolve::resolve_docs(
        path,
        &snapshot.url_map,
        &snapshot.redirects,
        &config.url_prefix,
    ) {
        Ok(topic_id) => topic_id,
        Err(err) => return Ok(err.into()),
    };

    if topic_id == config.index_topic_id {
        return Ok(Outcome::Redirect(config.home_path()));
    }

    let topic = parser.source().get_topic(topic_id)?;
    let topic_path = topic.topic_path();

    if let Some(category_id) = config.category_id {
        if topic.category_id != Some(category_id) {
            log::debug!(
                "Topic {} is outside category {}; sending to the forum",
                topic_id,
                category_id
            );
            return Ok(Outcome::Redirect(config.forum_link(&topic_path)));
        }
    }

    if !snapshot.url_map.contains_topic(topic_id) && topic_path != path {
        return Ok(Outcome::Redirect(topic_path));
    }

    Ok(Outcome::render(document::to_docs_document(&topic)?))
}

/// Answer a request for `path` in an engage collection
///
/// Pages whose metadata marks them inactive send visitors to the forum topic
/// unless `preview` is set.
pub fn engage_outcome<S: TopicSource>(
    parser: &EngageParser<S>,
    path: &str,
    preview: bool,
) -> Result<Outcome, PageError> {
    let snapshot = parser.parse()?;
    let config = parser.config();

    if is_home(path, &config.url_prefix) {
        return Ok(Outcome::render(snapshot.index_document.clone()));
    }

    let topic_id = match resolve::resolve(path, &snapshot.url_map, &config.url_prefix) {
        Ok(topic_id) => topic_id,
        Err(err) => return Ok(err.into()),
    };

    if topic_id == config.index_topic_id {
        return Ok(Outcome::Redirect(config.home_path()));
    }

    let topic = parser.source().get_topic(topic_id)?;
    let document = document::to_engage_document(&topic, &snapshot.context(config))?;

    let inactive = document
        .metadata
        .as_ref()
        .is_some_and(|metadata| metadata.is_inactive());
    if inactive && !preview {
        return Ok(Outcome::Redirect(config.forum_link(&document.topic_path)));
    }

    Ok(Outcome::render(document))
}
