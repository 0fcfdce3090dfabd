//! Turning forum topics into publishable documents
//!
//! Every function here parses the topic's first post into its own tree and
//! takes all context as parameters, so concurrent calls never share state.

use crate::error::DocumentError;
use crate::html;
use crate::humanize;
use crate::metadata_table::{normalize_column, MetadataRecord};
use crate::post_process;
use crate::section;
use crate::topic::{Post, RawTopic};
use crate::url_map::{prefixed_path, UrlMap};
use kuchikiki::NodeRef;
use serde::Serialize;

/// Heading that separates a docs topic's body from its navigation
pub const CONTENT_HEADING: &str = "Content";

/// Navigation shown when a docs topic has no "Content" section
pub const NAVIGATION_MISSING: &str = "Navigation missing";

/// Warning recorded when an engage topic has no leading metadata table
pub const METADATA_UNPARSED: &str = "Metadata could not be parsed correctly";

/// A rendered topic, ready to be handed to a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Topic title
    pub title: String,

    /// Processed body HTML
    pub body_html: String,

    /// Navigation HTML (docs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,

    /// Merged per-topic metadata (engage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataRecord>,

    /// Last update, relative to now ("3 days ago")
    pub updated: String,

    /// Forum-native path: `/t/{slug}/{id}`
    pub topic_path: String,

    /// Index records sharing a tag with this document (engage only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<MetadataRecord>,

    /// Non-fatal problems found while building the document
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Document {
    /// Minimal document standing in for the configured index topic
    ///
    /// Carries the title, navigation and topic path but no body.
    pub fn placeholder(topic: &RawTopic, navigation: Option<String>) -> Self {
        Self {
            title: topic.title.clone(),
            navigation,
            topic_path: topic.topic_path(),
            ..Self::default()
        }
    }
}

/// Context an engage topic is rendered against, taken from the index snapshot
#[derive(Debug, Clone, Copy)]
pub struct EngageContext<'a> {
    /// URL map of the collection
    pub url_map: &'a UrlMap,

    /// Records of the index "Metadata" table
    pub metadata: &'a [MetadataRecord],

    /// Prefix the collection is served under
    pub url_prefix: &'a str,
}

/// Build a document from a topic: title, processed body, update time, path
///
/// # Returns
/// * `Ok(Document)` - `navigation`, `metadata` and `related` are left empty
/// * `Err(DocumentError::MalformedTopic)` - No first post, or an unreadable timestamp
pub fn to_document(topic: &RawTopic) -> Result<Document, DocumentError> {
    let (post, updated) = read_first_post(topic)?;
    let body = html::parse_fragment(&post.cooked);
    post_process::process_tree(&body);

    Ok(Document {
        title: topic.title.clone(),
        body_html: html::inner_html(&body),
        updated,
        topic_path: topic.topic_path(),
        ..Document::default()
    })
}

/// Build a docs document: the body runs up to the "Content" heading, and the
/// section under that heading becomes the navigation
pub fn to_docs_document(topic: &RawTopic) -> Result<Document, DocumentError> {
    let (post, updated) = read_first_post(topic)?;
    let body = html::parse_fragment(&post.cooked);
    post_process::process_tree(&body);

    let body_html = html::serialize_nodes(section::preamble_nodes(&body, CONTENT_HEADING));
    let navigation = section::section_nodes(&body, CONTENT_HEADING)
        .map(html::serialize_nodes)
        .unwrap_or_else(|| NAVIGATION_MISSING.to_string());

    Ok(Document {
        title: topic.title.clone(),
        body_html,
        navigation: Some(navigation),
        updated,
        topic_path: topic.topic_path(),
        ..Document::default()
    })
}

/// Build an engage document
///
/// The first table of the post is the page's own key/value metadata. It is
/// removed from the body and merged over the index record for the topic's
/// canonical path.
///
/// # Parameters
/// * `topic` - The engage topic
/// * `context` - URL map and metadata table of the current snapshot
///
/// # Returns
/// * `Ok(Document)` - With `metadata` and `related` filled in
/// * `Err(DocumentError::OrphanTopic)` - No path in the URL map leads to the topic
/// * `Err(DocumentError::MalformedTopic)` - No first post, or an unreadable timestamp
pub fn to_engage_document(
    topic: &RawTopic,
    context: &EngageContext<'_>,
) -> Result<Document, DocumentError> {
    let (post, updated) = read_first_post(topic)?;
    let canonical_path = context
        .url_map
        .canonical_path(topic.id)
        .ok_or(DocumentError::OrphanTopic { topic_id: topic.id })?;

    let body = html::parse_fragment(&post.cooked);
    let mut warnings = Vec::new();

    let own_metadata = match take_metadata_table(&body) {
        Some(fields) => fields,
        None => {
            warnings.push(METADATA_UNPARSED.to_string());
            Vec::new()
        }
    };
    post_process::process_tree(&body);

    let index_record = context.metadata.iter().find(|record| {
        record
            .path()
            .is_some_and(|path| prefixed_path(context.url_prefix, path) == canonical_path)
    });
    let mut metadata = match index_record {
        Some(record) => record.clone(),
        None => {
            warnings.push(format!("No metadata entry found for {}", canonical_path));
            MetadataRecord::new()
        }
    };
    metadata.merge(own_metadata);

    let tags = metadata.tags();
    let related = context
        .metadata
        .iter()
        .filter(|record| record.shares_tag_with(&tags))
        .cloned()
        .collect();

    for warning in &warnings {
        log::warn!("Topic {}: {}", topic.id, warning);
    }

    Ok(Document {
        title: topic.title.clone(),
        body_html: html::inner_html(&body),
        metadata: Some(metadata),
        updated,
        topic_path: topic.topic_path(),
        related,
        warnings,
        ..Document::default()
    })
}

/// First post of the topic and its update time, humanized
fn read_first_post(topic: &RawTopic) -> Result<(&Post, String), DocumentError> {
    let post = topic
        .first_post()
        .ok_or_else(|| DocumentError::MalformedTopic {
            topic_id: topic.id,
            reason: "topic has no posts".to_string(),
        })?;

    let updated = humanize::parse_timestamp(&post.updated_at).ok_or_else(|| {
        DocumentError::MalformedTopic {
            topic_id: topic.id,
            reason: format!("unreadable timestamp {:?}", post.updated_at),
        }
    })?;

    Ok((post, humanize::naturaltime_now(updated)))
}

/// Remove the table leading `body` and read it as `key | value` rows
///
/// Only the body's first element counts, either a bare `<table>` or a
/// `md-table` wrapper opening with one. Rows without data cells (the header
/// row) are skipped. A wrapper left empty by the removal goes with it.
fn take_metadata_table(body: &NodeRef) -> Option<Vec<(String, String)>> {
    let leading = html::element_children(body).into_iter().next()?;
    let (table, wrapper) = if html::is_element(&leading, "table") {
        (leading, None)
    } else if html::is_element(&leading, "div") && html::has_class(&leading, "md-table") {
        let table = html::element_children(&leading)
            .into_iter()
            .next()
            .filter(|child| html::is_element(child, "table"))?;
        (table, Some(leading))
    } else {
        return None;
    };

    let fields = table
        .descendants()
        .filter(|node| html::is_element(node, "tr"))
        .filter_map(|row| {
            let cells = html::child_elements(&row, "td");
            let key = cells.first()?.text_contents();
            let value = cells
                .get(1)
                .map(|cell| cell.text_contents().trim().to_string())
                .unwrap_or_default();
            Some((normalize_column(&key), value))
        })
        .collect();

    table.detach();
    if let Some(wrapper) = wrapper {
        if html::element_children(&wrapper).is_empty() {
            wrapper.detach();
        }
    }

    Some(fields)
}
