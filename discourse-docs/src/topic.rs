//! Forum topics and the sources that provide them
//!
//! A [`RawTopic`] mirrors the forum's JSON topic representation (only the
//! fields the engine reads). Fetching is delegated to a [`TopicSource`]; the
//! engine itself performs no I/O.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A forum topic as returned by the forum API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTopic {
    /// Topic id
    pub id: u64,

    /// URL slug
    pub slug: String,

    /// Topic title
    pub title: String,

    /// Forum category the topic belongs to
    #[serde(default)]
    pub category_id: Option<u64>,

    /// Posts of the topic; only the first one is ever read
    pub post_stream: PostStream,
}

/// The posts of a topic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStream {
    /// Posts in thread order
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A single post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Rendered ("cooked") HTML body
    pub cooked: String,

    /// Last update timestamp, RFC 3339
    pub updated_at: String,
}

impl RawTopic {
    /// Create a single-post topic
    pub fn new(
        id: u64,
        slug: impl Into<String>,
        title: impl Into<String>,
        cooked: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: title.into(),
            category_id: None,
            post_stream: PostStream {
                posts: vec![Post {
                    cooked: cooked.into(),
                    updated_at: updated_at.into(),
                }],
            },
        }
    }

    /// The first post, which holds the topic's content
    pub fn first_post(&self) -> Option<&Post> {
        self.post_stream.posts.first()
    }

    /// Forum-native path of the topic: `/t/{slug}/{id}`
    pub fn topic_path(&self) -> String {
        format!("/t/{}/{}", self.slug, self.id)
    }
}

/// Something that can fetch topics by id
///
/// Implementations surface failures with an HTTP-style status so callers
/// can map them to responses one to one.
pub trait TopicSource {
    /// Fetch a topic by id
    fn get_topic(&self, topic_id: u64) -> Result<RawTopic, FetchError>;
}

impl<T: TopicSource + ?Sized> TopicSource for &T {
    fn get_topic(&self, topic_id: u64) -> Result<RawTopic, FetchError> {
        (**self).get_topic(topic_id)
    }
}

impl<T: TopicSource + ?Sized> TopicSource for std::sync::Arc<T> {
    fn get_topic(&self, topic_id: u64) -> Result<RawTopic, FetchError> {
        (**self).get_topic(topic_id)
    }
}

/// Topics held in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    topics: HashMap<u64, RawTopic>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a topic
    pub fn insert(&mut self, topic: RawTopic) {
        self.topics.insert(topic.id, topic);
    }

    /// Builder-style [`MemorySource::insert`]
    pub fn with_topic(mut self, topic: RawTopic) -> Self {
        self.insert(topic);
        self
    }
}

impl TopicSource for MemorySource {
    fn get_topic(&self, topic_id: u64) -> Result<RawTopic, FetchError> {
        self.topics
            .get(&topic_id)
            .cloned()
            .ok_or_else(|| FetchError::not_found(topic_id))
    }
}

/// Topics stored as `{id}.json` files in a directory
///
/// Each file holds the forum's JSON for one topic, as saved from
/// `https://forum.example/t/{id}.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source reading from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the topics are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn topic_file(&self, topic_id: u64) -> PathBuf {
        self.root.join(format!("{}.json", topic_id))
    }
}

impl TopicSource for DirectorySource {
    fn get_topic(&self, topic_id: u64) -> Result<RawTopic, FetchError> {
        let path = self.topic_file(topic_id);
        log::debug!("Reading topic {} from {}", topic_id, path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::not_found(topic_id),
            _ => FetchError::new(500, format!("{}: {}", path.display(), e)),
        })?;

        serde_json::from_str(&content)
            .map_err(|e| FetchError::new(500, format!("{}: {}", path.display(), e)))
    }
}
