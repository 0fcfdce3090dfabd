//! Error types for path resolution, document building and topic fetching

use thiserror::Error;

/// Outcomes of resolving a request path that are not a plain topic id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested path has no mapping; callers should answer "not found"
    #[error("No topic found for path {path}")]
    PathNotFound {
        /// The path as requested
        path: String,
    },

    /// The path resolves, but the topic lives at another path; callers
    /// should redirect instead of rendering
    #[error("Path {path} redirects to {target}")]
    RedirectFound {
        /// The path as requested
        path: String,
        /// Where the caller should redirect to
        target: String,
    },
}

impl ResolveError {
    /// Create a not-found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a redirect error
    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self::RedirectFound {
            path: path.into(),
            target: target.into(),
        }
    }
}

/// Errors that can occur while turning a single topic into a document
///
/// These are fatal for that one document only; they never abort parsing of
/// the rest of the collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A content topic has no entry in the URL map
    #[error("Topic {topic_id} has no path in the URL map")]
    OrphanTopic {
        /// Id of the orphaned topic
        topic_id: u64,
    },

    /// The topic body could not be read
    #[error("Topic {topic_id} is malformed: {reason}")]
    MalformedTopic {
        /// Id of the malformed topic
        topic_id: u64,
        /// What was wrong with it
        reason: String,
    },
}

/// A failure reported by the topic fetcher, carrying an HTTP-style status
///
/// The engine never retries; callers map `status` straight to a response code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Fetching topic failed with status {status}: {message}")]
pub struct FetchError {
    /// HTTP-style status code (404, 500, ...)
    pub status: u16,
    /// Human-readable detail
    pub message: String,
}

impl FetchError {
    /// Create a fetch error with an arbitrary status
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a 404 for a topic id
    pub fn not_found(topic_id: u64) -> Self {
        Self::new(404, format!("topic {} not found", topic_id))
    }
}

/// Errors surfaced while answering a request for a path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Fetching the index or content topic failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The content topic could not be turned into a document
    #[error(transparent)]
    Document(#[from] DocumentError),
}
