//! Path to topic id mapping built from the index topic

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Join a request or table path onto the URL prefix
///
/// Paths that already carry the prefix are returned unchanged, so both
/// `/intro` and `/docs/intro` normalize to `/docs/intro` under `/docs`.
/// The bare prefix is the home path.
pub fn prefixed_path(url_prefix: &str, path: &str) -> String {
    let prefix = url_prefix.trim_end_matches('/');

    if !prefix.is_empty()
        && (path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/')))
    {
        return path.to_string();
    }

    let relative = path.trim_start_matches('/');
    match (prefix.is_empty(), relative.is_empty()) {
        (true, _) => format!("/{}", relative),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, relative),
    }
}

/// Home path of a collection: the prefix without a trailing slash (or `/`)
pub fn home_path(url_prefix: &str) -> String {
    prefixed_path(url_prefix, "")
}

/// Mapping from paths to topic ids, with a reverse canonical-path index
///
/// The first insertion wins on both sides: a path keeps the first id it was
/// given, and an id's canonical path is the first path inserted for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMap {
    /// Paths in insertion order
    entries: Vec<(String, u64)>,

    by_path: HashMap<String, u64>,

    canonical: HashMap<u64, String>,
}

impl UrlMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `path` to `topic_id`
    ///
    /// # Returns
    /// * `true` - The path was new and has been inserted
    /// * `false` - The path was already mapped; the existing mapping is kept
    pub fn insert(&mut self, path: impl Into<String>, topic_id: u64) -> bool {
        let path = path.into();
        if self.by_path.contains_key(&path) {
            return false;
        }

        self.canonical
            .entry(topic_id)
            .or_insert_with(|| path.clone());
        self.by_path.insert(path.clone(), topic_id);
        self.entries.push((path, topic_id));
        true
    }

    /// Topic id mapped to `path`
    pub fn topic_id(&self, path: &str) -> Option<u64> {
        self.by_path.get(path).copied()
    }

    /// Canonical path of a topic id
    pub fn canonical_path(&self, topic_id: u64) -> Option<&str> {
        self.canonical.get(&topic_id).map(String::as_str)
    }

    /// Whether any path maps to `topic_id`
    pub fn contains_topic(&self, topic_id: u64) -> bool {
        self.canonical.contains_key(&topic_id)
    }

    /// Path entries in insertion order
    pub fn paths(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(path, id)| (path.as_str(), *id))
    }

    /// Number of mapped paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for UrlMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, id) in &self.entries {
            map.serialize_entry(path, id)?;
        }
        map.end()
    }
}

/// Explicit redirects from one collection path to another location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectMap {
    entries: Vec<(String, String)>,
}

impl RedirectMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a redirect; the first redirect for a path wins
    pub fn insert(&mut self, path: impl Into<String>, location: impl Into<String>) -> bool {
        let path = path.into();
        if self.target(&path).is_some() {
            return false;
        }
        self.entries.push((path, location.into()));
        true
    }

    /// Redirect target for `path`
    pub fn target(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(from, _)| from == path)
            .map(|(_, to)| to.as_str())
    }

    /// Redirects in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Number of redirects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no redirects
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RedirectMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (from, to) in &self.entries {
            map.serialize_entry(from, to)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_path() {
        assert_eq!(prefixed_path("/docs", "/intro"), "/docs/intro");
        assert_eq!(prefixed_path("/docs", "intro"), "/docs/intro");
        assert_eq!(prefixed_path("/docs", "/docs/intro"), "/docs/intro");
        assert_eq!(prefixed_path("/docs/", "/intro"), "/docs/intro");
        assert_eq!(prefixed_path("/docs", "/docsy"), "/docs/docsy");
        assert_eq!(prefixed_path("/docs", "/"), "/docs");
        assert_eq!(prefixed_path("/", "/intro"), "/intro");
        assert_eq!(prefixed_path("", "intro"), "/intro");
    }

    #[test]
    fn test_root_and_prefix_paths_land_on_home() {
        let mut map = UrlMap::new();
        assert!(map.insert(home_path("/docs"), 1));
        assert!(!map.insert(prefixed_path("/docs", "/"), 42));
        assert!(!map.insert(prefixed_path("/docs", "/docs"), 43));
        assert_eq!(map.topic_id("/docs"), Some(1));
        assert_eq!(map.canonical_path(1), Some("/docs"));
    }

    #[test]
    fn test_home_path() {
        assert_eq!(home_path("/docs"), "/docs");
        assert_eq!(home_path("/docs/"), "/docs");
        assert_eq!(home_path("/"), "/");
    }

    #[test]
    fn test_first_path_wins() {
        let mut map = UrlMap::new();
        assert!(map.insert("/docs/intro", 42));
        assert!(!map.insert("/docs/intro", 43));
        assert_eq!(map.topic_id("/docs/intro"), Some(42));
        assert!(!map.contains_topic(43));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_first_path_is_canonical() {
        let mut map = UrlMap::new();
        map.insert("/docs/intro", 42);
        map.insert("/docs/introduction", 42);
        assert_eq!(map.canonical_path(42), Some("/docs/intro"));
        assert_eq!(map.topic_id("/docs/introduction"), Some(42));
        assert_eq!(
            map.paths().collect::<Vec<_>>(),
            vec![("/docs/intro", 42), ("/docs/introduction", 42)]
        );
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut map = UrlMap::new();
        map.insert("/docs/b", 2);
        map.insert("/docs/a", 1);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"/docs/b":2,"/docs/a":1}"#
        );
    }

    #[test]
    fn test_redirect_map_first_wins() {
        let mut redirects = RedirectMap::new();
        assert!(redirects.insert("/docs/old", "/docs/new"));
        assert!(!redirects.insert("/docs/old", "/docs/other"));
        assert_eq!(redirects.target("/docs/old"), Some("/docs/new"));
        assert_eq!(redirects.target("/docs/new"), None);
    }
}
