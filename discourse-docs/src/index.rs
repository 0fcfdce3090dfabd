//! Parsing of the index topic into a collection snapshot
//!
//! The index topic is a single forum post that describes the whole
//! collection: which paths map to which topics, the navigation, explicit
//! redirects and (for engage pages) per-page metadata and takeover banners.
//! A parse builds a complete new snapshot and publishes it in one swap;
//! readers holding the previous snapshot keep a consistent view.

use crate::document::{self, Document, EngageContext, NAVIGATION_MISSING};
use crate::error::{DocumentError, PageError, ResolveError};
use crate::metadata_table::{parse_metadata_table, MetadataRecord};
use crate::resolve::{self, topic_id_from_url};
use crate::section;
use crate::topic::{RawTopic, TopicSource};
use crate::url_map::{home_path, prefixed_path, RedirectMap, UrlMap};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Section holding the docs URL table
pub const URLS_SECTION: &str = "URLs";

/// Section holding the docs redirects table
pub const REDIRECTS_SECTION: &str = "Redirects";

/// Section holding the engage metadata table, which doubles as the URL table
pub const METADATA_SECTION: &str = "Metadata";

/// Section holding the engage takeovers table
pub const TAKEOVERS_SECTION: &str = "Takeovers";

/// Default URL prefix of a documentation collection
pub const DOCS_PREFIX: &str = "/docs";

/// Default URL prefix of an engage collection
pub const ENGAGE_PREFIX: &str = "/engage";

/// Settings shared by both parser variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserConfig {
    /// Prefix every collection path is served under
    pub url_prefix: String,

    /// Id of the index topic
    pub index_topic_id: u64,

    /// Forum category documents must belong to (docs only)
    pub category_id: Option<u64>,

    /// Base URL of the forum, used for redirects out of the collection
    pub forum_url: String,
}

impl ParserConfig {
    /// Configuration for a documentation collection served under `/docs`
    pub fn docs(index_topic_id: u64) -> Self {
        Self::with_prefix(DOCS_PREFIX, index_topic_id)
    }

    /// Configuration for an engage collection served under `/engage`
    pub fn engage(index_topic_id: u64) -> Self {
        Self::with_prefix(ENGAGE_PREFIX, index_topic_id)
    }

    fn with_prefix(url_prefix: &str, index_topic_id: u64) -> Self {
        Self {
            url_prefix: url_prefix.to_string(),
            index_topic_id,
            category_id: None,
            forum_url: String::new(),
        }
    }

    /// Home path of the collection
    pub fn home_path(&self) -> String {
        home_path(&self.url_prefix)
    }

    /// Absolute forum URL of a forum-native path
    pub fn forum_link(&self, topic_path: &str) -> String {
        format!("{}{}", self.forum_url.trim_end_matches('/'), topic_path)
    }
}

/// Everything parsed from a documentation index topic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocsSnapshot {
    pub url_map: UrlMap,
    pub redirects: RedirectMap,
    pub index_document: Document,
    /// Rows of the URL table
    pub metadata: Vec<MetadataRecord>,
    pub navigation: String,
    pub warnings: Vec<String>,
}

/// Everything parsed from an engage index topic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngageSnapshot {
    pub url_map: UrlMap,
    pub index_document: Document,
    pub metadata: Vec<MetadataRecord>,
    pub takeovers: Vec<MetadataRecord>,
    pub warnings: Vec<String>,
}

impl EngageSnapshot {
    /// Context for rendering engage topics against this snapshot
    pub fn context<'a>(&'a self, config: &'a ParserConfig) -> EngageContext<'a> {
        EngageContext {
            url_map: &self.url_map,
            metadata: &self.metadata,
            url_prefix: &config.url_prefix,
        }
    }
}

/// Build a URL map from the rows of a URL table
///
/// The home path is mapped to the index topic first. Rows with a blank path
/// are hidden; rows whose link does not point to a forum topic are reported.
///
/// # Returns
/// * `(UrlMap, warnings)` - The map and every problem found, in row order
pub fn build_url_map(
    records: &[MetadataRecord],
    config: &ParserConfig,
) -> (UrlMap, Vec<String>) {
    let mut url_map = UrlMap::new();
    let mut warnings = Vec::new();

    url_map.insert(config.home_path(), config.index_topic_id);

    for record in records {
        let Some(path) = record.path() else {
            continue;
        };

        let link = record.topic_link().unwrap_or_default();
        let Some(topic_id) = topic_id_from_url(link) else {
            warnings.push(format!("Could not parse URL map item {}:{}", path, link));
            continue;
        };

        let full_path = prefixed_path(&config.url_prefix, path);
        if !url_map.insert(full_path.as_str(), topic_id) {
            warnings.push(format!(
                "Duplicate path {} for topic {}; keeping topic {}",
                full_path,
                topic_id,
                url_map.topic_id(&full_path).unwrap_or_default()
            ));
        }
    }

    (url_map, warnings)
}

/// Build the redirects table from the rows of the "Redirects" section
///
/// Locations must stay inside the collection or be absolute `https://` URLs.
pub fn build_redirect_map(
    records: &[MetadataRecord],
    config: &ParserConfig,
) -> (RedirectMap, Vec<String>) {
    let mut redirects = RedirectMap::new();
    let mut warnings = Vec::new();
    let home = config.home_path();

    for record in records {
        let path = record.path().unwrap_or_default();
        let location = record.get("location").map(str::trim).unwrap_or_default();

        let inside_collection = location == home
            || location.starts_with(&format!("{}/", home.trim_end_matches('/')));
        if path.is_empty() || !(inside_collection || location.starts_with("https://")) {
            warnings.push(format!(
                "Could not parse redirect map item {}:{}",
                path, location
            ));
            continue;
        }

        redirects.insert(prefixed_path(&config.url_prefix, path), location);
    }

    (redirects, warnings)
}

/// Parse a documentation index topic
///
/// # Parameters
/// * `topic` - The fetched index topic
/// * `config` - Parser settings
///
/// # Returns
/// * `Ok(DocsSnapshot)` - Row and link problems are collected as warnings
/// * `Err(DocumentError::MalformedTopic)` - The index topic has no first post
pub fn parse_docs_index(
    topic: &RawTopic,
    config: &ParserConfig,
) -> Result<DocsSnapshot, DocumentError> {
    let cooked = index_html(topic)?;

    let (url_records, mut warnings) = parse_metadata_table(cooked, URLS_SECTION);
    let (url_map, url_warnings) = build_url_map(&url_records, config);
    warnings.extend(url_warnings);

    let (redirect_records, redirect_errors) = parse_metadata_table(cooked, REDIRECTS_SECTION);
    warnings.extend(redirect_errors);
    let (redirects, redirect_warnings) = build_redirect_map(&redirect_records, config);
    warnings.extend(redirect_warnings);

    let navigation = section::extract_section(cooked, document::CONTENT_HEADING)
        .unwrap_or_else(|| NAVIGATION_MISSING.to_string());

    let index_document = if topic.id != config.index_topic_id {
        document::to_docs_document(topic).unwrap_or_else(|e| {
            warnings.push(e.to_string());
            Document::placeholder(topic, Some(navigation.clone()))
        })
    } else {
        Document::placeholder(topic, Some(navigation.clone()))
    };

    log_warnings(&warnings);
    log::info!(
        "Parsed docs index {}: {} paths, {} redirects, {} warnings",
        topic.id,
        url_map.len(),
        redirects.len(),
        warnings.len()
    );

    Ok(DocsSnapshot {
        url_map,
        redirects,
        index_document,
        metadata: url_records,
        navigation,
        warnings,
    })
}

/// Parse an engage index topic
///
/// The "Metadata" table is both the URL table and the page metadata.
pub fn parse_engage_index(
    topic: &RawTopic,
    config: &ParserConfig,
) -> Result<EngageSnapshot, DocumentError> {
    let cooked = index_html(topic)?;

    let (metadata, mut warnings) = parse_metadata_table(cooked, METADATA_SECTION);
    let (url_map, url_warnings) = build_url_map(&metadata, config);
    warnings.extend(url_warnings);

    let (takeovers, takeover_errors) = parse_metadata_table(cooked, TAKEOVERS_SECTION);
    warnings.extend(takeover_errors);

    let mut snapshot = EngageSnapshot {
        url_map,
        index_document: Document::placeholder(topic, None),
        metadata,
        takeovers,
        warnings: Vec::new(),
    };

    if topic.id != config.index_topic_id {
        let rendered = document::to_engage_document(topic, &snapshot.context(config));
        match rendered {
            Ok(index_document) => snapshot.index_document = index_document,
            Err(e) => warnings.push(e.to_string()),
        }
    }

    log_warnings(&warnings);
    log::info!(
        "Parsed engage index {}: {} pages, {} takeovers, {} warnings",
        topic.id,
        snapshot.metadata.len(),
        snapshot.takeovers.len(),
        warnings.len()
    );

    snapshot.warnings = warnings;
    Ok(snapshot)
}

fn index_html(topic: &RawTopic) -> Result<&str, DocumentError> {
    topic
        .first_post()
        .map(|post| post.cooked.as_str())
        .ok_or_else(|| DocumentError::MalformedTopic {
            topic_id: topic.id,
            reason: "index topic has no posts".to_string(),
        })
}

fn log_warnings(warnings: &[String]) {
    for warning in warnings {
        log::warn!("{}", warning);
    }
}

/// Parser for documentation collections
///
/// Owns its topic source and the current snapshot. `parse()` may be called
/// from many threads; each call builds a new snapshot and swaps it in.
#[derive(Debug)]
pub struct DocsParser<S> {
    source: S,
    config: ParserConfig,
    snapshot: RwLock<Arc<DocsSnapshot>>,
}

impl<S: TopicSource> DocsParser<S> {
    /// Create a parser with an empty snapshot
    pub fn new(source: S, config: ParserConfig) -> Self {
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(DocsSnapshot::default())),
        }
    }

    /// Fetch and parse the index topic, publishing the new snapshot
    ///
    /// # Returns
    /// * `Ok(Arc<DocsSnapshot>)` - The snapshot that was just published
    /// * `Err(PageError)` - Fetch failures are passed through unchanged
    pub fn parse(&self) -> Result<Arc<DocsSnapshot>, PageError> {
        let topic = self.source.get_topic(self.config.index_topic_id)?;
        let snapshot = Arc::new(parse_docs_index(&topic, &self.config)?);
        *self.snapshot.write() = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> Arc<DocsSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Resolve a request path against the current snapshot
    pub fn resolve_path(&self, path: &str) -> Result<u64, ResolveError> {
        let snapshot = self.snapshot();
        resolve::resolve_docs(
            path,
            &snapshot.url_map,
            &snapshot.redirects,
            &self.config.url_prefix,
        )
    }

    /// Fetch a topic and render it as a docs document
    pub fn get_document(&self, topic_id: u64) -> Result<Document, PageError> {
        let topic = self.source.get_topic(topic_id)?;
        Ok(document::to_docs_document(&topic)?)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

/// Parser for engage collections
#[derive(Debug)]
pub struct EngageParser<S> {
    source: S,
    config: ParserConfig,
    snapshot: RwLock<Arc<EngageSnapshot>>,
}

impl<S: TopicSource> EngageParser<S> {
    /// Create a parser with an empty snapshot
    pub fn new(source: S, config: ParserConfig) -> Self {
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(EngageSnapshot::default())),
        }
    }

    /// Fetch and parse the index topic, publishing the new snapshot
    pub fn parse(&self) -> Result<Arc<EngageSnapshot>, PageError> {
        let topic = self.source.get_topic(self.config.index_topic_id)?;
        let snapshot = Arc::new(parse_engage_index(&topic, &self.config)?);
        *self.snapshot.write() = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> Arc<EngageSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Resolve a request path against the current snapshot
    pub fn resolve_path(&self, path: &str) -> Result<u64, ResolveError> {
        resolve::resolve(path, &self.snapshot().url_map, &self.config.url_prefix)
    }

    /// Fetch a topic and render it against the current snapshot
    pub fn get_document(&self, topic_id: u64) -> Result<Document, PageError> {
        let topic = self.source.get_topic(topic_id)?;
        let snapshot = self.snapshot();
        Ok(document::to_engage_document(
            &topic,
            &snapshot.context(&self.config),
        )?)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::MemorySource;

    const UPDATED: &str = "2020-05-01T10:00:00.000Z";

    fn link(url: &str) -> String {
        format!("<a href=\"{url}\">{url}</a>")
    }

    fn docs_index_html() -> String {
        format!(
            "<p>Welcome to the docs.</p>\
             <h1>Content</h1>\
             <ul><li><a href=\"/docs/intro\">Intro</a></li></ul>\
             <h1>URLs</h1>\
             <details><summary>Mapping table</summary>\
             <div class=\"md-table\"><table>\
             <thead><tr><th>Topic</th><th>Path</th></tr></thead>\
             <tbody>\
             <tr><td>{}</td><td>/intro</td></tr>\
             <tr><td>{}</td><td>/docs/intro</td></tr>\
             <tr><td>{}</td><td>/introduction</td></tr>\
             <tr><td>{}</td><td></td></tr>\
             <tr><td>{}</td><td>/broken</td></tr>\
             <tr><td><a href=\"/other\">Click here</a></td><td>/click</td></tr>\
             </tbody></table></div></details>\
             <h1>Redirects</h1>\
             <details><summary>Mapping table</summary>\
             <div class=\"md-table\"><table>\
             <thead><tr><th>Path</th><th>Location</th></tr></thead>\
             <tbody>\
             <tr><td>/old-intro</td><td>/docs/intro</td></tr>\
             <tr><td>/elsewhere</td><td>{}</td></tr>\
             <tr><td>/bad</td><td>http://insecure.example</td></tr>\
             </tbody></table></div></details>",
            link("https://forum.example/t/intro/42"),
            link("https://forum.example/t/intro-copy/43"),
            link("https://forum.example/t/intro/42"),
            link("https://forum.example/t/hidden/44"),
            link("https://forum.example/about"),
            link("https://example.com/page"),
        )
    }

    fn docs_source() -> MemorySource {
        MemorySource::new()
            .with_topic(RawTopic::new(1, "index", "Docs", docs_index_html(), UPDATED))
            .with_topic(RawTopic::new(
                42,
                "intro",
                "Intro",
                "<p>Hello</p>",
                UPDATED,
            ))
    }

    #[test]
    fn test_docs_url_map() {
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        let snapshot = parser.parse().unwrap();

        let paths: Vec<_> = snapshot.url_map.paths().collect();
        assert_eq!(
            paths,
            vec![("/docs", 1), ("/docs/intro", 42), ("/docs/introduction", 42)]
        );
        assert_eq!(snapshot.url_map.canonical_path(42), Some("/docs/intro"));
    }

    #[test]
    fn test_docs_warnings() {
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        let warnings = parser.parse().unwrap().warnings.clone();

        assert!(warnings.iter().any(|w| w.contains("path is missing")));
        assert!(warnings.iter().any(|w| w.contains("Click here")));
        assert!(warnings.iter().any(|w| w.starts_with("Duplicate path /docs/intro")));
        assert!(warnings
            .iter()
            .any(|w| w == "Could not parse URL map item /broken:https://forum.example/about"));
        assert!(warnings
            .iter()
            .any(|w| w == "Could not parse redirect map item /bad:http://insecure.example"));
        assert_eq!(warnings.len(), 5);
    }

    #[test]
    fn test_docs_redirects_and_navigation() {
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        let snapshot = parser.parse().unwrap();

        assert_eq!(snapshot.redirects.target("/docs/old-intro"), Some("/docs/intro"));
        assert_eq!(
            snapshot.redirects.target("/docs/elsewhere"),
            Some("https://example.com/page")
        );
        assert_eq!(snapshot.redirects.len(), 2);
        assert_eq!(
            snapshot.navigation,
            "<ul><li><a href=\"/docs/intro\">Intro</a></li></ul>"
        );
    }

    #[test]
    fn test_configured_index_topic_gets_placeholder_document() {
        // The configured index topic is never rendered as a page of its own
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        let snapshot = parser.parse().unwrap();

        assert_eq!(snapshot.index_document.title, "Docs");
        assert_eq!(snapshot.index_document.body_html, "");
        assert_eq!(snapshot.index_document.topic_path, "/t/index/1");
        assert_eq!(
            snapshot.index_document.navigation.as_deref(),
            Some(snapshot.navigation.as_str())
        );
    }

    #[test]
    fn test_moved_index_topic_is_rendered() {
        let topic = RawTopic::new(2, "index", "Docs", docs_index_html(), UPDATED);
        let snapshot = parse_docs_index(&topic, &ParserConfig::docs(1)).unwrap();
        assert_eq!(snapshot.index_document.body_html, "<p>Welcome to the docs.</p>");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        let first = parser.parse().unwrap();
        let second = parser.parse().unwrap();
        assert_eq!(first.url_map, second.url_map);
        assert_eq!(first.redirects, second.redirects);
        assert_eq!(first.warnings, second.warnings);
        assert!(Arc::ptr_eq(&second, &parser.snapshot()));
    }

    #[test]
    fn test_resolve_through_parser() {
        let parser = DocsParser::new(docs_source(), ParserConfig::docs(1));
        assert_eq!(
            parser.resolve_path("/intro"),
            Err(ResolveError::not_found("/intro"))
        );

        parser.parse().unwrap();
        assert_eq!(parser.resolve_path("/intro"), Ok(42));
        assert_eq!(
            parser.resolve_path("/t/intro/42"),
            Err(ResolveError::redirect("/t/intro/42", "/docs/intro"))
        );
        assert_eq!(parser.get_document(42).unwrap().title, "Intro");
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let parser = DocsParser::new(MemorySource::new(), ParserConfig::docs(1));
        match parser.parse() {
            Err(PageError::Fetch(e)) => assert_eq!(e.status, 404),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    fn engage_index_html() -> String {
        format!(
            "<p>Engage pages</p>\
             <h1>Metadata</h1>\
             <details><summary>Mapping table</summary>\
             <div class=\"md-table\"><table>\
             <thead><tr><th>Topic Name</th><th>Path</th><th>Type</th><th>Tags</th><th>Active</th></tr></thead>\
             <tbody>\
             <tr><td>{}</td><td>/webinar</td><td>webinar</td><td>cloud</td><td>true</td></tr>\
             <tr><td>{}</td><td>/paper</td><td></td><td>iot</td><td>false</td></tr>\
             </tbody></table></div></details>\
             <h1>Takeovers</h1>\
             <div class=\"md-table\"><table>\
             <thead><tr><th>Title</th><th>Active</th></tr></thead>\
             <tbody><tr><td>Big banner</td><td>true</td></tr></tbody>\
             </table></div>",
            link("https://forum.example/t/webinar/7"),
            link("https://forum.example/t/paper/8"),
        )
    }

    #[test]
    fn test_engage_snapshot() {
        let source = MemorySource::new().with_topic(RawTopic::new(
            3,
            "engage-index",
            "Engage",
            engage_index_html(),
            UPDATED,
        ));
        let parser = EngageParser::new(source, ParserConfig::engage(3));
        let snapshot = parser.parse().unwrap();

        assert_eq!(snapshot.metadata.len(), 2);
        assert_eq!(snapshot.takeovers.len(), 1);
        assert_eq!(snapshot.takeovers[0].get("title"), Some("Big banner"));
        assert_eq!(snapshot.url_map.topic_id("/engage/webinar"), Some(7));
        assert_eq!(snapshot.url_map.topic_id("/engage/paper"), Some(8));
        assert_eq!(snapshot.warnings.len(), 1);
        assert!(snapshot.warnings[0].contains("type is missing"));
        assert_eq!(snapshot.index_document.title, "Engage");
        assert_eq!(parser.resolve_path("/webinar"), Ok(7));
    }

    fn metadata_rows(rows: &str) -> Vec<MetadataRecord> {
        let html = format!(
            "<h1>Metadata</h1><table>\
             <tr><th>Topic Name</th><th>Path</th><th>Type</th><th>Image</th></tr>{}</table>",
            rows
        );
        let (records, errors) = crate::metadata_table::parse_metadata_table(&html, "Metadata");
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        records
    }

    #[test]
    fn test_url_map_uses_first_link_of_row() {
        let records = metadata_rows(&format!(
            "<tr><td>{}</td><td>/a</td><td>webinar</td><td>{}</td></tr>",
            link("https://forum.example/t/a/10"),
            link("https://assets.example.com/a.png"),
        ));

        let (url_map, warnings) = build_url_map(&records, &ParserConfig::engage(3));

        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(url_map.topic_id("/engage/a"), Some(10));
    }

    #[test]
    fn test_table_path_on_home_path_is_duplicate() {
        let records = metadata_rows(&format!(
            "<tr><td>{}</td><td>/</td><td>webinar</td><td></td></tr>\
             <tr><td>{}</td><td>/engage</td><td>webinar</td><td></td></tr>",
            link("https://forum.example/t/root/11"),
            link("https://forum.example/t/prefix/12"),
        ));

        let (url_map, warnings) = build_url_map(&records, &ParserConfig::engage(3));

        assert_eq!(url_map.topic_id("/engage"), Some(3));
        assert_eq!(url_map.len(), 1);
        assert_eq!(
            warnings,
            vec![
                "Duplicate path /engage for topic 11; keeping topic 3".to_string(),
                "Duplicate path /engage for topic 12; keeping topic 3".to_string(),
            ]
        );
    }
}
