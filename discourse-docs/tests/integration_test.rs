use discourse_docs::handler::{docs_outcome, engage_outcome, Outcome};
use discourse_docs::index::{DocsParser, EngageParser, ParserConfig};
use discourse_docs::sitemap;
use discourse_docs::topic::DirectorySource;
use discourse_docs::{FetchError, PageError, ResolveError};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

const FORUM_URL: &str = "https://forum.example.com";

fn fixtures_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn docs_parser(category_id: Option<u64>) -> DocsParser<DirectorySource> {
    let mut config = ParserConfig::docs(1);
    config.category_id = category_id;
    config.forum_url = FORUM_URL.to_string();
    DocsParser::new(DirectorySource::new(fixtures_dir("docs")), config)
}

fn engage_parser() -> EngageParser<DirectorySource> {
    let mut config = ParserConfig::engage(3);
    config.forum_url = FORUM_URL.to_string();
    EngageParser::new(DirectorySource::new(fixtures_dir("engage")), config)
}

fn rendered(outcome: Outcome) -> discourse_docs::Document {
    match outcome {
        Outcome::Render(document) => *document,
        other => panic!("expected a rendered document, got {:?}", other),
    }
}

#[test]
fn test_docs_index_snapshot() {
    let parser = docs_parser(Some(5));
    let snapshot = parser.parse().unwrap();

    let paths: Vec<_> = snapshot.url_map.paths().collect();
    assert_eq!(
        paths,
        vec![
            ("/docs", 1),
            ("/docs/intro", 42),
            ("/docs/guides/install", 43),
            ("/docs/getting-started", 42),
        ]
    );

    assert_eq!(snapshot.warnings.len(), 2, "{:?}", snapshot.warnings);
    assert!(snapshot.warnings[0].contains("path is missing"));
    assert!(snapshot.warnings[1].contains("Click here"));

    assert_eq!(snapshot.redirects.len(), 2);
    assert_eq!(
        snapshot.redirects.target("/docs/blog"),
        Some("https://blog.example.com/")
    );

    assert!(snapshot.navigation.contains("<a href=\"/docs/intro\">Introduction</a>"));
    assert!(!snapshot.navigation.contains("Mapping table"));
}

#[test]
fn test_docs_home_is_placeholder() {
    let parser = docs_parser(None);
    let document = rendered(docs_outcome(&parser, "/").unwrap());

    assert_eq!(document.title, "Example documentation");
    assert_eq!(document.body_html, "");
    assert_eq!(document.topic_path, "/t/example-docs/1");
}

#[test]
fn test_docs_page_rendering() {
    let parser = docs_parser(Some(5));

    let intro = rendered(docs_outcome(&parser, "/intro").unwrap());
    assert_eq!(intro.title, "Introduction");
    assert!(intro.body_html.contains("<div class=\"p-notification\">"));
    assert!(intro.body_html.contains(">Read this first.</p>"));
    assert_eq!(intro.navigation.as_deref(), Some("Navigation missing"));
    assert!(intro.updated.ends_with("ago"));

    let install = rendered(docs_outcome(&parser, "/docs/guides/install").unwrap());
    assert!(install.body_html.contains("<div class=\"p-notification--caution\">"));
    assert!(install.body_html.contains(">Back up your data first.</p>"));
    assert!(!install.body_html.contains("NOTE TO EDITORS"));
    assert!(!install.body_html.contains("version numbers"));
    assert!(install.body_html.contains("<p>Done.</p>"));
}

#[test]
fn test_docs_redirects() {
    let parser = docs_parser(Some(5));

    assert_eq!(
        docs_outcome(&parser, "/getting-started").unwrap(),
        Outcome::Redirect("/docs/intro".to_string())
    );
    assert_eq!(
        docs_outcome(&parser, "/install").unwrap(),
        Outcome::Redirect("/docs/guides/install".to_string())
    );
    assert_eq!(
        docs_outcome(&parser, "/t/introduction/42").unwrap(),
        Outcome::Redirect("/docs/intro".to_string())
    );
    assert_eq!(
        docs_outcome(&parser, "/t/chat/50").unwrap(),
        Outcome::Redirect("https://forum.example.com/t/chat/50".to_string())
    );
}

#[test]
fn test_docs_missing_pages() {
    let parser = docs_parser(None);

    assert_eq!(docs_outcome(&parser, "/nope").unwrap(), Outcome::NotFound);
    assert_eq!(
        docs_outcome(&parser, "/t/missing/404"),
        Err(PageError::Fetch(FetchError::not_found(404)))
    );

    parser.parse().unwrap();
    assert_eq!(
        parser.resolve_path("/docs/missing"),
        Err(ResolveError::not_found("/docs/missing"))
    );
}

#[test]
fn test_docs_sitemap() {
    let parser = docs_parser(None);
    let snapshot = parser.parse().unwrap();

    let text = sitemap::sitemap_text("https://example.com", &snapshot.url_map);
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text.lines().next(), Some("https://example.com/docs"));

    let pages = sitemap::sitemap_pages("https://example.com", &snapshot.url_map, parser.source());
    assert_eq!(pages[0].lastmod.as_deref(), Some("2020-01-10T09:00:00+00:00"));
    assert!(pages.iter().all(|page| page.lastmod.is_some()));

    let xml = sitemap::sitemap_xml(&pages);
    assert_eq!(xml.matches("<url>").count(), 4);
}

#[test]
fn test_concurrent_parse_publishes_whole_snapshots() {
    let parser = Arc::new(docs_parser(None));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || {
                for _ in 0..5 {
                    let published = parser.parse().unwrap();
                    assert_eq!(published.url_map.len(), 4);

                    let current = parser.snapshot();
                    assert_eq!(current.url_map.len(), 4);
                    assert_eq!(current.redirects.len(), 2);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_engage_index_snapshot() {
    let parser = engage_parser();
    let snapshot = parser.parse().unwrap();

    assert_eq!(snapshot.metadata.len(), 3);
    assert_eq!(snapshot.takeovers.len(), 1);
    assert_eq!(
        snapshot.takeovers[0].get("primary_url"),
        Some("/engage/cloud-webinar")
    );
    assert_eq!(snapshot.url_map.topic_id("/engage/edge-whitepaper"), Some(8));
    assert_eq!(snapshot.warnings.len(), 1);
    assert!(snapshot.warnings[0].contains("type is missing"));
}

#[test]
fn test_engage_page_rendering() {
    let parser = engage_parser();
    let document = rendered(engage_outcome(&parser, "/cloud-webinar", false).unwrap());

    assert_eq!(document.body_html.trim(), "<p>Cloud webinar details.</p>");
    assert!(document.warnings.is_empty());

    let metadata = document.metadata.unwrap();
    assert_eq!(metadata.kind(), Some("live webinar"));
    assert_eq!(metadata.get("image_url"), Some("https://assets.example.com/cloud.png"));
    assert_eq!(metadata.tags(), vec!["cloud"]);

    let related: Vec<_> = document.related.iter().filter_map(|r| r.path()).collect();
    assert_eq!(related, vec!["/cloud-webinar", "/edge-whitepaper"]);
}

#[test]
fn test_engage_inactive_and_untabled_pages() {
    let parser = engage_parser();

    assert_eq!(
        engage_outcome(&parser, "/edge-whitepaper", false).unwrap(),
        Outcome::Redirect("https://forum.example.com/t/edge-whitepaper/8".to_string())
    );
    let preview = rendered(engage_outcome(&parser, "/edge-whitepaper", true).unwrap());
    assert_eq!(preview.title, "Edge whitepaper");

    let case_study = rendered(engage_outcome(&parser, "/desktop-case-study", false).unwrap());
    assert_eq!(
        case_study.warnings,
        vec!["Metadata could not be parsed correctly".to_string()]
    );
    assert_eq!(case_study.related.len(), 1);

    assert_eq!(
        engage_outcome(&parser, "/unknown", false).unwrap(),
        Outcome::NotFound
    );
}
