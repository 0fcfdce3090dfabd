//! Sitemaps over the paths of a URL map

use crate::humanize;
use crate::topic::TopicSource;
use crate::url_map::UrlMap;
use itertools::Itertools;
use serde::Serialize;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One entry of an XML sitemap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapPage {
    /// Absolute URL of the page
    pub loc: String,

    /// Last update of the page's topic, `None` when it could not be fetched
    pub lastmod: Option<String>,
}

fn absolute_url(host: &str, path: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), path)
}

/// Plain-text sitemap: one absolute URL per mapped path, in map order
pub fn sitemap_text(host: &str, url_map: &UrlMap) -> String {
    url_map
        .paths()
        .map(|(path, _)| absolute_url(host, path))
        .join("\n")
}

/// Collect sitemap entries, fetching each page's topic for its update time
///
/// Every URL costs one fetch. A failed fetch only leaves `lastmod` empty.
pub fn sitemap_pages<S: TopicSource>(
    host: &str,
    url_map: &UrlMap,
    source: &S,
) -> Vec<SitemapPage> {
    url_map
        .paths()
        .map(|(path, topic_id)| {
            let lastmod = match source.get_topic(topic_id) {
                Ok(topic) => topic
                    .first_post()
                    .and_then(|post| humanize::parse_timestamp(&post.updated_at))
                    .map(|updated| updated.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
                Err(e) => {
                    log::debug!("No lastmod for {}: {}", path, e);
                    None
                }
            };

            SitemapPage {
                loc: absolute_url(host, path),
                lastmod,
            }
        })
        .collect()
}

/// Render sitemap entries as an XML `urlset`
pub fn sitemap_xml(pages: &[SitemapPage]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n",
        SITEMAP_NAMESPACE
    );

    for page in pages {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&page.loc)));
        xml.push_str("    <changefreq>weekly</changefreq>\n");
        if let Some(ref lastmod) = page.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(lastmod)));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
