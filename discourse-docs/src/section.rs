//! Heading-delimited sections of an HTML fragment
//!
//! Index topics are written as one long post. Named regions of it
//! ("Content", "URLs", "Metadata", ...) are introduced by a heading, and run
//! until the next heading of the same level.

use crate::html;
use kuchikiki::NodeRef;

/// Extract the section introduced by the heading whose text is `heading_text`
///
/// # Parameters
/// * `html` - HTML fragment to search
/// * `heading_text` - Exact (trimmed) text of the heading, e.g. "Content"
///
/// # Returns
/// * `Some(String)` - The serialized siblings after the heading, up to but
///   excluding the next heading of the same level
/// * `None` - No `h1`..`h6` with that text exists
pub fn extract_section(html: &str, heading_text: &str) -> Option<String> {
    let body = html::parse_fragment(html);
    section_nodes(&body, heading_text).map(html::serialize_nodes)
}

/// Extract everything before the heading whose text is `heading_text`
///
/// Returns the whole fragment when the heading is absent.
pub fn extract_preamble(html: &str, heading_text: &str) -> String {
    let body = html::parse_fragment(html);
    html::serialize_nodes(preamble_nodes(&body, heading_text))
}

/// Find the first heading element anywhere under `root` with the given text
pub(crate) fn find_heading(root: &NodeRef, heading_text: &str) -> Option<NodeRef> {
    root.descendants().find(|node| {
        html::heading_level(node).is_some() && node.text_contents().trim() == heading_text
    })
}

/// Nodes of the section introduced by `heading_text`, in document order
pub(crate) fn section_nodes(root: &NodeRef, heading_text: &str) -> Option<Vec<NodeRef>> {
    let heading = find_heading(root, heading_text)?;
    let level = html::heading_level(&heading)?;

    let mut nodes = Vec::new();
    let mut next = heading.next_sibling();
    while let Some(node) = next {
        if html::heading_level(&node) == Some(level) {
            break;
        }
        next = node.next_sibling();
        nodes.push(node);
    }

    Some(nodes)
}

/// Nodes preceding the heading `heading_text`, in document order
pub(crate) fn preamble_nodes(root: &NodeRef, heading_text: &str) -> Vec<NodeRef> {
    let Some(heading) = find_heading(root, heading_text) else {
        return root.children().collect();
    };

    let mut nodes = Vec::new();
    let mut previous = heading.previous_sibling();
    while let Some(node) = previous {
        previous = node.previous_sibling();
        nodes.push(node);
    }
    nodes.reverse();
    nodes
}
