//! Small helpers over the `kuchikiki` DOM
//!
//! Every transform in this crate parses its input into a fresh tree, mutates
//! that tree in place, and serializes the result back to a string. These
//! helpers keep the parse/serialize boilerplate in one place.

use kuchikiki::traits::*;
use kuchikiki::NodeRef;

/// Parse an HTML fragment and return its `<body>` element
///
/// The HTML parser always wraps input in `html`/`head`/`body`; callers only
/// care about the body children, which are the fragment's top-level nodes.
pub fn parse_fragment(html: &str) -> NodeRef {
    let document = kuchikiki::parse_html().one(html);
    match document.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(()) => document,
    }
}

/// Serialize a node, including the node itself
pub fn outer_html(node: &NodeRef) -> String {
    let mut out = Vec::new();
    if let Err(e) = node.serialize(&mut out) {
        log::debug!("Failed to serialize node: {}", e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Serialize the children of a node (the node's "inner HTML")
pub fn inner_html(node: &NodeRef) -> String {
    serialize_nodes(node.children())
}

/// Serialize a sequence of nodes back to back, preserving order
pub fn serialize_nodes<I>(nodes: I) -> String
where
    I: IntoIterator<Item = NodeRef>,
{
    nodes.into_iter().map(|node| outer_html(&node)).collect()
}

/// Whether `node` is an element with the given tag name
pub fn is_element(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|element| element.name.local.as_ref() == name)
}

/// Heading level (1-6) of an `h1`..`h6` element
pub fn heading_level(node: &NodeRef) -> Option<u8> {
    let element = node.as_element()?;
    let name = element.name.local.as_ref();
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Attribute value of an element node
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|element| element.attributes.borrow().get(name).map(str::to_string))
}

/// Whether the element's `class` attribute contains `class`
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attribute(node, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Replace the element's `class` attribute
pub fn set_class(node: &NodeRef, class: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert("class", class.to_string());
    }
}

/// Append a class to the element's `class` attribute
pub fn add_class(node: &NodeRef, class: &str) {
    match attribute(node, "class") {
        Some(existing) if !existing.trim().is_empty() => {
            set_class(node, &format!("{} {}", existing, class));
        }
        _ => set_class(node, class),
    }
}

/// Element children of a node (text and comment nodes skipped)
pub fn element_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children()
        .filter(|child| child.as_element().is_some())
        .collect()
}

/// Element children with the given tag name
pub fn child_elements(node: &NodeRef, name: &str) -> Vec<NodeRef> {
    node.children()
        .filter(|child| is_element(child, name))
        .collect()
}

/// First descendant element (excluding `node`) with the given tag name
pub fn first_descendant(node: &NodeRef, name: &str) -> Option<NodeRef> {
    node.descendants().find(|child| is_element(child, name))
}

/// Move every child of `from` to the end of `to`, preserving order
pub fn move_children(from: &NodeRef, to: &NodeRef) {
    let children: Vec<NodeRef> = from.children().collect();
    for child in children {
        to.append(child);
    }
}
