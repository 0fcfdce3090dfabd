//! Post-processing of cooked post HTML before it is published
//!
//! Two passes run over a freshly parsed tree:
//! - blockquotes opening with the "ⓘ" glyph or the `:warning:` emoji become
//!   notification blocks
//! - "NOTE TO EDITORS" callouts are removed entirely
//!
//! Both passes apply to every occurrence and leave unrelated markup untouched.

use crate::html;
use kuchikiki::NodeRef;

/// Exact text that marks an editorial callout
const EDITORIAL_MARKER: &str = "NOTE TO EDITORS";

/// Leading glyph of an informational callout
const INFO_GLYPH: &str = "ⓘ ";

/// `title` of the emoji image leading a caution callout
const WARNING_ICON_TITLE: &str = ":warning:";

const INFO_CLASS: &str = "p-notification";
const CAUTION_CLASS: &str = "p-notification--caution";
const FIRST_PARAGRAPH_CLASS: &str = "u-no-padding--top";
const LAST_PARAGRAPH_CLASS: &str = "u-no-margin--bottom";

/// Apply every post-processing step to a post body
///
/// # Parameters
/// * `html` - Cooked HTML of a forum post
///
/// # Returns
/// * `String` - The publishable HTML
pub fn process_body(html: &str) -> String {
    let body = html::parse_fragment(html);
    process_tree(&body);
    html::inner_html(&body)
}

/// Apply every post-processing step to an already parsed tree
pub(crate) fn process_tree(root: &NodeRef) {
    replace_info_notifications(root);
    replace_warning_notifications(root);
    remove_notes_to_editors(root);
}

/// Remove "NOTE TO EDITORS" callouts
///
/// The expected markup is:
///
/// ```html
/// <aside class="quote no-group">
///   <blockquote>
///     <p>
///       <img title=":construction:" class="emoji">
///       <strong>NOTE TO EDITORS</strong>
///     </p>
///     <p>...</p>
///   </blockquote>
/// </aside>
/// ```
///
/// so the container sits four levels above the marker text. Markers in any
/// other structure are left alone.
fn remove_notes_to_editors(root: &NodeRef) {
    let markers: Vec<NodeRef> = root
        .descendants()
        .filter(|node| {
            node.as_text()
                .is_some_and(|text| text.borrow().as_str() == EDITORIAL_MARKER)
        })
        .collect();

    for marker in markers {
        let Some(container) = marker.ancestors().nth(3) else {
            continue;
        };

        if html::is_element(&container, "aside") && html::has_class(&container, "quote") {
            container.detach();
        } else {
            log::debug!("Editorial marker outside an aside.quote container; left in place");
        }
    }
}

/// Rewrite `<blockquote><p>ⓘ ...</p></blockquote>` into an info notification
fn replace_info_notifications(root: &NodeRef) {
    let glyphs: Vec<NodeRef> = root
        .descendants()
        .filter(|node| {
            node.as_text()
                .is_some_and(|text| text.borrow().contains(INFO_GLYPH))
        })
        .collect();

    for glyph in glyphs {
        let Some((paragraph, blockquote)) = paragraph_in_blockquote(&glyph) else {
            continue;
        };

        mark_edge_paragraphs(&paragraph, &blockquote);

        // Only a glyph opening the blockquote's first paragraph is stripped
        let opens_blockquote = paragraph.first_child().as_ref() == Some(&glyph)
            && html::element_children(&blockquote).first() == Some(&paragraph);
        if opens_blockquote {
            if let Some(text) = glyph.as_text() {
                let stripped = strip_glyph(&text.borrow());
                *text.borrow_mut() = stripped;
            }
        }

        wrap_in_notification(&blockquote, INFO_CLASS);
    }
}

/// Rewrite `<blockquote><p><img title=":warning:"> ...</p></blockquote>` into a caution notification
fn replace_warning_notifications(root: &NodeRef) {
    let icons: Vec<NodeRef> = root
        .descendants()
        .filter(|node| {
            html::is_element(node, "img")
                && html::attribute(node, "title").as_deref() == Some(WARNING_ICON_TITLE)
        })
        .collect();

    for icon in icons {
        let Some((paragraph, blockquote)) = paragraph_in_blockquote(&icon) else {
            continue;
        };

        let following = icon.next_sibling();
        icon.detach();

        mark_edge_paragraphs(&paragraph, &blockquote);

        if let Some(text) = following.as_ref().and_then(|node| node.as_text()) {
            let trimmed = text.borrow().trim_start_matches(' ').to_string();
            *text.borrow_mut() = trimmed;
        }

        wrap_in_notification(&blockquote, CAUTION_CLASS);
    }
}

/// The node's parent paragraph and that paragraph's parent blockquote
fn paragraph_in_blockquote(node: &NodeRef) -> Option<(NodeRef, NodeRef)> {
    let paragraph = node.parent().filter(|p| html::is_element(p, "p"))?;
    let blockquote = paragraph
        .parent()
        .filter(|b| html::is_element(b, "blockquote"))?;
    Some((paragraph, blockquote))
}

/// Drop the outer spacing of a notification's first and last paragraphs
fn mark_edge_paragraphs(first_paragraph: &NodeRef, blockquote: &NodeRef) {
    html::set_class(first_paragraph, FIRST_PARAGRAPH_CLASS);

    if let Some(last) = html::element_children(blockquote).last() {
        if html::is_element(last, "p") {
            html::add_class(last, LAST_PARAGRAPH_CLASS);
        }
    }
}

/// Strip a leading "ⓘ" and the spaces after it
fn strip_glyph(text: &str) -> String {
    let leading = text.len() - text.trim_start_matches('\n').len();
    let rest = &text[leading..];
    match rest.strip_prefix(INFO_GLYPH) {
        Some(after) => after.trim_start_matches(' ').to_string(),
        None => text.to_string(),
    }
}

/// Replace `blockquote` with a notification wrapper holding its children
fn wrap_in_notification(blockquote: &NodeRef, notification_class: &str) {
    let template = html::parse_fragment(&format!(
        "<div class=\"{}\"><div class=\"p-notification__response\"></div></div>",
        notification_class
    ));
    let Some(wrapper) = template.first_child() else {
        return;
    };
    let Some(response) = wrapper.first_child() else {
        return;
    };

    html::move_children(blockquote, &response);
    blockquote.insert_before(wrapper);
    blockquote.detach();
}
