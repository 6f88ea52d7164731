//! Content normalization and repair of corrupted stored content.
//!
//! Earlier persistence bugs left two kinds of damage in stored fragments:
//! markup that was HTML-escaped once too often (`&lt;a href=...&gt;`), and
//! the page's structural wrapper (`<section>` cards) saved along with the
//! user's text. Both are repaired on load, before content reaches a region.

use std::borrow::Cow;

use crate::markup::{self, Element, Node};

/// Marker attribute on the presentation wrapper emitted by
/// [`crate::render::wrap_block`].
pub const CALLOUT_ATTR: &str = "data-callout";
/// Marker attribute on the element holding the user's text inside a callout.
pub const CALLOUT_CONTENT_ATTR: &str = "data-callout-content";

const EMPTY_PLACEHOLDERS: &[&str] = &[
    "",
    "<br>",
    "<br/>",
    "<br />",
    "<p></p>",
    "<p><br></p>",
    "<p><br/></p>",
    "<p><br /></p>",
    "<div><br></div>",
];

/// True if `content` carries no user text: empty or placeholder markup only.
pub fn is_placeholder(content: &str) -> bool {
    let trimmed = content.trim();
    EMPTY_PLACEHOLDERS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(trimmed))
}

/// Trim content and collapse empty placeholder markup to `""`.
pub fn normalize_content(content: &str) -> String {
    if is_placeholder(content) {
        String::new()
    } else {
        content.trim().to_string()
    }
}

fn looks_escaped(content: &str) -> bool {
    content.contains("&lt;a") || content.contains("&gt;")
}

/// Undo one level of HTML escaping when the content looks like escaped markup.
pub fn unescape_stored(content: &str) -> Cow<'_, str> {
    if !looks_escaped(content) {
        return Cow::Borrowed(content);
    }
    log::warn!("stored content holds escaped markup; unescaping");
    Cow::Owned(
        content
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

fn has_wrapper_signature(content: &str) -> bool {
    content.contains("<section") || content.contains("bg-white rounded-2xl")
}

fn is_card(e: &Element) -> bool {
    e.tag == "div" && e.has_class("bg-white")
}

/// Extract the user's content from a fragment that leaked its page wrapper.
///
/// Returns `None` when no wrapper signature is present.
pub fn extract_wrapped_content(content: &str) -> Option<String> {
    if !has_wrapper_signature(content) {
        return None;
    }

    let fragment = markup::parse(content);
    let wrapper = fragment
        .find(&|e| e.tag == "section")
        .or_else(|| fragment.find(&is_card))?;

    log::warn!("stored content holds a leaked <{}> wrapper; extracting", wrapper.tag);

    let Some(first) = wrapper.child_elements().next() else {
        return Some(wrapper.text_content());
    };

    let extracted = match first.tag.as_str() {
        "p" => {
            let run: String = wrapper
                .child_elements()
                .filter(|e| {
                    e.tag == "p"
                        || (e.tag == "div" && !e.has_class("space-y-6") && !e.has_class("bg-white"))
                })
                .map(Element::outer_html)
                .collect();
            if run.is_empty() {
                first.outer_html()
            } else {
                run
            }
        }
        "div" if first.has_class("space-y-6") => first.inner_html(),
        _ => wrapper.inner_html(),
    };
    Some(extracted)
}

/// Strip our own callout wrapper if it was saved around the content.
pub fn strip_callout_wrapper(content: &str) -> Option<String> {
    if !content.contains(CALLOUT_ATTR) {
        return None;
    }
    let fragment = markup::parse(content);
    let mut top = fragment.nodes.iter().filter(|n| match n {
        Node::Text(t) => !t.trim().is_empty(),
        Node::Element(_) => true,
    });
    let (Some(Node::Element(outer)), None) = (top.next(), top.next()) else {
        return None;
    };
    if outer.attr(CALLOUT_ATTR).is_none() {
        return None;
    }
    let inner = outer
        .find(&|e| e.attr(CALLOUT_CONTENT_ATTR).is_some())
        .map_or_else(|| outer.inner_html(), Element::inner_html);
    log::warn!("stored content holds a callout wrapper; unwrapping");
    Some(inner)
}

/// Full repair pipeline applied when stored content is loaded.
pub fn sanitize_stored(content: &str) -> String {
    let unescaped = unescape_stored(content);
    let extracted = extract_wrapped_content(&unescaped).unwrap_or_else(|| unescaped.into_owned());
    let unwrapped = strip_callout_wrapper(&extracted).unwrap_or(extracted);
    normalize_content(&unwrapped)
}

/// Plain text of a stored fragment (tags removed, entities decoded).
pub fn plain_text(content: &str) -> String {
    markup::parse(content).text_content()
}
