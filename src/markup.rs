//! Tolerant HTML fragment tree.
//!
//! Stored cell and block content is an HTML fragment produced by browsers and
//! by earlier versions of the editor. This module tokenizes it with quick-xml
//! in a forgiving mode and builds a small element tree:
//! - Void elements (`br`, `img`, `hr`, ...) never take children
//! - End tags without a matching open element are ignored
//! - Unclosed elements are closed at the end of their parent
//! - Unknown named entities are kept literally

use quick_xml::escape::{escape, partial_escape, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

const VOID_ELEMENTS: &[&str] = &[
    "br", "img", "hr", "input", "meta", "link", "wbr", "col", "source", "area",
];

/// A node of the fragment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with lowercase tag name and ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|part| part == class))
    }

    /// Value of a CSS property in the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<String> {
        self.attr("style")
            .and_then(|style| style_property(style, property))
    }

    /// Element children only, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    /// First descendant (depth-first, pre-order) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.children, pred)
    }
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::Text(text.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }

    /// First element (depth-first, pre-order) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.nodes, pred)
    }
}

fn find_in<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(e) = node {
            if pred(e) {
                return Some(e);
            }
            if let Some(found) = find_in(&e.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.tag == "br" => out.push('\n'),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}

/// Extract one property from an inline CSS declaration list.
pub fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(property))
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Decode entities, keeping the raw text when it contains an entity we do
/// not know.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    match unescape_with(raw, resolve_html_entity) {
        Ok(text) => text,
        Err(_) => Cow::Borrowed(raw),
    }
}

fn resolve_html_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{a0}"),
        "laquo" => Some("«"),
        "raquo" => Some("»"),
        "eacute" => Some("é"),
        "egrave" => Some("è"),
        "agrave" => Some("à"),
        "ccedil" => Some("ç"),
        "hellip" => Some("…"),
        "ndash" => Some("–"),
        "mdash" => Some("—"),
        "rsquo" => Some("’"),
        "lsquo" => Some("‘"),
        "euro" => Some("€"),
        _ => None,
    }
}

fn element_from_start(e: &BytesStart) -> Element {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let mut element = Element::new(tag);
    for attr in e.html_attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = decode_entities(&raw).into_owned();
        element.attrs.push((key, value));
    }
    element
}

/// Open-element stack used while building the tree.
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn push_node(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            prev.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_string()));
        }
    }

    fn close_top(&mut self) {
        if let Some(done) = self.open.pop() {
            self.push_node(Node::Element(done));
        }
    }

    fn close(&mut self, tag: &str) {
        let Some(depth) = self.open.iter().rposition(|e| e.tag == tag) else {
            return;
        };
        while self.open.len() > depth {
            self.close_top();
        }
    }

    fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.close_top();
        }
        Fragment { nodes: self.root }
    }
}

/// Parse an HTML fragment. Never fails: input the tokenizer cannot handle
/// degrades to its text with tags stripped.
pub fn parse(html: &str) -> Fragment {
    match try_parse(html) {
        Ok(fragment) => fragment,
        Err(e) => {
            log::warn!("markup parse failed ({e}); keeping text only");
            Fragment::text(strip_tags(html))
        }
    }
}

fn try_parse(html: &str) -> Result<Fragment, quick_xml::Error> {
    let mut reader = Reader::from_str(html);
    reader.trim_text(false);
    reader.check_end_names(false);
    reader.expand_empty_elements(false);

    let mut builder = TreeBuilder {
        root: Vec::new(),
        open: Vec::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let element = element_from_start(e);
                if is_void(&element.tag) {
                    builder.push_node(Node::Element(element));
                } else {
                    builder.open.push(element);
                }
            }
            Event::Empty(ref e) => {
                builder.push_node(Node::Element(element_from_start(e)));
            }
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                builder.close(&tag);
            }
            Event::Text(ref t) => {
                let raw = String::from_utf8_lossy(t.as_ref());
                builder.push_text(&decode_entities(&raw));
            }
            Event::CData(ref t) => {
                builder.push_text(&String::from_utf8_lossy(t.as_ref()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(builder.finish())
}

/// Remove anything between `<` and `>`.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(&out).into_owned()
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&partial_escape(t.as_str())),
        Node::Element(e) => write_element(e, out),
    }
}

fn write_element(e: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&e.tag);
    for (key, value) in &e.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push('>');
    if is_void(&e.tag) {
        return;
    }
    for child in &e.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&e.tag);
    out.push('>');
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_simple_markup() {
        let html = r#"<p>Hello <b>world</b><br>again</p>"#;
        assert_eq!(parse(html).to_html(), html);
    }

    #[test]
    fn test_unclosed_and_stray_end_tags() {
        let fragment = parse("<div><p>one<p>two</div></span>tail");
        assert_eq!(
            fragment.to_html(),
            "<div><p>one<p>two</p></p></div>tail"
        );
    }

    #[test]
    fn test_unquoted_attribute_and_entities() {
        let fragment = parse("<a href=https://x.test target=_blank>Q&amp;A&nbsp;!</a>");
        let Node::Element(a) = &fragment.nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(a.attr("href"), Some("https://x.test"));
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(a.text_content(), "Q&A\u{a0}!");
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
        assert_eq!(decode_entities("&lt;a&gt;"), "<a>");
    }

    #[test]
    fn test_style_property() {
        assert_eq!(
            style_property("color: #2563eb; text-decoration: underline;", "color"),
            Some("#2563eb".to_string())
        );
        assert_eq!(style_property("font-weight:bold", "color"), None);
    }

    #[test]
    fn test_text_content_maps_br_to_newline() {
        assert_eq!(parse("<p>a<br>b</p>").text_content(), "a\nb");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>x &lt; y</p>"), "x < y");
    }
}
