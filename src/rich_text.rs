//! Rich-text model for editable regions.
//!
//! Region content is held as paragraphs of styled runs rather than as a live
//! element tree. Formatting and link operations edit runs over character
//! ranges, and the model is converted to and from stored HTML at the region
//! boundary.
//!
//! Offsets are in characters over the flattened text, where each paragraph
//! boundary counts as one character.

use serde::Serialize;

use crate::markup::{self, Element, Fragment, Node};

/// Horizontal indentation per indent level, in pixels.
pub const INDENT_STEP_PX: usize = 40;
/// Deepest indent level produced by `Indent`.
pub const MAX_INDENT: u8 = 8;

/// Font size of a run: a legacy `<font size>` level or a CSS length carried
/// on a styled span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FontSize {
    Level(u8),
    Css(String),
}

impl FontSize {
    pub fn level(&self) -> Option<u8> {
        match self {
            Self::Level(n) => Some(*n),
            Self::Css(_) => None,
        }
    }
}

/// Hyperlink attached to a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    pub href: String,
    pub new_tab: bool,
    /// Inline CSS of the anchor element.
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
    pub font_size: Option<FontSize>,
    pub link: Option<Link>,
}

impl RunStyle {
    /// Same style with character formatting removed. Links survive.
    pub fn cleared(&self) -> Self {
        Self {
            link: self.link.clone(),
            ..Self::default()
        }
    }
}

/// A stretch of text sharing one style. `'\n'` is a line break.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::default())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Block-level container of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphKind {
    /// Loose inline content without a wrapping element.
    Inline,
    #[default]
    Paragraph,
    Div,
    Heading(u8),
    ListItem {
        ordered: bool,
    },
}

impl ParagraphKind {
    fn tag(self) -> Option<String> {
        match self {
            Self::Inline => None,
            Self::Paragraph => Some("p".to_string()),
            Self::Div => Some("div".to_string()),
            Self::Heading(level) => Some(format!("h{}", level.clamp(1, 6))),
            Self::ListItem { .. } => Some("li".to_string()),
        }
    }

    fn list_tag(self) -> Option<&'static str> {
        match self {
            Self::ListItem { ordered: true } => Some("ol"),
            Self::ListItem { ordered: false } => Some("ul"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub indent: u8,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(kind: ParagraphKind, indent: u8) -> Self {
        Self {
            kind,
            indent,
            runs: Vec::new(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Split runs so that a run boundary falls at `offset`; returns the index
    /// of the first run starting at or after it.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        let mut index = 0;
        while let Some(run) = self.runs.get_mut(index) {
            if offset <= pos {
                return index;
            }
            let len = run.char_len();
            if offset < pos + len {
                let tail = run.text.split_off(byte_index(&run.text, offset - pos));
                let style = run.style.clone();
                self.runs.insert(index + 1, Run::new(tail, style));
                return index + 1;
            }
            pos += len;
            index += 1;
        }
        self.runs.len()
    }

    /// Drop empty runs and coalesce neighbours with equal style.
    fn merge_runs(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.style == run.style => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Run containing the character just before `offset`, or the first run.
    fn style_at(&self, offset: usize) -> Option<&RunStyle> {
        let mut pos = 0;
        for run in &self.runs {
            let len = run.char_len();
            if offset > pos && offset <= pos + len {
                return Some(&run.style);
            }
            pos += len;
        }
        self.runs.first().map(|r| &r.style)
    }
}

/// Character range over the flattened text. Collapsed when `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Clamp both ends into `0..=len`.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Part of a range falling inside one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slice {
    paragraph: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    pub paragraphs: Vec<Paragraph>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty paragraph, the seed of a fresh region.
    pub fn empty_paragraph() -> Self {
        Self {
            paragraphs: vec![Paragraph::new(ParagraphKind::Paragraph, 0)],
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::from_fragment(&markup::parse(html))
    }

    pub fn from_fragment(fragment: &Fragment) -> Self {
        let mut builder = Builder::default();
        builder.walk(
            &fragment.nodes,
            &RunStyle::default(),
            Ctx {
                kind: ParagraphKind::Inline,
                indent: 0,
                in_list: false,
            },
        );
        builder.finish()
    }

    pub fn to_html(&self) -> String {
        self.to_fragment().to_html()
    }

    pub fn to_fragment(&self) -> Fragment {
        let mut nodes = Vec::new();
        let mut list: Option<Element> = None;

        for paragraph in &self.paragraphs {
            let list_tag = paragraph.kind.list_tag();
            if list.as_ref().map(|l| l.tag.as_str()) != list_tag {
                if let Some(done) = list.take() {
                    nodes.push(Node::Element(done));
                }
                list = list_tag.map(Element::new);
            }

            let Some(tag) = paragraph.kind.tag() else {
                nodes.extend(inline_nodes(&paragraph.runs));
                continue;
            };
            let mut element = Element::new(tag);
            if paragraph.indent > 0 {
                element.set_attr(
                    "style",
                    format!("margin-left: {}px", usize::from(paragraph.indent) * INDENT_STEP_PX),
                );
            }
            element.children = if paragraph.is_empty() {
                vec![Node::Element(Element::new("br"))]
            } else {
                inline_nodes(&paragraph.runs)
            };
            match list.as_mut() {
                Some(l) => l.children.push(Node::Element(element)),
                None => nodes.push(Node::Element(element)),
            }
        }
        if let Some(done) = list {
            nodes.push(Node::Element(done));
        }
        Fragment { nodes }
    }

    /// Flattened text with paragraphs joined by `'\n'`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Length in characters, paragraph boundaries included.
    pub fn len(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::char_len).sum::<usize>()
            + self.paragraphs.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_empty)
    }

    /// Paragraph index and local offset of a flattened offset. Offsets past
    /// the end resolve to the end of the last paragraph.
    fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            let end = start + paragraph.char_len();
            if offset <= end {
                return Some((index, offset - start));
            }
            start = end + 1;
        }
        let last = self.paragraphs.len().checked_sub(1)?;
        let len = self.paragraphs.get(last).map_or(0, Paragraph::char_len);
        Some((last, len))
    }

    fn slices(&self, range: TextRange) -> Vec<Slice> {
        let (Some((first, a)), Some((last, b))) = (self.locate(range.start), self.locate(range.end))
        else {
            return Vec::new();
        };
        (first..=last)
            .map(|paragraph| {
                let len = self.paragraphs.get(paragraph).map_or(0, Paragraph::char_len);
                Slice {
                    paragraph,
                    start: if paragraph == first { a } else { 0 },
                    end: if paragraph == last { b } else { len },
                }
            })
            .collect()
    }

    /// Indices of paragraphs touched by `range` (the cursor's paragraph when
    /// collapsed).
    pub fn paragraphs_in(&self, range: TextRange) -> Vec<usize> {
        self.slices(range).iter().map(|s| s.paragraph).collect()
    }

    pub fn paragraphs_in_mut(
        &mut self,
        range: TextRange,
    ) -> impl Iterator<Item = &mut Paragraph> + '_ {
        let indices = self.paragraphs_in(range);
        self.paragraphs
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| indices.contains(i))
            .map(|(_, p)| p)
    }

    /// Styles of every run overlapping a non-collapsed `range`.
    pub fn styles_in(&self, range: TextRange) -> Vec<&RunStyle> {
        let mut out = Vec::new();
        for slice in self.slices(range) {
            let Some(paragraph) = self.paragraphs.get(slice.paragraph) else {
                continue;
            };
            let mut pos = 0;
            for run in &paragraph.runs {
                let len = run.char_len();
                if pos < slice.end && pos + len > slice.start {
                    out.push(&run.style);
                }
                pos += len;
            }
        }
        out
    }

    /// Style in effect at a cursor position.
    pub fn style_at(&self, offset: usize) -> RunStyle {
        self.locate(offset)
            .and_then(|(p, local)| self.paragraphs.get(p)?.style_at(local))
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `f` to the style of every character in `range`.
    pub fn map_style(&mut self, range: TextRange, mut f: impl FnMut(&mut RunStyle)) {
        for slice in self.slices(range) {
            if slice.start >= slice.end {
                continue;
            }
            let Some(paragraph) = self.paragraphs.get_mut(slice.paragraph) else {
                continue;
            };
            let first = paragraph.split_at(slice.start);
            let last = paragraph.split_at(slice.end);
            for run in paragraph.runs.iter_mut().take(last).skip(first) {
                f(&mut run.style);
            }
            paragraph.merge_runs();
        }
    }

    /// Insert `text` at `offset` with `style`; returns the offset after it.
    pub fn insert(&mut self, offset: usize, text: &str, style: RunStyle) -> usize {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::default());
        }
        let offset = offset.min(self.len());
        let Some((index, local)) = self.locate(offset) else {
            return offset;
        };
        if let Some(paragraph) = self.paragraphs.get_mut(index) {
            let at = paragraph.split_at(local);
            paragraph.runs.insert(at, Run::new(text, style));
            paragraph.merge_runs();
        }
        offset + text.chars().count()
    }

    /// Delete the characters of `range`, joining paragraphs it spans.
    pub fn delete(&mut self, range: TextRange) {
        if range.is_collapsed() {
            return;
        }
        let slices = self.slices(range);
        let (Some(first), Some(last)) = (slices.first().copied(), slices.last().copied()) else {
            return;
        };

        let mut tail = Vec::new();
        if let Some(paragraph) = self.paragraphs.get_mut(last.paragraph) {
            let cut = paragraph.split_at(last.end);
            tail = paragraph.runs.split_off(cut);
        }
        if let Some(paragraph) = self.paragraphs.get_mut(first.paragraph) {
            let cut = paragraph.split_at(first.start);
            paragraph.runs.truncate(cut);
            paragraph.runs.append(&mut tail);
            paragraph.merge_runs();
        }
        if last.paragraph > first.paragraph {
            self.paragraphs.drain(first.paragraph + 1..=last.paragraph);
        }
    }

    /// Range covered by the link under `range`, extended over neighbouring
    /// runs carrying the same link.
    pub fn link_extent(&self, range: TextRange) -> Option<(TextRange, Link)> {
        let (index, local) = self.locate(range.start)?;
        let paragraph = self.paragraphs.get(index)?;
        let base: usize = self.paragraphs.iter().take(index).map(|p| p.char_len() + 1).sum();

        let mut pos = 0;
        let mut spans: Vec<(usize, usize, Option<&Link>)> = Vec::new();
        for run in &paragraph.runs {
            let len = run.char_len();
            spans.push((pos, pos + len, run.style.link.as_ref()));
            pos += len;
        }

        let hit = spans.iter().position(|(s, e, link)| {
            let inside = if range.is_collapsed() {
                local > *s && local <= *e
            } else {
                local >= *s && local < *e
            };
            inside && link.is_some()
        })?;
        let link = spans.get(hit)?.2?.clone();

        let mut lo = hit;
        while lo > 0 && spans.get(lo - 1).and_then(|s| s.2) == Some(&link) {
            lo -= 1;
        }
        let mut hi = hit;
        while spans.get(hi + 1).and_then(|s| s.2) == Some(&link) {
            hi += 1;
        }
        let start = spans.get(lo)?.0;
        let end = spans.get(hi)?.1;
        Some((TextRange::new(base + start, base + end), link))
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(b, _)| b)
}

#[derive(Clone, Copy)]
struct Ctx {
    kind: ParagraphKind,
    indent: u8,
    in_list: bool,
}

#[derive(Default)]
struct Builder {
    paragraphs: Vec<Paragraph>,
    current: Option<Paragraph>,
}

impl Builder {
    fn flush(&mut self) {
        if let Some(mut paragraph) = self.current.take() {
            paragraph.merge_runs();
            // `<p><br></p>` is the browser's empty line placeholder.
            if paragraph.kind != ParagraphKind::Inline && paragraph.text() == "\n" {
                paragraph.runs.clear();
            }
            self.paragraphs.push(paragraph);
        }
    }

    fn push_text(&mut self, text: &str, style: &RunStyle, ctx: Ctx) {
        // Whitespace between block elements is source formatting.
        if self.current.is_none() && text.trim().is_empty() {
            return;
        }
        self.push_run(text, style, ctx);
    }

    fn push_run(&mut self, text: &str, style: &RunStyle, ctx: Ctx) {
        let paragraph = self
            .current
            .get_or_insert_with(|| Paragraph::new(ctx.kind, ctx.indent));
        paragraph.runs.push(Run::new(text, style.clone()));
    }

    fn block(&mut self, children: &[Node], style: &RunStyle, ctx: Ctx) {
        self.flush();
        let before = self.paragraphs.len();
        self.walk(children, style, ctx);
        self.flush();
        if self.paragraphs.len() == before {
            self.paragraphs.push(Paragraph::new(ctx.kind, ctx.indent));
        }
    }

    fn walk(&mut self, nodes: &[Node], style: &RunStyle, ctx: Ctx) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_text(text, style, ctx),
                Node::Element(e) => self.element(e, style, ctx),
            }
        }
    }

    fn element(&mut self, e: &Element, style: &RunStyle, ctx: Ctx) {
        let indent = ctx.indent.saturating_add(indent_of(e)).min(MAX_INDENT);
        match e.tag.as_str() {
            "br" => self.push_run("\n", style, ctx),
            "img" | "hr" => log::debug!("dropping <{}> from rich text", e.tag),
            "ul" | "ol" => {
                self.flush();
                let nested = if ctx.in_list {
                    indent.saturating_add(1).min(MAX_INDENT)
                } else {
                    indent
                };
                let item_ctx = Ctx {
                    kind: ParagraphKind::ListItem {
                        ordered: e.tag == "ol",
                    },
                    indent: nested,
                    in_list: true,
                };
                for child in &e.children {
                    match child {
                        Node::Element(li) if li.tag == "li" => {
                            let li_indent = nested.saturating_add(indent_of(li)).min(MAX_INDENT);
                            self.block(&li.children, style, Ctx { indent: li_indent, ..item_ctx });
                        }
                        other => self.walk(std::slice::from_ref(other), style, item_ctx),
                    }
                }
                self.flush();
            }
            "li" => self.block(
                &e.children,
                style,
                Ctx {
                    kind: ParagraphKind::ListItem { ordered: false },
                    indent,
                    in_list: true,
                },
            ),
            tag => match block_kind(tag) {
                Some(kind) => {
                    // A paragraph inside a list item stays part of the item.
                    let kind = if ctx.in_list && kind == ParagraphKind::Paragraph {
                        ctx.kind
                    } else {
                        kind
                    };
                    self.block(&e.children, style, Ctx { kind, indent, ..ctx });
                }
                None => self.walk(&e.children, &inline_style(style, e), ctx),
            },
        }
    }

    fn finish(mut self) -> RichText {
        self.flush();
        RichText {
            paragraphs: self.paragraphs,
        }
    }
}

fn block_kind(tag: &str) -> Option<ParagraphKind> {
    match tag {
        "p" => Some(ParagraphKind::Paragraph),
        "div" | "blockquote" | "section" | "article" | "header" | "footer" | "pre" => {
            Some(ParagraphKind::Div)
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => tag
            .get(1..)
            .and_then(|n| n.parse().ok())
            .map(ParagraphKind::Heading),
        _ => None,
    }
}

fn indent_of(e: &Element) -> u8 {
    let Some(value) = e
        .style_property("margin-left")
        .or_else(|| e.style_property("padding-left"))
    else {
        return 0;
    };
    let whole = value.trim_end_matches("px").split('.').next().unwrap_or_default();
    let px: usize = whole.trim().parse().unwrap_or(0);
    let levels = (px + INDENT_STEP_PX / 2) / INDENT_STEP_PX;
    u8::try_from(levels).unwrap_or(MAX_INDENT).min(MAX_INDENT)
}

fn inline_style(parent: &RunStyle, e: &Element) -> RunStyle {
    let mut style = parent.clone();
    match e.tag.as_str() {
        "b" | "strong" => style.bold = true,
        "i" | "em" => style.italic = true,
        "u" | "ins" => style.underline = true,
        "font" => {
            if let Some(level) = e
                .attr("size")
                .and_then(|s| s.trim().parse::<u8>().ok())
                .filter(|n| (1..=7).contains(n))
            {
                style.font_size = Some(FontSize::Level(level));
            }
            if let Some(color) = e.attr("color").filter(|c| !c.trim().is_empty()) {
                style.color = Some(color.trim().to_string());
            }
        }
        "a" => {
            style.link = Some(Link {
                href: e.attr("href").unwrap_or_default().to_string(),
                new_tab: e.attr("target") == Some("_blank"),
                style: e.attr("style").map(str::to_string),
            });
            return style;
        }
        _ => {}
    }

    if let Some(size) = e.style_property("font-size") {
        style.font_size = Some(FontSize::Css(size));
    }
    if let Some(color) = e.style_property("color") {
        style.color = Some(color);
    }
    match e.style_property("font-weight").as_deref() {
        Some("bold" | "bolder" | "600" | "700" | "800" | "900") => style.bold = true,
        Some("normal" | "400") => style.bold = false,
        _ => {}
    }
    if e.style_property("font-style").as_deref() == Some("italic") {
        style.italic = true;
    }
    if e
        .style_property("text-decoration")
        .is_some_and(|d| d.contains("underline"))
    {
        style.underline = true;
    }
    style
}

fn text_nodes(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::Element(Element::new("br")));
        }
        if !line.is_empty() {
            nodes.push(Node::Text(line.to_string()));
        }
    }
    nodes
}

fn wrap(tag: &str, children: Vec<Node>) -> Vec<Node> {
    vec![Node::Element(Element::new(tag).with_children(children))]
}

/// Nodes of one run, outermost first: size/color wrapper, `b`, `i`, `u`.
fn run_nodes(run: &Run) -> Vec<Node> {
    let style = &run.style;
    let mut nodes = text_nodes(&run.text);
    if style.underline {
        nodes = wrap("u", nodes);
    }
    if style.italic {
        nodes = wrap("i", nodes);
    }
    if style.bold {
        nodes = wrap("b", nodes);
    }
    match (&style.font_size, &style.color) {
        (Some(FontSize::Css(size)), color) => {
            let mut css = format!("font-size: {size}");
            if let Some(color) = color {
                css.push_str(&format!("; color: {color}"));
            }
            let span = Element::new("span").with_attr("style", css).with_children(nodes);
            nodes = vec![Node::Element(span)];
        }
        (Some(FontSize::Level(level)), color) => {
            let mut font = Element::new("font").with_attr("size", level.to_string());
            if let Some(color) = color {
                font.set_attr("color", color.clone());
            }
            nodes = vec![Node::Element(font.with_children(nodes))];
        }
        (None, Some(color)) => {
            let font = Element::new("font")
                .with_attr("color", color.clone())
                .with_children(nodes);
            nodes = vec![Node::Element(font)];
        }
        (None, None) => {}
    }
    nodes
}

fn anchor(link: &Link) -> Element {
    let mut a = Element::new("a").with_attr("href", link.href.clone());
    if link.new_tab {
        a.set_attr("target", "_blank");
        a.set_attr("rel", "noopener noreferrer");
    }
    if let Some(style) = &link.style {
        a.set_attr("style", style.clone());
    }
    a
}

/// Inline nodes of a paragraph; consecutive runs of one link share an `<a>`.
fn inline_nodes(runs: &[Run]) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut open: Option<(Link, Element)> = None;
    for run in runs {
        let link = run.style.link.as_ref();
        if open.as_ref().map(|(l, _)| l) != link {
            if let Some((_, a)) = open.take() {
                nodes.push(Node::Element(a));
            }
            open = link.map(|l| (l.clone(), anchor(l)));
        }
        match open.as_mut() {
            Some((_, a)) => a.children.extend(run_nodes(run)),
            None => nodes.extend(run_nodes(run)),
        }
    }
    if let Some((_, a)) = open {
        nodes.push(Node::Element(a));
    }
    nodes
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
    fn test_parse_paragraph_runs() {
        let text = RichText::from_html("<p>Hello <b>bold <i>both</i></b></p>");
        assert_eq!(text.paragraphs.len(), 1);
        let runs = &text.paragraphs[0].runs;
        assert_eq!(runs.len(), 3);
        assert!(runs[1].style.bold && !runs[1].style.italic);
        assert!(runs[2].style.bold && runs[2].style.italic);
    }

    #[test]
    fn test_loose_inline_content_round_trips() {
        let html = "Ligne 1, <b>Col</b> 1";
        assert_eq!(RichText::from_html(html).to_html(), html);
    }

    #[test]
    fn test_empty_paragraph_placeholder() {
        let text = RichText::from_html("<p><br></p>");
        assert_eq!(text.len(), 0);
        assert_eq!(text.to_html(), "<p><br></p>");
    }

    #[test]
    fn test_lists_group_items() {
        let html = "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>";
        let text = RichText::from_html(html);
        assert_eq!(text.paragraphs.len(), 3);
        assert_eq!(text.to_html(), html);
    }

    #[test]
    fn test_offsets_count_paragraph_boundaries() {
        let text = RichText::from_html("<p>ab</p><p>cd</p>");
        assert_eq!(text.len(), 5);
        assert_eq!(text.text(), "ab\ncd");
        assert_eq!(text.paragraphs_in(TextRange::new(1, 4)), vec![0, 1]);
    }

    #[test]
    fn test_map_style_splits_runs() {
        let mut text = RichText::from_html("<p>abcdef</p>");
        text.map_style(TextRange::new(2, 4), |s| s.bold = true);
        assert_eq!(text.to_html(), "<p>ab<b>cd</b>ef</p>");
    }

    #[test]
    fn test_insert_and_delete_across_paragraphs() {
        let mut text = RichText::from_html("<p>ab</p><p>cd</p>");
        text.delete(TextRange::new(1, 4));
        assert_eq!(text.to_html(), "<p>ad</p>");
        let end = text.insert(1, "XY", RunStyle::default());
        assert_eq!(end, 3);
        assert_eq!(text.text(), "aXYd");
    }

    #[test]
    fn test_link_serialization_new_tab() {
        let mut text = RichText::from_html("<p>see example</p>");
        text.map_style(TextRange::new(4, 11), |s| {
            s.link = Some(Link {
                href: "https://x.test".into(),
                new_tab: true,
                style: None,
            });
        });
        assert_eq!(
            text.to_html(),
            r#"<p>see <a href="https://x.test" target="_blank" rel="noopener noreferrer">example</a></p>"#
        );
    }

    #[test]
    fn test_link_extent_spans_styled_runs() {
        let text = RichText::from_html(r#"<p>x <a href="u">ab<b>cd</b></a> y</p>"#);
        let (range, link) = text.link_extent(TextRange::caret(4)).unwrap();
        assert_eq!(range, TextRange::new(2, 6));
        assert_eq!(link.href, "u");
    }

    #[test]
    fn test_font_and_span_sizes() {
        let text = RichText::from_html(
            r#"<p><font size="5" color="red">a</font><span style="font-size: 18px">b</span></p>"#,
        );
        let runs = &text.paragraphs[0].runs;
        assert_eq!(runs[0].style.font_size, Some(FontSize::Level(5)));
        assert_eq!(runs[0].style.color.as_deref(), Some("red"));
        assert_eq!(runs[1].style.font_size, Some(FontSize::Css("18px".into())));
    }

    #[test]
    fn test_indent_from_margin() {
        let text = RichText::from_html(r#"<p style="margin-left: 80px">x</p>"#);
        assert_eq!(text.paragraphs[0].indent, 2);
        assert_eq!(text.to_html(), r#"<p style="margin-left: 80px">x</p>"#);
    }
}
