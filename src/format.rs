//! Formatting operations over `(RichText, TextRange)`.
//!
//! Each operation edits the model in place and returns the selection to use
//! afterwards.

use crate::error::{GridsyncError, Result};
use crate::rich_text::{FontSize, Link, ParagraphKind, RichText, RunStyle, TextRange, MAX_INDENT};

/// Toolbar formatting command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    /// Text color. An empty value removes the color.
    ForeColor(String),
    /// `"1"`..`"7"`, `"default"`, or a CSS length for the styled-span fallback.
    FontSize(String),
    BulletList,
    NumberedList,
    Indent,
    Outdent,
    RemoveFormat,
}

impl Command {
    /// Build a command from its toolbar name (`execCommand` spelling).
    ///
    /// # Errors
    /// `UnsupportedFormat` for unknown names.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self> {
        let value = value.unwrap_or_default().to_string();
        Ok(match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "foreColor" => Self::ForeColor(value),
            "fontSize" => Self::FontSize(value),
            "insertUnorderedList" => Self::BulletList,
            "insertOrderedList" => Self::NumberedList,
            "indent" => Self::Indent,
            "outdent" => Self::Outdent,
            "removeFormat" => Self::RemoveFormat,
            other => return Err(GridsyncError::UnsupportedFormat(other.to_string())),
        })
    }

    /// True for commands that style characters rather than paragraphs.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Bold
                | Self::Italic
                | Self::Underline
                | Self::ForeColor(_)
                | Self::FontSize(_)
                | Self::RemoveFormat
        )
    }
}

const CSS_SIZE_KEYWORDS: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "smaller", "larger",
];
const CSS_UNITS: &[&str] = &["px", "pt", "em", "rem", "%"];

/// Interpret a font size command value. `None` means "back to default".
///
/// Levels 1 to 7 map to `<font size>`. Anything else that reads as a CSS
/// size falls back to a styled span.
///
/// # Errors
/// `UnsupportedFormat` when the value is neither.
pub fn parse_font_size(value: &str) -> Result<Option<FontSize>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("default") {
        return Ok(None);
    }
    if let Ok(level) = value.parse::<u8>() {
        if (1..=7).contains(&level) {
            return Ok(Some(FontSize::Level(level)));
        }
    }
    let is_css = CSS_SIZE_KEYWORDS.contains(&value)
        || CSS_UNITS.iter().any(|unit| {
            value
                .strip_suffix(unit)
                .is_some_and(|n| !n.is_empty() && n.parse::<f64>().is_ok_and(|v| v > 0.0))
        });
    if is_css {
        log::warn!("font size {value:?} has no level; wrapping selection in a styled span");
        return Ok(Some(FontSize::Css(value.to_string())));
    }
    Err(GridsyncError::UnsupportedFormat(format!("font size {value:?}")))
}

/// Apply `change` to a style the way a toolbar toggle would: `all_set` says
/// whether every character of the range already has the property.
fn toggle(
    text: &mut RichText,
    range: TextRange,
    get: fn(&RunStyle) -> bool,
    set: fn(&mut RunStyle, bool),
) {
    let styles = text.styles_in(range);
    let all_set = !styles.is_empty() && styles.iter().all(|s| get(s));
    text.map_style(range, |s| set(s, !all_set));
}

/// Style a caret would type with after `command`, starting from `style`.
///
/// # Errors
/// `UnsupportedFormat` for a font size value that cannot be applied.
pub fn apply_to_style(style: &mut RunStyle, command: &Command) -> Result<()> {
    match command {
        Command::Bold => style.bold = !style.bold,
        Command::Italic => style.italic = !style.italic,
        Command::Underline => style.underline = !style.underline,
        Command::ForeColor(color) => style.color = non_empty(color),
        Command::FontSize(value) => style.font_size = parse_font_size(value)?,
        Command::RemoveFormat => *style = style.cleared(),
        _ => {}
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Apply a formatting command to `range`.
///
/// Inline commands on a collapsed range change nothing; callers keep a
/// pending typing style for that case (see [`apply_to_style`]).
///
/// # Errors
/// `UnsupportedFormat` for a font size value that cannot be applied. The
/// content is untouched in that case.
pub fn apply(text: &mut RichText, range: TextRange, command: &Command) -> Result<TextRange> {
    let range = range.clamped(text.len());
    match command {
        Command::Bold => toggle(text, range, |s| s.bold, |s, v| s.bold = v),
        Command::Italic => toggle(text, range, |s| s.italic, |s, v| s.italic = v),
        Command::Underline => toggle(text, range, |s| s.underline, |s, v| s.underline = v),
        Command::ForeColor(color) => {
            let color = non_empty(color);
            text.map_style(range, |s| s.color.clone_from(&color));
        }
        Command::FontSize(value) => {
            let size = parse_font_size(value)?;
            text.map_style(range, |s| s.font_size.clone_from(&size));
        }
        Command::RemoveFormat => text.map_style(range, |s| *s = s.cleared()),
        Command::BulletList => toggle_list(text, range, false),
        Command::NumberedList => toggle_list(text, range, true),
        Command::Indent => {
            for p in text.paragraphs_in_mut(range) {
                p.indent = p.indent.saturating_add(1).min(MAX_INDENT);
            }
        }
        Command::Outdent => {
            for p in text.paragraphs_in_mut(range) {
                p.indent = p.indent.saturating_sub(1);
            }
        }
    }
    Ok(range)
}

fn toggle_list(text: &mut RichText, range: TextRange, ordered: bool) {
    let target = ParagraphKind::ListItem { ordered };
    let indices = text.paragraphs_in(range);
    let all_listed = !indices.is_empty()
        && indices
            .iter()
            .all(|i| text.paragraphs.get(*i).is_some_and(|p| p.kind == target));
    let kind = if all_listed {
        ParagraphKind::Paragraph
    } else {
        target
    };
    for p in text.paragraphs_in_mut(range) {
        p.kind = kind;
    }
}

/// Link under `range`, with the range it covers.
pub fn link_at(text: &RichText, range: TextRange) -> Option<(TextRange, Link)> {
    text.link_extent(range.clamped(text.len()))
}

/// Turn the characters of `range` into a link.
///
/// # Errors
/// `CollapsedSelection` when `range` selects no text.
pub fn insert_link(text: &mut RichText, range: TextRange, link: &Link) -> Result<TextRange> {
    let range = range.clamped(text.len());
    if range.is_collapsed() {
        return Err(GridsyncError::CollapsedSelection);
    }
    text.map_style(range, |s| s.link = Some(link.clone()));
    Ok(range)
}

/// Change href and target of the link under `range`, keeping its style and
/// text. Returns the link's range, or `None` if there is no link there.
pub fn edit_link(
    text: &mut RichText,
    range: TextRange,
    href: &str,
    new_tab: bool,
) -> Option<TextRange> {
    let (extent, _) = link_at(text, range)?;
    text.map_style(extent, |s| {
        if let Some(link) = s.link.as_mut() {
            link.href = href.to_string();
            link.new_tab = new_tab;
        }
    });
    Some(extent)
}

/// Unwrap the link under `range` into plain text. Returns the range the link
/// covered, or `None` if there is no link there.
pub fn remove_link(text: &mut RichText, range: TextRange) -> Option<TextRange> {
    let (extent, _) = link_at(text, range)?;
    text.map_style(extent, |s| s.link = None);
    Some(extent)
}

/// Replace `range` with `insert`, typed with `style`. Returns the caret
/// after the inserted text.
pub fn replace(text: &mut RichText, range: TextRange, insert: &str, style: RunStyle) -> TextRange {
    let range = range.clamped(text.len());
    text.delete(range);
    TextRange::caret(text.insert(range.start, insert, style))
}
