//! Presentation wrappers for text blocks.
//!
//! The wrapper decorates the editable region from the outside. Its markup
//! carries marker attributes so that a wrapper accidentally saved together
//! with the content can be recognized and stripped on load.

use quick_xml::escape::escape;

use crate::sanitize::{CALLOUT_ATTR, CALLOUT_CONTENT_ATTR};
use crate::types::{BlockStyle, CalloutColor, WrapperKind};

struct Palette {
    border: &'static str,
    bg: &'static str,
    border_light: &'static str,
    gradient: &'static str,
}

fn palette(color: CalloutColor) -> Palette {
    match color {
        CalloutColor::Purple => Palette {
            border: "border-purple-500",
            bg: "bg-purple-50",
            border_light: "border-purple-200",
            gradient: "bg-gradient-to-br from-purple-50 to-indigo-50",
        },
        CalloutColor::Indigo => Palette {
            border: "border-indigo-500",
            bg: "bg-indigo-50",
            border_light: "border-indigo-200",
            gradient: "bg-gradient-to-br from-indigo-50 to-blue-50",
        },
        CalloutColor::Blue => Palette {
            border: "border-blue-500",
            bg: "bg-blue-50",
            border_light: "border-blue-200",
            gradient: "bg-gradient-to-br from-blue-50 to-cyan-50",
        },
        CalloutColor::Teal => Palette {
            border: "border-teal-500",
            bg: "bg-teal-50",
            border_light: "border-teal-200",
            gradient: "bg-gradient-to-br from-teal-50 to-green-50",
        },
        CalloutColor::Yellow => Palette {
            border: "border-yellow-400",
            bg: "bg-yellow-50",
            border_light: "border-yellow-200",
            gradient: "bg-gradient-to-br from-yellow-50 to-orange-50",
        },
        CalloutColor::Green => Palette {
            border: "border-green-500",
            bg: "bg-green-50",
            border_light: "border-green-200",
            gradient: "bg-gradient-to-br from-green-50 to-emerald-50",
        },
        CalloutColor::Red => Palette {
            border: "border-red-500",
            bg: "bg-red-50",
            border_light: "border-red-200",
            gradient: "bg-gradient-to-br from-red-50 to-pink-50",
        },
        CalloutColor::Orange => Palette {
            border: "border-orange-500",
            bg: "bg-orange-50",
            border_light: "border-orange-200",
            gradient: "bg-gradient-to-br from-orange-50 to-amber-50",
        },
    }
}

impl WrapperKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BorderLeft => "border-left",
            Self::Box => "box",
            Self::GradientBox => "gradient-box",
            Self::InfoBox => "info-box",
        }
    }
}

impl BlockStyle {
    /// CSS classes of the wrapper element; empty for `none`.
    pub fn wrapper_classes(&self) -> String {
        let p = palette(self.color_or_default());
        match self.kind {
            WrapperKind::None => String::new(),
            WrapperKind::BorderLeft => format!("border-l-4 {} pl-6 py-2", p.border),
            WrapperKind::Box | WrapperKind::InfoBox => {
                format!("{} border-l-4 {} p-6 rounded-r-lg", p.bg, p.border)
            }
            WrapperKind::GradientBox => {
                format!("{} rounded-xl p-6 border-2 {}", p.gradient, p.border_light)
            }
        }
    }
}

/// Wrap block content in its presentation wrapper.
///
/// Content is returned unchanged when there is no style or the style is
/// `none` and carries no emoji.
pub fn wrap_block(content: &str, style: Option<&BlockStyle>) -> String {
    let Some(style) = style else {
        return content.to_string();
    };
    if style.kind == WrapperKind::None && style.emoji.is_none() {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len() + 160);
    out.push_str("<div");
    let classes = style.wrapper_classes();
    if !classes.is_empty() {
        out.push_str(&format!(" class=\"{classes}\""));
    }
    out.push_str(&format!(" {CALLOUT_ATTR}=\"{}\">", style.kind.as_str()));
    if let Some(emoji) = &style.emoji {
        out.push_str("<span class=\"mr-2\">");
        out.push_str(&escape(emoji.as_str()));
        out.push_str("</span>");
    }
    out.push_str(&format!("<div {CALLOUT_CONTENT_ATTR}=\"\">"));
    out.push_str(content);
    out.push_str("</div></div>");
    out
}
