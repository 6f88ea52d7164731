use serde::{Deserialize, Serialize};

/// Horizontal text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Vertical alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl HorizontalAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

impl VerticalAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// Stored per-cell alignment. Either axis may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAlignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlign>,
}

impl CellAlignment {
    pub fn horizontal(align: HorizontalAlign) -> Self {
        Self {
            horizontal: Some(align),
            vertical: None,
        }
    }

    pub fn vertical(align: VerticalAlign) -> Self {
        Self {
            horizontal: None,
            vertical: Some(align),
        }
    }

    /// Overlay the axes set in `patch`, keeping the others.
    pub fn merged_with(self, patch: CellAlignment) -> Self {
        Self {
            horizontal: patch.horizontal.or(self.horizontal),
            vertical: patch.vertical.or(self.vertical),
        }
    }

    /// Effective alignment, defaulting to left/middle.
    pub fn resolve(self) -> ResolvedAlignment {
        ResolvedAlignment {
            horizontal: self.horizontal.unwrap_or_default(),
            vertical: self.vertical.unwrap_or_default(),
        }
    }
}

/// Alignment with both axes decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedAlignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

/// Partial alignment update: unset axes keep their stored value.
pub type AlignmentPatch = CellAlignment;
