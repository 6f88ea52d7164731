use serde::{Deserialize, Serialize};

use super::TableData;

/// Presentation wrapper drawn around a text block.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WrapperKind {
    #[default]
    None,
    BorderLeft,
    Box,
    GradientBox,
    InfoBox,
}

/// Named callout colors.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalloutColor {
    #[default]
    Purple,
    Indigo,
    Blue,
    Teal,
    Yellow,
    Green,
    Red,
    Orange,
}

impl CalloutColor {
    pub const ALL: [CalloutColor; 8] = [
        Self::Purple,
        Self::Indigo,
        Self::Blue,
        Self::Teal,
        Self::Yellow,
        Self::Green,
        Self::Red,
        Self::Orange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Purple => "purple",
            Self::Indigo => "indigo",
            Self::Blue => "blue",
            Self::Teal => "teal",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Red => "red",
            Self::Orange => "orange",
        }
    }
}

/// Optional decoration of a text block: wrapper, color and leading emoji.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct BlockStyle {
    #[serde(rename = "type")]
    pub kind: WrapperKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CalloutColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl BlockStyle {
    pub fn new(kind: WrapperKind, color: CalloutColor) -> Self {
        Self {
            kind,
            color: Some(color),
            emoji: None,
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        let emoji = emoji.into();
        self.emoji = (!emoji.trim().is_empty()).then_some(emoji);
        self
    }

    pub fn color_or_default(&self) -> CalloutColor {
        self.color.unwrap_or_default()
    }
}

/// A content block inside a section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Typed block payload. Tags match the persisted document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum BlockKind {
    #[serde(rename = "sous-titre")]
    Subheading {
        #[serde(rename = "texte", default)]
        text: String,
    },
    #[serde(rename = "texte")]
    Text {
        #[serde(rename = "contenu", default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<BlockStyle>,
    },
    #[serde(rename = "tableau")]
    Table {
        #[serde(rename = "table_data", default)]
        table: TableData,
    },
}

/// Block type selector for `add_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Subheading,
    Text,
    Table,
}

/// A bibliography entry of a sources section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "lien")]
    pub link: String,
}

/// Top-level document section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    /// 1-based display position.
    pub position: usize,
    #[serde(flatten)]
    pub kind: SectionKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionKind {
    Section {
        #[serde(rename = "titre", default)]
        title: String,
        #[serde(rename = "blocs", default)]
        blocks: Vec<Block>,
    },
    Image {
        #[serde(default)]
        image_url: String,
        #[serde(default)]
        alt: String,
    },
    Sources {
        #[serde(rename = "titre", default)]
        title: String,
        #[serde(default)]
        sources: Vec<SourceEntry>,
    },
}

impl Section {
    pub fn is_sources(&self) -> bool {
        matches!(self.kind, SectionKind::Sources { .. })
    }

    pub fn blocks(&self) -> Option<&[Block]> {
        match &self.kind {
            SectionKind::Section { blocks, .. } => Some(blocks),
            _ => None,
        }
    }

    pub(crate) fn blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.kind {
            SectionKind::Section { blocks, .. } => Some(blocks),
            _ => None,
        }
    }
}

/// A prose document: ordered sections of typed blocks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}
