//! Prose document operations.
//!
//! A document is an ordered list of sections; content sections hold typed
//! blocks (subheading, rich text, table). Sources sections always stay at
//! the end, and section positions are kept at `1..=n` in list order.

use crate::error::{GridsyncError, Result};
use crate::sanitize::normalize_content;
use crate::types::{
    Block, BlockKind, BlockStyle, BlockType, Document, Section, SectionKind, TableData,
};

/// Title given to a new sources section.
pub const SOURCES_TITLE: &str = "SOURCES ET RÉFÉRENCES";

/// Direction for `move_section` / `move_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A file picked by the user for an image section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Upload collaborator: stores a file for `target_id` and returns its URL.
pub trait ImageUploader {
    /// # Errors
    /// Any upload failure; the document is left unchanged.
    fn upload(&mut self, file: &ImageFile, target_id: &str) -> Result<String>;
}

impl<F> ImageUploader for F
where
    F: FnMut(&ImageFile, &str) -> Result<String>,
{
    fn upload(&mut self, file: &ImageFile, target_id: &str) -> Result<String> {
        self(file, target_id)
    }
}

fn swap_target(index: usize, direction: Direction, len: usize) -> Option<usize> {
    let target = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => index + 1,
    };
    (target < len).then_some(target)
}

impl Document {
    /// # Errors
    /// Malformed document JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    fn section_mut(&mut self, id: &str) -> Result<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| GridsyncError::UnknownSection(id.to_string()))
    }

    fn blocks_mut(&mut self, section_id: &str) -> Result<&mut Vec<Block>> {
        self.section_mut(section_id)?
            .blocks_mut()
            .ok_or_else(|| GridsyncError::UnknownSection(section_id.to_string()))
    }

    fn block_mut(&mut self, section_id: &str, block_id: &str) -> Result<&mut Block> {
        self.blocks_mut(section_id)?
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or_else(|| GridsyncError::UnknownBlock(block_id.to_string()))
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.sections
            .iter()
            .filter_map(Section::blocks)
            .flatten()
            .find(|b| b.id == block_id)
    }

    /// Every id in use, sections and blocks alike.
    fn id_taken(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id) || self.block(id).is_some()
    }

    /// First `{prefix}-{n}` not already used in the document.
    fn fresh_id(&self, prefix: &str) -> String {
        let mut n = self.sections.len() + 1;
        loop {
            let id = format!("{prefix}-{n}");
            if !self.id_taken(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn renumber(&mut self) {
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.position = i + 1;
        }
    }

    /// Insert before any sources section, then renumber.
    fn push_section(&mut self, id: String, kind: SectionKind) -> String {
        let at = self
            .sections
            .iter()
            .position(Section::is_sources)
            .unwrap_or(self.sections.len());
        self.sections.insert(
            at,
            Section {
                id: id.clone(),
                position: 0,
                kind,
            },
        );
        self.renumber();
        id
    }

    /// Add an empty content section; returns its id.
    pub fn add_section(&mut self) -> String {
        let id = self.fresh_id("section");
        self.push_section(
            id,
            SectionKind::Section {
                title: String::new(),
                blocks: Vec::new(),
            },
        )
    }

    /// Add an image section with no image yet; returns its id.
    pub fn add_image(&mut self) -> String {
        let id = self.fresh_id("image");
        self.push_section(
            id,
            SectionKind::Image {
                image_url: String::new(),
                alt: String::new(),
            },
        )
    }

    /// Append a sources section after everything else; returns its id.
    pub fn add_sources(&mut self) -> String {
        let id = self.fresh_id("sources");
        self.sections.push(Section {
            id: id.clone(),
            position: 0,
            kind: SectionKind::Sources {
                title: SOURCES_TITLE.to_string(),
                sources: Vec::new(),
            },
        });
        self.renumber();
        id
    }

    /// # Errors
    /// `UnknownSection` if no content or sources section has this id.
    pub fn update_section_title(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        match &mut self.section_mut(id)?.kind {
            SectionKind::Section { title: slot, .. } | SectionKind::Sources { title: slot, .. } => {
                *slot = title.into();
                Ok(())
            }
            SectionKind::Image { .. } => Err(GridsyncError::UnknownSection(id.to_string())),
        }
    }

    /// # Errors
    /// `UnknownSection` if no image section has this id.
    pub fn update_image_alt(&mut self, id: &str, alt: impl Into<String>) -> Result<()> {
        match &mut self.section_mut(id)?.kind {
            SectionKind::Image { alt: slot, .. } => {
                *slot = alt.into();
                Ok(())
            }
            _ => Err(GridsyncError::UnknownSection(id.to_string())),
        }
    }

    /// # Errors
    /// `UnknownSection` if no section has this id.
    pub fn delete_section(&mut self, id: &str) -> Result<()> {
        let before = self.sections.len();
        self.sections.retain(|s| s.id != id);
        if self.sections.len() == before {
            return Err(GridsyncError::UnknownSection(id.to_string()));
        }
        self.renumber();
        Ok(())
    }

    /// Swap a section with its neighbour and renumber positions.
    ///
    /// Returns `Ok(false)` at either end of the list, and when the move
    /// would put a sources section anywhere but last.
    ///
    /// # Errors
    /// `UnknownSection` if no section has this id.
    pub fn move_section(&mut self, id: &str, direction: Direction) -> Result<bool> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| GridsyncError::UnknownSection(id.to_string()))?;
        let Some(target) = swap_target(index, direction, self.sections.len()) else {
            return Ok(false);
        };
        let crosses_sources = [index, target]
            .iter()
            .any(|i| self.sections.get(*i).is_some_and(Section::is_sources));
        if crosses_sources {
            log::debug!("section {id}: sources stay last");
            return Ok(false);
        }
        self.sections.swap(index, target);
        self.renumber();
        Ok(true)
    }

    /// Append a block of `kind` to a content section; returns its id.
    ///
    /// Tables start as the 3x2 placeholder grid.
    ///
    /// # Errors
    /// `UnknownSection` if no content section has this id.
    pub fn add_block(&mut self, section_id: &str, kind: BlockType) -> Result<String> {
        let id = self.fresh_id("block");
        let kind = match kind {
            BlockType::Subheading => BlockKind::Subheading {
                text: String::new(),
            },
            BlockType::Text => BlockKind::Text {
                content: String::new(),
                style: None,
            },
            BlockType::Table => BlockKind::Table {
                table: TableData::seeded(3, 2),
            },
        };
        self.blocks_mut(section_id)?.push(Block {
            id: id.clone(),
            kind,
        });
        Ok(id)
    }

    /// Replace the text of a subheading or the content of a text block.
    /// Text content is normalized like cell content. Returns whether the
    /// stored value changed.
    ///
    /// # Errors
    /// `UnknownSection`/`UnknownBlock`, or `Other` for a table block.
    pub fn update_block_content(
        &mut self,
        section_id: &str,
        block_id: &str,
        content: &str,
    ) -> Result<bool> {
        let block = self.block_mut(section_id, block_id)?;
        let (slot, value) = match &mut block.kind {
            BlockKind::Subheading { text } => (text, content.to_string()),
            BlockKind::Text { content: slot, .. } => (slot, normalize_content(content)),
            BlockKind::Table { .. } => {
                return Err(GridsyncError::Other(format!(
                    "block {block_id} is a table"
                )))
            }
        };
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        Ok(true)
    }

    /// Set or clear the presentation wrapper of a text block.
    ///
    /// # Errors
    /// `UnknownSection`/`UnknownBlock`, or `Other` if the block is not text.
    pub fn set_block_style(
        &mut self,
        section_id: &str,
        block_id: &str,
        style: Option<BlockStyle>,
    ) -> Result<()> {
        let block = self.block_mut(section_id, block_id)?;
        match &mut block.kind {
            BlockKind::Text { style: slot, .. } => {
                *slot = style;
                Ok(())
            }
            _ => Err(GridsyncError::Other(format!(
                "block {block_id} is not a text block"
            ))),
        }
    }

    /// Grid of a table block.
    ///
    /// # Errors
    /// `UnknownSection`/`UnknownBlock`, or `Other` if the block is not a table.
    pub fn table_mut(&mut self, section_id: &str, block_id: &str) -> Result<&mut TableData> {
        let block = self.block_mut(section_id, block_id)?;
        match &mut block.kind {
            BlockKind::Table { table } => Ok(table),
            _ => Err(GridsyncError::Other(format!("block {block_id} is not a table"))),
        }
    }

    /// # Errors
    /// `UnknownSection`/`UnknownBlock`.
    pub fn delete_block(&mut self, section_id: &str, block_id: &str) -> Result<()> {
        let blocks = self.blocks_mut(section_id)?;
        let before = blocks.len();
        blocks.retain(|b| b.id != block_id);
        if blocks.len() == before {
            return Err(GridsyncError::UnknownBlock(block_id.to_string()));
        }
        Ok(())
    }

    /// Swap a block with its neighbour. `Ok(false)` at either end.
    ///
    /// # Errors
    /// `UnknownSection`/`UnknownBlock`.
    pub fn move_block(
        &mut self,
        section_id: &str,
        block_id: &str,
        direction: Direction,
    ) -> Result<bool> {
        let blocks = self.blocks_mut(section_id)?;
        let index = blocks
            .iter()
            .position(|b| b.id == block_id)
            .ok_or_else(|| GridsyncError::UnknownBlock(block_id.to_string()))?;
        let Some(target) = swap_target(index, direction, blocks.len()) else {
            return Ok(false);
        };
        blocks.swap(index, target);
        Ok(true)
    }

    /// Upload `file` for an image section and store the returned URL.
    ///
    /// # Errors
    /// `UnknownSection` if no image section has this id, or the uploader's
    /// error (wrapped as `Upload`) with the section unchanged.
    pub fn upload_image(
        &mut self,
        section_id: &str,
        file: &ImageFile,
        uploader: &mut dyn ImageUploader,
    ) -> Result<String> {
        if !matches!(
            self.section(section_id).map(|s| &s.kind),
            Some(SectionKind::Image { .. })
        ) {
            return Err(GridsyncError::UnknownSection(section_id.to_string()));
        }
        let url = uploader.upload(file, section_id).map_err(|e| match e {
            GridsyncError::Upload(msg) => GridsyncError::Upload(msg),
            other => GridsyncError::Upload(other.to_string()),
        })?;
        if let SectionKind::Image { image_url, .. } = &mut self.section_mut(section_id)?.kind {
            image_url.clone_from(&url);
        }
        log::debug!("section {section_id}: image uploaded ({})", file.name);
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_keep_sources_last() {
        let mut doc = Document::default();
        let a = doc.add_section();
        let sources = doc.add_sources();
        let b = doc.add_image();
        let ids: Vec<_> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str(), sources.as_str()]);
        let positions: Vec<_> = doc.sections.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert!(!doc.move_section(&b, Direction::Down).unwrap());
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let mut doc = Document::default();
        let s = doc.add_section();
        let b1 = doc.add_block(&s, BlockType::Text).unwrap();
        let b2 = doc.add_block(&s, BlockType::Text).unwrap();
        assert_ne!(b1, b2);
    }
}
