//! Commit application.
//!
//! Writes region commits into the in-memory grid or document.

use super::surface::{Commit, RegionId};
use crate::error::{GridsyncError, Result};
use crate::types::{BlockKind, Document, TableData};

/// Write a cell commit into the grid.
///
/// Returns `Ok(false)` when the stored content already equals the commit,
/// so callers can skip change notification.
pub(crate) fn apply_cell_commit(grid: &mut TableData, commit: &Commit) -> Result<bool> {
    let RegionId::Cell(coord) = &commit.region else {
        return Err(GridsyncError::UnknownRegion(commit.region.to_string()));
    };
    grid.update_cell_content(*coord, &commit.content)
}

/// Write a block commit into the document.
///
/// Text blocks take the content as is; subheadings take its plain text.
pub(crate) fn apply_block_commit(document: &mut Document, commit: &Commit) -> Result<bool> {
    let RegionId::Block(block_id) = &commit.region else {
        return Err(GridsyncError::UnknownRegion(commit.region.to_string()));
    };
    let block = document
        .sections
        .iter_mut()
        .filter_map(|s| s.blocks_mut())
        .flat_map(|blocks| blocks.iter_mut())
        .find(|b| b.id == *block_id)
        .ok_or_else(|| GridsyncError::UnknownBlock(block_id.clone()))?;

    let (slot, content) = match &mut block.kind {
        BlockKind::Text { content, .. } => (content, commit.content.clone()),
        BlockKind::Subheading { text } => (text, crate::sanitize::plain_text(&commit.content)),
        BlockKind::Table { .. } => {
            return Err(GridsyncError::Other(format!(
                "block {block_id} is a table; commit its cells instead"
            )))
        }
    };
    if slot.trim() == content {
        return Ok(false);
    }
    *slot = content;
    Ok(true)
}
