//! Grid model and merge engine.
//!
//! Structural operations on [`TableData`]. Each operation either applies fully
//! and bumps the grid revision, or returns an error and leaves the grid as it
//! was. Callers that want "silently ignore" semantics log the error and move on.

use std::collections::BTreeMap;

use crate::config::{EditorConfig, MergePolicy};
use crate::error::{GridsyncError, Result};
use crate::sanitize::normalize_content;
use crate::types::{CellAlignment, CellCoord, CellRect, CellSpan, SelectionSet, TableData};

/// Rules applied by [`TableData::merge_cells`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRules {
    pub policy: MergePolicy,
    pub reject_overlapping: bool,
}

impl Default for MergeRules {
    fn default() -> Self {
        Self {
            policy: MergePolicy::Strict,
            reject_overlapping: true,
        }
    }
}

impl From<&EditorConfig> for MergeRules {
    fn from(config: &EditorConfig) -> Self {
        Self {
            policy: config.merge_policy,
            reject_overlapping: config.reject_overlapping_merges,
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Row,
    Column,
}

impl TableData {
    /// Append a column with the given header label and an empty cell per row.
    pub fn add_column(&mut self, label: impl Into<String>) {
        self.headers.push(label.into());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.touch();
    }

    /// Remove column `index`, re-keying spans and alignments to the right.
    ///
    /// # Errors
    /// `LastColumn` if only one column remains, `ColumnOutOfRange` for a bad index.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        if self.column_count() <= 1 {
            return Err(GridsyncError::LastColumn);
        }
        if index >= self.column_count() {
            return Err(GridsyncError::ColumnOutOfRange {
                index,
                len: self.column_count(),
            });
        }

        self.headers.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
        self.rekey_after_removal(Axis::Column, index);
        self.touch();
        Ok(())
    }

    /// Append a row of empty cells.
    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.column_count()]);
        self.touch();
    }

    /// Remove row `index`, re-keying spans and alignments below it.
    ///
    /// # Errors
    /// `RowOutOfRange` for a bad index.
    pub fn remove_row(&mut self, index: usize) -> Result<()> {
        if index >= self.row_count() {
            return Err(GridsyncError::RowOutOfRange {
                index,
                len: self.row_count(),
            });
        }
        self.rows.remove(index);
        self.rekey_after_removal(Axis::Row, index);
        self.touch();
        Ok(())
    }

    /// Rename a column header.
    ///
    /// # Errors
    /// `ColumnOutOfRange` for a bad index.
    pub fn update_header(&mut self, index: usize, label: impl Into<String>) -> Result<()> {
        let len = self.column_count();
        let header = self
            .headers
            .get_mut(index)
            .ok_or(GridsyncError::ColumnOutOfRange { index, len })?;
        *header = label.into();
        self.touch();
        Ok(())
    }

    /// Upsert the alignment of a cell. Unset axes of `patch` keep their
    /// current value.
    ///
    /// # Errors
    /// `CellOutOfRange` if the cell is outside the grid.
    pub fn set_cell_alignment(&mut self, coord: CellCoord, patch: CellAlignment) -> Result<()> {
        if !self.contains(coord) {
            return Err(GridsyncError::CellOutOfRange(coord));
        }
        let merged = self.alignment(coord).merged_with(patch);
        self.cell_alignments.insert(coord, merged);
        self.touch();
        Ok(())
    }

    /// Merge the selected cells into one span anchored at their top-left cell.
    ///
    /// On success the selection is cleared and the anchor is returned.
    ///
    /// # Errors
    /// - `TooFewCells` if fewer than two cells are selected
    /// - `CellOutOfRange` if a selected cell lies outside the grid
    /// - `NonRectangular` under [`MergePolicy::Strict`] when the selection
    ///   does not fill its bounding box
    /// - `OverlappingMerge` when the merge would intersect an existing one and
    ///   `reject_overlapping` is set
    pub fn merge_cells(
        &mut self,
        selection: &mut SelectionSet,
        rules: MergeRules,
    ) -> Result<CellCoord> {
        let mut cells = selection.cells().to_vec();
        cells.sort_unstable();
        cells.dedup();

        if cells.len() < 2 {
            return Err(GridsyncError::TooFewCells { count: cells.len() });
        }
        if let Some(outside) = cells.iter().find(|c| !self.contains(**c)) {
            return Err(GridsyncError::CellOutOfRange(*outside));
        }

        let bounds = selection
            .bounds()
            .ok_or(GridsyncError::TooFewCells { count: 0 })?;
        if rules.policy == MergePolicy::Strict && bounds.area() != cells.len() {
            return Err(GridsyncError::NonRectangular);
        }

        let overlapping: Vec<CellRect> = self
            .merges()
            .into_iter()
            .filter(|existing| existing.intersects(&bounds))
            .collect();
        if let Some(existing) = overlapping.first() {
            if rules.reject_overlapping {
                return Err(GridsyncError::OverlappingMerge {
                    anchor: existing.anchor(),
                });
            }
        }
        for existing in &overlapping {
            self.clear_merge(existing.anchor());
        }

        self.apply_merge(bounds);
        selection.clear();
        self.touch();
        Ok(bounds.anchor())
    }

    /// Undo the merge anchored at the first selected cell.
    ///
    /// On success the selection is cleared and the former anchor is returned.
    ///
    /// # Errors
    /// `TooFewCells` on an empty selection, `NotAnAnchor` if the first
    /// selected cell does not anchor a merge.
    pub fn unmerge_cells(&mut self, selection: &mut SelectionSet) -> Result<CellCoord> {
        let anchor = selection
            .first()
            .ok_or(GridsyncError::TooFewCells { count: 0 })?;
        if !matches!(self.span(anchor), Some(CellSpan::Anchor { .. })) {
            return Err(GridsyncError::NotAnAnchor(anchor));
        }

        self.clear_merge(anchor);
        selection.clear();
        self.touch();
        Ok(anchor)
    }

    /// Store new content for a cell.
    ///
    /// Content is normalized first (empty placeholder markup collapses to
    /// `""`). Returns `Ok(false)` without touching the grid when the
    /// normalized content equals what is already stored.
    ///
    /// # Errors
    /// `CellOutOfRange` if the cell is outside the grid.
    pub fn update_cell_content(&mut self, coord: CellCoord, content: &str) -> Result<bool> {
        let normalized = normalize_content(content);
        let cell = self
            .rows
            .get_mut(coord.row)
            .and_then(|row| row.get_mut(coord.col))
            .ok_or(GridsyncError::CellOutOfRange(coord))?;

        if cell.trim() == normalized {
            return Ok(false);
        }
        *cell = normalized;
        self.touch();
        Ok(true)
    }

    /// Write anchor and covered entries for `rect`.
    fn apply_merge(&mut self, rect: CellRect) {
        let anchor = rect.anchor();
        for coord in rect.cells() {
            let span = if coord == anchor {
                CellSpan::Anchor {
                    rowspan: rect.rowspan(),
                    colspan: rect.colspan(),
                }
            } else {
                CellSpan::Covered {
                    merged_from: anchor,
                }
            };
            self.cell_spans.insert(coord, span);
        }
    }

    /// Drop the anchor entry and every cell pointing back at it.
    fn clear_merge(&mut self, anchor: CellCoord) {
        self.cell_spans.remove(&anchor);
        self.cell_spans
            .retain(|_, span| span.merged_from() != Some(anchor));
    }

    /// Rebuild coordinate-keyed maps after a row or column was deleted.
    ///
    /// Merges crossing the removed line shrink by one; merges reduced to a
    /// single cell disappear. Covered entries without a live anchor are
    /// dropped along the way.
    fn rekey_after_removal(&mut self, axis: Axis, index: usize) {
        let merges = self.merges();
        self.cell_spans.clear();
        for rect in merges {
            if let Some(shrunk) = shrink_rect(rect, axis, index) {
                if shrunk.area() > 1 {
                    self.apply_merge(shrunk);
                }
            }
        }

        let alignments = std::mem::take(&mut self.cell_alignments);
        self.cell_alignments = rekey_map(alignments, axis, index);
    }
}

fn shift(value: usize, index: usize) -> Option<usize> {
    match value.cmp(&index) {
        std::cmp::Ordering::Less => Some(value),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(value - 1),
    }
}

fn rekey_map<V>(map: BTreeMap<CellCoord, V>, axis: Axis, index: usize) -> BTreeMap<CellCoord, V> {
    map.into_iter()
        .filter_map(|(coord, value)| {
            let moved = match axis {
                Axis::Row => CellCoord::new(shift(coord.row, index)?, coord.col),
                Axis::Column => CellCoord::new(coord.row, shift(coord.col, index)?),
            };
            Some((moved, value))
        })
        .collect()
}

/// Rectangle left after deleting line `index` along `axis`.
fn shrink_rect(rect: CellRect, axis: Axis, index: usize) -> Option<CellRect> {
    let (start, end) = match axis {
        Axis::Row => (rect.top, rect.bottom),
        Axis::Column => (rect.left, rect.right),
    };
    let (start, end) = if index < start {
        (start - 1, end - 1)
    } else if index <= end {
        if start == end {
            return None;
        }
        (start, end - 1)
    } else {
        (start, end)
    };
    Some(match axis {
        Axis::Row => CellRect {
            top: start,
            bottom: end,
            ..rect
        },
        Axis::Column => CellRect {
            left: start,
            right: end,
            ..rect
        },
    })
}
