use serde::Serialize;

use crate::types::{CellCoord, CellSpan, ResolvedAlignment, TableData};

/// A cell the renderer must emit, with its span and alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCell {
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub alignment: ResolvedAlignment,
}

impl RenderCell {
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// The emitted cells of one row, in column order.
pub type RenderRow = Vec<RenderCell>;

/// Emit/suppress decision for a single coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Emitted(RenderCell),
    /// Absorbed by the merge anchored at `by`.
    Suppressed { by: CellCoord },
}

/// Decide every column of row `row`.
///
/// A cell is suppressed when it is marked covered, or when an anchor earlier
/// in row-major order spans over it (rows above, or columns to the left on
/// the same row). Otherwise it is emitted with its span clipped to the grid.
pub fn row_coverage(grid: &TableData, row: usize) -> Vec<Coverage> {
    (0..grid.column_count())
        .map(|col| coverage_at(grid, CellCoord::new(row, col)))
        .collect()
}

fn coverage_at(grid: &TableData, coord: CellCoord) -> Coverage {
    if let Some(anchor) = grid.merged_from(coord) {
        return Coverage::Suppressed { by: anchor };
    }

    // Naive rescan of every earlier anchor; content tables stay small.
    let covering = grid
        .cell_spans
        .range(..coord)
        .find_map(|(at, span)| span.rect_at(*at).filter(|r| r.contains(coord)).map(|_| *at));
    if let Some(anchor) = covering {
        return Coverage::Suppressed { by: anchor };
    }

    let (rowspan, colspan) = match grid.span(coord) {
        Some(CellSpan::Anchor { rowspan, colspan }) => (*rowspan, *colspan),
        _ => (1, 1),
    };
    Coverage::Emitted(RenderCell {
        row: coord.row,
        col: coord.col,
        rowspan: rowspan.clamp(1, grid.row_count().saturating_sub(coord.row).max(1)),
        colspan: colspan.clamp(1, grid.column_count().saturating_sub(coord.col).max(1)),
        alignment: grid.alignment(coord).resolve(),
    })
}

/// Emitted cells of row `row`.
pub fn resolve_row(grid: &TableData, row: usize) -> RenderRow {
    row_coverage(grid, row)
        .into_iter()
        .filter_map(|c| match c {
            Coverage::Emitted(cell) => Some(cell),
            Coverage::Suppressed { .. } => None,
        })
        .collect()
}

/// Emitted cells of every row.
pub fn resolve(grid: &TableData) -> Vec<RenderRow> {
    (0..grid.row_count()).map(|row| resolve_row(grid, row)).collect()
}

/// Resolved grid cached against the grid revision.
#[derive(Debug, Default)]
pub struct ResolverCache {
    revision: Option<u64>,
    rows: Vec<RenderRow>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved rows for `grid`, recomputed only if the grid changed since
    /// the last call.
    pub fn rows(&mut self, grid: &TableData) -> &[RenderRow] {
        if self.revision != Some(grid.revision()) {
            log::trace!("resolver cache miss at revision {}", grid.revision());
            self.rows = resolve(grid);
            self.revision = Some(grid.revision());
        }
        &self.rows
    }

    /// Forget the cached result (e.g. after the grid was replaced wholesale).
    pub fn invalidate(&mut self) {
        self.revision = None;
        self.rows.clear();
    }
}
