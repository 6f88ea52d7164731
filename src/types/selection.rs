use super::{CellCoord, CellRect, TableData};

/// Cells picked by the user for a pending merge/unmerge.
///
/// Insertion-ordered and session-scoped; never persisted. The last cell in
/// the set is the active cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    cells: Vec<CellCoord>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: impl IntoIterator<Item = CellCoord>) -> Self {
        let mut set = Self::new();
        for cell in cells {
            set.insert(cell);
        }
        set
    }

    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn first(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Most recently selected cell.
    pub fn active(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Add a cell if not already present.
    pub fn insert(&mut self, coord: CellCoord) {
        if !self.contains(coord) {
            self.cells.push(coord);
        }
    }

    /// Toggle membership of `coord`.
    pub fn toggle(&mut self, coord: CellCoord) {
        if self.contains(coord) {
            self.cells.retain(|c| *c != coord);
        } else {
            self.cells.push(coord);
        }
    }

    /// Normalized bounds `(min_row, min_col, max_row, max_col)`.
    pub fn bounds(&self) -> Option<CellRect> {
        let first = self.cells.first()?;
        let mut rect = CellRect::spanning(*first, *first);
        for cell in &self.cells {
            rect.top = rect.top.min(cell.row);
            rect.left = rect.left.min(cell.col);
            rect.bottom = rect.bottom.max(cell.row);
            rect.right = rect.right.max(cell.col);
        }
        Some(rect)
    }

    /// Apply a checkbox click on `coord`.
    ///
    /// - Clicking a covered cell selects its anchor alone.
    /// - Shift-click replaces the selection with the rectangle between the
    ///   active cell and `coord`, skipping covered cells.
    /// - A plain click toggles the cell.
    pub fn click(&mut self, grid: &TableData, coord: CellCoord, shift: bool) {
        if let Some(anchor) = grid.merged_from(coord) {
            self.cells = vec![anchor];
            return;
        }

        match self.active() {
            Some(last) if shift => {
                let rect = CellRect::spanning(last, coord);
                self.cells = rect.cells().filter(|c| !grid.is_covered(*c)).collect();
            }
            _ => self.toggle(coord),
        }
    }
}
