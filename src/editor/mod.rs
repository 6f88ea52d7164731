//! Editing façades.
//!
//! `TableEditor` ties a grid to its selection, its resolved layout and one
//! sync surface region per rendered cell:
//! - Structural operations (merge, rows, columns, alignment)
//! - Region commits applied to the grid, guarded against re-entrant
//!   write-back
//! - Change notification with the whole grid after every applied change
//!
//! Rejected operations are logged and leave everything untouched.
//! `DocumentEditor` does the same for prose documents.

mod debounce;
mod document;
mod link;
pub(crate) mod mutation;
mod surface;

pub use debounce::Debouncer;
pub use document::{DocumentEditor, DocumentSink};
pub use link::{LinkDraft, Prompt};
pub use surface::{Commit, RegionId, SyncSurface};

use crate::config::EditorConfig;
use crate::error::{GridsyncError, Result};
use crate::format::Command;
use crate::grid::MergeRules;
use crate::layout::{RenderRow, ResolverCache};
use crate::rich_text::TextRange;
use crate::types::{AlignmentPatch, CellCoord, SelectionSet, TableData};

/// Log a rejected operation; always `false` ("nothing changed").
fn rejected(op: &str, error: &GridsyncError) -> bool {
    log::debug!("{op} rejected: {error}");
    false
}

/// Persistence collaborator receiving the whole grid after each change.
pub trait GridSink {
    fn grid_changed(&mut self, grid: &TableData);
}

impl<F: FnMut(&TableData)> GridSink for F {
    fn grid_changed(&mut self, grid: &TableData) {
        self(grid);
    }
}

/// Table editing session.
pub struct TableEditor {
    grid: TableData,
    selection: SelectionSet,
    surface: SyncSurface,
    resolver: ResolverCache,
    config: EditorConfig,
    sink: Option<Box<dyn GridSink>>,
}

impl TableEditor {
    /// Start editing `grid`; every rendered cell gets a region.
    pub fn new(grid: TableData, config: EditorConfig) -> Self {
        let mut editor = Self {
            grid,
            selection: SelectionSet::new(),
            surface: SyncSurface::new(&config),
            resolver: ResolverCache::new(),
            config,
            sink: None,
        };
        editor.bind_regions();
        editor
    }

    /// Start from the placeholder grid sized by the configuration.
    pub fn seeded(config: EditorConfig) -> Self {
        let grid = TableData::seeded(config.seed_columns, config.seed_rows);
        Self::new(grid, config)
    }

    /// # Errors
    /// Malformed grid JSON.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self> {
        Ok(Self::new(TableData::from_json(json)?, config))
    }

    pub fn set_sink(&mut self, sink: impl GridSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    pub fn grid(&self) -> &TableData {
        &self.grid
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn surface(&self) -> &SyncSurface {
        &self.surface
    }

    /// Resolved rows for rendering, cached per grid revision.
    pub fn rows(&mut self) -> &[RenderRow] {
        self.resolver.rows(&self.grid)
    }

    /// Bind a region for every emitted cell not bound yet.
    fn bind_regions(&mut self) {
        let cells: Vec<CellCoord> = self
            .resolver
            .rows(&self.grid)
            .iter()
            .flatten()
            .map(|cell| cell.coord())
            .collect();
        for coord in cells {
            let stored = self.grid.content(coord).unwrap_or_default();
            self.surface.bind(RegionId::Cell(coord), stored);
        }
    }

    /// Commit every pending debounced edit now, while region coordinates
    /// still match the grid.
    fn flush_pending(&mut self) -> bool {
        let commits = self.surface.flush();
        self.apply_all(commits)
    }

    /// Coordinates shift after structural edits, so regions are rebuilt.
    /// Callers flush pending edits before changing the grid.
    fn rebind_regions(&mut self) {
        self.surface = SyncSurface::new(&self.config);
        self.bind_regions();
    }

    fn notify(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.grid_changed(&self.grid);
        }
    }

    /// Replace the grid with a new version from the persistence side.
    ///
    /// Bound regions are reconciled in place (cursor kept) when the shape is
    /// unchanged; otherwise pending edits are committed against the old
    /// grid and regions are rebuilt.
    pub fn replace_grid(&mut self, grid: TableData) {
        let same_shape = grid.row_count() == self.grid.row_count()
            && grid.column_count() == self.grid.column_count()
            && grid.cell_spans == self.grid.cell_spans;
        if !same_shape {
            self.flush_pending();
        }
        self.grid = grid;
        self.grid.touch();
        self.resolver.invalidate();
        if !same_shape {
            self.selection.clear();
            self.rebind_regions();
            return;
        }
        let cells: Vec<CellCoord> = self
            .resolver
            .rows(&self.grid)
            .iter()
            .flatten()
            .map(|cell| cell.coord())
            .collect();
        for coord in cells {
            let stored = self.grid.content(coord).unwrap_or_default();
            if let Err(e) = self.surface.load(&RegionId::Cell(coord), stored) {
                log::debug!("reconcile {coord}: {e}");
            }
        }
    }

    // ---- Selection and structure ----

    /// Cell click with the toggle / shift-rectangle / covered-redirect rules.
    pub fn click(&mut self, coord: CellCoord, shift: bool) {
        self.selection.click(&self.grid, coord, shift);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Merge the selected cells. Returns whether the grid changed.
    pub fn merge_selected(&mut self) -> bool {
        self.flush_pending();
        let rules = MergeRules::from(&self.config);
        match self.grid.merge_cells(&mut self.selection, rules) {
            Ok(anchor) => {
                log::debug!("merged at {anchor}");
                self.rebind_regions();
                self.notify();
                true
            }
            Err(e) => rejected("merge", &e),
        }
    }

    /// Unmerge the merge anchored at the first selected cell.
    pub fn unmerge_selected(&mut self) -> bool {
        match self.grid.unmerge_cells(&mut self.selection) {
            Ok(_) => {
                self.bind_regions();
                self.notify();
                true
            }
            Err(e) => rejected("unmerge", &e),
        }
    }

    pub fn add_row(&mut self) {
        self.grid.add_row();
        self.bind_regions();
        self.notify();
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        self.flush_pending();
        match self.grid.remove_row(index) {
            Ok(()) => {
                self.selection.clear();
                self.rebind_regions();
                self.notify();
                true
            }
            Err(e) => rejected("remove row", &e),
        }
    }

    /// Append a column labelled with the configured default header.
    pub fn add_column(&mut self) {
        let label = self.config.default_header_label.clone();
        self.grid.add_column(label);
        self.bind_regions();
        self.notify();
    }

    pub fn remove_column(&mut self, index: usize) -> bool {
        self.flush_pending();
        match self.grid.remove_column(index) {
            Ok(()) => {
                self.selection.clear();
                self.rebind_regions();
                self.notify();
                true
            }
            Err(e) => rejected("remove column", &e),
        }
    }

    pub fn update_header(&mut self, index: usize, label: &str) -> bool {
        if self.grid.headers.get(index).is_some_and(|h| h == label) {
            return false;
        }
        match self.grid.update_header(index, label) {
            Ok(()) => {
                self.notify();
                true
            }
            Err(e) => rejected("update header", &e),
        }
    }

    /// Cell alignment toolbar target: the focused cell, else the active
    /// selected cell.
    pub fn active_cell(&self) -> Option<CellCoord> {
        self.surface
            .region_ids()
            .find_map(|id| match id {
                RegionId::Cell(coord) if self.surface.is_focused(id) => Some(*coord),
                _ => None,
            })
            .or_else(|| self.selection.active())
    }

    /// Apply an alignment patch to the active cell.
    pub fn set_alignment(&mut self, patch: AlignmentPatch) -> bool {
        let Some(coord) = self.active_cell() else {
            log::debug!("alignment ignored: no active cell");
            return false;
        };
        match self.grid.set_cell_alignment(coord, patch) {
            Ok(()) => {
                self.notify();
                true
            }
            Err(e) => rejected("set alignment", &e),
        }
    }

    // ---- Region sync ----

    /// Apply a region commit to the grid and notify when content changed.
    /// Nested commits for the same region are dropped by the surface while
    /// this runs.
    pub fn apply_commit(&mut self, commit: &Commit) -> bool {
        self.surface.begin_commit(&commit.region);
        let changed = match mutation::apply_cell_commit(&mut self.grid, commit) {
            Ok(changed) => changed,
            Err(e) => rejected("commit", &e),
        };
        if changed {
            self.notify();
        }
        self.surface.finish_commit(&commit.region);
        changed
    }

    fn apply_all(&mut self, commits: Vec<Commit>) -> bool {
        commits
            .iter()
            .fold(false, |any, commit| self.apply_commit(commit) || any)
    }

    fn apply_result(&mut self, op: &str, result: Result<Option<Commit>>) -> bool {
        match result {
            Ok(Some(commit)) => self.apply_commit(&commit),
            Ok(None) => false,
            Err(e) => rejected(op, &e),
        }
    }

    /// Programmatic content update for a cell (same path as a region commit).
    pub fn update_cell_content(&mut self, coord: CellCoord, content: &str) -> bool {
        let commit = Commit {
            region: RegionId::Cell(coord),
            content: crate::sanitize::normalize_content(content),
        };
        let changed = self.apply_commit(&commit);
        if changed {
            if let Err(e) = self.surface.load(&commit.region, content) {
                log::debug!("reload {coord}: {e}");
            }
        }
        changed
    }

    pub fn focus(&mut self, coord: CellCoord) -> bool {
        match self.surface.focus(&RegionId::Cell(coord)) {
            Ok(()) => true,
            Err(e) => rejected("focus", &e),
        }
    }

    pub fn blur(&mut self, coord: CellCoord) -> bool {
        let result = self.surface.blur(&RegionId::Cell(coord));
        self.apply_result("blur", result)
    }

    pub fn set_text_selection(&mut self, coord: CellCoord, range: TextRange) -> bool {
        match self.surface.set_selection(&RegionId::Cell(coord), range) {
            Ok(()) => true,
            Err(e) => rejected("select text", &e),
        }
    }

    /// Keystroke edit; committed after the debounce window via [`Self::poll`].
    pub fn input(
        &mut self,
        coord: CellCoord,
        html: &str,
        selection: TextRange,
        now_ms: u64,
    ) -> bool {
        match self.surface.input(&RegionId::Cell(coord), html, selection, now_ms) {
            Ok(()) => true,
            Err(e) => rejected("input", &e),
        }
    }

    /// Backspace/Delete edit, committed immediately.
    pub fn key_delete(&mut self, coord: CellCoord, html: &str, selection: TextRange) -> bool {
        let result = self.surface.key_delete(&RegionId::Cell(coord), html, selection);
        self.apply_result("delete", result)
    }

    /// Apply debounced commits that are due. Returns whether the grid changed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let commits = self.surface.poll(now_ms);
        self.apply_all(commits)
    }

    pub fn execute(&mut self, coord: CellCoord, command: &Command) -> bool {
        let result = self.surface.execute(&RegionId::Cell(coord), command);
        self.apply_result("format", result)
    }

    pub fn insert_emoji(&mut self, coord: CellCoord, emoji: &str) -> bool {
        let result = self.surface.insert_emoji(&RegionId::Cell(coord), emoji);
        self.apply_result("insert emoji", result)
    }

    pub fn insert_line_break(&mut self, coord: CellCoord) -> bool {
        let result = self.surface.insert_line_break(&RegionId::Cell(coord));
        self.apply_result("line break", result)
    }

    pub fn current_font_size(&self, coord: CellCoord) -> Option<u8> {
        self.surface.current_font_size(&RegionId::Cell(coord))
    }

    /// Capture the cell's selection for the link dialog.
    ///
    /// # Errors
    /// `CollapsedSelection` (see [`Prompt::for_error`]) or `UnknownRegion`.
    pub fn open_link_dialog(&mut self, coord: CellCoord) -> Result<LinkDraft> {
        self.surface.open_link_dialog(&RegionId::Cell(coord))
    }

    pub fn apply_link(&mut self, draft: &LinkDraft) -> bool {
        let result = self.surface.apply_link(draft);
        self.apply_result("link", result)
    }

    pub fn remove_link(&mut self, draft: &LinkDraft) -> bool {
        let result = self.surface.remove_link(draft);
        self.apply_result("unlink", result)
    }

    /// Region markup of a cell as currently shown.
    pub fn region_markup(&self, coord: CellCoord) -> Option<String> {
        self.surface.markup(&RegionId::Cell(coord))
    }
}
