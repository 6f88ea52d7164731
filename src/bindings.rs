//! JavaScript bindings for the table editor.
//!
//! `TableEdit` wraps a [`TableEditor`] and talks JSON with the host. Every
//! applied change is reported through the change callback with the whole
//! grid, which the host persists.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TableEdit } from 'gridsync';
//! await init();
//! const edit = new TableEdit(block.table_data_json, null);
//! edit.set_change_callback((grid) => saveBlock(grid));
//! edit.input(0, 1, cell.innerHTML, start, end, performance.now());
//! ```

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::editor::{LinkDraft, Prompt, TableEditor};
use crate::error::GridsyncError;
use crate::format::Command;
use crate::render::table_html_from_rows;
use crate::rich_text::TextRange;
use crate::types::{AlignmentPatch, CellCoord, TableData};

fn to_js(error: &GridsyncError) -> JsValue {
    match Prompt::for_error(error) {
        Some(prompt) => JsValue::from_str(prompt.message()),
        None => JsValue::from_str(&error.to_string()),
    }
}

/// Host timestamps come from `performance.now()` / `Date.now()`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(t: f64) -> u64 {
    if t.is_finite() && t > 0.0 {
        t as u64
    } else {
        0
    }
}

/// Table editor exported to JavaScript.
#[wasm_bindgen]
pub struct TableEdit {
    editor: TableEditor,
    pending_link: Option<LinkDraft>,
}

#[wasm_bindgen]
impl TableEdit {
    /// Start editing a persisted grid, or the seeded placeholder grid when
    /// `grid_json` is absent.
    ///
    /// # Errors
    /// Malformed grid or configuration JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(
        grid_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<TableEdit, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(|e| to_js(&e))?,
            None => EditorConfig::default(),
        };
        let editor = match grid_json {
            Some(json) => TableEditor::from_json(&json, config).map_err(|e| to_js(&e))?,
            None => TableEditor::seeded(config),
        };
        Ok(Self {
            editor,
            pending_link: None,
        })
    }

    /// Callback receiving the whole grid (as a JS object) after each change.
    pub fn set_change_callback(&mut self, callback: Option<Function>) {
        let Some(callback) = callback else {
            self.editor.clear_sink();
            return;
        };
        self.editor.set_sink(move |grid: &TableData| {
            match serde_wasm_bindgen::to_value(grid) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        log::warn!("change callback threw: {e:?}");
                    }
                }
                Err(e) => log::warn!("grid serialization failed: {e}"),
            }
        });
    }

    /// # Errors
    /// Serialization failure.
    pub fn grid_json(&self) -> Result<String, JsValue> {
        self.editor.grid().to_json().map_err(|e| to_js(&e))
    }

    /// Replace the grid after an external save round-trip.
    ///
    /// # Errors
    /// Malformed grid JSON.
    pub fn replace_grid(&mut self, grid_json: &str) -> Result<(), JsValue> {
        let grid = TableData::from_json(grid_json).map_err(|e| to_js(&e))?;
        self.editor.replace_grid(grid);
        Ok(())
    }

    /// Resolved rows: `[[{row, col, rowspan, colspan, alignment}]]`.
    ///
    /// # Errors
    /// Serialization failure.
    pub fn rows(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.rows())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Read-only table markup of the current grid.
    pub fn table_html(&mut self) -> String {
        let rows = self.editor.rows().to_vec();
        table_html_from_rows(self.editor.grid(), &rows)
    }

    // ---- Selection and structure ----

    pub fn click(&mut self, row: usize, col: usize, shift: bool) {
        self.editor.click(CellCoord::new(row, col), shift);
    }

    pub fn clear_selection(&mut self) {
        self.editor.clear_selection();
    }

    /// Selected cells as `["r-c", ...]`.
    pub fn selected_keys(&self) -> Vec<String> {
        self.editor.selection().cells().iter().map(CellCoord::key).collect()
    }

    pub fn merge_selected(&mut self) -> bool {
        self.editor.merge_selected()
    }

    pub fn unmerge_selected(&mut self) -> bool {
        self.editor.unmerge_selected()
    }

    pub fn add_row(&mut self) {
        self.editor.add_row();
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        self.editor.remove_row(index)
    }

    pub fn add_column(&mut self) {
        self.editor.add_column();
    }

    pub fn remove_column(&mut self, index: usize) -> bool {
        self.editor.remove_column(index)
    }

    pub fn update_header(&mut self, index: usize, label: &str) -> bool {
        self.editor.update_header(index, label)
    }

    /// Apply `{horizontal?, vertical?}` to the active cell.
    ///
    /// # Errors
    /// The patch is not a valid alignment object.
    pub fn set_alignment(&mut self, patch: JsValue) -> Result<bool, JsValue> {
        let patch: AlignmentPatch = serde_wasm_bindgen::from_value(patch)
            .map_err(|e| JsValue::from_str(&format!("Invalid alignment: {e}")))?;
        Ok(self.editor.set_alignment(patch))
    }

    // ---- Cell regions ----

    pub fn region_markup(&self, row: usize, col: usize) -> Option<String> {
        self.editor.region_markup(CellCoord::new(row, col))
    }

    pub fn focus(&mut self, row: usize, col: usize) -> bool {
        self.editor.focus(CellCoord::new(row, col))
    }

    pub fn blur(&mut self, row: usize, col: usize) -> bool {
        self.editor.blur(CellCoord::new(row, col))
    }

    pub fn set_text_selection(&mut self, row: usize, col: usize, start: usize, end: usize) -> bool {
        self.editor
            .set_text_selection(CellCoord::new(row, col), TextRange::new(start, end))
    }

    pub fn input(
        &mut self,
        row: usize,
        col: usize,
        html: &str,
        start: usize,
        end: usize,
        now_ms: f64,
    ) -> bool {
        self.editor.input(
            CellCoord::new(row, col),
            html,
            TextRange::new(start, end),
            millis(now_ms),
        )
    }

    pub fn key_delete(
        &mut self,
        row: usize,
        col: usize,
        html: &str,
        start: usize,
        end: usize,
    ) -> bool {
        self.editor
            .key_delete(CellCoord::new(row, col), html, TextRange::new(start, end))
    }

    /// Apply due debounced commits. Hosts call this from a timer.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        self.editor.poll(millis(now_ms))
    }

    /// Earliest pending commit deadline, for scheduling the next `poll`.
    #[allow(clippy::cast_precision_loss)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.editor.surface().next_deadline().map(|t| t as f64)
    }

    /// Run an `execCommand`-style formatting command on a cell.
    ///
    /// # Errors
    /// Unknown command name or unsupported value.
    pub fn execute(
        &mut self,
        row: usize,
        col: usize,
        name: &str,
        value: Option<String>,
    ) -> Result<bool, JsValue> {
        let command = Command::parse(name, value.as_deref()).map_err(|e| to_js(&e))?;
        Ok(self.editor.execute(CellCoord::new(row, col), &command))
    }

    pub fn insert_emoji(&mut self, row: usize, col: usize, emoji: &str) -> bool {
        self.editor.insert_emoji(CellCoord::new(row, col), emoji)
    }

    pub fn insert_line_break(&mut self, row: usize, col: usize) -> bool {
        self.editor.insert_line_break(CellCoord::new(row, col))
    }

    pub fn current_font_size(&self, row: usize, col: usize) -> Option<u8> {
        self.editor.current_font_size(CellCoord::new(row, col))
    }

    // ---- Link dialog ----

    /// Capture the selection for the link dialog and return
    /// `{range, url, newTab, existing}`.
    ///
    /// # Errors
    /// The "select text first" prompt when nothing is selected.
    pub fn open_link_dialog(&mut self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        let draft = self
            .editor
            .open_link_dialog(CellCoord::new(row, col))
            .map_err(|e| to_js(&e))?;
        let value = serde_wasm_bindgen::to_value(&draft)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))?;
        self.pending_link = Some(draft);
        Ok(value)
    }

    /// Confirm the open link dialog.
    pub fn apply_link(&mut self, url: &str, new_tab: bool) -> bool {
        let Some(draft) = self.pending_link.take() else {
            log::debug!("apply_link without an open dialog");
            return false;
        };
        self.editor
            .apply_link(&draft.with_url(url).with_new_tab(new_tab))
    }

    /// Unlink the range captured by the open link dialog.
    pub fn remove_link(&mut self) -> bool {
        match self.pending_link.take() {
            Some(draft) => self.editor.remove_link(&draft),
            None => false,
        }
    }

    pub fn cancel_link(&mut self) {
        self.pending_link = None;
    }
}
