//! gridsync - table and rich-text editing core for content documents
//!
//! Edits the structured content of article-like documents, in the browser
//! via WebAssembly or natively:
//! - Grid cell merging with span bookkeeping (rowspan/colspan, covered cells)
//! - Cell-render resolution: which cells a table renderer must emit
//! - Rich-text editable regions kept in sync with stored HTML, with
//!   debounced commits, formatting commands and a link dialog lifecycle
//! - Prose documents of sections and typed blocks
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TableEdit } from 'gridsync';
//! await init();
//! const edit = new TableEdit(tableJson, null);
//! edit.set_change_callback((grid) => persist(grid));
//! edit.click(0, 0, false);
//! edit.click(0, 1, true);
//! edit.merge_selected();
//! ```

// Data model and engines
pub mod config;
pub mod document;
pub mod error;
pub mod grid;
pub mod types;

// Text handling
pub mod format;
pub mod markup;
pub mod rich_text;
pub mod sanitize;

// Resolution, rendering and editing
pub mod editor;
pub mod layout;
pub mod render;

mod bindings;

use wasm_bindgen::prelude::*;

pub use bindings::TableEdit;
pub use config::{EditorConfig, MergePolicy};
pub use editor::{DocumentEditor, TableEditor};
pub use error::{GridsyncError, Result};

pub use types::*;

/// Resolve a persisted grid and return the rows to emit as JSON
///
/// # Arguments
/// * `grid_json` - The grid in its persisted JSON shape
///
/// # Returns
/// A JSON array of rows, each an array of `{row, col, rowspan, colspan, alignment}`
///
/// # Errors
/// Returns an error if the grid JSON is malformed.
#[wasm_bindgen]
pub fn resolve_table_json(grid_json: &str) -> std::result::Result<String, JsValue> {
    let grid = TableData::from_json(grid_json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&layout::resolve(&grid))
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Render a persisted grid as read-only table HTML
///
/// # Errors
/// Returns an error if the grid JSON is malformed.
#[wasm_bindgen]
pub fn render_table_html(grid_json: &str) -> std::result::Result<String, JsValue> {
    let grid = TableData::from_json(grid_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(render::table_html(&grid))
}

/// Repair stored cell or block content the way editable regions do on load
#[must_use]
#[wasm_bindgen]
pub fn sanitize_content(stored: &str) -> String {
    sanitize::sanitize_stored(stored)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
