//! Structured error types for gridsync.
//!
//! Every engine operation that can be rejected returns one of these. A rejected
//! operation never leaves the grid or document half-modified.

use crate::types::CellCoord;

/// All errors that can occur while editing grids, regions and documents.
#[derive(Debug, thiserror::Error)]
pub enum GridsyncError {
    /// The grid must keep at least one column.
    #[error("cannot remove the last column")]
    LastColumn,

    /// Merging needs at least two selected cells.
    #[error("merge needs at least 2 cells, got {count}")]
    TooFewCells { count: usize },

    /// Unmerge was requested on a cell that does not anchor a merge.
    #[error("cell {0} is not a merge anchor")]
    NotAnAnchor(CellCoord),

    /// The selection does not fill its bounding rectangle.
    #[error("selection is not rectangular")]
    NonRectangular,

    /// The requested merge intersects the merge anchored at `anchor`.
    #[error("merge overlaps existing merge anchored at {anchor}")]
    OverlappingMerge { anchor: CellCoord },

    /// Row index past the end of the grid.
    #[error("row {index} out of range (rows: {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Column index past the end of the grid.
    #[error("column {index} out of range (columns: {len})")]
    ColumnOutOfRange { index: usize, len: usize },

    /// Coordinate outside the grid.
    #[error("cell {0} out of range")]
    CellOutOfRange(CellCoord),

    /// An operation needed a non-empty text selection.
    #[error("no text selected")]
    CollapsedSelection,

    /// No editable region is bound under this id.
    #[error("unknown region: {0}")]
    UnknownRegion(String),

    /// Section lookup failure.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// Block lookup failure.
    #[error("unknown block: {0}")]
    UnknownBlock(String),

    /// A formatting command could not be applied at all.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image upload collaborator failed.
    #[error("image upload failed: {0}")]
    Upload(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridsyncError>;

impl From<String> for GridsyncError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridsyncError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridsyncError> for wasm_bindgen::JsValue {
    fn from(e: GridsyncError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
