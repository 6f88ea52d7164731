use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coord::coord_key_map;
use super::{CellAlignment, CellCoord, CellRect, CellSpan};

/// The table grid: column headers, row contents and merge/alignment maps.
///
/// Cell content is an opaque rich-text fragment as far as the grid is
/// concerned. Persisted in the camelCase document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(
        default,
        with = "coord_key_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub cell_spans: BTreeMap<CellCoord, CellSpan>,
    #[serde(
        default,
        with = "coord_key_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub cell_alignments: BTreeMap<CellCoord, CellAlignment>,
    /// Bumped on every mutation; lets render caches detect staleness.
    #[serde(skip)]
    pub(crate) revision: u64,
}

/// Equality ignores the revision counter.
impl PartialEq for TableData {
    fn eq(&self, other: &Self) -> bool {
        self.headers == other.headers
            && self.rows == other.rows
            && self.cell_spans == other.cell_spans
            && self.cell_alignments == other.cell_alignments
    }
}

impl Default for TableData {
    fn default() -> Self {
        Self::seeded(3, 2)
    }
}

impl TableData {
    /// Build a grid from headers and rows. Rows are padded or truncated to
    /// the header count.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self {
            headers,
            rows,
            cell_spans: BTreeMap::new(),
            cell_alignments: BTreeMap::new(),
            revision: 0,
        };
        table.normalize_shape();
        table
    }

    /// Seed shape used when a new table block is created.
    pub fn seeded(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let headers = (1..=columns).map(|c| format!("Colonne {c}")).collect();
        let rows = (1..=rows)
            .map(|r| (1..=columns).map(|c| format!("Ligne {r}, Col {c}")).collect())
            .collect();
        Self::new(headers, rows)
    }

    /// Parse a persisted table document.
    ///
    /// # Errors
    /// Returns an error if the JSON does not match the table shape.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let mut table: Self = serde_json::from_str(json)?;
        table.normalize_shape();
        Ok(table)
    }

    /// Serialize to the persisted document shape.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row < self.row_count() && coord.col < self.column_count()
    }

    pub fn span(&self, coord: CellCoord) -> Option<&CellSpan> {
        self.cell_spans.get(&coord)
    }

    pub fn is_covered(&self, coord: CellCoord) -> bool {
        self.span(coord).is_some_and(CellSpan::is_covered)
    }

    /// Anchor of the merge covering `coord`, if `coord` is a covered cell.
    pub fn merged_from(&self, coord: CellCoord) -> Option<CellCoord> {
        self.span(coord).and_then(CellSpan::merged_from)
    }

    /// Span rectangle if `coord` anchors a merge, cut at the grid edge.
    pub fn anchor_rect(&self, coord: CellCoord) -> Option<CellRect> {
        self.span(coord)
            .and_then(|span| span.rect_at(coord))
            .map(|rect| rect.clipped(self.row_count(), self.column_count()))
    }

    /// Every merge rectangle, ordered by anchor and cut at the grid edge.
    pub fn merges(&self) -> Vec<CellRect> {
        self.cell_spans
            .keys()
            .filter_map(|coord| self.anchor_rect(*coord))
            .filter(|rect| rect.area() > 1)
            .collect()
    }

    pub fn alignment(&self, coord: CellCoord) -> CellAlignment {
        self.cell_alignments.get(&coord).copied().unwrap_or_default()
    }

    pub fn content(&self, coord: CellCoord) -> Option<&str> {
        self.rows
            .get(coord.row)
            .and_then(|row| row.get(coord.col))
            .map(String::as_str)
    }

    pub(crate) fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Keep every row exactly as wide as the header list.
    fn normalize_shape(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}
