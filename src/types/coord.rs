use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, col) position in the grid body. Both indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Map key used by the persisted document shape: `"row-col"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.row, self.col)
    }

    /// Parse a `"row-col"` key.
    pub fn parse_key(key: &str) -> Option<Self> {
        let (row, col) = key.split_once('-')?;
        Some(Self {
            row: row.trim().parse().ok()?,
            col: col.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Serde adapter for `BTreeMap<CellCoord, V>` stored as `{"row-col": V}`.
///
/// Entries whose key does not parse are dropped on load.
pub mod coord_key_map {
    use super::CellCoord;
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    /// # Errors
    /// Whatever the serializer reports.
    pub fn serialize<S, V>(map: &BTreeMap<CellCoord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (coord, value) in map {
            out.serialize_entry(&coord.key(), value)?;
        }
        out.end()
    }

    /// # Errors
    /// Input that is not a string-keyed map of `V`.
    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<CellCoord, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let raw: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (key, value) in raw {
            match CellCoord::parse_key(&key) {
                Some(coord) => {
                    map.insert(coord, value);
                }
                None => log::warn!("dropping entry with malformed cell key {key:?}"),
            }
        }
        Ok(map)
    }
}

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl CellRect {
    /// Rectangle spanned by `rowspan` x `colspan` cells from `anchor`.
    /// Extents saturate at `usize::MAX`.
    pub fn from_span(anchor: CellCoord, rowspan: usize, colspan: usize) -> Self {
        Self {
            top: anchor.row,
            left: anchor.col,
            bottom: anchor.row.saturating_add(rowspan.max(1) - 1),
            right: anchor.col.saturating_add(colspan.max(1) - 1),
        }
    }

    /// Cut the far edges at a `rows` x `cols` grid. The anchor is kept even
    /// when it lies outside.
    pub fn clipped(self, rows: usize, cols: usize) -> Self {
        Self {
            bottom: self.bottom.min(rows.saturating_sub(1)).max(self.top),
            right: self.right.min(cols.saturating_sub(1)).max(self.left),
            ..self
        }
    }

    /// Smallest rectangle containing both corners.
    pub fn spanning(a: CellCoord, b: CellCoord) -> Self {
        Self {
            top: a.row.min(b.row),
            left: a.col.min(b.col),
            bottom: a.row.max(b.row),
            right: a.col.max(b.col),
        }
    }

    pub fn anchor(&self) -> CellCoord {
        CellCoord::new(self.top, self.left)
    }

    pub fn rowspan(&self) -> usize {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    pub fn colspan(&self) -> usize {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    pub fn area(&self) -> usize {
        self.rowspan().saturating_mul(self.colspan())
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        (self.top..=self.bottom).contains(&coord.row)
            && (self.left..=self.right).contains(&coord.col)
    }

    pub fn intersects(&self, other: &CellRect) -> bool {
        self.top <= other.bottom
            && other.top <= self.bottom
            && self.left <= other.right
            && other.left <= self.right
    }

    /// All coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| CellCoord::new(row, col)))
    }
}
