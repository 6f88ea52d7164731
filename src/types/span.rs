use serde::{Deserialize, Serialize};

use super::{CellCoord, CellRect};

/// Merge bookkeeping for one cell.
///
/// Cells without an entry are plain. Persisted as
/// `{ rowspan?, colspan?, isMerged?, mergedFrom? }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCellSpan", into = "RawCellSpan")]
pub enum CellSpan {
    /// Top-left cell of a merge, holding its extent.
    Anchor { rowspan: usize, colspan: usize },
    /// Cell absorbed by the merge anchored at `merged_from`.
    Covered { merged_from: CellCoord },
}

impl CellSpan {
    pub fn is_covered(&self) -> bool {
        matches!(self, Self::Covered { .. })
    }

    /// Span rectangle if this is an anchor at `at`.
    pub fn rect_at(&self, at: CellCoord) -> Option<CellRect> {
        match *self {
            Self::Anchor { rowspan, colspan } => Some(CellRect::from_span(at, rowspan, colspan)),
            Self::Covered { .. } => None,
        }
    }

    pub fn merged_from(&self) -> Option<CellCoord> {
        match *self {
            Self::Covered { merged_from } => Some(merged_from),
            Self::Anchor { .. } => None,
        }
    }
}

/// Wire shape of a span entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCellSpan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rowspan: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    colspan: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    merged_from: Option<CellCoord>,
}

impl TryFrom<RawCellSpan> for CellSpan {
    type Error = String;

    fn try_from(raw: RawCellSpan) -> Result<Self, Self::Error> {
        if raw.is_merged == Some(true) {
            return raw
                .merged_from
                .map(|merged_from| CellSpan::Covered { merged_from })
                .ok_or_else(|| "covered cell without mergedFrom".to_string());
        }
        match (raw.rowspan, raw.colspan) {
            (None, None) => Err("span entry has neither rowspan nor colspan".to_string()),
            (rowspan, colspan) => Ok(CellSpan::Anchor {
                rowspan: rowspan.unwrap_or(1).max(1),
                colspan: colspan.unwrap_or(1).max(1),
            }),
        }
    }
}

impl From<CellSpan> for RawCellSpan {
    fn from(span: CellSpan) -> Self {
        match span {
            CellSpan::Anchor { rowspan, colspan } => RawCellSpan {
                rowspan: Some(rowspan),
                colspan: Some(colspan),
                is_merged: Some(false),
                merged_from: None,
            },
            CellSpan::Covered { merged_from } => RawCellSpan {
                is_merged: Some(true),
                merged_from: Some(merged_from),
                ..RawCellSpan::default()
            },
        }
    }
}
