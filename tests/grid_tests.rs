//! Tests for the grid model and merge engine.
//!
//! Persisted grid shape:
//! ```json
//! {
//!   "headers": ["A", "B"],
//!   "rows": [["1", "2"], ["3", "4"]],
//!   "cellSpans": {"0-0": {"rowspan": 1, "colspan": 2}, "0-1": {"isMerged": true, "mergedFrom": {"row": 0, "col": 0}}},
//!   "cellAlignments": {"1-0": {"horizontal": "center"}}
//! }
//! ```
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use gridsync::grid::MergeRules;
use gridsync::{
    CellAlignment, CellCoord, CellSpan, GridsyncError, HorizontalAlign, MergePolicy, SelectionSet,
    TableData, VerticalAlign,
};
use test_case::test_case;

fn cc(row: usize, col: usize) -> CellCoord {
    CellCoord::new(row, col)
}

fn two_by_two() -> TableData {
    TableData::new(
        vec!["A".into(), "B".into()],
        vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
    )
}

fn grid(rows: usize, cols: usize) -> TableData {
    TableData::new(
        (0..cols).map(|c| format!("H{c}")).collect(),
        (0..rows)
            .map(|r| (0..cols).map(|c| format!("{r},{c}")).collect())
            .collect(),
    )
}

fn merge(grid: &mut TableData, cells: &[(usize, usize)]) -> Result<CellCoord, GridsyncError> {
    let mut selection = SelectionSet::from_cells(cells.iter().map(|&(r, c)| cc(r, c)));
    grid.merge_cells(&mut selection, MergeRules::default())
}

fn assert_rows_match_headers(grid: &TableData) {
    for row in &grid.rows {
        assert_eq!(row.len(), grid.headers.len());
    }
}

// ============================================================================
// Columns and rows
// ============================================================================

#[test]
fn test_add_column_appends_empty_cells() {
    let mut g = two_by_two();
    g.add_column("Nouvelle colonne");
    assert_eq!(g.headers, vec!["A", "B", "Nouvelle colonne"]);
    assert_eq!(g.rows[0], vec!["1", "2", ""]);
    assert_eq!(g.rows[1], vec!["3", "4", ""]);
    assert!(g.cell_spans.is_empty());
}

#[test]
fn test_remove_first_column() {
    let mut g = two_by_two();
    g.remove_column(0).unwrap();
    assert_eq!(g.headers, vec!["B"]);
    assert_eq!(g.rows, vec![vec!["2".to_string()], vec!["4".to_string()]]);
}

#[test]
fn test_last_column_is_kept() {
    let mut g = TableData::new(vec!["Only".into()], vec![vec!["x".into()]]);
    let before = g.clone();
    assert!(matches!(g.remove_column(0), Err(GridsyncError::LastColumn)));
    assert_eq!(g, before);
}

#[test_case(1, 3 ; "one column of three")]
#[test_case(0, 2 ; "first of two")]
#[test_case(4, 5 ; "last of five")]
fn test_remove_column_keeps_rows_rectangular(index: usize, cols: usize) {
    let mut g = grid(3, cols);
    g.remove_column(index).unwrap();
    assert_eq!(g.column_count(), cols - 1);
    assert_rows_match_headers(&g);
}

#[test]
fn test_remove_column_out_of_range() {
    let mut g = two_by_two();
    assert!(matches!(
        g.remove_column(7),
        Err(GridsyncError::ColumnOutOfRange { index: 7, len: 2 })
    ));
}

#[test]
fn test_remove_column_rekeys_spans_and_alignments() {
    let mut g = grid(2, 4);
    merge(&mut g, &[(0, 2), (0, 3)]).unwrap();
    g.set_cell_alignment(cc(1, 3), CellAlignment::horizontal(HorizontalAlign::Right))
        .unwrap();

    g.remove_column(0).unwrap();

    assert_eq!(
        g.span(cc(0, 1)),
        Some(&CellSpan::Anchor {
            rowspan: 1,
            colspan: 2
        })
    );
    assert_eq!(g.merged_from(cc(0, 2)), Some(cc(0, 1)));
    assert_eq!(
        g.alignment(cc(1, 2)).horizontal,
        Some(HorizontalAlign::Right)
    );
    assert!(g.cell_alignments.get(&cc(1, 3)).is_none());
}

#[test]
fn test_remove_column_inside_merge_shrinks_it() {
    let mut g = grid(2, 3);
    merge(&mut g, &[(0, 0), (0, 1), (0, 2)]).unwrap();
    g.remove_column(1).unwrap();
    assert_eq!(
        g.span(cc(0, 0)),
        Some(&CellSpan::Anchor {
            rowspan: 1,
            colspan: 2
        })
    );
    assert_eq!(g.merged_from(cc(0, 1)), Some(cc(0, 0)));
}

#[test]
fn test_remove_column_collapses_two_wide_merge() {
    let mut g = grid(2, 3);
    merge(&mut g, &[(1, 1), (1, 2)]).unwrap();
    g.remove_column(2).unwrap();
    assert!(g.cell_spans.is_empty());
}

#[test]
fn test_remove_anchor_row_reanchors_merge() {
    let mut g = grid(4, 2);
    merge(&mut g, &[(1, 0), (2, 0), (3, 0)]).unwrap();
    g.remove_row(1).unwrap();
    assert_eq!(
        g.span(cc(1, 0)),
        Some(&CellSpan::Anchor {
            rowspan: 2,
            colspan: 1
        })
    );
    assert_eq!(g.merged_from(cc(2, 0)), Some(cc(1, 0)));
    assert_eq!(g.row_count(), 3);
}

#[test]
fn test_remove_row_above_merge_shifts_it_up() {
    let mut g = grid(3, 2);
    merge(&mut g, &[(1, 0), (1, 1)]).unwrap();
    g.remove_row(0).unwrap();
    assert!(g.anchor_rect(cc(0, 0)).is_some());
    assert_eq!(g.merged_from(cc(0, 1)), Some(cc(0, 0)));
}

#[test]
fn test_remove_last_row_is_allowed() {
    let mut g = TableData::new(vec!["A".into()], vec![vec!["x".into()]]);
    g.remove_row(0).unwrap();
    assert_eq!(g.row_count(), 0);
    assert!(matches!(
        g.remove_row(0),
        Err(GridsyncError::RowOutOfRange { index: 0, len: 0 })
    ));
}

#[test]
fn test_add_row_matches_header_count() {
    let mut g = grid(1, 4);
    g.add_row();
    assert_eq!(g.rows[1], vec![String::new(); 4]);
}

#[test]
fn test_update_header() {
    let mut g = two_by_two();
    g.update_header(1, "Beta").unwrap();
    assert_eq!(g.headers, vec!["A", "Beta"]);
    assert!(g.update_header(2, "x").is_err());
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_merge_two_cells_in_first_row() {
    let mut g = two_by_two();
    let anchor = merge(&mut g, &[(0, 0), (0, 1)]).unwrap();
    assert_eq!(anchor, cc(0, 0));

    let json: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
    assert_eq!(json["cellSpans"]["0-0"]["colspan"], 2);
    assert_eq!(json["cellSpans"]["0-0"]["rowspan"], 1);
    assert_eq!(json["cellSpans"]["0-1"]["isMerged"], true);
    assert_eq!(json["cellSpans"]["0-1"]["mergedFrom"]["row"], 0);
    assert_eq!(json["cellSpans"]["0-1"]["mergedFrom"]["col"], 0);
}

#[test]
fn test_merge_clears_selection() {
    let mut g = two_by_two();
    let mut selection = SelectionSet::from_cells([cc(0, 0), cc(1, 0)]);
    g.merge_cells(&mut selection, MergeRules::default()).unwrap();
    assert!(selection.is_empty());
}

#[test]
fn test_merge_with_empty_selection_changes_nothing() {
    let mut g = two_by_two();
    let before = g.clone();
    let mut selection = SelectionSet::new();
    assert!(matches!(
        g.merge_cells(&mut selection, MergeRules::default()),
        Err(GridsyncError::TooFewCells { count: 0 })
    ));
    assert_eq!(g, before);
    assert!(selection.is_empty());
}

#[test]
fn test_merge_single_cell_keeps_selection() {
    let mut g = two_by_two();
    let mut selection = SelectionSet::from_cells([cc(1, 1)]);
    assert!(g.merge_cells(&mut selection, MergeRules::default()).is_err());
    assert_eq!(selection.cells(), &[cc(1, 1)]);
}

#[test]
fn test_merge_covers_rectangle_minus_anchor() {
    let mut g = grid(4, 4);
    merge(&mut g, &[(1, 1), (1, 2), (2, 1), (2, 2), (3, 1), (3, 2)]).unwrap();

    let covered: Vec<CellCoord> = g
        .cell_spans
        .iter()
        .filter(|(_, s)| s.is_covered())
        .map(|(c, _)| *c)
        .collect();
    assert_eq!(
        covered,
        vec![cc(1, 2), cc(2, 1), cc(2, 2), cc(3, 1), cc(3, 2)]
    );
    for coord in covered {
        assert_eq!(g.merged_from(coord), Some(cc(1, 1)));
    }
    assert_eq!(
        g.span(cc(1, 1)),
        Some(&CellSpan::Anchor {
            rowspan: 3,
            colspan: 2
        })
    );
}

#[test]
fn test_merge_selection_order_does_not_matter() {
    let mut a = grid(3, 3);
    let mut b = grid(3, 3);
    merge(&mut a, &[(0, 0), (0, 1), (1, 0), (1, 1)]).unwrap();
    merge(&mut b, &[(1, 1), (0, 1), (1, 0), (0, 0)]).unwrap();
    assert_eq!(a.cell_spans, b.cell_spans);
}

#[test]
fn test_non_rectangular_selection_rejected_by_default() {
    let mut g = grid(3, 3);
    let before = g.clone();
    assert!(matches!(
        merge(&mut g, &[(0, 0), (1, 1)]),
        Err(GridsyncError::NonRectangular)
    ));
    assert_eq!(g, before);
}

#[test]
fn test_bounding_box_policy_covers_whole_box() {
    let mut g = grid(3, 3);
    let mut selection = SelectionSet::from_cells([cc(0, 0), cc(1, 1)]);
    let rules = MergeRules {
        policy: MergePolicy::BoundingBox,
        reject_overlapping: true,
    };
    g.merge_cells(&mut selection, rules).unwrap();
    assert_eq!(
        g.span(cc(0, 0)),
        Some(&CellSpan::Anchor {
            rowspan: 2,
            colspan: 2
        })
    );
    assert_eq!(g.merged_from(cc(1, 0)), Some(cc(0, 0)));
    assert_eq!(g.merged_from(cc(0, 1)), Some(cc(0, 0)));
}

#[test]
fn test_overlapping_merge_rejected() {
    let mut g = grid(3, 3);
    merge(&mut g, &[(0, 0), (0, 1)]).unwrap();
    let before = g.clone();
    assert!(matches!(
        merge(&mut g, &[(0, 1), (1, 1)]),
        Err(GridsyncError::OverlappingMerge { anchor }) if anchor == cc(0, 0)
    ));
    assert_eq!(g, before);
}

#[test]
fn test_overlapping_merge_replaces_when_allowed() {
    let mut g = grid(3, 3);
    merge(&mut g, &[(0, 0), (0, 1)]).unwrap();
    let mut selection = SelectionSet::from_cells([cc(0, 1), cc(1, 1)]);
    let rules = MergeRules {
        policy: MergePolicy::Strict,
        reject_overlapping: false,
    };
    g.merge_cells(&mut selection, rules).unwrap();
    assert!(g.span(cc(0, 0)).is_none());
    assert!(g.anchor_rect(cc(0, 1)).is_some());
    assert_eq!(g.merges().len(), 1);
}

#[test]
fn test_merge_out_of_range_cell() {
    let mut g = two_by_two();
    assert!(matches!(
        merge(&mut g, &[(0, 0), (5, 0)]),
        Err(GridsyncError::CellOutOfRange(_))
    ));
}

// ============================================================================
// Unmerging
// ============================================================================

#[test]
fn test_unmerge_restores_plain_cells() {
    let mut g = grid(3, 3);
    let before = g.clone();
    merge(&mut g, &[(0, 0), (0, 1), (1, 0), (1, 1)]).unwrap();

    let mut selection = SelectionSet::from_cells([cc(0, 0)]);
    assert_eq!(g.unmerge_cells(&mut selection).unwrap(), cc(0, 0));
    assert!(g.cell_spans.is_empty());
    assert_eq!(g, before);
    assert!(selection.is_empty());
}

#[test]
fn test_unmerge_non_anchor_is_rejected() {
    let mut g = grid(2, 2);
    merge(&mut g, &[(0, 0), (0, 1)]).unwrap();
    let before = g.clone();
    let mut selection = SelectionSet::from_cells([cc(0, 1)]);
    assert!(matches!(
        g.unmerge_cells(&mut selection),
        Err(GridsyncError::NotAnAnchor(c)) if c == cc(0, 1)
    ));
    assert_eq!(g, before);
}

#[test]
fn test_unmerge_only_touches_first_selected_anchor() {
    let mut g = grid(2, 4);
    merge(&mut g, &[(0, 0), (0, 1)]).unwrap();
    merge(&mut g, &[(0, 2), (0, 3)]).unwrap();
    let mut selection = SelectionSet::from_cells([cc(0, 2), cc(0, 0)]);
    g.unmerge_cells(&mut selection).unwrap();
    assert!(g.anchor_rect(cc(0, 0)).is_some());
    assert!(g.anchor_rect(cc(0, 2)).is_none());
    assert!(!g.is_covered(cc(0, 3)));
}

// ============================================================================
// Alignment and content
// ============================================================================

#[test]
fn test_alignment_axes_update_independently() {
    let mut g = two_by_two();
    g.set_cell_alignment(cc(0, 1), CellAlignment::horizontal(HorizontalAlign::Center))
        .unwrap();
    g.set_cell_alignment(cc(0, 1), CellAlignment::vertical(VerticalAlign::Bottom))
        .unwrap();
    let stored = g.alignment(cc(0, 1));
    assert_eq!(stored.horizontal, Some(HorizontalAlign::Center));
    assert_eq!(stored.vertical, Some(VerticalAlign::Bottom));

    let resolved = g.alignment(cc(1, 1)).resolve();
    assert_eq!(resolved.horizontal, HorizontalAlign::Left);
    assert_eq!(resolved.vertical, VerticalAlign::Middle);
}

#[test]
fn test_alignment_outside_grid() {
    let mut g = two_by_two();
    assert!(g
        .set_cell_alignment(cc(2, 0), CellAlignment::default())
        .is_err());
    assert!(g.cell_alignments.is_empty());
}

#[test]
fn test_update_cell_content_is_idempotent() {
    let mut g = two_by_two();
    let revision = g.revision();
    assert!(g.update_cell_content(cc(0, 0), "<p>new</p>").unwrap());
    let after_first = g.revision();
    assert!(after_first > revision);
    assert!(!g.update_cell_content(cc(0, 0), "<p>new</p>").unwrap());
    assert!(!g.update_cell_content(cc(0, 0), "  <p>new</p> ").unwrap());
    assert_eq!(g.revision(), after_first);
}

#[test_case("<p><br></p>" ; "empty paragraph")]
#[test_case("<br>" ; "bare line break")]
#[test_case("" ; "empty string")]
#[test_case("  " ; "whitespace")]
fn test_placeholder_content_is_stored_empty(content: &str) {
    let mut g = two_by_two();
    g.update_cell_content(cc(1, 1), content).unwrap();
    assert_eq!(g.rows[1][1], "");
}

// ============================================================================
// Selection clicks
// ============================================================================

#[test]
fn test_click_toggles() {
    let g = two_by_two();
    let mut selection = SelectionSet::new();
    selection.click(&g, cc(0, 0), false);
    selection.click(&g, cc(1, 1), false);
    selection.click(&g, cc(0, 0), false);
    assert_eq!(selection.cells(), &[cc(1, 1)]);
}

#[test]
fn test_shift_click_selects_rectangle_skipping_covered() {
    let mut g = grid(3, 3);
    merge(&mut g, &[(1, 1), (1, 2)]).unwrap();
    let mut selection = SelectionSet::new();
    selection.click(&g, cc(0, 0), false);
    selection.click(&g, cc(2, 2), true);
    assert_eq!(selection.len(), 8);
    assert!(!selection.contains(cc(1, 2)));
    assert!(selection.contains(cc(1, 1)));
}

#[test]
fn test_click_covered_cell_selects_anchor() {
    let mut g = grid(2, 2);
    merge(&mut g, &[(0, 0), (1, 0)]).unwrap();
    let mut selection = SelectionSet::from_cells([cc(0, 1)]);
    selection.click(&g, cc(1, 0), false);
    assert_eq!(selection.cells(), &[cc(0, 0)]);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_persisted_grid_round_trip() {
    let json = r#"{
        "headers": ["A", "B"],
        "rows": [["1", "2"], ["3", "4"]],
        "cellSpans": {
            "0-0": {"rowspan": 2, "colspan": 1},
            "1-0": {"isMerged": true, "mergedFrom": {"row": 0, "col": 0}}
        },
        "cellAlignments": {"0-1": {"horizontal": "right"}}
    }"#;
    let g = TableData::from_json(json).unwrap();
    assert_eq!(g.merged_from(cc(1, 0)), Some(cc(0, 0)));
    assert_eq!(g.alignment(cc(0, 1)).horizontal, Some(HorizontalAlign::Right));

    let again = TableData::from_json(&g.to_json().unwrap()).unwrap();
    assert_eq!(again, g);
}

#[test]
fn test_short_rows_are_padded() {
    let g = TableData::from_json(r#"{"headers": ["A", "B", "C"], "rows": [["1"]]}"#).unwrap();
    assert_eq!(g.rows[0], vec!["1", "", ""]);
}

#[test]
fn test_seeded_grid_labels() {
    let g = TableData::seeded(3, 2);
    assert_eq!(g.headers, vec!["Colonne 1", "Colonne 2", "Colonne 3"]);
    assert_eq!(g.rows[1][2], "Ligne 2, Col 3");
}
