//! Tests for cell-render resolution.
//!
//! For each row the resolver decides which columns a table renderer emits
//! (with rowspan/colspan and effective alignment) and which are absorbed by
//! a merge anchored earlier.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::collections::BTreeSet;

use gridsync::grid::MergeRules;
use gridsync::layout::{resolve, resolve_row, row_coverage, Coverage, ResolverCache};
use gridsync::render::table_html;
use gridsync::{
    CellAlignment, CellCoord, HorizontalAlign, SelectionSet, TableData, VerticalAlign,
};

fn cc(row: usize, col: usize) -> CellCoord {
    CellCoord::new(row, col)
}

fn grid(rows: usize, cols: usize) -> TableData {
    TableData::new(
        (0..cols).map(|c| format!("H{c}")).collect(),
        (0..rows)
            .map(|r| (0..cols).map(|c| format!("{r},{c}")).collect())
            .collect(),
    )
}

fn merge(grid: &mut TableData, cells: &[(usize, usize)]) {
    let mut selection = SelectionSet::from_cells(cells.iter().map(|&(r, c)| cc(r, c)));
    grid.merge_cells(&mut selection, MergeRules::default())
        .expect("merge");
}

/// Every coordinate covered by an emitted cell's rectangle, asserting no
/// coordinate is claimed twice.
fn claimed(grid: &TableData) -> BTreeSet<CellCoord> {
    let mut seen = BTreeSet::new();
    for row in resolve(grid) {
        for cell in row {
            for r in cell.row..cell.row + cell.rowspan {
                for c in cell.col..cell.col + cell.colspan {
                    assert!(seen.insert(cc(r, c)), "({r}, {c}) claimed twice");
                }
            }
        }
    }
    seen
}

fn all_coords(grid: &TableData) -> BTreeSet<CellCoord> {
    (0..grid.row_count())
        .flat_map(|r| (0..grid.column_count()).map(move |c| cc(r, c)))
        .collect()
}

#[test]
fn test_plain_grid_emits_every_cell() {
    let g = grid(3, 4);
    let rows = resolve(&g);
    assert_eq!(rows.len(), 3);
    for (r, row) in rows.iter().enumerate() {
        let cols: Vec<usize> = row.iter().map(|c| c.col).collect();
        assert_eq!(cols, vec![0, 1, 2, 3]);
        assert!(row.iter().all(|c| c.row == r && c.rowspan == 1 && c.colspan == 1));
    }
}

#[test]
fn test_merged_first_row_emits_single_cell() {
    let mut g = TableData::new(
        vec!["A".into(), "B".into()],
        vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
    );
    merge(&mut g, &[(0, 0), (0, 1)]);

    let row0 = resolve_row(&g, 0);
    assert_eq!(row0.len(), 1);
    assert_eq!((row0[0].col, row0[0].colspan, row0[0].rowspan), (0, 2, 1));
    assert_eq!(resolve_row(&g, 1).len(), 2);
}

#[test]
fn test_vertical_merge_suppresses_rows_below() {
    let mut g = grid(3, 3);
    merge(&mut g, &[(0, 1), (1, 1), (2, 1)]);

    assert_eq!(resolve_row(&g, 0).iter().map(|c| c.col).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(resolve_row(&g, 1).iter().map(|c| c.col).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(resolve_row(&g, 2).iter().map(|c| c.col).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(resolve_row(&g, 0)[1].rowspan, 3);
}

#[test]
fn test_coverage_names_the_absorbing_anchor() {
    let mut g = grid(3, 3);
    merge(&mut g, &[(1, 0), (1, 1), (2, 0), (2, 1)]);
    let coverage = row_coverage(&g, 2);
    assert_eq!(coverage[0], Coverage::Suppressed { by: cc(1, 0) });
    assert_eq!(coverage[1], Coverage::Suppressed { by: cc(1, 0) });
    assert!(matches!(coverage[2], Coverage::Emitted(_)));
}

#[test]
fn test_every_coordinate_claimed_exactly_once() {
    let mut g = grid(6, 6);
    merge(&mut g, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
    merge(&mut g, &[(0, 3), (1, 3), (2, 3)]);
    merge(&mut g, &[(3, 0), (3, 1), (3, 2)]);
    merge(&mut g, &[(4, 4), (4, 5), (5, 4), (5, 5)]);
    assert_eq!(claimed(&g), all_coords(&g));
}

#[test]
fn test_merge_then_unmerge_restores_emission() {
    let mut g = grid(4, 4);
    let before = resolve(&g);
    merge(&mut g, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    assert_ne!(resolve(&g), before);

    let mut selection = SelectionSet::from_cells([cc(1, 1)]);
    g.unmerge_cells(&mut selection).unwrap();
    assert_eq!(resolve(&g), before);
}

#[test]
fn test_missing_covered_markers_still_suppressed() {
    // Legacy data: anchors without covered entries.
    let json = r#"{
        "headers": ["A", "B", "C"],
        "rows": [["1", "2", "3"], ["4", "5", "6"]],
        "cellSpans": {"0-0": {"rowspan": 2, "colspan": 2}}
    }"#;
    let g = TableData::from_json(json).unwrap();
    assert_eq!(resolve_row(&g, 0).iter().map(|c| c.col).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(resolve_row(&g, 1).iter().map(|c| c.col).collect::<Vec<_>>(), vec![2]);
    assert_eq!(claimed(&g), all_coords(&g));
}

#[test]
fn test_span_past_grid_edge_is_clipped() {
    let json = r#"{
        "headers": ["A", "B"],
        "rows": [["1", "2"]],
        "cellSpans": {"0-1": {"rowspan": 4, "colspan": 3}}
    }"#;
    let g = TableData::from_json(json).unwrap();
    let row = resolve_row(&g, 0);
    assert_eq!((row[1].rowspan, row[1].colspan), (1, 1));
}

#[test]
fn test_absurd_persisted_span_resolves_within_grid() {
    let json = r#"{
        "headers": ["A", "B"],
        "rows": [["1", "2"], ["3", "4"]],
        "cellSpans": {"1-0": {"rowspan": 18446744073709551615, "colspan": 1}}
    }"#;
    let g = TableData::from_json(json).unwrap();
    let row = resolve_row(&g, 1);
    assert_eq!(row.len(), 2);
    assert_eq!((row[0].rowspan, row[0].colspan), (1, 1));
    assert_eq!(claimed(&g), all_coords(&g));
    assert!(g.merges().is_empty());
    let html = table_html(&g);
    assert!(html.contains(">3</td>"));
    assert!(!html.contains("rowspan"));
}

#[test]
fn test_absurd_span_is_cut_when_grid_is_edited() {
    let json = r#"{
        "headers": ["A", "B"],
        "rows": [["1", "2"], ["3", "4"]],
        "cellSpans": {"0-0": {"rowspan": 1, "colspan": 18446744073709551615}}
    }"#;
    let mut g = TableData::from_json(json).unwrap();
    assert_eq!(g.merges().len(), 1);
    g.remove_row(1).unwrap();
    assert_eq!(g.merged_from(cc(0, 1)), Some(cc(0, 0)));
    let row = resolve_row(&g, 0);
    assert_eq!(row.len(), 1);
    assert_eq!((row[0].rowspan, row[0].colspan), (1, 2));
    assert_eq!(claimed(&g), all_coords(&g));
}

#[test]
fn test_alignment_is_resolved_with_defaults() {
    let mut g = grid(1, 2);
    g.set_cell_alignment(cc(0, 1), CellAlignment::vertical(VerticalAlign::Top))
        .unwrap();
    let row = resolve_row(&g, 0);
    assert_eq!(row[0].alignment.horizontal, HorizontalAlign::Left);
    assert_eq!(row[0].alignment.vertical, VerticalAlign::Middle);
    assert_eq!(row[1].alignment.horizontal, HorizontalAlign::Left);
    assert_eq!(row[1].alignment.vertical, VerticalAlign::Top);
}

#[test]
fn test_cache_follows_revision() {
    let mut g = grid(2, 2);
    let mut cache = ResolverCache::new();
    assert_eq!(cache.rows(&g)[0].len(), 2);

    merge(&mut g, &[(0, 0), (0, 1)]);
    assert_eq!(cache.rows(&g)[0].len(), 1);

    cache.invalidate();
    assert_eq!(cache.rows(&g)[0].len(), 1);
}

#[test]
fn test_resolved_rows_serialize_camel_case() {
    let mut g = grid(1, 2);
    merge(&mut g, &[(0, 0), (0, 1)]);
    let json = serde_json::to_value(resolve(&g)).unwrap();
    assert_eq!(json[0][0]["colspan"], 2);
    assert_eq!(json[0][0]["alignment"]["horizontal"], "left");
}

#[test]
fn test_table_html_emits_spans() {
    let mut g = grid(2, 2);
    merge(&mut g, &[(0, 0), (1, 0)]);
    let html = table_html(&g);
    assert!(html.contains(r#"<td rowspan="2" style="text-align: left; vertical-align: middle">0,0</td>"#));
    assert!(!html.contains(">1,0</td>"));
    assert_eq!(html.matches("<td").count(), 3);
}

#[test]
fn test_public_json_entry_point() {
    let json = r#"{"headers": ["A", "B"], "rows": [["1", "2"]],
        "cellSpans": {"0-0": {"colspan": 2}, "0-1": {"isMerged": true, "mergedFrom": {"row": 0, "col": 0}}}}"#;
    let out = gridsync::resolve_table_json(json).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows[0].as_array().unwrap().len(), 1);
}
