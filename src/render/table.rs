//! Generates table HTML from a grid.

use quick_xml::escape::escape;

use crate::layout::{resolve, RenderRow};
use crate::sanitize::sanitize_stored;
use crate::types::TableData;

/// Render a grid as an HTML `<table>`.
pub fn table_html(grid: &TableData) -> String {
    table_html_from_rows(grid, &resolve(grid))
}

/// Render a grid using already resolved rows (e.g. from a resolver cache).
///
/// Header labels are escaped; cell content is stored HTML and is written
/// as is after load-time repair.
pub fn table_html_from_rows(grid: &TableData, rows: &[RenderRow]) -> String {
    let mut out = String::with_capacity(256 + 64 * grid.row_count() * grid.column_count());
    out.push_str("<table>\n<thead>\n<tr>");
    for header in &grid.headers {
        out.push_str("<th>");
        out.push_str(&escape(header.as_str()));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td");
            if cell.rowspan > 1 {
                out.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
            }
            if cell.colspan > 1 {
                out.push_str(&format!(" colspan=\"{}\"", cell.colspan));
            }
            out.push_str(&format!(
                " style=\"text-align: {}; vertical-align: {}\">",
                cell.alignment.horizontal.as_css(),
                cell.alignment.vertical.as_css()
            ));
            let content = grid.content(cell.coord()).unwrap_or_default();
            out.push_str(&sanitize_stored(content));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::grid::MergeRules;
    use crate::types::{CellCoord, SelectionSet};

    #[test]
    fn test_merged_cell_gets_colspan() {
        let mut grid = TableData::new(
            vec!["A".into(), "B & C".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
        );
        let mut selection =
            SelectionSet::from_cells(vec![CellCoord::new(0, 0), CellCoord::new(0, 1)]);
        grid.merge_cells(&mut selection, MergeRules::default()).unwrap();

        let html = table_html(&grid);
        assert!(html.contains("<th>B &amp; C</th>"));
        assert!(html.contains(
            r#"<tr><td colspan="2" style="text-align: left; vertical-align: middle">1</td></tr>"#
        ));
        assert!(!html.contains(">2</td>"));
    }
}
