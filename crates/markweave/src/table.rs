//! Table accumulation and column layout.
//!
//! Cells arrive pre-rendered and already escaped; row 0 is the header.
//! Column widths are measured in display columns, not bytes, so CJK and
//! zero-width content align correctly in monospaced output.

use std::io::{self, Write};

use markweave_width::str_width;

use crate::backend::write_repeat;

/// Accumulated table rows of finished cell content. Row 0 holds the header.
#[derive(Clone, Debug, Default)]
pub struct TableGrid {
    rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// No rows accumulated (the writer is not in table mode).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// At least one data row beyond the header. A header-only table renders
    /// nothing.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.rows.len() > 1
    }

    /// Header cells. Empty slice when nothing has been accumulated.
    #[must_use]
    pub fn header(&self) -> &[String] {
        self.rows.first().map_or(&[], Vec::as_slice)
    }

    /// Data rows (everything after the header).
    #[must_use]
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.is_empty() { &[] } else { &self.rows[1..] }
    }

    pub(crate) fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }

    /// Measure a row's cells, growing `col_widths` to the running per-column
    /// maximum. Returns the widths of this row's cells.
    #[must_use]
    pub fn measure_cells(cells: &[String], col_widths: &mut Vec<usize>) -> Vec<usize> {
        let mut row_widths = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let w = str_width(cell);
            row_widths.push(w);
            if i < col_widths.len() {
                if w > col_widths[i] {
                    col_widths[i] = w;
                }
            } else {
                col_widths.push(w);
            }
        }
        row_widths
    }

    /// Per-column widths over all accumulated rows.
    #[must_use]
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths = Vec::new();
        for row in &self.rows {
            let _ = Self::measure_cells(row, &mut widths);
        }
        widths
    }
}

/// Separator fragments framing and joining a row's cells.
#[derive(Clone, Copy, Debug)]
pub struct TableDecor<'a> {
    /// Written before the first cell.
    pub left: &'a str,
    /// Written between cells.
    pub sep: &'a str,
    /// Written after the last cell.
    pub right: &'a str,
}

/// Print one row, padding every cell except the last up to its column width.
/// Columns beyond `col_widths` are not padded.
pub fn print_row<W: Write>(
    out: &mut W,
    cells: &[String],
    decor: TableDecor<'_>,
    col_widths: &[usize],
) -> io::Result<()> {
    out.write_all(decor.left.as_bytes())?;
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.write_all(decor.sep.as_bytes())?;
        }
        let adv = str_width(cell);
        let col = col_widths.get(i).copied().unwrap_or(0).max(adv);
        out.write_all(cell.as_bytes())?;
        // the last column is left unpadded to avoid trailing whitespace
        if col > adv && i + 1 < cells.len() {
            write_repeat(out, col - adv, " ")?;
        }
    }
    out.write_all(decor.right.as_bytes())
}

/// Print a rule line: `fill` repeated to each column's width, joined by the
/// decor separators.
pub fn print_rule<W: Write>(
    out: &mut W,
    fill: &str,
    decor: TableDecor<'_>,
    col_widths: &[usize],
) -> io::Result<()> {
    out.write_all(decor.left.as_bytes())?;
    for (i, w) in col_widths.iter().enumerate() {
        if i > 0 {
            out.write_all(decor.sep.as_bytes())?;
        }
        write_repeat(out, *w, fill)?;
    }
    out.write_all(decor.right.as_bytes())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PLAIN: TableDecor<'_> = TableDecor {
        left: "",
        sep: " ",
        right: "",
    };

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn test_column_width_is_max_display_width() {
        let mut grid = TableGrid::default();
        grid.push_row(row(&["th1", "th2"]));
        grid.push_row(row(&["c1", "longer"]));
        assert_eq!(grid.column_widths(), vec![3, 6]);
    }

    #[test]
    fn test_wide_glyphs_count_double() {
        let mut grid = TableGrid::default();
        grid.push_row(row(&["常用"]));
        grid.push_row(row(&["ab"]));
        assert_eq!(grid.column_widths(), vec![4]);
    }

    #[test]
    fn test_print_row_pads_interior_not_last() {
        let mut out = Vec::new();
        print_row(&mut out, &row(&["c1", "x"]), PLAIN, &[3, 5]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "c1  x");
    }

    #[test]
    fn test_print_row_without_widths_never_pads() {
        let mut out = Vec::new();
        print_row(&mut out, &row(&["a", "b"]), PLAIN, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a b");
    }

    #[test]
    fn test_print_rule() {
        let mut out = Vec::new();
        let decor = TableDecor {
            left: "",
            sep: "-|-",
            right: "",
        };
        print_rule(&mut out, "-", decor, &[2, 5]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "---|------");
    }

    #[test]
    fn test_header_only_grid_has_no_data() {
        let mut grid = TableGrid::default();
        grid.push_row(row(&["h1", "h2"]));
        assert!(!grid.has_data());
        assert!(!grid.is_empty());
    }
}
