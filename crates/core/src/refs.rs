//! A1-style cell and range references used by the CLI surface.

use crate::selection::SelectionRange;

/// Parse a cell reference like "A1" or "AA100" into (row, col), zero-based.
pub fn parse_cell_ref(s: &str) -> Option<(usize, usize)> {
    let s = s.to_uppercase();
    let mut col_str = String::new();
    let mut row_str = String::new();

    for c in s.chars() {
        if c.is_ascii_alphabetic() && row_str.is_empty() {
            col_str.push(c);
        } else if c.is_ascii_digit() {
            row_str.push(c);
        } else {
            return None;
        }
    }

    if col_str.is_empty() || row_str.is_empty() {
        return None;
    }

    let col = parse_column_label(&col_str)?;

    // Rows are 1-indexed in input, 0-indexed internally
    let row: usize = row_str.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// Parse a column label (A=0, B=1, ..., Z=25, AA=26, ...).
pub fn parse_column_label(s: &str) -> Option<usize> {
    if s.is_empty() {
        return None;
    }
    let mut col: usize = 0;
    for c in s.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(col - 1)
}

/// Parse a cell or range reference ("A1" or "A1:B3") into a selection.
pub fn parse_range_ref(s: &str) -> Option<SelectionRange> {
    if let Some((start, end)) = s.split_once(':') {
        let (sr, sc) = parse_cell_ref(start)?;
        let (er, ec) = parse_cell_ref(end)?;
        Some(SelectionRange::from_corners(sr, sc, er, ec))
    } else {
        let (r, c) = parse_cell_ref(s)?;
        Some(SelectionRange::single(r, c))
    }
}

/// Column index to base-26 label (0 -> "A", 26 -> "AA").
pub fn column_label(col: usize) -> String {
    let mut label = String::new();
    let mut c = col;
    loop {
        label.insert(0, (b'A' + (c % 26) as u8) as char);
        if c < 26 {
            break;
        }
        c = c / 26 - 1;
    }
    label
}

/// Format a cell reference from (row, col).
pub fn format_cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_label(col), row + 1)
}
