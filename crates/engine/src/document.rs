use serde::{Deserialize, Serialize};

use gridmark_core::Alignment;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;

/// Advisory column width in pixels.
pub const DEFAULT_COL_WIDTH: f32 = 128.0;
pub const MIN_COL_WIDTH: f32 = 48.0;

/// One grid row. Merge status travels with the row itself, so structural
/// inserts and deletes can never desynchronize a side-table of merged
/// indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Row {
    /// A normal table row: exactly `cols` cell strings, empty string is blank.
    Cells(Vec<String>),
    /// A merged row: one free-text line (optionally a markdown heading)
    /// spanning the row. Cell contents are authoritative-empty.
    Merged(String),
}

impl Row {
    pub fn blank(cols: usize) -> Self {
        Row::Cells(vec![String::new(); cols])
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Row::Merged(_))
    }

    pub fn merged_text(&self) -> Option<&str> {
        match self {
            Row::Merged(text) => Some(text),
            Row::Cells(_) => None,
        }
    }
}

/// The canonical grid state: row sequence plus per-column metadata.
///
/// Invariants: every `Row::Cells` holds exactly `col_count()` cells, and
/// `column_widths.len() == column_alignments.len() == col_count()`. Row and
/// column counts are derived, never stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub rows: Vec<Row>,
    pub column_widths: Vec<f32>,
    pub column_alignments: Vec<Alignment>,
}

impl Document {
    /// Create a blank grid with default column metadata.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows: (0..rows).map(|_| Row::blank(cols)).collect(),
            column_widths: vec![DEFAULT_COL_WIDTH; cols],
            column_alignments: vec![Alignment::Left; cols],
        }
    }

    /// Build a document from parsed rows and alignments; widths reset to the
    /// default (import path).
    pub fn from_rows(rows: Vec<Row>, column_alignments: Vec<Alignment>) -> Self {
        let cols = column_alignments.len().max(1);
        let mut alignments = column_alignments;
        alignments.resize(cols, Alignment::Left);
        let mut doc = Self {
            rows,
            column_widths: vec![DEFAULT_COL_WIDTH; cols],
            column_alignments: alignments,
        };
        if doc.rows.is_empty() {
            doc.rows.push(Row::blank(cols));
        }
        // Normalize any short/long cell rows to the metadata column count
        for row in &mut doc.rows {
            if let Row::Cells(cells) = row {
                cells.resize(cols, String::new());
            }
        }
        doc
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Cell text at (row, col); empty for merged rows and out-of-range
    /// coordinates.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        match self.rows.get(row) {
            Some(Row::Cells(cells)) => cells.get(col).map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }

    /// Point write. Returns false for merged rows and out-of-range
    /// coordinates.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        if col >= self.col_count() {
            return false;
        }
        match self.rows.get_mut(row) {
            Some(Row::Cells(cells)) => {
                cells[col] = value.into();
                true
            }
            _ => false,
        }
    }

    pub fn is_merged_row(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(Row::is_merged)
    }

    pub fn merged_text(&self, row: usize) -> Option<&str> {
        self.rows.get(row).and_then(Row::merged_text)
    }

    /// Insert a blank row at `index` (clamped to the row count).
    pub fn insert_blank_row(&mut self, index: usize) {
        let index = index.min(self.row_count());
        self.rows.insert(index, Row::blank(self.col_count()));
    }

    /// Insert a blank column at `index` with default metadata.
    pub fn insert_blank_column(&mut self, index: usize) {
        let index = index.min(self.col_count());
        for row in &mut self.rows {
            if let Row::Cells(cells) = row {
                cells.insert(index, String::new());
            }
        }
        self.column_widths.insert(index, DEFAULT_COL_WIDTH);
        self.column_alignments.insert(index, Alignment::Left);
    }

    /// Remove `count` rows starting at `start`. Caller guarantees the span is
    /// in bounds and at least one row remains.
    pub fn remove_rows(&mut self, start: usize, count: usize) {
        self.rows.drain(start..start + count);
    }

    /// Remove `count` columns starting at `start`, keeping metadata in
    /// lockstep. Caller guarantees the span is in bounds and at least one
    /// column remains.
    pub fn remove_columns(&mut self, start: usize, count: usize) {
        for row in &mut self.rows {
            if let Row::Cells(cells) = row {
                cells.drain(start..start + count);
            }
        }
        self.column_widths.drain(start..start + count);
        self.column_alignments.drain(start..start + count);
    }

    /// Insert a copy of row `index` immediately after it.
    pub fn duplicate_row(&mut self, index: usize) {
        let copy = self.rows[index].clone();
        self.rows.insert(index + 1, copy);
    }

    /// Insert a copy of column `index` immediately after it, copying
    /// width and alignment.
    pub fn duplicate_column(&mut self, index: usize) {
        for row in &mut self.rows {
            if let Row::Cells(cells) = row {
                let copy = cells[index].clone();
                cells.insert(index + 1, copy);
            }
        }
        let width = self.column_widths[index];
        self.column_widths.insert(index + 1, width);
        let align = self.column_alignments[index];
        self.column_alignments.insert(index + 1, align);
    }

    /// Append blank rows until the grid has `rows` rows.
    pub fn grow_rows(&mut self, rows: usize) {
        while self.row_count() < rows {
            self.rows.push(Row::blank(self.col_count()));
        }
    }

    /// Append blank columns (with default metadata) until the grid has
    /// `cols` columns.
    pub fn grow_columns(&mut self, cols: usize) {
        while self.col_count() < cols {
            for row in &mut self.rows {
                if let Row::Cells(cells) = row {
                    cells.push(String::new());
                }
            }
            self.column_widths.push(DEFAULT_COL_WIDTH);
            self.column_alignments.push(Alignment::Left);
        }
    }

    /// Shape invariant check, used by tests.
    pub fn is_consistent(&self) -> bool {
        let cols = self.col_count();
        self.row_count() >= 1
            && cols >= 1
            && self.column_alignments.len() == cols
            && self.rows.iter().all(|row| match row {
                Row::Cells(cells) => cells.len() == cols,
                Row::Merged(_) => true,
            })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

/// Heading level of a merged-row text: the count of leading `#` (1-3) up to
/// the first space. Returns None for plain text.
pub fn heading_level(text: &str) -> Option<u8> {
    let hashes = text.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&hashes) && text[hashes..].starts_with(' ') {
        Some(hashes as u8)
    } else {
        None
    }
}

/// Strip a leading `#{1,6}\s*` heading prefix from merged-row text.
pub fn strip_heading(text: &str) -> &str {
    let hashes = text.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        text[hashes..].trim_start()
    } else {
        text
    }
}

/// Split merged-row text into (heading level, body) for display.
pub fn split_heading(text: &str) -> (Option<u8>, &str) {
    match heading_level(text) {
        Some(level) => (Some(level), text[level as usize..].trim_start()),
        None => (None, text),
    }
}
