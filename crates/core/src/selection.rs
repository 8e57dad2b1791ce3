use serde::{Deserialize, Serialize};

/// A single cell position, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// An anchor/end pair of cells. The rectangle they bound (normalized via
/// min/max on each axis) is the active selection; `start == end` is a
/// single-cell selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl SelectionRange {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// Create a single-cell selection.
    pub fn single(row: usize, col: usize) -> Self {
        let coord = CellCoord::new(row, col);
        Self { start: coord, end: coord }
    }

    /// Create a selection from two corners given as raw coordinates.
    pub fn from_corners(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start: CellCoord::new(r1, c1),
            end: CellCoord::new(r2, c2),
        }
    }

    pub fn min_row(&self) -> usize {
        self.start.row.min(self.end.row)
    }

    pub fn max_row(&self) -> usize {
        self.start.row.max(self.end.row)
    }

    pub fn min_col(&self) -> usize {
        self.start.col.min(self.end.col)
    }

    pub fn max_col(&self) -> usize {
        self.start.col.max(self.end.col)
    }

    pub fn height(&self) -> usize {
        self.max_row() - self.min_row() + 1
    }

    pub fn width(&self) -> usize {
        self.max_col() - self.min_col() + 1
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// True if the rectangle spans more than one cell on at least one axis.
    pub fn is_multi_cell(&self) -> bool {
        !self.is_single()
    }

    /// Number of cells in the bounded rectangle.
    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Check if the rectangle contains a cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.min_row() && row <= self.max_row() && col >= self.min_col() && col <= self.max_col()
    }

    /// Iterate over all cells in the rectangle (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (min_row, max_row) = (self.min_row(), self.max_row());
        let (min_col, max_col) = (self.min_col(), self.max_col());
        (min_row..=max_row).flat_map(move |r| (min_col..=max_col).map(move |c| (r, c)))
    }
}

/// Selection movement issued by a caller (arrow keys, tab order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// Row-major tab order: end of row wraps to the start of the next row.
    Next,
    /// Reverse tab order: start of row wraps to the end of the previous row.
    Prev,
}
