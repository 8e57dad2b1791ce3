//! The mutation engine: an explicit object owning the grid document,
//! selection, fill state, and history. All mutation entry points live here.
//!
//! Error model: operations are defensive no-ops. An out-of-range index, a
//! missing selection, a delete that would leave an empty grid, or a
//! merge/unmerge target with no matching row leaves state unchanged and
//! returns false. Callers are expected to check preconditions via the same
//! state, but the engine is safe against being called anyway.

use gridmark_core::{Alignment, CellCoord, Direction, SelectionRange};

use crate::document::{heading_level, strip_heading, Document, Row, MIN_COL_WIDTH};
use crate::history::History;

/// Target of a row/column delete: an explicit index, or the span of the
/// current selection on that axis (the original `-1` sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Index(usize),
    Selection,
}

/// Inline markdown formatting kinds with their wrap marker pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatting {
    Bold,
    Italic,
    Strikethrough,
    Code,
}

impl Formatting {
    pub fn marker(&self) -> &'static str {
        match self {
            Formatting::Bold => "**",
            Formatting::Italic => "_",
            Formatting::Strikethrough => "~~",
            Formatting::Code => "`",
        }
    }
}

impl std::str::FromStr for Formatting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bold" => Ok(Formatting::Bold),
            "italic" => Ok(Formatting::Italic),
            "strikethrough" | "strike" => Ok(Formatting::Strikethrough),
            "code" => Ok(Formatting::Code),
            other => Err(format!("unknown formatting: {other}")),
        }
    }
}

/// Check for an exact `marker + content + marker` wrap.
fn is_wrapped(marker: &str, s: &str) -> bool {
    s.len() >= marker.len() * 2 && s.starts_with(marker) && s.ends_with(marker)
}

/// Strip a wrap marker pair. Caller checks `is_wrapped` first.
fn unwrap_marker<'a>(marker: &str, s: &'a str) -> &'a str {
    &s[marker.len()..s.len() - marker.len()]
}

/// The grid state engine. Mutating operations snapshot the pre-mutation
/// document into history and clear the redo timeline, except the purely
/// advisory column-metadata writes and selection/fill-state operations.
pub struct GridEngine {
    doc: Document,
    selection: Option<SelectionRange>,
    fill_end: Option<CellCoord>,
    history: History,
}

impl GridEngine {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            doc: Document::new(rows, cols),
            selection: None,
            fill_end: None,
            history: History::new(),
        }
    }

    pub fn from_document(doc: Document) -> Self {
        Self {
            doc,
            selection: None,
            fill_end: None,
            history: History::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn snapshot(&mut self) {
        self.history.record(self.doc.clone());
    }

    // -----------------------------------------------------------------------
    // Selection and fill state (not undoable)
    // -----------------------------------------------------------------------

    pub fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.selection = selection;
    }

    pub fn select_cell(&mut self, row: usize, col: usize) {
        self.selection = Some(SelectionRange::single(row, col));
    }

    /// Move the free end of the selection; no-op without a selection.
    pub fn extend_selection(&mut self, row: usize, col: usize) {
        if let Some(sel) = &mut self.selection {
            sel.end = CellCoord::new(row, col);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn fill_end(&self) -> Option<CellCoord> {
        self.fill_end
    }

    /// Transient drag-fill target; never snapshotted.
    pub fn set_fill_end(&mut self, coord: Option<CellCoord>) {
        self.fill_end = coord;
    }

    /// Complete an in-progress fill gesture: tile the selection over the
    /// rectangle spanning it and the drag target.
    pub fn finish_fill(&mut self) -> bool {
        let (Some(sel), Some(end)) = (self.selection, self.fill_end.take()) else {
            return false;
        };
        let target = SelectionRange::from_corners(
            sel.min_row().min(end.row),
            sel.min_col().min(end.col),
            sel.max_row().max(end.row),
            sel.max_col().max(end.col),
        );
        self.fill_range(target)
    }

    pub fn move_selection(&mut self, direction: Direction) {
        let Some(sel) = self.selection else {
            self.selection = Some(SelectionRange::single(0, 0));
            return;
        };

        let rows = self.doc.row_count();
        let cols = self.doc.col_count();
        let start = sel.start;
        let (mut row, mut col) = (start.row, start.col);

        match direction {
            Direction::Up => row = row.saturating_sub(1),
            Direction::Down => row = (row + 1).min(rows - 1),
            Direction::Left => col = col.saturating_sub(1),
            Direction::Right => col = (col + 1).min(cols - 1),
            Direction::Next => {
                if col < cols - 1 {
                    col += 1;
                } else if row < rows - 1 {
                    row += 1;
                    col = 0;
                }
            }
            Direction::Prev => {
                if col > 0 {
                    col -= 1;
                } else if row > 0 {
                    row -= 1;
                    col = cols - 1;
                }
            }
        }

        self.selection = Some(SelectionRange::single(row, col));
    }

    fn clamp_selection(&mut self) {
        let max_row = self.doc.row_count() - 1;
        let max_col = self.doc.col_count() - 1;
        if let Some(sel) = &mut self.selection {
            sel.start.row = sel.start.row.min(max_row);
            sel.start.col = sel.start.col.min(max_col);
            sel.end.row = sel.end.row.min(max_row);
            sel.end.col = sel.end.col.min(max_col);
        }
    }

    // -----------------------------------------------------------------------
    // Document lifecycle
    // -----------------------------------------------------------------------

    /// Replace the grid with a fresh blank one, discarding all history.
    pub fn initialize(&mut self, rows: usize, cols: usize) {
        self.doc = Document::new(rows, cols);
        self.selection = None;
        self.fill_end = None;
        self.history.clear();
    }

    /// Wholesale replace the document (import path). Undoable.
    pub fn set_document(&mut self, doc: Document) {
        self.snapshot();
        self.doc = doc;
        self.selection = None;
    }

    // -----------------------------------------------------------------------
    // Cell and row/column mutations (undoable)
    // -----------------------------------------------------------------------

    /// Point write; no-op for merged rows, out-of-range coordinates, and
    /// unchanged values.
    pub fn set_cell_value(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        let value = value.into();
        if row >= self.doc.row_count()
            || col >= self.doc.col_count()
            || self.doc.is_merged_row(row)
            || self.doc.cell(row, col) == value
        {
            return false;
        }
        self.snapshot();
        self.doc.set_cell(row, col, value)
    }

    /// Insert a blank row at `index` (default: after the selection end, else
    /// at the end).
    pub fn add_row(&mut self, index: Option<usize>) -> bool {
        let insert_idx = index.unwrap_or_else(|| {
            self.selection
                .map(|sel| sel.end.row + 1)
                .unwrap_or(self.doc.row_count())
        });
        if insert_idx > self.doc.row_count() {
            return false;
        }
        self.snapshot();
        self.doc.insert_blank_row(insert_idx);
        true
    }

    /// Insert a blank column at `index` (default: after the selection end,
    /// else at the end).
    pub fn add_column(&mut self, index: Option<usize>) -> bool {
        let insert_idx = index.unwrap_or_else(|| {
            self.selection
                .map(|sel| sel.end.col + 1)
                .unwrap_or(self.doc.col_count())
        });
        if insert_idx > self.doc.col_count() {
            return false;
        }
        self.snapshot();
        self.doc.insert_blank_column(insert_idx);
        true
    }

    /// Delete one row, or the selection's full row span. Refuses to leave the
    /// grid with zero rows. Clears the selection (indices are no longer
    /// trustworthy).
    pub fn delete_row(&mut self, target: DeleteTarget) -> bool {
        let rows = self.doc.row_count();
        let (start, count) = match target {
            DeleteTarget::Index(i) if i < rows => (i, 1),
            DeleteTarget::Index(_) => return false,
            DeleteTarget::Selection => match self.selection {
                Some(sel) if sel.min_row() < rows => {
                    (sel.min_row(), sel.height().min(rows - sel.min_row()))
                }
                _ => return false,
            },
        };
        if count >= rows {
            return false;
        }
        self.snapshot();
        self.doc.remove_rows(start, count);
        self.selection = None;
        true
    }

    /// Delete one column, or the selection's full column span. Refuses to
    /// leave the grid with zero columns. Clears the selection.
    pub fn delete_column(&mut self, target: DeleteTarget) -> bool {
        let cols = self.doc.col_count();
        let (start, count) = match target {
            DeleteTarget::Index(i) if i < cols => (i, 1),
            DeleteTarget::Index(_) => return false,
            DeleteTarget::Selection => match self.selection {
                Some(sel) if sel.min_col() < cols => {
                    (sel.min_col(), sel.width().min(cols - sel.min_col()))
                }
                _ => return false,
            },
        };
        if count >= cols {
            return false;
        }
        self.snapshot();
        self.doc.remove_columns(start, count);
        self.selection = None;
        true
    }

    pub fn duplicate_row(&mut self, index: usize) -> bool {
        if index >= self.doc.row_count() {
            return false;
        }
        self.snapshot();
        self.doc.duplicate_row(index);
        true
    }

    pub fn duplicate_column(&mut self, index: usize) -> bool {
        if index >= self.doc.col_count() {
            return false;
        }
        self.snapshot();
        self.doc.duplicate_column(index);
        true
    }

    // -----------------------------------------------------------------------
    // Column metadata (advisory; not undoable)
    // -----------------------------------------------------------------------

    /// Clamped to the minimum width floor.
    pub fn set_column_width(&mut self, col: usize, px: f32) -> bool {
        if col >= self.doc.col_count() {
            return false;
        }
        self.doc.column_widths[col] = px.max(MIN_COL_WIDTH);
        true
    }

    pub fn set_column_alignment(&mut self, col: usize, align: Alignment) -> bool {
        if col >= self.doc.col_count() {
            return false;
        }
        self.doc.column_alignments[col] = align;
        true
    }

    // -----------------------------------------------------------------------
    // Range operations (undoable)
    // -----------------------------------------------------------------------

    /// Tile the current selection's values over the target rectangle with
    /// modular indexing on both axes. The target may extend in any direction
    /// from the source; cells above or left of it read the pattern at the
    /// wrapped offset. Reads pre-mutation data, so overlapping source and
    /// target rectangles fill correctly. The selection becomes the target
    /// afterward.
    pub fn fill_range(&mut self, target: SelectionRange) -> bool {
        let Some(source) = self.selection else {
            return false;
        };
        if target.max_row() >= self.doc.row_count()
            || target.max_col() >= self.doc.col_count()
            || source.max_row() >= self.doc.row_count()
            || source.max_col() >= self.doc.col_count()
        {
            return false;
        }

        self.snapshot();
        let before = self.doc.clone();
        let (src_row, src_col) = (source.min_row(), source.min_col());
        let (pattern_h, pattern_w) = (source.height(), source.width());

        for (r, c) in target.cells() {
            let off_r = (r as isize - src_row as isize).rem_euclid(pattern_h as isize) as usize;
            let off_c = (c as isize - src_col as isize).rem_euclid(pattern_w as isize) as usize;
            let value = before.cell(src_row + off_r, src_col + off_c).to_string();
            self.doc.set_cell(r, c, value);
        }

        self.selection = Some(target);
        true
    }

    /// Toggle an inline formatting marker across the selection. If every
    /// non-empty cell already carries the marker, all are unwrapped;
    /// otherwise every unwrapped non-empty cell is wrapped (idempotent on a
    /// mixed selection). Empty cells are skipped in both directions and do
    /// not count toward the all-formatted decision.
    pub fn apply_formatting(&mut self, kind: Formatting) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        let marker = kind.marker();

        let non_empty: Vec<(usize, usize)> = sel
            .cells()
            .filter(|&(r, c)| !self.doc.cell(r, c).is_empty())
            .collect();
        if non_empty.is_empty() {
            return false;
        }

        let all_formatted = non_empty
            .iter()
            .all(|&(r, c)| is_wrapped(marker, self.doc.cell(r, c)));

        self.snapshot();
        for (r, c) in non_empty {
            let value = self.doc.cell(r, c);
            let new_value = if all_formatted {
                unwrap_marker(marker, value).to_string()
            } else if is_wrapped(marker, value) {
                continue;
            } else {
                format!("{marker}{value}{marker}")
            };
            self.doc.set_cell(r, c, new_value);
        }
        true
    }

    /// Blank every cell in the selection rectangle; row/column counts and
    /// merged rows are untouched.
    pub fn delete_selection(&mut self) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        let dirty: Vec<(usize, usize)> = sel
            .cells()
            .filter(|&(r, c)| !self.doc.cell(r, c).is_empty())
            .collect();
        if dirty.is_empty() {
            return false;
        }
        self.snapshot();
        for (r, c) in dirty {
            self.doc.set_cell(r, c, String::new());
        }
        true
    }

    /// Overwrite cells starting at the origin, growing the grid by appending
    /// blank rows/columns first when the pasted block overhangs. Shorter
    /// pasted rows leave trailing cells untouched. The selection becomes the
    /// pasted rectangle.
    pub fn paste_data(&mut self, rows2d: &[Vec<String>], start_row: usize, start_col: usize) -> bool {
        let paste_rows = rows2d.len();
        let paste_cols = rows2d.iter().map(Vec::len).max().unwrap_or(0);
        if paste_rows == 0 || paste_cols == 0 {
            return false;
        }

        self.snapshot();
        self.doc.grow_columns(start_col + paste_cols);
        self.doc.grow_rows(start_row + paste_rows);

        for (r, row) in rows2d.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                self.doc.set_cell(start_row + r, start_col + c, value.clone());
            }
        }

        self.selection = Some(SelectionRange::from_corners(
            start_row,
            start_col,
            start_row + paste_rows - 1,
            start_col + paste_cols - 1,
        ));
        true
    }

    // -----------------------------------------------------------------------
    // Merged rows (undoable)
    // -----------------------------------------------------------------------

    /// Convert every table row in the (multi-cell) selection into a merged
    /// free-text row: the trimmed non-blank cells of the selected column
    /// range, space-joined in column order. Rows that are already merged are
    /// left alone. Clears the selection.
    pub fn merge_cells(&mut self) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        if sel.is_single() {
            return false;
        }
        // A selection entirely outside the grid must not blank anything
        if sel.min_row() >= self.doc.row_count() || sel.min_col() >= self.doc.col_count() {
            return false;
        }

        let rows_to_merge: Vec<usize> = (sel.min_row()..=sel.max_row().min(self.doc.row_count() - 1))
            .filter(|&r| !self.doc.is_merged_row(r))
            .collect();
        if rows_to_merge.is_empty() {
            return false;
        }

        self.snapshot();
        for r in rows_to_merge {
            let parts: Vec<String> = (sel.min_col()..=sel.max_col().min(self.doc.col_count() - 1))
                .map(|c| self.doc.cell(r, c).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.doc.rows[r] = Row::Merged(parts.join(" "));
        }
        self.selection = None;
        true
    }

    /// Restore a merged row to table cells: the merged text goes verbatim
    /// into column 0 (any heading prefix stays literally in the text).
    pub fn unmerge_cells(&mut self, row: usize) -> bool {
        let Some(text) = self.doc.merged_text(row).map(str::to_string) else {
            return false;
        };
        self.snapshot();
        let mut cells = vec![String::new(); self.doc.col_count()];
        cells[0] = text;
        self.doc.rows[row] = Row::Cells(cells);
        true
    }

    pub fn is_merged_row(&self, row: usize) -> bool {
        self.doc.is_merged_row(row)
    }

    /// Set a merged row's heading level (1-3), replacing any existing prefix.
    pub fn apply_merged_row_header(&mut self, row: usize, level: u8) -> bool {
        if !(1..=3).contains(&level) {
            return false;
        }
        let Some(text) = self.doc.merged_text(row) else {
            return false;
        };
        let new_text = format!("{} {}", "#".repeat(level as usize), strip_heading(text));
        if new_text == text {
            return false;
        }
        self.snapshot();
        self.doc.rows[row] = Row::Merged(new_text);
        true
    }

    /// Strip any heading prefix from a merged row.
    pub fn remove_merged_row_header(&mut self, row: usize) -> bool {
        let Some(text) = self.doc.merged_text(row) else {
            return false;
        };
        let stripped = strip_heading(text).to_string();
        if stripped == text {
            return false;
        }
        self.snapshot();
        self.doc.rows[row] = Row::Merged(stripped);
        true
    }

    /// Applying the level a merged row already has removes the heading
    /// instead (toolbar toggle semantics).
    pub fn toggle_merged_row_header(&mut self, row: usize, level: u8) -> bool {
        match self.doc.merged_text(row) {
            Some(text) if heading_level(text) == Some(level) => self.remove_merged_row_header(row),
            Some(_) => self.apply_merged_row_header(row, level),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Undo / Redo
    // -----------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.doc.clone()) {
            Some(previous) => {
                self.doc = previous;
                self.clamp_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.doc.clone()) {
            Some(next) => {
                self.doc = next;
                self.clamp_selection();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DEFAULT_COL_WIDTH;

    fn engine_2x2(values: [[&str; 2]; 2]) -> GridEngine {
        let mut engine = GridEngine::new(2, 2);
        for (r, row) in values.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                engine.doc.set_cell(r, c, *v);
            }
        }
        engine
    }

    #[test]
    fn set_cell_value_pushes_history() {
        let mut engine = GridEngine::new(2, 2);
        assert!(engine.set_cell_value(0, 0, "x"));
        assert_eq!(engine.document().cell(0, 0), "x");
        assert!(engine.can_undo());

        // Unchanged value is a no-op
        assert!(!engine.set_cell_value(0, 0, "x"));
        // Out of range is a no-op
        assert!(!engine.set_cell_value(5, 0, "y"));
    }

    #[test]
    fn undo_redo_with_divergence() {
        let mut engine = GridEngine::new(2, 2);
        engine.set_cell_value(0, 0, "a");

        assert!(engine.undo());
        assert_eq!(engine.document().cell(0, 0), "");

        assert!(engine.redo());
        assert_eq!(engine.document().cell(0, 0), "a");

        // A new mutation between undo and redo discards the redo entry
        engine.undo();
        engine.set_cell_value(0, 1, "b");
        assert!(!engine.redo());
        assert_eq!(engine.document().cell(0, 0), "");
        assert_eq!(engine.document().cell(0, 1), "b");
    }

    #[test]
    fn delete_floor_is_a_no_op() {
        let mut engine = GridEngine::new(1, 1);
        assert!(!engine.delete_row(DeleteTarget::Index(0)));
        assert!(!engine.delete_column(DeleteTarget::Index(0)));
        assert!(!engine.can_undo());
    }

    #[test]
    fn delete_selection_span_refuses_to_empty_grid() {
        let mut engine = GridEngine::new(3, 2);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 2, 0)));
        assert!(!engine.delete_row(DeleteTarget::Selection));
        assert_eq!(engine.document().row_count(), 3);

        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 1, 0)));
        assert!(engine.delete_row(DeleteTarget::Selection));
        assert_eq!(engine.document().row_count(), 1);
        assert!(engine.selection().is_none());
    }

    #[test]
    fn delete_column_span_from_selection() {
        let mut engine = GridEngine::new(2, 4);
        engine.set_cell_value(0, 3, "keep");
        engine.set_selection(Some(SelectionRange::from_corners(0, 1, 1, 2)));
        assert!(engine.delete_column(DeleteTarget::Selection));
        assert_eq!(engine.document().col_count(), 2);
        assert_eq!(engine.document().cell(0, 1), "keep");
        assert!(engine.selection().is_none());
    }

    #[test]
    fn add_row_defaults_to_after_selection() {
        let mut engine = GridEngine::new(3, 2);
        engine.set_cell_value(2, 0, "last");
        engine.select_cell(0, 0);
        assert!(engine.add_row(None));
        assert_eq!(engine.document().row_count(), 4);
        assert_eq!(engine.document().cell(3, 0), "last");
        assert_eq!(engine.document().cell(1, 0), "");
    }

    #[test]
    fn duplicate_column_copies_metadata() {
        let mut engine = GridEngine::new(2, 2);
        engine.set_cell_value(0, 1, "v");
        engine.set_column_width(1, 300.0);
        engine.set_column_alignment(1, Alignment::Center);

        assert!(engine.duplicate_column(1));
        let doc = engine.document();
        assert_eq!(doc.col_count(), 3);
        assert_eq!(doc.cell(0, 2), "v");
        assert_eq!(doc.column_widths[2], 300.0);
        assert_eq!(doc.column_alignments[2], Alignment::Center);
    }

    #[test]
    fn column_width_clamps_to_floor() {
        let mut engine = GridEngine::new(1, 1);
        assert!(engine.set_column_width(0, 10.0));
        assert_eq!(engine.document().column_widths[0], MIN_COL_WIDTH);
        // Advisory writes do not participate in undo
        assert!(!engine.can_undo());
    }

    #[test]
    fn fill_tiles_pattern_modularly() {
        let mut engine = GridEngine::new(1, 4);
        engine.set_cell_value(0, 0, "1");
        engine.set_cell_value(0, 1, "2");
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));

        assert!(engine.fill_range(SelectionRange::from_corners(0, 0, 0, 3)));
        let doc = engine.document();
        let got: Vec<&str> = (0..4).map(|c| doc.cell(0, c)).collect();
        assert_eq!(got, vec!["1", "2", "1", "2"]);
        assert_eq!(
            engine.selection(),
            Some(SelectionRange::from_corners(0, 0, 0, 3))
        );
    }

    #[test]
    fn fill_reads_pre_mutation_data_under_overlap() {
        let mut engine = GridEngine::new(3, 1);
        engine.set_cell_value(0, 0, "a");
        engine.set_cell_value(1, 0, "b");
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 1, 0)));

        // Target overlaps the source rows
        assert!(engine.fill_range(SelectionRange::from_corners(0, 0, 2, 0)));
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "a");
        assert_eq!(doc.cell(1, 0), "b");
        assert_eq!(doc.cell(2, 0), "a");
    }

    #[test]
    fn fill_tiles_upward_with_wrapped_offsets() {
        let mut engine = GridEngine::new(4, 1);
        engine.set_cell_value(2, 0, "a");
        engine.set_cell_value(3, 0, "b");
        engine.set_selection(Some(SelectionRange::from_corners(2, 0, 3, 0)));

        assert!(engine.fill_range(SelectionRange::from_corners(0, 0, 3, 0)));
        let doc = engine.document();
        let got: Vec<&str> = (0..4).map(|r| doc.cell(r, 0)).collect();
        assert_eq!(got, vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn finish_fill_dragged_above_selection() {
        let mut engine = GridEngine::new(3, 1);
        engine.set_cell_value(2, 0, "x");
        engine.select_cell(2, 0);
        engine.set_fill_end(Some(CellCoord::new(0, 0)));

        assert!(engine.finish_fill());
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "x");
        assert_eq!(doc.cell(1, 0), "x");
        assert_eq!(doc.cell(2, 0), "x");
    }

    #[test]
    fn finish_fill_spans_selection_and_drag_target() {
        let mut engine = GridEngine::new(4, 1);
        engine.set_cell_value(0, 0, "x");
        engine.set_selection(Some(SelectionRange::single(0, 0)));
        engine.set_fill_end(Some(CellCoord::new(3, 0)));

        assert!(engine.finish_fill());
        assert_eq!(engine.document().cell(3, 0), "x");
        assert!(engine.fill_end().is_none());
    }

    #[test]
    fn formatting_toggle_is_an_involution() {
        let mut engine = GridEngine::new(1, 1);
        engine.set_cell_value(0, 0, "x");
        engine.select_cell(0, 0);

        assert!(engine.apply_formatting(Formatting::Bold));
        assert_eq!(engine.document().cell(0, 0), "**x**");

        assert!(engine.apply_formatting(Formatting::Bold));
        assert_eq!(engine.document().cell(0, 0), "x");
    }

    #[test]
    fn formatting_mixed_selection_wraps_only_unwrapped() {
        let mut engine = engine_2x2([["**a**", "b"], ["", "c"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 1, 1)));

        assert!(engine.apply_formatting(Formatting::Bold));
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "**a**"); // already wrapped, left alone
        assert_eq!(doc.cell(0, 1), "**b**");
        assert_eq!(doc.cell(1, 0), ""); // empty skipped
        assert_eq!(doc.cell(1, 1), "**c**");

        // Now all non-empty cells are wrapped: second pass unwraps all
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 1, 1)));
        assert!(engine.apply_formatting(Formatting::Bold));
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "a");
        assert_eq!(doc.cell(0, 1), "b");
        assert_eq!(doc.cell(1, 1), "c");
    }

    #[test]
    fn delete_selection_blanks_rectangle() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));
        assert!(engine.delete_selection());
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "");
        assert_eq!(doc.cell(0, 1), "");
        assert_eq!(doc.cell(1, 0), "c");

        // Second delete over already-blank cells is a no-op
        assert!(!engine.delete_selection());
    }

    #[test]
    fn paste_grows_grid_from_bottom_right_corner() {
        let mut engine = GridEngine::new(2, 2);
        let block: Vec<Vec<String>> = (0..3)
            .map(|r| (0..3).map(|c| format!("p{r}{c}")).collect())
            .collect();

        assert!(engine.paste_data(&block, 1, 1));
        let doc = engine.document();
        assert_eq!(doc.row_count(), 4);
        assert_eq!(doc.col_count(), 4);
        assert_eq!(doc.cell(1, 1), "p00");
        assert_eq!(doc.cell(3, 3), "p22");
        assert_eq!(doc.column_widths.len(), 4);
        assert_eq!(doc.column_widths[3], DEFAULT_COL_WIDTH);
        assert_eq!(
            engine.selection(),
            Some(SelectionRange::from_corners(1, 1, 3, 3))
        );
        assert!(doc.is_consistent());
    }

    #[test]
    fn paste_short_rows_leave_trailing_cells() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        let block = vec![vec!["x".to_string()], vec!["y".to_string(), "z".to_string()]];
        assert!(engine.paste_data(&block, 0, 0));
        let doc = engine.document();
        assert_eq!(doc.cell(0, 0), "x");
        assert_eq!(doc.cell(0, 1), "b"); // untouched
        assert_eq!(doc.cell(1, 0), "y");
        assert_eq!(doc.cell(1, 1), "z");
    }

    #[test]
    fn merge_heading_round_trip() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 1, 1)));

        assert!(engine.merge_cells());
        assert_eq!(engine.document().merged_text(0), Some("a b"));
        assert_eq!(engine.document().merged_text(1), Some("c d"));
        assert!(engine.selection().is_none());

        assert!(engine.apply_merged_row_header(0, 2));
        assert_eq!(engine.document().merged_text(0), Some("## a b"));

        assert!(engine.remove_merged_row_header(0));
        assert_eq!(engine.document().merged_text(0), Some("a b"));
    }

    #[test]
    fn merge_blanks_whole_row_and_skips_blank_cells() {
        let mut engine = GridEngine::new(1, 3);
        // Wide grid: select only two columns, third holds data that merge drops
        engine.set_cell_value(0, 0, " a ");
        engine.set_cell_value(0, 2, "z");
        engine.add_row(Some(1));
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));

        assert!(engine.merge_cells());
        // Trimmed, blanks skipped, unselected columns not leaked
        assert_eq!(engine.document().merged_text(0), Some("a"));
    }

    #[test]
    fn merge_outside_grid_leaves_rows_untouched() {
        let mut engine = engine_2x2([["keep", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 23, 0, 25)));

        assert!(!engine.merge_cells());
        assert_eq!(engine.document().cell(0, 0), "keep");
        assert!(!engine.document().is_merged_row(0));
        assert!(!engine.can_undo());

        engine.set_selection(Some(SelectionRange::from_corners(9, 0, 9, 1)));
        assert!(!engine.merge_cells());
        assert!(!engine.can_undo());
    }

    #[test]
    fn merge_requires_multi_cell_selection() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.select_cell(0, 0);
        assert!(!engine.merge_cells());
        assert_eq!(engine.document().cell(0, 0), "a");
    }

    #[test]
    fn unmerge_restores_text_to_first_column() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));
        engine.merge_cells();
        engine.apply_merged_row_header(0, 1);

        assert!(engine.unmerge_cells(0));
        // Heading prefix stays literally in the text
        assert_eq!(engine.document().cell(0, 0), "# a b");
        assert_eq!(engine.document().cell(0, 1), "");

        assert!(!engine.unmerge_cells(0)); // no longer merged
        assert!(!engine.unmerge_cells(9)); // out of range
    }

    #[test]
    fn heading_toggle_semantics() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));
        engine.merge_cells();

        assert!(engine.toggle_merged_row_header(0, 2));
        assert_eq!(engine.document().merged_text(0), Some("## a b"));

        // Same level toggles the heading off
        assert!(engine.toggle_merged_row_header(0, 2));
        assert_eq!(engine.document().merged_text(0), Some("a b"));

        // Different level replaces
        engine.toggle_merged_row_header(0, 1);
        assert!(engine.toggle_merged_row_header(0, 3));
        assert_eq!(engine.document().merged_text(0), Some("### a b"));
    }

    #[test]
    fn move_selection_clamps_and_wraps() {
        let mut engine = GridEngine::new(2, 2);
        engine.move_selection(Direction::Down);
        assert_eq!(engine.selection(), Some(SelectionRange::single(0, 0)));

        engine.move_selection(Direction::Up);
        assert_eq!(engine.selection(), Some(SelectionRange::single(0, 0)));

        engine.move_selection(Direction::Next);
        engine.move_selection(Direction::Next);
        assert_eq!(engine.selection(), Some(SelectionRange::single(1, 0)));

        engine.move_selection(Direction::Prev);
        assert_eq!(engine.selection(), Some(SelectionRange::single(0, 1)));

        engine.move_selection(Direction::Right);
        engine.move_selection(Direction::Right);
        assert_eq!(engine.selection(), Some(SelectionRange::single(0, 1)));
    }

    #[test]
    fn undo_restores_shape_and_metadata_together() {
        let mut engine = GridEngine::new(2, 2);
        engine.set_column_alignment(1, Alignment::Right);
        engine.select_cell(1, 1);
        engine.delete_column(DeleteTarget::Index(1));
        assert_eq!(engine.document().col_count(), 1);

        assert!(engine.undo());
        let doc = engine.document();
        assert_eq!(doc.col_count(), 2);
        assert_eq!(doc.column_alignments[1], Alignment::Right);
        assert!(doc.is_consistent());
    }

    #[test]
    fn initialize_clears_history() {
        let mut engine = GridEngine::new(2, 2);
        engine.set_cell_value(0, 0, "x");
        engine.initialize(3, 3);
        assert!(!engine.can_undo());
        assert_eq!(engine.document().row_count(), 3);
        assert!(engine.selection().is_none());
    }

    #[test]
    fn set_document_is_undoable() {
        let mut engine = GridEngine::new(2, 2);
        engine.set_cell_value(0, 0, "before");

        let mut imported = Document::new(1, 1);
        imported.set_cell(0, 0, "after");
        engine.set_document(imported);
        assert_eq!(engine.document().cell(0, 0), "after");

        assert!(engine.undo());
        assert_eq!(engine.document().cell(0, 0), "before");
    }

    #[test]
    fn document_serde_round_trip() {
        let mut engine = engine_2x2([["a", "b"], ["c", "d"]]);
        engine.set_selection(Some(SelectionRange::from_corners(0, 0, 0, 1)));
        engine.merge_cells();

        let json = serde_json::to_string(engine.document()).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, engine.document());
    }
}
