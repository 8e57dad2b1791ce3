// Markdown pipe-table codec
//
// Two pure functions over the grid document. `to_markdown` and
// `parse_markdown` are inverses for the structured subset: merged-row text,
// column alignments, and non-blank cell contents round-trip; whitespace
// padding and blank-line runs do not.

use regex::Regex;

use gridmark_core::{Alignment, SelectionRange};
use gridmark_engine::document::{Document, Row};

/// Serialize the document (optionally restricted to a multi-cell selection)
/// to markdown text.
///
/// Walks rows top to bottom tracking whether a table block is open: a merged
/// row closes any open block and is emitted as its raw text between blank
/// lines; the first table row after a break becomes a new table's header and
/// emits both a header line and an alignment separator.
pub fn to_markdown(doc: &Document, selection: Option<SelectionRange>) -> String {
    if let Some(sel) = selection {
        if sel.is_multi_cell() {
            if let Some(sub) = project_selection(doc, sel) {
                return to_markdown(&sub, None);
            }
        }
    }

    let cols = doc.col_count();

    // Display width per column: the longest escaped cell across table rows,
    // floor 3. Merged rows do not contribute.
    let mut widths = vec![3usize; cols];
    for row in &doc.rows {
        if let Row::Cells(cells) = row {
            for (c, cell) in cells.iter().enumerate() {
                widths[c] = widths[c].max(escape_cell(cell).chars().count());
            }
        }
    }

    let mut md = String::new();
    let mut table_open = false;

    for row in &doc.rows {
        match row {
            Row::Merged(text) => {
                table_open = false;
                if !md.is_empty() && !md.ends_with("\n\n") {
                    md.push('\n');
                }
                md.push_str(text);
                md.push_str("\n\n");
            }
            Row::Cells(cells) => {
                if !table_open {
                    if !md.is_empty() && !md.ends_with("\n\n") {
                        md.push('\n');
                    }
                    push_cells_line(&mut md, cells, &widths);
                    push_separator_line(&mut md, &doc.column_alignments, &widths);
                    table_open = true;
                } else {
                    push_cells_line(&mut md, cells, &widths);
                }
            }
        }
    }

    md
}

/// Parse markdown text into a document. Total: every input produces a valid
/// grid (empty input is a 1x1 blank grid), and unrecognized constructs
/// degrade to merged plain-text rows.
pub fn parse_markdown(text: &str) -> Document {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return Document::new(1, 1);
    }

    // A separator row carries alignment only and contributes no grid row
    let separator_re = Regex::new(r"^[\s|:\-]+$").unwrap();
    let is_separator = |line: &str| separator_re.is_match(line);
    let is_table_row =
        |line: &str| line.starts_with('|') || (line.contains('|') && !line.starts_with('#'));

    // First pass: the widest table row fixes the column count for the parse
    let mut max_cols = 1;
    for line in &lines {
        if is_table_row(line) && !is_separator(line) {
            max_cols = max_cols.max(split_table_row(line).len());
        }
    }

    let mut rows: Vec<Row> = Vec::new();
    let mut alignments = vec![Alignment::Left; max_cols];

    for line in &lines {
        if is_separator(line) {
            for (idx, cell) in strip_outer_pipes(line).split('|').enumerate() {
                if idx < max_cols {
                    alignments[idx] = Alignment::from_separator_cell(cell);
                }
            }
        } else if is_table_row(line) {
            let mut cells = split_table_row(line);
            cells.resize(max_cols, String::new());
            rows.push(Row::Cells(cells));
        } else {
            // Plain text or heading: a merged row, text kept verbatim
            rows.push(Row::Merged((*line).to_string()));
        }
    }

    Document::from_rows(rows, alignments)
}

/// Project the document down to the selected sub-rectangle. Merged rows keep
/// their merged status; their index is remapped implicitly by the row slice.
fn project_selection(doc: &Document, sel: SelectionRange) -> Option<Document> {
    let r1 = sel.max_row().min(doc.row_count() - 1);
    let c1 = sel.max_col().min(doc.col_count() - 1);
    if sel.min_row() > r1 || sel.min_col() > c1 {
        return None;
    }
    let (r0, c0) = (sel.min_row(), sel.min_col());

    let rows = (r0..=r1)
        .map(|r| match &doc.rows[r] {
            Row::Merged(text) => Row::Merged(text.clone()),
            Row::Cells(cells) => Row::Cells(cells[c0..=c1].to_vec()),
        })
        .collect();

    Some(Document {
        rows,
        column_widths: doc.column_widths[c0..=c1].to_vec(),
        column_alignments: doc.column_alignments[c0..=c1].to_vec(),
    })
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}

fn push_cells_line(md: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| pad(&escape_cell(cell), w))
        .collect();
    md.push_str("| ");
    md.push_str(&line.join(" | "));
    md.push_str(" |\n");
}

fn push_separator_line(md: &mut String, alignments: &[Alignment], widths: &[usize]) {
    let line: Vec<String> = alignments
        .iter()
        .zip(widths)
        .map(|(align, &w)| align.separator_cell(w))
        .collect();
    md.push('|');
    md.push_str(&line.join("|"));
    md.push_str("|\n");
}

fn strip_outer_pipes(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    line.strip_suffix('|').unwrap_or(line)
}

/// Split a table row on unescaped pipes, trimming each cell and un-escaping
/// `\|` back to `|`.
fn split_table_row(line: &str) -> Vec<String> {
    let content = strip_outer_pipes(line);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('\\');
                if let Some(p) = chars.next() {
                    current.push(p);
                }
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells
        .into_iter()
        .map(|cell| cell.trim().replace("\\|", "|"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_from_cells(cells: &[&[&str]]) -> Document {
        let cols = cells.iter().map(|r| r.len()).max().unwrap_or(1);
        let rows = cells
            .iter()
            .map(|r| {
                let mut row: Vec<String> = r.iter().map(|s| s.to_string()).collect();
                row.resize(cols, String::new());
                Row::Cells(row)
            })
            .collect();
        Document::from_rows(rows, vec![Alignment::Left; cols])
    }

    #[test]
    fn serialize_basic_table() {
        let doc = doc_from_cells(&[&["a", "b"], &["c", "d"]]);
        let md = to_markdown(&doc, None);
        assert_eq!(md, "| a   | b   |\n|-----|-----|\n| c   | d   |\n");
    }

    #[test]
    fn serialize_alignment_markers() {
        let mut doc = doc_from_cells(&[&["a", "b", "c"], &["1", "2", "3"]]);
        doc.column_alignments = vec![Alignment::Left, Alignment::Center, Alignment::Right];
        let md = to_markdown(&doc, None);
        assert_eq!(md, "| a   | b   | c   |\n|-----|:---:|---:|\n| 1   | 2   | 3   |\n");
    }

    #[test]
    fn serialize_merged_row_splits_table_blocks() {
        let mut doc = doc_from_cells(&[&["h1", "h2"], &["x", "y"]]);
        doc.rows.insert(1, Row::Merged("note".to_string()));
        let md = to_markdown(&doc, None);
        assert_eq!(
            md,
            "| h1  | h2  |\n|-----|-----|\n\nnote\n\n| x   | y   |\n|-----|-----|\n"
        );
    }

    #[test]
    fn width_tracks_longest_escaped_cell() {
        let doc = doc_from_cells(&[&["wide cell", "b"]]);
        let md = to_markdown(&doc, None);
        assert!(md.starts_with("| wide cell | b   |\n"));
        assert!(md.contains("|-----------|-----|"));
    }

    #[test]
    fn merged_rows_do_not_affect_widths() {
        let mut doc = doc_from_cells(&[&["a"]]);
        doc.rows.push(Row::Merged("a very long plain text line".to_string()));
        let md = to_markdown(&doc, None);
        assert!(md.starts_with("| a   |\n"));
    }

    #[test]
    fn parse_basic_table_with_alignments() {
        let doc = parse_markdown("| a | b | c |\n|---|:-:|--:|\n| 1 | 2 | 3 |\n");
        assert_eq!(doc.row_count(), 2);
        assert_eq!(doc.col_count(), 3);
        assert_eq!(doc.cell(0, 1), "b");
        assert_eq!(doc.cell(1, 2), "3");
        assert_eq!(
            doc.column_alignments,
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
    }

    #[test]
    fn parse_pads_short_rows_to_widest() {
        let doc = parse_markdown("| a | b | c |\n| d |\n");
        assert_eq!(doc.col_count(), 3);
        assert_eq!(doc.cell(1, 0), "d");
        assert_eq!(doc.cell(1, 1), "");
        assert!(doc.is_consistent());
    }

    #[test]
    fn parse_headings_and_paragraphs_become_merged_rows() {
        let doc = parse_markdown("# Title\n\n| a | b |\n|---|---|\nsome prose\n");
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.merged_text(0), Some("# Title"));
        assert_eq!(doc.cell(1, 0), "a");
        assert_eq!(doc.merged_text(2), Some("some prose"));
    }

    #[test]
    fn parse_heading_with_pipe_is_still_a_heading() {
        // A '#' line is never a table row, even when it contains a pipe
        let doc = parse_markdown("# a | b\n");
        assert_eq!(doc.merged_text(0), Some("# a | b"));
    }

    #[test]
    fn parse_is_total() {
        assert_eq!(parse_markdown("").row_count(), 1);
        assert_eq!(parse_markdown("").col_count(), 1);
        assert_eq!(parse_markdown("\n \n\t\n").row_count(), 1);

        // Arbitrary junk degrades to merged text lines
        let doc = parse_markdown("\u{0}garbage\nmore :: junk\n");
        assert_eq!(doc.row_count(), 2);
        assert!(doc.is_merged_row(0));
    }

    #[test]
    fn escaped_pipes_round_trip() {
        let doc = doc_from_cells(&[&["a|b", "c"]]);
        let md = to_markdown(&doc, None);
        assert!(md.contains("a\\|b"));
        let back = parse_markdown(&md);
        assert_eq!(back.cell(0, 0), "a|b");
        assert_eq!(back.cell(0, 1), "c");
    }

    #[test]
    fn structured_round_trip() {
        let mut doc = doc_from_cells(&[&["h1", "h2"], &["1", "2"], &["3", "4"]]);
        doc.column_alignments = vec![Alignment::Center, Alignment::Right];
        doc.rows.insert(2, Row::Merged("## section".to_string()));

        let back = parse_markdown(&to_markdown(&doc, None));
        assert_eq!(back.row_count(), doc.row_count());
        assert_eq!(back.col_count(), doc.col_count());
        assert_eq!(back.column_alignments, doc.column_alignments);
        assert_eq!(back.merged_text(2), Some("## section"));
        for r in 0..doc.row_count() {
            for c in 0..doc.col_count() {
                assert_eq!(back.cell(r, c), doc.cell(r, c));
            }
        }
    }

    #[test]
    fn selection_export_projects_sub_grid() {
        let mut doc = doc_from_cells(&[&["a", "b", "c"], &["d", "e", "f"], &["g", "h", "i"]]);
        doc.column_alignments = vec![Alignment::Left, Alignment::Right, Alignment::Center];
        doc.rows[1] = Row::Merged("mid".to_string());

        let sel = SelectionRange::from_corners(0, 1, 2, 2);
        let md = to_markdown(&doc, Some(sel));
        let back = parse_markdown(&md);

        assert_eq!(back.col_count(), 2);
        assert_eq!(back.cell(0, 0), "b");
        assert_eq!(back.merged_text(1), Some("mid"));
        assert_eq!(back.cell(2, 1), "i");
        assert_eq!(back.column_alignments, vec![Alignment::Right, Alignment::Center]);
    }

    #[test]
    fn single_cell_selection_exports_whole_grid() {
        let doc = doc_from_cells(&[&["a", "b"], &["c", "d"]]);
        let whole = to_markdown(&doc, None);
        let single = to_markdown(&doc, Some(SelectionRange::single(0, 0)));
        assert_eq!(whole, single);
    }
}
