// TSV clipboard interchange and CSV/TSV conversion
//
// Copy/cut serialize the selection rectangle as rows joined by '\n' and
// cells by '\t'; paste splits on the same delimiters. This is deliberately
// distinct from the markdown export format: spreadsheet applications
// exchange rectangles as TSV.

use gridmark_core::{Alignment, SelectionRange};
use gridmark_engine::document::{Document, Row};

/// Serialize the selection rectangle as TSV. Merged rows contribute their
/// blank cells; merged text is not leaked into the clipboard.
pub fn selection_to_tsv(doc: &Document, range: &SelectionRange) -> String {
    let max_row = range.max_row().min(doc.row_count() - 1);
    let max_col = range.max_col().min(doc.col_count() - 1);
    if range.min_row() > max_row || range.min_col() > max_col {
        return String::new();
    }

    (range.min_row()..=max_row)
        .map(|r| {
            (range.min_col()..=max_col)
                .map(|c| doc.cell(r, c))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split clipboard text into a 2D block for pasting: one trailing newline is
/// stripped, rows split on `\r?\n`, cells on `\t`.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix('\n')
        .map(|t| t.strip_suffix('\r').unwrap_or(t))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .map(|line| {
            line.trim_end_matches('\r')
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Export the whole document as delimited text (CSV/TSV). Merged rows export
/// as all-blank cell rows.
pub fn to_delimited(doc: &Document, delimiter: u8) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    let blanks = vec![""; doc.col_count()];
    for row in &doc.rows {
        match row {
            Row::Cells(cells) => writer.write_record(cells).map_err(|e| e.to_string())?,
            Row::Merged(_) => writer.write_record(&blanks).map_err(|e| e.to_string())?,
        }
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

/// Parse delimited text (CSV/TSV) into a document. Ragged rows are accepted
/// and right-padded to the widest row.
pub fn from_delimited(content: &str, delimiter: u8) -> Result<Document, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut max_cols = 1;
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        max_cols = max_cols.max(cells.len());
        rows.push(cells);
    }

    let rows = rows.into_iter().map(Row::Cells).collect();
    Ok(Document::from_rows(rows, vec![Alignment::Left; max_cols]))
}
