//! JSON export/import of the full grid document, including merged rows and
//! column alignments. Advisory column widths are display state and are not
//! part of the interchange format.

use serde::{Deserialize, Serialize};

use gridmark_core::Alignment;
use gridmark_engine::document::{Document, Row};

#[derive(Debug, Serialize, Deserialize)]
struct JsonTable {
    cols: usize,
    column_alignments: Vec<Alignment>,
    rows: Vec<Row>,
}

pub fn to_json(doc: &Document) -> Result<String, String> {
    let table = JsonTable {
        cols: doc.col_count(),
        column_alignments: doc.column_alignments.clone(),
        rows: doc.rows.clone(),
    };
    serde_json::to_string_pretty(&table).map_err(|e| e.to_string())
}

pub fn from_json(content: &str) -> Result<Document, String> {
    let table: JsonTable =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON table: {e}"))?;

    // A cell row wider than the declared count widens the grid rather than
    // losing cells
    let widest = table
        .rows
        .iter()
        .map(|row| match row {
            Row::Cells(cells) => cells.len(),
            Row::Merged(_) => 0,
        })
        .max()
        .unwrap_or(0);

    let cols = table.cols.max(table.column_alignments.len()).max(widest).max(1);
    let mut alignments = table.column_alignments;
    alignments.resize(cols, Alignment::Left);
    Ok(Document::from_rows(table.rows, alignments))
}
