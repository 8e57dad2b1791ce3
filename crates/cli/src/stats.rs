//! Numeric summary over a cell range: count, sum, average.
//!
//! Cells are treated as numeric when they start with a number after leading
//! whitespace; trailing units are ignored ("42 kg" counts as 42). Merged rows
//! have no cell values and never contribute.

use serde::Serialize;

use gridmark_core::SelectionRange;
use gridmark_engine::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeStats {
    /// Number of numeric cells in the range.
    pub count: usize,
    /// Sum of numeric cells, rounded to 2 decimals.
    pub sum: f64,
    /// Average of numeric cells, rounded to 2 decimals. Zero when count is 0.
    pub avg: f64,
}

/// Parse the leading number of a cell, if any. Accepts an optional sign,
/// decimal point, and exponent; stops at the first non-numeric character.
pub fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let mut saw_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        saw_digit = true;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            saw_digit = true;
        }
    }
    if !saw_digit {
        return None;
    }
    let mut end = i;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }
    s[..end].parse().ok()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute stats over `range`, or the whole document when `range` is None.
/// Out-of-bounds parts of the range are ignored.
pub fn compute(doc: &Document, range: Option<&SelectionRange>) -> RangeStats {
    let (min_row, max_row, min_col, max_col) = match range {
        Some(r) => (
            r.min_row(),
            r.max_row().min(doc.row_count() - 1),
            r.min_col(),
            r.max_col().min(doc.col_count() - 1),
        ),
        None => (0, doc.row_count() - 1, 0, doc.col_count() - 1),
    };

    let mut count = 0;
    let mut sum = 0.0;
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            if let Some(n) = leading_number(doc.cell(row, col)) {
                count += 1;
                sum += n;
            }
        }
    }

    let avg = if count > 0 { sum / count as f64 } else { 0.0 };
    RangeStats { count, sum: round2(sum), avg: round2(avg) }
}
