//! Parsing and application of `gmark edit` operations.
//!
//! Each operation is a single shell argument, applied left to right:
//!
//! ```text
//! set B2=hello          write a cell (value may contain spaces)
//! clear A1:B3           blank a range
//! add-row [N]           insert a blank row at 1-based position N (append if omitted)
//! del-row N             delete row N
//! dup-row N             duplicate row N
//! add-col [C]           insert a blank column at column letter C (append if omitted)
//! del-col C             delete column C
//! dup-col C             duplicate column C
//! fill A1:B1 A1:B5      tile the source range over the target range
//! format bold A1:B3     toggle bold/italic/strike/code over a range
//! merge A1:C1           merge a row's cells into one free-text row
//! unmerge N             convert merged row N back to cells
//! heading N L           toggle heading level L (1-3) on merged row N
//! no-heading N          strip the heading prefix from merged row N
//! align C left          set column alignment (left/center/right)
//! width C PX            set advisory column width in pixels
//! ```

use std::str::FromStr;

use gridmark_core::refs::{parse_column_label, parse_range_ref};
use gridmark_core::{Alignment, SelectionRange};
use gridmark_engine::document::MIN_COL_WIDTH;
use gridmark_engine::{DeleteTarget, Formatting, GridEngine};

use crate::CliError;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Set { row: usize, col: usize, value: String },
    Clear { range: SelectionRange },
    AddRow { index: Option<usize> },
    DelRow { index: usize },
    DupRow { index: usize },
    AddCol { index: Option<usize> },
    DelCol { index: usize },
    DupCol { index: usize },
    Fill { source: SelectionRange, target: SelectionRange },
    Format { kind: Formatting, range: SelectionRange },
    Merge { range: SelectionRange },
    Unmerge { row: usize },
    Heading { row: usize, level: u8 },
    NoHeading { row: usize },
    Align { col: usize, align: Alignment },
    Width { col: usize, px: f32 },
}

fn bad(op: &str, why: &str) -> CliError {
    CliError::usage(format!("invalid edit op '{op}': {why}"))
        .with_hint("see 'gmark edit --help' for the operation grammar")
}

fn cell_ref(op: &str, s: &str) -> Result<(usize, usize), CliError> {
    gridmark_core::refs::parse_cell_ref(s)
        .ok_or_else(|| bad(op, &format!("'{s}' is not a cell reference like B2")))
}

fn range_ref(op: &str, s: &str) -> Result<SelectionRange, CliError> {
    parse_range_ref(s)
        .ok_or_else(|| bad(op, &format!("'{s}' is not a range reference like A1:B3")))
}

fn row_number(op: &str, s: &str) -> Result<usize, CliError> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(bad(op, &format!("'{s}' is not a 1-based row number"))),
    }
}

fn column_ref(op: &str, s: &str) -> Result<usize, CliError> {
    parse_column_label(s).ok_or_else(|| bad(op, &format!("'{s}' is not a column letter like B")))
}

/// Parse one operation string.
pub fn parse_op(op: &str) -> Result<EditOp, CliError> {
    let (verb, rest) = match op.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (op, ""),
    };

    let args: Vec<&str> = rest.split_whitespace().collect();
    let one = |why: &str| -> Result<&str, CliError> {
        match args.as_slice() {
            [a] => Ok(a),
            _ => Err(bad(op, why)),
        }
    };

    match verb {
        "set" => {
            let (cell, value) = rest
                .split_once('=')
                .ok_or_else(|| bad(op, "expected CELL=value"))?;
            let (row, col) = cell_ref(op, cell.trim())?;
            Ok(EditOp::Set { row, col, value: value.to_string() })
        }
        "clear" => Ok(EditOp::Clear { range: range_ref(op, one("expected one range")?)? }),
        "add-row" => match args.as_slice() {
            [] => Ok(EditOp::AddRow { index: None }),
            [n] => Ok(EditOp::AddRow { index: Some(row_number(op, n)?) }),
            _ => Err(bad(op, "expected at most one row number")),
        },
        "del-row" => Ok(EditOp::DelRow { index: row_number(op, one("expected one row number")?)? }),
        "dup-row" => Ok(EditOp::DupRow { index: row_number(op, one("expected one row number")?)? }),
        "add-col" => match args.as_slice() {
            [] => Ok(EditOp::AddCol { index: None }),
            [c] => Ok(EditOp::AddCol { index: Some(column_ref(op, c)?) }),
            _ => Err(bad(op, "expected at most one column letter")),
        },
        "del-col" => Ok(EditOp::DelCol { index: column_ref(op, one("expected one column letter")?)? }),
        "dup-col" => Ok(EditOp::DupCol { index: column_ref(op, one("expected one column letter")?)? }),
        "fill" => match args.as_slice() {
            [src, dst] => Ok(EditOp::Fill {
                source: range_ref(op, src)?,
                target: range_ref(op, dst)?,
            }),
            _ => Err(bad(op, "expected SOURCE and TARGET ranges")),
        },
        "format" => match args.as_slice() {
            // Both argument orders accepted: "format bold A1:B2" / "format A1:B2 bold"
            [a, b] => {
                let (kind, range) = match Formatting::from_str(a) {
                    Ok(kind) => (kind, b),
                    Err(_) => {
                        let kind = Formatting::from_str(b)
                            .map_err(|_| bad(op, "expected bold, italic, strike, or code"))?;
                        (kind, a)
                    }
                };
                Ok(EditOp::Format { kind, range: range_ref(op, range)? })
            }
            _ => Err(bad(op, "expected KIND and RANGE")),
        },
        "merge" => Ok(EditOp::Merge { range: range_ref(op, one("expected one range")?)? }),
        "unmerge" => Ok(EditOp::Unmerge { row: row_number(op, one("expected one row number")?)? }),
        "heading" => match args.as_slice() {
            [row, level] => {
                let row = row_number(op, row)?;
                let level: u8 = level
                    .parse()
                    .ok()
                    .filter(|l| (1..=3).contains(l))
                    .ok_or_else(|| bad(op, "heading level must be 1-3"))?;
                Ok(EditOp::Heading { row, level })
            }
            _ => Err(bad(op, "expected ROW and LEVEL")),
        },
        "no-heading" => {
            Ok(EditOp::NoHeading { row: row_number(op, one("expected one row number")?)? })
        }
        "align" => match args.as_slice() {
            [col, align] => {
                let col = column_ref(op, col)?;
                let align = Alignment::from_str(align)
                    .map_err(|_| bad(op, "expected left, center, or right"))?;
                Ok(EditOp::Align { col, align })
            }
            _ => Err(bad(op, "expected COLUMN and ALIGNMENT")),
        },
        "width" => match args.as_slice() {
            [col, px] => {
                let col = column_ref(op, col)?;
                let px: f32 = px
                    .parse()
                    .ok()
                    .filter(|p: &f32| p.is_finite() && *p >= MIN_COL_WIDTH)
                    .ok_or_else(|| bad(op, &format!("width must be a number >= {MIN_COL_WIDTH}")))?;
                Ok(EditOp::Width { col, px })
            }
            _ => Err(bad(op, "expected COLUMN and PIXELS")),
        },
        _ => Err(bad(op, "unknown operation")),
    }
}

/// Apply one parsed operation. Returns false when the op had no effect
/// (out of range, already in the requested state).
pub fn apply_op(engine: &mut GridEngine, op: &EditOp) -> bool {
    match op {
        EditOp::Set { row, col, value } => engine.set_cell_value(*row, *col, value.clone()),
        EditOp::Clear { range } => {
            engine.set_selection(Some(*range));
            engine.delete_selection()
        }
        EditOp::AddRow { index } => engine.add_row(*index),
        EditOp::DelRow { index } => engine.delete_row(DeleteTarget::Index(*index)),
        EditOp::DupRow { index } => engine.duplicate_row(*index),
        EditOp::AddCol { index } => engine.add_column(*index),
        EditOp::DelCol { index } => engine.delete_column(DeleteTarget::Index(*index)),
        EditOp::DupCol { index } => engine.duplicate_column(*index),
        EditOp::Fill { source, target } => {
            engine.set_selection(Some(*source));
            engine.fill_range(*target)
        }
        EditOp::Format { kind, range } => {
            engine.set_selection(Some(*range));
            engine.apply_formatting(*kind)
        }
        EditOp::Merge { range } => {
            engine.set_selection(Some(*range));
            engine.merge_cells()
        }
        EditOp::Unmerge { row } => engine.unmerge_cells(*row),
        EditOp::Heading { row, level } => engine.toggle_merged_row_header(*row, *level),
        EditOp::NoHeading { row } => engine.remove_merged_row_header(*row),
        EditOp::Align { col, align } => engine.set_column_alignment(*col, *align),
        EditOp::Width { col, px } => engine.set_column_width(*col, *px),
    }
}
