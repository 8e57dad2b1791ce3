// gridmark CLI - headless markdown table operations

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use gridmark_cli::edit::{apply_op, parse_op};
use gridmark_cli::exit_codes::EXIT_SUCCESS;
use gridmark_cli::{stats, CliError};
use gridmark_config::Settings;
use gridmark_core::refs::parse_range_ref;
use gridmark_engine::document::Document;
use gridmark_engine::GridEngine;
use gridmark_io::{clipboard, files, json, markdown};

#[derive(Parser)]
#[command(name = "gmark")]
#[command(about = "Markdown pipe-table editor (CLI mode, headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a blank table
    #[command(after_help = "\
Examples:
  gmark new
  gmark new --rows 5 --cols 3
  gmark new -o table.md
  gmark new --save")]
    New {
        /// Row count (defaults to the configured grid.newRows)
        #[arg(long)]
        rows: Option<usize>,

        /// Column count (defaults to the configured grid.newCols)
        #[arg(long)]
        cols: Option<usize>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write to the configured export filename (export.filename)
        #[arg(long, conflicts_with = "output")]
        save: bool,
    },

    /// Parse a markdown table and re-emit it normalized
    #[command(after_help = "\
Examples:
  gmark fmt table.md
  cat notes.md | gmark fmt
  gmark fmt table.md --range A1:C5
  gmark fmt table.md -o table.md")]
    Fmt {
        /// Input file (omit or - to read from stdin)
        input: Option<PathBuf>,

        /// Emit only this range (e.g. A1:C5)
        #[arg(long)]
        range: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Convert between table formats
    #[command(after_help = "\
Examples:
  gmark convert data.csv -t md
  gmark convert table.md -t json -o table.json
  cat data.tsv | gmark convert -f tsv -t md
  gmark convert table.md -t csv --delimiter ';'")]
    Convert {
        /// Input file (omit or - to read from stdin)
        input: Option<PathBuf>,

        /// Input format (inferred from extension when omitted)
        #[arg(long, short = 'f')]
        from: Option<Format>,

        /// Output format
        #[arg(long, short = 't')]
        to: Format,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// CSV delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// Numeric summary (count, sum, average) of a table or range
    #[command(after_help = "\
Examples:
  gmark stats table.md
  gmark stats table.md --range B2:B20
  gmark stats table.md --json | jq .sum")]
    Stats {
        /// Input file (omit or - to read from stdin)
        input: Option<PathBuf>,

        /// Restrict to this range (e.g. B2:B20)
        #[arg(long)]
        range: Option<String>,

        /// Emit JSON instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Apply edit operations to a table
    #[command(after_help = "\
Operations are applied left to right; see the op grammar below.

  set B2=hello     clear A1:B3      add-row [N]     del-row N    dup-row N
  add-col [C]      del-col C        dup-col C       fill A1:B1 A1:B5
  format bold A1:B3                 merge A1:C1     unmerge N
  heading N L      no-heading N     align C center  width C 96

Examples:
  gmark edit table.md -e 'set B2=42' -e 'format bold B2'
  gmark edit table.md -e 'merge A1:C1' -e 'heading 1 2' --in-place
  cat table.md | gmark edit -e 'add-row 3' -e 'del-col B'")]
    Edit {
        /// Input file (omit or - to read from stdin)
        input: Option<PathBuf>,

        /// Edit operation (repeatable)
        #[arg(long = "op", short = 'e', value_name = "OP", required = true)]
        ops: Vec<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the result back to the input file
        #[arg(long, conflicts_with = "output")]
        in_place: bool,

        /// Suppress stderr notes for ops that had no effect
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Md,
    Csv,
    Tsv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New { rows, cols, output, save } => cmd_new(rows, cols, output.as_deref(), save),
        Commands::Fmt { input, range, output } => {
            cmd_fmt(input.as_deref(), range.as_deref(), output.as_deref())
        }
        Commands::Convert { input, from, to, output, delimiter } => {
            cmd_convert(input.as_deref(), from, to, output.as_deref(), delimiter)
        }
        Commands::Stats { input, range, json } => cmd_stats(input.as_deref(), range.as_deref(), json),
        Commands::Edit { input, ops, output, in_place, quiet } => {
            cmd_edit(input.as_deref(), &ops, output.as_deref(), in_place, quiet)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            err.print();
            ExitCode::from(err.code)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_new(
    rows: Option<usize>,
    cols: Option<usize>,
    output: Option<&Path>,
    save: bool,
) -> Result<(), CliError> {
    let settings = Settings::load();
    let rows = rows.unwrap_or(settings.new_rows);
    let cols = cols.unwrap_or(settings.new_cols);
    let doc = Document::new(rows, cols);

    let configured = PathBuf::from(&settings.export_filename);
    let target = if save { Some(configured.as_path()) } else { output };
    write_text(target, &markdown::to_markdown(&doc, None))
}

fn cmd_fmt(
    input: Option<&Path>,
    range: Option<&str>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let doc = read_table(input)?;
    let selection = range.map(parse_selection).transpose()?;
    write_text(output, &markdown::to_markdown(&doc, selection))
}

fn cmd_convert(
    input: Option<&Path>,
    from: Option<Format>,
    to: Format,
    output: Option<&Path>,
    delimiter: char,
) -> Result<(), CliError> {
    let from = match from {
        Some(f) => f,
        None => infer_format(input)?,
    };
    if !delimiter.is_ascii() {
        return Err(CliError::usage("delimiter must be a single ASCII character"));
    }
    let content = read_text(input)?;

    let doc = match from {
        Format::Md => markdown::parse_markdown(&content),
        Format::Csv => clipboard::from_delimited(&content, delimiter as u8).map_err(CliError::parse)?,
        Format::Tsv => clipboard::from_delimited(&content, b'\t').map_err(CliError::parse)?,
        Format::Json => json::from_json(&content).map_err(CliError::parse)?,
    };

    let rendered = match to {
        Format::Md => markdown::to_markdown(&doc, None),
        Format::Csv => clipboard::to_delimited(&doc, delimiter as u8).map_err(CliError::parse)?,
        Format::Tsv => clipboard::to_delimited(&doc, b'\t').map_err(CliError::parse)?,
        Format::Json => json::to_json(&doc).map_err(CliError::parse)?,
    };
    write_text(output, &rendered)
}

fn cmd_stats(input: Option<&Path>, range: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let doc = read_table(input)?;
    let selection = range.map(parse_selection).transpose()?;
    let result = stats::compute(&doc, selection.as_ref());

    if as_json {
        let rendered = serde_json::to_string(&result)
            .map_err(|e| CliError::parse(format!("cannot encode stats: {e}")))?;
        println!("{rendered}");
    } else {
        println!("count: {}", result.count);
        println!("sum:   {}", result.sum);
        println!("avg:   {}", result.avg);
    }
    Ok(())
}

fn cmd_edit(
    input: Option<&Path>,
    ops: &[String],
    output: Option<&Path>,
    in_place: bool,
    quiet: bool,
) -> Result<(), CliError> {
    // Parse every op before touching the document, so a typo in the last op
    // cannot leave a half-applied result.
    let parsed = ops.iter().map(|op| parse_op(op)).collect::<Result<Vec<_>, _>>()?;

    let in_place_target = if in_place {
        match input {
            Some(path) if path != Path::new("-") => Some(path),
            _ => return Err(CliError::usage("--in-place requires an input file")),
        }
    } else {
        None
    };

    let doc = read_table(input)?;
    let mut engine = GridEngine::from_document(doc);
    for (op, raw) in parsed.iter().zip(ops) {
        if !apply_op(&mut engine, op) && !quiet {
            eprintln!("note: '{raw}' had no effect");
        }
    }

    let rendered = markdown::to_markdown(engine.document(), None);
    write_text(in_place_target.or(output), &rendered)
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

/// Load a markdown table from a file or stdin.
fn read_table(input: Option<&Path>) -> Result<Document, CliError> {
    match input {
        Some(path) if path != Path::new("-") => files::read_markdown(path).map_err(CliError::io),
        _ => Ok(markdown::parse_markdown(&read_text(None)?)),
    }
}

fn read_text(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display()))),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
            Ok(buf)
        }
    }
}

fn write_text(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display()))),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .map_err(|e| CliError::io(format!("cannot write stdout: {e}")))
        }
    }
}

fn parse_selection(s: &str) -> Result<gridmark_core::SelectionRange, CliError> {
    parse_range_ref(s).ok_or_else(|| {
        CliError::usage(format!("'{s}' is not a range reference"))
            .with_hint("use A1-style references, e.g. B2 or A1:C5")
    })
}

fn infer_format(input: Option<&Path>) -> Result<Format, CliError> {
    let hint = "pass -f md|csv|tsv|json when reading from stdin";
    let Some(path) = input.filter(|p| *p != Path::new("-")) else {
        return Err(CliError::usage("cannot infer input format").with_hint(hint));
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("md") | Some("markdown") => Ok(Format::Md),
        Some("csv") => Ok(Format::Csv),
        Some("tsv") => Ok(Format::Tsv),
        Some("json") => Ok(Format::Json),
        _ => Err(CliError::usage(format!(
            "cannot infer input format from {}",
            path.display()
        ))
        .with_hint(hint)),
    }
}
