//! File read/write around the markdown codec.

use std::fs;
use std::path::Path;

use gridmark_engine::document::Document;

use crate::markdown::{parse_markdown, to_markdown};

/// Default export filename when none is configured.
pub const DEFAULT_EXPORT_NAME: &str = "table.md";

pub fn read_markdown(path: &Path) -> Result<Document, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(parse_markdown(&content))
}

pub fn write_markdown(path: &Path, doc: &Document) -> Result<(), String> {
    let content = to_markdown(doc, None);
    fs::write(path, content).map_err(|e| format!("cannot write {}: {e}", path.display()))
}
