use serde::{Deserialize, Serialize};

/// Per-column text alignment, carried in the separator row of a pipe table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Classify one cell of a separator row (`:---:` center, `---:` right,
    /// anything else left).
    pub fn from_separator_cell(cell: &str) -> Self {
        let c = cell.trim();
        if c.starts_with(':') && c.ends_with(':') && c.len() > 1 {
            Alignment::Center
        } else if c.ends_with(':') {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    /// Render one separator-row cell with the given dash count.
    pub fn separator_cell(&self, dashes: usize) -> String {
        let dashes = "-".repeat(dashes.max(1));
        match self {
            Alignment::Left => format!("-{dashes}-"),
            Alignment::Center => format!(":{dashes}:"),
            Alignment::Right => format!("{dashes}:"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl std::str::FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(format!("unknown alignment: {other}")),
        }
    }
}
