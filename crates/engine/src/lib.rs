pub mod document;
pub mod engine;
pub mod history;

pub use document::{Document, Row};
pub use engine::{DeleteTarget, Formatting, GridEngine};
pub use history::History;
