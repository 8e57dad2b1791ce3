// Core types shared by the engine, io, and cli crates

pub mod alignment;
pub mod refs;
pub mod selection;

pub use alignment::Alignment;
pub use selection::{CellCoord, Direction, SelectionRange};
