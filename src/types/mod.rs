//! Data types shared by the grid engine, the resolver and the sync surface.

mod alignment;
pub(crate) mod coord;
mod document;
mod selection;
mod span;
mod table;

pub use alignment::*;
pub use coord::{CellCoord, CellRect};
pub use document::*;
pub use selection::*;
pub use span::*;
pub use table::*;
