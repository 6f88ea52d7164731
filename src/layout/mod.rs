//! Cell-render resolution for merged grids.
//!
//! This module handles:
//! - Deciding, per row, which cells are emitted and which are suppressed
//!   because a merge anchored earlier absorbs them
//! - Carrying each emitted cell's span and effective alignment
//! - Caching the resolved grid until the grid revision changes

mod resolver;

pub use resolver::{
    resolve, resolve_row, row_coverage, Coverage, RenderCell, RenderRow, ResolverCache,
};
