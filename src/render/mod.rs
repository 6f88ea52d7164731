//! Read-only HTML rendering.
//!
//! This module provides:
//! - Table markup from the resolved grid (`rowspan`/`colspan` per emitted cell)
//! - Presentation wrappers (callouts) around text block content

mod callout;
mod table;

pub use callout::wrap_block;
pub use table::{table_html, table_html_from_rows};
