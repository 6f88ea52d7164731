//! CLI tool for gridsync - renders a persisted table as HTML
//!
//! Usage:
//!   gridsync_cli <table.json>              # Output HTML to stdout
//!   gridsync_cli <table.json> -o out.html  # Output HTML to file
//!
//! The input is either a bare grid (`{headers, rows, cellSpans, ...}`) or a
//! table block (`{"type": "tableau", "table_data": {...}}`).

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use gridsync::render::table_html;
use gridsync::{BlockKind, TableData};

fn load_grid(json: &str) -> gridsync::Result<TableData> {
    match serde_json::from_str::<BlockKind>(json) {
        Ok(BlockKind::Table { table }) => Ok(table),
        _ => TableData::from_json(json),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: gridsync_cli <table.json> [-o output.html]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let json = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse grid
    let grid = match load_grid(&json) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error parsing table: {}", e);
            std::process::exit(1);
        }
    };

    let html = table_html(&grid);

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &html) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!(
                "Written: {} ({} rows, {} merges)",
                path,
                grid.row_count(),
                grid.merges().len()
            );
        }
        None => {
            io::stdout().write_all(html.as_bytes()).unwrap();
        }
    }
}
