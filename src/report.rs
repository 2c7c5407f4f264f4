//! Console rendering of search results and progress

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::record::FileRecord;
use crate::search::{ORIGIN_RECENT_MISSING, ORIGIN_RECYCLE_BIN};

/// Width of the single repainted progress line
pub const PROGRESS_WIDTH: usize = 60;

pub fn build_table(records: &[FileRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(vec!["#", "Name", "Path", "Size", "Date", "Origin"]);

    for (i, record) in records.iter().enumerate() {
        let origin_color = if record.origin == ORIGIN_RECENT_MISSING {
            Color::Red
        } else if record.origin == ORIGIN_RECYCLE_BIN {
            Color::Yellow
        } else {
            Color::Magenta
        };
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::Cyan),
            Cell::new(&record.name).add_attribute(Attribute::Bold),
            Cell::new(&record.path),
            Cell::new(&record.size).fg(Color::Green),
            Cell::new(&record.modified),
            Cell::new(&record.origin).fg(origin_color),
        ]);
    }
    table
}

pub fn print_results(title: &str, records: &[FileRecord]) {
    println!("\n{}", format!("=== {} ===", title).cyan());
    if records.is_empty() {
        println!("{}", "No files found.".yellow());
        return;
    }
    println!("{}", build_table(records));
    println!("\n  {}\n", format!("Total: {} file(s) found", records.len()).bold());
}

/// One line per backend in a full search: count, or why it did not run
pub fn print_backend_summary(label: &str, outcome: Result<usize, &str>) {
    match outcome {
        Ok(count) => println!("  {:<24} {}", label, count.to_string().green()),
        Err(reason) => println!(
            "  {:<24} {}",
            label,
            format!("not attempted ({})", reason).yellow()
        ),
    }
}

/// Keeps the tail of long paths: `"..."` plus the last `width - 3` chars
pub fn truncate_path(path: &str, width: usize) -> String {
    let count = path.chars().count();
    if count <= width {
        return path.to_string();
    }
    let keep = width.saturating_sub(3);
    let tail: String = path.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

/// Repaints the status line with the directory being scanned
pub fn show_progress(dir: &Path) {
    let shown = truncate_path(&dir.to_string_lossy(), PROGRESS_WIDTH);
    print!("\r  {:<width$}", shown.dimmed(), width = PROGRESS_WIDTH);
    let _ = io::stdout().flush();
}

pub fn clear_progress() {
    print!("\r{}\r", " ".repeat(PROGRESS_WIDTH + 2));
    let _ = io::stdout().flush();
}
