//! Terminal output for CLI handlers.
//!
//! Human-readable output uses colored status symbols and `tabled` tables.
//! In JSON mode every helper is silent except [`json_output`], so scripts
//! receive exactly one JSON document on stdout.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Switch between human-readable and JSON output.
pub fn configure(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    if is_json() {
        return;
    }
    println!("{} {}", "cardplan".bold(), version.dimmed());
}

/// Print a section header.
pub fn section(title: &str) {
    if is_json() {
        return;
    }
    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if is_json() {
        return;
    }
    println!("  {:<14} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    if is_json() {
        return;
    }
    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    if is_json() {
        return;
    }
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", serde_json::json!({ "error": message }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a hint line.
pub fn hint(message: &str) {
    if is_json() {
        return;
    }
    println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
}

/// Print pre-rendered multi-line content, indented.
pub fn lines(content: &str) {
    if is_json() {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Format a value in the highlight color.
#[must_use]
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.cyan())
}

/// Print a JSON document.
pub fn json_output(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}
