//! Styled terminal output utilities.

use owo_colors::OwoColorize;

/// Print a header/title
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "─".repeat(text.chars().count()).dimmed());
    println!();
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print a warning message
pub fn warn(text: &str) {
    println!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a list item
pub fn list_item(text: &str) {
    println!("  {} {}", "•".dimmed(), text);
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print a run report rendered as text.
///
/// The banner line is highlighted and error entries are shown in red; the
/// text itself is printed unchanged.
pub fn report(text: &str) {
    for line in text.lines() {
        if line.starts_with("===") {
            println!("{}", line.bold().cyan());
        } else if line.starts_with("- File:") {
            println!("{}", line.red());
        } else if line.starts_with("  Statement:") || line.starts_with("  Message:") {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
}
