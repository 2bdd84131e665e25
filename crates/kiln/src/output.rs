//! Terminal output utilities

use console::style;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print how to invoke the tool
pub fn usage() {
    error("You have to provide a name to your app.");
    println!("For example:");
    println!("    {} my-app", style("kiln").bold());
}

/// Print the `.env` keys that still need real values
pub fn placeholders(entries: &[(&str, String)]) {
    for (key, value) in entries {
        println!("  {}={}", style(key).cyan(), value);
    }
}
