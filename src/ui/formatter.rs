//! Pure formatting functions for UI output.
//!
//! Styling goes through `console`, which drops colors when the stream is
//! not a terminal.

use console::style;

use crate::changelog::ReleaseEntry;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{}", format_status(message));
}

/// Display the release that was just tagged.
///
/// # Arguments
/// * `entry` - The changelog entry the tag was created from
/// * `remote` - The remote the tag was pushed to
pub fn display_release(entry: &ReleaseEntry, remote: &str) {
    println!("\n{}", style("Release created:").bold());
    println!("  Version: {}", style(&entry.version).green());
    println!("  Date:    {}", entry.date);
    println!("  Pushed:  {}", remote);
}

/// Display image tags, one per line.
pub fn display_image_tags(tags: &[String]) {
    for tag in tags {
        println!("{}", tag);
    }
}

/// Render a message as a status line without printing it.
pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}
