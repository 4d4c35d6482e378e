//! Terminal output for the command-line front end.

use crate::domain::BumpResult;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print an advisory message in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Text printed for a recommendation: the release type, or nothing at all
pub fn format_recommendation(result: &BumpResult) -> String {
    result
        .release_type
        .map(|release_type| release_type.to_string())
        .unwrap_or_default()
}

/// Print the recommendation; with `verbose` the policy's reason follows it
pub fn display_recommendation(result: &BumpResult, verbose: bool) {
    let line = format_recommendation(result);
    if !line.is_empty() {
        println!("{}", style(line).green().bold());
    }

    if verbose {
        if let Some(reason) = result.reason() {
            println!("{} {}", style("Reason:").bold(), reason);
        }
    }
}

/// Print the full recommendation as JSON
pub fn display_json(result: &BumpResult) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
