//! Statistics reporting.

use console::style;

use crate::download::RunSummary;

/// Print the statistics of a finished run.
pub fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Statistics:").bold());
    println!("  Posts:      {}", summary.posts_total);
    println!("  Processed:  {} (earlier runs)", summary.posts_skipped);
    if summary.posts_without_media > 0 {
        println!("  No media:   {}", summary.posts_without_media);
    }
    if summary.candidates_dropped > 0 {
        println!("  Dropped:    {} (unnameable or duplicate)", summary.candidates_dropped);
    }
    println!("  Downloaded: {}", style(summary.downloaded).green());
    println!(
        "  Skipped:    {} ({} present, {} repeated)",
        style(summary.skipped()).yellow(),
        summary.already_present,
        summary.already_processed
    );
    if summary.failed > 0 {
        println!("  Failed:     {}", style(summary.failed).red());
    }
    if summary.cancelled > 0 {
        println!("  Cancelled:  {} (retried next run)", style(summary.cancelled).yellow());
    }
    println!("{}", style("═".repeat(50)).dim());
}

