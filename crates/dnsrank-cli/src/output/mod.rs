//! Report rendering for the terminal.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use dnsrank_core::rank::RankedResolver;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary blocks
    #[default]
    Pretty,
    /// JSON array of the ranked resolvers
    Json,
}

/// Print the final report to stdout.
pub fn render(
    report: &[RankedResolver],
    candidates: usize,
    qualified: usize,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Pretty => {
            println!("{candidates} candidate resolvers");
            println!("{qualified} qualified after probing");
            for entry in report {
                println!();
                println!("{}", entry.name.bold());
                println!(
                    "  Minimum = {}, Maximum = {}, Average = {}",
                    format!("{:.2?}", entry.min).green(),
                    format!("{:.2?}", entry.max).yellow(),
                    format!("{:.2?}", entry.average).cyan(),
                );
            }
        }
    }
    Ok(())
}
