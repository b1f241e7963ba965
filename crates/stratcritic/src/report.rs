//! Human-readable rendering of an evaluation report.

use colored::Colorize;
use std::io::{self, Write};

use stratcritic_core::{Consensus, CriticEntry, EvaluationReport};
use stratcritic_critic::Verdict;

const RULE_WIDTH: usize = 80;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn styled_verdict(entry: &CriticEntry) -> String {
    match entry.verdict() {
        Some(Verdict::Yes) => "Yes".bright_green().bold().to_string(),
        Some(Verdict::No) => "No".bright_red().bold().to_string(),
        Some(Verdict::Unknown) => "Unknown".bright_yellow().bold().to_string(),
        None => "Error".bright_red().to_string(),
    }
}

/// Per-critic sections, then the summary table and consensus
pub fn write_report(out: &mut impl Write, report: &EvaluationReport) -> io::Result<()> {
    for entry in &report.entries {
        writeln!(out, "{}", heavy_rule())?;
        writeln!(
            out,
            "{} ({})",
            entry.model().as_str().to_uppercase().bold(),
            entry.upstream_id()
        )?;
        writeln!(out, "{}", heavy_rule())?;

        match entry {
            CriticEntry::Reviewed(result) => {
                if let Some(routed) = result
                    .routed_model
                    .as_deref()
                    .filter(|routed| *routed != result.upstream_id)
                {
                    writeln!(out, "{}", format!("Answered by {}", routed).dimmed())?;
                }
                writeln!(out, "{}", result.raw_response_text)?;
                writeln!(out, "{}", light_rule())?;
                writeln!(out, "Verdict: {}", styled_verdict(entry))?;
                if result.verdict == Verdict::Unknown {
                    writeln!(
                        out,
                        "{}",
                        "No clear Yes/No on the final line; read the reasoning above.".dimmed()
                    )?;
                }
            }
            CriticEntry::Failed { error, .. } => {
                writeln!(out, "{} {}", "Error:".bright_red(), error)?;
                writeln!(out, "{}", light_rule())?;
                writeln!(out, "Verdict: {}", styled_verdict(entry))?;
            }
        }
        writeln!(out)?;
    }

    write_summary(out, report)
}

fn write_summary(out: &mut impl Write, report: &EvaluationReport) -> io::Result<()> {
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out, "{}", "SUMMARY".bold())?;
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out)?;

    for entry in &report.entries {
        writeln!(
            out,
            "{:12} ({:40}): {}",
            entry.model().as_str().to_uppercase(),
            entry.upstream_id(),
            styled_verdict(entry)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Consensus: {}/{} models approved the strategy",
        report.approvals(),
        report.entries.len()
    )?;
    if report.failures() > 0 {
        writeln!(
            out,
            "{}",
            format!("{} model(s) could not be reached", report.failures()).bright_red()
        )?;
    }

    let line = match report.consensus() {
        Consensus::AllApproved => {
            format!("{} All models agree: strategy correctly implements the requirements", "✓")
                .bright_green()
        }
        Consensus::AllRejected => {
            format!("{} All models agree: strategy has issues and needs revision", "✗")
                .bright_red()
        }
        Consensus::Mixed => {
            format!("{} Mixed results: review individual critiques for details", "⚠")
                .bright_yellow()
        }
    };
    writeln!(out, "{}", line)?;
    writeln!(out)?;
    writeln!(out, "{}", heavy_rule())
}
