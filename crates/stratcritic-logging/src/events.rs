use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Structured log events for an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    EvaluationStarted {
        prompt: String,
        models: Vec<String>,
        concurrent: bool,
    },
    CriticStarted {
        model: String,
        upstream_id: String,
    },
    CriticCompleted {
        model: String,
        verdict: String,
        response_lines: usize,
        duration_secs: f64,
    },
    CriticFailed {
        model: String,
        error: String,
    },
    EvaluationCompleted {
        approvals: usize,
        total: usize,
        failures: usize,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Progress logger for stratcritic events, written to stderr
pub struct Logger {
    format: LogFormat,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn log(&self, event: &LogEvent) {
        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => {
                let _ = writeln!(std::io::stderr(), "{}", Self::compact_line(event));
            }
        }
    }

    fn log_json(&self, event: &LogEvent) {
        let _ = writeln!(std::io::stderr(), "{}", event.with_timestamp());
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::EvaluationStarted {
                prompt,
                models,
                concurrent,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "stratcritic".bold().bright_white(),
                    " ".repeat(56) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Prompt:".dimmed(),
                    Self::truncate_with_padding(prompt, 60, 68).dimmed()
                );
                let mode = if *concurrent { "concurrent" } else { "sequential" };
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Models:".dimmed(),
                    Self::truncate_with_padding(&format!("{} ({})", models.join(", "), mode), 60, 68)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::CriticStarted { model, upstream_id } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "▶".bright_magenta(),
                    model.to_uppercase().bright_magenta().bold(),
                    format!("({})", upstream_id).dimmed()
                );
            }
            LogEvent::CriticCompleted {
                verdict,
                duration_secs,
                ..
            } => {
                let styled = match verdict.as_str() {
                    "Yes" => format!("✓ Verdict: {}", verdict).bright_green().to_string(),
                    "No" => format!("✗ Verdict: {}", verdict).bright_red().to_string(),
                    _ => format!("? Verdict: {}", verdict).bright_yellow().to_string(),
                };
                let _ = writeln!(stderr, "    {} ({:.1}s)", styled, duration_secs);
            }
            LogEvent::CriticFailed { model, error } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} failed: {}",
                    "✗".bright_red(),
                    model,
                    error.bright_red()
                );
            }
            LogEvent::EvaluationCompleted { .. } => {
                // The summary is printed with the report on stdout
            }
        }
    }

    fn compact_line(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            LogEvent::EvaluationStarted {
                models, concurrent, ..
            } => format!(
                "[{}] eval:start {}{}",
                timestamp,
                models.join(","),
                if *concurrent { " concurrent" } else { "" }
            ),
            LogEvent::CriticStarted { model, upstream_id } => {
                format!("[{}] critic:start:{} {}", timestamp, model, upstream_id)
            }
            LogEvent::CriticCompleted {
                model,
                verdict,
                duration_secs,
                ..
            } => format!(
                "[{}] critic:done:{} {} {:.1}s",
                timestamp, model, verdict, duration_secs
            ),
            LogEvent::CriticFailed { model, error } => {
                format!("[{}] critic:error:{} {}", timestamp, model, error)
            }
            LogEvent::EvaluationCompleted {
                approvals,
                total,
                failures,
                duration_secs,
            } => format!(
                "[{}] eval:done {}/{} approved, {} failed {:.1}s",
                timestamp, approvals, total, failures, duration_secs
            ),
        }
    }

    /// Flatten to one line, truncate, and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let s = s
            .split(['\r', '\n'])
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let truncated = if s.chars().count() > max_len {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{}...", head)
        } else {
            s
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
