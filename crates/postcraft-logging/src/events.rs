use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Which drafting step produced a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStep {
    Generate,
    Optimize,
}

/// Structured log events for the refinement loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    LoopStarted {
        topic: String,
        mood: Option<String>,
        style_account: Option<String>,
        max_iterations: usize,
    },
    DraftStarted {
        iteration: usize,
        step: DraftStep,
    },
    DraftCompleted {
        iteration: usize,
        step: DraftStep,
        chars: usize,
        duration_secs: f64,
    },
    CritiqueStarted {
        iteration: usize,
    },
    CritiqueCompleted {
        iteration: usize,
        evaluation: String,
        feedback: String,
    },
    /// The critic reply was unusable and the fallback verdict was applied
    CritiqueFallback {
        iteration: usize,
        reason: String,
    },
    LoopCompleted {
        iterations: usize,
        approved: bool,
        duration_secs: f64,
    },
    IterationCapReached {
        iterations: usize,
    },
    ErrorEncountered {
        iteration: usize,
        error: String,
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
    /// No console output (file output still applies)
    Silent,
}

/// Logger for loop events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Logger that discards console output
    pub fn silent() -> Self {
        Self::new(LogFormat::Silent)
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
            LogFormat::Silent => {}
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        if let Some(line) = pretty_line(event) {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::LoopStarted { max_iterations, .. } => {
                format!("[{}] loop:start max={}", timestamp, max_iterations)
            }
            LogEvent::DraftStarted { iteration, step } => {
                format!("[{}] {}:start:{}", timestamp, step_name(*step), iteration)
            }
            LogEvent::DraftCompleted {
                iteration,
                step,
                chars,
                duration_secs,
            } => format!(
                "[{}] {}:done:{} {}c {:.1}s",
                timestamp,
                step_name(*step),
                iteration,
                chars,
                duration_secs
            ),
            LogEvent::CritiqueStarted { iteration } => {
                format!("[{}] critic:start:{}", timestamp, iteration)
            }
            LogEvent::CritiqueCompleted {
                iteration,
                evaluation,
                ..
            } => format!("[{}] critic:done:{} {}", timestamp, iteration, evaluation),
            LogEvent::CritiqueFallback { iteration, .. } => {
                format!("[{}] critic:fallback:{}", timestamp, iteration)
            }
            LogEvent::LoopCompleted {
                iterations,
                approved,
                duration_secs,
            } => format!(
                "[{}] loop:done:{} approved={} {:.1}s",
                timestamp, iterations, approved, duration_secs
            ),
            LogEvent::IterationCapReached { iterations } => {
                format!("[{}] loop:limit:{}", timestamp, iterations)
            }
            LogEvent::ErrorEncountered { iteration, error } => {
                format!("[{}] error:{}:{}", timestamp, iteration, error)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

/// One human-readable line per event; `None` for events the binary reports itself
fn pretty_line(event: &LogEvent) -> Option<String> {
    let line = match event {
        LogEvent::LoopStarted {
            topic,
            mood,
            style_account,
            max_iterations,
        } => {
            let mut hints = Vec::new();
            if let Some(mood) = mood {
                hints.push(format!("mood {}", mood));
            }
            if let Some(account) = style_account {
                hints.push(format!("like @{}", account));
            }
            hints.push(format!("up to {} drafts", max_iterations));
            format!(
                "{} {} {}",
                "postcraft".bold().bright_blue(),
                shorten(topic, 60).bold(),
                format!("({})", hints.join(", ")).dimmed()
            )
        }
        LogEvent::DraftStarted { iteration, step } => format!(
            "{} {} draft {}",
            "▶".bright_cyan(),
            step_name(*step).bright_cyan().bold(),
            iteration
        ),
        LogEvent::DraftCompleted {
            chars,
            duration_secs,
            ..
        } => format!(
            "  {} {} chars in {:.1}s",
            "✓".bright_green(),
            chars,
            duration_secs
        ),
        LogEvent::CritiqueStarted { iteration } => format!(
            "{} {} draft {}",
            "▶".bright_magenta(),
            "critique".bright_magenta().bold(),
            iteration
        ),
        LogEvent::CritiqueCompleted {
            evaluation,
            feedback,
            ..
        } => {
            let verdict = if evaluation == "approved" {
                evaluation.bright_green()
            } else {
                evaluation.bright_yellow()
            };
            format!("  {} {}", verdict, shorten(feedback, 100).dimmed())
        }
        LogEvent::CritiqueFallback { reason, .. } => format!(
            "  {} critic reply unusable: {}",
            "⚠".bright_yellow(),
            reason.dimmed()
        ),
        LogEvent::LoopCompleted { .. } => return None,
        LogEvent::IterationCapReached { iterations } => format!(
            "{} cap of {} drafts reached, keeping the latest",
            "⚠".bright_yellow(),
            iterations
        ),
        LogEvent::ErrorEncountered { iteration, error } => format!(
            "{} draft {} failed: {}",
            "✗".bright_red(),
            iteration,
            error.bright_red()
        ),
    };
    Some(line)
}

fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn step_name(step: DraftStep) -> &'static str {
    match step {
        DraftStep::Generate => "generate",
        DraftStep::Optimize => "optimize",
    }
}
