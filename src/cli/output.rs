//! CLI output formatting utilities.

use crate::orchestrator::{BatchReport, PipelineObserver, PipelineResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a secondary, dimmed line.
    pub fn dim(msg: &str) {
        println!("  {}", style(msg).dim());
    }

    /// Print a block of text between rules.
    pub fn block(title: &str, body: &str) {
        let rule = "─".repeat(40);
        println!("{}", style(&rule).dim());
        println!("{}", style(title).bold());
        println!("{}", style(&rule).dim());
        println!("{}", body);
        println!("{}", style(&rule).dim());
    }

    /// Print the outcome of one video.
    pub fn video_result(result: &PipelineResult) {
        match (&result.failure, &result.classification) {
            (None, Some(classification)) => {
                Output::success(&format!(
                    "{} [{}]",
                    result.title().unwrap_or(&result.video_id),
                    style(classification.category).cyan()
                ));
                if !classification.keywords.is_empty() {
                    Output::kv("Keywords", &classification.keywords.join(", "));
                }
                Output::kv("Summary", &content_preview(&classification.summary, 160));
            }
            (Some(failure), _) => {
                Output::error(&format!("{}: {}", result.video_id, failure));
            }
            (None, None) => {}
        }
        for warning in &result.warnings {
            Output::warning(warning);
        }
    }

    /// Print the end-of-run counts of a batch.
    pub fn batch_summary(report: &BatchReport) {
        Output::header(&format!("Channel {}", report.channel_id));
        Output::kv("Processed", &report.processed().to_string());
        Output::kv("Succeeded", &report.results.len().to_string());
        Output::kv("Failed", &report.failed.len().to_string());
        Output::kv("NEWS (digest)", &report.digest_eligible().to_string());
        for warning in &report.warnings {
            Output::warning(warning);
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Reports batch progress on the console.
#[derive(Default)]
pub struct ConsoleObserver {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn video_started(&self, index: usize, total: usize, video_id: &str) {
        self.finish_spinner();
        let pb = Output::spinner(&format!("[{}/{}] Processing {}", index, total, video_id));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn video_finished(&self, result: &PipelineResult) {
        self.finish_spinner();
        Output::video_result(result);
    }

    fn pacing(&self, delay: Duration) {
        Output::dim(&format!("waiting {}s", delay.as_secs()));
    }
}

/// Single-line preview of possibly long text.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        format!("{}...", content.chars().take(max_chars).collect::<String>())
    }
}
