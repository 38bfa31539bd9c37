//! Terminal display logic for the host-lookup CLI.
//!
//! Header, spinner and end-of-run summary. Uses only the `console` crate.
//! The report itself always goes to the output file, never through here.

use console::{style, Term};
use host_lookup_lib::{LookupConfig, RunSummary};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner, or return `None` when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a run.
pub fn print_header(file_count: usize, config: &LookupConfig) {
    println!(
        "{} {} {}",
        style("host-lookup").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "| Reading {} file{}",
            file_count,
            if file_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let mut meta_parts = vec![
        format!("Producers: {}", config.max_producers),
        format!("Queue capacity: {}", config.queue_capacity),
    ];
    if let Some(timeout) = config.resolve_timeout {
        meta_parts.push(format!("Timeout: {}", format_duration(timeout)));
    }

    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the end-of-run summary.
pub fn print_summary(summary: &RunSummary, output: &Path) {
    let mut parts = vec![format!("{} resolved", style(summary.resolved).green())];
    if summary.cached > 0 {
        parts.push(format!("{} cached", style(summary.cached).cyan()));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", style(summary.failed).red()));
    }

    println!(
        "Summary: {} distinct names from {} occurrences ({}) in {}",
        style(summary.distinct).bold(),
        summary.tokens,
        parts.join(", "),
        format_duration(summary.elapsed),
    );

    if summary.files_skipped > 0 {
        println!(
            "{}",
            style(format!(
                "⚠ {} of {} input files could not be read",
                summary.files_skipped,
                summary.files_read + summary.files_skipped
            ))
            .yellow()
        );
    }
    if summary.rejected > 0 {
        println!(
            "{}",
            style(format!(
                "⚠ {} over-long or non-UTF-8 tokens were skipped",
                summary.rejected
            ))
            .yellow()
        );
    }

    println!("Results written to {}", style(output.display()).bold());
}

/// Short human-readable duration.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(62)), "62.0s");
    }
}
