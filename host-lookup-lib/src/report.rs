//! Final report of a run and its rendering.

use crate::types::{ReportFormat, ReportLine};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

/// Counters collected while a run progresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Input files read to the end
    pub files_read: usize,

    /// Input files skipped because they could not be opened or read
    pub files_skipped: usize,

    /// Host name occurrences queued across all files
    pub tokens: usize,

    /// Tokens skipped for exceeding the name length limit or not being UTF-8
    pub rejected: usize,

    /// Distinct host names in the report
    pub distinct: usize,

    /// Entries answered from the cache
    pub cached: usize,

    /// Entries answered by the external resolver
    pub resolved: usize,

    /// Entries whose lookup failed (empty address)
    pub failed: usize,

    /// Wall-clock time of the whole run
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Everything a run produced: one line per distinct name, in first-seen
/// order, plus counters.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub lines: Vec<ReportLine>,
    pub summary: RunSummary,
}

impl Report {
    /// Render the whole report as one string.
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => {
                let mut out = String::new();
                for line in &self.lines {
                    out.push_str(&line.to_string());
                    out.push('\n');
                }
                Ok(out)
            }
            ReportFormat::Json => {
                let mut out = serde_json::to_string_pretty(&self.lines)?;
                out.push('\n');
                Ok(out)
            }
        }
    }

    /// Write the report to `writer` in a single write so lines from
    /// different sources can never interleave.
    pub fn write_to<W: Write>(&self, writer: &mut W, format: ReportFormat) -> std::io::Result<()> {
        let rendered = self.render(format)?;
        writer.write_all(rendered.as_bytes())?;
        writer.flush()
    }

    /// Look up the line for `name`.
    pub fn line(&self, name: &str) -> Option<&ReportLine> {
        self.lines.iter().find(|line| line.name == name)
    }
}
