//! Core data types for host name resolution.
//!
//! This module defines the run configuration, the per-name work entry,
//! resolution outcomes, pipeline phases and the report line format.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of concurrent admissions the work queue accepts.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of input files read at the same time.
pub const DEFAULT_MAX_PRODUCERS: usize = 10;

/// Default pre-sizing hint for the resolution cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Largest cache pre-sizing hint honoured.
pub const MAX_CACHE_CAPACITY: usize = 1_000_000;

/// Default longest token accepted as a host name.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 1024;

/// Default upper bound of the random delay before a resolver starts.
pub const DEFAULT_JITTER: Duration = Duration::from_micros(100);

/// Configuration options for a lookup run.
///
/// Everything here is a tuning knob. None of it changes which lines end
/// up in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Maximum number of `enqueue` calls admitted at once
    /// Default: 100, Range: 1-10000
    pub queue_capacity: usize,

    /// Maximum number of producer tasks reading files at once
    /// Default: 10, Range: 1-100
    pub max_producers: usize,

    /// Initial capacity of the resolution cache
    /// Default: 1000
    pub cache_capacity: usize,

    /// Longest token accepted as a host name; longer tokens are skipped
    /// Default: 1024
    pub max_name_length: usize,

    /// Upper bound of the random delay before each resolver task starts
    /// Default: 100 microseconds
    #[serde(skip)]
    pub jitter: Duration,

    /// Optional limit on a single external lookup
    /// Default: none
    #[serde(skip)]
    pub resolve_timeout: Option<Duration>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_producers: DEFAULT_MAX_PRODUCERS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            jitter: DEFAULT_JITTER,
            resolve_timeout: None,
        }
    }
}

impl LookupConfig {
    /// Set the queue admission capacity, clamped to 1-10000.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.clamp(1, 10_000);
        self
    }

    /// Set the producer concurrency, clamped to 1-100.
    pub fn with_max_producers(mut self, producers: usize) -> Self {
        self.max_producers = producers.clamp(1, 100);
        self
    }

    /// Set the cache pre-sizing hint, clamped to 1-1000000.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.clamp(1, MAX_CACHE_CAPACITY);
        self
    }

    /// Set the longest accepted host name. Zero is bumped to one.
    pub fn with_max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = length.max(1);
        self
    }

    /// Set the resolver start-up jitter.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set a per-lookup timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = Some(timeout);
        self
    }
}

/// How an entry's address was obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Resolution {
    /// Not looked at by a resolver yet
    #[serde(rename = "pending")]
    Pending,

    /// Address copied from the resolution cache
    #[serde(rename = "cached")]
    Cached,

    /// Address returned by the external resolver
    #[serde(rename = "resolved")]
    Resolved,

    /// The external resolver failed; address stays empty
    #[serde(rename = "failed")]
    Failed,
}

impl Resolution {
    /// Whether a resolver has finished with this entry.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Resolution::Pending)
    }
}

/// One distinct host name under resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The host name, unique within a work queue
    pub name: String,

    /// Number of times the name was seen across all input files
    pub count: usize,

    /// Resolved address; empty until resolved and when resolution failed
    pub address: String,

    /// Where the address came from
    pub resolution: Resolution,
}

impl Entry {
    /// A freshly sighted name: count one, no address.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            count: 1,
            address: String::new(),
            resolution: Resolution::Pending,
        }
    }
}

/// What `enqueue` did with a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; a new entry was appended at the tail
    Inserted,

    /// Already present; the existing entry's count is now this value
    Incremented(usize),
}

/// Coordinator phases, in the order a run goes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Ingesting,
    Resolving,
    Reporting,
    Done,
}

/// One line of the final report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReportLine {
    pub count: usize,
    pub name: String,
    pub address: String,
}

impl From<&Entry> for ReportLine {
    fn from(entry: &Entry) -> Self {
        Self {
            count: entry.count,
            name: entry.name.clone(),
            address: entry.address.clone(),
        }
    }
}

/// Output format for the report file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `<count>, <name>, <address>` per line
    #[default]
    #[serde(rename = "text")]
    Text,

    /// Pretty-printed JSON array of report lines
    #[serde(rename = "json")]
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format '{}', use text or json", other)),
        }
    }
}

impl std::fmt::Display for ReportLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.count, self.name, self.address)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Pending => write!(f, "pending"),
            Resolution::Cached => write!(f, "cached"),
            Resolution::Resolved => write!(f, "resolved"),
            Resolution::Failed => write!(f, "failed"),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::Ingesting => write!(f, "ingesting"),
            Phase::Resolving => write!(f, "resolving"),
            Phase::Reporting => write!(f, "reporting"),
            Phase::Done => write!(f, "done"),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_clamping() {
        let config = LookupConfig::default()
            .with_queue_capacity(0)
            .with_max_producers(500)
            .with_max_name_length(0);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.max_producers, 100);
        assert_eq!(config.max_name_length, 1);
    }

    #[test]
    fn test_cache_capacity_clamped() {
        let config = LookupConfig::default().with_cache_capacity(usize::MAX / 4);
        assert_eq!(config.cache_capacity, MAX_CACHE_CAPACITY);

        let config = LookupConfig::default().with_cache_capacity(0);
        assert_eq!(config.cache_capacity, 1);
    }

    #[test]
    fn test_report_line_display_keeps_empty_address() {
        let line = ReportLine {
            count: 1,
            name: "host3".to_string(),
            address: String::new(),
        };
        assert_eq!(line.to_string(), "1, host3, ");
    }

    #[test]
    fn test_report_format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(Phase::Init < Phase::Ingesting);
        assert!(Phase::Resolving < Phase::Reporting);
        assert!(Phase::Reporting < Phase::Done);
    }
}
