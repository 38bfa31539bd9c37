//! # Host Lookup Library
//!
//! Batch host name resolution with deduplication, occurrence counting and
//! a shared resolution cache.
//!
//! Host names are read from any number of input files by concurrent
//! producer tasks into a deduplicating [`WorkQueue`]. Once every file has
//! been read, one resolver task per distinct name consults the
//! [`ResolutionCache`] and falls back to a [`HostResolver`]. The result is
//! a [`Report`] with one `(count, name, address)` line per distinct name,
//! in the order names were first seen.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use host_lookup_lib::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = Pipeline::new().run(&["names1.txt", "names2.txt"]).await?;
//!     for line in &report.lines {
//!         println!("{}", line); // "2, example.com, 93.184.216.34"
//!     }
//!     Ok(())
//! }
//! ```

// Re-export main public API types and functions
pub use cache::ResolutionCache;
pub use config::{
    load_env_config, parse_duration_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::LookupError;
pub use pipeline::Pipeline;
pub use producer::{produce, ProducerStats};
pub use queue::{EntryHandle, WorkQueue};
pub use report::{Report, RunSummary};
pub use resolver::{HostResolver, Resolver, StaticResolver, SystemResolver};
pub use types::{
    Admission, Entry, LookupConfig, Phase, ReportFormat, ReportLine, Resolution,
    DEFAULT_CACHE_CAPACITY, DEFAULT_JITTER, DEFAULT_MAX_NAME_LENGTH, DEFAULT_MAX_PRODUCERS,
    DEFAULT_QUEUE_CAPACITY, MAX_CACHE_CAPACITY,
};

mod cache;
mod config;
mod error;
mod pipeline;
mod producer;
mod queue;
mod report;
mod resolver;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LookupError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
