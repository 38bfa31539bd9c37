//! The coordinator that drives a lookup run.
//!
//! A run goes through fixed phases:
//!
//! 1. **Init**: build an empty work queue and cache.
//! 2. **Ingesting**: one producer task per input file, at most
//!    `max_producers` at a time. The phase ends when every producer has
//!    finished, so the queue is stable before anything walks it.
//! 3. **Resolving**: one resolver task per queue entry, all joined.
//! 4. **Reporting**: walk the queue head to tail into report lines.
//! 5. **Done**.

use crate::cache::ResolutionCache;
use crate::error::LookupError;
use crate::producer::{produce, ProducerStats};
use crate::queue::WorkQueue;
use crate::report::{Report, RunSummary};
use crate::resolver::{HostResolver, Resolver, SystemResolver};
use crate::types::{LookupConfig, Phase, Resolution};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Main entry point: resolves every host name found in a set of files.
///
/// # Example
///
/// ```rust,no_run
/// use host_lookup_lib::{LookupConfig, Pipeline};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pipeline = Pipeline::with_config(LookupConfig::default().with_max_producers(4));
///     let report = pipeline.run(&["names1.txt", "names2.txt"]).await?;
///
///     for line in &report.lines {
///         println!("{}", line);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    /// Configuration settings for this pipeline
    config: LookupConfig,
    /// External name-to-address lookup
    resolver: Arc<dyn HostResolver>,
}

impl Pipeline {
    /// Create a pipeline with default configuration and the system resolver.
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    /// Create a pipeline with custom configuration and the system resolver.
    ///
    /// The resolver honours `config.resolve_timeout` when it is set.
    pub fn with_config(config: LookupConfig) -> Self {
        let resolver = match config.resolve_timeout {
            Some(timeout) => SystemResolver::with_timeout(timeout),
            None => SystemResolver::new(),
        };
        Self {
            config,
            resolver: Arc::new(resolver),
        }
    }

    /// Replace the external resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Get the current configuration for this pipeline.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Run the pipeline over `inputs` with a fresh cache.
    ///
    /// Unreadable input files are logged and skipped and failed lookups end
    /// up as empty addresses; neither stops the run.
    pub async fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Report, LookupError> {
        let cache = Arc::new(ResolutionCache::with_capacity(self.config.cache_capacity));
        self.run_with_cache(inputs, cache).await
    }

    /// Run the pipeline over `inputs` using the caller's cache.
    pub async fn run_with_cache<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        cache: Arc<ResolutionCache>,
    ) -> Result<Report, LookupError> {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        enter(Phase::Init);
        let queue = Arc::new(
            WorkQueue::new(self.config.queue_capacity)
                .with_max_name_length(self.config.max_name_length),
        );

        enter(Phase::Ingesting);
        let paths: Vec<PathBuf> = inputs.iter().map(|p| p.as_ref().to_path_buf()).collect();
        self.ingest(paths, &queue, &mut summary).await;
        info!(
            "Ingested {} names ({} distinct) from {} files",
            summary.tokens,
            queue.len(),
            summary.files_read
        );

        enter(Phase::Resolving);
        self.resolve_all(&queue, cache, &mut summary).await;

        enter(Phase::Reporting);
        let lines = queue.report_lines();
        summary.distinct = lines.len();
        summary.elapsed = started.elapsed();

        enter(Phase::Done);
        Ok(Report { lines, summary })
    }

    /// Run all producers and wait for every one of them.
    async fn ingest(&self, paths: Vec<PathBuf>, queue: &Arc<WorkQueue>, summary: &mut RunSummary) {
        let max_name_length = self.config.max_name_length;

        let producers = paths.into_iter().map(|path| {
            let queue = Arc::clone(queue);
            let task_path = path.clone();
            let handle =
                tokio::spawn(async move { produce(&task_path, &queue, max_name_length).await });
            async move { (path, handle.await) }
        });

        let mut finished = stream::iter(producers).buffer_unordered(self.config.max_producers);

        while let Some((path, outcome)) = finished.next().await {
            match outcome {
                Ok(Ok(ProducerStats {
                    tokens, rejected, ..
                })) => {
                    summary.files_read += 1;
                    summary.tokens += tokens;
                    summary.rejected += rejected;
                }
                Ok(Err(e)) => {
                    warn!("Skipping input: {}", e);
                    summary.files_skipped += 1;
                }
                Err(join_error) => {
                    let e = LookupError::from(join_error);
                    warn!("Producer for '{}' died: {}", path.display(), e);
                    summary.files_skipped += 1;
                }
            }
        }
    }

    /// Spawn one resolver per entry and join them all.
    async fn resolve_all(
        &self,
        queue: &Arc<WorkQueue>,
        cache: Arc<ResolutionCache>,
        summary: &mut RunSummary,
    ) {
        let resolver =
            Resolver::new(cache, Arc::clone(&self.resolver)).with_jitter(self.config.jitter);

        let mut tasks = JoinSet::new();
        for handle in queue.snapshot() {
            let resolver = resolver.clone();
            let queue = Arc::clone(queue);
            tasks.spawn(async move { resolver.resolve_entry(&queue, &handle).await });
        }
        debug!("Spawned {} resolver tasks", tasks.len());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Resolution::Cached) => summary.cached += 1,
                Ok(Resolution::Resolved) => summary.resolved += 1,
                Ok(Resolution::Failed) | Ok(Resolution::Pending) => summary.failed += 1,
                Err(join_error) => {
                    // The entry keeps its empty address.
                    warn!("Resolver task died: {}", LookupError::from(join_error));
                    summary.failed += 1;
                }
            }
        }
    }
}

fn enter(phase: Phase) {
    debug!("Pipeline phase: {}", phase);
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
