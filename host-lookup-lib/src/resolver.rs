//! Host name resolution: the external resolver seam and the per-entry task.
//!
//! [`HostResolver`] is the name-to-address primitive the pipeline calls.
//! [`SystemResolver`] asks the operating system; [`StaticResolver`] answers
//! from a fixed table (hosts-file layout), which keeps runs reproducible.
//!
//! [`Resolver`] is the logic run once per queue entry: wait a little,
//! check the cache, fall back to the external resolver, then write the
//! outcome back into the entry and, on success, into the cache.

use crate::cache::ResolutionCache;
use crate::error::LookupError;
use crate::queue::{EntryHandle, WorkQueue};
use crate::types::Resolution;
use futures::future::BoxFuture;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// External name-to-address lookup.
///
/// Implementations must be safe to call from many resolver tasks at once.
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to a printable address.
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<String, LookupError>>;
}

/// Resolver backed by the operating system (`getaddrinfo` via tokio).
#[derive(Debug, Clone, Default)]
pub struct SystemResolver {
    timeout: Option<Duration>,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on a single lookup after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    async fn lookup(host: &str) -> Result<String, LookupError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| LookupError::resolution(host, e.to_string()))?
            .collect();

        pick_address(&addrs).ok_or_else(|| LookupError::resolution(host, "no addresses returned"))
    }
}

/// First IPv4 address if there is one, otherwise the first address.
fn pick_address(addrs: &[SocketAddr]) -> Option<String> {
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .map(|addr| addr.ip().to_string())
}

impl HostResolver for SystemResolver {
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<String, LookupError>> {
        Box::pin(async move {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, Self::lookup(host))
                    .await
                    .map_err(|_| LookupError::timeout(format!("lookup of {}", host), limit))?,
                None => Self::lookup(host).await,
            }
        })
    }
}

/// Resolver that answers from a fixed name-to-address table.
///
/// Names missing from the table fail. Every call is counted, which makes
/// it easy to check how often the pipeline actually went to the resolver.
#[derive(Debug, Default)]
pub struct StaticResolver {
    table: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one mapping.
    pub fn with_entry<N: Into<String>, A: Into<String>>(mut self, name: N, address: A) -> Self {
        self.table.insert(name.into(), address.into());
        self
    }

    /// Parse hosts-file text: `<address> <name> [<name>...]` per line.
    ///
    /// `#` starts a comment. When a name appears twice the first mapping
    /// wins, as in `/etc/hosts`.
    pub fn from_hosts_str(content: &str) -> Self {
        let mut table = HashMap::new();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let mut fields = line.split_whitespace();
            let Some(address) = fields.next() else {
                continue;
            };
            for name in fields {
                table
                    .entry(name.to_string())
                    .or_insert_with(|| address.to_string());
            }
        }

        Self {
            table,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Load a hosts-file from disk.
    pub fn from_hosts_file<P: AsRef<Path>>(path: P) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::config(format!(
                "Failed to read hosts file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_hosts_str(&content))
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// How many times `resolve` has been called.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl HostResolver for StaticResolver {
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<String, LookupError>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .table
            .get(host)
            .cloned()
            .ok_or_else(|| LookupError::resolution(host, "name not in hosts table"));
        Box::pin(async move { answer })
    }
}

/// Per-entry resolution logic shared by all resolver tasks of a run.
#[derive(Clone)]
pub struct Resolver {
    cache: Arc<ResolutionCache>,
    backend: Arc<dyn HostResolver>,
    jitter: Duration,
}

impl Resolver {
    pub fn new(cache: Arc<ResolutionCache>, backend: Arc<dyn HostResolver>) -> Self {
        Self {
            cache,
            backend,
            jitter: Duration::ZERO,
        }
    }

    /// Sleep a random time up to `jitter` before each resolution.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    async fn stagger(&self) {
        if self.jitter.is_zero() {
            return;
        }
        let max = u64::try_from(self.jitter.as_micros()).unwrap_or(u64::MAX);
        let micros = rand::thread_rng().gen_range(0..=max);
        tokio::time::sleep(Duration::from_micros(micros)).await;
    }

    /// Resolve one name through the cache, then the external resolver.
    ///
    /// Returns the terminal state and the address to store; the address is
    /// empty exactly when the state is `Failed`.
    pub async fn resolve_name(&self, name: &str) -> (Resolution, String) {
        if let Some(address) = self.cache.get(name) {
            debug!("{} already in cache as {}", name, address);
            return (Resolution::Cached, address);
        }

        match self.backend.resolve(name).await {
            Ok(address) => {
                debug!("{} resolved to {}", name, address);
                self.cache.put(name, &address);
                (Resolution::Resolved, address)
            }
            Err(e) => {
                warn!("{}", e);
                (Resolution::Failed, String::new())
            }
        }
    }

    /// Resolve the entry behind `handle` and record the result in `queue`.
    pub async fn resolve_entry(&self, queue: &WorkQueue, handle: &EntryHandle) -> Resolution {
        self.stagger().await;
        let (resolution, address) = self.resolve_name(handle.name()).await;
        queue.record(handle, address, resolution);
        resolution
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cached", &self.cache.len())
            .field("jitter", &self.jitter)
            .finish()
    }
}
