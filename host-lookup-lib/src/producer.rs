//! Producers: read host names from one input file into the work queue.
//!
//! Input is free-form text. Every whitespace-separated token is one
//! occurrence of a host name; line breaks carry no meaning. Tokens longer
//! than the configured maximum are skipped with a warning rather than
//! truncated, since a truncated name would be a different host. Tokens
//! that are not valid UTF-8 are skipped the same way; the rest of the
//! line and file is still read.

use crate::error::LookupError;
use crate::queue::WorkQueue;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// What one producer did with its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerStats {
    /// The file that was read
    pub path: PathBuf,

    /// Tokens handed to the queue
    pub tokens: usize,

    /// Tokens skipped for being too long or not UTF-8
    pub rejected: usize,
}

/// Read every token of `path` into `queue`, in file order.
///
/// # Errors
///
/// Returns `LookupError::FileError` if the file cannot be opened or an
/// I/O error interrupts reading. Names enqueued before a read error stay
/// in the queue.
pub async fn produce(
    path: &Path,
    queue: &WorkQueue,
    max_name_length: usize,
) -> Result<ProducerStats, LookupError> {
    let path_str = path.display().to_string();
    let file = File::open(path)
        .await
        .map_err(|e| LookupError::file_error(&path_str, e.to_string()))?;

    let mut stats = ProducerStats {
        path: path.to_path_buf(),
        tokens: 0,
        rejected: 0,
    };

    let mut lines = BufReader::new(file).split(b'\n');
    let mut line_num = 0usize;

    while let Some(line) = lines
        .next_segment()
        .await
        .map_err(|e| LookupError::file_error(&path_str, format!("line {}: {}", line_num + 1, e)))?
    {
        line_num += 1;

        let tokens = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty());

        for raw in tokens {
            if raw.len() > max_name_length {
                warn!(
                    "{}:{}: skipping {}-byte token (limit {})",
                    path_str,
                    line_num,
                    raw.len(),
                    max_name_length
                );
                stats.rejected += 1;
                continue;
            }

            let Ok(token) = std::str::from_utf8(raw) else {
                warn!(
                    "{}:{}: skipping non-UTF-8 token {}",
                    path_str,
                    line_num,
                    String::from_utf8_lossy(raw)
                );
                stats.rejected += 1;
                continue;
            };

            queue.enqueue(token).await?;
            stats.tokens += 1;
        }
    }

    debug!(
        "{}: {} tokens queued, {} rejected",
        path_str, stats.tokens, stats.rejected
    );
    Ok(stats)
}
