//! Deduplicating work queue shared by producers and resolvers.
//!
//! The queue is an insertion-ordered list of [`Entry`] values that is also
//! a set keyed by host name. Producers append names concurrently; a name
//! that is already present only bumps its count. Entries are never removed
//! while the queue is alive.
//!
//! # Locking
//!
//! A single mutex guards both the ordered list and the name index, so the
//! "look for the name, then append or increment" step is one critical
//! section and two producers can never both append the same name.
//!
//! Admission is gated by a semaphore with `capacity` permits. When every
//! permit is taken the queue is full and `enqueue` waits until one is
//! released, instead of spinning or dropping the name.

use crate::error::LookupError;
use crate::types::{Admission, Entry, ReportLine, Resolution, DEFAULT_MAX_NAME_LENGTH};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Ordered entries plus an index from name to position.
#[derive(Debug, Default)]
struct QueueState {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

/// Reference to one queue entry, handed to the resolver that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHandle {
    position: usize,
    name: String,
}

impl EntryHandle {
    /// Host name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the entry in insertion order (the head is 0).
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Insertion-ordered, name-unique work queue.
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    admission: Semaphore,
    capacity: usize,
    max_name_length: usize,
}

impl WorkQueue {
    /// Create an empty queue admitting at most `capacity` enqueues at once.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState::default()),
            admission: Semaphore::new(capacity),
            capacity,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }

    /// Reject names longer than `length` bytes.
    pub fn with_max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = length.max(1);
        self
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere while holding the lock does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of distinct names in the queue.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while all admission slots are taken; `enqueue` will wait.
    ///
    /// This counts `enqueue` calls in flight, not stored entries: it does
    /// not look at `len()`, and a queue holding more names than `capacity`
    /// is not full once those calls have returned.
    pub fn is_full(&self) -> bool {
        self.admission.available_permits() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add one occurrence of `name`.
    ///
    /// The first occurrence appends a new entry at the tail; later ones
    /// increment the existing entry's count. If the queue is full this
    /// waits for a free slot, so a call is never dropped.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::InvalidHostName` for empty or over-long names.
    pub async fn enqueue(&self, name: &str) -> Result<Admission, LookupError> {
        self.validate(name)?;

        let _slot = self
            .admission
            .acquire()
            .await
            .map_err(|_| LookupError::internal("work queue admission gate closed"))?;

        Ok(self.admit(name))
    }

    fn validate(&self, name: &str) -> Result<(), LookupError> {
        if name.is_empty() {
            return Err(LookupError::invalid_host_name(name, "Host name cannot be empty"));
        }
        if name.len() > self.max_name_length {
            return Err(LookupError::invalid_host_name(
                name,
                format!("Host name longer than {} bytes", self.max_name_length),
            ));
        }
        Ok(())
    }

    /// The dedup-then-append-or-increment critical section.
    fn admit(&self, name: &str) -> Admission {
        let mut state = self.state();

        if let Some(&position) = state.index.get(name) {
            let entry = &mut state.entries[position];
            entry.count += 1;
            return Admission::Incremented(entry.count);
        }

        let position = state.entries.len();
        state.entries.push(Entry::new(name));
        state.index.insert(name.to_string(), position);
        Admission::Inserted
    }

    /// Handles to every entry, head to tail, as of this call.
    pub fn snapshot(&self) -> Vec<EntryHandle> {
        self.state()
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| EntryHandle {
                position,
                name: entry.name.clone(),
            })
            .collect()
    }

    /// Store the outcome of resolving the entry behind `handle`.
    pub fn record(&self, handle: &EntryHandle, address: String, resolution: Resolution) {
        let mut state = self.state();
        if let Some(entry) = state.entries.get_mut(handle.position) {
            debug_assert_eq!(entry.name, handle.name);
            entry.address = address;
            entry.resolution = resolution;
        }
    }

    /// Copy of the entry for `name`, if present.
    pub fn get(&self, name: &str) -> Option<Entry> {
        let state = self.state();
        state
            .index
            .get(name)
            .map(|&position| state.entries[position].clone())
    }

    /// Copy of all entries in insertion order.
    pub fn entries(&self) -> Vec<Entry> {
        self.state().entries.clone()
    }

    /// Report lines in insertion (first-seen) order.
    pub fn report_lines(&self) -> Vec<ReportLine> {
        self.state().entries.iter().map(ReportLine::from).collect()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_QUEUE_CAPACITY)
    }
}
