//! Shared job-status registry.
//!
//! An explicitly owned, lockable store mapping job ids to their current
//! phase. Entries are overwritten at every phase transition and evicted only
//! by TTL pruning, so a failed job keeps the phase it last reached.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

/// Phase a job is currently in.
///
/// Phases advance in a fixed order:
/// `Starting → Planning → Architecting → Coding step k/N → DONE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    Starting,
    Planning,
    Architecting,
    Coding { step: usize, total: usize },
    Done,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Starting => write!(f, "Starting"),
            JobPhase::Planning => write!(f, "Planning"),
            JobPhase::Architecting => write!(f, "Architecting"),
            JobPhase::Coding { step, total } => write!(f, "Coding step {step} / {total}"),
            JobPhase::Done => write!(f, "DONE"),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    phase: JobPhase,
    updated_at: Instant,
}

/// Lockable job-id → phase map with TTL-based eviction.
#[derive(Debug)]
pub struct JobRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl JobRegistry {
    /// Create a registry evicting entries untouched for longer than `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Record the current phase for a job, overwriting any previous phase.
    ///
    /// Also prunes expired entries, so long-lived registries stay bounded
    /// even without a periodic prune task.
    pub fn set(&self, job_id: &str, phase: JobPhase) {
        debug!(job_id, phase = %phase, "job phase transition");
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.updated_at) < self.ttl);
        entries.insert(
            job_id.to_string(),
            Entry {
                phase,
                updated_at: now,
            },
        );
    }

    /// Current phase for a job, if known.
    pub fn get(&self, job_id: &str) -> Option<JobPhase> {
        let entries = self.entries.read().expect("registry lock poisoned");
        entries.get(job_id).map(|entry| entry.phase.clone())
    }

    /// Human-readable status string for a job, if known.
    pub fn status(&self, job_id: &str) -> Option<String> {
        self.get(job_id).map(|phase| phase.to_string())
    }

    /// Evict entries untouched for longer than the TTL. Returns the count
    /// of evicted entries.
    pub fn prune_expired(&self) -> usize {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.updated_at) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "pruned expired registry entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
