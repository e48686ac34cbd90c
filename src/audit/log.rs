//! In-memory audit log.
//!
//! # Responsibilities
//! - Append entries in completion order
//! - Return the most recent N entries, oldest of the window first
//! - Emit one structured log event per entry
//!
//! # Design Decisions
//! - A single `RwLock` around a `VecDeque` makes each append atomic and
//!   visible to every later read
//! - Unbounded unless `max_entries` is configured; a bounded log evicts
//!   the oldest entries first

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use crate::audit::entry::{AuditEntry, AuditResult};
use crate::config::AuditConfig;
use crate::observability::metrics;

/// Append-only ledger of request outcomes.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    max_entries: Option<usize>,
}

impl AuditLog {
    /// Create an unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log retaining at most `max_entries` entries.
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries: Some(max_entries.max(1)),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        match config.max_entries {
            Some(max) => Self::bounded(max),
            None => Self::new(),
        }
    }

    /// Record an entry.
    pub fn append(&self, entry: AuditEntry) {
        match entry.result {
            AuditResult::Allowed => tracing::info!(
                request_id = %entry.request_id,
                result = entry.result.as_str(),
                service = %entry.caller_service,
                method = %entry.method,
                endpoint = %entry.endpoint,
                protocol = %entry.protocol_type,
                duration_ms = entry.duration_ms,
                "Request audited"
            ),
            AuditResult::Error | AuditResult::Denied => tracing::warn!(
                request_id = %entry.request_id,
                result = entry.result.as_str(),
                service = %entry.caller_service,
                method = %entry.method,
                endpoint = %entry.endpoint,
                protocol = %entry.protocol_type,
                error = entry.error_message.as_deref().unwrap_or_default(),
                "Request audited"
            ),
        }

        let len = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(max) = self.max_entries {
                while entries.len() >= max {
                    entries.pop_front();
                }
            }
            entries.push_back(entry);
            entries.len()
        };
        metrics::record_audit_size(len);
    }

    /// Up to the last `limit` entries, in append order.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let start = entries.len().saturating_sub(limit);
        entries.range(start..).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }
}
