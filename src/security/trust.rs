//! Caller trust registry.
//!
//! # Responsibilities
//! - Hold the fixed set of trusted caller identities
//! - Answer trust queries by exact string equality
//! - Count successful validations per identity
//! - Carry the admission policy for untrusted callers
//!
//! # Design Decisions
//! - Trusted set is immutable after construction (no lock needed to read)
//! - Counters live in a `DashMap`; increment-or-insert happens under the
//!   shard lock of the key, so concurrent validations never lose updates
//! - Counters are never decremented

use std::collections::{BTreeMap, HashSet};

use dashmap::DashMap;

use crate::config::TrustConfig;
use crate::observability::metrics;
use crate::security::identity::CallerIdentity;

/// Authority deciding whether a caller identity is known-good.
#[derive(Debug)]
pub struct TrustRegistry {
    trusted: HashSet<String>,
    counts: DashMap<String, u64>,
    admit_on_untrusted: bool,
}

impl TrustRegistry {
    /// Create a registry over a fixed set of trusted identities.
    pub fn new<I, S>(trusted: I, admit_on_untrusted: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trusted: trusted.into_iter().map(Into::into).collect(),
            counts: DashMap::new(),
            admit_on_untrusted,
        }
    }

    pub fn from_config(config: &TrustConfig) -> Self {
        Self::new(
            config.trusted_services.iter().cloned(),
            config.admit_on_untrusted,
        )
    }

    /// Check whether `id` is trusted. A trusted result increments its counter.
    pub fn is_trusted(&self, id: &CallerIdentity) -> bool {
        if id.as_str().is_empty() {
            tracing::warn!("No caller identity provided");
            metrics::record_validation(false);
            return false;
        }

        let trusted = self.trusted.contains(id.as_str());
        if trusted {
            *self.counts.entry(id.as_str().to_owned()).or_insert(0) += 1;
            tracing::info!(caller = %id, "Caller identity validated");
        } else {
            tracing::warn!(caller = %id, "Untrusted caller identity");
        }

        metrics::record_validation(trusted);
        trusted
    }

    /// Whether a request whose validation returned `validated` may be forwarded.
    pub fn admits(&self, validated: bool) -> bool {
        validated || self.admit_on_untrusted
    }

    pub fn admit_on_untrusted(&self) -> bool {
        self.admit_on_untrusted
    }

    /// Successful validations recorded for `id` so far.
    pub fn count(&self, id: &str) -> u64 {
        self.counts.get(id).map(|c| *c.value()).unwrap_or(0)
    }

    /// Snapshot of all counters, ordered by identity.
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn trusted_services(&self) -> impl Iterator<Item = &str> {
        self.trusted.iter().map(String::as_str)
    }
}

impl Default for TrustRegistry {
    fn default() -> Self {
        Self::from_config(&TrustConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn known_services_are_trusted() {
        let registry = TrustRegistry::default();
        assert!(registry.is_trusted(&"order-bff".into()));
        assert!(registry.is_trusted(&"user-bff".into()));
        assert!(registry.is_trusted(&"security-middleware".into()));
        assert!(!registry.is_trusted(&"random-service".into()));
        assert!(!registry.is_trusted(&CallerIdentity::unknown()));
    }

    #[test]
    fn match_is_exact() {
        let registry = TrustRegistry::default();
        assert!(!registry.is_trusted(&"Order-BFF".into()));
        assert!(!registry.is_trusted(&"order-bff ".into()));
        assert!(!registry.is_trusted(&"".into()));
    }

    #[test]
    fn only_trusted_results_are_counted() {
        let registry = TrustRegistry::default();
        registry.is_trusted(&"order-bff".into());
        registry.is_trusted(&"order-bff".into());
        registry.is_trusted(&"random-service".into());

        assert_eq!(registry.count("order-bff"), 2);
        assert_eq!(registry.count("random-service"), 0);

        let counts = registry.counts();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["order-bff"], 2);
    }

    #[test]
    fn concurrent_validations_sum_exactly() {
        let registry = Arc::new(TrustRegistry::default());
        let threads = 8;
        let per_thread = 1_000;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    let id = CallerIdentity::new("order-bff");
                    for _ in 0..per_thread {
                        assert!(registry.is_trusted(&id));
                    }
                });
            }
        });

        assert_eq!(registry.count("order-bff"), (threads * per_thread) as u64);
    }

    #[test]
    fn admission_policy() {
        let open = TrustRegistry::new(["a"], true);
        assert!(open.admits(true));
        assert!(open.admits(false));

        let closed = TrustRegistry::new(["a"], false);
        assert!(closed.admits(true));
        assert!(!closed.admits(false));
    }
}
