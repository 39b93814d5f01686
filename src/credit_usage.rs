//! # Credit Usage Ledger
//!
//! WorldTides bills every call in credits and reports the amount as
//! `callCount`. The client keeps a small ledger of recent charges so callers
//! can see how much of their allowance a session has consumed.
//!
//! ## Retention
//! - Entries older than the retention window (24 hours by default) are
//!   dropped whenever a new charge is recorded.
//! - At most `max_entries` timestamps are kept (1024 by default); the oldest
//!   go first.
//! - Two charges at the same instant are summed into one entry.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

const DEFAULT_RETENTION_HOURS: i64 = 24;
const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Bounded, time-ordered record of credits spent per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditUsage {
    entries: BTreeMap<DateTime<Utc>, u32>,
    retention: Duration,
    max_entries: usize,
}

impl Default for CreditUsage {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_RETENTION_HOURS), DEFAULT_MAX_ENTRIES)
    }
}

impl CreditUsage {
    pub fn new(retention: Duration, max_entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            retention,
            max_entries,
        }
    }

    /// Record `credits` spent at `at`, then apply the retention policy
    /// relative to `at`.
    pub fn record(&mut self, at: DateTime<Utc>, credits: u32) {
        let slot = self.entries.entry(at).or_insert(0);
        *slot = slot.saturating_add(credits);
        self.evict(at);
    }

    /// Sum of credits recorded at or after `cutoff`.
    pub fn total_since(&self, cutoff: DateTime<Utc>) -> u64 {
        self.entries
            .range(cutoff..)
            .map(|(_, credits)| u64::from(*credits))
            .sum()
    }

    pub fn total(&self) -> u64 {
        self.entries.values().map(|credits| u64::from(*credits)).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, u32)> + '_ {
        self.entries.iter().map(|(at, credits)| (*at, *credits))
    }

    fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now
            .checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.entries = self.entries.split_off(&cutoff);

        while self.entries.len() > self.max_entries {
            self.entries.pop_first();
        }
    }
}
