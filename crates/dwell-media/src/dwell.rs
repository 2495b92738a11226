//! Per-identity dwell accounting.
//!
//! The ledger remembers when each track identity was first and last observed.
//! Records are never removed during a session: an identity that stops
//! appearing keeps its frozen duration, and an identity the oracle drops and
//! later re-issues under a new id starts from zero.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use dwell_models::TrackId;

/// First/last observation times for one track identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellRecord {
    /// Timestamp of the first observation. Never changes.
    pub first_seen: Duration,
    /// Timestamp of the most recent observation.
    pub last_seen: Duration,
}

impl DwellRecord {
    fn new(timestamp: Duration) -> Self {
        Self {
            first_seen: timestamp,
            last_seen: timestamp,
        }
    }

    /// `last_seen - first_seen`.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.last_seen.saturating_sub(self.first_seen)
    }
}

/// Mapping from track identity to its dwell record.
#[derive(Debug)]
pub struct DwellLedger {
    records: HashMap<TrackId, DwellRecord>,
    stay_threshold: Duration,
}

impl DwellLedger {
    /// Create an empty ledger with the given violation threshold.
    pub fn new(stay_threshold: Duration) -> Self {
        Self {
            records: HashMap::new(),
            stay_threshold,
        }
    }

    /// Record an observation of `track_id` at `timestamp`.
    ///
    /// Creates the record on first sight; otherwise moves `last_seen` forward.
    /// A timestamp earlier than `first_seen` is clamped so that
    /// `last_seen >= first_seen` always holds.
    pub fn observe(&mut self, track_id: TrackId, timestamp: Duration) -> DwellRecord {
        let record = self
            .records
            .entry(track_id)
            .and_modify(|r| r.last_seen = timestamp.max(r.first_seen))
            .or_insert_with(|| DwellRecord::new(timestamp));
        *record
    }

    /// Look up a record without modifying it.
    pub fn get(&self, track_id: TrackId) -> Option<&DwellRecord> {
        self.records.get(&track_id)
    }

    /// `duration >= stay_threshold`.
    pub fn is_violating(&self, record: &DwellRecord) -> bool {
        record.duration() >= self.stay_threshold
    }

    /// Configured threshold.
    pub fn stay_threshold(&self) -> Duration {
        self.stay_threshold
    }

    /// Number of identities ever observed.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Monotone set of identities that ever reached violation status.
///
/// There is deliberately no removal operation.
#[derive(Debug, Default, Clone)]
pub struct ViolationRegistry {
    members: BTreeSet<TrackId>,
}

impl ViolationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity. Returns `true` if it was not already registered.
    pub fn register(&mut self, track_id: TrackId) -> bool {
        self.members.insert(track_id)
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.members.contains(&track_id)
    }

    /// Number of distinct violating identities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registered identities in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.members.iter().copied()
    }
}
