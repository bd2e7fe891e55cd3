//! # Batch Allocation
//!
//! Hands out randomized batches of pending contacts. Every shuffle is a
//! Fisher-Yates shuffle (`SliceRandom::shuffle`), which makes each permutation
//! equally likely; sorting with a random comparator is not uniform and must
//! not be used here.

use crate::constants::system;
use crate::models::{Batch, ContactRecord, RowAddress, RowKey};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// How pending contacts are split into batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Shuffle once per session, then serve consecutive non-overlapping
    /// slices of `batch_size`
    SessionShuffle { batch_size: usize },
    /// The whole pending set as one shuffled batch
    AlwaysAll,
}

impl AllocationPolicy {
    pub fn session_shuffle(batch_size: usize) -> Self {
        Self::SessionShuffle { batch_size }
    }

    /// Maximum batch length, `None` when unbounded
    pub fn batch_width(&self) -> Option<usize> {
        match self {
            Self::SessionShuffle { batch_size } => Some(*batch_size),
            Self::AlwaysAll => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionShuffle { .. } => "session_shuffle",
            Self::AlwaysAll => "always_all",
        }
    }
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self::SessionShuffle {
            batch_size: system::DEFAULT_BATCH_SIZE,
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionShuffle { batch_size } => write!(f, "session_shuffle({batch_size})"),
            Self::AlwaysAll => write!(f, "always_all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchAllocator {
    policy: AllocationPolicy,
}

impl BatchAllocator {
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Uniform in-place shuffle
    pub fn shuffle<R: Rng + ?Sized>(&self, records: &mut [ContactRecord], rng: &mut R) {
        records.shuffle(rng);
    }

    /// One-shot allocation: shuffle the full pending sequence, then take the
    /// first slice allowed by the policy. Fewer than a full width (down to
    /// zero) are returned when that is all that remains.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        mut pending: Vec<ContactRecord>,
        sequence: u32,
        rng: &mut R,
    ) -> Batch {
        self.shuffle(&mut pending, rng);
        if let Some(width) = self.policy.batch_width() {
            pending.truncate(width);
        }
        debug!(policy = %self.policy, sequence, size = pending.len(), "Allocated batch");
        Batch::new(sequence, pending)
    }
}

/// Per-session shuffled order of pending contacts.
///
/// The first fill shuffles the whole pending set. Later fills keep that
/// order, drop contacts that are no longer pending, and append newly
/// appeared ones in a fresh shuffle. A contact is never served twice.
#[derive(Debug, Clone, Default)]
pub struct SessionQueue {
    order: Vec<RowKey>,
    served: HashSet<RowKey>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unserved contacts currently queued
    pub fn remaining(&self) -> usize {
        self.order.len()
    }

    pub fn served(&self) -> usize {
        self.served.len()
    }

    /// Reconcile against a fresh pending set and take the next batch.
    ///
    /// `exclude` lists addresses the session has completed locally; they are
    /// skipped even if the fresh read still shows them as pending.
    pub fn next_batch<R: Rng + ?Sized>(
        &mut self,
        allocator: &BatchAllocator,
        fresh_pending: Vec<ContactRecord>,
        exclude: &HashSet<RowAddress>,
        sequence: u32,
        rng: &mut R,
    ) -> Batch {
        let mut available: HashMap<RowKey, ContactRecord> = fresh_pending
            .into_iter()
            .filter(|r| !exclude.contains(&r.row_address))
            .map(|r| (r.key(), r))
            .collect();

        let known: HashSet<&RowKey> = self.order.iter().collect();
        let mut arrivals: Vec<RowKey> = available
            .keys()
            .filter(|k| !known.contains(k) && !self.served.contains(*k))
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; sort first so a seeded rng
        // reproduces the same order
        arrivals.sort_by(|a, b| {
            a.row_address
                .cmp(&b.row_address)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        arrivals.shuffle(rng);
        self.order.extend(arrivals);

        self.order.retain(|k| available.contains_key(k));

        let width = allocator.policy().batch_width().unwrap_or(self.order.len());
        let take = width.min(self.order.len());
        let records: Vec<ContactRecord> = self
            .order
            .drain(..take)
            .filter_map(|key| {
                let record = available.remove(&key)?;
                self.served.insert(key);
                Some(record)
            })
            .collect();

        debug!(
            sequence,
            size = records.len(),
            remaining = self.order.len(),
            served = self.served.len(),
            "Sliced session batch"
        );
        Batch::new(sequence, records)
    }
}
