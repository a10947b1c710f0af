mod http;
mod redis_counts;
pub mod source;

pub use http::HttpConflictSource;
pub use redis_counts::{count_key, RedisConflictSource};
pub use source::{build_source, ConflictCount, ConflictSource, NoopConflictSource};

use crate::components::bulk_schedule::models::{GeneratedSlot, SlotPreview};
use crate::config::DEFAULT_CAPACITY_THRESHOLD;
use crate::utils::time::normalize_clock;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Zero-padded HH:MM, or the input unchanged when it is not a clock time
fn clock_key(time: &str) -> String {
    normalize_clock(time).unwrap_or_else(|| time.to_string())
}

/// Lookup key of the conflict map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: String,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            date,
            time: time.into(),
        }
    }

    /// Key of a slot, with its start time zero-padded
    pub fn for_slot(slot: &GeneratedSlot) -> Self {
        Self::new(slot.date, clock_key(&slot.start_time))
    }
}

/// Existing appointment counts for the slots of one preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictMap {
    counts: HashMap<SlotKey, u32>,
    capacity_threshold: u32,
}

impl ConflictMap {
    /// A map that knows of no appointments
    pub fn empty(capacity_threshold: u32) -> Self {
        Self {
            counts: HashMap::new(),
            capacity_threshold,
        }
    }

    pub fn capacity_threshold(&self) -> u32 {
        self.capacity_threshold
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Existing appointments at a date and time, zero when unknown
    pub fn count(&self, date: NaiveDate, time: &str) -> u32 {
        self.counts
            .get(&SlotKey::new(date, clock_key(time)))
            .copied()
            .unwrap_or(0)
    }

    pub fn count_for(&self, slot: &GeneratedSlot) -> u32 {
        self.count(slot.date, &slot.start_time)
    }

    /// Whether the slot already reached the capacity threshold
    pub fn is_full(&self, slot: &GeneratedSlot) -> bool {
        self.count_for(slot) >= self.capacity_threshold
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &u32)> {
        self.counts.iter()
    }
}

/// Checks generated slots against existing appointments
#[derive(Clone)]
pub struct ConflictChecker {
    source: Arc<dyn ConflictSource>,
    capacity_threshold: u32,
}

impl ConflictChecker {
    pub fn new(source: Arc<dyn ConflictSource>, capacity_threshold: u32) -> Self {
        Self {
            source,
            capacity_threshold,
        }
    }

    /// Checker with the default threshold of five
    pub fn with_default_threshold(source: Arc<dyn ConflictSource>) -> Self {
        Self::new(source, DEFAULT_CAPACITY_THRESHOLD)
    }

    pub fn capacity_threshold(&self) -> u32 {
        self.capacity_threshold
    }

    /// Look up existing appointment counts for the distinct slots.
    ///
    /// Issues a single query over the distinct dates and times. No query is
    /// made for an empty slice. A failing source is logged and treated as
    /// having no appointments.
    pub async fn check_conflicts(&self, slots: &[GeneratedSlot]) -> ConflictMap {
        let mut map = ConflictMap::empty(self.capacity_threshold);
        if slots.is_empty() {
            return map;
        }

        let wanted: HashSet<SlotKey> = slots.iter().map(SlotKey::for_slot).collect();
        let dates: Vec<NaiveDate> = slots
            .iter()
            .map(|s| s.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let times: Vec<String> = wanted
            .iter()
            .map(|key| key.time.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let counts = match self.source.existing_counts(&dates, &times).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(
                    "Conflict check via {} source failed, assuming no conflicts: {}",
                    self.source.name(),
                    e
                );
                return map;
            }
        };

        for entry in counts {
            let Some(time) = normalize_clock(&entry.time) else {
                debug!("Skipping conflict count with unreadable time '{}'", entry.time);
                continue;
            };
            let key = SlotKey::new(entry.date, time);
            if wanted.contains(&key) {
                let total = map.counts.entry(key).or_insert(0);
                *total = total.saturating_add(entry.count);
            }
        }

        debug!(
            "Conflict check via {} found counts for {} of {} distinct slots",
            self.source.name(),
            map.len(),
            wanted.len()
        );

        map
    }
}

/// Pair every slot with its count and full flag
pub fn annotate(slots: &[GeneratedSlot], conflicts: &ConflictMap) -> Vec<SlotPreview> {
    slots
        .iter()
        .map(|slot| SlotPreview {
            slot: slot.clone(),
            existing_count: conflicts.count_for(slot),
            is_full: conflicts.is_full(slot),
        })
        .collect()
}
