//! Aggregate summaries: the mutable, incrementally-updated derived state
//! kept per entity.
//!
//! One [`AggregateSummary`] document exists per `(entity id, entity kind)`
//! pair. It is created lazily on the first event for an entity and updated
//! on every subsequent event; it is never deleted. Two invariants hold
//! after every update:
//!
//! - `totals[k] == sum(daily[k].count)` for every event kind `k`
//! - `unique_counts[k] == |unique_actors[k]| <= totals[k]`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{EntityRef, EventKind, PerKind};

/// One calendar day's event count within a daily series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyBucket {
    /// The calendar day (UTC).
    pub date: NaiveDate,
    /// Number of events on that day.
    pub count: u64,
}

/// A single incremental update to an aggregate summary.
///
/// The event recorder derives one delta per accepted event and hands it to
/// the summary store, which applies it atomically for the target entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDelta {
    /// The kind of event being counted.
    pub kind: EventKind,
    /// The acting user, if the event was not anonymous.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// The calendar day (UTC) of the event.
    pub date: NaiveDate,
}

impl SummaryDelta {
    /// Creates a delta for one event.
    pub fn new(kind: EventKind, actor_id: Option<String>, date: NaiveDate) -> Self {
        Self {
            kind,
            actor_id,
            date,
        }
    }

    /// Derives the delta for an event occurring now.
    pub fn for_today(kind: EventKind, actor_id: Option<String>) -> Self {
        Self::new(kind, actor_id, Utc::now().date_naive())
    }
}

/// The derived counters, unique-actor sets, and daily series for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// The entity this summary belongs to.
    pub entity: EntityRef,

    /// Running totals per event kind.
    #[serde(default)]
    pub totals: PerKind<u64>,

    /// Ids of every actor who has produced each kind of event on this
    /// entity. Ordered sets keep the serialized document deterministic.
    #[serde(default)]
    pub unique_actors: PerKind<BTreeSet<String>>,

    /// Derived sizes of the unique-actor sets.
    #[serde(default)]
    pub unique_counts: PerKind<u64>,

    /// Daily series per event kind. Writers append without sorting;
    /// readers sort. Duplicate dates never coexist within one series.
    #[serde(default)]
    pub daily: PerKind<Vec<DailyBucket>>,

    /// When this summary was last updated.
    pub last_updated: DateTime<Utc>,
}

impl AggregateSummary {
    /// Creates the zero-state summary for an entity.
    ///
    /// A missing summary is equivalent to this: "no analytics yet" is a
    /// valid state, not an error.
    pub fn empty(entity: EntityRef) -> Self {
        Self {
            entity,
            totals: PerKind::default(),
            unique_actors: PerKind::default(),
            unique_counts: PerKind::default(),
            daily: PerKind::default(),
            last_updated: Utc::now(),
        }
    }

    /// Applies one incremental update in place.
    ///
    /// Increments the kind's total, records the actor in the unique set
    /// (bumping the derived count only when the actor is new), and upserts
    /// the daily bucket for the delta's date. Callers are responsible for
    /// serializing concurrent applications to the same entity; the summary
    /// store owns that contract.
    pub fn apply_delta(&mut self, delta: &SummaryDelta) {
        *self.totals.get_mut(delta.kind) += 1;

        if let Some(actor_id) = &delta.actor_id {
            let actors = self.unique_actors.get_mut(delta.kind);
            if actors.insert(actor_id.clone()) {
                *self.unique_counts.get_mut(delta.kind) += 1;
            }
        }

        let series = self.daily.get_mut(delta.kind);
        match series.iter_mut().find(|bucket| bucket.date == delta.date) {
            Some(bucket) => bucket.count += 1,
            None => series.push(DailyBucket {
                date: delta.date,
                count: 1,
            }),
        }

        self.last_updated = Utc::now();
    }

    /// Returns the daily series for a kind, sorted by date ascending.
    pub fn daily_sorted(&self, kind: EventKind) -> Vec<DailyBucket> {
        let mut series = self.daily.get(kind).clone();
        series.sort_by_key(|bucket| bucket.date);
        series
    }

    /// Returns every daily series sorted by date ascending.
    pub fn daily_sorted_all(&self) -> PerKind<Vec<DailyBucket>> {
        self.daily.map(|kind, _| self.daily_sorted(kind))
    }
}
