//! Trait seams for EngageKit.
//!
//! This module defines the interfaces that storage adapters and the host
//! application implement to integrate with the analytics engine. The event
//! log and summary store hold this subsystem's own persisted state; the
//! identity and catalog providers are external collaborators and are only
//! ever read.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::summary::{AggregateSummary, DailyBucket, SummaryDelta};
use crate::types::{ActorInfo, EngagementEvent, EntityRef, EventKind, PerKind, RelationshipCounts};

/// Sort order for event queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrdering {
    /// Oldest events first.
    #[default]
    Ascending,
    /// Newest events first.
    Descending,
}

/// Query parameters for reading back raw engagement events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to events on this entity.
    pub entity: Option<EntityRef>,

    /// Restrict to one event kind.
    pub kind: Option<EventKind>,

    /// Only events at or after this instant.
    pub start_time: Option<DateTime<Utc>>,

    /// Only events at or before this instant.
    pub end_time: Option<DateTime<Utc>>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,

    /// Sort order for results.
    pub ordering: EventOrdering,
}

impl EventFilter {
    /// Creates a filter scoped to one entity.
    pub fn for_entity(entity: EntityRef) -> Self {
        Self {
            entity: Some(entity),
            ..Default::default()
        }
    }

    /// Restricts the filter to one event kind.
    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Caps the number of returned events.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns newest events first.
    pub fn newest_first(mut self) -> Self {
        self.ordering = EventOrdering::Descending;
        self
    }
}

/// Trait for the append-only raw event log.
///
/// Events are immutable once appended; there is no update or delete
/// surface. The log is the source of truth from which aggregate state can,
/// in principle, be rebuilt.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends an event and returns its id.
    async fn append(&self, event: &EngagementEvent) -> AnalyticsResult<String>;

    /// Finds the most recent view event by `actor_id` on `entity` at or
    /// after `since`. Used by the recorder's view-deduplication probe.
    async fn find_recent_view(
        &self,
        actor_id: &str,
        entity: &EntityRef,
        since: DateTime<Utc>,
    ) -> AnalyticsResult<Option<EngagementEvent>>;

    /// Reads back events matching a filter.
    async fn query(&self, filter: EventFilter) -> AnalyticsResult<Vec<EngagementEvent>>;
}

/// Trait for the mutable per-entity aggregate summary store.
///
/// `apply` must be atomic per entity: the store serializes concurrent
/// deltas for the same entity so an interleaved increment is never lost to
/// a full-document overwrite. The engine only ever hands the store
/// declarative deltas; it never performs the read-modify-write itself.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Gets the summary for an entity. `Ok(None)` means no analytics yet,
    /// which is a valid zero-state.
    async fn get(&self, entity: &EntityRef) -> AnalyticsResult<Option<AggregateSummary>>;

    /// Applies one delta atomically and returns the updated summary.
    /// Creates the summary lazily if the entity has none.
    async fn apply(
        &self,
        entity: &EntityRef,
        delta: SummaryDelta,
    ) -> AnalyticsResult<AggregateSummary>;

    /// Whether this store can answer range queries server-side. Checked
    /// once at engine construction to select the range-query strategy.
    fn supports_range_queries(&self) -> bool {
        false
    }

    /// Returns the daily series for an entity clipped to
    /// `[start, end]` inclusive, date-sorted. Only meaningful when
    /// [`supports_range_queries`](Self::supports_range_queries) is true.
    async fn series_range(
        &self,
        _entity: &EntityRef,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> AnalyticsResult<PerKind<Vec<DailyBucket>>> {
        Err(AnalyticsError::RangeQueriesUnsupported)
    }
}

/// Trait for resolving actor identity (external collaborator, read-only).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Looks up the current display info for an actor.
    ///
    /// `Ok(None)` means the account is unknown; ranked lists drop such
    /// actors rather than fabricating placeholders. A provider that wants
    /// a degraded "unknown user" display returns `Some` with placeholder
    /// info instead.
    async fn lookup_actor(&self, actor_id: &str) -> AnalyticsResult<Option<ActorInfo>>;

    /// Reads follower/following totals from the profile document.
    async fn relationship_counts(
        &self,
        _profile_id: &str,
    ) -> AnalyticsResult<Option<RelationshipCounts>> {
        Ok(None)
    }
}

/// Trait for resolving content ownership (external collaborator, read-only).
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Lists the ids of every content item owned by `owner_id`.
    async fn items_owned_by(&self, owner_id: &str) -> AnalyticsResult<Vec<String>>;
}
