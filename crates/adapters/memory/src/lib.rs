//! # EngageKit Memory Adapter
//!
//! In-memory implementations of the EngageKit storage traits, primarily
//! intended for testing and development. Data is lost when the process
//! exits.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engagekit_adapter_memory::{MemoryEventLog, MemorySummaryStore};
//!
//! let log = MemoryEventLog::new();
//! let summaries = MemorySummaryStore::new();
//! let engine = AnalyticsEngine::builder()
//!     .event_log(log)
//!     .summary_store(summaries)
//!     .build();
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use engagekit_core::error::{AnalyticsError, AnalyticsResult};
use engagekit_core::summary::{AggregateSummary, DailyBucket, SummaryDelta};
use engagekit_core::traits::{
    ContentCatalog, EventFilter, EventLog, EventOrdering, IdentityProvider, SummaryStore,
};
use engagekit_core::types::{
    ActorInfo, EngagementEvent, EntityRef, EventKind, PerKind, RelationshipCounts,
};

/// In-memory storage for a keyed collection.
type Store<T> = Arc<RwLock<HashMap<String, T>>>;

/// In-memory append-only event log.
pub struct MemoryEventLog {
    events: Arc<RwLock<Vec<EngagementEvent>>>,
}

impl MemoryEventLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns the number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clears all stored events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn append(&self, event: &EngagementEvent) -> AnalyticsResult<String> {
        let mut events = self.events.write().await;

        if events.iter().any(|e| e.id == event.id) {
            return Err(AnalyticsError::store(format!(
                "event {} already exists",
                event.id
            )));
        }

        events.push(event.clone());
        Ok(event.id.clone())
    }

    async fn find_recent_view(
        &self,
        actor_id: &str,
        entity: &EntityRef,
        since: DateTime<Utc>,
    ) -> AnalyticsResult<Option<EngagementEvent>> {
        let events = self.events.read().await;

        Ok(events
            .iter()
            .rev()
            .find(|e| {
                e.kind == EventKind::View
                    && e.actor_id.as_deref() == Some(actor_id)
                    && e.entity == *entity
                    && e.occurred_at >= since
            })
            .cloned())
    }

    async fn query(&self, filter: EventFilter) -> AnalyticsResult<Vec<EngagementEvent>> {
        let events = self.events.read().await;

        let mut matched: Vec<EngagementEvent> = events
            .iter()
            .filter(|e| {
                if let Some(entity) = &filter.entity {
                    if e.entity != *entity {
                        return false;
                    }
                }

                if let Some(kind) = filter.kind {
                    if e.kind != kind {
                        return false;
                    }
                }

                if let Some(start) = filter.start_time {
                    if e.occurred_at < start {
                        return false;
                    }
                }

                if let Some(end) = filter.end_time {
                    if e.occurred_at > end {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();

        match filter.ordering {
            EventOrdering::Ascending => matched.sort_by_key(|e| e.occurred_at),
            EventOrdering::Descending => matched.sort_by_key(|e| std::cmp::Reverse(e.occurred_at)),
        }

        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }
}

/// In-memory aggregate summary store.
///
/// `apply` holds the write lock across the whole read-modify-write, so
/// concurrent deltas for the same entity are serialized and no increment
/// is lost to a full-document overwrite.
pub struct MemorySummaryStore {
    summaries: Store<AggregateSummary>,
}

impl MemorySummaryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            summaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of summaries stored.
    pub async fn summary_count(&self) -> usize {
        self.summaries.read().await.len()
    }

    /// Clears all stored summaries.
    pub async fn clear(&self) {
        self.summaries.write().await.clear();
    }
}

impl Default for MemorySummaryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryStore for MemorySummaryStore {
    async fn get(&self, entity: &EntityRef) -> AnalyticsResult<Option<AggregateSummary>> {
        let summaries = self.summaries.read().await;
        Ok(summaries.get(&entity.storage_key()).cloned())
    }

    async fn apply(
        &self,
        entity: &EntityRef,
        delta: SummaryDelta,
    ) -> AnalyticsResult<AggregateSummary> {
        let mut summaries = self.summaries.write().await;

        let summary = summaries
            .entry(entity.storage_key())
            .or_insert_with(|| AggregateSummary::empty(entity.clone()));
        summary.apply_delta(&delta);

        Ok(summary.clone())
    }

    fn supports_range_queries(&self) -> bool {
        true
    }

    async fn series_range(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<PerKind<Vec<DailyBucket>>> {
        let summaries = self.summaries.read().await;

        let Some(summary) = summaries.get(&entity.storage_key()) else {
            return Ok(PerKind::default());
        };

        Ok(summary.daily.map(|_, series| {
            let mut clipped: Vec<DailyBucket> = series
                .iter()
                .filter(|bucket| bucket.date >= start && bucket.date <= end)
                .copied()
                .collect();
            clipped.sort_by_key(|bucket| bucket.date);
            clipped
        }))
    }
}

/// In-memory identity and ownership directory.
///
/// Stands in for the external identity and content collections during
/// tests and development. The engine only reads from it.
pub struct MemoryDirectory {
    actors: Store<ActorInfo>,
    relationships: Store<RelationshipCounts>,
    owned_items: Store<Vec<String>>,
}

impl MemoryDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self {
            actors: Arc::new(RwLock::new(HashMap::new())),
            relationships: Arc::new(RwLock::new(HashMap::new())),
            owned_items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers an actor's display info.
    pub async fn insert_actor(&self, actor_id: impl Into<String>, info: ActorInfo) {
        self.actors.write().await.insert(actor_id.into(), info);
    }

    /// Sets a profile's follower/following totals.
    pub async fn set_relationships(
        &self,
        profile_id: impl Into<String>,
        counts: RelationshipCounts,
    ) {
        self.relationships
            .write()
            .await
            .insert(profile_id.into(), counts);
    }

    /// Sets the content items owned by a profile.
    pub async fn set_owned_items(&self, owner_id: impl Into<String>, items: Vec<String>) {
        self.owned_items.write().await.insert(owner_id.into(), items);
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryDirectory {
    async fn lookup_actor(&self, actor_id: &str) -> AnalyticsResult<Option<ActorInfo>> {
        let actors = self.actors.read().await;
        Ok(actors.get(actor_id).cloned())
    }

    async fn relationship_counts(
        &self,
        profile_id: &str,
    ) -> AnalyticsResult<Option<RelationshipCounts>> {
        let relationships = self.relationships.read().await;
        Ok(relationships.get(profile_id).copied())
    }
}

#[async_trait]
impl ContentCatalog for MemoryDirectory {
    async fn items_owned_by(&self, owner_id: &str) -> AnalyticsResult<Vec<String>> {
        let owned = self.owned_items.read().await;
        Ok(owned.get(owner_id).cloned().unwrap_or_default())
    }
}
