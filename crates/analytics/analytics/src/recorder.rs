//! The event recorder: ingestion entry point for engagement events.
//!
//! Views pass through a deduplication probe before anything is written; a
//! repeat view by the same actor on the same entity within the trailing
//! window returns the existing event's id and performs no further writes.
//! Anonymous views are never deduplicated.
//!
//! Once an event is durably appended to the raw log, a failed aggregate
//! update is logged and swallowed: the log is the source of truth and the
//! event id is still returned. This implementation does not replay missed
//! updates.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use engagekit_core::error::{AnalyticsError, AnalyticsResult};
use engagekit_core::summary::SummaryDelta;
use engagekit_core::traits::{EventLog, SummaryStore};
use engagekit_core::types::{ActorRef, DeviceInfo, EngagementEvent, EntityRef, EventKind};

use crate::config::EngineConfig;

/// Records raw engagement events and triggers aggregate updates.
pub struct EventRecorder {
    events: Arc<dyn EventLog>,
    summaries: Arc<dyn SummaryStore>,
    config: EngineConfig,
}

impl EventRecorder {
    /// Creates a recorder over the given log and summary store.
    pub fn new(
        events: Arc<dyn EventLog>,
        summaries: Arc<dyn SummaryStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            events,
            summaries,
            config,
        }
    }

    /// Records a view of an entity. Returns the id of the counted event,
    /// which is an existing event's id when the view was deduplicated.
    pub async fn record_view(
        &self,
        entity: EntityRef,
        actor: Option<ActorRef>,
        device: Option<DeviceInfo>,
    ) -> AnalyticsResult<String> {
        if let Some(actor) = &actor {
            let since = Utc::now() - self.config.dedup_window();
            match self.events.find_recent_view(&actor.id, &entity, since).await {
                Ok(Some(existing)) => return Ok(existing.id),
                Ok(None) => {}
                // Over-counting one view beats silently dropping the event.
                Err(err) => warn!(
                    entity = %entity,
                    actor_id = %actor.id,
                    error = %err,
                    "view dedup probe failed, recording anyway"
                ),
            }
        }

        let mut event = EngagementEvent::new(entity, EventKind::View, actor);
        if let Some(device) = device {
            event = event.with_device(device);
        }

        self.append_and_apply(event).await
    }

    /// Records a like, comment, or follow. Views are rejected here so the
    /// deduplication policy of [`record_view`](Self::record_view) cannot
    /// be bypassed.
    pub async fn record_interaction(
        &self,
        entity: EntityRef,
        kind: EventKind,
        actor: ActorRef,
        content: Option<String>,
    ) -> AnalyticsResult<String> {
        if kind == EventKind::View {
            return Err(AnalyticsError::unsupported_kind(kind));
        }

        let mut event = EngagementEvent::new(entity, kind, Some(actor));
        if let Some(content) = content {
            event = event.with_content(content);
        }

        self.append_and_apply(event).await
    }

    /// Appends the event, then applies its summary delta.
    async fn append_and_apply(&self, event: EngagementEvent) -> AnalyticsResult<String> {
        let id = self.events.append(&event).await?;

        let delta = SummaryDelta::new(
            event.kind,
            event.actor_id.clone(),
            event.occurred_at.date_naive(),
        );
        if let Err(err) = self.summaries.apply(&event.entity, delta).await {
            warn!(
                event_id = %id,
                entity = %event.entity,
                kind = %event.kind,
                error = %err,
                "aggregate update failed after durable append; raw event retained"
            );
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use engagekit_adapter_memory::{MemoryEventLog, MemorySummaryStore};
    use engagekit_core::summary::AggregateSummary;
    use engagekit_core::types::ActorInfo;

    fn recorder_with(
        log: Arc<MemoryEventLog>,
        store: Arc<MemorySummaryStore>,
    ) -> EventRecorder {
        EventRecorder::new(log, store, EngineConfig::default())
    }

    fn actor(id: &str) -> ActorRef {
        ActorRef::new(id, ActorInfo::new(id.to_uppercase()))
    }

    #[tokio::test]
    async fn test_repeat_view_is_deduplicated() {
        let log = Arc::new(MemoryEventLog::new());
        let store = Arc::new(MemorySummaryStore::new());
        let recorder = recorder_with(log.clone(), store.clone());
        let entity = EntityRef::content_item("i1");

        let first = recorder
            .record_view(entity.clone(), Some(actor("u1")), None)
            .await
            .unwrap();
        let second = recorder
            .record_view(entity.clone(), Some(actor("u1")), None)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(log.event_count().await, 1);

        let summary = store.get(&entity).await.unwrap().unwrap();
        assert_eq!(*summary.totals.get(EventKind::View), 1);
    }

    #[tokio::test]
    async fn test_anonymous_views_always_count() {
        let log = Arc::new(MemoryEventLog::new());
        let store = Arc::new(MemorySummaryStore::new());
        let recorder = recorder_with(log.clone(), store.clone());
        let entity = EntityRef::content_item("i1");

        for _ in 0..3 {
            recorder
                .record_view(entity.clone(), None, None)
                .await
                .unwrap();
        }

        let summary = store.get(&entity).await.unwrap().unwrap();
        assert_eq!(*summary.totals.get(EventKind::View), 3);
        assert_eq!(*summary.unique_counts.get(EventKind::View), 0);
    }

    #[tokio::test]
    async fn test_different_actors_not_deduplicated() {
        let log = Arc::new(MemoryEventLog::new());
        let store = Arc::new(MemorySummaryStore::new());
        let recorder = recorder_with(log, store.clone());
        let entity = EntityRef::content_item("i1");

        recorder
            .record_view(entity.clone(), Some(actor("u1")), None)
            .await
            .unwrap();
        recorder
            .record_view(entity.clone(), Some(actor("u2")), None)
            .await
            .unwrap();

        let summary = store.get(&entity).await.unwrap().unwrap();
        assert_eq!(*summary.totals.get(EventKind::View), 2);
        assert_eq!(*summary.unique_counts.get(EventKind::View), 2);
    }

    #[tokio::test]
    async fn test_interaction_rejects_view_kind() {
        let recorder = recorder_with(
            Arc::new(MemoryEventLog::new()),
            Arc::new(MemorySummaryStore::new()),
        );

        let result = recorder
            .record_interaction(
                EntityRef::content_item("i1"),
                EventKind::View,
                actor("u1"),
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(AnalyticsError::UnsupportedKind { .. })
        ));
    }

    #[tokio::test]
    async fn test_comment_carries_content() {
        let log = Arc::new(MemoryEventLog::new());
        let recorder = recorder_with(log.clone(), Arc::new(MemorySummaryStore::new()));
        let entity = EntityRef::content_item("i1");

        recorder
            .record_interaction(
                entity.clone(),
                EventKind::Comment,
                actor("u1"),
                Some("great shot".into()),
            )
            .await
            .unwrap();

        let events = log
            .query(engagekit_core::traits::EventFilter::for_entity(entity))
            .await
            .unwrap();
        assert_eq!(events[0].content.as_deref(), Some("great shot"));
    }

    /// Summary store that always fails, to exercise the failure policy:
    /// the raw event survives and its id is returned.
    struct FailingSummaryStore;

    #[async_trait]
    impl SummaryStore for FailingSummaryStore {
        async fn get(&self, _entity: &EntityRef) -> AnalyticsResult<Option<AggregateSummary>> {
            Err(AnalyticsError::store("unavailable"))
        }

        async fn apply(
            &self,
            _entity: &EntityRef,
            _delta: SummaryDelta,
        ) -> AnalyticsResult<AggregateSummary> {
            Err(AnalyticsError::store("unavailable"))
        }
    }

    #[tokio::test]
    async fn test_failed_aggregate_update_keeps_event() {
        let log = Arc::new(MemoryEventLog::new());
        let recorder = EventRecorder::new(
            log.clone(),
            Arc::new(FailingSummaryStore),
            EngineConfig::default(),
        );

        let id = recorder
            .record_interaction(
                EntityRef::content_item("i1"),
                EventKind::Like,
                actor("u1"),
                None,
            )
            .await
            .unwrap();

        assert!(!id.is_empty());
        assert_eq!(log.event_count().await, 1);
    }
}
