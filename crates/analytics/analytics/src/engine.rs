//! The analytics engine: ingestion and query facade.
//!
//! Wires the event recorder, summary store, external directory providers,
//! and range-query strategy behind one handle. Query methods degrade to
//! empty or zeroed payloads on storage failures; a dashboard panel showing
//! zeros beats a dashboard that fails to load.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use engagekit_core::error::{AnalyticsError, AnalyticsResult};
use engagekit_core::summary::AggregateSummary;
use engagekit_core::traits::{
    ContentCatalog, EventFilter, EventLog, IdentityProvider, SummaryStore,
};
use engagekit_core::types::{
    ActorRef, DeviceInfo, EngagementEvent, EntityRef, EventKind, PerKind,
};

use crate::config::EngineConfig;
use crate::dashboard::{
    ItemAnalytics, ItemEngagement, OwnerRollup, ProfileAnalytics, RecentViewer,
};
use crate::range::{LocalRangeStrategy, RangeQueryStrategy, RangeReport, StoreRangeStrategy};
use crate::ranking::{rank, resolve_top_actors, ActorTally, TopActor};
use crate::recorder::EventRecorder;
use crate::rollup::{collect_rollup, RollupAccumulator};

/// The engagement-analytics engine.
pub struct AnalyticsEngine {
    events: Arc<dyn EventLog>,
    summaries: Arc<dyn SummaryStore>,
    identity: Arc<dyn IdentityProvider>,
    catalog: Arc<dyn ContentCatalog>,
    recorder: EventRecorder,
    range_primary: Arc<dyn RangeQueryStrategy>,
    range_fallback: LocalRangeStrategy,
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// Starts building an engine.
    pub fn builder() -> AnalyticsEngineBuilder {
        AnalyticsEngineBuilder::new()
    }

    // ==================== Ingestion ====================

    /// Records a view of an entity. See [`EventRecorder::record_view`].
    pub async fn record_view(
        &self,
        entity: EntityRef,
        actor: Option<ActorRef>,
        device: Option<DeviceInfo>,
    ) -> AnalyticsResult<String> {
        self.recorder.record_view(entity, actor, device).await
    }

    /// Records a like, comment, or follow. See
    /// [`EventRecorder::record_interaction`].
    pub async fn record_interaction(
        &self,
        entity: EntityRef,
        kind: EventKind,
        actor: ActorRef,
        content: Option<String>,
    ) -> AnalyticsResult<String> {
        self.recorder
            .record_interaction(entity, kind, actor, content)
            .await
    }

    // ==================== Queries ====================

    /// Item-level analytics: totals, daily series, and leaderboards.
    pub async fn item_analytics(&self, item_id: &str) -> ItemAnalytics {
        debug!(item_id, "serving item analytics");
        let entity = EntityRef::content_item(item_id);

        let summary = self.summary_or_empty(&entity).await;
        let events = self.events_or_empty(EventFilter::for_entity(entity)).await;

        let mut tallies: PerKind<ActorTally> = PerKind::default();
        for event in &events {
            tallies.get_mut(event.kind).observe(event);
        }
        let PerKind {
            view,
            like,
            comment,
            ..
        } = tallies;

        let k = self.config.item_leaderboard_size;
        ItemAnalytics {
            item_id: item_id.to_string(),
            totals: summary.totals.clone(),
            unique_counts: summary.unique_counts.clone(),
            daily_series: summary.daily_sorted_all(),
            top_viewers: self.top_actors(view, k).await,
            top_likers: self.top_actors(like, k).await,
            top_commenters: self.top_actors(comment, k).await,
        }
    }

    /// Profile-level analytics: profile views, relationship counts, and
    /// headline numbers across owned items.
    pub async fn profile_analytics(&self, owner_id: &str) -> ProfileAnalytics {
        debug!(owner_id, "serving profile analytics");
        let profile = EntityRef::profile(owner_id);
        let summary = self.summary_or_empty(&profile).await;

        let profile_views = *summary.totals.get(EventKind::View);
        let unique_viewers = *summary.unique_counts.get(EventKind::View);

        // The profile document is authoritative for relationship counts;
        // without it, followers degrade to the distinct follow actors seen
        // by this engine and following to zero.
        let (follower_count, following_count) =
            match self.identity.relationship_counts(owner_id).await {
                Ok(Some(counts)) => (counts.followers, counts.following),
                Ok(None) => (*summary.unique_counts.get(EventKind::Follow), 0),
                Err(err) => {
                    warn!(owner_id, error = %err, "relationship count read failed");
                    (*summary.unique_counts.get(EventKind::Follow), 0)
                }
            };

        let item_ids = self.owned_items_or_empty(owner_id).await;
        let mut accumulator = RollupAccumulator::new();
        let mut engagements = Vec::with_capacity(item_ids.len());
        for item_id in &item_ids {
            let entity = EntityRef::content_item(item_id.as_str());
            match self.summaries.get(&entity).await {
                Ok(Some(item_summary)) => {
                    engagements.push(ItemEngagement {
                        item_id: item_id.clone(),
                        views: *item_summary.totals.get(EventKind::View),
                        likes: *item_summary.totals.get(EventKind::Like),
                        comments: *item_summary.totals.get(EventKind::Comment),
                    });
                    accumulator.merge(&item_summary);
                }
                Ok(None) => engagements.push(ItemEngagement {
                    item_id: item_id.clone(),
                    views: 0,
                    likes: 0,
                    comments: 0,
                }),
                Err(err) => warn!(
                    entity = %entity,
                    error = %err,
                    "skipping owned item summary"
                ),
            }
        }
        let rollup = accumulator.finish();

        let mut top_items = engagements;
        top_items.sort_by(|a, b| b.views.cmp(&a.views));
        top_items.truncate(self.config.item_leaderboard_size);

        ProfileAnalytics {
            owner_id: owner_id.to_string(),
            profile_views,
            unique_viewers,
            follower_count,
            following_count,
            totals_across_items: rollup.totals,
            top_items_by_views: top_items,
            recent_profile_viewers: self.recent_profile_viewers(profile).await,
        }
    }

    /// Owner rollup: merged totals, unique totals, daily series, and
    /// leaderboards across every owned item.
    pub async fn owner_rollup(&self, owner_id: &str) -> OwnerRollup {
        debug!(owner_id, "serving owner rollup");
        let entities = self.owned_entities(owner_id).await;

        let rollup = collect_rollup(self.summaries.as_ref(), &entities).await;

        let mut tallies: PerKind<ActorTally> = PerKind::default();
        for entity in &entities {
            let events = self
                .events_or_empty(EventFilter::for_entity(entity.clone()))
                .await;
            for event in &events {
                tallies.get_mut(event.kind).observe(event);
            }
        }
        let PerKind {
            view,
            like,
            comment,
            ..
        } = tallies;

        let k = self.config.rollup_leaderboard_size;
        OwnerRollup {
            owner_id: owner_id.to_string(),
            totals: rollup.totals,
            unique_totals: rollup.unique_totals,
            daily_series: rollup.daily,
            top_viewers: self.top_actors(view, k).await,
            top_likers: self.top_actors(like, k).await,
            top_commenters: self.top_actors(comment, k).await,
        }
    }

    /// Date-range report over the owner's merged daily series,
    /// `[start, end]` inclusive.
    pub async fn range(&self, owner_id: &str, start: NaiveDate, end: NaiveDate) -> RangeReport {
        debug!(owner_id, %start, %end, "serving owner range query");
        let entities = self.owned_entities(owner_id).await;
        self.range_over(&entities, start, end).await
    }

    /// Date-range report for a single content item.
    pub async fn item_range(&self, item_id: &str, start: NaiveDate, end: NaiveDate) -> RangeReport {
        debug!(item_id, %start, %end, "serving item range query");
        let entities = [EntityRef::content_item(item_id)];
        self.range_over(&entities, start, end).await
    }

    // ==================== Internals ====================

    async fn range_over(
        &self,
        entities: &[EntityRef],
        start: NaiveDate,
        end: NaiveDate,
    ) -> RangeReport {
        match self.range_primary.query(entities, start, end).await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "range query failed, recomputing locally");
                match self.range_fallback.query(entities, start, end).await {
                    Ok(report) => report,
                    Err(err) => {
                        warn!(error = %err, "local range recomputation failed, serving empty report");
                        RangeReport::default()
                    }
                }
            }
        }
    }

    async fn summary_or_empty(&self, entity: &EntityRef) -> AggregateSummary {
        match self.summaries.get(entity).await {
            Ok(Some(summary)) => summary,
            Ok(None) => AggregateSummary::empty(entity.clone()),
            Err(err) => {
                warn!(entity = %entity, error = %err, "summary read failed, serving zero state");
                AggregateSummary::empty(entity.clone())
            }
        }
    }

    async fn events_or_empty(&self, filter: EventFilter) -> Vec<EngagementEvent> {
        match self.events.query(filter).await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "event query failed, serving empty list");
                Vec::new()
            }
        }
    }

    async fn owned_items_or_empty(&self, owner_id: &str) -> Vec<String> {
        match self.catalog.items_owned_by(owner_id).await {
            Ok(items) => items,
            Err(err) => {
                warn!(owner_id, error = %err, "ownership lookup failed, serving empty list");
                Vec::new()
            }
        }
    }

    async fn owned_entities(&self, owner_id: &str) -> Vec<EntityRef> {
        self.owned_items_or_empty(owner_id)
            .await
            .into_iter()
            .map(EntityRef::content_item)
            .collect()
    }

    async fn top_actors(&self, tally: ActorTally, k: usize) -> Vec<TopActor> {
        let ranked = rank(tally.standings(), k);
        resolve_top_actors(ranked, self.identity.as_ref()).await
    }

    /// Most recent distinct identified viewers, displayed with the actor
    /// snapshot captured when each view was written.
    async fn recent_profile_viewers(&self, profile: EntityRef) -> Vec<RecentViewer> {
        let events = self
            .events_or_empty(
                EventFilter::for_entity(profile)
                    .kind(EventKind::View)
                    .newest_first(),
            )
            .await;

        let mut seen = HashSet::new();
        let mut viewers = Vec::new();
        for event in events {
            if viewers.len() == self.config.recent_viewers_size {
                break;
            }
            let Some(actor_id) = event.actor_id else {
                continue;
            };
            if !seen.insert(actor_id.clone()) {
                continue;
            }
            let Some(info) = event.actor_info else {
                continue;
            };
            viewers.push(RecentViewer {
                actor_id,
                info,
                viewed_at: event.occurred_at,
            });
        }

        viewers
    }
}

/// Builder for [`AnalyticsEngine`].
pub struct AnalyticsEngineBuilder {
    event_log: Option<Arc<dyn EventLog>>,
    summary_store: Option<Arc<dyn SummaryStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    catalog: Option<Arc<dyn ContentCatalog>>,
    config: EngineConfig,
}

impl AnalyticsEngineBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            event_log: None,
            summary_store: None,
            identity: None,
            catalog: None,
            config: EngineConfig::default(),
        }
    }

    /// Sets the raw event log.
    pub fn event_log(mut self, log: Arc<dyn EventLog>) -> Self {
        self.event_log = Some(log);
        self
    }

    /// Sets the aggregate summary store.
    pub fn summary_store(mut self, store: Arc<dyn SummaryStore>) -> Self {
        self.summary_store = Some(store);
        self
    }

    /// Sets the identity provider.
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the content catalog.
    pub fn catalog(mut self, catalog: Arc<dyn ContentCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Overrides the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine. The range-query strategy is chosen here by
    /// capability detection against the summary store.
    pub fn build(self) -> AnalyticsResult<AnalyticsEngine> {
        let events = self
            .event_log
            .ok_or_else(|| AnalyticsError::internal("event log is required"))?;
        let summaries = self
            .summary_store
            .ok_or_else(|| AnalyticsError::internal("summary store is required"))?;
        let identity = self
            .identity
            .ok_or_else(|| AnalyticsError::internal("identity provider is required"))?;
        let catalog = self
            .catalog
            .ok_or_else(|| AnalyticsError::internal("content catalog is required"))?;

        let recorder = EventRecorder::new(events.clone(), summaries.clone(), self.config.clone());

        let range_primary: Arc<dyn RangeQueryStrategy> = if summaries.supports_range_queries() {
            Arc::new(StoreRangeStrategy::new(summaries.clone()))
        } else {
            Arc::new(LocalRangeStrategy::new(summaries.clone()))
        };
        let range_fallback = LocalRangeStrategy::new(summaries.clone());

        Ok(AnalyticsEngine {
            events,
            summaries,
            identity,
            catalog,
            recorder,
            range_primary,
            range_fallback,
            config: self.config,
        })
    }
}

impl Default for AnalyticsEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
