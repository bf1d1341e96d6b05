//! Top-K interactor ranking.
//!
//! Ordering is by interaction count descending, then last interaction
//! descending (most recent first). Ties remaining after both keys keep
//! encounter order, which is why [`ActorTally`] preserves the order actors
//! were first seen in rather than handing out a bare map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use engagekit_core::traits::IdentityProvider;
use engagekit_core::types::{ActorInfo, EngagementEvent};

/// An actor's interaction count and recency within one query's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorStanding {
    /// The actor's id.
    pub actor_id: String,
    /// Number of interactions within the scope.
    pub interactions: u64,
    /// Timestamp of the most recent interaction.
    pub last_interaction: DateTime<Utc>,
}

/// A ranked interactor with display info attached. Query-scoped only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopActor {
    /// The actor's id.
    pub actor_id: String,
    /// The actor's current display info.
    pub info: ActorInfo,
    /// Number of interactions within the scope.
    pub interactions: u64,
    /// Timestamp of the most recent interaction.
    pub last_interaction: DateTime<Utc>,
}

/// Accumulates per-actor counts and recency in first-encounter order.
#[derive(Debug, Default)]
pub struct ActorTally {
    order: Vec<String>,
    stats: HashMap<String, (u64, DateTime<Utc>)>,
}

impl ActorTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one interaction by an actor.
    pub fn record(&mut self, actor_id: &str, at: DateTime<Utc>) {
        match self.stats.get_mut(actor_id) {
            Some((count, last)) => {
                *count += 1;
                if at > *last {
                    *last = at;
                }
            }
            None => {
                self.order.push(actor_id.to_string());
                self.stats.insert(actor_id.to_string(), (1, at));
            }
        }
    }

    /// Records an event's actor, if it has one. Anonymous events are not
    /// rankable and are ignored.
    pub fn observe(&mut self, event: &EngagementEvent) {
        if let Some(actor_id) = &event.actor_id {
            self.record(actor_id, event.occurred_at);
        }
    }

    /// Returns the standings in first-encounter order.
    pub fn standings(&self) -> Vec<ActorStanding> {
        self.order
            .iter()
            .map(|actor_id| {
                let (interactions, last_interaction) = self.stats[actor_id];
                ActorStanding {
                    actor_id: actor_id.clone(),
                    interactions,
                    last_interaction,
                }
            })
            .collect()
    }

    /// Whether no actor has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Ranks standings and truncates to `k` entries.
///
/// The sort is stable, so ties unresolved by count and recency keep the
/// input (encounter) order.
pub fn rank(mut standings: Vec<ActorStanding>, k: usize) -> Vec<ActorStanding> {
    standings.sort_by(|a, b| {
        b.interactions
            .cmp(&a.interactions)
            .then(b.last_interaction.cmp(&a.last_interaction))
    });
    standings.truncate(k);
    standings
}

/// Enriches ranked standings with current display info.
///
/// An actor whose identity lookup returns nothing is dropped rather than
/// rendered as a fabricated placeholder; a provider that wants a degraded
/// "unknown user" display returns placeholder info itself. Lookup failures
/// also drop the entry, keeping the rest of the list usable.
pub async fn resolve_top_actors(
    standings: Vec<ActorStanding>,
    identity: &dyn IdentityProvider,
) -> Vec<TopActor> {
    let mut resolved = Vec::with_capacity(standings.len());

    for standing in standings {
        match identity.lookup_actor(&standing.actor_id).await {
            Ok(Some(info)) => resolved.push(TopActor {
                actor_id: standing.actor_id,
                info,
                interactions: standing.interactions,
                last_interaction: standing.last_interaction,
            }),
            Ok(None) => debug!(
                actor_id = %standing.actor_id,
                "dropping ranked actor with no identity record"
            ),
            Err(err) => warn!(
                actor_id = %standing.actor_id,
                error = %err,
                "dropping ranked actor after identity lookup failure"
            ),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn standing(actor_id: &str, interactions: u64, last: DateTime<Utc>) -> ActorStanding {
        ActorStanding {
            actor_id: actor_id.into(),
            interactions,
            last_interaction: last,
        }
    }

    #[test]
    fn test_count_then_recency_ordering() {
        let now = Utc::now();
        // A and B tie on count; A interacted more recently.
        let standings = vec![
            standing("b", 5, now - Duration::hours(2)),
            standing("a", 5, now - Duration::hours(1)),
            standing("c", 3, now),
        ];

        let ranked = rank(standings, 2);
        let ids: Vec<&str> = ranked.iter().map(|s| s.actor_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_full_ties_keep_encounter_order() {
        let now = Utc::now();
        let standings = vec![
            standing("first", 2, now),
            standing("second", 2, now),
            standing("third", 2, now),
        ];

        let ranked = rank(standings, 3);
        let ids: Vec<&str> = ranked.iter().map(|s| s.actor_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_tally_tracks_counts_and_recency() {
        let now = Utc::now();
        let mut tally = ActorTally::new();

        tally.record("u1", now - Duration::hours(3));
        tally.record("u2", now - Duration::hours(2));
        tally.record("u1", now - Duration::hours(1));

        let standings = tally.standings();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].actor_id, "u1");
        assert_eq!(standings[0].interactions, 2);
        assert_eq!(standings[0].last_interaction, now - Duration::hours(1));
        assert_eq!(standings[1].actor_id, "u2");
    }

    #[test]
    fn test_tally_ignores_anonymous_events() {
        use engagekit_core::types::{EngagementEvent, EntityRef, EventKind};

        let mut tally = ActorTally::new();
        tally.observe(&EngagementEvent::new(
            EntityRef::content_item("i1"),
            EventKind::View,
            None,
        ));

        assert!(tally.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_actors() {
        use engagekit_adapter_memory::MemoryDirectory;

        let directory = MemoryDirectory::new();
        directory.insert_actor("known", ActorInfo::new("Known")).await;

        let now = Utc::now();
        let standings = vec![standing("known", 4, now), standing("ghost", 9, now)];

        let resolved = resolve_top_actors(standings, &directory).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].actor_id, "known");
        assert_eq!(resolved[0].info.display_name, "Known");
    }
}
