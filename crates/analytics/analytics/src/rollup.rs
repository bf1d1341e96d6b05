//! Profile rollups: merging many child aggregate summaries into one
//! owner-level view.
//!
//! A rollup is computed on read and never persisted. Totals are straight
//! sums across children. Unique totals are the size of the set union of
//! the children's unique-actor sets; summing per-child unique counts would
//! double-count an actor who interacted with two of the owner's items.
//! Daily series are merged by summing counts for matching dates.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::warn;

use engagekit_core::summary::{AggregateSummary, DailyBucket};
use engagekit_core::traits::SummaryStore;
use engagekit_core::types::{EntityRef, EventKind, PerKind};

/// Owner-level merge of child aggregate summaries. Ephemeral: recomputed
/// per query, never written back.
#[derive(Debug, Clone, Default)]
pub struct ProfileRollup {
    /// Summed totals per event kind across all children.
    pub totals: PerKind<u64>,
    /// Size of the unioned unique-actor set per event kind.
    pub unique_totals: PerKind<u64>,
    /// Date-sorted merged daily series per event kind.
    pub daily: PerKind<Vec<DailyBucket>>,
}

/// Incremental merger of child summaries into a [`ProfileRollup`].
#[derive(Debug, Default)]
pub struct RollupAccumulator {
    totals: PerKind<u64>,
    unique_actors: PerKind<BTreeSet<String>>,
    daily: PerKind<BTreeMap<NaiveDate, u64>>,
}

impl RollupAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one child summary.
    pub fn merge(&mut self, summary: &AggregateSummary) {
        for kind in EventKind::ALL {
            *self.totals.get_mut(kind) += *summary.totals.get(kind);

            self.unique_actors
                .get_mut(kind)
                .extend(summary.unique_actors.get(kind).iter().cloned());

            let days = self.daily.get_mut(kind);
            for bucket in summary.daily.get(kind) {
                *days.entry(bucket.date).or_insert(0) += bucket.count;
            }
        }
    }

    /// Finishes the merge. Daily series come out date-sorted.
    pub fn finish(self) -> ProfileRollup {
        let unique_totals = self.unique_actors.map(|_, actors| actors.len() as u64);
        let daily = self.daily.map(|_, days| {
            days.iter()
                .map(|(&date, &count)| DailyBucket { date, count })
                .collect()
        });

        ProfileRollup {
            totals: self.totals,
            unique_totals,
            daily,
        }
    }
}

/// Fetches and merges the summaries for a set of entities.
///
/// Read-only and side-effect free. A child whose fetch fails is skipped
/// with a warning so one bad read cannot fail the whole dashboard; a child
/// with no summary yet contributes nothing.
pub async fn collect_rollup(summaries: &dyn SummaryStore, entities: &[EntityRef]) -> ProfileRollup {
    let mut accumulator = RollupAccumulator::new();

    for entity in entities {
        match summaries.get(entity).await {
            Ok(Some(summary)) => accumulator.merge(&summary),
            Ok(None) => {}
            Err(err) => warn!(
                entity = %entity,
                error = %err,
                "skipping child summary in rollup"
            ),
        }
    }

    accumulator.finish()
}
