//! Date-range queries over daily series.
//!
//! Two interchangeable strategies produce identical results:
//! [`StoreRangeStrategy`] asks the summary store to clip series
//! server-side, [`LocalRangeStrategy`] fetches full series and clips them
//! locally. The engine selects one by capability detection at
//! construction and keeps the local strategy as a runtime fallback, so a
//! failing store-side range query degrades instead of failing the
//! dashboard load.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use engagekit_core::error::AnalyticsResult;
use engagekit_core::summary::DailyBucket;
use engagekit_core::traits::SummaryStore;
use engagekit_core::types::{EntityRef, EventKind, PerKind};

use crate::rollup::collect_rollup;

/// Range-scoped totals and series, one per event kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeReport {
    /// Sum of the in-range daily counts per kind.
    pub totals_in_range: PerKind<u64>,
    /// The in-range daily buckets per kind, date-sorted.
    pub series_in_range: PerKind<Vec<DailyBucket>>,
}

impl RangeReport {
    /// Builds a report from already-clipped series, deriving the totals.
    pub fn from_series(series: PerKind<Vec<DailyBucket>>) -> Self {
        let totals = series.map(|_, buckets| buckets.iter().map(|b| b.count).sum());
        Self {
            totals_in_range: totals,
            series_in_range: series,
        }
    }
}

/// Clips every series to `[start, end]` inclusive and sorts by date.
pub fn clip_series(
    series: &PerKind<Vec<DailyBucket>>,
    start: NaiveDate,
    end: NaiveDate,
) -> PerKind<Vec<DailyBucket>> {
    series.map(|_, buckets| {
        let mut clipped: Vec<DailyBucket> = buckets
            .iter()
            .filter(|bucket| bucket.date >= start && bucket.date <= end)
            .copied()
            .collect();
        clipped.sort_by_key(|bucket| bucket.date);
        clipped
    })
}

/// Merges several per-kind series by summing counts of matching dates.
fn merge_series(parts: Vec<PerKind<Vec<DailyBucket>>>) -> PerKind<Vec<DailyBucket>> {
    let mut merged: PerKind<BTreeMap<NaiveDate, u64>> = PerKind::default();

    for part in &parts {
        for kind in EventKind::ALL {
            let days = merged.get_mut(kind);
            for bucket in part.get(kind) {
                *days.entry(bucket.date).or_insert(0) += bucket.count;
            }
        }
    }

    merged.map(|_, days| {
        days.iter()
            .map(|(&date, &count)| DailyBucket { date, count })
            .collect()
    })
}

/// A way of answering a date-range query over a set of entities.
#[async_trait]
pub trait RangeQueryStrategy: Send + Sync {
    /// Returns the range-scoped totals and series for the merged daily
    /// series of `entities`.
    async fn query(
        &self,
        entities: &[EntityRef],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<RangeReport>;
}

/// Range queries answered server-side by the summary store.
pub struct StoreRangeStrategy {
    summaries: Arc<dyn SummaryStore>,
}

impl StoreRangeStrategy {
    /// Creates the store-side strategy.
    pub fn new(summaries: Arc<dyn SummaryStore>) -> Self {
        Self { summaries }
    }
}

#[async_trait]
impl RangeQueryStrategy for StoreRangeStrategy {
    async fn query(
        &self,
        entities: &[EntityRef],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<RangeReport> {
        let mut parts = Vec::with_capacity(entities.len());
        for entity in entities {
            parts.push(self.summaries.series_range(entity, start, end).await?);
        }

        Ok(RangeReport::from_series(merge_series(parts)))
    }
}

/// Range queries recomputed locally from full, unfiltered series.
pub struct LocalRangeStrategy {
    summaries: Arc<dyn SummaryStore>,
}

impl LocalRangeStrategy {
    /// Creates the local-recompute strategy.
    pub fn new(summaries: Arc<dyn SummaryStore>) -> Self {
        Self { summaries }
    }
}

#[async_trait]
impl RangeQueryStrategy for LocalRangeStrategy {
    async fn query(
        &self,
        entities: &[EntityRef],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<RangeReport> {
        let rollup = collect_rollup(self.summaries.as_ref(), entities).await;
        Ok(RangeReport::from_series(clip_series(
            &rollup.daily,
            start,
            end,
        )))
    }
}
