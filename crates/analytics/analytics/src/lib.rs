//! # EngageKit Analytics
//!
//! The engagement-analytics engine for EngageKit:
//! - Event recording with trailing-window view deduplication
//! - Incrementally-updated per-entity aggregate summaries
//! - Owner rollups with set-union unique totals
//! - Top-K interactor rankings with identity enrichment
//! - Date-range queries with a store-side strategy and a local fallback
//!
//! ## Example
//!
//! ```rust,ignore
//! use engagekit_analytics::AnalyticsEngine;
//! use engagekit_core::{ActorInfo, ActorRef, EntityRef, EventKind};
//!
//! let engine = AnalyticsEngine::builder()
//!     .event_log(log)
//!     .summary_store(summaries)
//!     .identity(directory.clone())
//!     .catalog(directory)
//!     .build()?;
//!
//! let actor = ActorRef::new("u1", ActorInfo::new("Ada"));
//! engine.record_view(EntityRef::content_item("i1"), Some(actor), None).await?;
//!
//! let analytics = engine.item_analytics("i1").await;
//! println!("views: {}", analytics.totals.view);
//! ```

mod config;
mod dashboard;
mod engine;
mod ranking;
mod recorder;
mod rollup;

pub mod range;

pub use config::EngineConfig;
pub use dashboard::{ItemAnalytics, ItemEngagement, OwnerRollup, ProfileAnalytics, RecentViewer};
pub use engine::{AnalyticsEngine, AnalyticsEngineBuilder};
pub use range::{
    clip_series, LocalRangeStrategy, RangeQueryStrategy, RangeReport, StoreRangeStrategy,
};
pub use ranking::{rank, resolve_top_actors, ActorStanding, ActorTally, TopActor};
pub use recorder::EventRecorder;
pub use rollup::{collect_rollup, ProfileRollup, RollupAccumulator};
