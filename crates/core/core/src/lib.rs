//! # EngageKit Core
//!
//! This crate provides the foundational types and traits for the EngageKit
//! analytics engine. It defines the immutable engagement-event record, the
//! per-entity aggregate summary with its incremental update algorithm,
//! error types, and the trait interfaces that storage adapters and host
//! applications implement.

pub mod error;
pub mod summary;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{AnalyticsError, AnalyticsResult};
pub use summary::{AggregateSummary, DailyBucket, SummaryDelta};
pub use traits::{
    ContentCatalog, EventFilter, EventLog, EventOrdering, IdentityProvider, SummaryStore,
};
pub use types::{
    ActorInfo, ActorRef, DeviceInfo, EngagementEvent, EntityKind, EntityRef, EventKind, PerKind,
    RelationshipCounts,
};
