//! Dashboard query payloads.
//!
//! These are the shapes the query facade hands to the dashboard. They are
//! computed on read and carry no behavior of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagekit_core::summary::DailyBucket;
use engagekit_core::types::{ActorInfo, PerKind};

use crate::ranking::TopActor;

/// Item-level analytics for one content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAnalytics {
    /// The content item's id.
    pub item_id: String,
    /// Running totals per event kind.
    pub totals: PerKind<u64>,
    /// Unique-actor counts per event kind.
    pub unique_counts: PerKind<u64>,
    /// Date-sorted daily series per event kind.
    pub daily_series: PerKind<Vec<DailyBucket>>,
    /// Most active viewers.
    pub top_viewers: Vec<TopActor>,
    /// Most active likers.
    pub top_likers: Vec<TopActor>,
    /// Most active commenters.
    pub top_commenters: Vec<TopActor>,
}

/// One owned item's headline counters, for the top-items list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEngagement {
    /// The content item's id.
    pub item_id: String,
    /// Total views.
    pub views: u64,
    /// Total likes.
    pub likes: u64,
    /// Total comments.
    pub comments: u64,
}

/// A recent viewer of a profile, displayed with the info snapshot taken
/// when the view happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentViewer {
    /// The viewer's id.
    pub actor_id: String,
    /// Display info captured at view time.
    pub info: ActorInfo,
    /// When the view happened.
    pub viewed_at: DateTime<Utc>,
}

/// Profile-level analytics for one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAnalytics {
    /// The profile owner's id.
    pub owner_id: String,
    /// Total views of the profile itself.
    pub profile_views: u64,
    /// Distinct identified viewers of the profile.
    pub unique_viewers: u64,
    /// Follower total from the profile document, when available.
    pub follower_count: u64,
    /// Following total from the profile document, when available.
    pub following_count: u64,
    /// Summed engagement totals across all owned items.
    pub totals_across_items: PerKind<u64>,
    /// Owned items ranked by view total.
    pub top_items_by_views: Vec<ItemEngagement>,
    /// Most recent distinct identified viewers of the profile.
    pub recent_profile_viewers: Vec<RecentViewer>,
}

/// Owner-level rollup across all owned items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRollup {
    /// The owner's id.
    pub owner_id: String,
    /// Summed totals per event kind across owned items.
    pub totals: PerKind<u64>,
    /// Size of the unioned unique-actor set per event kind.
    pub unique_totals: PerKind<u64>,
    /// Date-sorted merged daily series per event kind.
    pub daily_series: PerKind<Vec<DailyBucket>>,
    /// Most active viewers across owned items.
    pub top_viewers: Vec<TopActor>,
    /// Most active likers across owned items.
    pub top_likers: Vec<TopActor>,
    /// Most active commenters across owned items.
    pub top_commenters: Vec<TopActor>,
}
