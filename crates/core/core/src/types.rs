//! Core data types for EngageKit.
//!
//! This module defines the canonical engagement-event record and the value
//! types it is built from. Events are append-only: once written they are
//! never mutated or deleted by this subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of entity an engagement event is recorded against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A content item (portfolio piece, post, etc.).
    ContentItem,
    /// A user profile.
    Profile,
}

impl EntityKind {
    /// Returns the storage identifier for this entity kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ContentItem => "content_item",
            EntityKind::Profile => "profile",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of engagement an event represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A view of the entity.
    View,
    /// A like on the entity.
    Like,
    /// A comment on the entity.
    Comment,
    /// A follow of the entity (profiles only in practice).
    Follow,
}

impl EventKind {
    /// All event kinds, in canonical order.
    pub const ALL: [EventKind; 4] = [
        EventKind::View,
        EventKind::Like,
        EventKind::Comment,
        EventKind::Follow,
    ];

    /// Returns the storage identifier for this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Like => "like",
            EventKind::Comment => "comment",
            EventKind::Follow => "follow",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the entity an event or summary belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// The entity's identifier.
    pub id: String,
    /// The kind of entity.
    pub kind: EntityKind,
}

impl EntityRef {
    /// Creates a reference to a content item.
    pub fn content_item(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::ContentItem,
        }
    }

    /// Creates a reference to a profile.
    pub fn profile(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Profile,
        }
    }

    /// Returns the composite key used to address this entity in storage.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Denormalized display info for an actor, captured at write time.
///
/// Events carry a snapshot of this rather than a reference so that
/// historical events keep the display info the actor had when the event
/// happened. Readers of historical events must not re-derive it from the
/// live identity record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorInfo {
    /// The actor's display name at the time of capture.
    pub display_name: String,
    /// Optional avatar URL at the time of capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ActorInfo {
    /// Creates actor display info with a name and no avatar.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Sets the avatar URL.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// An identified actor submitting an event: id plus display snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRef {
    /// The actor's identifier.
    pub id: String,
    /// Display info snapshot taken at submission time.
    pub info: ActorInfo,
}

impl ActorRef {
    /// Creates an actor reference.
    pub fn new(id: impl Into<String>, info: ActorInfo) -> Self {
        Self {
            id: id.into(),
            info,
        }
    }
}

/// Client device info attached to an event, when the caller supplies it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceInfo {
    /// Platform identifier (e.g. "web", "ios", "android").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Raw user-agent string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Follower/following totals read from a profile document.
///
/// These live in the external identity collection; this subsystem only
/// ever reads them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RelationshipCounts {
    /// Number of accounts following this profile.
    pub followers: u64,
    /// Number of accounts this profile follows.
    pub following: u64,
}

/// An immutable engagement event.
///
/// Created by the event recorder, appended to the event log, and never
/// mutated afterwards. The raw log is the source of truth for all derived
/// aggregate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementEvent {
    /// Unique identifier for this event.
    pub id: String,

    /// The entity the event was recorded against.
    pub entity: EntityRef,

    /// The kind of engagement.
    pub kind: EventKind,

    /// The acting user's id. `None` for anonymous views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Display snapshot of the actor at write time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_info: Option<ActorInfo>,

    /// When the engagement happened.
    pub occurred_at: DateTime<Utc>,

    /// Comment text, for comment events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Client device info, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
}

impl EngagementEvent {
    /// Creates a new event with a fresh id and the current timestamp.
    pub fn new(entity: EntityRef, kind: EventKind, actor: Option<ActorRef>) -> Self {
        let (actor_id, actor_info) = match actor {
            Some(actor) => (Some(actor.id), Some(actor.info)),
            None => (None, None),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity,
            kind,
            actor_id,
            actor_info,
            occurred_at: Utc::now(),
            content: None,
            device: None,
        }
    }

    /// Sets the comment text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the device info.
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = Some(device);
        self
    }

    /// Overrides the event timestamp (testing and imports).
    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = at;
        self
    }

    /// Whether the event was produced by an anonymous actor.
    pub fn is_anonymous(&self) -> bool {
        self.actor_id.is_none()
    }
}

/// A fixed-shape value holder with one slot per [`EventKind`].
///
/// Aggregate documents use this instead of a dynamically-shaped map so the
/// set of tracked kinds is closed and every slot always exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerKind<T> {
    /// Slot for view events.
    #[serde(default)]
    pub view: T,
    /// Slot for like events.
    #[serde(default)]
    pub like: T,
    /// Slot for comment events.
    #[serde(default)]
    pub comment: T,
    /// Slot for follow events.
    #[serde(default)]
    pub follow: T,
}

impl<T> PerKind<T> {
    /// Returns the slot for `kind`.
    pub fn get(&self, kind: EventKind) -> &T {
        match kind {
            EventKind::View => &self.view,
            EventKind::Like => &self.like,
            EventKind::Comment => &self.comment,
            EventKind::Follow => &self.follow,
        }
    }

    /// Returns the mutable slot for `kind`.
    pub fn get_mut(&mut self, kind: EventKind) -> &mut T {
        match kind {
            EventKind::View => &mut self.view,
            EventKind::Like => &mut self.like,
            EventKind::Comment => &mut self.comment,
            EventKind::Follow => &mut self.follow,
        }
    }

    /// Iterates over all slots with their kinds, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (EventKind, &T)> {
        EventKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Builds a new holder by applying `f` to every slot.
    pub fn map<U>(&self, mut f: impl FnMut(EventKind, &T) -> U) -> PerKind<U> {
        PerKind {
            view: f(EventKind::View, &self.view),
            like: f(EventKind::Like, &self.like),
            comment: f(EventKind::Comment, &self.comment),
            follow: f(EventKind::Follow, &self.follow),
        }
    }
}
