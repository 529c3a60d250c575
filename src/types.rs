//! Wire types for activities, follow relationships, collections, users and
//! reactions.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decode::{null_as_default, Data, Extra};
use crate::feed::FeedId;
use crate::time::Time;

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// A single event stored in a feed. Custom fields live in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub foreign_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Activity {
    pub fn new(actor: impl Into<String>, verb: impl Into<String>, object: impl Into<String>) -> Self {
        Activity {
            actor: actor.into(),
            verb: verb.into(),
            object: object.into(),
            ..Activity::default()
        }
    }
}

/// An activity whose references were expanded server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedActivity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub actor: Data,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb: String,
    #[serde(default)]
    pub object: Data,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub foreign_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Data>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub reaction_counts: HashMap<String, i64>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub own_reactions: HashMap<String, Vec<Reaction>>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub latest_reactions: HashMap<String, Vec<Reaction>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Fields shared by aggregated and notification groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb: String,
    #[serde(default)]
    pub activity_count: i64,
    #[serde(default)]
    pub actor_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

/// Notification groups additionally track read/seen state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationGroupInfo {
    #[serde(flatten)]
    pub group: GroupInfo,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_seen: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityGroup {
    #[serde(flatten)]
    pub info: GroupInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedActivityGroup {
    #[serde(flatten)]
    pub info: GroupInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<EnrichedActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeedResult {
    #[serde(flatten)]
    pub info: NotificationGroupInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedNotificationFeedResult {
    #[serde(flatten)]
    pub info: NotificationGroupInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<EnrichedActivity>,
}

/// Identifies an activity by foreign ID and time instead of its ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignIdTimePair {
    pub foreign_id: String,
    pub timestamp: Time,
}

impl ForeignIdTimePair {
    pub fn new(foreign_id: impl Into<String>, timestamp: Time) -> Self {
        ForeignIdTimePair {
            foreign_id: foreign_id.into(),
            timestamp,
        }
    }
}

/// Partial update of one activity: fields to set and field names to unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(skip_serializing_if = "Extra::is_empty")]
    pub set: Extra,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
}

impl UpdateActivityRequest {
    pub fn by_id(id: impl Into<String>, set: Extra, unset: Vec<String>) -> Self {
        UpdateActivityRequest {
            id: Some(id.into()),
            set,
            unset,
            ..UpdateActivityRequest::default()
        }
    }

    pub fn by_foreign_id(foreign_id: impl Into<String>, time: Time, set: Extra, unset: Vec<String>) -> Self {
        UpdateActivityRequest {
            foreign_id: Some(foreign_id.into()),
            time: Some(time),
            set,
            unset,
            ..UpdateActivityRequest::default()
        }
    }
}

/// Body for adding one activity to several feeds at once.
#[derive(Debug, Clone, Serialize)]
pub struct AddToManyRequest {
    pub activity: Activity,
    #[serde(rename = "feeds", skip_serializing_if = "Vec::is_empty")]
    pub feed_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct UpdateToTargetsRequest {
    pub foreign_id: String,
    pub time: String,
    #[serde(rename = "new_targets", skip_serializing_if = "Vec::is_empty")]
    pub new: Vec<String>,
    #[serde(rename = "added_targets", skip_serializing_if = "Vec::is_empty")]
    pub adds: Vec<String>,
    #[serde(rename = "removed_targets", skip_serializing_if = "Vec::is_empty")]
    pub removes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Follow relationships
// ---------------------------------------------------------------------------

/// One edge of the follow graph as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Follower {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feed_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

/// A source feed following a target feed, for batch follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRelationship {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_copy_limit: Option<u32>,
}

impl FollowRelationship {
    pub fn new(source: &FeedId, target: &FeedId) -> Self {
        FollowRelationship {
            source: source.to_string(),
            target: target.to_string(),
            activity_copy_limit: None,
        }
    }

    /// How many existing target activities get copied into the source feed.
    pub fn with_activity_copy_limit(mut self, limit: u32) -> Self {
        self.activity_copy_limit = Some(limit);
        self
    }
}

/// A follow edge to remove in a batch unfollow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfollowRelationship {
    pub source: String,
    pub target: String,
    pub keep_history: bool,
}

impl UnfollowRelationship {
    pub fn new(source: &FeedId, target: &FeedId, keep_history: bool) -> Self {
        UnfollowRelationship {
            source: source.to_string(),
            target: target.to_string(),
            keep_history,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FollowRequest {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_copy_limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// A user-defined record in a collection.
///
/// On the wire the object is flat: `data` keys sit next to `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionObject {
    pub id: String,
    pub data: Extra,
}

impl CollectionObject {
    pub fn new(id: impl Into<String>, data: Extra) -> Self {
        CollectionObject { id: id.into(), data }
    }
}

impl Serialize for CollectionObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut flat = Extra::new();
        flat.insert("id".to_string(), self.id.clone().into());
        for (k, v) in &self.data {
            flat.insert(k.clone(), v.clone());
        }
        flat.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CollectionObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let Data { id, extra } = Data::deserialize(deserializer)?;
        Ok(CollectionObject { id, data: extra })
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpsertCollectionRequest<'a> {
    pub data: HashMap<&'a str, &'a [CollectionObject]>,
}

/// Unlike [`CollectionObject`], the single-object endpoints nest `data`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddCollectionRequest<'a> {
    pub id: &'a str,
    pub data: &'a Extra,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

/// One object returned by a batch collection read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCollectionResponseObject {
    #[serde(default)]
    pub foreign_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Extra,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Extra::is_empty")]
    pub data: Extra,
}

impl User {
    pub fn new(id: impl Into<String>, data: Extra) -> Self {
        User { id: id.into(), data }
    }
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// The writable part of a reaction, also used as the body when adding one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub activity_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Extra::is_empty")]
    pub data: Extra,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub target_feeds: Vec<String>,
    #[serde(rename = "parent", default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
}

impl ReactionRequest {
    pub fn new(kind: impl Into<String>, activity_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        ReactionRequest {
            kind: kind.into(),
            activity_id: activity_id.into(),
            user_id: user_id.into(),
            ..ReactionRequest::default()
        }
    }
}

/// A reaction as returned by the service, with its child reactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(flatten)]
    pub request: ReactionRequest,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub latest_children: HashMap<String, Vec<Reaction>>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub own_children: HashMap<String, Vec<Reaction>>,
    #[serde(rename = "children_counts", default, deserialize_with = "null_as_default", skip_serializing_if = "Extra::is_empty")]
    pub children_counters: Extra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateReactionRequest<'a> {
    #[serde(skip_serializing_if = "Extra::is_empty")]
    pub data: &'a Extra,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub target_feeds: &'a [String],
}
