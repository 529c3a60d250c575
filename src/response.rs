//! Response envelopes.
//!
//! Every envelope shares a small metadata block ([`ResponseMeta`], plus the
//! `next` cursor for paginated reads) composed in with `#[serde(flatten)]`.
//! Metadata fields are reached through accessor methods, and paginated
//! envelopes implement [`NextPage`].

use serde::{Deserialize, Serialize};

use crate::decode::{null_as_default, Extra};
use crate::error::Result;
use crate::options::{FilterReactionsOption, GetActivitiesOption};
use crate::query::{self, PageOption};
use crate::reactions::FilterReactionsAttribute;
use crate::time::{Duration, Time};
use crate::types::{
    Activity, ActivityGroup, EnrichedActivity, EnrichedActivityGroup, EnrichedNotificationFeedResult,
    Follower, GetCollectionResponseObject, NotificationFeedResult, Reaction,
};

// ---------------------------------------------------------------------------
// Metadata blocks
// ---------------------------------------------------------------------------

/// Server-reported processing time, present on every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

/// Metadata of a paginated feed read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadMeta {
    #[serde(flatten)]
    pub base: ResponseMeta,
    /// `path?query` of the next page; empty on the last page.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub next: String,
}

/// Read metadata plus the notification counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMeta {
    #[serde(flatten)]
    pub read: ReadMeta,
    #[serde(default)]
    pub unseen: i64,
    #[serde(default)]
    pub unread: i64,
}

/// A paginated envelope whose cursor replays into options of type `Opt`.
pub trait NextPage {
    type Opt: PageOption;

    /// Raw `next` cursor.
    fn next(&self) -> &str;

    /// Options that fetch the following page.
    ///
    /// Fails with [`Error::MissingNextPage`](crate::Error::MissingNextPage)
    /// on the last page.
    fn parse_next(&self) -> Result<Vec<Self::Opt>> {
        query::parse_next(self.next())
    }
}

// Accessors for envelopes carrying a `ReadMeta` at `self.meta`.
macro_rules! read_envelope {
    ($ty:ident) => {
        impl $ty {
            pub fn duration(&self) -> Option<Duration> {
                self.meta.base.duration
            }
        }

        impl NextPage for $ty {
            type Opt = GetActivitiesOption;

            fn next(&self) -> &str {
                &self.meta.next
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Feed reads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatFeedResponse {
    #[serde(flatten)]
    pub meta: ReadMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFlatFeedResponse {
    #[serde(flatten)]
    pub meta: ReadMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<EnrichedActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFeedResponse {
    #[serde(flatten)]
    pub meta: ReadMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<ActivityGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAggregatedFeedResponse {
    #[serde(flatten)]
    pub meta: ReadMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<EnrichedActivityGroup>,
}

read_envelope!(FlatFeedResponse);
read_envelope!(EnrichedFlatFeedResponse);
read_envelope!(AggregatedFeedResponse);
read_envelope!(EnrichedAggregatedFeedResponse);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeedResponse {
    #[serde(flatten)]
    pub meta: NotificationMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<NotificationFeedResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedNotificationFeedResponse {
    #[serde(flatten)]
    pub meta: NotificationMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<EnrichedNotificationFeedResult>,
}

macro_rules! notification_envelope {
    ($ty:ident) => {
        impl $ty {
            pub fn duration(&self) -> Option<Duration> {
                self.meta.read.base.duration
            }

            pub fn unseen(&self) -> i64 {
                self.meta.unseen
            }

            pub fn unread(&self) -> i64 {
                self.meta.unread
            }
        }

        impl NextPage for $ty {
            type Opt = GetActivitiesOption;

            fn next(&self) -> &str {
                &self.meta.read.next
            }
        }
    };
}

notification_envelope!(NotificationFeedResponse);
notification_envelope!(EnrichedNotificationFeedResponse);

// ---------------------------------------------------------------------------
// Activity writes and lookups
// ---------------------------------------------------------------------------

/// A single stored activity, as returned by add and partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(flatten)]
    pub activity: Activity,
}

pub type AddActivityResponse = ActivityResponse;
pub type UpdateActivityResponse = ActivityResponse;

/// Several stored activities, as returned by batch add and batch update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
}

pub type AddActivitiesResponse = ActivitiesResponse;
pub type UpdateActivitiesResponse = ActivitiesResponse;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetActivitiesResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetEnrichedActivitiesResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<EnrichedActivity>,
}

/// Followers or followed feeds of a feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowListResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Follower>,
}

pub type FollowersResponse = FollowListResponse;
pub type FollowingResponse = FollowListResponse;

macro_rules! timed_envelope {
    ($($ty:ident),+) => {
        $(
            impl $ty {
                pub fn duration(&self) -> Option<Duration> {
                    self.meta.duration
                }
            }
        )+
    };
}

timed_envelope!(
    ActivityResponse,
    ActivitiesResponse,
    GetActivitiesResponse,
    GetEnrichedActivitiesResponse,
    FollowListResponse,
    CollectionObjectResponse,
    GetCollectionResponse,
    UserResponse
);

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// A page of reactions matching a filter.
///
/// The filter that produced the page is remembered so the next page can be
/// requested against the same lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReactionResponse {
    #[serde(flatten)]
    pub meta: ReadMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Reaction>,
    /// The reacted-to activity, when requested with `with_activity_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Extra>,
    #[serde(skip)]
    pub(crate) attribute: Option<FilterReactionsAttribute>,
}

impl FilterReactionResponse {
    pub fn duration(&self) -> Option<Duration> {
        self.meta.base.duration
    }

    pub fn attribute(&self) -> Option<&FilterReactionsAttribute> {
        self.attribute.as_ref()
    }
}

impl NextPage for FilterReactionResponse {
    type Opt = FilterReactionsOption;

    fn next(&self) -> &str {
        &self.meta.next
    }
}

// ---------------------------------------------------------------------------
// Collections and users
// ---------------------------------------------------------------------------

/// A collection object as stored by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionObjectResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub foreign_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Extra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

/// Batch collection read. The service nests the objects under `response`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCollectionResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub response: GetCollectionResponseWrap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCollectionResponseWrap {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<GetCollectionResponseObject>,
}

impl GetCollectionResponse {
    pub fn objects(&self) -> &[GetCollectionResponseObject] {
        &self.response.data
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Extra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

// ---------------------------------------------------------------------------
// Personalization
// ---------------------------------------------------------------------------

/// Personalization payloads are free-form: the declared keys are typed and
/// everything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationResponse {
    #[serde(default)]
    pub app_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub next: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Extra>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PersonalizationResponse {
    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}
