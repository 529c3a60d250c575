//! Feeds: the shared write/follow operations and the three read flavours.
//!
//! [`FlatFeed`], [`AggregatedFeed`] and [`NotificationFeed`] each dereference
//! to [`BaseFeed`] for the operations every feed supports and add reads that
//! return their own envelope type.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::options::{FollowListOption, GetActivitiesOption};
use crate::query::{encode_options, QueryParams};
use crate::response::{
    AddActivitiesResponse, AddActivityResponse, AggregatedFeedResponse, EnrichedAggregatedFeedResponse,
    EnrichedFlatFeedResponse, EnrichedNotificationFeedResponse, FlatFeedResponse, FollowersResponse,
    FollowingResponse, NextPage, NotificationFeedResponse,
};
use crate::types::{Activity, FollowRequest, UpdateToTargetsRequest};

// ---------------------------------------------------------------------------
// FeedId
// ---------------------------------------------------------------------------

/// `slug:user_id`, e.g. `timeline:jo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedId {
    slug: String,
    user_id: String,
}

impl FeedId {
    pub fn new(slug: &str, user_id: &str) -> Result<Self> {
        for (what, value) in [("slug", slug), ("user ID", user_id)] {
            if !is_valid_part(value) {
                return Err(Error::InvalidFeed(format!(
                    "{what} {value:?} must be non-empty and contain only letters, digits, '_' or '-'"
                )));
            }
        }
        Ok(FeedId {
            slug: slug.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

fn is_valid_part(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slug, self.user_id)
    }
}

impl FromStr for FeedId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((slug, user_id)) => FeedId::new(slug, user_id),
            None => Err(Error::InvalidFeed(format!("{s:?} is not of the form slug:user_id"))),
        }
    }
}

/// Target edits for [`BaseFeed::update_to_targets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetsUpdate {
    /// Replace the whole target list.
    pub new: Vec<FeedId>,
    pub add: Vec<FeedId>,
    pub remove: Vec<FeedId>,
}

// ---------------------------------------------------------------------------
// BaseFeed
// ---------------------------------------------------------------------------

/// Operations shared by every feed kind.
#[derive(Debug, Clone)]
pub struct BaseFeed {
    client: Client,
    id: FeedId,
}

impl BaseFeed {
    pub fn id(&self) -> &FeedId {
        &self.id
    }

    pub fn slug(&self) -> &str {
        self.id.slug()
    }

    pub fn user_id(&self) -> &str {
        self.id.user_id()
    }

    /// URL of `feed/<slug>/<user_id>/` followed by `tail`.
    fn url(&self, tail: &[&str], params: &QueryParams) -> Result<Url> {
        let mut segments = vec!["feed", self.id.slug(), self.id.user_id()];
        segments.extend_from_slice(tail);
        self.client.endpoint(&segments, params)
    }

    pub async fn add_activity(&self, activity: &Activity) -> Result<AddActivityResponse> {
        let url = self.url(&[], &QueryParams::new())?;
        self.client.post(url, activity).await
    }

    pub async fn add_activities(&self, activities: &[Activity]) -> Result<AddActivitiesResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            activities: &'a [Activity],
        }
        let url = self.url(&[], &QueryParams::new())?;
        self.client.post(url, &Body { activities }).await
    }

    pub async fn remove_activity_by_id(&self, id: &str) -> Result<()> {
        let url = self.url(&[id], &QueryParams::new())?;
        self.client.delete(url).await
    }

    pub async fn remove_activity_by_foreign_id(&self, foreign_id: &str) -> Result<()> {
        let mut params = QueryParams::new();
        params.set("foreign_id", "1");
        let url = self.url(&[foreign_id], &params)?;
        self.client.delete(url).await
    }

    /// Make this feed follow `target`. `activity_copy_limit` caps how many of
    /// the target's existing activities are copied in.
    pub async fn follow(&self, target: &FeedId, activity_copy_limit: Option<u32>) -> Result<()> {
        let body = FollowRequest {
            target: target.to_string(),
            activity_copy_limit,
        };
        let url = self.url(&["follows"], &QueryParams::new())?;
        self.client.post_ignore(url, &body).await
    }

    /// Stop following `target`; with `keep_history` the copied activities stay.
    pub async fn unfollow(&self, target: &FeedId, keep_history: bool) -> Result<()> {
        let mut params = QueryParams::new();
        if keep_history {
            params.set("keep_history", "1");
        }
        let target = target.to_string();
        let url = self.url(&["follows", target.as_str()], &params)?;
        self.client.delete(url).await
    }

    pub async fn get_following(&self, options: &[FollowListOption]) -> Result<FollowingResponse> {
        let url = self.url(&["follows"], &encode_options(options))?;
        self.client.get(url).await
    }

    /// Change the `to` targets of an activity identified by its foreign ID and time.
    pub async fn update_to_targets(&self, activity: &Activity, update: &TargetsUpdate) -> Result<()> {
        let time = match (&activity.time, activity.foreign_id.is_empty()) {
            (Some(time), false) => time.format(),
            _ => {
                return Err(Error::InvalidFormat(
                    "updating targets needs the activity's foreign_id and time".to_string(),
                ))
            }
        };
        let ids = |feeds: &[FeedId]| feeds.iter().map(FeedId::to_string).collect::<Vec<_>>();
        let body = UpdateToTargetsRequest {
            foreign_id: activity.foreign_id.clone(),
            time,
            new: ids(&update.new),
            adds: ids(&update.add),
            removes: ids(&update.remove),
        };
        let segments = ["feed_targets", self.id.slug(), self.id.user_id(), "activity_to_targets"];
        let url = self.client.endpoint(&segments, &QueryParams::new())?;
        self.client.post_ignore(url, &body).await
    }

    async fn read<T: DeserializeOwned>(&self, enriched: bool, options: &[GetActivitiesOption]) -> Result<T> {
        let mut segments = vec!["feed", self.id.slug(), self.id.user_id()];
        if enriched {
            segments.insert(0, "enrich");
        }
        debug!(feed = %self.id, enriched, options = options.len(), "reading feed");
        let url = self.client.endpoint(&segments, &encode_options(options))?;
        self.client.get(url).await
    }
}

// ---------------------------------------------------------------------------
// Feed kinds
// ---------------------------------------------------------------------------

macro_rules! feed_kind {
    ($(#[$doc:meta])* $name:ident, $plain:ty, $enriched:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(BaseFeed);

        impl $name {
            pub(crate) fn new(client: Client, id: FeedId) -> Self {
                $name(BaseFeed { client, id })
            }

            pub async fn get_activities(&self, options: &[GetActivitiesOption]) -> Result<$plain> {
                self.0.read(false, options).await
            }

            /// Fetch the page after `page`, or fail with `MissingNextPage`.
            pub async fn get_next_page_activities(&self, page: &$plain) -> Result<$plain> {
                let options = page.parse_next()?;
                self.get_activities(&options).await
            }

            pub async fn get_enriched_activities(&self, options: &[GetActivitiesOption]) -> Result<$enriched> {
                self.0.read(true, options).await
            }

            pub async fn get_next_page_enriched_activities(&self, page: &$enriched) -> Result<$enriched> {
                let options = page.parse_next()?;
                self.get_enriched_activities(&options).await
            }
        }

        impl Deref for $name {
            type Target = BaseFeed;

            fn deref(&self) -> &BaseFeed {
                &self.0
            }
        }
    };
}

feed_kind!(
    /// A feed of individual activities, newest first.
    FlatFeed,
    FlatFeedResponse,
    EnrichedFlatFeedResponse
);

feed_kind!(
    /// A feed that groups activities by the group's aggregation format.
    AggregatedFeed,
    AggregatedFeedResponse,
    EnrichedAggregatedFeedResponse
);

feed_kind!(
    /// An aggregated feed that also tracks seen and read state.
    NotificationFeed,
    NotificationFeedResponse,
    EnrichedNotificationFeedResponse
);

impl FlatFeed {
    /// Only flat feeds can be followed, so only they list followers.
    pub async fn get_followers(&self, options: &[FollowListOption]) -> Result<FollowersResponse> {
        let url = self.0.url(&["followers"], &encode_options(options))?;
        self.0.client.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_id_display_and_parse() {
        let id = FeedId::new("timeline", "jo-1").unwrap();
        assert_eq!(id.to_string(), "timeline:jo-1");
        assert_eq!("timeline:jo-1".parse::<FeedId>().unwrap(), id);
    }

    #[test]
    fn test_feed_id_rejects_bad_parts() {
        for (slug, user) in [("", "1"), ("user", ""), ("us er", "1"), ("user", "a:b"), ("user", "é")] {
            assert!(
                matches!(FeedId::new(slug, user), Err(Error::InvalidFeed(_))),
                "{slug:?}/{user:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_feed_id_parse_requires_colon() {
        assert!(matches!("timeline".parse::<FeedId>(), Err(Error::InvalidFeed(_))));
        assert!(matches!("a:b:c".parse::<FeedId>(), Err(Error::InvalidFeed(_))));
    }
}
