//! Typed async client for a hosted activity-feed REST API.
//!
//! ```no_run
//! use activity_feeds::{Client, ClientConfig, GetActivitiesOption, NextPage};
//!
//! # async fn demo() -> activity_feeds::Result<()> {
//! let client = Client::new(ClientConfig::new("api-key"))?;
//! let feed = client.flat_feed("timeline", "jo")?;
//! let page = feed.get_activities(&[GetActivitiesOption::Limit(25)]).await?;
//! for activity in &page.results {
//!     println!("{} {} {}", activity.actor, activity.verb, activity.object);
//! }
//! if !page.next().is_empty() {
//!     let _second = feed.get_next_page_activities(&page).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every response keeps the JSON keys its type does not declare: activities
//! carry an `extra` map and enriched references decode to [`Data`].

pub mod cli;
pub mod client;
pub mod collections;
pub mod config;
pub mod decode;
pub mod error;
pub mod feed;
pub mod options;
pub mod personalization;
pub mod query;
pub mod reactions;
pub mod response;
pub mod time;
pub mod transport;
pub mod types;
pub mod users;

pub use client::Client;
pub use collections::CollectionsClient;
pub use config::ClientConfig;
pub use decode::{decode_with_extra, Data, Extra, WithExtra};
pub use error::{ApiError, Error, Result};
pub use feed::{AggregatedFeed, BaseFeed, FeedId, FlatFeed, NotificationFeed, TargetsUpdate};
pub use options::{FilterReactionsOption, FollowListOption, GetActivitiesOption};
pub use personalization::PersonalizationClient;
pub use query::{encode_options, parse_next, PageOption, QueryParams, RequestOption};
pub use reactions::{FilterReactionsAttribute, ReactionLookup, ReactionsClient};
pub use response::*;
pub use time::{Duration, Time};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{
    Activity, ActivityGroup, CollectionObject, EnrichedActivity, EnrichedActivityGroup,
    EnrichedNotificationFeedResult, Follower, FollowRelationship, ForeignIdTimePair,
    GetCollectionResponseObject, GroupInfo, NotificationFeedResult, NotificationGroupInfo, Reaction,
    ReactionRequest, UnfollowRelationship, UpdateActivityRequest, User,
};
