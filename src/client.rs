//! The API client and the request plumbing shared by every endpoint family.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::collections::CollectionsClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::feed::{AggregatedFeed, FeedId, FlatFeed, NotificationFeed};
use crate::options::GetActivitiesOption;
use crate::personalization::PersonalizationClient;
use crate::query::{encode_options, QueryParams};
use crate::reactions::ReactionsClient;
use crate::response::{GetActivitiesResponse, GetEnrichedActivitiesResponse, UpdateActivitiesResponse};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::types::{
    Activity, AddToManyRequest, FollowRelationship, ForeignIdTimePair, UnfollowRelationship,
    UpdateActivityRequest,
};
use crate::users::UsersClient;

const CLIENT_HEADER: &str = concat!("activity-feeds-rust-", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Entry point for every API call. Cloning is cheap; clones share the
/// configuration and the transport.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    api_base: Url,
    personalization_base: Url,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_base", &self.api_base.as_str())
            .field("personalization_base", &self.personalization_base.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client that talks HTTP through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a client over any [`Transport`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Client {
            api_base: config.api_base()?,
            personalization_base: config.personalization_base()?,
            config: Arc::new(config),
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -- feeds and sub-clients ------------------------------------------------

    pub fn flat_feed(&self, slug: &str, user_id: &str) -> Result<FlatFeed> {
        Ok(FlatFeed::new(self.clone(), FeedId::new(slug, user_id)?))
    }

    pub fn aggregated_feed(&self, slug: &str, user_id: &str) -> Result<AggregatedFeed> {
        Ok(AggregatedFeed::new(self.clone(), FeedId::new(slug, user_id)?))
    }

    pub fn notification_feed(&self, slug: &str, user_id: &str) -> Result<NotificationFeed> {
        Ok(NotificationFeed::new(self.clone(), FeedId::new(slug, user_id)?))
    }

    pub fn collections(&self) -> CollectionsClient {
        CollectionsClient::new(self.clone())
    }

    pub fn reactions(&self) -> ReactionsClient {
        ReactionsClient::new(self.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.clone())
    }

    pub fn personalization(&self) -> PersonalizationClient {
        PersonalizationClient::new(self.clone())
    }

    // -- app-level activity operations -----------------------------------------

    pub async fn get_activities_by_id<S: AsRef<str>>(&self, ids: &[S]) -> Result<GetActivitiesResponse> {
        let mut params = QueryParams::new();
        params.set("ids", join(ids));
        self.get(self.endpoint(&["activities"], &params)?).await
    }

    pub async fn get_activities_by_foreign_id(
        &self,
        pairs: &[ForeignIdTimePair],
    ) -> Result<GetActivitiesResponse> {
        self.get(self.endpoint(&["activities"], &foreign_id_params(pairs))?).await
    }

    pub async fn get_enriched_activities_by_id<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &[GetActivitiesOption],
    ) -> Result<GetEnrichedActivitiesResponse> {
        let mut params = QueryParams::new();
        params.set("ids", join(ids));
        for (k, v) in encode_options(options).iter() {
            params.set(k, v);
        }
        self.get(self.endpoint(&["enrich", "activities"], &params)?).await
    }

    pub async fn get_enriched_activities_by_foreign_id(
        &self,
        pairs: &[ForeignIdTimePair],
        options: &[GetActivitiesOption],
    ) -> Result<GetEnrichedActivitiesResponse> {
        let mut params = foreign_id_params(pairs);
        for (k, v) in encode_options(options).iter() {
            params.set(k, v);
        }
        self.get(self.endpoint(&["enrich", "activities"], &params)?).await
    }

    /// Replace whole activities, matched by foreign ID and time.
    pub async fn update_activities(&self, activities: &[Activity]) -> Result<UpdateActivitiesResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            activities: &'a [Activity],
        }
        self.post(self.endpoint(&["activities"], &QueryParams::new())?, &Body { activities })
            .await
    }

    /// Set and unset individual fields on several activities.
    pub async fn partial_update_activities(
        &self,
        changes: &[UpdateActivityRequest],
    ) -> Result<UpdateActivitiesResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            changes: &'a [UpdateActivityRequest],
        }
        self.post(self.endpoint(&["activity"], &QueryParams::new())?, &Body { changes })
            .await
    }

    pub async fn add_to_many(&self, activity: Activity, feeds: &[FeedId]) -> Result<()> {
        let body = AddToManyRequest {
            activity,
            feed_ids: feeds.iter().map(FeedId::to_string).collect(),
        };
        self.post_ignore(self.endpoint(&["feed", "add_to_many"], &QueryParams::new())?, &body)
            .await
    }

    /// Create several follow relationships. `activity_copy_limit` applies to
    /// every relationship that does not carry its own.
    pub async fn follow_many(
        &self,
        relationships: &[FollowRelationship],
        activity_copy_limit: Option<u32>,
    ) -> Result<()> {
        let mut params = QueryParams::new();
        if let Some(limit) = activity_copy_limit {
            params.set("activity_copy_limit", limit.to_string());
        }
        self.post_ignore(self.endpoint(&["follow_many"], &params)?, &relationships)
            .await
    }

    pub async fn unfollow_many(&self, relationships: &[UnfollowRelationship]) -> Result<()> {
        self.post_ignore(self.endpoint(&["unfollow_many"], &QueryParams::new())?, &relationships)
            .await
    }

    // -- request plumbing -------------------------------------------------------

    /// Absolute API URL for `segments`, one path segment each, with a trailing
    /// slash. The query carries `api_key` first, then `params` in order.
    pub(crate) fn endpoint(&self, segments: &[&str], params: &QueryParams) -> Result<Url> {
        self.build_url(&self.api_base, segments, params)
    }

    pub(crate) fn personalization_endpoint(&self, segments: &[&str], params: &QueryParams) -> Result<Url> {
        self.build_url(&self.personalization_base, segments, params)
    }

    fn build_url(&self, base: &Url, segments: &[&str], params: &QueryParams) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidId(bad.to_string()));
        }
        let mut url = base.clone();
        {
            // Each push percent-encodes `/`, `?`, `#` and `%`.
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("{base} cannot carry a path")))?;
            path.pop_if_empty().extend(segments).push("");
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.config.api_key);
            for (k, v) in params.iter() {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.request(Method::GET, url, None).await?;
        decode_body(&body)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<T> {
        let body = self.request(Method::POST, url, Some(serde_json::to_vec(body)?)).await?;
        decode_body(&body)
    }

    pub(crate) async fn post_ignore<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<()> {
        self.request(Method::POST, url, Some(serde_json::to_vec(body)?)).await?;
        Ok(())
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<T> {
        let body = self.request(Method::PUT, url, Some(serde_json::to_vec(body)?)).await?;
        decode_body(&body)
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<()> {
        self.request(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn request(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Stream-Client".to_string(), CLIENT_HEADER.to_string()),
        ];
        if let Some(token) = &self.config.auth_token {
            headers.push(("Authorization".to_string(), token.clone()));
            headers.push(("stream-auth-type".to_string(), "jwt".to_string()));
        }

        debug!(method = %method, url = %url, "sending request");
        let request = HttpRequest {
            method,
            url: url.clone(),
            headers,
            body,
        };
        let response = self.transport.send(request).await?;
        let status = response.status;
        debug!(status, bytes = response.body.len(), "received response");

        if !response.is_success() {
            warn!(status, url = %url, "request failed");
            return Err(Error::Api(ApiError::from_response(status, &response.body)));
        }
        Ok(response.body)
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

pub(crate) fn join<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}

fn foreign_id_params(pairs: &[ForeignIdTimePair]) -> QueryParams {
    let foreign_ids: Vec<&str> = pairs.iter().map(|p| p.foreign_id.as_str()).collect();
    let timestamps: Vec<String> = pairs.iter().map(|p| p.timestamp.format()).collect();
    let mut params = QueryParams::new();
    params.set("foreign_ids", foreign_ids.join(","));
    params.set("timestamps", timestamps.join(","));
    params
}
