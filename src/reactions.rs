//! Reactions: likes, comments and other user responses attached to
//! activities, optionally nested under a parent reaction.

use crate::client::Client;
use crate::decode::Extra;
use crate::error::{Error, Result};
use crate::options::FilterReactionsOption;
use crate::query::{encode_options, QueryParams};
use crate::response::{FilterReactionResponse, NextPage};
use crate::types::{Reaction, ReactionRequest, UpdateReactionRequest};

/// Which ID a reaction filter is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionLookup {
    ActivityId,
    ReactionId,
    UserId,
}

impl ReactionLookup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionLookup::ActivityId => "activity_id",
            ReactionLookup::ReactionId => "reaction_id",
            ReactionLookup::UserId => "user_id",
        }
    }
}

/// The lookup a reaction listing was made with. Kept on the response so the
/// following page can be fetched against the same lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReactionsAttribute {
    pub lookup: ReactionLookup,
    pub value: String,
    pub kind: Option<String>,
}

impl FilterReactionsAttribute {
    pub fn by_activity_id(id: impl Into<String>) -> Self {
        Self::new(ReactionLookup::ActivityId, id)
    }

    /// Children of a reaction.
    pub fn by_reaction_id(id: impl Into<String>) -> Self {
        Self::new(ReactionLookup::ReactionId, id)
    }

    pub fn by_user_id(id: impl Into<String>) -> Self {
        Self::new(ReactionLookup::UserId, id)
    }

    /// Restrict to one reaction kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    fn new(lookup: ReactionLookup, value: impl Into<String>) -> Self {
        FilterReactionsAttribute {
            lookup,
            value: value.into(),
            kind: None,
        }
    }

    fn segments(&self) -> Vec<&str> {
        let mut segments = vec!["reaction", self.lookup.as_str(), self.value.as_str()];
        segments.extend(self.kind.as_deref());
        segments
    }
}

#[derive(Debug, Clone)]
pub struct ReactionsClient {
    client: Client,
}

impl ReactionsClient {
    pub(crate) fn new(client: Client) -> Self {
        ReactionsClient { client }
    }

    pub async fn add(&self, reaction: &ReactionRequest) -> Result<Reaction> {
        let url = self.client.endpoint(&["reaction"], &QueryParams::new())?;
        self.client.post(url, reaction).await
    }

    /// Add `reaction` as a child of the reaction `parent_id`.
    pub async fn add_child(&self, parent_id: &str, reaction: ReactionRequest) -> Result<Reaction> {
        let reaction = ReactionRequest {
            parent_id: parent_id.to_string(),
            ..reaction
        };
        self.add(&reaction).await
    }

    pub async fn get(&self, id: &str) -> Result<Reaction> {
        let url = self
            .client
            .endpoint(&["reaction", id], &QueryParams::new())?;
        self.client.get(url).await
    }

    pub async fn update(&self, id: &str, data: &Extra, target_feeds: &[String]) -> Result<Reaction> {
        let url = self
            .client
            .endpoint(&["reaction", id], &QueryParams::new())?;
        self.client
            .put(url, &UpdateReactionRequest { data, target_feeds })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self
            .client
            .endpoint(&["reaction", id], &QueryParams::new())?;
        self.client.delete(url).await
    }

    pub async fn filter(
        &self,
        attribute: FilterReactionsAttribute,
        options: &[FilterReactionsOption],
    ) -> Result<FilterReactionResponse> {
        let url = self
            .client
            .endpoint(&attribute.segments(), &encode_options(options))?;
        let mut response: FilterReactionResponse = self.client.get(url).await?;
        response.attribute = Some(attribute);
        Ok(response)
    }

    /// Page after `page`, fetched with the same lookup and the cursor's options.
    pub async fn get_next_page_filtered_reactions(
        &self,
        page: &FilterReactionResponse,
    ) -> Result<FilterReactionResponse> {
        let options = page.parse_next()?;
        let attribute = page.attribute().cloned().ok_or(Error::InvalidNextPage)?;
        self.filter(attribute, &options).await
    }
}
