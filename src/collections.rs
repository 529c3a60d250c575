//! Collections: user-defined objects stored alongside feeds and referenced
//! from activities as `SO:<collection>:<id>`.

use std::collections::HashMap;

use serde::Serialize;

use crate::client::{join, Client};
use crate::decode::Extra;
use crate::error::Result;
use crate::query::QueryParams;
use crate::response::{CollectionObjectResponse, GetCollectionResponse};
use crate::types::{AddCollectionRequest, CollectionObject, UpsertCollectionRequest};

#[derive(Debug, Clone)]
pub struct CollectionsClient {
    client: Client,
}

impl CollectionsClient {
    pub(crate) fn new(client: Client) -> Self {
        CollectionsClient { client }
    }

    /// Reference string for an object, usable as an activity field.
    pub fn create_reference(&self, collection: &str, id: &str) -> String {
        format!("SO:{collection}:{id}")
    }

    pub fn create_user_reference(&self, id: &str) -> String {
        self.create_reference("user", id)
    }

    /// Insert or replace objects in `collection`.
    pub async fn upsert(&self, collection: &str, objects: &[CollectionObject]) -> Result<()> {
        let body = UpsertCollectionRequest {
            data: HashMap::from([(collection, objects)]),
        };
        let url = self.client.endpoint(&["meta"], &QueryParams::new())?;
        self.client.post_ignore(url, &body).await
    }

    /// Batch read of objects by ID.
    pub async fn get<S: AsRef<str>>(&self, collection: &str, ids: &[S]) -> Result<GetCollectionResponse> {
        let foreign_ids: Vec<String> = ids
            .iter()
            .map(|id| format!("{collection}:{}", id.as_ref()))
            .collect();
        let mut params = QueryParams::new();
        params.set("foreign_ids", join(&foreign_ids));
        let url = self.client.endpoint(&["meta"], &params)?;
        self.client.get(url).await
    }

    /// Batch delete of objects by ID.
    pub async fn delete<S: AsRef<str>>(&self, collection: &str, ids: &[S]) -> Result<()> {
        let mut params = QueryParams::new();
        params.set("collection_name", collection);
        params.set("ids", join(ids));
        let url = self.client.endpoint(&["meta"], &params)?;
        self.client.delete(url).await
    }

    /// Add one object. An empty `object.id` lets the service pick one.
    pub async fn add(
        &self,
        collection: &str,
        object: &CollectionObject,
        user_id: Option<&str>,
    ) -> Result<CollectionObjectResponse> {
        let body = AddCollectionRequest {
            id: &object.id,
            data: &object.data,
            user_id,
        };
        let url = self
            .client
            .endpoint(&["collections", collection], &QueryParams::new())?;
        self.client.post(url, &body).await
    }

    pub async fn get_object(&self, collection: &str, id: &str) -> Result<CollectionObjectResponse> {
        let url = self
            .client
            .endpoint(&["collections", collection, id], &QueryParams::new())?;
        self.client.get(url).await
    }

    /// Replace the data of one object.
    pub async fn update(&self, collection: &str, id: &str, data: &Extra) -> Result<CollectionObjectResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            data: &'a Extra,
        }
        let url = self
            .client
            .endpoint(&["collections", collection, id], &QueryParams::new())?;
        self.client.put(url, &Body { data }).await
    }

    pub async fn delete_object(&self, collection: &str, id: &str) -> Result<()> {
        let url = self
            .client
            .endpoint(&["collections", collection, id], &QueryParams::new())?;
        self.client.delete(url).await
    }
}
