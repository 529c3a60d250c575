//! Users: profile objects referenced from activities as `SU:<id>`.

use serde::Serialize;

use crate::client::Client;
use crate::decode::Extra;
use crate::error::Result;
use crate::query::QueryParams;
use crate::response::UserResponse;
use crate::types::User;

#[derive(Debug, Clone)]
pub struct UsersClient {
    client: Client,
}

impl UsersClient {
    pub(crate) fn new(client: Client) -> Self {
        UsersClient { client }
    }

    pub fn create_reference(&self, id: &str) -> String {
        format!("SU:{id}")
    }

    /// Create `user`. With `get_or_create`, an existing user is returned
    /// unchanged instead of failing with a conflict.
    pub async fn add(&self, user: &User, get_or_create: bool) -> Result<UserResponse> {
        let mut params = QueryParams::new();
        if get_or_create {
            params.set("get_or_create", "true");
        }
        let url = self.client.endpoint(&["user"], &params)?;
        self.client.post(url, user).await
    }

    pub async fn get(&self, id: &str) -> Result<UserResponse> {
        let url = self.client.endpoint(&["user", id], &QueryParams::new())?;
        self.client.get(url).await
    }

    /// Replace the user's data.
    pub async fn update(&self, id: &str, data: &Extra) -> Result<UserResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            data: &'a Extra,
        }
        let url = self.client.endpoint(&["user", id], &QueryParams::new())?;
        self.client.put(url, &Body { data }).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.client.endpoint(&["user", id], &QueryParams::new())?;
        self.client.delete(url).await
    }
}
