//! Personalization endpoints. Resources and their parameters are defined per
//! application, so requests take free-form parameters and responses keep
//! their undeclared keys.

use serde::Serialize;

use crate::client::Client;
use crate::decode::Extra;
use crate::error::Result;
use crate::query::QueryParams;
use crate::response::PersonalizationResponse;

#[derive(Debug, Clone)]
pub struct PersonalizationClient {
    client: Client,
}

impl PersonalizationClient {
    pub(crate) fn new(client: Client) -> Self {
        PersonalizationClient { client }
    }

    pub async fn get(&self, resource: &str, params: &QueryParams) -> Result<PersonalizationResponse> {
        let url = self.client.personalization_endpoint(&resource_segments(resource), params)?;
        self.client.get(url).await
    }

    /// Body is sent as `{"data": data}`.
    pub async fn post(
        &self,
        resource: &str,
        params: &QueryParams,
        data: &Extra,
    ) -> Result<PersonalizationResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            data: &'a Extra,
        }
        let url = self.client.personalization_endpoint(&resource_segments(resource), params)?;
        self.client.post(url, &Body { data }).await
    }

    pub async fn delete(&self, resource: &str, params: &QueryParams) -> Result<()> {
        let url = self.client.personalization_endpoint(&resource_segments(resource), params)?;
        self.client.delete(url).await
    }
}

/// `a/b` names a nested resource; outer slashes are ignored.
fn resource_segments(resource: &str) -> Vec<&str> {
    resource.trim_matches('/').split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_segments() {
        assert_eq!(resource_segments("follow_recommendations"), ["follow_recommendations"]);
        assert_eq!(resource_segments("/items/"), ["items"]);
        assert_eq!(resource_segments("feed/recommendations"), ["feed", "recommendations"]);
        assert_eq!(resource_segments(""), [""]);
    }
}
