use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors::GcpError;
use super::operation::Operation;

pub const COMPUTE_API_BASE: &str = "https://compute.googleapis.com/compute/v1";
pub const SQL_API_BASE: &str = "https://sqladmin.googleapis.com/sql/v1beta4";

/// Upper bound for a single HTTP exchange.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// One page of a `list` response. Compute and Cloud SQL share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// The fields the sweeper needs from any listed resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiItem {
    pub name: String,
    #[serde(default)]
    pub self_link: String,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

/// Thin authenticated client for the compute and Cloud SQL admin REST APIs.
///
/// Region and zone names are fetched once per project and cached.
pub struct GcpClient {
    http: reqwest::Client,
    token: String,
    compute_base: String,
    sql_base: String,
    locations: Mutex<HashMap<String, Vec<String>>>,
}

impl GcpClient {
    pub fn new(token: impl Into<String>) -> Result<Self, GcpError> {
        Self::with_endpoints(token, COMPUTE_API_BASE, SQL_API_BASE)
    }

    pub fn with_endpoints(
        token: impl Into<String>,
        compute_base: impl Into<String>,
        sql_base: impl Into<String>,
    ) -> Result<Self, GcpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            compute_base: compute_base.into().trim_end_matches('/').to_string(),
            sql_base: sql_base.into().trim_end_matches('/').to_string(),
            locations: Mutex::new(HashMap::new()),
        })
    }

    pub fn project_url(&self, project: &str) -> String {
        format!("{}/projects/{}", self.compute_base, project)
    }

    pub fn sql_project_url(&self, project: &str) -> String {
        format!("{}/projects/{}", self.sql_base, project)
    }

    /// Fetch every listed resource behind `url`.
    pub async fn list_all(&self, url: &str) -> Result<Vec<ApiItem>, GcpError> {
        let items = self.fetch_all::<ApiItem>(url).await?;
        debug!(event = "core.gcp.list_completed", url = url, count = items.len());
        Ok(items)
    }

    /// Follow `nextPageToken` until the last page.
    async fn fetch_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, GcpError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url).bearer_auth(&self.token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListPage<T> = decode(request.send().await?).await?;
            items.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }

    pub async fn regions(&self, project: &str) -> Result<Vec<String>, GcpError> {
        self.locations(project, "regions").await
    }

    pub async fn zones(&self, project: &str) -> Result<Vec<String>, GcpError> {
        self.locations(project, "zones").await
    }

    async fn locations(&self, project: &str, collection: &str) -> Result<Vec<String>, GcpError> {
        let key = format!("{}/{}", project, collection);
        let mut cache = self.locations.lock().await;
        if let Some(names) = cache.get(&key) {
            return Ok(names.clone());
        }

        let url = format!("{}/{}", self.project_url(project), collection);
        let names: Vec<String> = self
            .fetch_all::<Location>(&url)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();

        info!(
            event = "core.gcp.locations_loaded",
            project = project,
            collection = collection,
            count = names.len()
        );
        cache.insert(key, names.clone());
        Ok(names)
    }

    /// Issue a DELETE against a resource URL.
    pub async fn delete(&self, url: &str) -> Result<Operation, GcpError> {
        debug!(event = "core.gcp.delete_started", url = url);
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_operation(&self, url: &str) -> Result<Operation, GcpError> {
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GcpError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GcpError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> GcpClient {
        GcpClient::with_endpoints(
            "test-token",
            format!("{}/compute/v1", server.url()),
            format!("{}/sql/v1beta4", server.url()),
        )
        .unwrap()
    }

    #[test]
    fn test_project_urls_trim_trailing_slash() {
        let client = GcpClient::with_endpoints(
            "token",
            "http://localhost:8080/compute/v1/",
            "http://localhost:8080/sql/v1beta4/",
        )
        .unwrap();
        assert_eq!(
            client.project_url("ci-project"),
            "http://localhost:8080/compute/v1/projects/ci-project"
        );
        assert_eq!(
            client.sql_project_url("ci-project"),
            "http://localhost:8080/sql/v1beta4/projects/ci-project"
        );
    }

    #[test]
    fn test_list_page_without_items() {
        let page: ListPage<ApiItem> = serde_json::from_str(r#"{"kind": "compute#diskList"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_list_all_follows_page_tokens() {
        let mut server = mockito::Server::new_async().await;
        let path = "/compute/v1/projects/ci-project/global/networks";
        let first = server
            .mock("GET", path)
            .match_query(Matcher::Exact(String::new()))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"name": "ci-net-1"}], "nextPageToken": "page-2"}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", path)
            .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"name": "ci-net-2"}], "nextPageToken": ""}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server);
        let url = format!("{}/global/networks", client.project_url("ci-project"));
        let names: Vec<String> = client
            .list_all(&url)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();

        assert_eq!(names, vec!["ci-net-1", "ci-net-2"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_zones_are_fetched_once_per_project() {
        let mut server = mockito::Server::new_async().await;
        let zones = server
            .mock("GET", "/compute/v1/projects/ci-project/zones")
            .with_status(200)
            .with_body(r#"{"items": [{"name": "us-east1-b"}, {"name": "us-east1-c"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server);
        assert_eq!(
            client.zones("ci-project").await.unwrap(),
            vec!["us-east1-b", "us-east1-c"]
        );
        assert_eq!(client.zones("ci-project").await.unwrap().len(), 2);
        zones.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        let _denied = server
            .mock("GET", "/compute/v1/projects/ci-project/regions")
            .with_status(403)
            .with_body("denied")
            .create_async()
            .await;

        let error = client(&server).regions("ci-project").await.unwrap_err();
        match error {
            GcpError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
