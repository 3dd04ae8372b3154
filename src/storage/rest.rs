//! REST-backed tabular and blob stores
//!
//! The store service exposes three endpoints:
//!
//! - `GET  {base}/tables/{table}/key-column`: the full key column as
//!   `{"values": [...]}`, used to rebuild the dedup index.
//! - `POST {base}/tables/{table}/rows`: append rows at an explicit
//!   `start_row`, body `{"start_row": N, "rows": [[...], ...]}`.
//! - `PUT  {base}/blobs/{folder}/{filename}`: create a plain-text blob.

use crate::storage::traits::{BlobStore, StoreError, StoreResult, TabularStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("magpie-ledger/", env!("CARGO_PKG_VERSION"));

/// HTTP client over the tabular/blob store service
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct KeyColumnResponse {
    values: Vec<String>,
}

#[derive(Serialize)]
struct AppendRequest<'a> {
    start_row: u64,
    rows: &'a [Vec<String>],
}

impl RestStore {
    /// Builds a store client for `base_url`, authenticating with `token`
    /// when one is provided.
    pub fn new(base_url: &str, token: Option<String>) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(
        url: &str,
        response: reqwest::Response,
    ) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl TabularStore for RestStore {
    async fn read_key_column(&self, table: &str) -> StoreResult<Vec<String>> {
        let url = format!("{}/tables/{}/key-column", self.base_url, table);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StoreError::Http {
                url: url.clone(),
                source: e,
            })?;
        let response = Self::check_status(&url, response).await?;

        let body: KeyColumnResponse =
            response.json().await.map_err(|e| StoreError::Malformed {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(body.values)
    }

    async fn append_rows(
        &self,
        table: &str,
        start_row: u64,
        rows: &[Vec<String>],
    ) -> StoreResult<()> {
        let url = format!("{}/tables/{}/rows", self.base_url, table);
        let body = AppendRequest { start_row, rows };

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Http {
                url: url.clone(),
                source: e,
            })?;
        Self::check_status(&url, response).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for RestStore {
    async fn put(
        &self,
        folder: &str,
        filename: &str,
        content: &str,
        mime_type: &str,
    ) -> StoreResult<()> {
        let url = format!("{}/blobs/{}/{}", self.base_url, folder, filename);

        let response = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Http {
                url: url.clone(),
                source: e,
            })?;
        Self::check_status(&url, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_key_column_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tables/postings/key-column"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": ["101", "102", "FAILURE"]
            })))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), None).unwrap();
        let values = store.read_key_column("postings").await.unwrap();
        assert_eq!(values, vec!["101", "102", "FAILURE"]);
    }

    #[tokio::test]
    async fn append_sends_start_row_and_rows() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({
            "start_row": 4,
            "rows": [["103", "https://forum.example.com/t/x/103", "2026-08-27 10:00:00"]]
        });
        Mock::given(method("POST"))
            .and(path("/tables/postings/rows"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), None).unwrap();
        store
            .append_rows(
                "postings",
                4,
                &[vec![
                    "103".to_string(),
                    "https://forum.example.com/t/x/103".to_string(),
                    "2026-08-27 10:00:00".to_string(),
                ]],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn blob_put_sets_content_type_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/blobs/posting-texts/103_text.txt"))
            .and(header("content-type", "text/plain"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), Some("sekrit".to_string())).unwrap();
        store
            .put("posting-texts", "103_text.txt", "body text", "text/plain")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tables/postings/key-column"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), None).unwrap();
        let err = store.read_key_column("postings").await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
    }
}
