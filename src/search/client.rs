//! HTTP client for the Azure AI Search documents API.

use crate::config::Config;
use crate::search::types::{DocumentIndex, IndexDocument, IndexError, SearchResponse};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::json;
use std::time::Duration;

/// Lightweight client that runs full-text queries against one search index.
pub struct AzureSearchIndex {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) index_name: String,
    pub(crate) api_key: String,
    pub(crate) api_version: String,
    pub(crate) top: usize,
}

impl AzureSearchIndex {
    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        let client = Client::builder()
            .user_agent("brand-guardian/0.1")
            .timeout(Duration::from_secs(config.search_timeout_secs))
            .build()?;

        let base_url =
            normalize_base_url(&config.search_endpoint).map_err(IndexError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            index = %config.search_index_name,
            top = config.search_top,
            has_api_key = !config.search_api_key.is_empty(),
            "Initialized search HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            index_name: config.search_index_name.clone(),
            api_key: config.search_api_key.clone(),
            api_version: config.search_api_version.clone(),
            top: config.search_top,
        })
    }

    /// Run a simple full-text query and return at most `top` documents in service order.
    pub async fn search_documents(&self, query: &str) -> Result<Vec<IndexDocument>, IndexError> {
        let body = json!({
            "search": query,
            "top": self.top,
        });

        let response = self
            .request(
                Method::POST,
                &format!("indexes/{}/docs/search", self.index_name),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = IndexError::UnexpectedStatus { status, body };
            tracing::error!(index = %self.index_name, error = %error, "Search request failed");
            return Err(error);
        }

        let payload: SearchResponse = response.json().await?;
        let documents: Vec<IndexDocument> = payload
            .value
            .into_iter()
            .take(self.top)
            .map(IndexDocument::from_fields)
            .collect();
        tracing::debug!(
            index = %self.index_name,
            documents = documents.len(),
            "Search request completed"
        );
        Ok(documents)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self
            .client
            .request(method, url)
            .query(&[("api-version", self.api_version.as_str())]);
        if !self.api_key.is_empty() {
            req = req.header("api-key", &self.api_key);
        }
        req
    }
}

#[async_trait]
impl DocumentIndex for AzureSearchIndex {
    async fn search(&self, query: &str) -> Result<Vec<IndexDocument>, IndexError> {
        self.search_documents(query).await
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use reqwest::StatusCode;

    fn index_for(server: &MockServer, top: usize) -> AzureSearchIndex {
        AzureSearchIndex {
            client: Client::builder()
                .user_agent("brand-guardian-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            index_name: "compliance-index".into(),
            api_key: "secret".into(),
            api_version: "2023-11-01".into(),
            top,
        }
    }

    #[tokio::test]
    async fn search_emits_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/compliance-index/docs/search")
                    .query_param("api-version", "2023-11-01")
                    .header("api-key", "secret")
                    .json_body(json!({ "search": "compliance guidelines", "top": 5 }));
                then.status(200).json_body(json!({
                    "@odata.context": "ignored",
                    "value": [
                        {
                            "@search.score": 2.5,
                            "id": "doc-1",
                            "content": "Never promise guaranteed results."
                        },
                        {
                            "@search.score": 1.0,
                            "id": "doc-2",
                            "source": "brand.pdf"
                        }
                    ]
                }));
            })
            .await;

        let results = index_for(&server, 5)
            .search("compliance guidelines")
            .await
            .expect("search request");

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id.as_deref(), Some("doc-1"));
        assert_eq!(results[0].score, Some(2.5));
        assert_eq!(
            results[0].content(),
            Some("Never promise guaranteed results.")
        );
        assert!(results[1].content().is_none());
        assert_eq!(results[1].fields["source"], "brand.pdf");
    }

    #[tokio::test]
    async fn empty_value_list_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/compliance-index/docs/search");
                then.status(200).json_body(json!({ "value": [] }));
            })
            .await;

        let results = index_for(&server, 50)
            .search("nothing matches")
            .await
            .expect("search request");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/compliance-index/docs/search");
                then.status(403).body("forbidden");
            })
            .await;

        let error = index_for(&server, 50)
            .search("compliance guidelines")
            .await
            .expect_err("403 should fail");
        match error {
            IndexError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn endpoint_formatting_strips_duplicate_slashes() {
        let base = normalize_base_url("https://demo.search.windows.net/").expect("url");
        assert_eq!(
            format_endpoint(&base, "/indexes/a/docs/search"),
            "https://demo.search.windows.net/indexes/a/docs/search"
        );
        assert!(normalize_base_url("not a url").is_err());
    }
}
