//! HTTP implementation of [`ChatApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{ChatApi, ChatReply, ChatRequest, ClientError, HistoryContent, HistoryList};
use crate::config::Config;
use crate::history::HistoryEntry;

/// Longest body excerpt carried in a [`ClientError::Status`].
const BODY_PREVIEW_CHARS: usize = 200;

/// Chat backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpChatApi {
    /// Create a client for the given base URL with no request timeout.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::build(base_url, None)
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::build(&config.base_url, config.request_timeout())
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response, ClientError> {
        debug!(%method, %url, "Sending request");
        let response = self.client.request(method, url).send().await?;
        debug!(status = %response.status().as_u16(), "Response received");
        Ok(response)
    }

    /// Decode a JSON body the way a browser `fetch` + `json()` would: the
    /// status is only consulted when the body is not JSON.
    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|source| {
            if status.is_success() {
                ClientError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                }
            } else {
                ClientError::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
                }
            }
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_histories(&self) -> Result<HistoryList, ClientError> {
        let response = self.send(Method::GET, self.endpoint(&["history"])).await?;
        Self::decode("GET /history", response).await
    }

    async fn fetch_history(&self, entry: &HistoryEntry) -> Result<HistoryContent, ClientError> {
        let url = self.endpoint(&["history", entry.filename()]);
        let response = self.send(Method::GET, url).await?;
        Self::decode("GET /history/{filename}", response).await
    }

    async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.endpoint(&["chat"]);
        debug!(%url, chars = message.chars().count(), "Sending chat message");
        let response = self
            .client
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await?;
        Self::decode("POST /chat", response).await
    }

    async fn new_chat(&self) -> Result<Value, ClientError> {
        let response = self.send(Method::POST, self.endpoint(&["new_chat"])).await?;
        Self::decode("POST /new_chat", response).await
    }

    async fn delete_history(&self, entry: &HistoryEntry) -> Result<(), ClientError> {
        let url = self.endpoint(&["history", entry.filename()]);
        self.send(Method::DELETE, url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let api = HttpChatApi::new("http://localhost:8000").unwrap();
        assert_eq!(
            api.endpoint(&["history"]).as_str(),
            "http://localhost:8000/history"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpChatApi::new("http://example.com/api/").unwrap();
        assert_eq!(
            api.endpoint(&["chat"]).as_str(),
            "http://example.com/api/chat"
        );
    }

    #[test]
    fn test_endpoint_encodes_filename() {
        let api = HttpChatApi::new("http://localhost:8000").unwrap();
        let url = api.endpoint(&["history", "my chat#1.md"]);
        assert_eq!(url.as_str(), "http://localhost:8000/history/my%20chat%231.md");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpChatApi::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));

        let err = HttpChatApi::new("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }
}
