//! Async client for the Beacon HTTP API.
//!
//! A thin wrapper: JSON in, JSON out, an error on any non-2xx status.
//! No caching, no retries, no offline queue.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use beacon_types::api::{
    CreateMessageResponse, ErrorResponse, SendMessageRequest, StatusResponse, ValidationDetails,
};
use beacon_types::models::{BROADCAST_RECEIVER, Category, Message, Priority};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or an undecodable success body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {error}")]
    Api {
        status: StatusCode,
        error: String,
        details: Option<ValidationDetails>,
    },
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Store a message; returns the assigned id.
    pub async fn send(&self, req: &SendMessageRequest) -> Result<i64, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/messages"))
            .json(req)
            .send()
            .await?;
        let body: CreateMessageResponse = decode(resp).await?;
        Ok(body.id)
    }

    /// The admin broadcast action: one row addressed to the sentinel
    /// receiver, not fanned out per recipient.
    pub async fn broadcast(
        &self,
        sender_id: &str,
        title: &str,
        content: &str,
        category: Option<Category>,
        priority: Option<Priority>,
    ) -> Result<i64, ClientError> {
        let req = SendMessageRequest {
            sender_id: sender_id.to_string(),
            receiver_id: BROADCAST_RECEIVER.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: category.map(|c| c.as_str().to_string()),
            priority: priority.map(|p| p.as_str().to_string()),
        };
        self.send(&req).await
    }

    pub async fn list_all(&self) -> Result<Vec<Message>, ClientError> {
        let resp = self.http.get(self.url("/api/messages")).send().await?;
        decode(resp).await
    }

    pub async fn list_filtered(
        &self,
        category: Option<Category>,
        priority: Option<Priority>,
    ) -> Result<Vec<Message>, ClientError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(c) = &category {
            query.push(("category", c.as_str()));
        }
        if let Some(p) = &priority {
            query.push(("priority", p.as_str()));
        }

        let resp = self
            .http
            .get(self.url("/api/messages"))
            .query(&query)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_unread(&self, user_id: &str) -> Result<Vec<Message>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/messages/{}/unread", user_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn get(&self, id: i64) -> Result<Message, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/messages/{}", id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/messages/{}/read", id)))
            .send()
            .await?;
        let _: StatusResponse = decode(resp).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/messages/{}", id)))
            .send()
            .await?;
        let _: StatusResponse = decode(resp).await?;
        Ok(())
    }
}

/// Decode a 2xx body as `T`; anything else becomes `ClientError::Api`,
/// carrying the server's error body when it is one of ours.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => Err(ClientError::Api {
            status,
            error: body.error,
            details: body.details,
        }),
        Err(_) => Err(ClientError::Api {
            status,
            error: text,
            details: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:3001/");
        assert_eq!(client.url("/api/messages"), "http://localhost:3001/api/messages");

        let client = ApiClient::new("http://localhost:3001");
        assert_eq!(client.url("/health"), "http://localhost:3001/health");
    }
}
