use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::{KeyValueService, ServiceError};

#[derive(Debug, Error)]
#[error("invalid base url {url:?}: {reason}")]
pub struct InvalidBaseUrl {
    url: String,
    reason: String,
}

/// [`KeyValueService`] over HTTP. Requests use the client's default (unbounded) timeout.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: Client,
    base_url: Url,
}

impl HttpService {
    pub fn new(base_url: &str) -> Result<Self, InvalidBaseUrl> {
        let invalid = |reason: String| InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("url cannot have path segments".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: parsed,
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();

        // checked in `new`, a base url always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }
}

fn ensure_ok(response: Response) -> Result<Response, ServiceError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        status => Err(ServiceError::Status(status)),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    Ok(ensure_ok(response)?.json().await?)
}

impl KeyValueService for HttpService {
    async fn create(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint(&["create"]))
            .query(&[("key", key), ("value", value)])
            .send()
            .await?;

        ensure_ok(response).map(|_| ())
    }

    async fn read(&self, key: &str) -> Result<Value, ServiceError> {
        let response = self
            .client
            .get(self.endpoint(&["read", key]))
            .send()
            .await?;

        decode(response).await
    }

    async fn modify(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .put(self.endpoint(&["modify", key]))
            .query(&[("value", value)])
            .send()
            .await?;

        ensure_ok(response).map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.endpoint(&["delete", key]))
            .send()
            .await?;

        ensure_ok(response).map(|_| ())
    }

    async fn list(&self) -> Result<Vec<String>, ServiceError> {
        let response = self.client.get(self.endpoint(&["list"])).send().await?;

        decode(response).await
    }
}
