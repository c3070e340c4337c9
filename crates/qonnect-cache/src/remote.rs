//! Remote blob-store layer
//!
//! Stores each entry as a JSON object at `{base_url}/{prefix}/{digest}.json`
//! over plain HTTP `GET`/`PUT`/`DELETE`. Any object store with an HTTP
//! gateway that accepts those verbs works.

use crate::backend::{CacheBackend, CacheEntry};
use crate::error::CacheError;
use crate::key::CacheKey;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Remote layer over an HTTP object store
///
/// Uses the blocking client, so it must not be called from inside an async
/// runtime worker; the service runs cache work on blocking threads.
#[derive(Debug, Clone)]
pub struct RemoteBlobBackend {
    client: Client,
    base_url: String,
    prefix: String,
    token: Option<String>,
}

impl RemoteBlobBackend {
    /// Create a remote layer
    ///
    /// # Arguments
    ///
    /// * `base_url` - Object store endpoint, e.g. `https://blobs.example/qonnect`
    /// * `prefix` - Folder for this deployment's objects
    /// * `token` - Optional bearer token
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        prefix: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            prefix: prefix.into().trim_matches('/').to_string(),
            token,
        })
    }

    fn folder_url(&self) -> String {
        if self.prefix.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, self.prefix)
        }
    }

    /// URL of the object holding `key`
    pub fn object_url(&self, key: &CacheKey) -> String {
        format!("{}/{}.json", self.folder_url(), key.digest())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl CacheBackend for RemoteBlobBackend {
    fn name(&self) -> &str {
        "remote"
    }

    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let url = self.object_url(key);
        let response = self.authorize(self.client.get(&url)).send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text()?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            status => Err(CacheError::Unavailable(format!("GET {} returned {}", url, status))),
        }
    }

    fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        let url = self.object_url(key);
        let response = self.authorize(self.client.put(&url)).json(entry).send()?;

        if response.status().is_success() {
            debug!(key = %key, "Remote entry written");
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!(
                "PUT {} returned {}",
                url,
                response.status()
            )))
        }
    }

    /// Delete the whole folder
    ///
    /// Only stores that accept a folder `DELETE` support this. Anything other
    /// than a 2xx, including 404, is reported as a failed clear; the tiered
    /// cache's invalidation marker keeps the surviving objects stale.
    fn clear(&self) -> Result<(), CacheError> {
        let url = self.folder_url();
        let response = self.authorize(self.client.delete(&url)).send()?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(CacheError::Unavailable(format!("DELETE {} returned {}", url, status))),
        }
    }
}
