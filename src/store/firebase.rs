// SPDX-License-Identifier: MIT

//! Firebase-backed store implementations over the REST API.
//!
//! The Realtime Database maps directly onto the gateway contract:
//! GET/PUT/PATCH/DELETE on `{base}/{path}.json`, with POST producing a
//! push key for new records. Media objects live in Firebase Storage.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::codec::Record;
use crate::error::{Result, SyncError};
use crate::store::{ObjectStorage, RemoteStore};

/// Realtime Database client.
#[derive(Clone)]
pub struct FirebaseStore {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl FirebaseStore {
    pub fn new(base_url: String, auth_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn url(&self, path: &str) -> String {
        let mut url = format!("{}/{}.json", self.base_url, path.trim_matches('/'));
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    /// Check response status, mapping failures to a store error.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Store(format!("HTTP {status}: {body}")))
    }
}

/// Response of a push-key POST.
#[derive(Deserialize)]
struct PushKeyResponse {
    name: String,
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;

        let value: Value = self
            .check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Store(format!("JSON parse error: {e}")))?;

        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        let response = self
            .http
            .put(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn update_merge(&self, path: &str, fields: &Record) -> Result<()> {
        // PATCH merges top-level fields and leaves siblings in place.
        let response = self
            .http
            .patch(self.url(path))
            .json(fields)
            .send()
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn generate_key(&self, collection_path: &str) -> Result<String> {
        // POSTing null allocates a push key without storing a child.
        let response = self
            .http
            .post(self.url(collection_path))
            .json(&Value::Null)
            .send()
            .await
            .map_err(|e| SyncError::KeyGeneration(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SyncError::KeyGeneration(format!("HTTP {status}")));
        }

        let key: PushKeyResponse = response
            .json()
            .await
            .map_err(|e| SyncError::KeyGeneration(e.to_string()))?;

        tracing::debug!(collection = collection_path, key = %key.name, "Generated push key");
        Ok(key.name)
    }
}

/// Firebase Storage client for uploaded challenge media.
#[derive(Clone)]
pub struct FirebaseMediaStorage {
    http: reqwest::Client,
    bucket: String,
}

impl FirebaseMediaStorage {
    pub fn new(bucket: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o/{}",
            self.bucket,
            urlencoding::encode(path)
        )
    }
}

#[async_trait]
impl ObjectStorage for FirebaseMediaStorage {
    async fn delete_object(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.object_url(path))
            .send()
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Store(format!("HTTP {status}: {body}")));
        }

        tracing::debug!(path, "Deleted stored media object");
        Ok(())
    }
}
