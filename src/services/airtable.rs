// SPDX-License-Identifier: MIT

//! Airtable client for the media challenge-entry table.
//!
//! Handles:
//! - Paged listing of challenge rows
//! - Per-row decoding into `ExternalChallengeRecord`
//! - Flipping a row's "Up to Date?" flag after promotion

use serde::Deserialize;
use serde_json::json;

use crate::codec::{self, Record};
use crate::config::Config;
use crate::error::{Result, SyncError};

/// Airtable REST client.
#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    base_id: String,
    table: String,
}

impl AirtableClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.airtable.com/v0".to_string(),
            api_key: config.airtable_api_key.clone(),
            base_id: config.airtable_base_id.clone(),
            table: config.airtable_table.clone(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(config: &Config, base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new(config)
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, self.table)
    }

    /// List every row in the table, following pagination offsets.
    pub async fn list_records(&self) -> Result<Vec<AirtableRow>> {
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.http.get(self.table_url()).bearer_auth(&self.api_key);
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SyncError::ExternalSource(e.to_string()))?;
            let page: ListResponse = self.check_response_json(response).await?;

            rows.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(rows)
    }

    /// Force a row's "Up to Date?" field to "Yes". All other fields are
    /// left as-is (PATCH merges).
    pub async fn mark_synced(&self, record_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.table_url(), record_id);
        let body = json!({ "fields": { "Up to Date?": "Yes" } });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::ExternalSource(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::ExternalSource(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::ExternalSource(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::ExternalSource(format!("JSON parse error: {e}")))
    }
}

/// One page of a table listing.
#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<AirtableRow>,
    offset: Option<String>,
}

/// Raw Airtable row: id plus loosely-typed cells.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRow {
    pub id: String,
    #[serde(default)]
    pub fields: Record,
}

/// A challenge entry sourced from the external table, decoded but not
/// yet promoted. Never mutated except the status flip after promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalChallengeRecord {
    pub record_id: String,
    pub title: String,
    pub prompt: String,
    pub point_value: u32,
    /// Direct link if present, else the first attachment's url
    pub media_link: String,
    pub up_to_date: bool,
}

impl ExternalChallengeRecord {
    /// Decode a raw row. Field order is fixed; the first missing or
    /// malformed field wins. Point values arrive string-encoded.
    pub fn decode(row: &AirtableRow) -> Result<Self> {
        let title = codec::require_str(&row.fields, "Title")?;
        let prompt = codec::require_str(&row.fields, "Prompt")?;
        let point_value = codec::require_u32(&row.fields, "Point value")?;
        let media_link = decode_media_link(&row.fields)?;
        let up_to_date = match row.fields.get("Up to Date?") {
            None => false,
            Some(value) => match value.as_str() {
                Some("Yes") => true,
                Some("No") => false,
                _ => return Err(SyncError::missing("Up to Date?")),
            },
        };

        Ok(Self {
            record_id: row.id.clone(),
            title,
            prompt,
            point_value,
            media_link,
            up_to_date,
        })
    }
}

/// Media resolution, first match wins: a "Link" cell parseable as a
/// URL, else the first "Media" attachment's nested url. Neither is an
/// error against the combined field name.
fn decode_media_link(fields: &Record) -> Result<String> {
    if let Some(link) = fields.get("Link").and_then(|v| v.as_str()) {
        if reqwest::Url::parse(link).is_ok() {
            return Ok(link.to_string());
        }
    }

    let first_attachment = fields
        .get("Media")
        .and_then(|v| v.as_array())
        .and_then(|items| items.first());
    if let Some(url) = first_attachment.and_then(|item| item.get("url")).and_then(|v| v.as_str()) {
        if reqwest::Url::parse(url).is_ok() {
            return Ok(url.to_string());
        }
    }

    Err(SyncError::missing("Link/Media"))
}
