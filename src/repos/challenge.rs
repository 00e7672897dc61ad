// SPDX-License-Identifier: MIT

//! Challenge repository.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::codec::{self, Record};
use crate::error::Result;
use crate::models::{Challenge, ChallengeMedia};
use crate::repos::{self, BatchOutcome};
use crate::store::{paths, ObjectStorage, RemoteStore};

/// Fields for a challenge that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub prompt: String,
    pub point_value: u32,
    pub media: Option<ChallengeMedia>,
}

#[derive(Clone)]
pub struct ChallengeRepo {
    store: Arc<dyn RemoteStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl ChallengeRepo {
    pub fn new(store: Arc<dyn RemoteStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    /// Create a challenge, posted now.
    pub async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge> {
        let id = self.store.generate_key(paths::CHALLENGES).await?;
        let challenge = Challenge {
            id: id.clone(),
            title: new.title,
            prompt: new.prompt,
            date_posted: codec::now_rounded(),
            point_value: new.point_value,
            media: new.media,
        };

        self.store
            .set(
                &paths::record(paths::CHALLENGES, &id),
                &Value::Object(challenge.encode()),
            )
            .await?;

        tracing::info!(challenge_id = %id, title = %challenge.title, "Created challenge");
        Ok(challenge)
    }

    pub async fn get_one(&self, id: &str) -> Result<Challenge> {
        let record = repos::fetch_record(self.store.as_ref(), paths::CHALLENGES, id).await?;
        Challenge::decode(id, &record)
    }

    pub async fn get_many(&self, ids: &[String]) -> BatchOutcome<Challenge> {
        repos::fetch_many(ids, |id| async move { self.get_one(&id).await }).await
    }

    pub async fn update_title(&self, id: &str, title: &str) -> Result<()> {
        self.merge_field(id, "title", json!(title)).await
    }

    pub async fn update_prompt(&self, id: &str, prompt: &str) -> Result<()> {
        self.merge_field(id, "prompt", json!(prompt)).await
    }

    pub async fn update_point_value(&self, id: &str, point_value: u32) -> Result<()> {
        self.merge_field(id, "pointValue", json!(point_value)).await
    }

    /// Replace the media field with the composite-encoded value.
    pub async fn update_media(&self, id: &str, media: &ChallengeMedia) -> Result<()> {
        self.merge_field(id, "media", json!(media.encode())).await
    }

    /// Remove a challenge's media.
    ///
    /// When the media was uploaded (has a storage path), the stored
    /// object is deleted first; if that fails, the media field is left
    /// untouched and the store's error is surfaced. Link-only media
    /// skips straight to clearing the field.
    pub async fn remove_media(&self, id: &str) -> Result<()> {
        let challenge = self.get_one(id).await?;
        let Some(media) = challenge.media else {
            return Ok(());
        };

        if let Some(path) = &media.storage_path {
            self.storage.delete_object(path).await?;
        }

        self.merge_field(id, "media", json!(codec::SENTINEL)).await?;
        tracing::info!(challenge_id = %id, "Removed challenge media");
        Ok(())
    }

    async fn merge_field(&self, id: &str, field: &str, value: Value) -> Result<()> {
        // Confirm the challenge exists before writing.
        self.get_one(id).await?;

        let mut fields = Record::new();
        fields.insert(field.to_string(), value);
        self.store
            .update_merge(&paths::record(paths::CHALLENGES, id), &fields)
            .await
    }
}
