// SPDX-License-Identifier: MIT

//! User repository.

use std::sync::Arc;

use serde_json::{json, Value};
use validator::ValidateEmail;

use crate::codec::{self, Record};
use crate::error::{Result, SyncError};
use crate::models::User;
use crate::repos::{self, BatchOutcome};
use crate::store::{paths, RemoteStore};

#[derive(Clone)]
pub struct UserRepo {
    store: Arc<dyn RemoteStore>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Create a user. The email address must have a standard email
    /// shape; the store assigns the id.
    pub async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email_address: &str,
    ) -> Result<User> {
        if !email_address.validate_email() {
            return Err(SyncError::BadRequest(format!(
                "Invalid email address: {email_address}"
            )));
        }

        let id = self.store.generate_key(paths::USERS).await?;
        let user = User {
            id: id.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email_address: email_address.to_string(),
            associated_teams: vec![],
            profile_image_data: None,
            push_tokens: vec![],
        };

        self.store
            .set(
                &paths::record(paths::USERS, &id),
                &Value::Object(user.encode()),
            )
            .await?;

        tracing::info!(user_id = %id, "Created user");
        Ok(user)
    }

    pub async fn get_one(&self, id: &str) -> Result<User> {
        let record = repos::fetch_record(self.store.as_ref(), paths::USERS, id).await?;
        User::decode(id, &record)
    }

    /// Fetch several users concurrently. See [`repos::fetch_many`] for
    /// the aggregation contract.
    pub async fn get_many(&self, ids: &[String]) -> BatchOutcome<User> {
        repos::fetch_many(ids, |id| async move { self.get_one(&id).await }).await
    }

    /// Add a team to the user's membership set. Already-present ids are
    /// a no-op; sibling fields are untouched.
    pub async fn add_team_membership(&self, user_id: &str, team_id: &str) -> Result<()> {
        let mut user = self.get_one(user_id).await?;
        if user.associated_teams.iter().any(|id| id == team_id) {
            return Ok(());
        }
        user.associated_teams.push(team_id.to_string());

        let mut fields = Record::new();
        fields.insert("associatedTeams".into(), json!(user.associated_teams));
        self.store
            .update_merge(&paths::record(paths::USERS, user_id), &fields)
            .await
    }

    /// Set or clear the profile image.
    pub async fn update_profile_image(&self, user_id: &str, data: Option<&str>) -> Result<()> {
        // Confirm the user exists before writing.
        self.get_one(user_id).await?;

        let mut fields = Record::new();
        let value = match data {
            Some(data) => json!(data),
            None => json!(codec::SENTINEL),
        };
        fields.insert("profileImageData".into(), value);
        self.store
            .update_merge(&paths::record(paths::USERS, user_id), &fields)
            .await
    }
}
