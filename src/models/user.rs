//! User model and codec.

use serde_json::{json, Value};

use crate::codec::{self, Record};
use crate::error::Result;

/// A registered app user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Store-assigned id (the record's path key)
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    /// Ids of teams this user belongs to; mutated only through
    /// team-membership operations.
    pub associated_teams: Vec<String>,
    /// Opaque encoded profile image, if one was uploaded
    pub profile_image_data: Option<String>,
    /// Device push tokens
    pub push_tokens: Vec<String>,
}

impl User {
    /// Decode a raw `/allUsers/{id}` record. Field order is fixed; the
    /// first missing or malformed field wins.
    pub fn decode(id: &str, record: &Record) -> Result<Self> {
        let first_name = codec::require_str(record, "firstName")?;
        let last_name = codec::require_str(record, "lastName")?;
        let email_address = codec::require_str(record, "emailAddress")?;
        let associated_teams = codec::opt_str_list(record, "associatedTeams")?;
        let profile_image_data = codec::opt_str(record, "profileImageData")?;
        let push_tokens = codec::opt_str_list(record, "pushTokens")?;

        Ok(Self {
            id: id.to_string(),
            first_name,
            last_name,
            email_address,
            associated_teams,
            profile_image_data,
            push_tokens,
        })
    }

    /// Encode for the primary store. Total for any valid user.
    pub fn encode(&self) -> Record {
        let mut record = Record::new();
        record.insert("firstName".into(), json!(self.first_name));
        record.insert("lastName".into(), json!(self.last_name));
        record.insert("emailAddress".into(), json!(self.email_address));
        if !self.associated_teams.is_empty() {
            record.insert("associatedTeams".into(), json!(self.associated_teams));
        }
        let image: Value = match &self.profile_image_data {
            Some(data) => json!(data),
            None => json!(codec::SENTINEL),
        };
        record.insert("profileImageData".into(), image);
        if self.push_tokens.is_empty() {
            record.insert("pushTokens".into(), json!([codec::SENTINEL]));
        } else {
            record.insert("pushTokens".into(), json!(self.push_tokens));
        }
        record
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
