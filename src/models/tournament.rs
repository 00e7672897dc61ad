// SPDX-License-Identifier: MIT

//! Tournament model and codec.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::codec::{self, Record};
use crate::error::{Result, SyncError};
use crate::models::Team;

/// A tournament between teams over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct Tournament {
    /// Store-assigned id (the record's path key)
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    /// Always on or after `start_date`
    pub end_date: DateTime<Utc>,
    /// Participating team ids, ordered and unique
    pub team_ids: Vec<String>,
    /// Resolved teams, populated lazily at most once per in-memory
    /// instance. Never encoded.
    pub teams: Option<Vec<Team>>,
}

impl Tournament {
    /// Decode a raw `/allTournaments/{id}` record.
    pub fn decode(id: &str, record: &Record) -> Result<Self> {
        let name = codec::require_str(record, "name")?;
        let start_date = codec::require_timestamp(record, "startDate")?;
        let end_date = codec::require_timestamp(record, "endDate")?;
        if end_date < start_date {
            return Err(SyncError::missing("endDate"));
        }
        let team_ids = codec::require_str_list(record, "teamIdentifiers")?;
        let unique: std::collections::HashSet<&String> = team_ids.iter().collect();
        if unique.len() != team_ids.len() {
            return Err(SyncError::missing("teamIdentifiers"));
        }

        Ok(Self {
            id: id.to_string(),
            name,
            start_date,
            end_date,
            team_ids,
            teams: None,
        })
    }

    /// Encode for the primary store.
    pub fn encode(&self) -> Record {
        let mut record = Record::new();
        record.insert("name".into(), json!(self.name));
        record.insert(
            "startDate".into(),
            json!(codec::format_timestamp(self.start_date)),
        );
        record.insert(
            "endDate".into(),
            json!(codec::format_timestamp(self.end_date)),
        );
        record.insert("teamIdentifiers".into(), json!(self.team_ids));
        record
    }

    /// Ranked (team, total points) pairs, highest first. Ties keep the
    /// original team order (stable sort).
    ///
    /// Requires `teams` to have been resolved via the repository first.
    pub fn leaderboard(&self) -> Result<Vec<(&Team, i64)>> {
        let teams = self.teams.as_ref().ok_or_else(|| SyncError::Consistency {
            message: format!("Teams not yet resolved for tournament {}", self.id),
            created_id: None,
        })?;

        let mut entries: Vec<(&Team, i64)> =
            teams.iter().map(|team| (team, team.total_points())).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries)
    }
}
