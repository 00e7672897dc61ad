// SPDX-License-Identifier: MIT

//! Team model and codec.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::codec::{self, Record};
use crate::error::{Result, SyncError};
use crate::models::{Challenge, User};

/// A team of users competing in challenges.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Store-assigned id (the record's path key)
    pub id: String,
    pub name: String,
    /// User ids in join order; never empty
    pub participant_ids: Vec<String>,
    /// Accumulated points per user; keys are a subset of participants
    pub point_distribution: BTreeMap<String, i64>,
    /// Challenge-completion timestamps per user, oldest first
    pub participation_dates: BTreeMap<String, Vec<DateTime<Utc>>>,
    /// Completion references: challenge id -> (user id -> completed at)
    pub completed_refs: BTreeMap<String, BTreeMap<String, DateTime<Utc>>>,
    /// Tournaments this team was attached to
    pub associated_tournaments: Vec<String>,
    /// Resolved completed challenges, populated lazily at most once per
    /// in-memory instance. Never encoded.
    pub completed_challenges: Option<Vec<CompletedChallenge>>,
}

/// A completed challenge with the users who finished it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedChallenge {
    pub challenge: Challenge,
    pub completions: Vec<Completion>,
}

/// One user's completion of a challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub user: User,
    pub completed_at: DateTime<Utc>,
}

impl Team {
    /// Decode a raw `/allTeams/{id}` record.
    pub fn decode(id: &str, record: &Record) -> Result<Self> {
        let name = codec::require_str(record, "name")?;

        let participant_ids = codec::require_str_list(record, "participantIdentifiers")?;
        if participant_ids.is_empty() {
            return Err(SyncError::missing("participantIdentifiers"));
        }

        let point_distribution = decode_points(record, &participant_ids)?;
        let participation_dates = decode_participation(record)?;
        let completed_refs = decode_completed(record)?;
        let associated_tournaments = codec::opt_str_list(record, "associatedTournaments")?;

        Ok(Self {
            id: id.to_string(),
            name,
            participant_ids,
            point_distribution,
            participation_dates,
            completed_refs,
            associated_tournaments,
            completed_challenges: None,
        })
    }

    /// Encode for the primary store. The resolved-challenge cache is
    /// in-memory only and never written.
    pub fn encode(&self) -> Record {
        let mut record = Record::new();
        record.insert("name".into(), json!(self.name));
        record.insert(
            "participantIdentifiers".into(),
            json!(self.participant_ids),
        );
        if !self.point_distribution.is_empty() {
            record.insert("pointDistribution".into(), json!(self.point_distribution));
        }
        if !self.participation_dates.is_empty() {
            let dates: BTreeMap<&String, Vec<String>> = self
                .participation_dates
                .iter()
                .map(|(user, stamps)| {
                    let formatted = stamps
                        .iter()
                        .map(|ts| codec::format_timestamp(*ts))
                        .collect();
                    (user, formatted)
                })
                .collect();
            record.insert("participationDates".into(), json!(dates));
        }
        if !self.completed_refs.is_empty() {
            let completed: BTreeMap<&String, BTreeMap<&String, String>> = self
                .completed_refs
                .iter()
                .map(|(challenge, users)| {
                    let users = users
                        .iter()
                        .map(|(user, ts)| (user, codec::format_timestamp(*ts)))
                        .collect();
                    (challenge, users)
                })
                .collect();
            record.insert("completedChallenges".into(), json!(completed));
        }
        if !self.associated_tournaments.is_empty() {
            record.insert(
                "associatedTournaments".into(),
                json!(self.associated_tournaments),
            );
        }
        record
    }

    /// Sum of all accumulated points. Non-negative by invariant.
    pub fn total_points(&self) -> i64 {
        self.point_distribution.values().sum()
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }
}

fn decode_points(record: &Record, participants: &[String]) -> Result<BTreeMap<String, i64>> {
    let Some(map) = codec::opt_map(record, "pointDistribution")? else {
        return Ok(BTreeMap::new());
    };

    let mut points = BTreeMap::new();
    for (user_id, value) in map {
        // Points may only be tracked for actual participants.
        if !participants.contains(user_id) {
            return Err(SyncError::missing("pointDistribution"));
        }
        let amount = match value {
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        let amount = amount.ok_or_else(|| SyncError::missing("pointDistribution"))?;
        points.insert(user_id.clone(), amount);
    }
    Ok(points)
}

fn decode_participation(record: &Record) -> Result<BTreeMap<String, Vec<DateTime<Utc>>>> {
    let Some(map) = codec::opt_map(record, "participationDates")? else {
        return Ok(BTreeMap::new());
    };

    let mut dates = BTreeMap::new();
    for (user_id, value) in map {
        let Value::Array(items) = value else {
            return Err(SyncError::missing("participationDates"));
        };
        let mut stamps = Vec::with_capacity(items.len());
        for item in items {
            let raw = item
                .as_str()
                .ok_or_else(|| SyncError::missing("participationDates"))?;
            let ts = codec::parse_timestamp(raw)
                .ok_or_else(|| SyncError::missing("participationDates"))?;
            stamps.push(ts);
        }
        dates.insert(user_id.clone(), stamps);
    }
    Ok(dates)
}

fn decode_completed(record: &Record) -> Result<BTreeMap<String, BTreeMap<String, DateTime<Utc>>>> {
    let Some(map) = codec::opt_map(record, "completedChallenges")? else {
        return Ok(BTreeMap::new());
    };

    let mut completed = BTreeMap::new();
    for (challenge_id, value) in map {
        let Value::Object(users) = value else {
            return Err(SyncError::missing("completedChallenges"));
        };
        let mut entries = BTreeMap::new();
        for (user_id, raw) in users {
            let raw = raw
                .as_str()
                .ok_or_else(|| SyncError::missing("completedChallenges"))?;
            let ts = codec::parse_timestamp(raw)
                .ok_or_else(|| SyncError::missing("completedChallenges"))?;
            entries.insert(user_id.clone(), ts);
        }
        completed.insert(challenge_id.clone(), entries);
    }
    Ok(completed)
}
