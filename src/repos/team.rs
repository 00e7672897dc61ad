// SPDX-License-Identifier: MIT

//! Team repository.
//!
//! Teams are the hub of the cross-entity invariants: membership
//! back-references on users, point accumulation, participation dates,
//! and the lazily resolved completed-challenge cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::codec::Record;
use crate::error::{Result, SyncError};
use crate::models::{CompletedChallenge, Completion, Team};
use crate::repos::{self, BatchOutcome, ChallengeRepo, UserRepo};
use crate::store::{paths, RemoteStore};

/// Fields for a team that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    /// Founding members in join order; must be non-empty
    pub participant_ids: Vec<String>,
}

#[derive(Clone)]
pub struct TeamRepo {
    store: Arc<dyn RemoteStore>,
    users: UserRepo,
    challenges: ChallengeRepo,
}

impl TeamRepo {
    pub fn new(store: Arc<dyn RemoteStore>, challenges: ChallengeRepo) -> Self {
        let users = UserRepo::new(store.clone());
        Self {
            store,
            users,
            challenges,
        }
    }

    /// Create a team, then add the membership back-reference to every
    /// founding member, strictly in join order.
    ///
    /// If a membership write fails after the team record was written,
    /// the team is NOT rolled back; the error carries the created id.
    pub async fn create_team(&self, new: &NewTeam) -> Result<Team> {
        if new.participant_ids.is_empty() {
            return Err(SyncError::BadRequest(
                "A team needs at least one participant".to_string(),
            ));
        }

        let id = self.store.generate_key(paths::TEAMS).await?;
        let point_distribution: BTreeMap<String, i64> = new
            .participant_ids
            .iter()
            .map(|user_id| (user_id.clone(), 0))
            .collect();

        let team = Team {
            id: id.clone(),
            name: new.name.clone(),
            participant_ids: new.participant_ids.clone(),
            point_distribution,
            participation_dates: BTreeMap::new(),
            completed_refs: BTreeMap::new(),
            associated_tournaments: vec![],
            completed_challenges: None,
        };

        self.store
            .set(&paths::record(paths::TEAMS, &id), &Value::Object(team.encode()))
            .await?;

        for user_id in &new.participant_ids {
            if let Err(err) = self.users.add_team_membership(user_id, &id).await {
                return Err(SyncError::Consistency {
                    message: format!(
                        "Team {id} created but adding membership for user {user_id} failed: {err}"
                    ),
                    created_id: Some(id),
                });
            }
        }

        tracing::info!(team_id = %id, name = %team.name, "Created team");
        Ok(team)
    }

    /// Create several teams in one flow and return the join code for
    /// the batch. The code is an explicit return value, threaded back
    /// to the caller rather than stashed in shared state.
    pub async fn create_teams(&self, specs: &[NewTeam]) -> Result<(Vec<Team>, String)> {
        if specs.is_empty() {
            return Err(SyncError::BadRequest("No teams to create".to_string()));
        }

        let mut teams = Vec::with_capacity(specs.len());
        for spec in specs {
            teams.push(self.create_team(spec).await?);
        }

        let join_code = join_code_from_key(&teams[0].id);
        tracing::info!(count = teams.len(), join_code = %join_code, "Created team batch");
        Ok((teams, join_code))
    }

    pub async fn get_one(&self, id: &str) -> Result<Team> {
        let record = repos::fetch_record(self.store.as_ref(), paths::TEAMS, id).await?;
        Team::decode(id, &record)
    }

    pub async fn get_many(&self, ids: &[String]) -> BatchOutcome<Team> {
        repos::fetch_many(ids, |id| async move { self.get_one(&id).await }).await
    }

    /// Add points to one participant's tally.
    pub async fn add_points(&self, team_id: &str, user_id: &str, delta: i64) -> Result<()> {
        let mut team = self.get_one(team_id).await?;
        if !team.has_participant(user_id) {
            return Err(SyncError::BadRequest(format!(
                "User {user_id} is not on team {team_id}"
            )));
        }

        let entry = team.point_distribution.entry(user_id.to_string()).or_insert(0);
        let updated = *entry + delta;
        if updated < 0 {
            return Err(SyncError::BadRequest(format!(
                "Points for user {user_id} would become negative"
            )));
        }
        *entry = updated;

        self.merge_team_fields(&team, &["pointDistribution"]).await
    }

    /// Append a completion timestamp for one participant.
    pub async fn record_participation(
        &self,
        team_id: &str,
        user_id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut team = self.get_one(team_id).await?;
        if !team.has_participant(user_id) {
            return Err(SyncError::BadRequest(format!(
                "User {user_id} is not on team {team_id}"
            )));
        }

        team.participation_dates
            .entry(user_id.to_string())
            .or_default()
            .push(completed_at);

        self.merge_team_fields(&team, &["participationDates"]).await
    }

    /// Record a challenge completion: award the points, append the
    /// participation date, and reference the challenge, in one merge.
    pub async fn record_completion(
        &self,
        team_id: &str,
        challenge_id: &str,
        user_id: &str,
        completed_at: DateTime<Utc>,
        points: u32,
    ) -> Result<()> {
        let mut team = self.get_one(team_id).await?;
        if !team.has_participant(user_id) {
            return Err(SyncError::BadRequest(format!(
                "User {user_id} is not on team {team_id}"
            )));
        }

        *team
            .point_distribution
            .entry(user_id.to_string())
            .or_insert(0) += i64::from(points);
        team.participation_dates
            .entry(user_id.to_string())
            .or_default()
            .push(completed_at);
        team.completed_refs
            .entry(challenge_id.to_string())
            .or_default()
            .insert(user_id.to_string(), completed_at);

        self.merge_team_fields(
            &team,
            &["pointDistribution", "participationDates", "completedChallenges"],
        )
        .await
    }

    /// Add a tournament back-reference. Already-attached is a no-op.
    pub async fn attach_tournament(&self, team_id: &str, tournament_id: &str) -> Result<()> {
        let mut team = self.get_one(team_id).await?;
        if team
            .associated_tournaments
            .iter()
            .any(|id| id == tournament_id)
        {
            return Ok(());
        }
        team.associated_tournaments.push(tournament_id.to_string());

        self.merge_team_fields(&team, &["associatedTournaments"]).await
    }

    /// Resolve the team's completed challenges into full entities.
    ///
    /// The cache is populated at most once per in-memory instance;
    /// calling again after a successful resolution is a reported no-op
    /// (`Ok(false)`), never an error. Completion references that no
    /// longer resolve are logged and skipped.
    pub async fn resolve_completed_challenges(&self, team: &mut Team) -> Result<bool> {
        if team.completed_challenges.is_some() {
            tracing::debug!(team_id = %team.id, "Completed challenges already resolved; no-op");
            return Ok(false);
        }

        if team.completed_refs.is_empty() {
            team.completed_challenges = Some(vec![]);
            return Ok(true);
        }

        let challenge_ids: Vec<String> = team.completed_refs.keys().cloned().collect();
        let challenges = self.challenges.get_many(&challenge_ids).await;
        for err in &challenges.errors {
            tracing::warn!(team_id = %team.id, error = %err, "Skipping unresolvable challenge");
        }

        let mut resolved = Vec::with_capacity(challenges.entities.len());
        for challenge in challenges.entities {
            let Some(completions_by_user) = team.completed_refs.get(&challenge.id) else {
                continue;
            };
            let user_ids: Vec<String> = completions_by_user.keys().cloned().collect();
            let users = self.users.get_many(&user_ids).await;
            for err in &users.errors {
                tracing::warn!(team_id = %team.id, error = %err, "Skipping unresolvable user");
            }

            let completions = users
                .entities
                .into_iter()
                .filter_map(|user| {
                    completions_by_user
                        .get(&user.id)
                        .map(|completed_at| Completion {
                            user,
                            completed_at: *completed_at,
                        })
                })
                .collect();

            resolved.push(CompletedChallenge {
                challenge,
                completions,
            });
        }

        team.completed_challenges = Some(resolved);
        Ok(true)
    }

    /// Merge a subset of the team's encoded fields back to the store.
    async fn merge_team_fields(&self, team: &Team, fields: &[&str]) -> Result<()> {
        let encoded = team.encode();
        let mut subset = Record::new();
        for field in fields {
            if let Some(value) = encoded.get(*field) {
                subset.insert(field.to_string(), value.clone());
            }
        }
        self.store
            .update_merge(&paths::record(paths::TEAMS, &team.id), &subset)
            .await
    }
}

/// Derive a human-enterable join code from a generated store key.
fn join_code_from_key(key: &str) -> String {
    let alnum: Vec<char> = key.chars().filter(char::is_ascii_alphanumeric).collect();
    let start = alnum.len().saturating_sub(6);
    alnum[start..].iter().collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_code_uses_key_tail() {
        assert_eq!(join_code_from_key("-K00000012ab"), "0012AB");
        assert_eq!(join_code_from_key("-Kx"), "KX");
    }
}
