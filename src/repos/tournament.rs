// SPDX-License-Identifier: MIT

//! Tournament repository.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::models::Tournament;
use crate::repos::{self, BatchOutcome, TeamRepo};
use crate::store::{paths, RemoteStore};

#[derive(Clone)]
pub struct TournamentRepo {
    store: Arc<dyn RemoteStore>,
    teams: TeamRepo,
}

impl TournamentRepo {
    pub fn new(store: Arc<dyn RemoteStore>, teams: TeamRepo) -> Self {
        Self { store, teams }
    }

    /// Create a tournament, then attach the back-reference on every
    /// listed team, strictly in declared order.
    ///
    /// If an attach fails after the tournament record was written, the
    /// record stays (no rollback); the surfaced `Consistency` error
    /// carries the new tournament id so the caller can act on the
    /// partial state.
    pub async fn create_tournament(
        &self,
        name: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        team_ids: Vec<String>,
    ) -> Result<Tournament> {
        if end_date < start_date {
            return Err(SyncError::BadRequest(
                "Tournament end date precedes its start date".to_string(),
            ));
        }
        let unique: HashSet<&String> = team_ids.iter().collect();
        if unique.len() != team_ids.len() {
            return Err(SyncError::BadRequest(
                "Duplicate team identifiers".to_string(),
            ));
        }

        let id = self.store.generate_key(paths::TOURNAMENTS).await?;
        let tournament = Tournament {
            id: id.clone(),
            name: name.to_string(),
            start_date,
            end_date,
            team_ids: team_ids.clone(),
            teams: None,
        };

        self.store
            .set(
                &paths::record(paths::TOURNAMENTS, &id),
                &Value::Object(tournament.encode()),
            )
            .await?;

        for team_id in &team_ids {
            if let Err(err) = self.teams.attach_tournament(team_id, &id).await {
                return Err(SyncError::Consistency {
                    message: format!(
                        "Tournament {id} created but attaching team {team_id} failed: {err}"
                    ),
                    created_id: Some(id),
                });
            }
        }

        tracing::info!(tournament_id = %id, name, teams = team_ids.len(), "Created tournament");
        Ok(tournament)
    }

    pub async fn get_one(&self, id: &str) -> Result<Tournament> {
        let record = repos::fetch_record(self.store.as_ref(), paths::TOURNAMENTS, id).await?;
        Tournament::decode(id, &record)
    }

    pub async fn get_many(&self, ids: &[String]) -> BatchOutcome<Tournament> {
        repos::fetch_many(ids, |id| async move { self.get_one(&id).await }).await
    }

    /// Resolve the tournament's teams into full entities, preserving
    /// the declared team order (the leaderboard tie-break depends on
    /// it). Populated at most once per in-memory instance; a second
    /// call is a reported no-op. Unresolvable teams are logged and
    /// skipped.
    pub async fn resolve_teams(&self, tournament: &mut Tournament) -> Result<bool> {
        if tournament.teams.is_some() {
            tracing::debug!(tournament_id = %tournament.id, "Teams already resolved; no-op");
            return Ok(false);
        }

        if tournament.team_ids.is_empty() {
            tournament.teams = Some(vec![]);
            return Ok(true);
        }

        let outcome = self.teams.get_many(&tournament.team_ids).await;
        for err in &outcome.errors {
            tracing::warn!(tournament_id = %tournament.id, error = %err, "Skipping unresolvable team");
        }

        // get_many completes out of order; restore declared order.
        let mut by_id: std::collections::HashMap<String, _> = outcome
            .entities
            .into_iter()
            .map(|team| (team.id.clone(), team))
            .collect();
        let ordered = tournament
            .team_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        tournament.teams = Some(ordered);
        Ok(true)
    }
}
