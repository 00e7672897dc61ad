// SPDX-License-Identifier: MIT

//! Entity repositories: typed CRUD over the remote store.
//!
//! Each repository composes the entity codec with the store gateway and
//! enforces the cross-entity invariants (membership back-references,
//! tournament attachment, media cleanup).

pub mod challenge;
pub mod team;
pub mod tournament;
pub mod user;

pub use challenge::{ChallengeRepo, NewChallenge};
pub use team::{NewTeam, TeamRepo};
pub use tournament::TournamentRepo;
pub use user::UserRepo;

use futures_util::{stream, StreamExt};
use serde_json::{json, Value};

use crate::error::{Result, SyncError};
use crate::store::{paths, RemoteStore};

const MAX_CONCURRENT_FETCHES: usize = 16;

/// Result of a batch fetch: the entities that resolved plus one error
/// descriptor per id that did not.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub entities: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> BatchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fan-out one fetch per id, fan-in once every fetch has completed.
///
/// Completion order among individual fetches is unspecified; the
/// aggregate is produced exactly once, only after all have settled.
/// An empty id list short-circuits with the canonical error.
pub(crate) async fn fetch_many<T, F, Fut>(ids: &[String], fetch: F) -> BatchOutcome<T>
where
    F: Fn(String) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    if ids.is_empty() {
        return BatchOutcome {
            entities: vec![],
            errors: vec![SyncError::NO_IDENTIFIERS.to_string()],
        };
    }

    let results = stream::iter(ids.to_vec())
        .map(|id| {
            let fut = fetch(id.clone());
            async move { (id, fut.await) }
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect::<Vec<_>>()
        .await;

    let mut outcome = BatchOutcome {
        entities: Vec::with_capacity(results.len()),
        errors: vec![],
    };
    for (id, result) in results {
        match result {
            Ok(entity) => outcome.entities.push(entity),
            Err(err) => outcome.errors.push(format!("{id} – {err}")),
        }
    }
    outcome
}

/// Fetch one record as a raw map, or a named not-found error.
pub(crate) async fn fetch_record(
    store: &dyn RemoteStore,
    collection: &str,
    id: &str,
) -> Result<crate::codec::Record> {
    let path = paths::record(collection, id);
    let value = store
        .get(&path)
        .await?
        .ok_or_else(|| SyncError::NotFound(path.clone()))?;
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(SyncError::Store(format!("Malformed record at {path}"))),
    }
}

/// Read the global announcement string, if one is set.
pub async fn get_global_announcement(store: &dyn RemoteStore) -> Result<Option<String>> {
    match store.get(paths::GLOBAL_ANNOUNCEMENT).await? {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(SyncError::Store(
            "Malformed global announcement".to_string(),
        )),
    }
}

/// Replace the global announcement string.
pub async fn set_global_announcement(store: &dyn RemoteStore, text: &str) -> Result<()> {
    store.set(paths::GLOBAL_ANNOUNCEMENT, &json!(text)).await
}
