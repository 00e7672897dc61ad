// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use challenge_sync::config::Config;
use challenge_sync::error::Result;
use challenge_sync::models::{Challenge, Team, User};
use challenge_sync::services::{ClassifyMedia, MediaKind};
use challenge_sync::store::{paths, MemoryStorage, MemoryStore, ObjectStorage, RemoteStore};
use challenge_sync::AppState;
use serde_json::Value;

/// Install the test log subscriber, honoring `RUST_LOG`. Safe to call
/// from every test; only the first call wins.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Classifier stub returning a fixed verdict.
pub struct FixedClassifier(pub MediaKind);

#[async_trait]
impl ClassifyMedia for FixedClassifier {
    async fn classify(&self, _url: &str) -> Result<MediaKind> {
        Ok(self.0)
    }
}

/// Memory-backed app state, returning the concrete store and storage
/// handles so tests can inject faults and inspect writes.
#[allow(dead_code)]
pub fn test_state() -> (Arc<MemoryStore>, Arc<MemoryStorage>, AppState) {
    test_state_with_classifier(MediaKind::Other)
}

#[allow(dead_code)]
pub fn test_state_with_classifier(
    verdict: MediaKind,
) -> (Arc<MemoryStore>, Arc<MemoryStorage>, AppState) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::with_backends(
        Config::test_default(),
        store.clone() as Arc<dyn RemoteStore>,
        storage.clone() as Arc<dyn ObjectStorage>,
        Arc::new(FixedClassifier(verdict)),
    );
    (store, storage, state)
}

/// Write an already-built entity straight into the store.
#[allow(dead_code)]
pub async fn seed_user(store: &MemoryStore, user: &User) {
    store
        .set(
            &paths::record(paths::USERS, &user.id),
            &Value::Object(user.encode()),
        )
        .await
        .expect("seed user");
}

#[allow(dead_code)]
pub async fn seed_team(store: &MemoryStore, team: &Team) {
    store
        .set(
            &paths::record(paths::TEAMS, &team.id),
            &Value::Object(team.encode()),
        )
        .await
        .expect("seed team");
}

#[allow(dead_code)]
pub async fn seed_challenge(store: &MemoryStore, challenge: &Challenge) {
    store
        .set(
            &paths::record(paths::CHALLENGES, &challenge.id),
            &Value::Object(challenge.encode()),
        )
        .await
        .expect("seed challenge");
}

/// Minimal valid user for seeding.
#[allow(dead_code)]
pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        first_name: "Test".into(),
        last_name: id.to_string(),
        email_address: format!("{id}@example.com"),
        associated_teams: vec![],
        profile_image_data: None,
        push_tokens: vec![],
    }
}

/// Minimal valid team for seeding.
#[allow(dead_code)]
pub fn sample_team(id: &str, participants: &[&str]) -> Team {
    Team {
        id: id.to_string(),
        name: format!("Team {id}"),
        participant_ids: participants.iter().map(|s| s.to_string()).collect(),
        point_distribution: Default::default(),
        participation_dates: Default::default(),
        completed_refs: Default::default(),
        associated_tournaments: vec![],
        completed_challenges: None,
    }
}
