// SPDX-License-Identifier: MIT

//! Data-synchronization core for a gamified-challenge app.
//!
//! This crate translates between loosely-typed remote records and
//! typed Users, Teams, Tournaments, and Challenges, keeps their
//! cross-references consistent, and bridges media challenge entries in
//! from an external tabular source.

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod services;
pub mod store;

use std::sync::Arc;

use config::Config;
use repos::{ChallengeRepo, TeamRepo, TournamentRepo, UserRepo};
use services::{AirtableClient, ClassifyMedia, MediaClassifier, SyncService};
use store::{
    FirebaseMediaStorage, FirebaseStore, ObjectStorage, RemoteStore,
};

/// Shared application state: one store connection plus the
/// repositories and services built over it.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RemoteStore>,
    pub users: UserRepo,
    pub teams: TeamRepo,
    pub tournaments: TournamentRepo,
    pub challenges: ChallengeRepo,
    pub sync: SyncService,
}

impl AppState {
    /// Production wiring: Firebase store and storage, network
    /// classifier.
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn RemoteStore> = Arc::new(FirebaseStore::new(
            config.firebase_database_url.clone(),
            config.firebase_auth_token.clone(),
        ));
        let storage: Arc<dyn ObjectStorage> = Arc::new(FirebaseMediaStorage::new(
            config.firebase_storage_bucket.clone(),
        ));
        let classifier: Arc<dyn ClassifyMedia> = Arc::new(MediaClassifier::new());
        Self::with_backends(config, store, storage, classifier)
    }

    /// Wiring with explicit backends, used by tests and offline runs.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn RemoteStore>,
        storage: Arc<dyn ObjectStorage>,
        classifier: Arc<dyn ClassifyMedia>,
    ) -> Self {
        let users = UserRepo::new(store.clone());
        let challenges = ChallengeRepo::new(store.clone(), storage);
        let teams = TeamRepo::new(store.clone(), challenges.clone());
        let tournaments = TournamentRepo::new(store.clone(), teams.clone());
        let airtable = AirtableClient::new(&config);
        let sync = SyncService::new(airtable, classifier, challenges.clone());

        Self {
            config,
            store,
            users,
            teams,
            tournaments,
            challenges,
            sync,
        }
    }
}
