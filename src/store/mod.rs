// SPDX-License-Identifier: MIT

//! Remote store layer.
//!
//! The store is a path-addressed hierarchical JSON tree. Repositories
//! talk to it through [`RemoteStore`]; uploaded media objects live in a
//! separate blob store behind [`ObjectStorage`]. Both traits have a
//! production Firebase implementation and an in-memory one for tests.

pub mod firebase;
pub mod memory;

pub use firebase::{FirebaseMediaStorage, FirebaseStore};
pub use memory::{MemoryStorage, MemoryStore};

use async_trait::async_trait;
use serde_json::Value;

use crate::codec::Record;
use crate::error::Result;

/// Top-level collection paths, as laid out in the remote tree.
pub mod paths {
    pub const USERS: &str = "allUsers";
    pub const TEAMS: &str = "allTeams";
    pub const TOURNAMENTS: &str = "allTournaments";
    pub const CHALLENGES: &str = "allChallenges";
    /// Plain string broadcast to all clients
    pub const GLOBAL_ANNOUNCEMENT: &str = "globalAnnouncement";

    /// Path of one record within a collection.
    pub fn record(collection: &str, id: &str) -> String {
        format!("{collection}/{id}")
    }
}

/// Path-addressed remote store operations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the value at `path`, `None` if nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Merge only the supplied top-level fields into the record at
    /// `path`. Sibling fields are never removed.
    async fn update_merge(&self, path: &str, fields: &Record) -> Result<()>;

    /// Delete the value at `path`.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Generate a new record key, unique within `collection_path`.
    /// Failure surfaces as `SyncError::KeyGeneration`; it is never
    /// silently retried.
    async fn generate_key(&self, collection_path: &str) -> Result<String>;
}

/// Blob storage for uploaded challenge media.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Delete the stored object at `path`.
    async fn delete_object(&self, path: &str) -> Result<()>;
}
