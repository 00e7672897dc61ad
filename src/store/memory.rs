// SPDX-License-Identifier: MIT

//! In-memory store implementations for tests and offline use.
//!
//! `MemoryStore` keeps the whole tree in one JSON value and supports
//! per-path fault injection so partial-failure contracts (no-rollback
//! create, delete-then-clear) can be exercised without a network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::codec::Record;
use crate::error::{Result, SyncError};
use crate::store::{ObjectStorage, RemoteStore};

/// In-memory hierarchical store.
#[derive(Default)]
pub struct MemoryStore {
    root: RwLock<Value>,
    fail_paths: Mutex<HashSet<String>>,
    write_log: Mutex<Vec<String>>,
    key_counter: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            ..Default::default()
        }
    }

    /// Make every operation on exactly `path` fail until cleared.
    pub async fn fail_path(&self, path: &str) {
        self.fail_paths.lock().await.insert(path.to_string());
    }

    pub async fn clear_faults(&self) {
        self.fail_paths.lock().await.clear();
    }

    /// Paths touched by mutating operations, in order.
    pub async fn writes(&self) -> Vec<String> {
        self.write_log.lock().await.clone()
    }

    async fn check_fault(&self, path: &str) -> Result<()> {
        if self.fail_paths.lock().await.contains(path) {
            return Err(SyncError::Store(format!("Injected failure at {path}")));
        }
        Ok(())
    }

    async fn log_write(&self, path: &str) {
        self.write_log.lock().await.push(path.to_string());
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |node, seg| node.get(seg))
}

/// Walk to `path`, creating intermediate objects.
fn resolve_mut<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value> {
    let mut node = root;
    for seg in segments(path) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return Err(SyncError::Store(format!("Not an object at {path}")));
        };
        node = map.entry(seg.to_string()).or_insert(Value::Null);
    }
    Ok(node)
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.check_fault(path).await?;
        let root = self.root.read().await;
        match resolve(&root, path) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(value.clone())),
        }
    }

    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        self.check_fault(path).await?;
        let mut root = self.root.write().await;
        *resolve_mut(&mut root, path)? = value.clone();
        self.log_write(path).await;
        Ok(())
    }

    async fn update_merge(&self, path: &str, fields: &Record) -> Result<()> {
        self.check_fault(path).await?;
        let mut root = self.root.write().await;
        let node = resolve_mut(&mut root, path)?;
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return Err(SyncError::Store(format!("Not an object at {path}")));
        };
        for (key, value) in fields {
            map.insert(key.clone(), value.clone());
        }
        self.log_write(path).await;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.check_fault(path).await?;
        let mut root = self.root.write().await;
        if let Some((parent, key)) = path.rsplit_once('/') {
            if let Ok(Value::Object(map)) = resolve_mut(&mut root, parent) {
                map.remove(key);
            }
        } else if let Value::Object(map) = &mut *root {
            map.remove(path);
        }
        self.log_write(path).await;
        Ok(())
    }

    async fn generate_key(&self, collection_path: &str) -> Result<String> {
        self.check_fault(collection_path).await?;
        let n = self.key_counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("-K{n:010}"))
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashSet<String>>,
    fail_paths: Mutex<HashSet<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_object(&self, path: &str) {
        self.objects.lock().await.insert(path.to_string());
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.lock().await.contains(path)
    }

    /// Make deletion of exactly `path` fail until cleared.
    pub async fn fail_path(&self, path: &str) {
        self.fail_paths.lock().await.insert(path.to_string());
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn delete_object(&self, path: &str) -> Result<()> {
        if self.fail_paths.lock().await.contains(path) {
            return Err(SyncError::Store(format!("Injected failure at {path}")));
        }
        self.objects.lock().await.remove(path);
        Ok(())
    }
}
