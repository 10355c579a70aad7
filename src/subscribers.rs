use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{HunterError, Result};

/// The subscriber list: chat ids to alert when new offers appear.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Returns false when the id was already subscribed.
    async fn add(&self, id: i64) -> Result<bool>;
    /// Returns false when the id was not subscribed.
    async fn remove(&self, id: i64) -> Result<bool>;
    async fn list(&self) -> Result<Vec<i64>>;
}

/// Subscriber ids in a flat JSON array on disk, rewritten wholesale on every
/// change. An unreadable file counts as an empty list.
pub struct JsonSubscriberStore {
    path: PathBuf,
}

impl JsonSubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_set(&self) -> BTreeSet<i64> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Subscriber file {} unreadable, treating as empty: {e}", self.path.display());
                BTreeSet::new()
            }),
            Err(_) => BTreeSet::new(),
        }
    }

    async fn write_set(&self, subscribers: &BTreeSet<i64>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    HunterError::Storage(format!("create {}: {e}", parent.display()))
                })?;
            }
        }
        let json = serde_json::to_string(subscribers)
            .map_err(|e| HunterError::Storage(format!("encode subscribers: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| HunterError::Storage(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HunterError::Storage(format!("replace {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl SubscriberStore for JsonSubscriberStore {
    async fn add(&self, id: i64) -> Result<bool> {
        let mut subscribers = self.read_set().await;
        if !subscribers.insert(id) {
            return Ok(false);
        }
        self.write_set(&subscribers).await?;
        info!("New subscriber saved: {id}");
        Ok(true)
    }

    async fn remove(&self, id: i64) -> Result<bool> {
        let mut subscribers = self.read_set().await;
        if !subscribers.remove(&id) {
            return Ok(false);
        }
        self.write_set(&subscribers).await?;
        info!("Subscriber removed: {id}");
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<i64>> {
        Ok(self.read_set().await.into_iter().collect())
    }
}
