use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{HunterError, Result};
use crate::types::PersistedState;

/// Durable home of the scan snapshot and notification state. `save`
/// replaces the whole record in one step; a concurrent reader sees the old
/// or the new state, never a torn write.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<PersistedState>;
    async fn save(&self, state: &PersistedState) -> Result<()>;

    /// Unreadable or missing state degrades to an empty first-run state.
    async fn load_or_default(&self) -> PersistedState {
        match self.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not load persisted state, starting empty: {e}");
                PersistedState::default()
            }
        }
    }
}

/// JSON file store. The atomic replace is a write to a sibling temp file
/// followed by a rename.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<PersistedState> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| HunterError::Storage(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HunterError::Storage(format!("decode {}: {e}", self.path.display())))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    HunterError::Storage(format!("create {}: {e}", parent.display()))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| HunterError::Storage(format!("encode state: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| HunterError::Storage(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HunterError::Storage(format!("replace {}: {e}", self.path.display())))?;

        debug!(
            "Persisted {} offers, {} notified keys",
            state.offers.len(),
            state.notified_offers.len()
        );
        Ok(())
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<PersistedState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn load(&self) -> Result<PersistedState> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}
