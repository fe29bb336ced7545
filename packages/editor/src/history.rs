//! # Version History
//!
//! Linear list of committed versions with a movable cursor.
//!
//! ## Design
//!
//! - The first version is the seed ("Initial version", no patches)
//! - Adding a version drops everything after the cursor, then appends
//! - Rollback / forward move the cursor one step; a jump moves it to an id
//! - Versions are never edited after they are recorded
//! - An optional limit evicts the oldest versions
//!
//! ```text
//!  v0 ── v1 ── v2 ── v3          rollback ×2 → cursor at v1
//!         ▲
//!  v0 ── v1 ── v4                add_version drops v2, v3
//! ```

use pagesmith_schema::{now_millis, PatchOperation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const INITIAL_VERSION_MESSAGE: &str = "Initial version";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("history must contain at least one version")]
    Empty,

    #[error("cursor {cursor} is out of range for {len} versions")]
    CursorOutOfRange { cursor: usize, len: usize },
}

/// One committed document state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion<D> {
    pub id: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,

    /// The batch that produced this version from its predecessor
    pub patches: Vec<PatchOperation>,
    pub layout: D,
}

impl<D> PageVersion<D> {
    fn new(layout: D, message: String, patches: Vec<PatchOperation>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: now_millis(),
            message,
            patches,
            layout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionManager<D> {
    versions: Vec<PageVersion<D>>,
    cursor: usize,

    /// Maximum number of versions kept (0 = unlimited)
    max_versions: usize,
}

impl<D: Clone> VersionManager<D> {
    /// Seed a history with `initial` as version 0
    pub fn new(initial: D) -> Self {
        Self::with_max_versions(initial, 0)
    }

    pub fn with_max_versions(initial: D, max_versions: usize) -> Self {
        Self {
            versions: vec![PageVersion::new(
                initial,
                INITIAL_VERSION_MESSAGE.to_string(),
                Vec::new(),
            )],
            cursor: 0,
            max_versions,
        }
    }

    /// Rebuild a manager from exported versions
    pub fn restore(versions: Vec<PageVersion<D>>, cursor: usize) -> Result<Self, HistoryError> {
        if versions.is_empty() {
            return Err(HistoryError::Empty);
        }
        if cursor >= versions.len() {
            return Err(HistoryError::CursorOutOfRange {
                cursor,
                len: versions.len(),
            });
        }
        Ok(Self {
            versions,
            cursor,
            max_versions: 0,
        })
    }

    /// Change the limit, evicting immediately if the history is too long
    pub fn set_max_versions(&mut self, max_versions: usize) {
        self.max_versions = max_versions;
        self.evict();
    }

    /// Record a new version after the cursor and return its id
    pub fn add_version(
        &mut self,
        layout: D,
        message: impl Into<String>,
        patches: Vec<PatchOperation>,
    ) -> String {
        let dropped = self.versions.len() - (self.cursor + 1);
        self.versions.truncate(self.cursor + 1);

        let version = PageVersion::new(layout, message.into(), patches);
        let id = version.id.clone();
        self.versions.push(version);
        self.cursor = self.versions.len() - 1;
        self.evict();

        debug!(version = %id, dropped, total = self.versions.len(), "Added version");
        id
    }

    fn evict(&mut self) {
        if self.max_versions == 0 || self.versions.len() <= self.max_versions {
            return;
        }
        let excess = self.versions.len() - self.max_versions;
        // the cursor's version is never evicted
        let excess = excess.min(self.cursor);
        self.versions.drain(..excess);
        self.cursor -= excess;
    }

    /// Step back one version
    pub fn rollback(&mut self) -> Option<D> {
        if !self.can_rollback() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current_layout().clone())
    }

    /// Step forward one version
    pub fn forward(&mut self) -> Option<D> {
        if !self.can_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current_layout().clone())
    }

    /// Jump to `id`; an unknown id leaves the cursor where it is
    pub fn switch_to_version(&mut self, id: &str) -> Option<D> {
        let index = self.versions.iter().position(|version| version.id == id)?;
        self.cursor = index;
        Some(self.current_layout().clone())
    }

    pub fn can_rollback(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_forward(&self) -> bool {
        self.cursor + 1 < self.versions.len()
    }

    pub fn current_version(&self) -> &PageVersion<D> {
        &self.versions[self.cursor]
    }

    pub fn current_layout(&self) -> &D {
        &self.current_version().layout
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[PageVersion<D>] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_version() {
        let manager = VersionManager::new("v0");

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.current_index(), 0);
        assert_eq!(manager.current_version().message, INITIAL_VERSION_MESSAGE);
        assert!(manager.current_version().patches.is_empty());
        assert!(!manager.can_rollback());
        assert!(!manager.can_forward());
    }

    #[test]
    fn test_add_moves_cursor_to_tail() {
        let mut manager = VersionManager::new(0);
        let id = manager.add_version(1, "one", vec![]);

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.current_version().id, id);
        assert_eq!(*manager.current_layout(), 1);
        assert!(manager.can_rollback());
    }

    #[test]
    fn test_rollback_and_forward_at_boundaries() {
        let mut manager = VersionManager::new(0);
        manager.add_version(1, "one", vec![]);

        assert_eq!(manager.forward(), None);
        assert_eq!(manager.rollback(), Some(0));
        assert_eq!(manager.rollback(), None);
        assert_eq!(manager.current_index(), 0);
        assert_eq!(manager.forward(), Some(1));
    }

    #[test]
    fn test_add_after_rollback_drops_redo_branch() {
        let mut manager = VersionManager::new(0);
        manager.add_version(1, "one", vec![]);
        manager.add_version(2, "two", vec![]);
        manager.add_version(3, "three", vec![]);
        manager.rollback();
        manager.rollback();

        manager.add_version(4, "four", vec![]);

        let layouts: Vec<i32> = manager.history().iter().map(|v| v.layout).collect();
        assert_eq!(layouts, vec![0, 1, 4]);
        assert!(!manager.can_forward());
    }

    #[test]
    fn test_switch_to_version() {
        let mut manager = VersionManager::new("a");
        let first = manager.history()[0].id.clone();
        manager.add_version("b", "b", vec![]);

        assert_eq!(manager.switch_to_version(&first), Some("a"));
        assert_eq!(manager.current_index(), 0);

        assert_eq!(manager.switch_to_version("missing"), None);
        assert_eq!(manager.current_index(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut manager = VersionManager::new(0);
        for i in 1..20 {
            manager.add_version(i, "n", vec![]);
        }
        let mut ids: Vec<&str> = manager.history().iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_max_versions_evicts_oldest() {
        let mut manager = VersionManager::with_max_versions(0, 3);
        for i in 1..=4 {
            manager.add_version(i, format!("v{i}"), vec![]);
        }

        let layouts: Vec<i32> = manager.history().iter().map(|v| v.layout).collect();
        assert_eq!(layouts, vec![2, 3, 4]);
        assert_eq!(manager.current_index(), 2);
        assert_eq!(*manager.current_layout(), 4);
    }

    #[test]
    fn test_lowering_limit_keeps_cursor_version() {
        let mut manager = VersionManager::new(0);
        for i in 1..=4 {
            manager.add_version(i, "n", vec![]);
        }
        let second = manager.history()[1].id.clone();
        manager.switch_to_version(&second);

        manager.set_max_versions(2);

        assert_eq!(*manager.current_layout(), 1);
        assert_eq!(manager.current_index(), 0);
        assert_eq!(manager.len(), 4);
    }

    #[test]
    fn test_restore() {
        let mut manager = VersionManager::new(json!({ "a": 1 }));
        manager.add_version(json!({ "a": 2 }), "two", vec![]);
        manager.rollback();

        let restored =
            VersionManager::restore(manager.history().to_vec(), manager.current_index()).unwrap();
        assert_eq!(restored.history(), manager.history());
        assert_eq!(restored.current_index(), 0);
        assert!(restored.can_forward());

        assert_eq!(
            VersionManager::<i32>::restore(vec![], 0).unwrap_err(),
            HistoryError::Empty
        );
        assert_eq!(
            VersionManager::restore(manager.history().to_vec(), 2).unwrap_err(),
            HistoryError::CursorOutOfRange { cursor: 2, len: 2 }
        );
    }

    #[test]
    fn test_version_wire_shape() {
        let manager = VersionManager::new(json!({}));
        let value = serde_json::to_value(manager.current_version()).unwrap();
        for key in ["id", "timestamp", "message", "patches", "layout"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
