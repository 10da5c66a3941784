//! Persistence Adapter: a session-scoped string key/value store.
//!
//! [`SessionStore`] is the raw seam (browser `sessionStorage` in the
//! extension, [`MemoryStore`] natively). [`Persistence`] layers the fixed key
//! names and the JSON formats of each persisted value on top of it.

use crate::id::TileId;
use crate::model::{PendingTarget, SessionEpoch};
use crate::palette::ColorAssignment;
use std::collections::HashMap;

/// Session-scoped string key/value storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and native hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object of string values.
    ///
    /// # Errors
    /// Returns a message if `json` is not an object of strings.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| format!("invalid store snapshot: {e}"))?;
        Ok(Self { entries })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The fixed persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    GameDate,
    TargetId,
    TargetText,
    CardColors,
    CardOrder,
}

impl StoreKey {
    /// Every key scoped to one session epoch (all but the date itself).
    pub const EPOCH_SCOPED: [StoreKey; 4] = [
        StoreKey::TargetId,
        StoreKey::TargetText,
        StoreKey::CardColors,
        StoreKey::CardOrder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StoreKey::GameDate => "game-date",
            StoreKey::TargetId => "target-id",
            StoreKey::TargetText => "target-text",
            StoreKey::CardColors => "card-colors",
            StoreKey::CardOrder => "card-order",
        }
    }
}

/// Typed access to the persisted values under a key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persistence {
    prefix: String,
}

impl Persistence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Full storage key, e.g. `connections-helper-card-order`.
    pub fn key(&self, key: StoreKey) -> String {
        format!("{}{}", self.prefix, key.name())
    }

    pub fn epoch<S: SessionStore + ?Sized>(&self, store: &S) -> Option<SessionEpoch> {
        store.get(&self.key(StoreKey::GameDate)).map(SessionEpoch::new)
    }

    pub fn save_epoch<S: SessionStore + ?Sized>(&self, store: &mut S, epoch: &SessionEpoch) {
        store.set(&self.key(StoreKey::GameDate), epoch.as_str());
    }

    /// Delete every value scoped to the previous epoch.
    pub fn invalidate_epoch<S: SessionStore + ?Sized>(&self, store: &mut S) {
        for key in StoreKey::EPOCH_SCOPED {
            store.remove(&self.key(key));
        }
    }

    /// `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    /// Returns a message if the stored value is not a JSON array of ids.
    pub fn load_order<S: SessionStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<Vec<TileId>>, String> {
        let Some(raw) = store.get(&self.key(StoreKey::CardOrder)) else {
            return Ok(None);
        };
        let order: Vec<TileId> =
            serde_json::from_str(&raw).map_err(|e| format!("invalid card order: {e}"))?;
        Ok(Some(order))
    }

    pub fn save_order<S: SessionStore + ?Sized>(&self, store: &mut S, order: &[TileId]) {
        let json = serde_json::to_string(order).unwrap_or_else(|_| "[]".to_string());
        store.set(&self.key(StoreKey::CardOrder), &json);
    }

    /// `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    /// Returns a message if the stored value is not a JSON object of colors.
    pub fn load_colors<S: SessionStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<ColorAssignment>, String> {
        match store.get(&self.key(StoreKey::CardColors)) {
            Some(raw) => ColorAssignment::from_json(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Full write of the mapping (never incremental).
    pub fn save_colors<S: SessionStore + ?Sized>(&self, store: &mut S, colors: &ColorAssignment) {
        store.set(&self.key(StoreKey::CardColors), &colors.to_json());
    }

    pub fn delete_colors<S: SessionStore + ?Sized>(&self, store: &mut S) {
        store.remove(&self.key(StoreKey::CardColors));
    }

    pub fn load_target<S: SessionStore + ?Sized>(&self, store: &S) -> Option<PendingTarget> {
        let id = store.get(&self.key(StoreKey::TargetId))?;
        let text = store
            .get(&self.key(StoreKey::TargetText))
            .unwrap_or_default();
        Some(PendingTarget {
            id: TileId::intern(&id),
            text,
        })
    }

    pub fn save_target<S: SessionStore + ?Sized>(&self, store: &mut S, target: &PendingTarget) {
        store.set(&self.key(StoreKey::TargetId), target.id.as_str());
        store.set(&self.key(StoreKey::TargetText), &target.text);
    }
}
