//! List store: the user's current curated species collection and the set of
//! saved named collections.
//!
//! The store is plain in-memory data mutated only from the single request
//! flow; handlers persist the three state blobs after each successful
//! mutation. Validation failures are typed errors that leave state
//! untouched.

use lifer_common::{db, SavedList, SpeciesRecord};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

/// Blob key for the current list contents
const CURRENT_LIST_KEY: &str = "current_list";
/// Blob key for the saved-lists collection
const SAVED_LISTS_KEY: &str = "saved_lists";
/// Blob key for the active list name
const ACTIVE_NAME_KEY: &str = "active_list_name";

/// Validation errors surfaced to the user as dismissible messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("{0} is already in your list")]
    Duplicate(String),

    #[error("List name cannot be empty")]
    EmptyName,

    #[error("Cannot save an empty list")]
    EmptyList,

    #[error("A list named \"{0}\" already exists")]
    NameTaken(String),

    #[error("No saved list named \"{0}\"")]
    UnknownList(String),
}

/// In-memory list state: current list, saved lists, active list name
#[derive(Debug, Default)]
pub struct ListStore {
    current: Vec<SpeciesRecord>,
    saved: Vec<SavedList>,
    active_name: Option<String>,
}

impl ListStore {
    /// Current list entries, sorted by display name
    pub fn current(&self) -> &[SpeciesRecord] {
        &self.current
    }

    /// Saved lists, sorted by name
    pub fn saved_lists(&self) -> &[SavedList] {
        &self.saved
    }

    /// Name of the loaded list; `None` means no list loaded
    pub fn active_name(&self) -> Option<&str> {
        self.active_name.as_deref()
    }

    /// Add a species to the current list.
    ///
    /// Rejects a record whose id is already present, naming the species in
    /// the error. The list is re-sorted by display name after insertion.
    pub fn add(&mut self, record: SpeciesRecord) -> Result<(), ListError> {
        if self.current.iter().any(|r| r.id == record.id) {
            return Err(ListError::Duplicate(record.display_name().to_string()));
        }

        debug!(species = record.display_name(), "Adding species to current list");
        self.current.push(record);
        self.current
            .sort_by(|a, b| a.display_name().cmp(b.display_name()));
        Ok(())
    }

    /// Remove a species by id; no-op when absent. Returns whether an entry
    /// was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.current.len();
        self.current.retain(|r| r.id != id);
        self.current.len() != before
    }

    /// Empty the current list and revert to the no-list-loaded sentinel.
    pub fn clear(&mut self) {
        self.current.clear();
        self.active_name = None;
    }

    /// Snapshot the current list into a new saved list.
    ///
    /// The new list's high score is seeded from the caller's current streak.
    /// On success the current list is emptied and the saved name becomes the
    /// active name.
    pub fn save_as(&mut self, name: &str, seed_score: u32) -> Result<(), ListError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ListError::EmptyName);
        }
        if self.current.is_empty() {
            return Err(ListError::EmptyList);
        }
        if self
            .saved
            .iter()
            .any(|l| l.name.to_lowercase() == trimmed.to_lowercase())
        {
            return Err(ListError::NameTaken(trimmed.to_string()));
        }

        info!(name = trimmed, species = self.current.len(), "Saving current list");
        self.saved.push(SavedList {
            name: trimmed.to_string(),
            species: std::mem::take(&mut self.current),
            high_score: seed_score,
        });
        self.saved.sort_by(|a, b| a.name.cmp(&b.name));
        self.active_name = Some(trimmed.to_string());
        Ok(())
    }

    /// Load a saved list into the current list, non-destructively.
    ///
    /// The saved list keeps its snapshot; the current list becomes a copy.
    /// The caller resets the quiz streak.
    pub fn load(&mut self, name: &str) -> Result<(), ListError> {
        let list = self
            .saved
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ListError::UnknownList(name.to_string()))?;

        info!(name = %list.name, species = list.species.len(), "Loading saved list");
        self.current = list.species.clone();
        self.active_name = Some(list.name.clone());
        Ok(())
    }

    /// Delete a saved list. Deleting an unknown name is a no-op; returns
    /// whether a list was removed. If the deleted list was active, the
    /// active name reverts to the sentinel.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.saved.len();
        self.saved.retain(|l| l.name != name);
        let removed = self.saved.len() != before;

        if removed {
            info!(name, "Deleted saved list");
            if self.active_name.as_deref() == Some(name) {
                self.active_name = None;
            }
        }
        removed
    }

    /// Raise the active saved list's high score to the given streak, if a
    /// named list is active and the streak beats its record. Returns the new
    /// high score when it moved.
    pub fn record_streak(&mut self, streak: u32) -> Option<u32> {
        let name = self.active_name.clone()?;
        let list = self.saved.iter_mut().find(|l| l.name == name)?;

        if streak > list.high_score {
            list.high_score = streak;
            info!(name = %list.name, high_score = streak, "New high score");
            return Some(streak);
        }
        None
    }

    /// Rebuild the store from the persisted state blobs. Missing or corrupt
    /// blobs fall back to empty defaults.
    pub async fn hydrate(db: &SqlitePool) -> lifer_common::Result<Self> {
        let current: Vec<SpeciesRecord> =
            db::get_blob(db, CURRENT_LIST_KEY).await?.unwrap_or_default();
        let saved: Vec<SavedList> =
            db::get_blob(db, SAVED_LISTS_KEY).await?.unwrap_or_default();
        let active_name: Option<String> =
            db::get_blob(db, ACTIVE_NAME_KEY).await?.unwrap_or_default();

        debug!(
            current = current.len(),
            saved = saved.len(),
            active = ?active_name,
            "Hydrated list store"
        );
        Ok(Self {
            current,
            saved,
            active_name,
        })
    }

    /// Mirror the full store state into the three persisted blobs.
    pub async fn persist(&self, db: &SqlitePool) -> lifer_common::Result<()> {
        db::set_blob(db, CURRENT_LIST_KEY, &self.current).await?;
        db::set_blob(db, SAVED_LISTS_KEY, &self.saved).await?;
        db::set_blob(db, ACTIVE_NAME_KEY, &self.active_name).await?;
        Ok(())
    }
}
