use crate::handlers::errors::{CommandError, CommandResult};
use crate::services::notifier::Notifier;
use crate::services::persistence::FAVORITES_KEY;
use crate::services::store::ClientStore;
use crate::utils::{file_name, join_list, split_list};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row of the favourites pop-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntry {
    pub index: usize,
    pub path: String,
    pub file_name: String,
}

pub const EMPTY_FAVORITES_MESSAGE: &str = "Your favourites files list is empty for the moment!";

/// Ordered, duplicate-free list of favourite files mirrored to the store.
pub struct Favorites {
    items: Vec<String>,
    store: Arc<dyn ClientStore>,
    notifier: Arc<dyn Notifier>,
}

impl Favorites {
    pub fn load(store: Arc<dyn ClientStore>, notifier: Arc<dyn Notifier>) -> Self {
        let items = store
            .get(FAVORITES_KEY)
            .map(|value| split_list(&value))
            .unwrap_or_default();
        log::debug!("Loaded {} favourite file(s)", items.len());
        Self {
            items,
            store,
            notifier,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.iter().any(|item| item == path)
    }

    pub fn entries(&self) -> Vec<FavoriteEntry> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, path)| FavoriteEntry {
                index,
                path: path.clone(),
                file_name: file_name(path).to_string(),
            })
            .collect()
    }

    /// Appends `path`; returns its index, or `None` for an empty path.
    pub fn add(&mut self, path: &str) -> CommandResult<Option<usize>> {
        if path.is_empty() {
            return Ok(None);
        }
        if self.contains(path) {
            let message = "Duplicate item! This files already exist in your favourite list";
            self.notifier.alert(message);
            return Err(CommandError::validation(message));
        }
        let mut items = self.items.clone();
        items.push(path.to_string());
        self.persist(&items)?;
        self.items = items;
        self.notifier.confirm(&format!(
            "Item added! {} has been added to your favourite list.",
            file_name(path)
        ));
        Ok(Some(self.items.len() - 1))
    }

    /// Removes the favourite at `index`; later entries move down by one.
    pub fn remove(&mut self, index: usize) -> CommandResult<String> {
        if index >= self.items.len() {
            return Err(CommandError::not_found(format!("favourite #{}", index)));
        }
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.persist(&items)?;
        self.items = items;
        log::info!("Removed favourite {}", removed);
        Ok(removed)
    }

    /// Writes `items` to the store; the in-memory list follows only on success.
    fn persist(&self, items: &[String]) -> CommandResult<()> {
        let result = if items.is_empty() {
            self.store.remove(FAVORITES_KEY)
        } else {
            self.store.set(FAVORITES_KEY, &join_list(items))
        };
        result.map_err(|e| {
            log::error!("Failed to save favourites: {:#}", e);
            CommandError::internal(format!("Failed to save favourites: {}", e))
        })
    }
}
