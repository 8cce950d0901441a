use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tally_domain::{primary_first, Category, RecordId, COLOR_OPTIONS};
use tracing::debug;

use crate::{
    record_store::{LoadOutcome, PendingSave, RecordStore},
    storage::{KeyValueStorage, CATEGORIES_KEY},
};

/// Transient selection state shared by the add, edit and pick dialogs.
/// Never persisted.
#[derive(Debug, Default)]
struct Selection {
    confirmed: Vec<Category>,
    staged: Vec<Category>,
    editing: Option<Category>,
}

impl Selection {
    fn forget(&mut self, id: &RecordId) {
        self.confirmed.retain(|category| &category.id != id);
        self.staged.retain(|category| &category.id != id);
        if self.editing.as_ref().is_some_and(|category| &category.id == id) {
            self.editing = None;
        }
    }

    fn refresh(&mut self, updated: &Category) {
        let lists = [&mut self.confirmed, &mut self.staged];
        for list in lists {
            for slot in list.iter_mut().filter(|category| category.id == updated.id) {
                *slot = updated.clone();
            }
        }
        if let Some(editing) = self.editing.as_mut().filter(|c| c.id == updated.id) {
            *editing = updated.clone();
        }
    }
}

/// Authoritative category list plus the categories picked for the
/// transaction being composed or edited.
pub struct CategoryStore {
    records: RecordStore<Category>,
    selection: Mutex<Selection>,
}

impl CategoryStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            records: RecordStore::new(CATEGORIES_KEY, storage),
            selection: Mutex::new(Selection::default()),
        }
    }

    pub async fn load(&self) -> LoadOutcome {
        self.records.load().await
    }

    pub fn categories(&self) -> Vec<Category> {
        self.records.list()
    }

    pub fn get(&self, id: &RecordId) -> Option<Category> {
        self.records.get(id)
    }

    pub fn color_options(&self) -> &'static [&'static str] {
        &COLOR_OPTIONS
    }

    /// Appends `category`; a no-op when its id is already taken.
    pub fn add(&self, category: Category) -> Option<PendingSave> {
        self.records.add(category)
    }

    /// Replaces the stored category with the same id, and any copies of it
    /// currently selected.
    pub fn update(&self, category: Category) -> Option<PendingSave> {
        let save = self.records.update(category.clone())?;
        self.selection().refresh(&category);
        Some(save)
    }

    /// Changes only the name, as the edit dialog does.
    pub fn rename(&self, id: &RecordId, name: &str) -> Option<PendingSave> {
        let name = name.trim();
        if name.is_empty() {
            debug!(%id, "ignoring rename to a blank name");
            return None;
        }
        let save = self.records.modify(id, |category| {
            if category.name == name {
                return false;
            }
            category.name = name.to_string();
            true
        })?;
        if let Some(updated) = self.records.get(id) {
            self.selection().refresh(&updated);
        }
        Some(save)
    }

    /// Removes the category from the list and from every selection.
    pub fn delete(&self, category: &Category) -> Option<PendingSave> {
        self.selection().forget(&category.id);
        self.records.delete(&category.id)
    }

    pub fn selected(&self) -> Vec<Category> {
        self.selection().confirmed.clone()
    }

    pub fn set_selected(&self, categories: Vec<Category>) {
        self.selection().confirmed = categories;
    }

    pub fn temp_selected(&self) -> Vec<Category> {
        self.selection().staged.clone()
    }

    pub fn set_temp_selected(&self, categories: Vec<Category>) {
        self.selection().staged = categories;
    }

    /// Flips `category` in or out of the staged selection. Returns `false`
    /// without touching the selection when it would add a second primary
    /// category.
    pub fn toggle_temp(&self, category: &Category) -> bool {
        let mut selection = self.selection();
        let staged = &mut selection.staged;
        if let Some(index) = staged.iter().position(|c| c.id == category.id) {
            staged.remove(index);
            return true;
        }
        if category.primary && staged.iter().any(|c| c.primary) {
            debug!(id = %category.id, "a primary category is already selected");
            return false;
        }
        staged.push(category.clone());
        true
    }

    /// Commits the staged selection, primary category first, and returns it.
    pub fn confirm_selection(&self) -> Vec<Category> {
        let mut selection = self.selection();
        let mut confirmed = selection.staged.clone();
        primary_first(&mut confirmed);
        selection.confirmed = confirmed.clone();
        confirmed
    }

    pub fn clear_selection(&self) {
        let mut selection = self.selection();
        selection.confirmed.clear();
        selection.staged.clear();
    }

    pub fn editing(&self) -> Option<Category> {
        self.selection().editing.clone()
    }

    pub fn set_editing(&self, category: Option<Category>) {
        self.selection().editing = category;
    }

    fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
