//! Client state: generated, saved and favorite recipe lists behind a storage port.
//!
//! Every list is one JSON array stored under a fixed key and rewritten whole on each
//! change. Concurrent writers are not coordinated; the last write wins.

mod file;
mod memory;
mod preferences;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use preferences::{Preferences, PREFERENCES_KEY};

use crate::error::Result;
use crate::model::Recipe;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Key/value persistence used by [`RecipeStore`]
pub trait StoragePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: StoragePort + ?Sized> StoragePort for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// The persisted recipe lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    /// Everything the generation flows produced
    Generated,
    Favorites,
    /// Recipes kept from the create-from-text view
    Saved,
}

impl RecipeList {
    /// Lookup order used by [`RecipeStore::find_by_slug`]
    pub const LOOKUP_ORDER: [RecipeList; 3] =
        [RecipeList::Generated, RecipeList::Saved, RecipeList::Favorites];

    pub fn key(&self) -> &'static str {
        match self {
            RecipeList::Generated => "generatedRecipes",
            RecipeList::Favorites => "favoriteRecipes",
            RecipeList::Saved => "savedRecipes",
        }
    }
}

pub struct RecipeStore<S> {
    storage: S,
}

impl<S: StoragePort> RecipeStore<S> {
    pub fn new(storage: S) -> Self {
        RecipeStore { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read a list. Records that fail to deserialize are skipped with a warning.
    pub fn list(&self, list: RecipeList) -> Result<Vec<Recipe>> {
        let Some(raw) = self.storage.get(list.key())? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<Value> = serde_json::from_str(&raw)?;
        let recipes = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    warn!("Skipping unreadable record {} in {}: {}", index, list.key(), e);
                    None
                }
            })
            .collect();
        Ok(recipes)
    }

    fn write(&self, list: RecipeList, recipes: &[Recipe]) -> Result<()> {
        let raw = serde_json::to_string(recipes)?;
        debug!("Writing {} recipe(s) to {}", recipes.len(), list.key());
        self.storage.set(list.key(), &raw)
    }

    /// Add a recipe to the end of a list. Duplicates are kept.
    pub fn append(&self, list: RecipeList, recipe: Recipe) -> Result<()> {
        self.append_all(list, vec![recipe])
    }

    pub fn append_all(&self, list: RecipeList, recipes: Vec<Recipe>) -> Result<()> {
        if recipes.is_empty() {
            return Ok(());
        }
        let mut stored = self.list(list)?;
        stored.extend(recipes);
        self.write(list, &stored)
    }

    /// Flip the favorite flag of every generated or saved recipe matching `id`
    /// (by id or slug) and keep the favorites list in step.
    ///
    /// Returns the new flag, or `None` when nothing matches.
    pub fn toggle_favorite(&self, id: &str) -> Result<Option<bool>> {
        let mut generated = self.list(RecipeList::Generated)?;
        let mut saved = self.list(RecipeList::Saved)?;
        let mut favorites = self.list(RecipeList::Favorites)?;

        let current = generated
            .iter()
            .chain(saved.iter())
            .find(|r| r.matches_key(id))
            .cloned();

        let (mut recipe, favorite) = match current {
            Some(recipe) => {
                let flag = !recipe.favorite;
                (recipe, flag)
            }
            // Only in favorites: toggling removes it
            None => match favorites.iter().find(|r| r.matches_key(id)) {
                Some(recipe) => (recipe.clone(), false),
                None => {
                    debug!("toggle_favorite: no recipe matches '{}'", id);
                    return Ok(None);
                }
            },
        };

        for (list, recipes) in [
            (RecipeList::Generated, &mut generated),
            (RecipeList::Saved, &mut saved),
        ] {
            let mut changed = false;
            for r in recipes.iter_mut().filter(|r| r.matches_key(id)) {
                r.favorite = favorite;
                changed = true;
            }
            if changed {
                self.write(list, recipes)?;
            }
        }

        if favorite {
            if !favorites.iter().any(|r| r.id == recipe.id) {
                recipe.favorite = true;
                favorites.push(recipe);
            }
        } else {
            favorites.retain(|r| r.id != recipe.id && !r.matches_key(id));
        }
        self.write(RecipeList::Favorites, &favorites)?;

        Ok(Some(favorite))
    }

    /// Case-insensitive substring search over title and description of a list.
    /// An empty term returns the whole list.
    pub fn search_in(&self, list: RecipeList, term: &str) -> Result<Vec<Recipe>> {
        let recipes = self.list(list)?;
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(recipes);
        }

        Ok(recipes
            .into_iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&term)
                    || r.description.to_lowercase().contains(&term)
            })
            .collect())
    }

    /// [`search_in`](Self::search_in) over the generated recipes
    pub fn search(&self, term: &str) -> Result<Vec<Recipe>> {
        self.search_in(RecipeList::Generated, term)
    }

    pub fn favorites(&self) -> Result<Vec<Recipe>> {
        self.list(RecipeList::Favorites)
    }

    /// Find a recipe by id or slug, looking in generated, then saved, then favorites
    pub fn find_by_slug(&self, key: &str) -> Result<Option<Recipe>> {
        for list in RecipeList::LOOKUP_ORDER {
            if let Some(recipe) = self.list(list)?.into_iter().find(|r| r.matches_key(key)) {
                return Ok(Some(recipe));
            }
        }
        Ok(None)
    }
}
