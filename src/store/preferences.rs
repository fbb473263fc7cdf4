use crate::error::Result;
use crate::prompts::Language;
use crate::store::{RecipeStore, StoragePort};
use log::warn;
use serde::{Deserialize, Serialize};

pub const PREFERENCES_KEY: &str = "userPreferences";

/// Profile and settings state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Language code, e.g. "en"
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

fn default_language() -> String {
    Language::default().code().to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            language: default_language(),
            dietary_preferences: Vec::new(),
        }
    }
}

impl Preferences {
    /// The stored language, or English if the code is not recognised
    pub fn language(&self) -> Language {
        self.language.parse().unwrap_or_else(|_| {
            warn!("Unknown stored language '{}', using English", self.language);
            Language::default()
        })
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language.code().to_string();
    }

    /// Returns false if the preference was already present or blank
    pub fn add_dietary_preference(&mut self, preference: &str) -> bool {
        let preference = preference.trim();
        if preference.is_empty() || self.dietary_preferences.iter().any(|p| p == preference) {
            return false;
        }
        self.dietary_preferences.push(preference.to_string());
        true
    }

    pub fn remove_dietary_preference(&mut self, preference: &str) -> bool {
        let before = self.dietary_preferences.len();
        self.dietary_preferences.retain(|p| p != preference.trim());
        self.dietary_preferences.len() != before
    }
}

impl<S: StoragePort> RecipeStore<S> {
    pub fn preferences(&self) -> Result<Preferences> {
        match self.storage().get(PREFERENCES_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Preferences::default()),
        }
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.storage()
            .set(PREFERENCES_KEY, &serde_json::to_string(preferences)?)
    }
}
