use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when a recipe arrives without a picture of its own
pub const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/400/200";

/// Category assigned to everything produced by a generation flow
pub const GENERATED_CATEGORY: &str = "Generated";

/// A recipe as produced by the generation flows and as persisted in the store.
///
/// Every field tolerates being absent from stored JSON so that records written by
/// older builds keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Derived from the name; not guaranteed to be unique
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, alias = "tipsAndTricks")]
    pub tips: Vec<String>,
    #[serde(default)]
    pub calories: u32,
    #[serde(default = "default_prep_time")]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub can_make: bool,
    #[serde(default = "default_image_url")]
    pub image_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub favorite: bool,
}

impl Recipe {
    /// Start a recipe from its name; the id is the name itself.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Recipe {
            id: name.clone(),
            title: name,
            description: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            tips: Vec::new(),
            calories: 0,
            prep_time: default_prep_time(),
            cook_time: String::new(),
            servings: default_servings(),
            difficulty: Difficulty::default(),
            can_make: false,
            image_url: default_image_url(),
            category: GENERATED_CATEGORY.to_string(),
            favorite: false,
        }
    }

    /// URL-safe key used by the detail view
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Whether this recipe answers to `key`, either by id or by slug
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.slug() == key
    }
}

fn default_prep_time() -> String {
    "30 minutes".to_string()
}

fn default_servings() -> u32 {
    4
}

fn default_image_url() -> String {
    PLACEHOLDER_IMAGE_URL.to_string()
}

fn default_category() -> String {
    "Other".to_string()
}

/// How hard a recipe is to cook
///
/// Unknown strings (e.g. "N/A" written by older clients) read back as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        Difficulty::from(value.as_str())
    }
}

impl From<&str> for Difficulty {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable video, rebuilt on every search and never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
}

impl VideoRef {
    /// Reference built from a bare video id, with the standard thumbnail
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        VideoRef {
            thumbnail: thumbnail_url(&id),
            title: String::new(),
            id,
        }
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.id)
    }
}

/// Keyless stock photo search for a dish, e.g. for "Palak Paneer":
/// `https://source.unsplash.com/featured/600x400/?Palak%20Paneer%20indian%20food`
pub fn stock_image_url(title: &str) -> String {
    format!(
        "https://source.unsplash.com/featured/600x400/?{}",
        urlencoding::encode(&format!("{} indian food", title.trim()))
    )
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// True iff every required ingredient appears, by exact case-sensitive match,
/// in `available`.
///
/// "tomato" does not match "tomatoes": no normalisation is applied.
pub fn can_make<R, A>(required: &[R], available: &[A]) -> bool
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    required
        .iter()
        .all(|needed| available.iter().any(|have| have.as_ref() == needed.as_ref()))
}

/// Combine identified and manually entered ingredients, keeping first occurrence order.
///
/// Dedup is case-sensitive; blank entries are dropped and surrounding whitespace trimmed.
pub fn merge_ingredients<I, M>(identified: &[I], manual: &[M]) -> Vec<String>
where
    I: AsRef<str>,
    M: AsRef<str>,
{
    let mut merged: Vec<String> = Vec::new();
    let candidates = identified
        .iter()
        .map(AsRef::as_ref)
        .chain(manual.iter().map(AsRef::as_ref));

    for ingredient in candidates {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || merged.iter().any(|m| m == ingredient) {
            continue;
        }
        merged.push(ingredient.to_string());
    }

    merged
}

/// Lowercase the title and replace every character outside `[a-z0-9]` with `-`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_can_make_subset() {
        let available = strings(&["rice", "chicken", "onion"]);
        assert!(can_make(&strings(&["rice", "chicken"]), &available));
        assert!(!can_make(&strings(&["rice", "fish"]), &available));
    }

    #[test]
    fn test_can_make_empty_cases() {
        let empty: Vec<String> = Vec::new();
        assert!(can_make(&empty, &strings(&["rice"])));
        assert!(can_make(&empty, &empty));
        assert!(!can_make(&strings(&["rice"]), &empty));
    }

    #[test]
    fn test_can_make_is_exact_match() {
        let available = strings(&["tomato", "Onion"]);
        assert!(!can_make(&strings(&["tomatoes"]), &available));
        assert!(!can_make(&strings(&["onion"]), &available));
    }

    #[test]
    fn test_merge_ingredients_dedup_is_case_sensitive() {
        let merged = merge_ingredients(&["rice", "Onion", " rice "], &["onion", "", "salt"]);
        assert_eq!(merged, strings(&["rice", "Onion", "onion", "salt"]));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Chicken Fried Rice"), "chicken-fried-rice");
        assert_eq!(slugify("Mom's Dal (v2)"), "mom-s-dal--v2-");
        assert_eq!(slugify("Pâté"), "p-t-");
    }

    #[test]
    fn test_recipe_matches_key() {
        let recipe = Recipe::named("Palak Paneer");
        assert!(recipe.matches_key("Palak Paneer"));
        assert!(recipe.matches_key("palak-paneer"));
        assert!(!recipe.matches_key("paneer"));
    }

    #[test]
    fn test_difficulty_tolerates_unknown_values() {
        assert_eq!(Difficulty::from("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::from("N/A"), Difficulty::Medium);
    }

    #[test]
    fn test_recipe_deserializes_with_missing_fields() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"id": "x", "title": "Kheer", "tipsAndTricks": ["stir"]}"#)
                .unwrap();
        assert_eq!(recipe.title, "Kheer");
        assert_eq!(recipe.tips, vec!["stir".to_string()]);
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.prep_time, "30 minutes");
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.image_url, PLACEHOLDER_IMAGE_URL);
        assert!(!recipe.favorite);
    }

    #[test]
    fn test_stock_image_url_encodes_title() {
        assert_eq!(
            stock_image_url("Aloo Gobi"),
            "https://source.unsplash.com/featured/600x400/?Aloo%20Gobi%20indian%20food"
        );
        assert_eq!(
            stock_image_url("Dal & Rice?"),
            "https://source.unsplash.com/featured/600x400/?Dal%20%26%20Rice%3F%20indian%20food"
        );
    }

    #[test]
    fn test_video_ref_from_id() {
        let video = VideoRef::from_id("abc123");
        assert_eq!(video.thumbnail, "https://i.ytimg.com/vi/abc123/hqdefault.jpg");
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/abc123");
    }
}
