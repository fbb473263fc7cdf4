//! Parse-with-defaults for every generation response shape.
//!
//! Providers are asked for a strict shape but are not trusted to honour it. These
//! functions never fail on a missing or mistyped field; they coalesce to the same
//! defaults a freshly constructed [`Recipe`] carries, so downstream code can assume
//! fully populated records.

use crate::model::{stock_image_url, Difficulty, Recipe};
use serde_json::Value;

/// Long-form content produced by the detail expansion call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDetails {
    pub instructions: Vec<String>,
    pub description: String,
    pub tips: Vec<String>,
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap_or(&Vec::new())
        .iter()
        .filter_map(|item| item.as_str())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn text(value: &Value) -> String {
    value.as_str().map(str::trim).unwrap_or_default().to_string()
}

/// Numbers sometimes come back as strings ("350 kcal"); take the leading digits
fn whole_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u32),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// `{ "ingredients": [string] }`, in provider order, blanks dropped
pub fn ingredient_list(value: &Value) -> Vec<String> {
    string_list(&value["ingredients"])
}

/// `{ "recipes": [ {name, description, ingredients, instructions, ...} ] }`
///
/// Entries without a name are skipped. `canMake` is taken as sent; the suggestion
/// flow recomputes it.
pub fn recipe_candidates(value: &Value) -> Vec<Recipe> {
    value["recipes"]
        .as_array()
        .unwrap_or(&Vec::new())
        .iter()
        .filter_map(recipe_candidate)
        .collect()
}

fn recipe_candidate(value: &Value) -> Option<Recipe> {
    let name = text(&value["name"]);
    if name.is_empty() {
        return None;
    }

    let mut recipe = Recipe::named(name);
    recipe.image_url = stock_image_url(&recipe.title);
    recipe.description = text(&value["description"]);
    recipe.ingredients = string_list(&value["ingredients"]);
    recipe.instructions = string_list(&value["instructions"]);
    recipe.tips = string_list(&value["tips"]);

    let prep_time = text(&value["prepTime"]);
    if !prep_time.is_empty() {
        recipe.prep_time = prep_time;
    }
    recipe.cook_time = text(&value["cookTime"]);
    if let Some(servings) = whole_number(&value["servings"]).filter(|s| *s > 0) {
        recipe.servings = servings;
    }
    if let Some(calories) = whole_number(&value["calories"]) {
        recipe.calories = calories;
    }
    if let Some(difficulty) = value["difficulty"].as_str() {
        recipe.difficulty = Difficulty::from(difficulty);
    }
    recipe.can_make = value["canMake"].as_bool().unwrap_or(false);

    Some(recipe)
}

/// `{ "instructions": [string], "description": string, "tipsAndTricks": [string] }`
pub fn recipe_details(value: &Value) -> RecipeDetails {
    RecipeDetails {
        instructions: string_list(&value["instructions"]),
        description: text(&value["description"]),
        tips: string_list(&value["tipsAndTricks"]),
    }
}

/// `{ "recipes": [ {name, ingredients, instructions: string} ] }`
///
/// The single instruction string doubles as the description.
pub fn text_recipes(value: &Value) -> Vec<Recipe> {
    value["recipes"]
        .as_array()
        .unwrap_or(&Vec::new())
        .iter()
        .filter_map(|item| {
            let name = text(&item["name"]);
            if name.is_empty() {
                return None;
            }

            let mut recipe = Recipe::named(name);
            recipe.ingredients = string_list(&item["ingredients"]);
            let instructions = match &item["instructions"] {
                // Some models answer with a list despite the declared string
                Value::Array(_) => string_list(&item["instructions"]).join("\n"),
                other => text(other),
            };
            if !instructions.is_empty() {
                recipe.description = instructions.clone();
                recipe.instructions = vec![instructions];
            }
            Some(recipe)
        })
        .collect()
}

/// `{ "youtubeVideoSuggestions": [string] }`
pub fn video_ids(value: &Value) -> Vec<String> {
    string_list(&value["youtubeVideoSuggestions"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ingredient_list_drops_blanks_and_non_strings() {
        let value = json!({"ingredients": ["tomato", " ", 3, " onion "]});
        assert_eq!(ingredient_list(&value), vec!["tomato", "onion"]);
        assert!(ingredient_list(&json!({})).is_empty());
    }

    #[test]
    fn test_recipe_candidates_full_record() {
        let value = json!({"recipes": [{
            "name": "Jeera Rice",
            "description": "Cumin-scented rice",
            "ingredients": ["rice", "cumin"],
            "instructions": ["Rinse rice", "Temper cumin", "Cook"],
            "prepTime": "10 minutes",
            "cookTime": "20 minutes",
            "servings": 3,
            "difficulty": "Easy",
            "calories": 210.6,
            "tips": ["Use basmati"],
            "canMake": true
        }]});

        let recipes = recipe_candidates(&value);
        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.id, "Jeera Rice");
        assert_eq!(recipe.title, "Jeera Rice");
        assert_eq!(recipe.instructions.len(), 3);
        assert_eq!(recipe.prep_time, "10 minutes");
        assert_eq!(recipe.servings, 3);
        assert_eq!(recipe.calories, 211);
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert!(recipe.can_make);
        assert_eq!(recipe.category, "Generated");
        assert_eq!(
            recipe.image_url,
            "https://source.unsplash.com/featured/600x400/?Jeera%20Rice%20indian%20food"
        );
    }

    #[test]
    fn test_recipe_candidates_coalesce_missing_fields() {
        let value = json!({"recipes": [
            {"name": "Dal", "servings": "2 people", "calories": "350 kcal"},
            {"description": "nameless"},
            {"name": "Kheer", "servings": 0, "difficulty": 5}
        ]});

        let recipes = recipe_candidates(&value);
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].servings, 2);
        assert_eq!(recipes[0].calories, 350);
        assert_eq!(recipes[0].prep_time, "30 minutes");
        assert!(recipes[0].ingredients.is_empty());
        assert_eq!(recipes[1].servings, 4);
        assert_eq!(recipes[1].difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_recipe_candidates_not_an_object() {
        assert!(recipe_candidates(&json!("nope")).is_empty());
        assert!(recipe_candidates(&json!({"recipes": {}})).is_empty());
    }

    #[test]
    fn test_recipe_details() {
        let details = recipe_details(&json!({
            "instructions": ["Heat ghee"],
            "tipsAndTricks": ["Low flame"]
        }));
        assert_eq!(details.instructions, vec!["Heat ghee"]);
        assert_eq!(details.description, "");
        assert_eq!(details.tips, vec!["Low flame"]);
    }

    #[test]
    fn test_text_recipes_uses_instructions_as_description() {
        let recipes = text_recipes(&json!({"recipes": [{
            "name": "Masala Chai",
            "ingredients": ["tea", "milk"],
            "instructions": "Boil everything together."
        }]}));
        assert_eq!(recipes[0].description, "Boil everything together.");
        assert_eq!(recipes[0].instructions, vec!["Boil everything together."]);
    }

    #[test]
    fn test_text_recipes_accepts_instruction_list() {
        let recipes = text_recipes(&json!({"recipes": [{
            "name": "Toast",
            "instructions": ["Slice", "Toast"]
        }]}));
        assert_eq!(recipes[0].instructions, vec!["Slice\nToast"]);
    }

    #[test]
    fn test_video_ids() {
        let ids = video_ids(&json!({"youtubeVideoSuggestions": ["a1", "", "b2"]}));
        assert_eq!(ids, vec!["a1", "b2"]);
    }
}
