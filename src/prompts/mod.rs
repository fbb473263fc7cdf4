//! Prompt Builder
//!
//! Every generation flow sends an instruction plus a [`Shape`] declaring the JSON the
//! model must answer with. Instructions are rendered from the `*.txt` templates next
//! to this file, which are embedded at compile time with `include_str!` so they can be
//! edited without dealing with Rust string syntax.
//!
//! All builders are pure and never fail: an empty ingredient list or description still
//! yields a well-formed instruction.

mod shape;

pub use shape::Shape;

use std::fmt;
use std::str::FromStr;

const IDENTIFY_INGREDIENTS_TEMPLATE: &str = include_str!("identify_ingredients.txt");
const RECIPE_SUGGESTIONS_TEMPLATE: &str = include_str!("recipe_suggestions.txt");
const DETAILED_RECIPE_TEMPLATE: &str = include_str!("detailed_recipe.txt");
const RECIPE_FROM_TEXT_TEMPLATE: &str = include_str!("recipe_from_text.txt");
const VIDEO_SUGGESTIONS_TEMPLATE: &str = include_str!("video_suggestions.txt");

/// Instruction text plus the output shape it asks for
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub instruction: String,
    pub shape: Shape,
}

/// Languages the generated content can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Japanese,
    Hindi,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Hindi,
        Language::Marathi,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Japanese => "ja",
            Language::Hindi => "hi",
            Language::Marathi => "mr",
        }
    }

    /// Display name, which is what the prompts embed
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Japanese => "Japanese",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts either the code ("hi") or the display name ("Hindi"), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(wanted) || lang.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let codes: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                format!(
                    "unsupported language '{}' (expected one of {})",
                    wanted,
                    codes.join(", ")
                )
            })
    }
}

/// Heat level requested for suggested recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiceLevel {
    Mild,
    Medium,
    Hot,
}

impl SpiceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
        }
    }
}

impl FromStr for SpiceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(SpiceLevel::Mild),
            "medium" => Ok(SpiceLevel::Medium),
            "hot" | "spicy" => Ok(SpiceLevel::Hot),
            other => Err(format!("unknown spice level '{}'", other)),
        }
    }
}

/// Optional constraints that steer the suggestion prompt.
///
/// The model is free to ignore them; nothing downstream enforces them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilters {
    pub dietary_restrictions: Option<String>,
    /// Minutes
    pub max_prep_time: Option<u32>,
    pub cuisine: Option<String>,
    pub cooking_method: Option<String>,
    pub spice_level: Option<SpiceLevel>,
}

impl RecipeFilters {
    /// Rendered constraint lines, one per set filter. "none" and blank values are skipped.
    fn constraint_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(diet) = meaningful(&self.dietary_restrictions) {
            lines.push(format!("- Every recipe must respect this dietary restriction: {}", diet));
        }
        if let Some(minutes) = self.max_prep_time {
            lines.push(format!(
                "- Preparation time must not exceed {} minutes",
                minutes
            ));
        }
        if let Some(cuisine) = meaningful(&self.cuisine) {
            lines.push(format!("- Suggest {} cuisine", cuisine));
        }
        if let Some(method) = meaningful(&self.cooking_method) {
            lines.push(format!("- Use this cooking method: {}", method));
        }
        if let Some(level) = self.spice_level {
            lines.push(format!("- Spice level should be {}", level.as_str()));
        }

        lines
    }
}

fn meaningful(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none provided)".to_string()
    } else {
        items.join(", ")
    }
}

fn text_or_none(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "(none provided)"
    } else {
        text
    }
}

/// Fill `{{name}}` placeholders in one pass, so placeholder-like text inside a
/// value is copied verbatim. Unknown placeholders are left as they are.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

pub fn identify_ingredients(language: Language) -> Prompt {
    Prompt {
        instruction: render(IDENTIFY_INGREDIENTS_TEMPLATE, &[("language", language.name())]),
        shape: Shape::ingredient_list(),
    }
}

pub fn recipe_suggestions(
    ingredients: &[String],
    filters: &RecipeFilters,
    language: Language,
) -> Prompt {
    let constraints = filters.constraint_lines();
    let filters_block = if constraints.is_empty() {
        String::new()
    } else {
        format!("\nConstraints:\n{}\n", constraints.join("\n"))
    };

    let ingredient_list = join_or_none(ingredients);

    Prompt {
        instruction: render(
            RECIPE_SUGGESTIONS_TEMPLATE,
            &[
                ("language", language.name()),
                ("ingredients", ingredient_list.as_str()),
                ("filters", filters_block.as_str()),
            ],
        ),
        shape: Shape::recipe_suggestions(),
    }
}

pub fn detailed_recipe(recipe_name: &str, ingredients: &[String], language: Language) -> Prompt {
    let ingredient_list = join_or_none(ingredients);
    Prompt {
        instruction: render(
            DETAILED_RECIPE_TEMPLATE,
            &[
                ("language", language.name()),
                ("recipe_name", recipe_name.trim()),
                ("ingredients", ingredient_list.as_str()),
            ],
        ),
        shape: Shape::detailed_recipe(),
    }
}

pub fn recipe_from_text(description: &str, language: Language) -> Prompt {
    Prompt {
        instruction: render(
            RECIPE_FROM_TEXT_TEMPLATE,
            &[
                ("language", language.name()),
                ("description", text_or_none(description)),
            ],
        ),
        shape: Shape::recipes_from_text(),
    }
}

pub fn video_suggestions(description: &str, language: Language) -> Prompt {
    Prompt {
        instruction: render(
            VIDEO_SUGGESTIONS_TEMPLATE,
            &[
                ("language", language.name()),
                ("description", text_or_none(description)),
            ],
        ),
        shape: Shape::video_suggestions(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_templates_are_embedded() {
        for template in [
            IDENTIFY_INGREDIENTS_TEMPLATE,
            RECIPE_SUGGESTIONS_TEMPLATE,
            DETAILED_RECIPE_TEMPLATE,
            RECIPE_FROM_TEXT_TEMPLATE,
            VIDEO_SUGGESTIONS_TEMPLATE,
        ] {
            assert!(!template.is_empty());
            assert!(template.contains("{{language}}"));
        }
    }

    #[test]
    fn test_suggestion_prompt_embeds_parameters() {
        let filters = RecipeFilters {
            dietary_restrictions: Some("vegetarian".to_string()),
            max_prep_time: Some(20),
            spice_level: Some(SpiceLevel::Mild),
            ..Default::default()
        };
        let prompt = recipe_suggestions(
            &strings(&["rice", "chicken", "onion"]),
            &filters,
            Language::Hindi,
        );

        assert!(prompt.instruction.contains("rice, chicken, onion"));
        assert!(prompt.instruction.contains("Hindi"));
        assert!(prompt.instruction.contains("vegetarian"));
        assert!(prompt.instruction.contains("20 minutes"));
        assert!(prompt.instruction.contains("mild"));
        assert!(!prompt.instruction.contains("{{"));
        assert_eq!(prompt.shape, Shape::recipe_suggestions());
    }

    #[test]
    fn test_suggestion_and_detail_prompts_ask_for_indian_dishes() {
        let filters = RecipeFilters::default();
        let prompt = recipe_suggestions(&strings(&["rice"]), &filters, Language::English);
        assert!(prompt.instruction.contains("authentic Indian recipes"));

        let prompt = detailed_recipe("Poha", &strings(&["flattened rice"]), Language::English);
        assert!(prompt.instruction.contains("Indian recipe \"Poha\""));
    }

    #[test]
    fn test_dietary_none_adds_no_constraint() {
        let filters = RecipeFilters {
            dietary_restrictions: Some("none".to_string()),
            ..Default::default()
        };
        let prompt = recipe_suggestions(&strings(&["rice"]), &filters, Language::English);
        assert!(!prompt.instruction.contains("Constraints:"));
    }

    #[test]
    fn test_empty_inputs_still_render() {
        let prompt = recipe_suggestions(&[], &RecipeFilters::default(), Language::English);
        assert!(prompt.instruction.contains("Ingredients: (none provided)"));
        assert!(!prompt.instruction.contains("{{"));

        let prompt = recipe_from_text("   ", Language::French);
        assert!(prompt.instruction.contains("Recipe Description: (none provided)"));

        let prompt = video_suggestions("", Language::English);
        assert!(!prompt.instruction.contains("{{"));
    }

    #[test]
    fn test_detailed_prompt() {
        let prompt = detailed_recipe(
            " Butter Chicken ",
            &strings(&["chicken", "butter"]),
            Language::German,
        );
        assert!(prompt.instruction.contains("\"Butter Chicken\""));
        assert!(prompt.instruction.contains("chicken, butter"));
        assert!(prompt.instruction.contains("German"));
    }

    #[test]
    fn test_user_text_is_embedded_verbatim() {
        let filters = RecipeFilters {
            cuisine: Some("Goan".to_string()),
            ..Default::default()
        };
        let prompt = recipe_suggestions(&strings(&["{{filters}}"]), &filters, Language::English);

        assert!(prompt.instruction.contains("Ingredients: {{filters}}\n"));
        assert_eq!(prompt.instruction.matches("Goan").count(), 1);

        let prompt = detailed_recipe("{{language}} Curry", &strings(&["rice"]), Language::Hindi);
        assert!(prompt.instruction.contains("\"{{language}} Curry\""));
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("a {{x}} b {{y}}", &[("x", "1")]), "a 1 b {{y}}");
        assert_eq!(render("open {{x", &[("x", "1")]), "open {{x");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("Marathi".parse::<Language>().unwrap(), Language::Marathi);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::English);
        let err = "xx".parse::<Language>().unwrap_err();
        assert!(err.contains("en, es, fr, de, ja, hi, mr"));
    }

    #[test]
    fn test_spice_level_parsing() {
        assert_eq!("Spicy".parse::<SpiceLevel>().unwrap(), SpiceLevel::Hot);
        assert!("volcanic".parse::<SpiceLevel>().is_err());
    }
}
