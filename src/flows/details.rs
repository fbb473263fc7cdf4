use crate::error::Result;
use crate::model::Recipe;
use crate::parse::{self, RecipeDetails};
use crate::prompts::{self, Language};
use crate::providers::{GenerationProvider, GenerationRequest};
use futures::future::join_all;
use log::{info, warn};

/// Expanded recipes plus the titles whose expansion failed
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    /// Same length and order as the input
    pub recipes: Vec<Recipe>,
    pub failed: Vec<String>,
}

impl ExpansionReport {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// One generation call for one recipe
pub async fn expand_one(
    provider: &dyn GenerationProvider,
    recipe: &Recipe,
    language: Language,
) -> Result<RecipeDetails> {
    let prompt = prompts::detailed_recipe(&recipe.title, &recipe.ingredients, language);
    let value = provider.generate(&GenerationRequest::new(prompt)).await?;
    Ok(parse::recipe_details(&value))
}

/// Expand every recipe concurrently.
///
/// A failed call never aborts the batch: that recipe keeps its other fields but its
/// instructions, description and tips are cleared, and its title is listed in
/// `failed`.
pub async fn process(
    provider: &dyn GenerationProvider,
    recipes: Vec<Recipe>,
    language: Language,
) -> ExpansionReport {
    let expansions = join_all(
        recipes
            .iter()
            .map(|recipe| expand_one(provider, recipe, language)),
    )
    .await;

    let mut report = ExpansionReport::default();
    for (mut recipe, expansion) in recipes.into_iter().zip(expansions) {
        match expansion {
            Ok(details) => apply(&mut recipe, details),
            Err(e) => {
                warn!("Failed to expand '{}': {}", recipe.title, e);
                apply(&mut recipe, RecipeDetails::default());
                recipe.description.clear();
                report.failed.push(recipe.title.clone());
            }
        }
        report.recipes.push(recipe);
    }

    info!(
        "Expanded {} of {} recipe(s)",
        report.recipes.len() - report.failed.len(),
        report.recipes.len()
    );
    report
}

fn apply(recipe: &mut Recipe, details: RecipeDetails) {
    recipe.instructions = details.instructions;
    recipe.tips = details.tips;
    if !details.description.is_empty() {
        recipe.description = details.description;
    }
}
