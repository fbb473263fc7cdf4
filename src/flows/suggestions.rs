use crate::error::{Result, SnapError};
use crate::model::{can_make, Recipe};
use crate::parse;
use crate::prompts::{self, Language, RecipeFilters};
use crate::providers::{GenerationProvider, GenerationRequest, Tool};
use log::{debug, info};
use serde_json::{json, Value};
use std::sync::Arc;

/// Parameters of one suggestion run
#[derive(Debug, Clone, Default)]
pub struct SuggestionRequest {
    pub ingredients: Vec<String>,
    pub filters: RecipeFilters,
    pub language: Language,
}

impl SuggestionRequest {
    pub fn new(ingredients: Vec<String>) -> Self {
        SuggestionRequest {
            ingredients,
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: RecipeFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// The can-make predicate exposed to the model as `canMakeRecipe`
pub struct CanMakeTool;

impl CanMakeTool {
    fn string_array(input: &Value, field: &str) -> Result<Vec<String>> {
        let items = input[field].as_array().ok_or_else(|| {
            SnapError::MalformedResponse(format!("canMakeRecipe: '{}' must be an array", field))
        })?;
        Ok(items
            .iter()
            .filter_map(|item| item.as_str().map(String::from))
            .collect())
    }
}

impl Tool for CanMakeTool {
    fn name(&self) -> &str {
        "canMakeRecipe"
    }

    fn description(&self) -> &str {
        "Check whether a recipe can be made with the available ingredients"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "recipeIngredients": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ingredients the recipe requires"
                },
                "availableIngredients": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ingredients the user has"
                }
            },
            "required": ["recipeIngredients", "availableIngredients"]
        })
    }

    fn call(&self, input: &Value) -> Result<Value> {
        let required = Self::string_array(input, "recipeIngredients")?;
        let available = Self::string_array(input, "availableIngredients")?;
        Ok(json!({ "canMake": can_make(&required, &available) }))
    }
}

/// Ask for candidate recipes and annotate each with `can_make`.
///
/// Whatever the model reported for `canMake` is overwritten by the local predicate
/// against `request.ingredients`. Zero candidates is returned as an empty list.
pub async fn process(
    provider: &dyn GenerationProvider,
    request: &SuggestionRequest,
) -> Result<Vec<Recipe>> {
    let prompt =
        prompts::recipe_suggestions(&request.ingredients, &request.filters, request.language);
    let generation = GenerationRequest::new(prompt).with_tool(Arc::new(CanMakeTool));

    let value = provider.generate(&generation).await?;
    let mut recipes = parse::recipe_candidates(&value);

    for recipe in &mut recipes {
        let computed = can_make(&recipe.ingredients, &request.ingredients);
        if computed != recipe.can_make {
            debug!(
                "canMake for '{}' corrected from {} to {}",
                recipe.title, recipe.can_make, computed
            );
        }
        recipe.can_make = computed;
    }

    info!("{} suggested {} recipe(s)", provider.provider_name(), recipes.len());
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Suggests(Value);

    #[async_trait]
    impl GenerationProvider for Suggests {
        fn provider_name(&self) -> &str {
            "suggests"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
            assert_eq!(request.tools.len(), 1);
            assert_eq!(request.tools[0].name(), "canMakeRecipe");
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_tool_call() {
        let tool = CanMakeTool;
        let result = tool
            .call(&json!({
                "recipeIngredients": ["rice", "chicken"],
                "availableIngredients": ["rice", "chicken", "onion"]
            }))
            .unwrap();
        assert_eq!(result, json!({"canMake": true}));

        let result = tool
            .call(&json!({
                "recipeIngredients": ["rice", "fish"],
                "availableIngredients": ["rice", "chicken", "onion"]
            }))
            .unwrap();
        assert_eq!(result, json!({"canMake": false}));
    }

    #[test]
    fn test_tool_rejects_missing_arguments() {
        assert!(CanMakeTool.call(&json!({"recipeIngredients": ["rice"]})).is_err());
    }

    #[tokio::test]
    async fn test_can_make_is_recomputed_locally() {
        let provider = Suggests(json!({"recipes": [
            {"name": "Chicken Rice", "ingredients": ["rice", "chicken"], "canMake": false},
            {"name": "Fish Rice", "ingredients": ["rice", "fish"], "canMake": true}
        ]}));
        let request = SuggestionRequest::new(vec![
            "rice".to_string(),
            "chicken".to_string(),
            "onion".to_string(),
        ]);

        let recipes = process(&provider, &request).await.unwrap();
        assert_eq!(recipes.len(), 2);
        assert!(recipes[0].can_make);
        assert!(!recipes[1].can_make);
    }

    #[tokio::test]
    async fn test_zero_candidates_is_empty() {
        let provider = Suggests(json!({"recipes": []}));
        let recipes = process(&provider, &SuggestionRequest::new(vec!["egg".to_string()]))
            .await
            .unwrap();
        assert!(recipes.is_empty());
    }
}
