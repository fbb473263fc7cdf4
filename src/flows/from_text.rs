use crate::error::Result;
use crate::model::Recipe;
use crate::parse;
use crate::prompts::{self, Language};
use crate::providers::{GenerationProvider, GenerationRequest};
use log::info;

/// Turn a free-text description ("something spicy with paneer") into recipes.
///
/// An empty result is the "nothing found" case, not an error.
pub async fn process(
    provider: &dyn GenerationProvider,
    description: &str,
    language: Language,
) -> Result<Vec<Recipe>> {
    let request = GenerationRequest::new(prompts::recipe_from_text(description, language));
    let value = provider.generate(&request).await?;
    let recipes = parse::text_recipes(&value);
    info!("{} produced {} recipe(s) from text", provider.provider_name(), recipes.len());
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait]
    impl GenerationProvider for Echo {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
            assert!(request.instruction.contains("paneer"));
            assert!(request.tools.is_empty());
            Ok(json!({"recipes": [{
                "name": "Paneer Tikka",
                "ingredients": ["paneer", "yogurt"],
                "instructions": "Marinate and grill."
            }]}))
        }
    }

    #[tokio::test]
    async fn test_recipes_from_text() {
        let recipes = process(&Echo, "something with paneer", Language::Hindi)
            .await
            .unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Paneer Tikka");
        assert_eq!(recipes[0].description, "Marinate and grill.");
        assert_eq!(recipes[0].category, "Generated");
    }
}
