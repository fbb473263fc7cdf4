use crate::error::Result;
use crate::image::ImageInput;
use crate::parse;
use crate::prompts::{self, Language};
use crate::providers::{GenerationProvider, GenerationRequest};
use log::info;

/// Name the ingredients visible in `image`, in the order the provider lists them.
///
/// Any provider failure propagates; callers should not go on to suggest recipes.
pub async fn process(
    provider: &dyn GenerationProvider,
    image: &ImageInput,
    language: Language,
) -> Result<Vec<String>> {
    let request = GenerationRequest::new(prompts::identify_ingredients(language))
        .with_image(image.clone());

    let value = provider.generate(&request).await?;
    let ingredients = parse::ingredient_list(&value);
    info!(
        "{} identified {} ingredient(s)",
        provider.provider_name(),
        ingredients.len()
    );
    Ok(ingredients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Canned(Result<Value>);

    #[async_trait]
    impl GenerationProvider for Canned {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
            assert!(request.image.is_some());
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(SnapError::MalformedResponse(e.to_string())),
            }
        }
    }

    fn image() -> ImageInput {
        ImageInput::from_bytes(b"not really a jpeg", "image/jpeg")
    }

    #[tokio::test]
    async fn test_identify_keeps_provider_order() {
        let provider = Canned(Ok(json!({"ingredients": ["onion", "rice", "onion"]})));
        let ingredients = process(&provider, &image(), Language::English).await.unwrap();
        assert_eq!(ingredients, vec!["onion", "rice", "onion"]);
    }

    #[tokio::test]
    async fn test_identify_propagates_failure() {
        let provider = Canned(Err(SnapError::MalformedResponse("bad".to_string())));
        let err = process(&provider, &image(), Language::English).await.unwrap_err();
        assert!(err.is_provider_error());
    }
}
