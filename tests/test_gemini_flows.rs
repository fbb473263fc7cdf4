use mockito::{Matcher, Server};
use recipe_snap::{AppConfig, ProviderKind, RecipeSnap, SuggestionRequest};
use serde_json::json;

fn gemini_text(value: serde_json::Value) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": value.to_string()}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn snap(server: &Server) -> RecipeSnap {
    RecipeSnap::builder()
        .config(AppConfig::default())
        .provider(ProviderKind::Google)
        .api_key("test-key")
        .model("gemini-test")
        .base_url(server.url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_suggestions_answer_can_make_tool_calls() {
    let mut server = Server::new_async().await;

    let tool_call = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("canMakeRecipe".into()))
        .with_status(200)
        .with_body(
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{
                        "functionCall": {
                            "name": "canMakeRecipe",
                            "args": {
                                "recipeIngredients": ["rice", "chicken"],
                                "availableIngredients": ["rice", "chicken", "onion"]
                            }
                        }
                    }]}
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let final_answer = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex(r#""functionResponse""#.into()))
        .with_status(200)
        .with_body(gemini_text(json!({"recipes": [
            {"name": "Chicken Rice", "description": "Simple", "ingredients": ["rice", "chicken"], "canMake": true},
            {"name": "Fish Rice", "description": "Coastal", "ingredients": ["rice", "fish"], "canMake": true}
        ]})))
        .expect(1)
        .create_async()
        .await;

    let request = SuggestionRequest::new(vec![
        "rice".to_string(),
        "chicken".to_string(),
        "onion".to_string(),
    ]);
    let recipes = snap(&server).suggest_recipes(&request).await.unwrap();

    assert_eq!(recipes.len(), 2);
    assert!(recipes[0].can_make);
    assert!(!recipes[1].can_make, "local predicate overrides the model");

    tool_call.assert_async().await;
    final_answer.assert_async().await;
}

#[tokio::test]
async fn test_expand_details_isolates_failures() {
    let mut server = Server::new_async().await;

    let _ok = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Poha".into()))
        .with_status(200)
        .with_body(gemini_text(json!({
            "instructions": ["Rinse poha", "Temper mustard seeds"],
            "description": "Flattened rice breakfast",
            "tipsAndTricks": ["Do not over-soak"]
        })))
        .create_async()
        .await;

    let _failing = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Upma".into()))
        .with_status(503)
        .with_body(r#"{"error": {"code": 503, "message": "The model is overloaded."}}"#)
        .create_async()
        .await;

    let recipes = vec![
        recipe_snap::Recipe::named("Poha"),
        recipe_snap::Recipe::named("Upma"),
    ];
    let report = snap(&server).expand_details(recipes).await;

    assert_eq!(report.recipes.len(), 2);
    assert_eq!(report.failed, vec!["Upma"]);
    assert_eq!(report.recipes[0].description, "Flattened rice breakfast");
    assert_eq!(report.recipes[0].tips, vec!["Do not over-soak"]);
    assert!(report.recipes[1].instructions.is_empty());
    assert!(report.recipes[1].tips.is_empty());
}

#[tokio::test]
async fn test_video_suggestions_fall_back_when_provider_fails() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let videos = snap(&server).suggest_videos("masala dosa").await;
    assert!(!videos.is_empty());
    assert_eq!(videos.len(), recipe_snap::flows::FALLBACK_VIDEOS.len());
}

#[tokio::test]
async fn test_video_suggestions_fall_back_on_empty_list() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_text(json!({"youtubeVideoSuggestions": []})))
        .create_async()
        .await;

    let videos = snap(&server).suggest_videos("masala dosa").await;
    assert_eq!(videos[0].id, recipe_snap::flows::FALLBACK_VIDEOS[0]);
}

/// Requires GOOGLE_API_KEY and network access
#[tokio::test]
#[ignore]
async fn test_live_recipes_from_text() {
    let snap = RecipeSnap::builder()
        .config(AppConfig::default())
        .provider(ProviderKind::Google)
        .build()
        .unwrap();

    let recipes = snap
        .recipes_from_text("a quick vegetarian dinner with chickpeas")
        .await
        .unwrap();
    assert!(!recipes.is_empty());
}
