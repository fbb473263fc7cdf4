use crate::error::Result;
use crate::model::VideoRef;
use crate::parse;
use crate::prompts::{self, Language};
use crate::providers::{GenerationProvider, GenerationRequest};
use crate::youtube::YouTubeClient;
use log::{info, warn};

/// Shown whenever the provider comes back with nothing usable: a long-lived cooking
/// tutorial (Gordon Ramsay's scrambled eggs)
pub const FALLBACK_VIDEOS: &[&str] = &["PUP7U5vTMM0"];

pub fn fallback_videos() -> Vec<VideoRef> {
    FALLBACK_VIDEOS.iter().map(|id| VideoRef::from_id(*id)).collect()
}

/// Ask the provider for video ids matching `description`.
///
/// Never empty: a failed call or an empty answer yields [`FALLBACK_VIDEOS`].
pub async fn suggest(
    provider: &dyn GenerationProvider,
    description: &str,
    language: Language,
) -> Vec<VideoRef> {
    let request = GenerationRequest::new(prompts::video_suggestions(description, language));

    let ids = match provider.generate(&request).await {
        Ok(value) => parse::video_ids(&value),
        Err(e) => {
            warn!("Video suggestion failed, using fallback list: {}", e);
            return fallback_videos();
        }
    };

    if ids.is_empty() {
        warn!("No video suggestions returned, using fallback list");
        return fallback_videos();
    }

    info!("{} suggested {} video(s)", provider.provider_name(), ids.len());
    ids.into_iter().map(VideoRef::from_id).collect()
}

/// Text sent to the search API: the description, tagged with the language code
/// unless it is English
pub fn search_query(description: &str, language: Language) -> String {
    match language {
        Language::English => description.trim().to_string(),
        other => format!("{} {}", description.trim(), other.code()).trim().to_string(),
    }
}

/// Search the video API directly. Errors propagate; there is no fallback here.
pub async fn search(
    client: &YouTubeClient,
    description: &str,
    language: Language,
) -> Result<Vec<VideoRef>> {
    client.search(&search_query(description, language)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Answers(Option<Value>);

    #[async_trait]
    impl GenerationProvider for Answers {
        fn provider_name(&self) -> &str {
            "answers"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<Value> {
            self.0
                .clone()
                .ok_or_else(|| SnapError::MalformedResponse("no answer".to_string()))
        }
    }

    #[tokio::test]
    async fn test_suggest_uses_provider_ids() {
        let provider = Answers(Some(json!({"youtubeVideoSuggestions": ["abc", "def"]})));
        let videos = suggest(&provider, "dal tadka", Language::English).await;
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["abc", "def"]);
    }

    #[tokio::test]
    async fn test_suggest_falls_back_on_empty() {
        let provider = Answers(Some(json!({"youtubeVideoSuggestions": []})));
        let videos = suggest(&provider, "dal tadka", Language::English).await;
        assert_eq!(videos, fallback_videos());
        assert!(!videos.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_falls_back_on_error() {
        let videos = suggest(&Answers(None), "dal tadka", Language::English).await;
        assert_eq!(videos.len(), FALLBACK_VIDEOS.len());
    }

    #[test]
    fn test_fallback_ids_are_well_formed() {
        assert!(!FALLBACK_VIDEOS.is_empty());
        for id in FALLBACK_VIDEOS {
            assert_eq!(id.len(), 11);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_search_query() {
        assert_eq!(search_query(" poha ", Language::English), "poha");
        assert_eq!(search_query("poha", Language::Marathi), "poha mr");
        assert_eq!(search_query("", Language::Hindi), "hi");
    }
}
