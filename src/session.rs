//! Orchestration of the flows the way the views drive them.
//!
//! A [`Session`] owns the provider, the recipe store and the two pieces of UI state
//! every view needs: whether something is loading, and which request is the latest.
//! Each generation draws a [`Ticket`]; if another generation starts before it
//! finishes, its result is dropped instead of being written to the store.

use crate::catalog;
use crate::error::{Result, SnapError};
use crate::flows::{self, SuggestionRequest};
use crate::image::ImageSource;
use crate::model::{merge_ingredients, Recipe, VideoRef};
use crate::prompts::{Language, RecipeFilters};
use crate::providers::GenerationProvider;
use crate::store::{RecipeList, RecipeStore, StoragePort};
use crate::youtube::YouTubeClient;
use log::{debug, info};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Monotonic source of [`Ticket`]s
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a ticket; every ticket drawn earlier becomes stale
    pub fn next(&self) -> Ticket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

#[derive(Debug)]
pub struct Ticket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

/// Marks an operation as in flight until dropped
#[derive(Debug)]
pub struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingGuard {
    pub fn new(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Recipes produced by one generation
#[derive(Debug, Clone, Default)]
pub struct Generation {
    /// Ingredients the recipes were suggested for
    pub ingredients: Vec<String>,
    pub recipes: Vec<Recipe>,
    /// Titles whose detail expansion failed
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Generated(Generation),
    /// The provider answered but suggested nothing
    NothingFound,
    /// A newer generation started before this one finished; nothing was stored
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Destructive,
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn from_error(error: &SnapError) -> Self {
        if error.is_config_error() {
            Notice::destructive("Configuration Error", error.to_string())
        } else {
            Notice::destructive("Error", error.to_string())
        }
    }
}

impl Outcome {
    /// Notices to show for this outcome, in display order
    pub fn notices(&self) -> Vec<Notice> {
        match self {
            Outcome::Generated(generation) => {
                let mut notices: Vec<Notice> = generation
                    .failed
                    .iter()
                    .map(|title| {
                        Notice::destructive(
                            "Error Generating Detailed Recipe",
                            format!(
                                "Failed to generate detailed recipe for {}. Please try again.",
                                title
                            ),
                        )
                    })
                    .collect();
                notices.push(Notice::info(
                    "Recipes Generated!",
                    "Check out the delicious recipes we found for you.",
                ));
                notices
            }
            Outcome::NothingFound => vec![Notice::info(
                "No recipes generated",
                "Could not generate recipes from the provided input.",
            )],
            Outcome::Superseded => Vec::new(),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        match self {
            Outcome::Generated(generation) => &generation.recipes,
            _ => &[],
        }
    }
}

/// What to base video recommendations on
#[derive(Debug, Clone)]
pub enum VideoQuery {
    Text(String),
    /// Identified ingredients, joined with ", ", become the description
    Image(ImageSource),
}

pub struct Session<S> {
    provider: Arc<dyn GenerationProvider>,
    youtube: Option<Arc<YouTubeClient>>,
    store: RecipeStore<S>,
    language: Language,
    counter: GenerationCounter,
    in_flight: Arc<AtomicUsize>,
}

impl<S: StoragePort> Session<S> {
    pub fn new(provider: Arc<dyn GenerationProvider>, storage: S) -> Self {
        Session {
            provider,
            youtube: None,
            store: RecipeStore::new(storage),
            language: Language::default(),
            counter: GenerationCounter::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_youtube(mut self, client: Arc<YouTubeClient>) -> Self {
        self.youtube = Some(client);
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn store(&self) -> &RecipeStore<S> {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Identify ingredients in a photo, add any typed by hand, then suggest and
    /// expand recipes
    pub async fn generate_from_photo(
        &self,
        image: &ImageSource,
        manual_ingredients: &[String],
        filters: &RecipeFilters,
    ) -> Result<Outcome> {
        let _loading = LoadingGuard::new(&self.in_flight);
        let ticket = self.counter.next();

        let result = async {
            let image = image.load().await?;
            let identified =
                flows::identify::process(self.provider.as_ref(), &image, self.language).await?;
            let ingredients = merge_ingredients(&identified, manual_ingredients);
            self.suggest_and_expand(ingredients, filters).await
        }
        .await;

        self.settle(&ticket, result, RecipeList::Generated)
    }

    /// Suggest and expand recipes for ingredients the user already listed
    pub async fn generate_from_ingredients(
        &self,
        ingredients: &[String],
        filters: &RecipeFilters,
    ) -> Result<Outcome> {
        let _loading = LoadingGuard::new(&self.in_flight);
        let ticket = self.counter.next();

        let ingredients = merge_ingredients::<String, String>(ingredients, &[]);
        let result = self.suggest_and_expand(ingredients, filters).await;
        self.settle(&ticket, result, RecipeList::Generated)
    }

    /// Suggest and expand recipes for a random handful of pantry staples
    pub async fn generate_random(&self, filters: &RecipeFilters) -> Result<Outcome> {
        let ingredients =
            catalog::random_ingredients(&mut rand::thread_rng(), catalog::RANDOM_INGREDIENT_COUNT);
        info!("Suggesting recipes for {}", ingredients.join(", "));
        self.generate_from_ingredients(&ingredients, filters).await
    }

    /// Recipes from a free-text description, kept in the saved list
    pub async fn generate_from_text(&self, description: &str) -> Result<Outcome> {
        let _loading = LoadingGuard::new(&self.in_flight);
        let ticket = self.counter.next();

        let result = flows::from_text::process(self.provider.as_ref(), description, self.language)
            .await
            .map(|recipes| Generation {
                ingredients: Vec::new(),
                recipes,
                failed: Vec::new(),
            });
        self.settle(&ticket, result, RecipeList::Saved)
    }

    /// Video recommendations from the provider; falls back to a fixed list
    pub async fn recommend_videos(&self, query: &VideoQuery) -> Result<Vec<VideoRef>> {
        let _loading = LoadingGuard::new(&self.in_flight);
        let description = self.video_description(query).await?;
        Ok(flows::videos::suggest(self.provider.as_ref(), &description, self.language).await)
    }

    /// Video recommendations straight from the search API
    pub async fn search_videos(&self, query: &VideoQuery) -> Result<Vec<VideoRef>> {
        let _loading = LoadingGuard::new(&self.in_flight);
        let client = self
            .youtube
            .as_ref()
            .ok_or_else(|| SnapError::MissingApiKey("YOUTUBE_API_KEY".to_string()))?;
        let description = self.video_description(query).await?;
        flows::videos::search(client, &description, self.language).await
    }

    async fn video_description(&self, query: &VideoQuery) -> Result<String> {
        match query {
            VideoQuery::Text(text) => Ok(text.clone()),
            VideoQuery::Image(source) => {
                let image = source.load().await?;
                let ingredients =
                    flows::identify::process(self.provider.as_ref(), &image, self.language)
                        .await?;
                Ok(ingredients.join(", "))
            }
        }
    }

    async fn suggest_and_expand(
        &self,
        ingredients: Vec<String>,
        filters: &RecipeFilters,
    ) -> Result<Generation> {
        let request = SuggestionRequest::new(ingredients)
            .with_filters(filters.clone())
            .with_language(self.language);
        let candidates = flows::suggestions::process(self.provider.as_ref(), &request).await?;
        if candidates.is_empty() {
            return Ok(Generation {
                ingredients: request.ingredients,
                ..Generation::default()
            });
        }

        let report =
            flows::details::process(self.provider.as_ref(), candidates, self.language).await;
        Ok(Generation {
            ingredients: request.ingredients,
            recipes: report.recipes,
            failed: report.failed,
        })
    }

    /// Drop stale results, otherwise persist and classify
    fn settle(
        &self,
        ticket: &Ticket,
        result: Result<Generation>,
        list: RecipeList,
    ) -> Result<Outcome> {
        if !ticket.is_current() {
            debug!("Discarding result of superseded generation {}", ticket.id());
            return Ok(Outcome::Superseded);
        }

        let generation = result?;
        if generation.recipes.is_empty() {
            return Ok(Outcome::NothingFound);
        }

        self.store.append_all(list, generation.recipes.clone())?;
        info!(
            "Stored {} recipe(s) in {}",
            generation.recipes.len(),
            list.key()
        );
        Ok(Outcome::Generated(generation))
    }
}
