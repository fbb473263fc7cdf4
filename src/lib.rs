//! Recipe discovery from ingredient photos and free-text descriptions.
//!
//! The usual entry point is [`RecipeSnap::builder()`], which resolves the provider
//! and API keys from configuration and hands out [`Session`]s bound to a storage
//! backend.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flows;
pub mod image;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod store;
pub mod youtube;

pub use builder::{RecipeSnap, RecipeSnapBuilder};
pub use catalog::Category;
pub use config::AppConfig;
pub use error::{Result, SnapError};
pub use flows::{ExpansionReport, SuggestionRequest};
pub use image::{ImageInput, ImageSource};
pub use model::{can_make, merge_ingredients, Difficulty, Recipe, VideoRef};
pub use prompts::{Language, RecipeFilters, SpiceLevel};
pub use providers::{GenerationProvider, GenerationRequest, ProviderKind};
pub use session::{Notice, NoticeKind, Outcome, Session, VideoQuery};
pub use store::{FileStorage, MemoryStorage, Preferences, RecipeList, RecipeStore, StoragePort};
pub use youtube::YouTubeClient;
