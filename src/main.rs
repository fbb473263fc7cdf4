use clap::{Args, Parser, Subcommand};
use log::{debug, error};
use recipe_snap::catalog::{self, Category};
use recipe_snap::store::PREFERENCES_KEY;
use recipe_snap::{
    AppConfig, FileStorage, ImageSource, Language, MemoryStorage, Notice, NoticeKind, Outcome,
    ProviderKind, Recipe, RecipeFilters, RecipeList, RecipeSnap, RecipeStore, Result, Session,
    SpiceLevel, StoragePort, VideoQuery, VideoRef,
};
use std::process::ExitCode;
use std::sync::Arc;

type Storage = Arc<dyn StoragePort>;

#[derive(Parser)]
#[command(name = "recipe-snap")]
#[command(about = "Discover recipes from ingredient photos or a description", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Generative provider (google/openai/anthropic); defaults to the configured chain
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Language of generated content (en, es, fr, de, ja, hi, mr)
    #[arg(short, long, global = true)]
    language: Option<Language>,

    /// Directory holding the recipe lists (overrides storage.path)
    #[arg(long, global = true)]
    storage: Option<String>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Dietary restriction, e.g. "vegetarian" ("none" for no restriction)
    #[arg(long)]
    diet: Option<String>,

    /// Maximum preparation time in minutes
    #[arg(long)]
    max_prep_time: Option<u32>,

    #[arg(long)]
    cuisine: Option<String>,

    /// Cooking method, e.g. "baking"
    #[arg(long)]
    method: Option<String>,

    /// mild/medium/hot
    #[arg(long)]
    spice: Option<SpiceLevel>,
}

impl From<FilterArgs> for RecipeFilters {
    fn from(args: FilterArgs) -> Self {
        RecipeFilters {
            dietary_restrictions: args.diet,
            max_prep_time: args.max_prep_time,
            cuisine: args.cuisine,
            cooking_method: args.method,
            spice_level: args.spice,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Identify ingredients in a photo and suggest recipes
    Photo {
        /// Image file, or a data: URI
        image: String,

        /// Extra ingredients to add to the identified ones
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Suggest recipes for a list of ingredients
    Ingredients {
        #[arg(required = true)]
        ingredients: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Suggest Indian recipes for a random handful of pantry staples
    Suggestions {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Create recipes from a free-text description
    Text {
        description: String,
    },

    /// Recommend cooking videos
    Videos {
        /// What to cook
        description: Option<String>,

        /// Base the recommendation on the ingredients in this photo
        #[arg(long, conflicts_with = "description")]
        image: Option<String>,

        /// Query the YouTube search API directly
        #[arg(long)]
        search: bool,
    },

    /// Sample recipes followed by generated ones
    Feed {
        #[arg(short, long, default_value = "All")]
        category: Category,

        /// Only recipes over 200 calories
        #[arg(long)]
        popular: bool,
    },

    /// Show one recipe by id or slug
    Show { slug: String },

    /// Toggle the favorite flag of a recipe
    Favorite { id: String },

    /// List favorite recipes
    Favorites {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Search generated recipes by title or description
    Search {
        #[arg(default_value = "")]
        term: String,
    },

    /// Show or edit dietary preferences
    Profile {
        #[arg(long)]
        add_diet: Option<String>,

        #[arg(long)]
        remove_diet: Option<String>,
    },

    /// Show or change settings
    Settings {
        /// Preferred language for generation
        #[arg(long = "set-language")]
        set_language: Option<Language>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            print_notice(&Notice::from_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Options shared by every generation command
struct SessionOptions {
    provider: Option<ProviderKind>,
    language: Option<Language>,
    video_search: bool,
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let storage_path = cli
        .storage
        .clone()
        .unwrap_or_else(|| config.storage.path.clone());
    let storage: Storage = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        debug!("Using storage at {}", storage_path);
        Arc::new(FileStorage::new(&storage_path))
    };
    let store = RecipeStore::new(Arc::clone(&storage));
    let mut options = SessionOptions {
        provider: cli.provider,
        language: cli.language,
        video_search: false,
    };

    match cli.command {
        Commands::Photo {
            image,
            ingredients,
            filters,
        } => {
            let session = open_session(&options, config, storage)?;
            let outcome = session
                .generate_from_photo(&image_source(&image), &ingredients, &filters.into())
                .await?;
            report(&outcome);
        }

        Commands::Ingredients {
            ingredients,
            filters,
        } => {
            let session = open_session(&options, config, storage)?;
            let outcome = session
                .generate_from_ingredients(&ingredients, &filters.into())
                .await?;
            report(&outcome);
        }

        Commands::Suggestions { filters } => {
            let session = open_session(&options, config, storage)?;
            let outcome = session.generate_random(&filters.into()).await?;
            if let Outcome::Generated(generation) = &outcome {
                println!("Ingredients: {}", generation.ingredients.join(", "));
            }
            report(&outcome);
        }

        Commands::Text { description } => {
            let session = open_session(&options, config, storage)?;
            let outcome = session.generate_from_text(&description).await?;
            report(&outcome);
        }

        Commands::Videos {
            description,
            image,
            search,
        } => {
            let query = match (image, description) {
                (Some(image), _) => VideoQuery::Image(image_source(&image)),
                (None, text) => VideoQuery::Text(text.unwrap_or_default()),
            };
            options.video_search = search;
            let session = open_session(&options, config, storage)?;
            let videos = if search {
                session.search_videos(&query).await?
            } else {
                session.recommend_videos(&query).await?
            };
            print_videos(&videos);
        }

        Commands::Feed { category, popular } => {
            let generated = store.list(RecipeList::Generated)?;
            let mut feed = catalog::home_feed(generated, category);
            if popular {
                feed = catalog::popular(&feed);
            }
            print_summaries(&feed);
        }

        Commands::Show { slug } => match store.find_by_slug(&slug)? {
            Some(recipe) => print_recipe(&recipe),
            None => print_notice(&Notice::destructive(
                "Recipe not found",
                format!("No recipe matches '{}'.", slug),
            )),
        },

        Commands::Favorite { id } => match store.toggle_favorite(&id)? {
            Some(true) => print_notice(&Notice::info("Added to favorites", id)),
            Some(false) => print_notice(&Notice::info("Removed from favorites", id)),
            None => print_notice(&Notice::destructive(
                "Recipe not found",
                format!("No recipe matches '{}'.", id),
            )),
        },

        Commands::Favorites { search } => {
            let term = search.unwrap_or_default();
            print_summaries(&store.search_in(RecipeList::Favorites, &term)?);
        }

        Commands::Search { term } => {
            let results = store.search(&term)?;
            if results.is_empty() {
                println!("No recipes found for \"{}\".", term);
            } else {
                print_summaries(&results);
            }
        }

        Commands::Profile {
            add_diet,
            remove_diet,
        } => {
            let mut preferences = store.preferences()?;
            let mut changed = false;
            if let Some(diet) = add_diet {
                changed |= preferences.add_dietary_preference(&diet);
            }
            if let Some(diet) = remove_diet {
                changed |= preferences.remove_dietary_preference(&diet);
            }
            if changed {
                store.save_preferences(&preferences)?;
            }
            println!("Language: {}", preferences.language().name());
            println!("Dietary preferences:");
            for preference in &preferences.dietary_preferences {
                println!("  - {}", preference);
            }
        }

        Commands::Settings { set_language } => {
            let mut preferences = store.preferences()?;
            if let Some(language) = set_language {
                preferences.set_language(language);
                store.save_preferences(&preferences)?;
            }
            println!("Language: {} ({})", preferences.language().name(), preferences.language);
            println!("Provider: {}", config.default_provider);
            println!("Storage: {}", storage_path);
        }
    }

    Ok(())
}

/// Language precedence: command line, then saved settings, then config
fn open_session(
    options: &SessionOptions,
    config: AppConfig,
    storage: Storage,
) -> Result<Session<Storage>> {
    let mut builder = RecipeSnap::builder().config(config);
    if let Some(provider) = options.provider {
        builder = builder.provider(provider);
    }

    let saved_language = match storage.get(PREFERENCES_KEY)? {
        Some(_) => Some(RecipeStore::new(Arc::clone(&storage)).preferences()?.language()),
        None => None,
    };
    if let Some(language) = options.language.or(saved_language) {
        builder = builder.language(language);
    }
    if options.video_search {
        builder = builder.with_video_search();
    }

    Ok(builder.build()?.session(storage))
}

fn image_source(input: &str) -> ImageSource {
    if input.starts_with("data:") {
        ImageSource::DataUri(input.to_string())
    } else {
        ImageSource::Path(input.to_string())
    }
}

fn report(outcome: &Outcome) {
    for notice in outcome.notices() {
        print_notice(&notice);
    }
    for recipe in outcome.recipes() {
        println!();
        print_recipe(recipe);
    }
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info => println!("{}: {}", notice.title, notice.description),
        NoticeKind::Destructive => eprintln!("{}: {}", notice.title, notice.description),
    }
}

fn print_summaries(recipes: &[Recipe]) {
    for recipe in recipes {
        let favorite = if recipe.favorite { " *" } else { "" };
        println!(
            "{:<28} {:<10} {:>4} kcal  {}{}",
            recipe.title,
            recipe.category,
            recipe.calories,
            recipe.slug(),
            favorite
        );
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("# {}", recipe.title);
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    println!(
        "Prep: {} | Servings: {} | Difficulty: {} | Calories: {}",
        recipe.prep_time, recipe.servings, recipe.difficulty, recipe.calories
    );
    if recipe.can_make {
        println!("You have everything for this one.");
    }

    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient);
    }
    if !recipe.instructions.is_empty() {
        println!("\nInstructions:");
        for (index, step) in recipe.instructions.iter().enumerate() {
            println!("  {}. {}", index + 1, step);
        }
    }
    if !recipe.tips.is_empty() {
        println!("\nTips:");
        for tip in &recipe.tips {
            println!("  - {}", tip);
        }
    }
}

fn print_videos(videos: &[VideoRef]) {
    for video in videos {
        let title = if video.title.is_empty() { &video.id } else { &video.title };
        println!("{}\n  {}\n  {}", title, video.embed_url(), video.thumbnail);
    }
}
