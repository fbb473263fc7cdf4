//! Recipe categories and the built-in home feed.

use crate::error::{Result, SnapError};
use crate::model::{Recipe, PLACEHOLDER_IMAGE_URL};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Vegetable,
    Rice,
    Fruit,
    Breakfast,
    Seafood,
    FastFood,
    Dessert,
    Beverages,
    Soup,
    Sandwich,
    IceCream,
    Cake,
    Chicken,
    Beef,
    Dairy,
    Beer,
    Wine,
    Vegan,
    Healthy,
}

impl Category {
    pub const ALL: [Category; 20] = [
        Category::All,
        Category::Vegetable,
        Category::Rice,
        Category::Fruit,
        Category::Breakfast,
        Category::Seafood,
        Category::FastFood,
        Category::Dessert,
        Category::Beverages,
        Category::Soup,
        Category::Sandwich,
        Category::IceCream,
        Category::Cake,
        Category::Chicken,
        Category::Beef,
        Category::Dairy,
        Category::Beer,
        Category::Wine,
        Category::Vegan,
        Category::Healthy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Vegetable => "Vegetable",
            Category::Rice => "Rice",
            Category::Fruit => "Fruit",
            Category::Breakfast => "Breakfast",
            Category::Seafood => "Seafood",
            Category::FastFood => "Fast Food",
            Category::Dessert => "Dessert",
            Category::Beverages => "Beverages",
            Category::Soup => "Soup",
            Category::Sandwich => "Sandwich",
            Category::IceCream => "Ice Cream",
            Category::Cake => "Cake",
            Category::Chicken => "Chicken",
            Category::Beef => "Beef",
            Category::Dairy => "Dairy",
            Category::Beer => "Beer",
            Category::Wine => "Wine",
            Category::Vegan => "Vegan",
            Category::Healthy => "Healthy",
        }
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        *self == Category::All || recipe.category.trim().eq_ignore_ascii_case(self.name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = SnapError;

    /// Case-insensitive; "fast-food" and "fast_food" are accepted for "Fast Food"
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| SnapError::InvalidConfig(format!("Unknown category: {}", s)))
    }
}

/// (title, description, calories, image, category)
const FEED: &[(&str, &str, u32, &str, &str)] = &[
    (
        "Chicken Fried Rice",
        "So irresistibly delicious",
        250,
        "https://images.unsplash.com/photo-1546069901-ba9599a7e63c",
        "Vegetable",
    ),
    (
        "Pasta Bolognese",
        "True Italian classic",
        200,
        "https://images.unsplash.com/photo-1563379926898-05f4575a45d8",
        "Rice",
    ),
    (
        "Garlic Potatoes",
        "Crispy Garlic Roasted Potatoes",
        150,
        "https://images.unsplash.com/photo-1600565193348-f74bd3c7ccdf",
        "Vegetable",
    ),
    (
        "Fruit Salad",
        "Sweet and refreshing mix",
        120,
        "https://images.unsplash.com/photo-1568158879083-c42860933ed7",
        "Fruit",
    ),
    (
        "Avocado Toast",
        "Perfect breakfast option",
        180,
        PLACEHOLDER_IMAGE_URL,
        "Breakfast",
    ),
    (
        "Grilled Salmon",
        "Fresh and healthy seafood",
        220,
        "https://images.unsplash.com/photo-1519708227418-c8fd9a32b7a2",
        "Seafood",
    ),
    (
        "Chocolate Cake",
        "Rich and decadent dessert",
        350,
        "https://images.unsplash.com/photo-1578985545062-69928b1d9587",
        "Dessert",
    ),
    (
        "Iced Coffee",
        "Refreshing cold brew",
        90,
        "https://images.unsplash.com/photo-1461023058943-07fcbe16d735",
        "Beverages",
    ),
    (
        "Greek Salad",
        "Fresh Mediterranean flavors",
        130,
        "https://images.unsplash.com/photo-1540420773420-3366772f4999",
        "Vegetable",
    ),
    (
        "Beef Burger",
        "Classic American favorite",
        450,
        "https://images.unsplash.com/photo-1568901346375-23c9450c58cd",
        "Fast Food",
    ),
    (
        "Mushroom Risotto",
        "Creamy Italian comfort food",
        320,
        "https://images.unsplash.com/photo-1476124369491-e7addf5db371",
        "Rice",
    ),
    (
        "Berry Smoothie",
        "Antioxidant-rich energy boost",
        180,
        PLACEHOLDER_IMAGE_URL,
        "Beverages",
    ),
    (
        "Shrimp Tacos",
        "Spicy and zesty seafood delight",
        280,
        "https://images.unsplash.com/photo-1611250188496-e966043a0629",
        "Seafood",
    ),
    (
        "Pancake Stack",
        "Fluffy morning treat with maple syrup",
        420,
        "https://images.unsplash.com/photo-1554520735-0a6b8b6ce8b7",
        "Breakfast",
    ),
    (
        "Tiramisu",
        "Classic Italian coffee-flavored dessert",
        380,
        "https://images.unsplash.com/photo-1571877227200-a0d98ea607e9",
        "Dessert",
    ),
    (
        "Veggie Stir Fry",
        "Quick and nutritious vegetable medley",
        220,
        "https://images.unsplash.com/photo-1512621776951-a57141f2eefd",
        "Vegetable",
    ),
    (
        "Sushi Platter",
        "Assorted fresh Japanese delicacies",
        310,
        "https://images.unsplash.com/photo-1579871494447-9811cf80d66c",
        "Seafood",
    ),
    (
        "Matcha Latte",
        "Antioxidant-rich green tea beverage",
        140,
        "https://images.unsplash.com/photo-1536256263959-770b48d82b0a",
        "Beverages",
    ),
    (
        "Apple Pie",
        "Homestyle classic with cinnamon",
        320,
        "https://images.unsplash.com/photo-1535920527002-b35e96722eb9",
        "Dessert",
    ),
    (
        "Pizza Margherita",
        "Simple Italian classic with fresh basil",
        285,
        "https://images.unsplash.com/photo-1574071318508-1cdbab80d002",
        "Fast Food",
    ),
];

/// Pantry the random suggestion view draws from
pub const INDIAN_INGREDIENTS: &[&str] = &[
    "basmati rice",
    "chickpeas",
    "lentils",
    "turmeric",
    "cumin",
    "coriander",
    "garam masala",
    "ginger",
    "garlic",
    "onions",
    "tomatoes",
    "potatoes",
    "cauliflower",
    "spinach",
    "paneer",
    "yogurt",
    "coconut milk",
    "tamarind",
    "mustard seeds",
    "curry leaves",
    "fenugreek",
    "cardamom",
    "cloves",
    "cinnamon",
    "chili powder",
    "mint",
    "cilantro",
    "ghee",
    "coconut",
    "cashews",
    "almonds",
    "raisins",
    "mango",
    "lime",
];

/// How many pantry items one random suggestion run uses
pub const RANDOM_INGREDIENT_COUNT: usize = 5;

/// `count` distinct pantry items in random order
pub fn random_ingredients<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    INDIAN_INGREDIENTS
        .choose_multiple(rng, count)
        .map(|item| item.to_string())
        .collect()
}

/// Calorie threshold above which a feed entry counts as popular
const POPULAR_MIN_CALORIES: u32 = 200;

/// The sample recipes shown on the home view
pub fn sample_recipes() -> Vec<Recipe> {
    FEED.iter()
        .enumerate()
        .map(|(index, (title, description, calories, image, category))| {
            let mut recipe = Recipe::named(*title);
            recipe.id = (index + 1).to_string();
            recipe.description = description.to_string();
            recipe.calories = *calories;
            recipe.image_url = image.to_string();
            recipe.category = category.to_string();
            recipe
        })
        .collect()
}

/// Samples followed by `generated`, filtered to `category`
pub fn home_feed(generated: Vec<Recipe>, category: Category) -> Vec<Recipe> {
    sample_recipes()
        .into_iter()
        .chain(generated)
        .filter(|recipe| category.matches(recipe))
        .collect()
}

pub fn popular(recipes: &[Recipe]) -> Vec<Recipe> {
    recipes
        .iter()
        .filter(|r| r.calories > POPULAR_MIN_CALORIES)
        .cloned()
        .collect()
}
