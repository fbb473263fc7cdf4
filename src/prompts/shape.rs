use serde_json::{json, Map, Value};

/// Declarative description of the JSON a generation call must return.
///
/// The schema is a JSON-Schema subset (object, array, string, number, integer,
/// boolean, enum) that every supported provider understands.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: &'static str,
    schema: Value,
}

impl Shape {
    pub fn new(name: &'static str, schema: Value) -> Self {
        Shape { name, schema }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Pretty-printed schema, for providers that only take the shape as prompt text
    pub fn describe(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| "{}".to_string())
    }

    /// Gemini's responseSchema spells types in upper case ("OBJECT", "STRING", ...)
    pub fn to_gemini_schema(&self) -> Value {
        uppercase_types(&self.schema)
    }

    pub fn ingredient_list() -> Self {
        Shape::new(
            "ingredient_list",
            object(&[("ingredients", array(string("An ingredient visible in the photo.")))]),
        )
    }

    pub fn recipe_suggestions() -> Self {
        let recipe = object(&[
            ("name", string("The name of the recipe.")),
            ("description", string("A detailed description of the recipe.")),
            ("ingredients", array(string("An ingredient required for the recipe."))),
            ("instructions", array(string("One step of the instructions, in order."))),
            ("prepTime", string("The preparation time for the recipe.")),
            ("cookTime", string("The cooking time for the recipe.")),
            ("servings", number("The number of servings the recipe makes.")),
            (
                "difficulty",
                json!({
                    "type": "string",
                    "enum": ["Easy", "Medium", "Hard"],
                    "description": "The difficulty level of the recipe."
                }),
            ),
            ("calories", number("The approximate calories per serving.")),
            ("tips", array(string("A cooking tip for the recipe."))),
            (
                "canMake",
                json!({
                    "type": "boolean",
                    "description": "Whether the recipe can be made based on available ingredients."
                }),
            ),
        ]);

        Shape::new("recipe_suggestions", object(&[("recipes", array(recipe))]))
    }

    pub fn detailed_recipe() -> Self {
        Shape::new(
            "detailed_recipe",
            object(&[
                ("instructions", array(string("A detailed step of the instructions."))),
                (
                    "description",
                    string(
                        "A detailed description of the recipe, including its origin and \
                         cultural significance.",
                    ),
                ),
                ("tipsAndTricks", array(string("A tip for perfecting the recipe."))),
            ]),
        )
    }

    pub fn recipes_from_text() -> Self {
        let recipe = object(&[
            ("name", string("The name of the recipe.")),
            ("ingredients", array(string("An ingredient required for the recipe."))),
            ("instructions", string("The instructions for the recipe.")),
        ]);

        Shape::new("recipes_from_text", object(&[("recipes", array(recipe))]))
    }

    pub fn video_suggestions() -> Self {
        Shape::new(
            "video_suggestions",
            object(&[(
                "youtubeVideoSuggestions",
                array(string("A YouTube video ID relevant to the recipe description.")),
            )]),
        )
    }
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn array(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Object with every listed property required
fn object(properties: &[(&str, Value)]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert(name.to_string(), schema.clone());
    }
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

fn uppercase_types(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let converted = match (key.as_str(), v) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        // Property names are user data, not schema keywords
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .iter()
                                .map(|(name, schema)| (name.clone(), uppercase_types(schema)))
                                .collect(),
                        ),
                        _ => uppercase_types(v),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(uppercase_types).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_suggestions_declares_difficulty_enum() {
        let shape = Shape::recipe_suggestions();
        let recipe = &shape.schema()["properties"]["recipes"]["items"];
        let difficulty = &recipe["properties"]["difficulty"];
        assert_eq!(difficulty["enum"], json!(["Easy", "Medium", "Hard"]));
    }

    #[test]
    fn test_required_lists_every_property() {
        let shape = Shape::detailed_recipe();
        let required = shape.schema()["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert!(required.contains(&json!("tipsAndTricks")));
    }

    #[test]
    fn test_gemini_schema_uppercases_types_only() {
        let gemini = Shape::ingredient_list().to_gemini_schema();
        assert_eq!(gemini["type"], "OBJECT");
        assert_eq!(gemini["properties"]["ingredients"]["type"], "ARRAY");
        assert_eq!(gemini["properties"]["ingredients"]["items"]["type"], "STRING");
        assert_eq!(gemini["required"], json!(["ingredients"]));
    }

    #[test]
    fn test_describe_is_json() {
        let text = Shape::video_suggestions().describe();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["properties"]["youtubeVideoSuggestions"]["type"], "array");
    }
}
