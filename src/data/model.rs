use crate::collection::RecipeCollection;
use crate::error::DatasetConversionError;
use crate::model::{
    ComponentStack, Identifier, InMemoryContext, Ingredient, IngredientEntry, IntoDataset, Recipe,
    TagId,
};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// One recipe record, matching the expected JSON dataset format.
#[derive(Serialize, Deserialize, Debug)]
pub struct RecipeDocument {
    pub id: Identifier,
    #[serde(default = "default_recipe_kind")]
    pub kind: Identifier,
    pub ingredients: Vec<IngredientDocument>,
    pub result: ResultDocument,
}

fn default_recipe_kind() -> Identifier {
    Identifier::new("core", "crafting")
}

/// A produced result: a bare component name, or an object with an explicit
/// count.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum ResultDocument {
    Name(Identifier),
    Stack {
        item: Identifier,
        #[serde(default = "default_result_count")]
        count: u32,
    },
}

fn default_result_count() -> u32 {
    1
}

impl ResultDocument {
    pub fn into_stack(self) -> ComponentStack {
        match self {
            ResultDocument::Name(component) => ComponentStack::of(component),
            ResultDocument::Stack { item, count } => ComponentStack::with_count(item, count),
        }
    }
}

/// One input slot: a single matcher string or a list of alternatives.
/// Strings starting with `#` reference a tag.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum IngredientDocument {
    One(String),
    Many(Vec<String>),
}

impl RecipeDocument {
    pub fn into_recipe(self) -> Result<Recipe, DatasetConversionError> {
        let inputs = self
            .ingredients
            .into_iter()
            .map(IngredientDocument::into_ingredient)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Recipe::new(
            self.id,
            self.kind,
            inputs,
            self.result.into_stack(),
        ))
    }
}

impl IngredientDocument {
    pub fn into_ingredient(self) -> Result<Ingredient, DatasetConversionError> {
        let raw = match self {
            IngredientDocument::One(s) => vec![s],
            IngredientDocument::Many(list) => list,
        };
        if raw.is_empty() {
            return Err(DatasetConversionError::ValidationError(
                "ingredient must have at least one entry".to_string(),
            ));
        }

        let entries = raw
            .into_iter()
            .map(|s| parse_entry(&s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ingredient::from_entries(entries))
    }
}

fn parse_entry(s: &str) -> Result<IngredientEntry, DatasetConversionError> {
    let entry = match s.strip_prefix('#') {
        Some(tag) => IngredientEntry::Tag(
            TagId::parse(tag).map_err(|e| DatasetConversionError::ValidationError(e.to_string()))?,
        ),
        None => IngredientEntry::Component(
            Identifier::parse(s)
                .map_err(|e| DatasetConversionError::ValidationError(e.to_string()))?,
        ),
    };
    Ok(entry)
}

impl IntoDataset for Vec<RecipeDocument> {
    fn into_dataset(self) -> Result<RecipeCollection, DatasetConversionError> {
        let recipes = self
            .into_iter()
            .map(RecipeDocument::into_recipe)
            .collect::<Result<Vec<_>, _>>()?;
        RecipeCollection::from_recipes(recipes)
    }
}

/// Loads a recipe dataset (a JSON array of [`RecipeDocument`]s) from a
/// file.
pub fn dataset_from_file(path: &str) -> Result<RecipeCollection, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let documents: Vec<RecipeDocument> = serde_json::from_str(&content)?;
    Ok(documents.into_dataset()?)
}

/// The component/tag universe, matching the expected JSON context format.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ContextDocument {
    #[serde(default)]
    pub components: Vec<Identifier>,
    /// Tag name (without the leading `#`) to member components.
    #[serde(default)]
    pub tags: AHashMap<Identifier, Vec<Identifier>>,
}

impl ContextDocument {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_context(self) -> InMemoryContext {
        let mut context = InMemoryContext::new();
        for component in self.components {
            context.add_component(component);
        }
        for (tag, members) in self.tags {
            context.add_tag(TagId(tag), members);
        }
        context
    }
}

/// Registers every component a dataset mentions (results and concrete
/// ingredient entries) into the given context, so datasets don't have to
/// list their own components twice.
pub fn register_dataset_components(context: &mut InMemoryContext, collection: &RecipeCollection) {
    for recipe in collection.iter() {
        context.add_component(recipe.default_result().component.clone());
        for ingredient in recipe.inputs() {
            for entry in ingredient.entries() {
                if let IngredientEntry::Component(component) = entry {
                    context.add_component(component.clone());
                }
            }
        }
    }
}
