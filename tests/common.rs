//! Common test utilities for building recipes, contexts and engines.
use kaihen::prelude::*;
use std::sync::Arc;

/// Parses a `namespace:path` identifier, panicking on malformed input.
pub fn id(s: &str) -> Identifier {
    Identifier::parse(s).expect("valid identifier")
}

#[allow(dead_code)]
pub fn tag(s: &str) -> TagId {
    TagId::parse(s).expect("valid tag")
}

/// Creates a recipe with the default test kind.
#[allow(dead_code)]
pub fn mock_recipe(recipe_id: &str, result: &str, ingredients: Vec<Ingredient>) -> Recipe {
    Recipe::new(
        id(recipe_id),
        id("core:crafting"),
        ingredients,
        ComponentStack::of(id(result)),
    )
}

/// Creates a recipe of a specific kind.
#[allow(dead_code)]
pub fn mock_recipe_of_kind(
    recipe_id: &str,
    kind: &str,
    result: &str,
    ingredients: Vec<Ingredient>,
) -> Recipe {
    Recipe::new(
        id(recipe_id),
        id(kind),
        ingredients,
        ComponentStack::of(id(result)),
    )
}

/// A component/tag universe shared by most tests:
/// `#core:apples` covers the three apple variants, `#core:ices` both ices.
#[allow(dead_code)]
pub fn create_test_context() -> InMemoryContext {
    let mut context = InMemoryContext::new();
    for name in ["axe", "flower", "dandelion", "arrow", "stick"] {
        context.add_component(id(&format!("core:{name}")));
    }
    context.add_component(id("modpack_x:gizmo_core"));
    context.add_tag(
        tag("core:apples"),
        vec![
            id("core:apple"),
            id("core:golden_apple"),
            id("core:enchanted_golden_apple"),
        ],
    );
    context.add_tag(tag("core:ices"), vec![id("core:ice"), id("core:packed_ice")]);
    context
}

/// An engine over [`create_test_context`] with the default rule kinds.
#[allow(dead_code)]
pub fn create_engine() -> Engine {
    Engine::new(RuleRegistry::with_defaults(), Arc::new(create_test_context()))
}

/// An ingredient accepting the three apple variants.
#[allow(dead_code)]
pub fn apple_ingredient() -> Ingredient {
    Ingredient::of_components([
        id("core:apple"),
        id("core:golden_apple"),
        id("core:enchanted_golden_apple"),
    ])
}

/// An ingredient accepting both ice variants.
#[allow(dead_code)]
pub fn ice_ingredient() -> Ingredient {
    Ingredient::of_components([id("core:ice"), id("core:packed_ice")])
}

/// The two-recipe dataset used by most end-to-end tests:
/// `test:recipe1` (apples x2 -> dandelion) and `test:recipe2` (ice -> axe).
#[allow(dead_code)]
pub fn create_test_dataset() -> RecipeCollection {
    RecipeCollection::from_recipes(vec![
        mock_recipe(
            "test:recipe1",
            "core:dandelion",
            vec![apple_ingredient(), apple_ingredient()],
        ),
        mock_recipe("test:recipe2", "core:axe", vec![ice_ingredient()]),
    ])
    .expect("valid dataset")
}
