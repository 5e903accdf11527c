//! Tests for rule document deserialization: shorthand grammar, kind
//! tables, extensibility and per-document failure isolation.
mod common;
use common::*;
use kaihen::error::ParseError;
use kaihen::prelude::*;
use kaihen::registry::parse_ruleset_documents;
use serde_json::json;

fn parse_filter(doc: serde_json::Value) -> Filter {
    let registry = RuleRegistry::with_defaults();
    registry
        .parse_filter(&doc, &create_test_context())
        .expect("filter should parse")
}

fn parse_selector(doc: serde_json::Value) -> Selector {
    let registry = RuleRegistry::with_defaults();
    registry
        .parse_selector(&doc, &create_test_context())
        .expect("selector should parse")
}

#[test]
fn test_filter_shorthand_strings() {
    let ctx = create_test_context();
    let recipe1 = mock_recipe("test:recipe1", "core:dandelion", vec![apple_ingredient()]);
    let recipe2 = mock_recipe("test:recipe2", "core:axe", vec![ice_ingredient()]);

    // "*" matches everything.
    let all = parse_filter(json!("*"));
    assert!(all.test(&recipe1, &ctx) && all.test(&recipe2, &ctx));

    // A plain word is a namespace filter.
    let namespace = parse_filter(json!("test"));
    assert!(namespace.test(&recipe1, &ctx));
    assert!(!parse_filter(json!("core")).test(&recipe1, &ctx));

    // A known component filters by result.
    let by_result = parse_filter(json!("core:axe"));
    assert!(!by_result.test(&recipe1, &ctx));
    assert!(by_result.test(&recipe2, &ctx));

    // An unknown component falls back to filtering by recipe identifier.
    let by_id = parse_filter(json!("test:recipe1"));
    assert!(by_id.test(&recipe1, &ctx));
    assert!(!by_id.test(&recipe2, &ctx));

    // "!" negates the rest of the shorthand.
    let negated = parse_filter(json!("!core:axe"));
    assert!(negated.test(&recipe1, &ctx));
    assert!(!negated.test(&recipe2, &ctx));
}

#[test]
fn test_filter_objects() {
    let ctx = create_test_context();
    let recipe1 = mock_recipe("test:recipe1", "core:dandelion", vec![apple_ingredient()]);
    let recipe2 = mock_recipe("test:recipe2", "core:axe", vec![ice_ingredient()]);

    let by_items = parse_filter(json!({
        "type": "result_item_is",
        "items": ["core:axe", "core:flower"],
    }));
    assert!(!by_items.test(&recipe1, &ctx));
    assert!(by_items.test(&recipe2, &ctx));

    let by_tag = parse_filter(json!({ "type": "result_item_is", "item": "#core:apples" }));
    let apple_recipe = mock_recipe("test:apple", "core:golden_apple", vec![]);
    assert!(by_tag.test(&apple_recipe, &ctx));
    assert!(!by_tag.test(&recipe2, &ctx));

    let accepting = parse_filter(json!({ "type": "accepting_ingredient", "item": "core:ice" }));
    assert!(!accepting.test(&recipe1, &ctx));
    assert!(accepting.test(&recipe2, &ctx));

    let composed = parse_filter(json!({
        "type": "and",
        "filters": [
            "test",
            { "type": "not", "filter": { "type": "result_item_is", "item": "core:axe" } },
        ],
    }));
    assert!(composed.test(&recipe1, &ctx));
    assert!(!composed.test(&recipe2, &ctx));

    let either = parse_filter(json!({
        "type": "or",
        "filters": [{ "type": "id_equals", "id": "test:recipe2" }, "core:dandelion"],
    }));
    assert!(either.test(&recipe1, &ctx));
    assert!(either.test(&recipe2, &ctx));

    let by_kind = parse_filter(json!({ "type": "is_recipe_type", "recipe_type": "core:crafting" }));
    assert!(by_kind.test(&recipe1, &ctx));
    let smelting = mock_recipe_of_kind("test:smelted", "core:smelting", "core:axe", vec![]);
    assert!(!by_kind.test(&smelting, &ctx));
}

#[test]
fn test_result_item_predicate_filter() {
    let ctx = create_test_context();
    let single = mock_recipe("test:single", "core:axe", vec![]);
    let stacked = Recipe::new(
        id("test:stacked"),
        id("core:crafting"),
        vec![],
        ComponentStack::with_count(id("core:axe"), 4),
    );

    let at_least_two = parse_filter(json!({
        "type": "result_item_predicate",
        "predicate": { "items": "core:axe", "min_count": 2 },
    }));
    assert!(!at_least_two.test(&single, &ctx));
    assert!(at_least_two.test(&stacked, &ctx));

    let at_most_two = parse_filter(json!({
        "type": "result_item_predicate",
        "predicate": { "max_count": 2 },
    }));
    assert!(at_most_two.test(&single, &ctx));
    assert!(!at_most_two.test(&stacked, &ctx));
}

#[test]
fn test_unknown_kinds_are_named_errors() {
    let registry = RuleRegistry::with_defaults();
    let ctx = create_test_context();

    let result = registry.parse_filter(&json!({ "type": "frobnicate" }), &ctx);
    assert!(matches!(result, Err(ParseError::UnknownFilterKind(kind)) if kind == "frobnicate"));

    let result = registry.parse_selector(&json!({ "type": "frobnicate" }), &ctx);
    assert!(matches!(result, Err(ParseError::UnknownSelectorKind(_))));

    let result = registry.parse_modifier(&json!({ "type": "frobnicate" }), &ctx);
    assert!(matches!(result, Err(ParseError::UnknownModifierKind(_))));

    // A missing type tag is invalid, not silently ignored.
    assert!(registry.parse_filter(&json!({}), &ctx).is_err());

    // Unknown components are rejected during parsing.
    let result = registry.parse_selector(&json!("core:nonexistent"), &ctx);
    assert!(matches!(result, Err(ParseError::UnknownComponent(_))));
}

#[test]
fn test_selector_documents() {
    let ctx = create_test_context();
    let recipe = mock_recipe(
        "test:recipe",
        "core:dandelion",
        vec![
            apple_ingredient(),
            Ingredient::of(id("core:apple")),
            ice_ingredient(),
        ],
    );

    // A bare number selects by position.
    assert_eq!(parse_selector(json!(2)).select(&recipe, &ctx), vec![2]);

    // A component string selects accepting matchers; "!" only exact ones.
    assert_eq!(
        parse_selector(json!("core:apple")).select(&recipe, &ctx),
        vec![0, 1]
    );
    assert_eq!(
        parse_selector(json!("core:apple!")).select(&recipe, &ctx),
        vec![1]
    );

    // "#tag" selects matchers covering the tag.
    assert_eq!(
        parse_selector(json!("#core:apples")).select(&recipe, &ctx),
        vec![0]
    );

    // Arrays concatenate element-wise.
    assert_eq!(
        parse_selector(json!(["core:ice", 0])).select(&recipe, &ctx),
        vec![2, 0]
    );

    // Object kinds.
    assert_eq!(
        parse_selector(json!({ "type": "all" })).select(&recipe, &ctx),
        vec![0, 1, 2]
    );
    assert_eq!(
        parse_selector(json!({ "type": "from_ordinals", "ordinals": [1, 2] }))
            .select(&recipe, &ctx),
        vec![1, 2]
    );
    assert_eq!(
        parse_selector(json!({ "type": "from_ordinals", "ordinal": 1 })).select(&recipe, &ctx),
        vec![1]
    );
    assert_eq!(
        parse_selector(json!({ "type": "match_tag", "tag": "core:apples" }))
            .select(&recipe, &ctx),
        vec![0]
    );
}

#[test]
fn test_ruleset_document_parsing() {
    let engine_ctx = create_test_context();
    let registry = RuleRegistry::with_defaults();

    let doc = json!({
        "target_recipes": { "type": "result_item_is", "item": "core:axe" },
        "modifiers": [
            { "type": "remove_ingredient", "ingredients": { "type": "all" } },
            { "type": "set_result_count", "count": 2 },
        ],
    });

    let ruleset = kaihen::registry::parse_ruleset_document(
        &registry,
        &engine_ctx,
        id("rules:strip_axes"),
        &doc,
    )
    .expect("document should parse");

    assert_eq!(ruleset.id(), &id("rules:strip_axes"));
    assert_eq!(ruleset.modifiers().len(), 2);

    // A single modifier object works without the array wrapper.
    let doc = json!({
        "target_recipes": "*",
        "modifiers": { "type": "remove_recipe" },
    });
    let ruleset =
        kaihen::registry::parse_ruleset_document(&registry, &engine_ctx, id("rules:purge"), &doc)
            .expect("document should parse");
    assert_eq!(ruleset.modifiers().len(), 1);
}

#[test]
fn test_sibling_documents_survive_a_failure() {
    let registry = RuleRegistry::with_defaults();
    let ctx = create_test_context();

    let documents = vec![
        (
            id("rules:good_one"),
            json!({
                "target_recipes": "*",
                "modifiers": { "type": "set_result_count", "count": 2 },
            }),
        ),
        (
            id("rules:broken"),
            json!({
                "target_recipes": { "type": "no_such_filter" },
                "modifiers": { "type": "remove_recipe" },
            }),
        ),
        (
            id("rules:good_two"),
            json!({
                "target_recipes": "core:axe",
                "modifiers": { "type": "remove_recipe" },
            }),
        ),
    ];

    let (rulesets, failures) = parse_ruleset_documents(&registry, &ctx, documents);

    assert_eq!(rulesets.len(), 2);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, id("rules:broken"));
    assert!(matches!(failures[0].1, ParseError::UnknownFilterKind(_)));
}

#[test]
fn test_registering_a_custom_kind() {
    let mut registry = RuleRegistry::with_defaults();
    let ctx = create_test_context();

    // A plugin can add new kinds next to the built-in ones.
    registry.register_filter_kind("has_no_inputs", |_, _| {
        Ok(Filter::new(|recipe, _| recipe.inputs().is_empty()))
    });

    let filter = registry
        .parse_filter(&json!({ "type": "has_no_inputs" }), &ctx)
        .expect("custom kind should parse");

    let empty = mock_recipe("test:empty", "core:axe", vec![]);
    let full = mock_recipe("test:full", "core:axe", vec![ice_ingredient()]);
    assert!(filter.test(&empty, &ctx));
    assert!(!filter.test(&full, &ctx));
}
