//! Tests for the reload lifecycle and the application pass.
mod common;
use common::*;
use kaihen::error::{EngineError, ModifierError};
use kaihen::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_queries_fail_before_first_pass() {
    let engine = create_engine();

    assert!(!engine.is_ready());
    assert!(matches!(
        engine.get_by_id(&id("test:recipe1")),
        Err(EngineError::NotReady { .. })
    ));
    assert!(matches!(
        engine.recipes_by_result(&id("core:axe")),
        Err(EngineError::NotReady { .. })
    ));
    assert!(matches!(
        engine.recipes_by_kind(&id("core:crafting")),
        Err(EngineError::NotReady { .. })
    ));
}

#[test]
fn test_pass_runs_once_both_events_arrive_in_either_order() {
    // Dataset first.
    let mut engine = create_engine();
    engine.dataset_loaded(create_test_dataset());
    assert!(!engine.is_ready());
    engine.rulesets_loaded(Vec::new());
    assert!(engine.is_ready());

    // Ruleset first.
    let mut engine = create_engine();
    engine.rulesets_loaded(Vec::new());
    assert!(!engine.is_ready());
    engine.dataset_loaded(create_test_dataset());
    assert!(engine.is_ready());

    let summary = engine.last_pass_summary().expect("pass ran");
    assert_eq!(summary.recipes, 2);
    assert_eq!(summary.rule_applications, 0);
}

#[test]
fn test_duplicate_event_replaces_pending_half() {
    let mut engine = create_engine();

    let stale = RecipeCollection::from_recipes(vec![mock_recipe(
        "test:stale",
        "core:axe",
        vec![],
    )])
    .expect("valid dataset");

    engine.dataset_loaded(stale);
    engine.dataset_loaded(create_test_dataset());
    engine.rulesets_loaded(Vec::new());

    // The pass ran over the replacement dataset, not the stale one.
    assert!(engine.get_by_id(&id("test:stale")).expect("ready").is_none());
    assert!(engine.get_by_id(&id("test:recipe1")).expect("ready").is_some());
}

#[test]
fn test_rulesets_modify_matching_recipes() {
    let mut engine = create_engine();
    engine.register_rules(
        id("rules:strip_axe_inputs"),
        Filter::result_is(id("core:axe")),
        vec![Modifier::remove_ingredients(Selector::all())],
    );

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    assert!(recipe2.inputs().is_empty());

    // The non-matching recipe is untouched.
    let recipe1 = engine
        .get_by_id(&id("test:recipe1"))
        .expect("ready")
        .expect("recipe1 loaded");
    assert_eq!(recipe1.inputs().len(), 2);

    let summary = engine.last_pass_summary().expect("pass ran");
    assert_eq!(summary.rule_applications, 1);
}

#[test]
fn test_removal_is_deferred_and_consistent() {
    let mut engine = create_engine();

    // recipe1 sorts before recipe2, so recipe2's modification runs after
    // recipe1 was already marked: marking must not disturb the rest of the
    // pass.
    engine.register_rules(
        id("rules:drop_recipe1"),
        Filter::id_equals(id("test:recipe1")),
        vec![Modifier::remove_recipe()],
    );
    engine.register_rules(
        id("rules:strip_recipe2"),
        Filter::id_equals(id("test:recipe2")),
        vec![Modifier::remove_ingredients(Selector::all())],
    );

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    assert!(engine.get_by_id(&id("test:recipe1")).expect("ready").is_none());
    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 survives");
    assert!(recipe2.inputs().is_empty());

    // Both backing indices dropped the recipe.
    let of_kind = engine.recipes_by_kind(&id("core:crafting")).expect("ready");
    assert_eq!(of_kind.len(), 1);
    assert!(
        engine
            .recipes_by_result(&id("core:dandelion"))
            .expect("ready")
            .is_empty()
    );

    let summary = engine.last_pass_summary().expect("pass ran");
    assert_eq!(summary.removed, 1);
}

#[test]
fn test_mark_for_removal_api() {
    let mut engine = create_engine();
    engine.mark_for_removal(id("test:recipe2"));

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    assert!(engine.get_by_id(&id("test:recipe2")).expect("ready").is_none());
    assert!(engine.get_by_id(&id("test:recipe1")).expect("ready").is_some());
}

#[test]
fn test_failing_modifier_does_not_abort_the_pass() {
    let mut engine = create_engine();

    engine.register_rules(
        id("rules:explodes"),
        Filter::always(),
        vec![
            Modifier::new(|_| Err(ModifierError::Failed("boom".to_string()))),
            // A later modifier of the same rule set still runs.
            Modifier::add_ingredient(Ingredient::of(id("core:stick"))),
        ],
    );
    engine.register_rules(
        id("rules:still_runs"),
        Filter::result_is(id("core:axe")),
        vec![Modifier::set_result_count(3)],
    );

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    let recipe1 = engine
        .get_by_id(&id("test:recipe1"))
        .expect("ready")
        .expect("recipe1 loaded");
    assert_eq!(recipe1.inputs().len(), 3);

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    let produced = engine.resolve_result(recipe2, recipe2.default_result().clone(), None);
    assert_eq!(produced.count, 3);

    let summary = engine.last_pass_summary().expect("pass ran");
    assert_eq!(summary.rule_applications, 3);
}

#[test]
fn test_by_result_index_uses_post_modification_defaults() {
    let mut engine = create_engine();

    // Result transforms are production-time only: the index keeps keying
    // by the default result even when replace_result is registered.
    engine.register_rules(
        id("rules:axe_to_flower"),
        Filter::result_is(id("core:axe")),
        vec![Modifier::replace_result(ComponentStack::of(id("core:flower")))],
    );

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    let by_axe = engine.recipes_by_result(&id("core:axe")).expect("ready");
    assert_eq!(by_axe.len(), 1);
    assert_eq!(by_axe[0].id(), &id("test:recipe2"));
    assert!(
        engine
            .recipes_by_result(&id("core:flower"))
            .expect("ready")
            .is_empty()
    );

    // Unknown results yield an empty list, never an error.
    assert!(
        engine
            .recipes_by_result(&id("core:arrow"))
            .expect("ready")
            .is_empty()
    );
}

#[test]
fn test_result_transform_ordering_through_the_engine() {
    let mut engine = create_engine();
    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    engine.register_result_transform(
        id("test:recipe2"),
        Arc::new(|_, mut result, _| {
            result.count += 1;
            result
        }),
    );
    engine.register_result_transform(
        id("test:recipe2"),
        Arc::new(|_, mut result, _| {
            result.count *= 10;
            result
        }),
    );

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    let produced = engine.resolve_result(recipe2, recipe2.default_result().clone(), None);
    assert_eq!(produced.count, 20);
}

#[test]
fn test_observers_fire_exactly_once() {
    let mut engine = create_engine();

    let dataset_calls = Arc::new(AtomicUsize::new(0));
    let per_recipe_calls = Arc::new(AtomicUsize::new(0));
    let axe_calls = Arc::new(AtomicUsize::new(0));

    {
        let dataset_calls = dataset_calls.clone();
        engine.on_dataset_ready(move |collection| {
            assert_eq!(collection.len(), 2);
            dataset_calls.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let per_recipe_calls = per_recipe_calls.clone();
        engine.for_each_recipe(None, move |_| {
            per_recipe_calls.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let axe_calls = axe_calls.clone();
        engine.for_each_recipe(Some(Filter::result_is(id("core:axe"))), move |recipe| {
            assert_eq!(recipe.id(), &id("test:recipe2"));
            axe_calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    assert_eq!(dataset_calls.load(Ordering::SeqCst), 1);
    assert_eq!(per_recipe_calls.load(Ordering::SeqCst), 2);
    assert_eq!(axe_calls.load(Ordering::SeqCst), 1);

    // A second reload cycle does not re-fire queued observers.
    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    assert_eq!(dataset_calls.load(Ordering::SeqCst), 1);
    assert_eq!(per_recipe_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_second_reload_rebuilds_derived_state() {
    let mut engine = create_engine();

    // First cycle registers a production-time replacement via rules.
    engine.load_ruleset_documents([(
        id("rules:axe_to_flower"),
        serde_json::json!({
            "target_recipes": "core:axe",
            "modifiers": { "type": "replace_result", "new_result": "core:flower" },
        }),
    )]);
    engine.dataset_loaded(create_test_dataset());

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    let produced = engine.resolve_result(recipe2, recipe2.default_result().clone(), None);
    assert!(produced.is(&id("core:flower")));

    // Second cycle replaces the configuration rule sets wholesale; the
    // transform chain from the previous cycle is gone.
    engine.rulesets_loaded(Vec::new());
    engine.dataset_loaded(create_test_dataset());

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    let produced = engine.resolve_result(recipe2, recipe2.default_result().clone(), None);
    assert!(produced.is(&id("core:axe")));

    // API-registered rule sets would still apply; configuration ones are
    // replaced, so the summary shows no applications.
    let summary = engine.last_pass_summary().expect("pass ran");
    assert_eq!(summary.rule_applications, 0);
}

#[test]
fn test_api_rulesets_run_before_configuration_rulesets() {
    let mut engine = create_engine();

    // Both rule sets set the result count; transforms fold in registration
    // order, so the configuration rule set's value wins only if it runs
    // after the API rule set.
    engine.register_rules(
        id("rules:five"),
        Filter::result_is(id("core:axe")),
        vec![Modifier::set_result_count(5)],
    );
    engine.load_ruleset_documents([(
        id("rules:three"),
        serde_json::json!({
            "target_recipes": "core:axe",
            "modifiers": { "type": "set_result_count", "count": 3 },
        }),
    )]);
    engine.dataset_loaded(create_test_dataset());

    let recipe2 = engine
        .get_by_id(&id("test:recipe2"))
        .expect("ready")
        .expect("recipe2 loaded");
    let produced = engine.resolve_result(recipe2, recipe2.default_result().clone(), None);
    assert_eq!(produced.count, 3);
}
