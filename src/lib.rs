//! # Kaihen - Data-Driven Recipe Modification Engine
//!
//! **Kaihen** rewrites an externally-supplied collection of recipe records
//! according to declarative rules. A rule is composed from three
//! independent building blocks: a [`Filter`](rule::Filter) selecting which
//! recipes it targets, [`Selector`](rule::Selector)s picking which inputs
//! of a matched recipe are affected, and [`Modifier`](rule::Modifier)s
//! mutating the inputs or intercepting the produced result. Rules come
//! from configuration documents (JSON trees, reloaded at runtime) or from
//! programmatic registration.
//!
//! ## Core Workflow
//!
//! The engine is designed to be host-agnostic. It operates on a canonical
//! model of a recipe dataset. The primary workflow is:
//!
//! 1.  **Describe Your Universe**: Provide a [`RegistryContext`](model::RegistryContext)
//!     so shorthand rules can resolve components and tags: your own
//!     implementation, or [`InMemoryContext`](model::InMemoryContext).
//! 2.  **Convert to Kaihen's Model**: Translate your recipe format into
//!     [`Recipe`](model::Recipe) records (the [`IntoDataset`](model::IntoDataset)
//!     trait is the extension point; the [`data`] module ships a plain JSON
//!     document model).
//! 3.  **Load Rules**: Parse rule documents through the extensible
//!     [`RuleRegistry`](registry::RuleRegistry), or register rule sets in
//!     code.
//! 4.  **Reload and Query**: Feed the dataset and the rule sets into the
//!     [`Engine`](engine::Engine) as reload events. Either order works;
//!     the application pass runs exactly once when both have arrived.
//!     Afterwards the engine answers lookups by id, by kind and by result,
//!     and resolves production-time result transforms.
//!
//! ## Quick Start
//!
//! ```rust
//! use kaihen::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     // 1. Describe the component universe.
//!     let mut context = InMemoryContext::new();
//!     for name in ["apple", "axe", "flower", "ice"] {
//!         context.add_component(Identifier::new("core", name));
//!     }
//!
//!     // 2. Build an engine with the default rule kinds.
//!     let mut engine = Engine::new(RuleRegistry::with_defaults(), Arc::new(context));
//!
//!     // 3a. Register a rule set programmatically ...
//!     engine.register_rules(
//!         Identifier::new("example", "strip_axe_inputs"),
//!         Filter::result_is(Identifier::new("core", "axe")),
//!         vec![Modifier::remove_ingredients(Selector::all())],
//!     );
//!
//!     // 3b. ... or load rule sets from configuration documents.
//!     let doc = serde_json::json!({
//!         "target_recipes": "core:flower",
//!         "modifiers": { "type": "set_result_count", "count": 2 },
//!     });
//!     let failures =
//!         engine.load_ruleset_documents([(Identifier::new("example", "doubled"), doc)]);
//!     assert!(failures.is_empty());
//!
//!     // 4. Hand over the dataset. Both reload signals are now present,
//!     //    so the application pass runs and the engine becomes queryable.
//!     let recipes = vec![
//!         Recipe::new(
//!             Identifier::new("core", "axe_from_ice"),
//!             Identifier::new("core", "crafting"),
//!             vec![Ingredient::of(Identifier::new("core", "ice"))],
//!             ComponentStack::of(Identifier::new("core", "axe")),
//!         ),
//!         Recipe::new(
//!             Identifier::new("core", "flower_from_apples"),
//!             Identifier::new("core", "crafting"),
//!             vec![
//!                 Ingredient::of(Identifier::new("core", "apple")),
//!                 Ingredient::of(Identifier::new("core", "apple")),
//!             ],
//!             ComponentStack::of(Identifier::new("core", "flower")),
//!         ),
//!     ];
//!     engine.dataset_loaded(RecipeCollection::from_recipes(recipes)?);
//!
//!     // The axe recipe lost its inputs eagerly ...
//!     let axe = engine
//!         .get_by_id(&Identifier::new("core", "axe_from_ice"))?
//!         .unwrap();
//!     assert!(axe.inputs().is_empty());
//!
//!     // ... while the flower recipe's result is doubled at production time.
//!     let flower = engine
//!         .get_by_id(&Identifier::new("core", "flower_from_apples"))?
//!         .unwrap();
//!     let produced = engine.resolve_result(flower, flower.default_result().clone(), None);
//!     assert_eq!(produced.count, 2);
//!
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod data;
pub mod engine;
pub mod error;
pub mod model;
pub mod prelude;
pub mod registry;
pub mod rule;
pub mod transform;
