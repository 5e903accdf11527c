//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! kaihen crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaihen::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let context = InMemoryContext::new();
//! let mut engine = Engine::new(RuleRegistry::with_defaults(), Arc::new(context));
//!
//! // Feed both reload signals; the application pass runs on the second.
//! engine.rulesets_loaded(Vec::new());
//! engine.dataset_loaded(RecipeCollection::from_recipes(Vec::new())?);
//!
//! assert!(engine.is_ready());
//! # Ok(())
//! # }
//! ```

// Core engine
pub use crate::engine::{Engine, PassSummary, ReloadEvent};

// Rule building blocks
pub use crate::rule::{Filter, Modifier, MutationHandle, RuleSet, Selector};

// Rule deserialization
pub use crate::registry::{ParseContext, RuleRegistry};

// Data model
pub use crate::model::{
    AssemblyContext, ComponentStack, Identifier, InMemoryContext, Ingredient, IngredientEntry,
    IntoDataset, Recipe, RegistryContext, TagId,
};

// Collections and result transformation
pub use crate::collection::{RecipeCollection, UpgradableList, UpgradableMap};
pub use crate::transform::{ResultTransform, TransformChain};

// Error types
pub use crate::error::{DatasetConversionError, EngineError, ModifierError, ParseError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
