//! Lazily-evaluated result transformation.
//!
//! A recipe's result-producing function is fixed in the host's object model
//! and cannot be replaced in place. Instead of eagerly mutating a cached
//! result, modifiers register transforms here and the host resolves them at
//! production time, folding every registered transform over the default
//! result in registration order.

use crate::model::{AssemblyContext, ComponentStack, Identifier, Recipe};
use ahash::AHashMap;
use std::sync::Arc;

/// A deferred, composable function altering a recipe's produced result at
/// call time.
///
/// Receives the recipe, the result produced so far, and the assembly
/// context, which is `None` when the result is requested for
/// preview/display only.
/// A transform that hands out cached or shared data must return a clone of
/// it; the chain does not copy on its behalf.
pub type ResultTransform =
    Arc<dyn Fn(&Recipe, ComponentStack, Option<&AssemblyContext>) -> ComponentStack + Send + Sync>;

/// An ordered, recipe-keyed multimap of result transforms.
///
/// Rebuilt from scratch every reload cycle.
#[derive(Clone, Default)]
pub struct TransformChain {
    entries: AHashMap<Identifier, Vec<ResultTransform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform for the given recipe. Earlier registrations for
    /// the same recipe are kept and run first.
    pub fn register(&mut self, recipe: Identifier, transform: ResultTransform) {
        self.entries.entry(recipe).or_default().push(transform);
    }

    /// Folds every transform registered for `recipe` over `current`, in
    /// registration order. With no registered transforms the default is
    /// returned unchanged.
    pub fn resolve(
        &self,
        recipe: &Recipe,
        current: ComponentStack,
        assembly: Option<&AssemblyContext>,
    ) -> ComponentStack {
        match self.entries.get(recipe.id()) {
            Some(transforms) => transforms
                .iter()
                .fold(current, |result, t| t(recipe, result, assembly)),
            None => current,
        }
    }

    /// Number of transforms registered for the given recipe.
    pub fn registered_for(&self, recipe: &Identifier) -> usize {
        self.entries.get(recipe).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
