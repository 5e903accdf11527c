use crate::model::{Identifier, Recipe, RegistryContext, TagId};
use std::fmt;
use std::sync::Arc;

/// Selects ingredient positions of a recipe based on certain criteria.
///
/// Selectors are pure and return positions into the recipe's input list, in
/// original order. Positions rather than matcher values: two structurally
/// equal ingredients in different slots are distinct targets, and the
/// positions stay meaningful for the modifier that consumes them.
/// Duplicates are permitted; callers de-duplicate if they need to.
#[derive(Clone)]
pub struct Selector(Arc<dyn Fn(&Recipe, &dyn RegistryContext) -> Vec<usize> + Send + Sync>);

impl Selector {
    pub fn new(
        f: impl Fn(&Recipe, &dyn RegistryContext) -> Vec<usize> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    pub fn select(&self, recipe: &Recipe, ctx: &dyn RegistryContext) -> Vec<usize> {
        (self.0)(recipe, ctx)
    }

    /// Selects every ingredient of the recipe.
    pub fn all() -> Self {
        Self::new(|recipe, _| (0..recipe.inputs().len()).collect())
    }

    /// Selects every ingredient that accepts the given component, including
    /// tag matchers containing it.
    ///
    /// See [`Selector::matching_component`] for the exact-match variant.
    pub fn accepting_component(component: Identifier) -> Self {
        Self::new(move |recipe, ctx| {
            positions(recipe, |ingredient| ingredient.accepts(&component, ctx))
        })
    }

    /// Selects every ingredient that matches exactly the given component
    /// (not tag matchers containing it).
    pub fn matching_component(component: Identifier) -> Self {
        Self::new(move |recipe, _| positions(recipe, |ingredient| ingredient.is_exact(&component)))
    }

    /// Selects every ingredient whose matcher-set covers the given tag.
    pub fn matching_tag(tag: TagId) -> Self {
        Self::new(move |recipe, ctx| {
            positions(recipe, |ingredient| ingredient.matches_tag(&tag, ctx))
        })
    }

    /// Selects ingredients by position. Out-of-range positions are dropped.
    pub fn at_positions(requested: Vec<usize>) -> Self {
        Self::new(move |recipe, _| {
            let len = recipe.inputs().len();
            requested.iter().copied().filter(|&p| p < len).collect()
        })
    }

    /// Concatenates the results of the given selectors, preserving selector
    /// order and then inner order.
    pub fn concat(selectors: impl IntoIterator<Item = Selector>) -> Self {
        let selectors: Vec<Selector> = selectors.into_iter().collect();
        Self::new(move |recipe, ctx| {
            selectors
                .iter()
                .flat_map(|s| s.select(recipe, ctx))
                .collect()
        })
    }
}

fn positions(recipe: &Recipe, mut predicate: impl FnMut(&crate::model::Ingredient) -> bool) -> Vec<usize> {
    recipe
        .inputs()
        .iter()
        .enumerate()
        .filter_map(|(position, ingredient)| predicate(ingredient).then_some(position))
        .collect()
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector(..)")
    }
}
