use crate::model::{ComponentStack, Identifier, Recipe, RegistryContext, TagId};
use std::fmt;
use std::sync::Arc;

/// A boolean predicate selecting which recipes a rule set targets.
///
/// Filters are pure, cheaply cloneable and composable: [`Filter::and`]
/// short-circuits on the first `false` (an empty `and` is vacuously true),
/// [`Filter::or`] on the first `true` (an empty `or` is vacuously false),
/// and [`Filter::not`] inverts. There are some simple filters provided as
/// constructors below, but any closure over `(recipe, context)` works.
#[derive(Clone)]
pub struct Filter(Arc<dyn Fn(&Recipe, &dyn RegistryContext) -> bool + Send + Sync>);

impl Filter {
    pub fn new(f: impl Fn(&Recipe, &dyn RegistryContext) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// The main (and only) method of a filter: test one recipe.
    pub fn test(&self, recipe: &Recipe, ctx: &dyn RegistryContext) -> bool {
        (self.0)(recipe, ctx)
    }

    /// A filter that matches every recipe.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Matches recipes whose identifier lives in the given namespace.
    pub fn namespace_equals(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self::new(move |recipe, _| recipe.id().namespace() == namespace)
    }

    /// Matches the recipe with the given identifier.
    pub fn id_equals(id: Identifier) -> Self {
        Self::new(move |recipe, _| recipe.id() == &id)
    }

    /// Matches recipes whose default result is the given component.
    pub fn result_is(component: Identifier) -> Self {
        Self::new(move |recipe, _| recipe.default_result().is(&component))
    }

    /// Matches recipes whose default result is any of the given components.
    pub fn result_is_any(components: Vec<Identifier>) -> Self {
        Self::new(move |recipe, _| components.iter().any(|c| recipe.default_result().is(c)))
    }

    /// Matches recipes whose default result is a member of the given tag.
    pub fn result_in_tag(tag: TagId) -> Self {
        Self::new(move |recipe, ctx| recipe.default_result().is_in_tag(&tag, ctx))
    }

    /// Matches recipes whose default result satisfies an arbitrary
    /// predicate.
    pub fn result_matches(
        predicate: impl Fn(&ComponentStack) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |recipe, _| predicate(recipe.default_result()))
    }

    /// Matches recipes that accept the given component in any ingredient.
    pub fn accepts_component(component: Identifier) -> Self {
        Self::new(move |recipe, ctx| {
            recipe
                .inputs()
                .iter()
                .any(|ingredient| ingredient.accepts(&component, ctx))
        })
    }

    /// Matches recipes of the given kind.
    pub fn kind_is(kind: Identifier) -> Self {
        Self::new(move |recipe, _| recipe.kind() == &kind)
    }

    /// Concatenates the given filters with a logical and.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let filters: Vec<Filter> = filters.into_iter().collect();
        Self::new(move |recipe, ctx| filters.iter().all(|f| f.test(recipe, ctx)))
    }

    /// Concatenates the given filters with a logical or.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let filters: Vec<Filter> = filters.into_iter().collect();
        Self::new(move |recipe, ctx| filters.iter().any(|f| f.test(recipe, ctx)))
    }

    /// Inverts the given filter.
    pub fn not(filter: Filter) -> Self {
        Self::new(move |recipe, ctx| !filter.test(recipe, ctx))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}
