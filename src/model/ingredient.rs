use super::context::RegistryContext;
use super::identifier::{Identifier, TagId};
use std::fmt;

/// One alternative a single input slot accepts: either a concrete component
/// or every member of a tag.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum IngredientEntry {
    Component(Identifier),
    Tag(TagId),
}

impl IngredientEntry {
    pub fn accepts(&self, component: &Identifier, ctx: &dyn RegistryContext) -> bool {
        match self {
            IngredientEntry::Component(id) => id == component,
            IngredientEntry::Tag(tag) => ctx.is_in_tag(component, tag),
        }
    }
}

/// A matcher over components, filling one input slot of a recipe.
///
/// An ingredient accepts a component when any of its entries does. Matching
/// identity is positional: selectors hand back positions into a recipe's
/// input list, so two structurally equal ingredients in different slots are
/// still distinct targets.
#[derive(Clone, PartialEq, Eq)]
pub struct Ingredient {
    entries: Vec<IngredientEntry>,
}

impl Ingredient {
    /// An ingredient matching exactly one component.
    pub fn of(component: Identifier) -> Self {
        Self {
            entries: vec![IngredientEntry::Component(component)],
        }
    }

    /// An ingredient matching any of the given components.
    pub fn of_components(components: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            entries: components
                .into_iter()
                .map(IngredientEntry::Component)
                .collect(),
        }
    }

    /// An ingredient matching every member of a tag.
    pub fn of_tag(tag: TagId) -> Self {
        Self {
            entries: vec![IngredientEntry::Tag(tag)],
        }
    }

    pub fn from_entries(entries: Vec<IngredientEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[IngredientEntry] {
        &self.entries
    }

    /// Whether this ingredient accepts the given component through any of
    /// its entries (tag entries resolve through the context).
    pub fn accepts(&self, component: &Identifier, ctx: &dyn RegistryContext) -> bool {
        self.entries.iter().any(|e| e.accepts(component, ctx))
    }

    /// Whether this ingredient matches exactly the given component and
    /// nothing else.
    pub fn is_exact(&self, component: &Identifier) -> bool {
        matches!(self.entries.as_slice(),
            [IngredientEntry::Component(id)] if id == component)
    }

    /// Whether this ingredient's matcher-set covers every component
    /// reachable through the given tag.
    pub fn matches_tag(&self, tag: &TagId, ctx: &dyn RegistryContext) -> bool {
        let members = ctx.tag_members(tag);
        !members.is_empty() && members.iter().all(|m| self.accepts(m, ctx))
    }

    /// Appends every entry of `alternative` to this matcher.
    pub fn add_alternative(&mut self, alternative: &Ingredient) {
        self.entries.extend(alternative.entries.iter().cloned());
    }

    pub fn add_alternative_entry(&mut self, entry: IngredientEntry) {
        self.entries.push(entry);
    }
}

impl fmt::Debug for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for entry in &self.entries {
            match entry {
                IngredientEntry::Component(id) => list.entry(&format_args!("{}", id)),
                IngredientEntry::Tag(tag) => list.entry(&format_args!("{}", tag)),
            };
        }
        list.finish()
    }
}
