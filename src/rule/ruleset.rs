use super::filter::Filter;
use super::modifier::Modifier;
use crate::model::Identifier;

/// A named, filtered, ordered list of modifiers applied together.
///
/// Rule sets are immutable once constructed. They come from two places:
/// programmatic registration (kept for the engine's lifetime) and
/// configuration documents (replaced wholesale on every reload).
#[derive(Clone, Debug)]
pub struct RuleSet {
    id: Identifier,
    filter: Filter,
    modifiers: Vec<Modifier>,
}

impl RuleSet {
    pub fn new(id: Identifier, filter: Filter, modifiers: Vec<Modifier>) -> Self {
        Self {
            id,
            filter,
            modifiers,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}
