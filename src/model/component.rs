use super::identifier::{Identifier, TagId};
use super::context::RegistryContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete stack of one component kind, as produced by a recipe.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStack {
    pub component: Identifier,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl ComponentStack {
    pub fn of(component: Identifier) -> Self {
        Self {
            component,
            count: 1,
        }
    }

    pub fn with_count(component: Identifier, count: u32) -> Self {
        Self { component, count }
    }

    pub fn is(&self, component: &Identifier) -> bool {
        &self.component == component
    }

    pub fn is_in_tag(&self, tag: &TagId, ctx: &dyn RegistryContext) -> bool {
        ctx.is_in_tag(&self.component, tag)
    }
}

impl fmt::Debug for ComponentStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.count, self.component)
    }
}

/// The concrete components present when a recipe is assembled for real.
///
/// Result transforms receive `None` instead when the output is requested
/// for preview or display purposes only.
#[derive(Clone, Debug, Default)]
pub struct AssemblyContext {
    pub contents: Vec<ComponentStack>,
}

impl AssemblyContext {
    pub fn new(contents: Vec<ComponentStack>) -> Self {
        Self { contents }
    }
}
