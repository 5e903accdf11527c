use super::identifier::{Identifier, TagId};
use ahash::{AHashMap, AHashSet};

/// The host's component and tag universe.
///
/// The engine never enumerates components on its own: shorthand rule
/// parsing asks whether a component exists, and tag-based matching asks for
/// a tag's members. Hosts back this with their native registries; tests and
/// standalone use can rely on [`InMemoryContext`].
pub trait RegistryContext: Send + Sync {
    /// Whether the given component is known to the host.
    fn has_component(&self, component: &Identifier) -> bool;

    /// All components reachable through the given tag. Unknown tags resolve
    /// to an empty set, never an error.
    fn tag_members(&self, tag: &TagId) -> Vec<Identifier>;

    fn is_in_tag(&self, component: &Identifier, tag: &TagId) -> bool {
        self.tag_members(tag).contains(component)
    }
}

/// A simple map-backed [`RegistryContext`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryContext {
    components: AHashSet<Identifier>,
    tags: AHashMap<TagId, Vec<Identifier>>,
}

impl InMemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: Identifier) -> &mut Self {
        self.components.insert(component);
        self
    }

    /// Registers a tag with the given members. Members are also registered
    /// as components.
    pub fn add_tag(&mut self, tag: TagId, members: Vec<Identifier>) -> &mut Self {
        for member in &members {
            self.components.insert(member.clone());
        }
        self.tags.insert(tag, members);
        self
    }
}

impl RegistryContext for InMemoryContext {
    fn has_component(&self, component: &Identifier) -> bool {
        self.components.contains(component)
    }

    fn tag_members(&self, tag: &TagId) -> Vec<Identifier> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }

    fn is_in_tag(&self, component: &Identifier, tag: &TagId) -> bool {
        self.tags
            .get(tag)
            .is_some_and(|members| members.contains(component))
    }
}
