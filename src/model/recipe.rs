use super::component::ComponentStack;
use super::identifier::Identifier;
use super::ingredient::Ingredient;
use crate::collection::UpgradableList;

/// A single recipe record: a stable identity, a kind, an ordered input list
/// and the default result it produces.
///
/// The engine never creates or destroys recipes on its own behalf; it only
/// mutates their input list during an application pass and intercepts result
/// production through the transform chain. The input list starts out in
/// fixed storage and is promoted to mutable storage the first time a
/// modifier touches it.
#[derive(Clone, Debug)]
pub struct Recipe {
    id: Identifier,
    kind: Identifier,
    inputs: UpgradableList<Ingredient>,
    default_result: ComponentStack,
}

impl Recipe {
    pub fn new(
        id: Identifier,
        kind: Identifier,
        inputs: Vec<Ingredient>,
        default_result: ComponentStack,
    ) -> Self {
        Self {
            id,
            kind,
            inputs: UpgradableList::fixed(inputs),
            default_result,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn kind(&self) -> &Identifier {
        &self.kind
    }

    pub fn inputs(&self) -> &[Ingredient] {
        self.inputs.as_slice()
    }

    /// Mutable access to the input list, promoting the backing storage to a
    /// growable implementation on first use.
    pub fn inputs_mut(&mut self) -> &mut Vec<Ingredient> {
        self.inputs.ensure_mutable()
    }

    /// Whether the input list has already been promoted to mutable storage.
    pub fn inputs_are_mutable(&self) -> bool {
        self.inputs.is_mutable()
    }

    /// The result this recipe produces before any result transforms run.
    pub fn default_result(&self) -> &ComponentStack {
        &self.default_result
    }
}
