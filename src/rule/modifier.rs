use super::selector::Selector;
use crate::error::ModifierError;
use crate::model::{ComponentStack, Identifier, Ingredient, Recipe, RegistryContext};
use crate::transform::{ResultTransform, TransformChain};
use std::fmt;
use std::sync::Arc;

/// The capability surface a modifier mutates through.
///
/// The handle borrows the recipe being modified together with the engine
/// state a modifier may touch: the result-transform chain and the
/// pending-removal list. It is lifetime-bound to one modifier invocation
/// and cannot be retained past it.
pub struct MutationHandle<'a> {
    recipe: &'a mut Recipe,
    ctx: &'a dyn RegistryContext,
    transforms: &'a mut TransformChain,
    removals: &'a mut Vec<Identifier>,
}

impl<'a> MutationHandle<'a> {
    pub(crate) fn new(
        recipe: &'a mut Recipe,
        ctx: &'a dyn RegistryContext,
        transforms: &'a mut TransformChain,
        removals: &'a mut Vec<Identifier>,
    ) -> Self {
        Self {
            recipe,
            ctx,
            transforms,
            removals,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        self.recipe
    }

    pub fn context(&self) -> &dyn RegistryContext {
        self.ctx
    }

    pub fn inputs(&self) -> &[Ingredient] {
        self.recipe.inputs()
    }

    /// Mutable access to the input list, promoting its backing storage on
    /// first use.
    pub fn inputs_mut(&mut self) -> &mut Vec<Ingredient> {
        self.recipe.inputs_mut()
    }

    /// Runs a selector against the recipe being modified.
    pub fn select(&self, selector: &Selector) -> Vec<usize> {
        selector.select(self.recipe, self.ctx)
    }

    /// Removes every ingredient the selector picks. Later positions are
    /// removed first so earlier positions stay valid.
    pub fn remove_selected(&mut self, selector: &Selector) -> Result<(), ModifierError> {
        let mut positions = self.select(selector);
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        let inputs = self.recipe.inputs_mut();
        for position in positions {
            if position >= inputs.len() {
                return Err(ModifierError::PositionOutOfBounds {
                    position,
                    len: inputs.len(),
                });
            }
            inputs.remove(position);
        }
        Ok(())
    }

    /// Appends a result transform for the recipe being modified.
    pub fn register_result_transform(&mut self, transform: ResultTransform) {
        self.transforms.register(self.recipe.id().clone(), transform);
    }

    /// Marks the recipe being modified for removal. The recipe stays in
    /// place for the rest of the pass and is removed from every backing
    /// index after iteration completes.
    pub fn remove_recipe(&mut self) {
        self.removals.push(self.recipe.id().clone());
    }

    /// Marks another recipe for removal at the end of the pass.
    pub fn remove_recipe_by_id(&mut self, id: Identifier) {
        self.removals.push(id);
    }
}

/// A function that structurally mutates a recipe's inputs or registers a
/// result transform, acting only through the supplied [`MutationHandle`].
///
/// A modifier returning an error never aborts the application pass; the
/// error is logged against the owning rule set and the pass continues with
/// the next recipe and rule set.
#[derive(Clone)]
pub struct Modifier(Arc<dyn Fn(&mut MutationHandle) -> Result<(), ModifierError> + Send + Sync>);

impl Modifier {
    pub fn new(
        f: impl Fn(&mut MutationHandle) -> Result<(), ModifierError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, handle: &mut MutationHandle) -> Result<(), ModifierError> {
        (self.0)(handle)
    }

    /// Removes every ingredient the selector picks.
    pub fn remove_ingredients(selector: Selector) -> Self {
        Self::new(move |handle| handle.remove_selected(&selector))
    }

    /// Removes every ingredient that accepts the given component.
    pub fn remove_all_ingredients(component: Identifier) -> Self {
        Self::remove_ingredients(Selector::accepting_component(component))
    }

    /// Appends the given ingredient to the recipe.
    pub fn add_ingredient(ingredient: Ingredient) -> Self {
        Self::new(move |handle| {
            handle.inputs_mut().push(ingredient.clone());
            Ok(())
        })
    }

    /// Merges the alternative's entries into every selected ingredient.
    pub fn add_alternative(selector: Selector, alternative: Ingredient) -> Self {
        Self::new(move |handle| {
            for position in dedup(handle.select(&selector)) {
                let len = handle.inputs().len();
                match handle.inputs_mut().get_mut(position) {
                    Some(ingredient) => ingredient.add_alternative(&alternative),
                    None => return Err(ModifierError::PositionOutOfBounds { position, len }),
                }
            }
            Ok(())
        })
    }

    /// Replaces every selected ingredient with the new ingredient.
    pub fn replace_ingredients(selector: Selector, new_ingredient: Ingredient) -> Self {
        Self::new(move |handle| {
            for position in dedup(handle.select(&selector)) {
                let len = handle.inputs().len();
                match handle.inputs_mut().get_mut(position) {
                    Some(ingredient) => *ingredient = new_ingredient.clone(),
                    None => return Err(ModifierError::PositionOutOfBounds { position, len }),
                }
            }
            Ok(())
        })
    }

    /// Replaces the recipe's produced result. Registered as a result
    /// transform, so the default result is replaced at production time; the
    /// replacement is cloned per production, never shared.
    pub fn replace_result(new_result: ComponentStack) -> Self {
        Self::new(move |handle| {
            let new_result = new_result.clone();
            handle.register_result_transform(Arc::new(move |_, _, _| new_result.clone()));
            Ok(())
        })
    }

    /// Modifies the recipe's produced result in place at production time.
    pub fn modify_result(f: impl Fn(&mut ComponentStack) + Send + Sync + 'static) -> Self {
        let f = Arc::new(f);
        Self::new(move |handle| {
            let f = f.clone();
            handle.register_result_transform(Arc::new(move |_, mut result, _| {
                f(&mut result);
                result
            }));
            Ok(())
        })
    }

    /// Overrides the count of the recipe's produced result.
    pub fn set_result_count(count: u32) -> Self {
        Self::modify_result(move |result| result.count = count)
    }

    /// Marks every matched recipe for removal at the end of the pass.
    pub fn remove_recipe() -> Self {
        Self::new(|handle| {
            handle.remove_recipe();
            Ok(())
        })
    }
}

fn dedup(mut positions: Vec<usize>) -> Vec<usize> {
    positions.sort_unstable();
    positions.dedup();
    positions
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Modifier(..)")
    }
}
