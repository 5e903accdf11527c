use super::upgrade::UpgradableMap;
use crate::error::DatasetConversionError;
use crate::model::{Identifier, Recipe};
use ahash::AHashMap;

/// The engine-side view of the host's recipe dataset.
///
/// Two backing indices are kept: the map from identifier to recipe and the
/// map from recipe kind to the identifiers of that kind. Both start out as
/// fixed storage and are promoted before the first structural change; both
/// are updated together on removal so queries against either never diverge.
#[derive(Clone, Debug)]
pub struct RecipeCollection {
    by_id: UpgradableMap<Identifier, Recipe>,
    by_kind: UpgradableMap<Identifier, Vec<Identifier>>,
}

impl RecipeCollection {
    /// Builds a collection from a list of recipes. Duplicate identifiers
    /// are rejected rather than silently overwritten.
    pub fn from_recipes(
        recipes: Vec<Recipe>,
    ) -> Result<Self, DatasetConversionError> {
        let mut by_id = AHashMap::with_capacity(recipes.len());
        let mut by_kind: AHashMap<Identifier, Vec<Identifier>> = AHashMap::new();

        for recipe in recipes {
            by_kind
                .entry(recipe.kind().clone())
                .or_default()
                .push(recipe.id().clone());
            if let Some(previous) = by_id.insert(recipe.id().clone(), recipe) {
                return Err(DatasetConversionError::DuplicateIdentifier(
                    previous.id().clone(),
                ));
            }
        }

        Ok(Self {
            by_id: UpgradableMap::fixed(by_id),
            by_kind: UpgradableMap::fixed(by_kind),
        })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &Identifier) -> Option<&Recipe> {
        self.by_id.get(id)
    }

    /// Mutable access to a recipe, promoting the identifier index to
    /// mutable storage on first use.
    pub fn get_mut(&mut self, id: &Identifier) -> Option<&mut Recipe> {
        self.by_id.ensure_mutable().get_mut(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.by_id.iter().map(|(_, recipe)| recipe)
    }

    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.by_id.iter().map(|(id, _)| id)
    }

    /// Identifiers of every recipe of the given kind, or an empty slice.
    pub fn ids_by_kind(&self, kind: &Identifier) -> &[Identifier] {
        self.by_kind.get(kind).map_or(&[], Vec::as_slice)
    }

    /// Removes a recipe from both backing indices. Returns the removed
    /// recipe, or `None` when the identifier is unknown.
    pub fn remove(&mut self, id: &Identifier) -> Option<Recipe> {
        let removed = self.by_id.ensure_mutable().remove(id)?;

        let by_kind = self.by_kind.ensure_mutable();
        if let Some(of_kind) = by_kind.get_mut(removed.kind()) {
            of_kind.retain(|other| other != id);
            if of_kind.is_empty() {
                by_kind.remove(removed.kind());
            }
        }

        Some(removed)
    }
}
