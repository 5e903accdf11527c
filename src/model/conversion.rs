use crate::collection::RecipeCollection;
use crate::error::DatasetConversionError;

/// A trait for custom host data models that can be converted into the
/// engine's [`RecipeCollection`].
///
/// This is the primary extension point for making the engine host-agnostic:
/// parse your native recipe format into your own structs, then implement
/// `IntoDataset` to translate them into [`Recipe`](crate::model::Recipe)
/// records. The built-in [`data`](crate::data) document model does exactly
/// this for a plain JSON dataset.
pub trait IntoDataset {
    /// Consumes the object and converts it into a recipe collection.
    fn into_dataset(self) -> Result<RecipeCollection, DatasetConversionError>;
}
