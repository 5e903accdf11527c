use crate::model::Identifier;
use thiserror::Error;

/// Errors that can occur while deserializing a single rule document.
///
/// These are always scoped to one configuration document: a failing document
/// is reported under its key and skipped, sibling documents still load.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Invalid identifier '{0}': expected the form 'namespace:path'")]
    InvalidIdentifier(String),

    #[error("Unknown recipe filter type: '{0}'")]
    UnknownFilterKind(String),

    #[error("Unknown ingredient selector type: '{0}'")]
    UnknownSelectorKind(String),

    #[error("Unknown recipe modifier type: '{0}'")]
    UnknownModifierKind(String),

    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    #[error("'{kind}' {table} has no '{field}' defined - typo?")]
    MissingField {
        table: &'static str,
        kind: String,
        field: &'static str,
    },

    #[error("Invalid {what}: {message}")]
    Invalid {
        what: &'static str,
        message: String,
    },
}

/// Errors surfaced by engine queries.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(
        "Can't {action} before the first application pass has completed. \
         Maybe you need to wait for both reload events?"
    )]
    NotReady { action: &'static str },
}

/// Errors raised by a modifier during the application pass.
///
/// A failing modifier never aborts the pass: the error is logged with the
/// offending rule set's id and the recipe's id, and the pass continues.
#[derive(Error, Debug, Clone)]
pub enum ModifierError {
    #[error("Ingredient position {position} is out of bounds (recipe has {len} inputs)")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("Recipe modifier failed: {0}")]
    Failed(String),
}

/// Errors that can occur when converting a custom host format into a
/// [`RecipeCollection`](crate::collection::RecipeCollection).
#[derive(Error, Debug, Clone)]
pub enum DatasetConversionError {
    #[error("Invalid recipe data: {0}")]
    ValidationError(String),

    #[error("Duplicate recipe identifier '{0}'")]
    DuplicateIdentifier(Identifier),
}
