//! Batch deserialization of rule set documents.

use super::RuleRegistry;
use crate::error::ParseError;
use crate::model::{Identifier, RegistryContext};
use crate::rule::RuleSet;
use serde_json::Value;
use tracing::{error, info};

/// Deserializes one rule set document:
/// `{ "target_recipes": <filter>, "modifiers": <modifier|array> }`.
pub fn parse_ruleset_document(
    registry: &RuleRegistry,
    components: &dyn RegistryContext,
    id: Identifier,
    doc: &Value,
) -> Result<RuleSet, ParseError> {
    let target = doc
        .get("target_recipes")
        .ok_or(ParseError::MissingField {
            table: "rule set",
            kind: id.to_string(),
            field: "target_recipes",
        })?;
    let modifiers = doc.get("modifiers").ok_or(ParseError::MissingField {
        table: "rule set",
        kind: id.to_string(),
        field: "modifiers",
    })?;

    let filter = registry.parse_filter(target, components)?;
    let modifiers = registry.parse_modifiers(modifiers, components)?;
    Ok(RuleSet::new(id, filter, modifiers))
}

/// Deserializes a batch of rule set documents, keyed by document id.
///
/// Each document parses independently: a failure is logged under its key
/// and returned in the error list, and every sibling document still loads.
pub fn parse_ruleset_documents(
    registry: &RuleRegistry,
    components: &dyn RegistryContext,
    documents: impl IntoIterator<Item = (Identifier, Value)>,
) -> (Vec<RuleSet>, Vec<(Identifier, ParseError)>) {
    let mut rulesets = Vec::new();
    let mut failures = Vec::new();

    for (id, doc) in documents {
        match parse_ruleset_document(registry, components, id.clone(), &doc) {
            Ok(ruleset) => rulesets.push(ruleset),
            Err(parse_error) => {
                error!(document = %id, error = %parse_error, "Error loading rule set document");
                failures.push((id, parse_error));
            }
        }
    }

    info!("Loaded {} rule set documents", rulesets.len());
    (rulesets, failures)
}
