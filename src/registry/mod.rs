//! Extensible deserialization of rule documents.
//!
//! Three independent kind tables map a textual `"type"` tag to a parsing
//! routine producing a [`Filter`], [`Selector`] or [`Modifier`]. All three
//! are open for registration, so a plugin can add new kinds at startup.
//! Unknown tags fail with a named error rather than silently ignoring the
//! rule.

mod document;
mod kinds;

pub use document::{parse_ruleset_document, parse_ruleset_documents};

use crate::error::ParseError;
use crate::model::{ComponentStack, Identifier, Ingredient, IngredientEntry, RegistryContext, TagId};
use crate::rule::{Filter, Modifier, Selector};
use ahash::AHashMap;
use serde_json::Value;

/// Everything a kind parser may need: the registry itself (for nested
/// documents) and the host's component universe (for shorthand resolution).
pub struct ParseContext<'a> {
    pub registry: &'a RuleRegistry,
    pub components: &'a dyn RegistryContext,
}

type FilterParseFn = Box<dyn Fn(&Value, &ParseContext) -> Result<Filter, ParseError> + Send + Sync>;
type SelectorParseFn =
    Box<dyn Fn(&Value, &ParseContext) -> Result<Selector, ParseError> + Send + Sync>;
type ModifierParseFn =
    Box<dyn Fn(&Value, &ParseContext) -> Result<Modifier, ParseError> + Send + Sync>;

/// The three kind tables used to deserialize rule documents.
pub struct RuleRegistry {
    filters: AHashMap<String, FilterParseFn>,
    selectors: AHashMap<String, SelectorParseFn>,
    modifiers: AHashMap<String, ModifierParseFn>,
}

impl RuleRegistry {
    /// An empty registry with no kinds at all. Mostly useful for isolated
    /// tests; hosts normally start from [`RuleRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            filters: AHashMap::new(),
            selectors: AHashMap::new(),
            modifiers: AHashMap::new(),
        }
    }

    /// A registry pre-populated with every built-in kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        kinds::register_default_kinds(&mut registry);
        registry
    }

    pub fn register_filter_kind(
        &mut self,
        kind: impl Into<String>,
        parse: impl Fn(&Value, &ParseContext) -> Result<Filter, ParseError> + Send + Sync + 'static,
    ) {
        self.filters.insert(kind.into(), Box::new(parse));
    }

    pub fn register_selector_kind(
        &mut self,
        kind: impl Into<String>,
        parse: impl Fn(&Value, &ParseContext) -> Result<Selector, ParseError> + Send + Sync + 'static,
    ) {
        self.selectors.insert(kind.into(), Box::new(parse));
    }

    pub fn register_modifier_kind(
        &mut self,
        kind: impl Into<String>,
        parse: impl Fn(&Value, &ParseContext) -> Result<Modifier, ParseError> + Send + Sync + 'static,
    ) {
        self.modifiers.insert(kind.into(), Box::new(parse));
    }

    /// Deserializes a recipe filter document.
    ///
    /// A string is shorthand: a `!` prefix negates the rest, `*` matches
    /// everything, a plain word is a namespace filter, and `namespace:path`
    /// filters by result component when the component exists, by recipe
    /// identifier otherwise. An object is resolved by its `type` tag.
    pub fn parse_filter(
        &self,
        doc: &Value,
        components: &dyn RegistryContext,
    ) -> Result<Filter, ParseError> {
        let ctx = ParseContext {
            registry: self,
            components,
        };
        self.parse_filter_in(doc, &ctx)
    }

    pub(crate) fn parse_filter_in(
        &self,
        doc: &Value,
        ctx: &ParseContext,
    ) -> Result<Filter, ParseError> {
        match doc {
            Value::String(s) => filter_from_string(s, ctx),
            Value::Object(_) => {
                let kind = type_tag(doc, "recipe filter")?;
                match self.filters.get(kind) {
                    Some(parse) => parse(doc, ctx),
                    None => Err(ParseError::UnknownFilterKind(kind.to_string())),
                }
            }
            _ => Err(ParseError::Invalid {
                what: "recipe filter",
                message: "expected a string or an object".to_string(),
            }),
        }
    }

    /// Deserializes an ingredient selector document.
    ///
    /// A number selects by position; a string is shorthand (`#ns:tag` for a
    /// tag selector, a trailing `!` for an exact component match, a plain
    /// component for an accepting match); an array concatenates its
    /// elements; an object is resolved by its `type` tag.
    pub fn parse_selector(
        &self,
        doc: &Value,
        components: &dyn RegistryContext,
    ) -> Result<Selector, ParseError> {
        let ctx = ParseContext {
            registry: self,
            components,
        };
        self.parse_selector_in(doc, &ctx)
    }

    pub(crate) fn parse_selector_in(
        &self,
        doc: &Value,
        ctx: &ParseContext,
    ) -> Result<Selector, ParseError> {
        match doc {
            Value::Number(n) => match n.as_u64() {
                Some(position) => Ok(Selector::at_positions(vec![position as usize])),
                None => Err(ParseError::Invalid {
                    what: "ingredient selector",
                    message: format!("ordinal must be a non-negative integer, got {n}"),
                }),
            },
            Value::String(s) => selector_from_string(s, ctx),
            Value::Array(elements) => {
                let selectors: Vec<Selector> = elements
                    .iter()
                    .map(|e| self.parse_selector_in(e, ctx))
                    .collect::<Result<_, _>>()?;
                Ok(Selector::concat(selectors))
            }
            Value::Object(_) => {
                let kind = type_tag(doc, "ingredient selector")?;
                match self.selectors.get(kind) {
                    Some(parse) => parse(doc, ctx),
                    None => Err(ParseError::UnknownSelectorKind(kind.to_string())),
                }
            }
            _ => Err(ParseError::Invalid {
                what: "ingredient selector",
                message: "expected a number, string, array or object".to_string(),
            }),
        }
    }

    /// Deserializes a single recipe modifier document (an object with a
    /// `type` tag).
    pub fn parse_modifier(
        &self,
        doc: &Value,
        components: &dyn RegistryContext,
    ) -> Result<Modifier, ParseError> {
        let ctx = ParseContext {
            registry: self,
            components,
        };
        self.parse_modifier_in(doc, &ctx)
    }

    pub(crate) fn parse_modifier_in(
        &self,
        doc: &Value,
        ctx: &ParseContext,
    ) -> Result<Modifier, ParseError> {
        match doc {
            Value::Object(_) => {
                let kind = type_tag(doc, "recipe modifier")?;
                match self.modifiers.get(kind) {
                    Some(parse) => parse(doc, ctx),
                    None => Err(ParseError::UnknownModifierKind(kind.to_string())),
                }
            }
            _ => Err(ParseError::Invalid {
                what: "recipe modifier",
                message: "expected an object with a 'type' tag".to_string(),
            }),
        }
    }

    /// Deserializes a modifier list document: either a single modifier
    /// object or an array of them, applied in order.
    pub fn parse_modifiers(
        &self,
        doc: &Value,
        components: &dyn RegistryContext,
    ) -> Result<Vec<Modifier>, ParseError> {
        let ctx = ParseContext {
            registry: self,
            components,
        };
        match doc {
            Value::Array(elements) => elements
                .iter()
                .map(|e| self.parse_modifier_in(e, &ctx))
                .collect(),
            Value::Object(_) => Ok(vec![self.parse_modifier_in(doc, &ctx)?]),
            _ => Err(ParseError::Invalid {
                what: "recipe modifier list",
                message: "expected either an array of modifiers or a single modifier object"
                    .to_string(),
            }),
        }
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn filter_from_string(s: &str, ctx: &ParseContext) -> Result<Filter, ParseError> {
    if let Some(rest) = s.strip_prefix('!') {
        return Ok(Filter::not(filter_from_string(rest, ctx)?));
    }
    if s == "*" {
        return Ok(Filter::always());
    }
    if !s.contains(':') {
        return Ok(Filter::namespace_equals(s));
    }
    let id = Identifier::parse(s)?;
    if ctx.components.has_component(&id) {
        Ok(Filter::result_is(id))
    } else {
        Ok(Filter::id_equals(id))
    }
}

fn selector_from_string(s: &str, ctx: &ParseContext) -> Result<Selector, ParseError> {
    if let Some(tag) = s.strip_prefix('#') {
        return Ok(Selector::matching_tag(TagId::parse(tag)?));
    }

    let (name, exact) = match s.strip_suffix('!') {
        Some(name) => (name, true),
        None => (s, false),
    };

    let component = Identifier::parse(name)?;
    if !ctx.components.has_component(&component) {
        return Err(ParseError::UnknownComponent(name.to_string()));
    }
    Ok(if exact {
        Selector::matching_component(component)
    } else {
        Selector::accepting_component(component)
    })
}

/// Extracts the `type` tag of an object document.
fn type_tag<'v>(doc: &'v Value, what: &'static str) -> Result<&'v str, ParseError> {
    doc.get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::Invalid {
            what,
            message: "object is missing a string 'type' tag".to_string(),
        })
}

/// Looks up a required field of a kind document.
pub(crate) fn field<'v>(
    doc: &'v Value,
    table: &'static str,
    kind: &str,
    name: &'static str,
) -> Result<&'v Value, ParseError> {
    doc.get(name).ok_or_else(|| ParseError::MissingField {
        table,
        kind: kind.to_string(),
        field: name,
    })
}

/// Parses an identifier out of a JSON string value.
pub(crate) fn identifier(doc: &Value, what: &'static str) -> Result<Identifier, ParseError> {
    match doc.as_str() {
        Some(s) => Identifier::parse(s),
        None => Err(ParseError::Invalid {
            what,
            message: "expected an identifier string".to_string(),
        }),
    }
}

/// Parses an ingredient document: a component string, a `#tag` string, or
/// an array of either.
pub(crate) fn ingredient(doc: &Value, ctx: &ParseContext) -> Result<Ingredient, ParseError> {
    match doc {
        Value::String(_) => Ok(Ingredient::from_entries(vec![ingredient_entry(doc, ctx)?])),
        Value::Array(elements) => {
            let entries: Vec<IngredientEntry> = elements
                .iter()
                .map(|e| ingredient_entry(e, ctx))
                .collect::<Result<_, _>>()?;
            if entries.is_empty() {
                return Err(ParseError::Invalid {
                    what: "ingredient",
                    message: "ingredient must have at least one entry".to_string(),
                });
            }
            Ok(Ingredient::from_entries(entries))
        }
        _ => Err(ParseError::Invalid {
            what: "ingredient",
            message: "expected a component string, '#tag' string or array of them".to_string(),
        }),
    }
}

fn ingredient_entry(doc: &Value, ctx: &ParseContext) -> Result<IngredientEntry, ParseError> {
    let Some(s) = doc.as_str() else {
        return Err(ParseError::Invalid {
            what: "ingredient entry",
            message: "expected a string".to_string(),
        });
    };
    if let Some(tag) = s.strip_prefix('#') {
        return Ok(IngredientEntry::Tag(TagId::parse(tag)?));
    }
    let component = Identifier::parse(s)?;
    if !ctx.components.has_component(&component) {
        return Err(ParseError::UnknownComponent(s.to_string()));
    }
    Ok(IngredientEntry::Component(component))
}

/// Parses a component stack document: a component string or an object with
/// `item` and an optional `count`.
pub(crate) fn component_stack(
    doc: &Value,
    ctx: &ParseContext,
) -> Result<ComponentStack, ParseError> {
    let (component, count) = match doc {
        Value::String(s) => (Identifier::parse(s)?, 1),
        Value::Object(_) => {
            let item = identifier(
                doc.get("item").ok_or_else(|| ParseError::Invalid {
                    what: "component stack",
                    message: "object form requires an 'item' field".to_string(),
                })?,
                "component stack item",
            )?;
            let count = match doc.get("count") {
                None => 1,
                Some(value) => value.as_u64().ok_or_else(|| ParseError::Invalid {
                    what: "component stack",
                    message: format!("count must be a non-negative integer, got {value}"),
                })? as u32,
            };
            (item, count)
        }
        _ => {
            return Err(ParseError::Invalid {
                what: "component stack",
                message: "expected a component string or an object with 'item'".to_string(),
            });
        }
    };

    if !ctx.components.has_component(&component) {
        return Err(ParseError::UnknownComponent(component.to_string()));
    }
    Ok(ComponentStack::with_count(component, count))
}
