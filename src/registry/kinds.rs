//! The built-in filter, selector and modifier kinds.

use super::{ParseContext, RuleRegistry, component_stack, field, identifier, ingredient};
use crate::error::ParseError;
use crate::model::{Identifier, TagId};
use crate::rule::{Filter, Modifier, Selector};
use serde_json::Value;

pub(super) fn register_default_kinds(registry: &mut RuleRegistry) {
    register_filter_kinds(registry);
    register_selector_kinds(registry);
    register_modifier_kinds(registry);
}

fn register_filter_kinds(registry: &mut RuleRegistry) {
    registry.register_filter_kind("all_recipes", |_, _| Ok(Filter::always()));

    registry.register_filter_kind("accepting_ingredient", |doc, ctx| {
        let item = identifier(
            field(doc, "filter", "accepting_ingredient", "item")?,
            "component",
        )?;
        if !ctx.components.has_component(&item) {
            return Err(ParseError::UnknownComponent(item.to_string()));
        }
        Ok(Filter::accepts_component(item))
    });

    registry.register_filter_kind("result_item_is", |doc, ctx| {
        let items = doc
            .get("items")
            .or_else(|| doc.get("item"))
            .ok_or(ParseError::MissingField {
                table: "filter",
                kind: "result_item_is".to_string(),
                field: "items",
            })?;
        result_item_filter(items, ctx)
    });

    registry.register_filter_kind("result_item_predicate", |doc, ctx| {
        let predicate = field(doc, "filter", "result_item_predicate", "predicate")?;

        let mut filters = Vec::new();
        if let Some(items) = predicate.get("items") {
            filters.push(result_item_filter(items, ctx)?);
        }
        if let Some(min) = predicate.get("min_count") {
            let min = count_bound(min)?;
            filters.push(Filter::result_matches(move |result| result.count >= min));
        }
        if let Some(max) = predicate.get("max_count") {
            let max = count_bound(max)?;
            filters.push(Filter::result_matches(move |result| result.count <= max));
        }
        if filters.is_empty() {
            return Err(ParseError::Invalid {
                what: "result item predicate",
                message: "predicate has no 'items', 'min_count' or 'max_count'".to_string(),
            });
        }
        Ok(Filter::and(filters))
    });

    registry.register_filter_kind("id_equals", |doc, _| {
        let id = identifier(field(doc, "filter", "id_equals", "id")?, "recipe identifier")?;
        Ok(Filter::id_equals(id))
    });

    registry.register_filter_kind("namespace_equals", |doc, _| {
        let namespace = field(doc, "filter", "namespace_equals", "namespace")?
            .as_str()
            .ok_or_else(|| ParseError::Invalid {
                what: "namespace filter",
                message: "namespace must be a string".to_string(),
            })?;
        Ok(Filter::namespace_equals(namespace))
    });

    registry.register_filter_kind("is_recipe_type", |doc, _| {
        let kind = identifier(
            field(doc, "filter", "is_recipe_type", "recipe_type")?,
            "recipe type",
        )?;
        Ok(Filter::kind_is(kind))
    });

    registry.register_filter_kind("and", |doc, ctx| {
        Ok(Filter::and(nested_filters(doc, "and", ctx)?))
    });

    registry.register_filter_kind("or", |doc, ctx| {
        Ok(Filter::or(nested_filters(doc, "or", ctx)?))
    });

    registry.register_filter_kind("not", |doc, ctx| {
        let inner = field(doc, "filter", "not", "filter")?;
        Ok(Filter::not(ctx.registry.parse_filter_in(inner, ctx)?))
    });
}

fn register_selector_kinds(registry: &mut RuleRegistry) {
    registry.register_selector_kind("all", |_, _| Ok(Selector::all()));

    registry.register_selector_kind("match_item", |doc, ctx| {
        let item = known_component(field(doc, "selector", "match_item", "item")?, ctx)?;
        Ok(Selector::accepting_component(item))
    });

    registry.register_selector_kind("match_item_exact", |doc, ctx| {
        let item = known_component(field(doc, "selector", "match_item_exact", "item")?, ctx)?;
        Ok(Selector::matching_component(item))
    });

    registry.register_selector_kind("match_tag", |doc, _| {
        let tag = field(doc, "selector", "match_tag", "tag")?
            .as_str()
            .ok_or_else(|| ParseError::Invalid {
                what: "tag selector",
                message: "tag must be a string".to_string(),
            })?;
        Ok(Selector::matching_tag(TagId::parse(
            tag.strip_prefix('#').unwrap_or(tag),
        )?))
    });

    registry.register_selector_kind("from_ordinals", |doc, _| {
        let ordinals = match (doc.get("ordinals"), doc.get("ordinal")) {
            (Some(Value::Array(elements)), _) => elements
                .iter()
                .map(ordinal)
                .collect::<Result<Vec<_>, _>>()?,
            (_, Some(value)) => vec![ordinal(value)?],
            _ => {
                return Err(ParseError::Invalid {
                    what: "ordinal selector",
                    message: "expected an 'ordinals' array or a single 'ordinal'".to_string(),
                });
            }
        };
        Ok(Selector::at_positions(ordinals))
    });
}

fn register_modifier_kinds(registry: &mut RuleRegistry) {
    registry.register_modifier_kind("add_ingredient", |doc, ctx| {
        let new = ingredient(field(doc, "modifier", "add_ingredient", "ingredient")?, ctx)?;
        Ok(Modifier::add_ingredient(new))
    });

    registry.register_modifier_kind("remove_ingredient", |doc, ctx| {
        let selector_doc = field(doc, "modifier", "remove_ingredient", "ingredients")?;
        let selector = ctx.registry.parse_selector_in(selector_doc, ctx)?;
        Ok(Modifier::remove_ingredients(selector))
    });

    registry.register_modifier_kind("replace_ingredient", |doc, ctx| {
        let selector_doc = field(doc, "modifier", "replace_ingredient", "ingredient")?;
        let selector = ctx.registry.parse_selector_in(selector_doc, ctx)?;
        let new = ingredient(
            field(doc, "modifier", "replace_ingredient", "new_ingredient")?,
            ctx,
        )?;
        Ok(Modifier::replace_ingredients(selector, new))
    });

    registry.register_modifier_kind("add_alternative", |doc, ctx| {
        let selector_doc = field(doc, "modifier", "add_alternative", "ingredients")?;
        let selector = ctx.registry.parse_selector_in(selector_doc, ctx)?;
        let alternative = ingredient(
            field(doc, "modifier", "add_alternative", "alternative")?,
            ctx,
        )?;
        Ok(Modifier::add_alternative(selector, alternative))
    });

    registry.register_modifier_kind("replace_result", |doc, ctx| {
        let new_result =
            component_stack(field(doc, "modifier", "replace_result", "new_result")?, ctx)?;
        Ok(Modifier::replace_result(new_result))
    });

    registry.register_modifier_kind("set_result_count", |doc, _| {
        let count = field(doc, "modifier", "set_result_count", "count")?;
        let count = count.as_u64().ok_or_else(|| ParseError::Invalid {
            what: "result count modifier",
            message: format!("count must be a non-negative integer, got {count}"),
        })? as u32;
        Ok(Modifier::set_result_count(count))
    });

    registry.register_modifier_kind("remove_recipe", |_, _| Ok(Modifier::remove_recipe()));
}

/// `result_item_is` accepts a single component string, a `#tag` string, or
/// an array of component strings.
fn result_item_filter(items: &Value, ctx: &ParseContext) -> Result<Filter, ParseError> {
    match items {
        Value::Array(elements) => {
            let components: Vec<Identifier> = elements
                .iter()
                .map(|e| known_component(e, ctx))
                .collect::<Result<_, _>>()?;
            Ok(Filter::result_is_any(components))
        }
        Value::String(s) => {
            if let Some(tag) = s.strip_prefix('#') {
                return Ok(Filter::result_in_tag(TagId::parse(tag)?));
            }
            Ok(Filter::result_is(known_component(items, ctx)?))
        }
        _ => Err(ParseError::Invalid {
            what: "result item filter",
            message: format!("must be either a string or an array of strings: {items}"),
        }),
    }
}

fn nested_filters(
    doc: &Value,
    kind: &'static str,
    ctx: &ParseContext,
) -> Result<Vec<Filter>, ParseError> {
    let filters = field(doc, "filter", kind, "filters")?;
    let Value::Array(elements) = filters else {
        return Err(ParseError::Invalid {
            what: "filter list",
            message: "'filters' must be an array".to_string(),
        });
    };
    elements
        .iter()
        .map(|e| ctx.registry.parse_filter_in(e, ctx))
        .collect()
}

fn known_component(doc: &Value, ctx: &ParseContext) -> Result<Identifier, ParseError> {
    let component = identifier(doc, "component")?;
    if !ctx.components.has_component(&component) {
        return Err(ParseError::UnknownComponent(component.to_string()));
    }
    Ok(component)
}

fn ordinal(value: &Value) -> Result<usize, ParseError> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| ParseError::Invalid {
            what: "ordinal selector",
            message: format!("ordinal must be a non-negative integer, got {value}"),
        })
}

fn count_bound(value: &Value) -> Result<u32, ParseError> {
    value
        .as_u64()
        .map(|n| n as u32)
        .ok_or_else(|| ParseError::Invalid {
            what: "result item predicate",
            message: format!("count bound must be a non-negative integer, got {value}"),
        })
}
