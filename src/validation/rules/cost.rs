//! Cost rule (spec §4.4 "Cost"): an optional, separately-invoked analysis
//! that simulates execution to assign a numeric cost to an operation,
//! without running any resolver.
//!
//! Unlike the other rules this is not wired into [`crate::validation::validate`]'s
//! default rule set -- the spec parameterizes it by `(operation name, variable
//! values, max cost, default cost, output actual slot)`, which are call-site
//! concerns rather than document-shape concerns every validation run needs.
//! Callers that want cost enforcement invoke [`check_cost`] explicitly,
//! mirroring how `juniper`'s cost-analysis work (in the `juniper` crate's
//! validation rules) is plugged in as a standalone pass rather than baked
//! into `visit_all_rules`.

use std::collections::HashSet;

use crate::ast::{self, fragment_by_name, Document, Selection};
use crate::coercion::{self, Variables};
use crate::error::RuleError;
use crate::schema::meta::MetaType;
use crate::schema::model::SchemaType;

/// Sentinel returned by the saturating arithmetic helpers once a cost
/// computation overflows or goes negative: "uncountable" (spec §4.4 "Cost
/// overflow").
pub const OVERFLOW: i64 = -1;

/// What a field's cost function returns: its own cost, plus how (if at all)
/// it changes the multiplier/context carried down to its children.
#[derive(Clone, Debug)]
pub struct CostStep {
    pub resolver_cost: i64,
    /// `1` (or less) means "no change to the carried-down multiplier".
    pub multiplier: i64,
    pub context: serde_json::Value,
}

impl CostStep {
    pub fn new(resolver_cost: i64) -> Self {
        CostStep {
            resolver_cost,
            multiplier: 1,
            context: serde_json::Value::Null,
        }
    }

    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// `a + b`, saturating to [`OVERFLOW`] on a negative operand or on overflow.
pub fn saturating_add(a: i64, b: i64) -> i64 {
    if a < 0 || b < 0 {
        return OVERFLOW;
    }
    a.checked_add(b).unwrap_or(OVERFLOW)
}

/// `a * b`, saturating to [`OVERFLOW`] on a negative operand or on overflow.
pub fn saturating_mul(a: i64, b: i64) -> i64 {
    if a < 0 || b < 0 {
        return OVERFLOW;
    }
    a.checked_mul(b).unwrap_or(OVERFLOW)
}

/// Runs the cost simulation for `operation_name` (or the document's sole
/// operation) and, if `max_cost` is non-negative and the total exceeds it (or
/// overflowed), returns an error. When `actual` is supplied it is always
/// written with the computed total (or `i64::MAX` on overflow), regardless of
/// whether the limit was exceeded.
#[allow(clippy::too_many_arguments, reason = "mirrors the spec's own parameter list for this rule")]
pub fn check_cost(
    doc: &Document,
    schema: &SchemaType,
    operation_name: Option<&str>,
    raw_variables: &serde_json::Map<String, serde_json::Value>,
    max_cost: i64,
    default_cost: i64,
    mut actual: Option<&mut i64>,
) -> Option<RuleError> {
    let op = ast::operations(doc).find(|op| match operation_name {
        Some(name) => op.item.name.as_ref().is_some_and(|n| n.item.as_str() == name),
        None => true,
    })?;

    let empty_defs = Vec::new();
    let defs = op.item.variable_definitions.as_ref().map(|d| &d.item).unwrap_or(&empty_defs);
    let variables = match coercion::coerce_variable_definitions(defs, raw_variables, schema) {
        Ok(v) => v,
        Err(_) => return None,
    };

    let root: Option<&MetaType> = match op.item.operation_type {
        ast::OperationType::Query => schema.concrete_type_by_name(schema.query_type_name()),
        ast::OperationType::Mutation => schema.mutation_type_name().and_then(|n| schema.concrete_type_by_name(n)),
        ast::OperationType::Subscription => {
            schema.subscription_type_name().and_then(|n| schema.concrete_type_by_name(n))
        }
    };
    let Some(root) = root else { return None };

    let mut total = 0i64;
    let mut path = HashSet::new();
    walk_selection_set(
        &op.item.selection_set,
        root,
        doc,
        schema,
        &variables,
        default_cost,
        1,
        &serde_json::Value::Null,
        &mut path,
        &mut total,
    );

    if let Some(actual) = actual.as_deref_mut() {
        *actual = if total == OVERFLOW { i64::MAX } else { total };
    }

    if max_cost >= 0 && (total == OVERFLOW || total > max_cost) {
        Some(RuleError::new(
            format!("Query cost {} exceeds the maximum cost of {max_cost}", if total == OVERFLOW { i64::MAX } else { total }),
            &[],
        ))
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments, reason = "threading multiplier/context/visited state through recursion")]
fn walk_selection_set<'a>(
    set: &'a [Selection],
    scope: &'a MetaType,
    doc: &'a Document,
    schema: &'a SchemaType,
    variables: &Variables,
    default_cost: i64,
    multiplier: i64,
    context: &serde_json::Value,
    path: &mut HashSet<&'a str>,
    total: &mut i64,
) {
    for selection in set {
        match selection {
            Selection::Field(field) => {
                if field.item.name.item.as_str() == "__typename" {
                    continue;
                }
                let Some(field_def) = scope.field_by_name(&field.item.name.item) else { continue };
                let args = coercion::coerce_argument_values(
                    &field_def.arguments,
                    field.item.arguments.as_ref(),
                    schema,
                    variables,
                )
                .unwrap_or_default();

                let step = match &field_def.cost {
                    Some(cost_fn) => cost_fn(&args, context),
                    None => CostStep::new(default_cost),
                };

                *total = saturating_add(*total, saturating_mul(multiplier, step.resolver_cost));

                let child_multiplier = if step.multiplier > 1 {
                    saturating_mul(multiplier, step.multiplier)
                } else {
                    multiplier
                };
                let child_context = if step.multiplier > 1 || step.context != serde_json::Value::Null {
                    step.context.clone()
                } else {
                    context.clone()
                };

                if let Some(sub_set) = &field.item.selection_set {
                    if let Some(return_type) = schema.make_type(&field_def.field_type).and_then(|t| t.to_concrete()) {
                        walk_selection_set(
                            sub_set,
                            return_type,
                            doc,
                            schema,
                            variables,
                            default_cost,
                            child_multiplier,
                            &child_context,
                            path,
                            total,
                        );
                    }
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item.as_str();
                if path.insert(name) {
                    if let Some(frag) = fragment_by_name(doc, name) {
                        if let Some(cond) = schema.concrete_type_by_name(&frag.type_condition.item) {
                            walk_selection_set(
                                &frag.selection_set,
                                cond,
                                doc,
                                schema,
                                variables,
                                default_cost,
                                multiplier,
                                context,
                                path,
                                total,
                            );
                        }
                    }
                    path.remove(name);
                }
            }
            Selection::InlineFragment(frag) => {
                let cond = frag
                    .item
                    .type_condition
                    .as_ref()
                    .and_then(|c| schema.concrete_type_by_name(&c.item))
                    .unwrap_or(scope);
                walk_selection_set(
                    &frag.item.selection_set,
                    cond,
                    doc,
                    schema,
                    variables,
                    default_cost,
                    multiplier,
                    context,
                    path,
                    total,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{spanned, Definition, Field as AstField, Operation, OperationType, Selection, Type};
    use crate::schema::meta::{Field, ObjectMeta};
    use crate::schema::SchemaBuilder;

    fn schema_with_list_field() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Item").field(Field::new("value", Type::Named("Int".into()))),
            ))
            .add_type(MetaType::Object(
                ObjectMeta::new("Query").field(
                    Field::new("items", Type::Named("Item".into()).wrap_list())
                        .cost(std::sync::Arc::new(|_, _| CostStep::new(1).with_multiplier(10))),
                ),
            ))
            .query_type("Query")
            .build()
    }

    fn query_with_selection(sub: Vec<Selection>) -> Document {
        let field = AstField {
            alias: None,
            name: spanned("items".into()),
            arguments: None,
            directives: None,
            selection_set: Some(sub),
        };
        vec![Definition::Operation(spanned(Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![Selection::Field(spanned(field))],
        }))]
    }

    #[test]
    fn multiplier_scales_child_cost() {
        let schema = schema_with_list_field();
        let value_field = Selection::Field(spanned(AstField {
            alias: None,
            name: spanned("value".into()),
            arguments: None,
            directives: None,
            selection_set: None,
        }));
        let doc = query_with_selection(vec![value_field]);
        let vars = serde_json::Map::new();
        let mut actual = 0;
        check_cost(&doc, &schema, None, &vars, -1, 1, Some(&mut actual));
        // items itself costs 1, each of its (up to 10x) children cost 1 * 10.
        assert_eq!(actual, 1 + 10);
    }

    #[test]
    fn exceeding_max_cost_is_an_error() {
        let schema = schema_with_list_field();
        let doc = query_with_selection(vec![]);
        let vars = serde_json::Map::new();
        assert!(check_cost(&doc, &schema, None, &vars, 0, 1, None).is_some());
        assert!(check_cost(&doc, &schema, None, &vars, 5, 1, None).is_none());
    }
}
