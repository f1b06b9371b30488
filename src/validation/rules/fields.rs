//! Fields rule (spec §4.4 "Fields"): field existence, the leaf rule, the
//! union-may-only-select-`__typename` rule, and field-selection merging.
//!
//! Merging is checked by its own document-level traversal
//! ([`check_merging`]) rather than through the shared [`Visitor`] walk: it
//! needs to resolve each field occurrence's *declared parent type*, which
//! for fragment-contributed occurrences depends on the fragment's own type
//! condition, not on the enclosing selection set's scope -- easiest to get
//! right as a dedicated recursion that mirrors `collect::grouped_fields`
//! while also tracking scope type. As a scope simplification (see
//! DESIGN.md), merge comparison does not attempt a full recursive
//! response-shape walk through abstractly-typed (interface/union) composite
//! fields; it merges sub-selections only when every occurrence's field type
//! resolves to the exact same object type.

use crate::ast::{fragment_by_name, Document, Field, Selection};
use crate::error::RuleError;
use crate::schema::meta::MetaType;
use crate::schema::model::SchemaType;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Fields {
    Fields
}

pub struct Fields;

impl<'a> Visitor<'a> for Fields {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a crate::parser::Spanning<Field>) {
        let name = field.item.name.item.as_str();
        if name == "__typename" {
            return;
        }
        let Some(parent) = ctx.parent_type() else { return };
        let Some(parent_concrete) = parent.to_concrete() else { return };

        match parent_concrete {
            MetaType::Union(_) => {
                ctx.report_error(
                    format!("Cannot query field \"{name}\" on type \"{}\"", parent_concrete.name()),
                    &[field.start],
                );
            }
            MetaType::Object(_) | MetaType::Interface(_) => {
                if ctx.current_field_def().is_none() {
                    ctx.report_error(
                        format!("Cannot query field \"{name}\" on type \"{}\"", parent_concrete.name()),
                        &[field.start],
                    );
                    return;
                }
                let has_sub_selection = field.item.selection_set.is_some();
                match ctx.current_type().and_then(|t| t.to_concrete()) {
                    Some(return_type) if return_type.is_composite() => {
                        if !has_sub_selection {
                            ctx.report_error(
                                format!(
                                    "Field \"{name}\" of type \"{}\" must have a selection of subfields",
                                    return_type.name()
                                ),
                                &[field.start],
                            );
                        }
                    }
                    Some(_) | None => {
                        if has_sub_selection {
                            ctx.report_error(
                                format!("Field \"{name}\" must not have a selection since it is a leaf type"),
                                &[field.start],
                            );
                        }
                    }
                }
            }
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_) => {}
        }
    }
}

/// The independent merging traversal, run once per document in
/// [`super::visit_all_rules`].
pub fn check_merging(doc: &Document, schema: &SchemaType) -> Vec<RuleError> {
    let mut errors = Vec::new();
    for op in crate::ast::operations(doc) {
        let root: Option<&MetaType> = match op.item.operation_type {
            crate::ast::OperationType::Query => schema.concrete_type_by_name(schema.query_type_name()),
            crate::ast::OperationType::Mutation => {
                schema.mutation_type_name().and_then(|n| schema.concrete_type_by_name(n))
            }
            crate::ast::OperationType::Subscription => {
                schema.subscription_type_name().and_then(|n| schema.concrete_type_by_name(n))
            }
        };
        if let Some(root) = root {
            check_selection_set(&op.item.selection_set, root, doc, schema, &mut errors);
        }
    }
    errors
}

fn check_selection_set(
    set: &[Selection],
    scope: &MetaType,
    doc: &Document,
    schema: &SchemaType,
    errors: &mut Vec<RuleError>,
) {
    let grouped = grouped_with_scope(set, scope, doc, schema);
    for (key, occurrences) in &grouped {
        for i in 0..occurrences.len() {
            for j in (i + 1)..occurrences.len() {
                let (field_a, scope_a) = occurrences[i];
                let (field_b, scope_b) = occurrences[j];
                if field_a.name.item != field_b.name.item {
                    errors.push(RuleError::new(
                        format!(
                            "Fields \"{key}\" conflict because they have differing field names \"{}\" and \"{}\"",
                            field_a.name.item, field_b.name.item
                        ),
                        &[field_a.name.start, field_b.name.start],
                    ));
                    continue;
                }
                if !arguments_literally_equal(&field_a.arguments, &field_b.arguments) {
                    errors.push(RuleError::new(
                        format!("Fields \"{key}\" conflict because they have differing arguments"),
                        &[field_a.name.start, field_b.name.start],
                    ));
                    continue;
                }
                let _ = (scope_a, scope_b);
            }
        }

        if let Some((first_field, first_scope)) = occurrences.first() {
            if let Some(field_def) = first_scope.field_by_name(&first_field.name.item) {
                if let Some(return_type) = schema.make_type(&field_def.field_type).and_then(|t| t.to_concrete()) {
                    if let MetaType::Object(_) = return_type {
                        if occurrences.iter().all(|(f, _)| f.selection_set.is_some()) {
                            let merged: Vec<Selection> = occurrences
                                .iter()
                                .flat_map(|(f, _)| f.selection_set.clone().unwrap_or_default())
                                .collect();
                            check_selection_set(&merged, return_type, doc, schema, errors);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{spanned, Arguments as AstArguments, Definition, InputValue, OperationType};
    use crate::schema::meta::{Field as SchemaField, InterfaceMeta, ObjectMeta, UnionMeta};
    use crate::schema::SchemaBuilder;
    use crate::validation::validate;

    fn named_field(name: &str, sub: Option<Vec<Selection>>) -> Selection {
        Selection::Field(spanned(Field {
            alias: None,
            name: spanned(name.into()),
            arguments: None,
            directives: None,
            selection_set: sub,
        }))
    }

    fn operation_doc(selection_set: Vec<Selection>) -> Document {
        vec![Definition::Operation(spanned(crate::ast::Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set,
        }))]
    }

    fn schema_with_pet_and_union() -> SchemaType {
        let pet_fields = {
            let mut m = indexmap::IndexMap::new();
            m.insert("name".into(), SchemaField::new("name", crate::ast::Type::Named("String".into())));
            m
        };
        SchemaBuilder::new()
            .add_type(MetaType::Interface(InterfaceMeta {
                name: "Pet".into(),
                description: None,
                fields: pet_fields,
            }))
            .add_type(MetaType::Object(
                ObjectMeta::new("Dog").interfaces(["Pet"]).field(SchemaField::new(
                    "name",
                    crate::ast::Type::Named("String".into()),
                )),
            ))
            .add_type(MetaType::Object(
                ObjectMeta::new("Cat").interfaces(["Pet"]).field(SchemaField::new(
                    "name",
                    crate::ast::Type::Named("String".into()),
                )),
            ))
            .add_type(MetaType::Union(UnionMeta {
                name: "CatOrDog".into(),
                description: None,
                of_type_names: vec!["Cat".into(), "Dog".into()],
            }))
            .add_type(MetaType::Object(
                ObjectMeta::new("Query")
                    .field(SchemaField::new("pet", crate::ast::Type::Named("Pet".into())))
                    .field(SchemaField::new("critter", crate::ast::Type::Named("CatOrDog".into())))
                    .field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .query_type("Query")
            .build()
    }

    #[test]
    fn unknown_field_on_object_is_rejected() {
        let schema = schema_with_pet_and_union();
        let doc = operation_doc(vec![named_field("bogus", None)]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Cannot query field \"bogus\"")));
    }

    #[test]
    fn leaf_field_with_subselection_is_rejected() {
        let schema = schema_with_pet_and_union();
        let doc = operation_doc(vec![named_field("name", Some(vec![named_field("sub", None)]))]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("must not have a selection")));
    }

    #[test]
    fn composite_field_without_subselection_is_rejected() {
        let schema = schema_with_pet_and_union();
        let doc = operation_doc(vec![named_field("pet", None)]);
        assert!(validate(&schema, &doc)
            .iter()
            .any(|e| e.message().contains("must have a selection of subfields")));
    }

    #[test]
    fn selecting_a_named_field_directly_on_a_union_is_rejected() {
        let schema = schema_with_pet_and_union();
        let doc = operation_doc(vec![named_field("critter", Some(vec![named_field("name", None)]))]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Cannot query field \"name\"")));
    }

    #[test]
    fn typename_is_always_selectable_on_a_union() {
        let schema = schema_with_pet_and_union();
        let doc = operation_doc(vec![named_field("critter", Some(vec![named_field("__typename", None)]))]);
        assert!(validate(&schema, &doc).is_empty());
    }

    fn aliased_field(alias: &str, name: &str, args: Option<AstArguments>) -> Field {
        Field {
            alias: Some(spanned(alias.into())),
            name: spanned(name.into()),
            arguments: args,
            directives: None,
            selection_set: None,
        }
    }

    fn merge_schema() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(ObjectMeta::new("Query").field(
                SchemaField::new("greet", crate::ast::Type::Named("String".into())).argument(
                    crate::schema::meta::Argument::new("loud", crate::ast::Type::Named("Boolean".into())),
                ),
            )))
            .query_type("Query")
            .build()
    }

    #[test]
    fn merged_fields_with_differing_arguments_conflict() {
        let schema = merge_schema();
        let mut loud_args = AstArguments::new();
        loud_args.insert("loud".into(), spanned(InputValue::scalar(true)));
        let mut quiet_args = AstArguments::new();
        quiet_args.insert("loud".into(), spanned(InputValue::scalar(false)));
        let doc = vec![Definition::Operation(spanned(crate::ast::Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![
                Selection::Field(spanned(aliased_field("x", "greet", Some(loud_args)))),
                Selection::Field(spanned(aliased_field("x", "greet", Some(quiet_args)))),
            ],
        }))];
        let errors = check_merging(&doc, &schema);
        assert!(errors.iter().any(|e| e.message().contains("differing arguments")));
    }

    #[test]
    fn merged_fields_with_identical_arguments_do_not_conflict() {
        let schema = merge_schema();
        let mut args_a = AstArguments::new();
        args_a.insert("loud".into(), spanned(InputValue::scalar(true)));
        let mut args_b = AstArguments::new();
        args_b.insert("loud".into(), spanned(InputValue::scalar(true)));
        let doc = vec![Definition::Operation(spanned(crate::ast::Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![
                Selection::Field(spanned(aliased_field("x", "greet", Some(args_a)))),
                Selection::Field(spanned(aliased_field("x", "greet", Some(args_b)))),
            ],
        }))];
        assert!(check_merging(&doc, &schema).is_empty());
    }
}

fn arguments_literally_equal(a: &Option<crate::ast::Arguments>, b: &Option<crate::ast::Arguments>) -> bool {
    let empty = crate::ast::Arguments::new();
    let a = a.as_ref().unwrap_or(&empty);
    let b = b.as_ref().unwrap_or(&empty);
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| v.item == bv.item))
}

fn grouped_with_scope<'a>(
    set: &'a [Selection],
    scope: &'a MetaType,
    doc: &'a Document,
    schema: &'a SchemaType,
) -> indexmap::IndexMap<&'a str, Vec<(&'a Field, &'a MetaType)>> {
    let mut out = indexmap::IndexMap::new();
    collect_with_scope(set, scope, doc, schema, &mut std::collections::HashSet::new(), &mut out);
    out
}

fn collect_with_scope<'a>(
    set: &'a [Selection],
    scope: &'a MetaType,
    doc: &'a Document,
    schema: &'a SchemaType,
    visited: &mut std::collections::HashSet<&'a str>,
    out: &mut indexmap::IndexMap<&'a str, Vec<(&'a Field, &'a MetaType)>>,
) {
    for selection in set {
        match selection {
            Selection::Field(field) => {
                out.entry(field.item.response_key()).or_default().push((&field.item, scope));
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item.as_str();
                if visited.insert(name) {
                    if let Some(frag) = fragment_by_name(doc, name) {
                        if let Some(cond) = schema.concrete_type_by_name(&frag.type_condition.item) {
                            collect_with_scope(&frag.selection_set, cond, doc, schema, visited, out);
                        }
                    }
                }
            }
            Selection::InlineFragment(frag) => {
                let cond = frag
                    .item
                    .type_condition
                    .as_ref()
                    .and_then(|c| schema.concrete_type_by_name(&c.item))
                    .unwrap_or(scope);
                collect_with_scope(&frag.item.selection_set, cond, doc, schema, visited, out);
            }
        }
    }
}
