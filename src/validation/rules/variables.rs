//! Variables rule (spec §4.4 "Variables"): name uniqueness within an
//! operation, declared type resolvability, declared-iff-used (scanning the
//! operation and every transitively spread fragment), and per-use
//! type-compatibility.
//!
//! Like [`super::fields::check_merging`], this runs as its own document-level
//! traversal rather than through the shared [`crate::validation::visitor::Visitor`]
//! walk: it needs each variable use's *expected type and default*, which
//! depends on the field/directive argument definition at that exact call
//! site -- information the shared walk's `enter_argument` callback does not
//! carry.

use std::collections::{HashMap, HashSet};

use crate::ast::{self, fragment_by_name, Document, InputValue, Operation, Selection, Type as AstType};
use crate::error::RuleError;
use crate::parser::SourcePosition;
use crate::schema::meta::{Arguments as SchemaArguments, MetaType};
use crate::schema::model::SchemaType;

pub fn check(doc: &Document, schema: &SchemaType) -> Vec<RuleError> {
    let mut errors = Vec::new();
    for op in ast::operations(doc) {
        check_operation(&op.item, doc, schema, &mut errors);
    }
    errors
}

fn check_operation(op: &Operation, doc: &Document, schema: &SchemaType, errors: &mut Vec<RuleError>) {
    let op_name = op.name.as_ref().map(|n| n.item.as_str());

    let mut declared: HashMap<&str, (&AstType, Option<&InputValue>)> = HashMap::new();
    if let Some(defs) = &op.variable_definitions {
        let mut seen = HashSet::new();
        for (name, def) in &defs.item {
            let name_str = name.item.as_str();
            if !seen.insert(name_str) {
                errors.push(RuleError::new(
                    format!("There can only be one variable named \"${name_str}\""),
                    &[name.start],
                ));
                continue;
            }
            if !is_resolvable_input_type(&def.var_type.item, schema) {
                errors.push(RuleError::new(
                    format!("Variable \"${name_str}\" cannot be of non-input type \"{}\"", def.var_type.item),
                    &[def.var_type.start],
                ));
            }
            declared.insert(name_str, (&def.var_type.item, def.default_value.as_ref().map(|d| &d.item)));
        }
    }

    let root = match op.operation_type {
        ast::OperationType::Query => schema.concrete_type_by_name(schema.query_type_name()),
        ast::OperationType::Mutation => schema.mutation_type_name().and_then(|n| schema.concrete_type_by_name(n)),
        ast::OperationType::Subscription => {
            schema.subscription_type_name().and_then(|n| schema.concrete_type_by_name(n))
        }
    };

    let mut uses: Vec<(&str, SourcePosition, AstType, Option<InputValue>)> = Vec::new();
    let mut visited = HashSet::new();
    if let Some(directives) = &op.directives {
        scan_directive_list(directives, schema, &mut uses);
    }
    if let Some(root) = root {
        walk_selection_set(&op.selection_set, root, doc, schema, &mut visited, &mut uses);
    }

    let mut used_names: HashSet<&str> = HashSet::new();
    for (name, pos, _, _) in &uses {
        used_names.insert(name);
        if !declared.contains_key(name) {
            errors.push(RuleError::new(
                match op_name {
                    Some(op_name) => format!("Variable \"${name}\" is not defined by operation \"{op_name}\""),
                    None => format!("Variable \"${name}\" is not defined"),
                },
                &[*pos],
            ));
        }
    }

    for name in declared.keys() {
        if !used_names.contains(name) {
            errors.push(RuleError::new(
                match op_name {
                    Some(op_name) => format!("Variable \"${name}\" is never used in operation \"{op_name}\""),
                    None => format!("Variable \"${name}\" is never used"),
                },
                &[],
            ));
        }
    }

    for (name, pos, use_type, use_default) in &uses {
        let Some((var_type, var_default)) = declared.get(name) else { continue };
        if !is_variable_usage_allowed(var_type, *var_default, use_type, use_default.as_ref(), schema) {
            errors.push(RuleError::new(
                format!("Variable \"${name}\" of type \"{var_type}\" used in position expecting type \"{use_type}\""),
                &[*pos],
            ));
        }
    }
}

fn is_resolvable_input_type(t: &AstType, schema: &SchemaType) -> bool {
    schema.concrete_type_by_name(t.innermost_name()).is_some_and(MetaType::is_input)
}

/// [`SchemaType::is_subtype`] already implements the non-null/list/named
/// structural comparison this needs; only the default-value special case
/// (a non-null use-site accepting a nullable variable backed by a default)
/// is layered on top here.
fn is_variable_usage_allowed(
    var_type: &AstType,
    var_default: Option<&InputValue>,
    use_type: &AstType,
    use_default: Option<&InputValue>,
    schema: &SchemaType,
) -> bool {
    if use_type.is_non_null() && !var_type.is_non_null() {
        let has_non_null_var_default = matches!(var_default, Some(v) if !v.is_null());
        let has_use_default = use_default.is_some();
        if !has_non_null_var_default && !has_use_default {
            return false;
        }
        if let AstType::NonNull(inner) = use_type {
            return schema.is_subtype(var_type, inner);
        }
    }
    schema.is_subtype(var_type, use_type)
}

fn walk_selection_set<'a>(
    set: &'a [Selection],
    scope: &'a MetaType,
    doc: &'a Document,
    schema: &'a SchemaType,
    visited: &mut HashSet<&'a str>,
    uses: &mut Vec<(&'a str, SourcePosition, AstType, Option<InputValue>)>,
) {
    for selection in set {
        match selection {
            Selection::Field(field) => {
                if let Some(directives) = &field.item.directives {
                    scan_directive_list(directives, schema, uses);
                }
                let field_def = if field.item.name.item == "__typename" {
                    None
                } else {
                    scope.field_by_name(&field.item.name.item)
                };
                if let Some(field_def) = field_def {
                    scan_arguments(field.item.arguments.as_ref(), &field_def.arguments, schema, uses);
                    if let Some(sub_set) = &field.item.selection_set {
                        if let Some(return_type) = schema.make_type(&field_def.field_type).and_then(|t| t.to_concrete())
                        {
                            walk_selection_set(sub_set, return_type, doc, schema, visited, uses);
                        }
                    }
                }
            }
            Selection::FragmentSpread(spread) => {
                if let Some(directives) = &spread.item.directives {
                    scan_directive_list(directives, schema, uses);
                }
                let name = spread.item.name.item.as_str();
                if visited.insert(name) {
                    if let Some(frag) = fragment_by_name(doc, name) {
                        if let Some(cond) = schema.concrete_type_by_name(&frag.type_condition.item) {
                            walk_selection_set(&frag.selection_set, cond, doc, schema, visited, uses);
                        }
                    }
                }
            }
            Selection::InlineFragment(frag) => {
                if let Some(directives) = &frag.item.directives {
                    scan_directive_list(directives, schema, uses);
                }
                let cond = frag
                    .item
                    .type_condition
                    .as_ref()
                    .and_then(|c| schema.concrete_type_by_name(&c.item))
                    .unwrap_or(scope);
                walk_selection_set(&frag.item.selection_set, cond, doc, schema, visited, uses);
            }
        }
    }
}

fn scan_directive_list<'a>(
    directives: &'a [crate::parser::Spanning<ast::Directive>],
    schema: &'a SchemaType,
    uses: &mut Vec<(&'a str, SourcePosition, AstType, Option<InputValue>)>,
) {
    for directive in directives {
        let Some(def) = schema.directive_by_name(&directive.item.name.item) else { continue };
        scan_arguments(directive.item.arguments.as_ref(), &def.arguments, schema, uses);
    }
}

fn scan_arguments<'a>(
    supplied: Option<&'a ast::Arguments>,
    defs: &'a SchemaArguments,
    _schema: &SchemaType,
    uses: &mut Vec<(&'a str, SourcePosition, AstType, Option<InputValue>)>,
) {
    let Some(supplied) = supplied else { return };
    for (name, value) in supplied {
        let Some(def) = defs.get(name.as_str()) else { continue };
        collect_variable_uses(&value.item, value.start, &def.arg_type, def.default_value.as_ref(), uses);
    }
}

/// Records every `$var` leaf found inside `value`, each tagged with the
/// *expected type at that exact position* -- which for list/object literals
/// differs from the argument's own declared type.
fn collect_variable_uses<'a>(
    value: &'a InputValue,
    pos: SourcePosition,
    expected: &AstType,
    default: Option<&'a InputValue>,
    uses: &mut Vec<(&'a str, SourcePosition, AstType, Option<InputValue>)>,
) {
    match value {
        InputValue::Variable(name) => {
            uses.push((name.as_str(), pos, expected.clone(), default.cloned()));
        }
        InputValue::List(items) => {
            let inner = match expected {
                AstType::List(inner, _) => inner.as_ref().clone(),
                AstType::NonNull(boxed) if matches!(boxed.as_ref(), AstType::List(..)) => match boxed.as_ref() {
                    AstType::List(inner, _) => inner.as_ref().clone(),
                    _ => unreachable!(),
                },
                other => other.clone(),
            };
            for item in items {
                collect_variable_uses(&item.item, item.start, &inner, None, uses);
            }
        }
        InputValue::Object(fields) => {
            for (_, v) in fields {
                collect_variable_uses(&v.item, v.start, expected, None, uses);
            }
        }
        InputValue::Null | InputValue::Scalar(_) | InputValue::Enum(_) => {}
    }
}
