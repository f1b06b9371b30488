//! Variable and argument coercion (spec §4.5), shared unchanged between the
//! validator's Values/Variables rules and the executor's argument-resolution
//! step -- mirroring how the teacher shares `ast::InputValue::into_const` /
//! parser-document conversion helpers between `validation::input_value` and
//! `executor`.

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::ast::{self, InputValue, Type as AstType};
use crate::schema::meta::MetaType;
use crate::schema::model::SchemaType;
use crate::value::{Object, Value};

pub type Variables = IndexMap<CompactString, Value>;

/// Coerces a query literal against `expected`, substituting already-coerced
/// variable values for any `Variable` leaves found inside it (including
/// nested inside lists/objects).
pub fn coerce_literal(
    input: &InputValue,
    expected: &AstType,
    schema: &SchemaType,
    variables: &Variables,
) -> Result<Value, String> {
    if let InputValue::Variable(name) = input {
        return match variables.get(name.as_str()) {
            Some(v) => {
                if v.is_null() && expected.is_non_null() {
                    Err(format!("Variable \"${name}\" of required type was not provided"))
                } else {
                    Ok(v.clone())
                }
            }
            None => Ok(Value::Null),
        };
    }

    match expected {
        AstType::NonNull(inner) => {
            if input.is_null() {
                Err(format!("Expected non-null value, found null"))
            } else {
                coerce_literal(input, inner, schema, variables)
            }
        }
        AstType::List(inner, _) => {
            if input.is_null() {
                return Ok(Value::Null);
            }
            match input {
                InputValue::List(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(coerce_literal(&item.item, inner, schema, variables)?);
                    }
                    Ok(Value::List(out))
                }
                // Item-to-list coercion: a single non-list literal coerces to
                // a one-element list, but only at this (outermost) level --
                // the recursive call uses `inner`, so a nested list literal
                // is never re-wrapped.
                other => Ok(Value::List(vec![coerce_literal(other, inner, schema, variables)?])),
            }
        }
        AstType::Named(name) => {
            if input.is_null() {
                return Ok(Value::Null);
            }
            let meta = schema
                .concrete_type_by_name(name)
                .ok_or_else(|| format!("Unknown type \"{name}\""))?;
            coerce_named_literal(input, meta, schema, variables)
        }
    }
}

fn coerce_named_literal(
    input: &InputValue,
    meta: &MetaType,
    schema: &SchemaType,
    variables: &Variables,
) -> Result<Value, String> {
    match meta {
        MetaType::Scalar(scalar) => (scalar.coerce_literal)(input, variables),
        MetaType::Enum(e) => match input {
            InputValue::Enum(name) => {
                if e.values.iter().any(|v| v.name == *name) {
                    Ok(Value::scalar(name.as_str()))
                } else {
                    Err(format!("Value \"{name}\" is not a valid value for enum \"{}\"", e.name))
                }
            }
            other => Err(format!("Expected enum value, found {other:?}")),
        },
        MetaType::InputObject(obj) => match input {
            InputValue::Object(fields) => {
                let mut seen = std::collections::HashSet::new();
                let mut out = Object::new();
                for (key, value) in fields {
                    if !seen.insert(key.item.as_str()) {
                        return Err(format!("Duplicate field \"{}\"", key.item));
                    }
                    let field_def = obj
                        .input_fields
                        .get(key.item.as_str())
                        .ok_or_else(|| format!("Unknown field \"{}\" on \"{}\"", key.item, obj.name))?;
                    let coerced = coerce_literal(&value.item, &field_def.arg_type, schema, variables)?;
                    out.add_field(key.item.to_string(), coerced);
                }
                for (name, field_def) in &obj.input_fields {
                    if !out.contains_field(name) {
                        if field_def.arg_type.is_non_null() && field_def.default_value.is_none() {
                            return Err(format!("Field \"{name}\" of required type not provided"));
                        }
                        if let Some(default) = &field_def.default_value {
                            let coerced = coerce_literal(default, &field_def.arg_type, schema, variables)?;
                            out.add_field(name.to_string(), coerced);
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            other => Err(format!("Expected input object, found {other:?}")),
        },
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => {
            Err(format!("\"{}\" is not an input type", meta.name()))
        }
    }
}

/// Coerces a raw JSON-shaped variable value against `expected`.
pub fn coerce_variable_value(
    raw: &serde_json::Value,
    expected: &AstType,
    schema: &SchemaType,
) -> Result<Value, String> {
    if raw.is_null() {
        return if expected.is_non_null() {
            Err("Expected non-null value, found null".to_string())
        } else {
            Ok(Value::Null)
        };
    }

    match expected {
        AstType::NonNull(inner) => coerce_variable_value(raw, inner, schema),
        AstType::List(inner, _) => match raw {
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(coerce_variable_value(item, inner, schema)?);
                }
                Ok(Value::List(out))
            }
            other => Ok(Value::List(vec![coerce_variable_value(other, inner, schema)?])),
        },
        AstType::Named(name) => {
            let meta = schema
                .concrete_type_by_name(name)
                .ok_or_else(|| format!("Unknown type \"{name}\""))?;
            coerce_named_variable(raw, meta, schema)
        }
    }
}

fn coerce_named_variable(
    raw: &serde_json::Value,
    meta: &MetaType,
    schema: &SchemaType,
) -> Result<Value, String> {
    match meta {
        MetaType::Scalar(scalar) => (scalar.coerce_variable)(raw),
        MetaType::Enum(e) => match raw.as_str() {
            Some(name) if e.values.iter().any(|v| v.name == name) => Ok(Value::scalar(name)),
            _ => Err(format!("Invalid enum value for \"{}\"", e.name)),
        },
        MetaType::InputObject(obj) => match raw.as_object() {
            Some(fields) => {
                let mut out = Object::new();
                for (key, value) in fields {
                    let field_def = obj
                        .input_fields
                        .get(key.as_str())
                        .ok_or_else(|| format!("Unknown field \"{key}\" on \"{}\"", obj.name))?;
                    out.add_field(key.clone(), coerce_variable_value(value, &field_def.arg_type, schema)?);
                }
                for (name, field_def) in &obj.input_fields {
                    if !out.contains_field(name) {
                        if field_def.arg_type.is_non_null() && field_def.default_value.is_none() {
                            return Err(format!("Field \"{name}\" of required type not provided"));
                        }
                        if let Some(default) = &field_def.default_value {
                            let empty = Variables::new();
                            out.add_field(name.to_string(), coerce_literal(default, &field_def.arg_type, schema, &empty)?);
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            None => Err(format!("Expected input object \"{}\"", obj.name)),
        },
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => {
            Err(format!("\"{}\" is not an input type", meta.name()))
        }
    }
}

/// Coerces every variable definition on an operation against raw JSON input,
/// per spec §4.5 "Variable coercion".
pub fn coerce_variable_definitions(
    definitions: &ast::VariableDefinitions,
    raw_variables: &serde_json::Map<String, serde_json::Value>,
    schema: &SchemaType,
) -> Result<Variables, Vec<String>> {
    let mut out = Variables::new();
    let mut errors = Vec::new();
    for (name, def) in definitions {
        let name = name.item.as_str();
        match raw_variables.get(name) {
            Some(raw) => match coerce_variable_value(raw, &def.var_type.item, schema) {
                Ok(v) => {
                    out.insert(name.into(), v);
                }
                Err(e) => errors.push(format!("Variable \"${name}\": {e}")),
            },
            None => match &def.default_value {
                Some(default) => match coerce_literal(&default.item, &def.var_type.item, schema, &out) {
                    Ok(v) => {
                        out.insert(name.into(), v);
                    }
                    Err(e) => errors.push(format!("Variable \"${name}\": {e}")),
                },
                None => {
                    if def.var_type.item.is_non_null() {
                        errors.push(format!("Variable \"${name}\" of required type was not provided"));
                    } else {
                        out.insert(name.into(), Value::Null);
                    }
                }
            },
        }
    }
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// Coerces the supplied literal/variable arguments on a field or directive
/// against its declared argument definitions, per spec §4.5 "Argument
/// coercion".
pub fn coerce_argument_values(
    defs: &crate::schema::meta::Arguments,
    supplied: Option<&ast::Arguments>,
    schema: &SchemaType,
    variables: &Variables,
) -> Result<Variables, Vec<String>> {
    let mut out = Variables::new();
    let mut errors = Vec::new();
    for (name, def) in defs {
        let literal = supplied.and_then(|args| args.get(name.as_str()));
        match literal {
            Some(spanning) => match coerce_literal(&spanning.item, &def.arg_type, schema, variables) {
                Ok(v) => {
                    out.insert(name.clone(), v);
                }
                Err(e) => errors.push(format!("Argument \"{name}\": {e}")),
            },
            None => match &def.default_value {
                Some(default) => match coerce_literal(default, &def.arg_type, schema, variables) {
                    Ok(v) => {
                        out.insert(name.clone(), v);
                    }
                    Err(e) => errors.push(format!("Argument \"{name}\": {e}")),
                },
                None => {
                    if def.arg_type.is_non_null() {
                        errors.push(format!("Argument \"{name}\" of required type was not provided"));
                    }
                }
            },
        }
    }
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}
