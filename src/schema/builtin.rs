//! Built-in scalars and directives (spec §3 "Built-in scalars ... directives").

use std::sync::Arc;

use crate::ast::{InputValue, Type};
use crate::schema::meta::{Argument, Arguments, ScalarMeta};
use crate::schema::model::{DirectiveLocation, DirectiveType};
use crate::value::{ScalarValue, Value};

fn scalar(
    name: &'static str,
    coerce_literal: impl Fn(&InputValue, &indexmap::IndexMap<compact_str::CompactString, Value>) -> Result<Value, String>
        + 'static,
    coerce_variable: impl Fn(&serde_json::Value) -> Result<Value, String> + 'static,
    coerce_result: impl Fn(&Value) -> Result<Value, String> + 'static,
) -> ScalarMeta {
    ScalarMeta {
        name: name.into(),
        description: None,
        coerce_literal: Arc::new(coerce_literal),
        coerce_variable: Arc::new(coerce_variable),
        coerce_result: Arc::new(coerce_result),
    }
}

pub fn int_scalar() -> ScalarMeta {
    scalar(
        "Int",
        |v, _| match v {
            InputValue::Scalar(ScalarValue::Int(i)) => Ok(Value::scalar(*i)),
            other => Err(format!("Expected \"Int\", found {other:?}")),
        },
        |v| match v {
            serde_json::Value::Number(n) if n.is_i64() => {
                Ok(Value::scalar(n.as_i64().expect("checked is_i64")))
            }
            other => Err(format!("Expected an integer, found {other}")),
        },
        |v| match v.as_scalar() {
            Some(ScalarValue::Int(i)) => Ok(Value::scalar(*i)),
            other => Err(format!("Expected \"Int\", found {other:?}")),
        },
    )
}

pub fn float_scalar() -> ScalarMeta {
    scalar(
        "Float",
        |v, _| match v {
            InputValue::Scalar(ScalarValue::Float(f)) => Ok(Value::scalar(*f)),
            InputValue::Scalar(ScalarValue::Int(i)) => Ok(Value::scalar(*i as f64)),
            other => Err(format!("Expected \"Float\", found {other:?}")),
        },
        |v| match v.as_f64() {
            Some(f) => Ok(Value::scalar(f)),
            None => Err(format!("Expected a float, found {v}")),
        },
        |v| match v.as_scalar() {
            Some(ScalarValue::Float(f)) => Ok(Value::scalar(*f)),
            Some(ScalarValue::Int(i)) => Ok(Value::scalar(*i as f64)),
            other => Err(format!("Expected \"Float\", found {other:?}")),
        },
    )
}

pub fn string_scalar() -> ScalarMeta {
    scalar(
        "String",
        |v, _| match v {
            InputValue::Scalar(ScalarValue::String(s)) => Ok(Value::scalar(s.clone())),
            other => Err(format!("Expected \"String\", found {other:?}")),
        },
        |v| match v.as_str() {
            Some(s) => Ok(Value::scalar(s)),
            None => Err(format!("Expected a string, found {v}")),
        },
        |v| match v.as_scalar() {
            Some(ScalarValue::String(s)) => Ok(Value::scalar(s.clone())),
            other => Err(format!("Expected \"String\", found {other:?}")),
        },
    )
}

pub fn boolean_scalar() -> ScalarMeta {
    scalar(
        "Boolean",
        |v, _| match v {
            InputValue::Scalar(ScalarValue::Boolean(b)) => Ok(Value::scalar(*b)),
            other => Err(format!("Expected \"Boolean\", found {other:?}")),
        },
        |v| match v.as_bool() {
            Some(b) => Ok(Value::scalar(b)),
            None => Err(format!("Expected a boolean, found {v}")),
        },
        |v| match v.as_scalar() {
            Some(ScalarValue::Boolean(b)) => Ok(Value::scalar(*b)),
            other => Err(format!("Expected \"Boolean\", found {other:?}")),
        },
    )
}

/// `ID` accepts either a string or integer literal/variable, always
/// represented internally as a string, matching the GraphQL spec.
pub fn id_scalar() -> ScalarMeta {
    scalar(
        "ID",
        |v, _| match v {
            InputValue::Scalar(ScalarValue::String(s)) => Ok(Value::scalar(s.clone())),
            InputValue::Scalar(ScalarValue::Int(i)) => Ok(Value::scalar(i.to_string())),
            other => Err(format!("Expected \"ID\", found {other:?}")),
        },
        |v| match v {
            serde_json::Value::String(s) => Ok(Value::scalar(s.as_str())),
            serde_json::Value::Number(n) => Ok(Value::scalar(n.to_string())),
            other => Err(format!("Expected an ID, found {other}")),
        },
        |v| match v.as_scalar() {
            Some(ScalarValue::String(s)) => Ok(Value::scalar(s.clone())),
            Some(ScalarValue::Int(i)) => Ok(Value::scalar(i.to_string())),
            other => Err(format!("Expected \"ID\", found {other:?}")),
        },
    )
}

pub fn skip_directive() -> DirectiveType {
    let mut arguments = Arguments::new();
    arguments.insert(
        "if".into(),
        Argument::new("if", Type::Named("Boolean".into()).wrap_non_null()),
    );
    DirectiveType {
        name: "skip".into(),
        description: Some("Skips this field or fragment when the `if` argument is true.".into()),
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
        arguments,
        field_collection_filter: Some(Arc::new(|args| {
            !matches!(args.get("if").and_then(Value::as_scalar), Some(ScalarValue::Boolean(true)))
        })),
    }
}

pub fn include_directive() -> DirectiveType {
    let mut arguments = Arguments::new();
    arguments.insert(
        "if".into(),
        Argument::new("if", Type::Named("Boolean".into()).wrap_non_null()),
    );
    DirectiveType {
        name: "include".into(),
        description: Some("Includes this field or fragment only when the `if` argument is true.".into()),
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
        arguments,
        field_collection_filter: Some(Arc::new(|args| {
            matches!(args.get("if").and_then(Value::as_scalar), Some(ScalarValue::Boolean(true)))
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn int_scalar_rejects_a_string_literal() {
        let scalar = int_scalar();
        let vars = IndexMap::new();
        let literal = InputValue::scalar("not an int");
        assert!((scalar.coerce_literal)(&literal, &vars).is_err());
    }

    #[test]
    fn int_scalar_accepts_an_int_literal() {
        let scalar = int_scalar();
        let vars = IndexMap::new();
        let literal = InputValue::scalar(7i64);
        assert_eq!((scalar.coerce_literal)(&literal, &vars).unwrap(), Value::scalar(7i64));
    }

    #[test]
    fn id_scalar_accepts_both_string_and_integer_variables() {
        let scalar = id_scalar();
        assert_eq!(
            (scalar.coerce_variable)(&serde_json::json!("abc")).unwrap(),
            Value::scalar("abc")
        );
        assert_eq!(
            (scalar.coerce_variable)(&serde_json::json!(42)).unwrap(),
            Value::scalar("42")
        );
    }

    #[test]
    fn float_scalar_result_coercion_widens_an_integer_resolver_output() {
        let scalar = float_scalar();
        let result = (scalar.coerce_result)(&Value::scalar(3i64)).unwrap();
        assert_eq!(result, Value::scalar(3.0));
    }

    #[test]
    fn skip_directive_filters_out_the_field_only_when_if_is_true() {
        let directive = skip_directive();
        let filter = directive.field_collection_filter.unwrap();
        let mut args = IndexMap::new();
        args.insert("if".into(), Value::scalar(true));
        assert!(!filter(&args));
        args.insert("if".into(), Value::scalar(false));
        assert!(filter(&args));
    }

    #[test]
    fn include_directive_keeps_the_field_only_when_if_is_true() {
        let directive = include_directive();
        let filter = directive.field_collection_filter.unwrap();
        let mut args = IndexMap::new();
        args.insert("if".into(), Value::scalar(true));
        assert!(filter(&args));
        args.insert("if".into(), Value::scalar(false));
        assert!(!filter(&args));
    }
}
