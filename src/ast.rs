//! The query AST: the output of the (out-of-scope) parser and the input to
//! [`crate::typeinfo`], [`crate::validation`] and [`crate::executor`].
//!
//! Shaped after the upstream `juniper` crate's `ast` module (the same
//! `Definition`/`Operation`/`Fragment`/`Selection`/`Field`/`Directive` split,
//! the same [`Type`] wrapper hierarchy), monomorphized to a single built-in
//! [`ScalarValue`] representation since custom scalar value representations
//! are not part of this crate's scope.

use std::fmt;

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::parser::{SourcePosition, Spanning};
use crate::value::ScalarValue;

/// A GraphQL named type, optionally wrapped in `NonNull`/`List`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Named(CompactString),
    List(Box<Type>, Option<usize>),
    NonNull(Box<Type>),
}

impl Type {
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(name) => name,
            Type::List(inner, _) | Type::NonNull(inner) => inner.innermost_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            Type::List(..) => true,
            Type::NonNull(inner) => inner.is_list(),
            Type::Named(_) => false,
        }
    }

    /// Strips one `NonNull` wrapper, if present. GraphQL types never doubly
    /// wrap non-null, so this is the inverse of `wrap_non_null`.
    pub fn into_nullable(self) -> Type {
        match self {
            Type::NonNull(inner) => *inner,
            other => other,
        }
    }

    pub fn wrap_non_null(self) -> Type {
        Type::NonNull(Box::new(self))
    }

    pub fn wrap_list(self) -> Type {
        Type::List(Box::new(self), None)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{n}"),
            Type::List(inner, _) => write!(f, "[{inner}]"),
            Type::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// A query literal value, as written in source text (as opposed to
/// [`crate::value::Value`], which is a resolved response value).
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Scalar(ScalarValue),
    Enum(CompactString),
    Variable(CompactString),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<CompactString>, Spanning<InputValue>)>),
}

impl InputValue {
    pub fn null() -> Self {
        InputValue::Null
    }

    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        InputValue::Scalar(v.into())
    }

    pub fn enum_value(name: impl Into<CompactString>) -> Self {
        InputValue::Enum(name.into())
    }

    pub fn variable(name: impl Into<CompactString>) -> Self {
        InputValue::Variable(name.into())
    }

    pub fn list(v: Vec<Spanning<InputValue>>) -> Self {
        InputValue::List(v)
    }

    pub fn object(v: Vec<(Spanning<CompactString>, Spanning<InputValue>)>) -> Self {
        InputValue::Object(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, InputValue::Variable(_))
    }

    pub fn as_variable_name(&self) -> Option<&str> {
        match self {
            InputValue::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Every variable referenced anywhere inside this literal, including
    /// nested list/object positions. Used by the variables-usage rule.
    pub fn referenced_variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_referenced_variables(&mut out);
        out
    }

    fn collect_referenced_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            InputValue::Variable(name) => out.push(name),
            InputValue::List(items) => {
                for item in items {
                    item.item.collect_referenced_variables(out);
                }
            }
            InputValue::Object(fields) => {
                for (_, value) in fields {
                    value.item.collect_referenced_variables(out);
                }
            }
            InputValue::Null | InputValue::Scalar(_) | InputValue::Enum(_) => {}
        }
    }
}

pub type Arguments = IndexMap<CompactString, Spanning<InputValue>>;

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    pub var_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
}

pub type VariableDefinitions = Vec<(Spanning<CompactString>, VariableDefinition)>;

#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub name: Spanning<CompactString>,
    pub arguments: Option<Arguments>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub alias: Option<Spanning<CompactString>>,
    pub name: Spanning<CompactString>,
    pub arguments: Option<Arguments>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Option<Vec<Selection>>,
}

impl Field {
    /// The alias if present, otherwise the field name: the key it
    /// contributes under in the response map.
    pub fn response_key(&self) -> &str {
        self.alias
            .as_ref()
            .map(|a| a.item.as_str())
            .unwrap_or(&self.name.item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    pub name: Spanning<CompactString>,
    pub directives: Option<Vec<Spanning<Directive>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<Spanning<CompactString>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Spanning<CompactString>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub name: Spanning<CompactString>,
    pub type_condition: Spanning<CompactString>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Operation(Spanning<Operation>),
    Fragment(Spanning<Fragment>),
}

pub type Document = Vec<Definition>;

/// Every operation definition in a document, in source order.
pub fn operations(doc: &Document) -> impl Iterator<Item = &Spanning<Operation>> {
    doc.iter().filter_map(|def| match def {
        Definition::Operation(op) => Some(op),
        Definition::Fragment(_) => None,
    })
}

/// Every fragment definition in a document, in source order.
pub fn fragments(doc: &Document) -> impl Iterator<Item = &Spanning<Fragment>> {
    doc.iter().filter_map(|def| match def {
        Definition::Fragment(frag) => Some(frag),
        Definition::Operation(_) => None,
    })
}

pub fn fragment_by_name<'a>(doc: &'a Document, name: &str) -> Option<&'a Fragment> {
    fragments(doc).find(|f| f.item.name.item == name).map(|f| &f.item)
}

/// Convenience for building spans in hand-written test ASTs: a zero-width
/// span at the origin. Real positions only matter for error-location
/// assertions, which build spans explicitly.
pub fn dummy_pos() -> SourcePosition {
    SourcePosition::new(0, 0, 0)
}

pub fn spanned<T>(item: T) -> Spanning<T> {
    Spanning::zero_width(dummy_pos(), item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_innermost_name_strips_every_wrapper() {
        let t = Type::Named("Int".into()).wrap_list().wrap_non_null().wrap_list();
        assert_eq!(t.innermost_name(), "Int");
        assert!(t.is_list());
        assert!(!t.is_non_null());
    }

    #[test]
    fn into_nullable_strips_exactly_one_non_null_wrapper() {
        let t = Type::Named("Int".into()).wrap_non_null();
        assert_eq!(t.into_nullable(), Type::Named("Int".into()));
    }

    #[test]
    fn field_response_key_prefers_alias_over_name() {
        let aliased = Field {
            alias: Some(spanned("a".into())),
            name: spanned("field".into()),
            arguments: None,
            directives: None,
            selection_set: None,
        };
        assert_eq!(aliased.response_key(), "a");

        let plain = Field {
            alias: None,
            name: spanned("field".into()),
            arguments: None,
            directives: None,
            selection_set: None,
        };
        assert_eq!(plain.response_key(), "field");
    }

    #[test]
    fn input_value_referenced_variables_recurses_into_lists_and_objects() {
        let value = InputValue::list(vec![
            spanned(InputValue::variable("a")),
            spanned(InputValue::object(vec![(spanned("k".into()), spanned(InputValue::variable("b")))])),
        ]);
        let mut names = value.referenced_variables();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn operations_and_fragments_split_a_document_by_definition_kind() {
        let op = Definition::Operation(spanned(Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: Vec::new(),
        }));
        let frag = Definition::Fragment(spanned(Fragment {
            name: spanned("F".into()),
            type_condition: spanned("Query".into()),
            directives: None,
            selection_set: Vec::new(),
        }));
        let doc: Document = vec![op, frag];
        assert_eq!(operations(&doc).count(), 1);
        assert_eq!(fragments(&doc).count(), 1);
        assert!(fragment_by_name(&doc, "F").is_some());
        assert!(fragment_by_name(&doc, "G").is_none());
    }
}
