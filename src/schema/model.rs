//! The schema model: type registry, directive registry, and the subtyping /
//! possible-type predicates the validator and executor both depend on.
//!
//! Grounded in `juniper`'s `schema::model::SchemaType` -- in particular
//! `type_overlap`, `possible_types`, `is_subtype` and `is_named_subtype` are
//! carried over near-verbatim, since they directly implement the spec's
//! `IsSubTypeOf`/`IsSameType` predicates and the fragment-spread
//! type-intersection rule.

use std::collections::HashMap;
use std::fmt;

use compact_str::CompactString;

use crate::ast::Type as AstType;
use crate::schema::meta::MetaType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectiveLocation::Query => "query",
            DirectiveLocation::Mutation => "mutation",
            DirectiveLocation::Subscription => "subscription",
            DirectiveLocation::Field => "field",
            DirectiveLocation::FragmentDefinition => "fragment definition",
            DirectiveLocation::FragmentSpread => "fragment spread",
            DirectiveLocation::InlineFragment => "inline fragment",
        })
    }
}

/// Evaluates a directive's coerced arguments to decide whether the selection
/// it annotates should be included in field collection (spec §4.6 step 1).
/// `@skip`/`@include` are the only built-in directives that carry one.
pub type FieldCollectionFilter =
    std::sync::Arc<dyn Fn(&indexmap::IndexMap<CompactString, crate::value::Value>) -> bool>;

#[derive(Clone)]
pub struct DirectiveType {
    pub name: CompactString,
    pub description: Option<String>,
    pub locations: Vec<DirectiveLocation>,
    pub arguments: crate::schema::meta::Arguments,
    pub field_collection_filter: Option<FieldCollectionFilter>,
}

impl fmt::Debug for DirectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveType")
            .field("name", &self.name)
            .field("locations", &self.locations)
            .finish_non_exhaustive()
    }
}

/// A resolved schema type: either a concrete [`MetaType`] or a structural
/// `NonNull`/`List` wrapper around one.
#[derive(Clone, Debug)]
pub enum TypeType<'a> {
    Concrete(&'a MetaType),
    NonNull(Box<TypeType<'a>>),
    List(Box<TypeType<'a>>),
}

impl<'a> TypeType<'a> {
    pub fn to_concrete(&self) -> Option<&'a MetaType> {
        match self {
            TypeType::Concrete(t) => Some(t),
            TypeType::NonNull(inner) | TypeType::List(inner) => inner.to_concrete(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeType::NonNull(_))
    }

    pub fn innermost_name(&self) -> &'a str {
        match self {
            TypeType::Concrete(t) => t.name(),
            TypeType::NonNull(inner) | TypeType::List(inner) => inner.innermost_name(),
        }
    }
}

impl fmt::Display for TypeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeType::Concrete(t) => write!(f, "{}", t.name()),
            TypeType::List(inner) => write!(f, "[{inner}]"),
            TypeType::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// The schema: a type registry, root operation type names, and a directive
/// registry. This is the concrete reference implementation of the external
/// "Schema object" contract (spec §3 / §3A).
#[derive(Debug)]
pub struct SchemaType {
    types: HashMap<CompactString, MetaType>,
    query_type_name: CompactString,
    mutation_type_name: Option<CompactString>,
    subscription_type_name: Option<CompactString>,
    directives: HashMap<CompactString, DirectiveType>,
}

impl SchemaType {
    pub fn new(
        types: HashMap<CompactString, MetaType>,
        query_type_name: impl Into<CompactString>,
        mutation_type_name: Option<CompactString>,
        subscription_type_name: Option<CompactString>,
    ) -> Self {
        let mut schema = SchemaType {
            types,
            query_type_name: query_type_name.into(),
            mutation_type_name,
            subscription_type_name,
            directives: HashMap::new(),
        };
        schema.add_directive(crate::schema::builtin::skip_directive());
        schema.add_directive(crate::schema::builtin::include_directive());
        schema
    }

    pub fn add_directive(&mut self, directive: DirectiveType) {
        self.directives.insert(directive.name.clone(), directive);
    }

    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    pub fn type_list(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type_name
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type_name.as_deref()
    }

    pub fn subscription_type_name(&self) -> Option<&str> {
        self.subscription_type_name.as_deref()
    }

    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    pub fn directive_list(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directives.values()
    }

    /// Resolves an AST type (possibly `NonNull`/`List`-wrapped) against the
    /// type registry, recursing through wrappers. `None` if the named type
    /// is unknown.
    pub fn make_type(&self, ast_type: &AstType) -> Option<TypeType<'_>> {
        match ast_type {
            AstType::Named(name) => self.concrete_type_by_name(name).map(TypeType::Concrete),
            AstType::List(inner, _) => self.make_type(inner).map(|t| TypeType::List(Box::new(t))),
            AstType::NonNull(inner) => self.make_type(inner).map(|t| TypeType::NonNull(Box::new(t))),
        }
    }

    /// Every concrete object type that could satisfy an abstract type.
    /// Panics if `abstract_type` is not itself abstract (interface/union).
    pub fn possible_types(&self, abstract_type: &MetaType) -> Vec<&MetaType> {
        match abstract_type {
            MetaType::Union(u) => u
                .of_type_names
                .iter()
                .filter_map(|name| self.concrete_type_by_name(name))
                .collect(),
            MetaType::Interface(i) => self
                .types
                .values()
                .filter(|t| match t {
                    MetaType::Object(o) => o.interface_names.iter().any(|n| n == &i.name),
                    _ => false,
                })
                .collect(),
            _ => panic!("possible_types called on a non-abstract type"),
        }
    }

    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|t| t.name() == possible_type.name())
    }

    /// Whether the set of concrete object types satisfying `t1` intersects
    /// the set satisfying `t2`. Used by the fragment-spread-is-possible rule.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if t1.name() == t2.name() {
            return true;
        }
        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .into_iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    pub fn is_subtype(&self, sub_type: &AstType, super_type: &AstType) -> bool {
        if sub_type == super_type {
            return true;
        }
        match (sub_type, super_type) {
            (AstType::NonNull(sub_inner), AstType::NonNull(super_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            (AstType::NonNull(sub_inner), super_type) => self.is_subtype(sub_inner, super_type),
            (AstType::List(sub_inner, _), AstType::List(super_inner, _)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            (AstType::Named(sub_name), AstType::Named(super_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            _ => false,
        }
    }

    fn is_named_subtype(&self, sub_name: &str, super_name: &str) -> bool {
        if sub_name == super_name {
            return true;
        }
        match (
            self.concrete_type_by_name(sub_name),
            self.concrete_type_by_name(super_name),
        ) {
            (Some(sub_type), Some(super_type)) => {
                super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
            }
            _ => false,
        }
    }
}
