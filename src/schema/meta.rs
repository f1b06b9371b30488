//! Schema metadata types: the concrete representation of the external
//! "Schema object" contract (spec §3), modeled after `juniper`'s
//! `schema::meta` module but monomorphized to the built-in scalar set and
//! stripped of the macro-driven type-registry machinery that belongs to a
//! schema-builder layer outside this crate's scope.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::ast::{InputValue, Type};
use crate::value::Value;

/// Whether a field or enum value is deprecated, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeprecationStatus {
    Current,
    Deprecated(Option<CompactString>),
}

impl DeprecationStatus {
    pub fn is_deprecated(&self) -> bool {
        matches!(self, DeprecationStatus::Deprecated(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DeprecationStatus::Deprecated(Some(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// Coerces a query literal against this scalar, substituting any nested
/// variables from `vars` (already-coerced variable values).
pub type LiteralCoerceFn =
    Arc<dyn Fn(&InputValue, &IndexMap<CompactString, Value>) -> Result<Value, String>>;

/// Coerces a raw JSON-shaped variable value against this scalar.
pub type VariableCoerceFn = Arc<dyn Fn(&serde_json::Value) -> Result<Value, String>>;

/// Validates a resolver's raw output against this scalar at value-completion
/// time (spec §4.6 "Value completion" -- "call the type's result-coercion").
pub type ResultCoerceFn = Arc<dyn Fn(&Value) -> Result<Value, String>>;

#[derive(Clone)]
pub struct ScalarMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub coerce_literal: LiteralCoerceFn,
    pub coerce_variable: VariableCoerceFn,
    pub coerce_result: ResultCoerceFn,
}

impl fmt::Debug for ScalarMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarMeta").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Argument {
    pub name: CompactString,
    pub description: Option<String>,
    pub arg_type: Type,
    /// `None` means "no default"; `Some(InputValue::Null)` means "default is
    /// explicit null" -- the two are distinguished per spec §3.
    pub default_value: Option<InputValue>,
}

impl Argument {
    pub fn new(name: impl Into<CompactString>, arg_type: Type) -> Self {
        Argument {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: InputValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

pub type Arguments = IndexMap<CompactString, Argument>;

/// A resolver: given the parent value, coerced arguments and user context,
/// produces a [`crate::executor::FieldValue`] -- either an immediate value or
/// a [`crate::executor::promise::ResolvePromise`] deferring completion.
pub type Resolver = Arc<
    dyn Fn(&crate::executor::FieldContext<'_>) -> crate::executor::FieldValue,
>;

/// A field's resolver-visible cost model: given coerced arguments and the
/// carried-down cost context, returns this field's own cost plus any
/// multiplier/context to apply to its children (spec §4.4 "Cost").
pub type CostFn = Arc<
    dyn Fn(&IndexMap<CompactString, Value>, &serde_json::Value) -> crate::validation::rules::cost::CostStep
>;

#[derive(Clone)]
pub struct Field {
    pub name: CompactString,
    pub description: Option<String>,
    pub arguments: Arguments,
    pub field_type: Type,
    pub deprecation_status: DeprecationStatus,
    pub resolver: Option<Resolver>,
    pub cost: Option<CostFn>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

impl Field {
    pub fn new(name: impl Into<CompactString>, field_type: Type) -> Self {
        Field {
            name: name.into(),
            description: None,
            arguments: Arguments::new(),
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
            cost: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    pub fn deprecated(mut self, reason: Option<impl Into<CompactString>>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn cost(mut self, cost: CostFn) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }
}

#[derive(Clone, Debug)]
pub struct EnumValue {
    pub name: CompactString,
    pub description: Option<String>,
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    pub fn new(name: impl Into<CompactString>) -> Self {
        EnumValue {
            name: name.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }
}

/// Decides whether a resolved value should be interpreted as this concrete
/// object type when completing an interface/union-typed field (spec §3
/// "`IsTypeOf(value) → bool`").
pub type IsTypeOfFn = Arc<dyn Fn(&Value) -> bool>;

#[derive(Clone)]
pub struct ObjectMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub fields: IndexMap<CompactString, Field>,
    pub interface_names: Vec<CompactString>,
    pub is_type_of: Option<IsTypeOfFn>,
}

impl fmt::Debug for ObjectMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMeta")
            .field("name", &self.name)
            .field("interface_names", &self.interface_names)
            .finish_non_exhaustive()
    }
}

impl ObjectMeta {
    pub fn new(name: impl Into<CompactString>) -> Self {
        ObjectMeta {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            interface_names: Vec::new(),
            is_type_of: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn interfaces(mut self, names: impl IntoIterator<Item = impl Into<CompactString>>) -> Self {
        self.interface_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_type_of(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_type_of = Some(Arc::new(f));
        self
    }

    /// Whether `value` should resolve to this concrete type when completing
    /// an abstract (interface/union) field. Objects without an explicit
    /// `IsTypeOf` are matched structurally by the caller instead (see
    /// [`crate::executor::complete`]).
    pub fn matches(&self, value: &Value) -> Option<bool> {
        self.is_type_of.as_ref().map(|f| f(value))
    }
}

#[derive(Clone)]
pub struct EnumMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

impl fmt::Debug for EnumMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumMeta").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct InterfaceMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub fields: IndexMap<CompactString, Field>,
}

#[derive(Clone, Debug)]
pub struct UnionMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub of_type_names: Vec<CompactString>,
}

#[derive(Clone)]
pub struct InputObjectMeta {
    pub name: CompactString,
    pub description: Option<String>,
    pub input_fields: Arguments,
}

impl fmt::Debug for InputObjectMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputObjectMeta").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A named schema type. Structural wrappers (`NonNull`/`List`) live in
/// [`crate::ast::Type`] / [`super::model::TypeKind`], not here.
#[derive(Clone, Debug)]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Enum(EnumMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    InputObject(InputObjectMeta),
}

/// The seven kinds the GraphQL `__TypeKind` introspection enum distinguishes,
/// used only for reporting; `NonNull`/`List` are structural and never appear
/// as a [`MetaType`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(m) => &m.name,
            MetaType::Object(m) => &m.name,
            MetaType::Enum(m) => &m.name,
            MetaType::Interface(m) => &m.name,
            MetaType::Union(m) => &m.name,
            MetaType::InputObject(m) => &m.name,
        }
    }

    pub fn type_kind(&self) -> TypeKind {
        match self {
            MetaType::Scalar(_) => TypeKind::Scalar,
            MetaType::Object(_) => TypeKind::Object,
            MetaType::Enum(_) => TypeKind::Enum,
            MetaType::Interface(_) => TypeKind::Interface,
            MetaType::Union(_) => TypeKind::Union,
            MetaType::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match self {
            MetaType::Object(m) => m.fields.get(name),
            MetaType::Interface(m) => m.fields.get(name),
            _ => None,
        }
    }

    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            MetaType::InputObject(m) => m.input_fields.get(name),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Scalar(_) | MetaType::Enum(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_)
        )
    }

    pub fn is_builtin(&self) -> bool {
        self.name().starts_with("__")
    }
}
