//! The schema contract (spec §3) and its reference implementation (spec §3A).

pub mod builtin;
pub mod meta;
pub mod model;

use std::collections::HashMap;

use compact_str::CompactString;

pub use self::meta::MetaType;
pub use self::model::SchemaType;

/// Builds a [`SchemaType`] from its constituent named types plus root type
/// names, registering the built-in scalars automatically. Mirrors the way
/// `juniper`'s `RootNode::new` assembles a `SchemaType` from a `Registry`,
/// minus the registry/codegen machinery (schema construction from Rust types
/// is explicitly out of this crate's scope; callers build the type map by
/// hand or with their own builder).
pub struct SchemaBuilder {
    types: HashMap<CompactString, MetaType>,
    query_type_name: Option<CompactString>,
    mutation_type_name: Option<CompactString>,
    subscription_type_name: Option<CompactString>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for scalar in [
            builtin::int_scalar(),
            builtin::float_scalar(),
            builtin::string_scalar(),
            builtin::boolean_scalar(),
            builtin::id_scalar(),
        ] {
            types.insert(scalar.name.clone(), MetaType::Scalar(scalar));
        }
        SchemaBuilder {
            types,
            query_type_name: None,
            mutation_type_name: None,
            subscription_type_name: None,
        }
    }

    pub fn add_type(mut self, meta: MetaType) -> Self {
        self.types.insert(CompactString::from(meta.name()), meta);
        self
    }

    pub fn query_type(mut self, name: impl Into<CompactString>) -> Self {
        self.query_type_name = Some(name.into());
        self
    }

    pub fn mutation_type(mut self, name: impl Into<CompactString>) -> Self {
        self.mutation_type_name = Some(name.into());
        self
    }

    pub fn subscription_type(mut self, name: impl Into<CompactString>) -> Self {
        self.subscription_type_name = Some(name.into());
        self
    }

    /// Builds the schema. Panics if no query root was named, or if the named
    /// query/mutation/subscription root does not exist in the type map --
    /// the same "every type must resolve" invariant `juniper`'s
    /// `SchemaType::new` enforces by panicking on leftover placeholders.
    pub fn build(self) -> SchemaType {
        let query_type_name = self.query_type_name.expect("schema must declare a query root type");
        assert!(
            self.types.contains_key(&query_type_name),
            "query root type \"{query_type_name}\" not found in schema"
        );
        if let Some(name) = &self.mutation_type_name {
            assert!(self.types.contains_key(name), "mutation root type \"{name}\" not found in schema");
        }
        if let Some(name) = &self.subscription_type_name {
            assert!(self.types.contains_key(name), "subscription root type \"{name}\" not found in schema");
        }
        SchemaType::new(
            self.types,
            query_type_name,
            self.mutation_type_name,
            self.subscription_type_name,
        )
    }
}
