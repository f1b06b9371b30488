//! Type-info construction (spec §4.3): a single depth-first AST walk
//! annotating each node with its schema type, expected input type, default
//! value and resolved field definition.
//!
//! Rather than precomputing a pointer-keyed side-table, this mirrors
//! `juniper`'s `validation::context::ValidatorContext`: a stack of "current
//! scope type" that the shared rule walk in [`crate::validation`] pushes and
//! pops as it descends, queried live by each rule instead of looked up from
//! a prebuilt map. This is the same one-pass-over-the-AST cost, with no
//! separate allocation to key by node identity.

use crate::ast::Type as AstType;
use crate::schema::meta::{Argument, Field};
use crate::schema::model::{SchemaType, TypeType};

/// The live "where are we in the schema" state threaded through one AST walk.
pub struct TypeInfo<'a> {
    schema: &'a SchemaType,
    type_stack: Vec<Option<TypeType<'a>>>,
    parent_type_stack: Vec<Option<TypeType<'a>>>,
    input_type_stack: Vec<Option<AstType>>,
    field_def_stack: Vec<Option<&'a Field>>,
    argument_def_stack: Vec<Option<&'a Argument>>,
}

impl<'a> TypeInfo<'a> {
    pub fn new(schema: &'a SchemaType) -> Self {
        TypeInfo {
            schema,
            type_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            field_def_stack: Vec::new(),
            argument_def_stack: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a SchemaType {
        self.schema
    }

    pub fn current_type(&self) -> Option<&TypeType<'a>> {
        self.type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn parent_type(&self) -> Option<&TypeType<'a>> {
        self.parent_type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn current_input_type(&self) -> Option<&AstType> {
        self.input_type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn current_field_def(&self) -> Option<&'a Field> {
        self.field_def_stack.last().copied().flatten()
    }

    pub fn current_argument_def(&self) -> Option<&'a Argument> {
        self.argument_def_stack.last().copied().flatten()
    }

    pub fn push_type(&mut self, t: Option<TypeType<'a>>) {
        self.type_stack.push(t);
    }

    pub fn pop_type(&mut self) {
        self.type_stack.pop();
    }

    pub fn push_parent_type(&mut self, t: Option<TypeType<'a>>) {
        self.parent_type_stack.push(t);
    }

    pub fn pop_parent_type(&mut self) {
        self.parent_type_stack.pop();
    }

    pub fn push_input_type(&mut self, t: Option<AstType>) {
        self.input_type_stack.push(t);
    }

    pub fn pop_input_type(&mut self) {
        self.input_type_stack.pop();
    }

    pub fn push_field_def(&mut self, f: Option<&'a Field>) {
        self.field_def_stack.push(f);
    }

    pub fn pop_field_def(&mut self) {
        self.field_def_stack.pop();
    }

    pub fn push_argument_def(&mut self, a: Option<&'a Argument>) {
        self.argument_def_stack.push(a);
    }

    pub fn pop_argument_def(&mut self) {
        self.argument_def_stack.pop();
    }

    /// Enters a field selection on the current scope type: resolves its
    /// field definition (looking through object/interface field maps, with
    /// the `__typename` meta-field always available on composite types) and
    /// pushes the unwrapped return type as the new scope.
    pub fn enter_field(&mut self, name: &str) {
        let field_def = self.current_type().and_then(|t| t.to_concrete()).and_then(|t| {
            if name == "__typename" {
                None
            } else {
                t.field_by_name(name)
            }
        });
        self.push_parent_type(self.current_type().cloned());
        self.push_field_def(field_def);
        let next_type = field_def.and_then(|f| self.schema.make_type(&f.field_type));
        self.push_type(next_type);
    }

    pub fn exit_field(&mut self) {
        self.pop_type();
        self.pop_field_def();
        self.pop_parent_type();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Type;
    use crate::schema::meta::{MetaType, ObjectMeta};
    use crate::schema::SchemaBuilder;

    fn schema() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Pet").field(Field::new("name", Type::Named("String".into()))),
            ))
            .add_type(MetaType::Object(
                ObjectMeta::new("Query").field(Field::new("pet", Type::Named("Pet".into()))),
            ))
            .query_type("Query")
            .build()
    }

    #[test]
    fn entering_a_field_resolves_its_definition_and_pushes_its_return_type() {
        let schema = schema();
        let mut info = TypeInfo::new(&schema);
        let query = schema.concrete_type_by_name("Query").unwrap();
        info.push_type(Some(TypeType::Concrete(query)));

        info.enter_field("pet");
        assert_eq!(info.current_field_def().unwrap().name, "pet");
        assert_eq!(info.current_type().unwrap().innermost_name(), "Pet");
        assert_eq!(info.parent_type().unwrap().innermost_name(), "Query");

        info.exit_field();
        assert_eq!(info.current_type().unwrap().innermost_name(), "Query");
        assert!(info.current_field_def().is_none());
    }

    #[test]
    fn entering_typename_never_resolves_a_field_definition() {
        let schema = schema();
        let mut info = TypeInfo::new(&schema);
        let query = schema.concrete_type_by_name("Query").unwrap();
        info.push_type(Some(TypeType::Concrete(query)));

        info.enter_field("__typename");
        assert!(info.current_field_def().is_none());
        assert!(info.current_type().is_none());
    }
}
