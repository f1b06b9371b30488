//! The context threaded through one validation run: the schema, the
//! accumulated errors, the fragment-name index, and the live [`TypeInfo`]
//! scope -- mirroring `juniper`'s `validation::context::ValidatorContext`.

use std::collections::HashSet;

use crate::ast::{fragments, Document};
use crate::error::RuleError;
use crate::schema::model::{SchemaType, TypeType};
use crate::typeinfo::TypeInfo;

pub struct ValidatorContext<'a> {
    schema: &'a SchemaType,
    errors: Vec<RuleError>,
    type_info: TypeInfo<'a>,
    fragment_names: HashSet<&'a str>,
}

impl<'a> ValidatorContext<'a> {
    pub fn new(schema: &'a SchemaType, doc: &'a Document) -> Self {
        let fragment_names = fragments(doc).map(|f| f.item.name.item.as_str()).collect();
        ValidatorContext {
            schema,
            errors: Vec::new(),
            type_info: TypeInfo::new(schema),
            fragment_names,
        }
    }

    pub fn schema(&self) -> Option<&'a SchemaType> {
        Some(self.schema)
    }

    pub fn report_error(&mut self, message: impl Into<String>, locations: &[crate::parser::SourcePosition]) {
        self.errors.push(RuleError::new(message, locations));
    }

    pub fn append_errors(&mut self, errors: Vec<RuleError>) {
        self.errors.extend(errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Sorts and returns every error, discarding secondary errors if any
    /// primary error survived (spec §4.4).
    pub fn into_errors(self) -> Vec<RuleError> {
        let mut errors = self.errors;
        let has_primary = errors.iter().any(|e| !e.is_secondary());
        if has_primary {
            errors.retain(|e| !e.is_secondary());
        }
        errors.sort();
        errors
    }

    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragment_names.contains(name)
    }

    pub fn type_info_mut(&mut self) -> &mut TypeInfo<'a> {
        &mut self.type_info
    }

    pub fn current_type(&self) -> Option<&TypeType<'a>> {
        self.type_info.current_type()
    }

    pub fn parent_type(&self) -> Option<&TypeType<'a>> {
        self.type_info.parent_type()
    }

    pub fn current_field_def(&self) -> Option<&'a crate::schema::meta::Field> {
        self.type_info.current_field_def()
    }

    pub fn push_type(&mut self, t: Option<TypeType<'a>>) {
        self.type_info.push_type(t);
    }

    pub fn pop_type(&mut self) {
        self.type_info.pop_type();
    }
}
