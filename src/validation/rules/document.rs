//! Document rule (spec §4.4 "Document"): every top-level definition must be
//! an operation or a fragment definition.
//!
//! [`crate::ast::Definition`] only has those two variants, so this is
//! structurally guaranteed by the AST's type -- there is no malformed
//! top-level definition a parser could hand us that this rule would need to
//! reject. The rule still exists as an explicit no-op visitor so the full
//! rule set named in the spec is visible in [`super::visit_all_rules`].

use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Document {
    Document
}

pub struct Document;

impl<'a> Visitor<'a> for Document {}

#[cfg(test)]
mod tests {
    use crate::ast::{spanned, Definition, Field, Operation, OperationType, Selection};
    use crate::schema::meta::{Field as SchemaField, MetaType, ObjectMeta};
    use crate::schema::SchemaBuilder;
    use crate::validation::validate;

    #[test]
    fn a_document_of_only_operations_and_fragments_validates_without_this_rule_raising_anything() {
        let schema = SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Query").field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .query_type("Query")
            .build();
        let doc = vec![Definition::Operation(spanned(Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![Selection::Field(spanned(Field {
                alias: None,
                name: spanned("name".into()),
                arguments: None,
                directives: None,
                selection_set: None,
            }))],
        }))];
        assert!(validate(&schema, &doc).is_empty());
    }
}
