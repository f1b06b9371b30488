//! Values rule (spec §4.4 "Values"): every supplied literal must coerce to
//! its expected type. Reuses [`crate::coercion::coerce_literal`] unchanged --
//! variable leaves are left unresolved here (an empty variable map) since
//! their runtime compatibility is the variables rule's job, not this one's.

use crate::ast::Directive;
use crate::coercion::{self, Variables};
use crate::parser::Spanning;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Values {
    Values
}

pub struct Values;

impl<'a> Visitor<'a> for Values {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<crate::ast::Field>) {
        let Some(field_def) = ctx.current_field_def() else { return };
        check_values(ctx, field.item.arguments.as_ref(), &field_def.arguments);
    }

    fn enter_directive(&mut self, ctx: &mut ValidatorContext<'a>, directive: &'a Spanning<Directive>) {
        let Some(schema) = ctx.schema() else { return };
        let Some(directive_def) = schema.directive_by_name(&directive.item.name.item) else { return };
        check_values(ctx, directive.item.arguments.as_ref(), &directive_def.arguments);
    }
}

fn check_values<'a>(
    ctx: &mut ValidatorContext<'a>,
    supplied: Option<&'a crate::ast::Arguments>,
    defs: &crate::schema::meta::Arguments,
) {
    let Some(schema) = ctx.schema() else { return };
    let Some(supplied) = supplied else { return };
    let empty = Variables::new();
    for (name, value) in supplied {
        if value.item.is_variable() {
            continue;
        }
        let Some(def) = defs.get(name.as_str()) else { continue };
        if let Err(e) = coercion::coerce_literal(&value.item, &def.arg_type, schema, &empty) {
            ctx.report_error(format!("Argument \"{name}\": {e}"), &[value.start]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{spanned, InputValue};
    use crate::schema::meta::{Argument, MetaType, ObjectMeta};
    use crate::schema::SchemaBuilder;
    use crate::validation::context::ValidatorContext;
    use crate::validation::visitor::visit;

    fn schema() -> crate::schema::model::SchemaType {
        SchemaBuilder::new()
            .add_type(
                MetaType::Object(
                    ObjectMeta::new("Query").field(
                        crate::schema::meta::Field::new("greet", crate::ast::Type::Named("String".into()))
                            .argument(Argument::new("loud", crate::ast::Type::Named("Boolean".into()))),
                    ),
                ),
            )
            .query_type("Query")
            .build()
    }

    fn field_with_arg(value: InputValue) -> crate::ast::Document {
        let mut args = crate::ast::Arguments::new();
        args.insert("loud".into(), spanned(value));
        let field = crate::ast::Field {
            alias: None,
            name: spanned("greet".into()),
            arguments: Some(args),
            directives: None,
            selection_set: None,
        };
        vec![crate::ast::Definition::Operation(spanned(crate::ast::Operation {
            operation_type: crate::ast::OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![crate::ast::Selection::Field(spanned(field))],
        }))]
    }

    #[test]
    fn mistyped_literal_is_rejected() {
        let schema = schema();
        let doc = field_with_arg(InputValue::scalar("yes"));
        let mut ctx = ValidatorContext::new(&schema, &doc);
        let mut visitors: Vec<Box<dyn Visitor>> = vec![Box::new(factory())];
        visit(&mut visitors, &mut ctx, &doc);
        assert!(ctx.has_errors());
    }

    #[test]
    fn well_typed_literal_is_accepted() {
        let schema = schema();
        let doc = field_with_arg(InputValue::scalar(true));
        let mut ctx = ValidatorContext::new(&schema, &doc);
        let mut visitors: Vec<Box<dyn Visitor>> = vec![Box::new(factory())];
        visit(&mut visitors, &mut ctx, &doc);
        assert!(!ctx.has_errors());
    }
}
