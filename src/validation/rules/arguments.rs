//! Arguments rule (spec §4.4 "Arguments").

use crate::ast::Directive;
use crate::parser::Spanning;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Arguments {
    Arguments
}

pub struct Arguments;

impl<'a> Visitor<'a> for Arguments {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<crate::ast::Field>) {
        let Some(field_def) = ctx.current_field_def() else { return };
        check_arguments(
            ctx,
            field.item.arguments.as_ref(),
            &field_def.arguments,
            &field.item.name.item,
        );
    }

    fn enter_directive(&mut self, ctx: &mut ValidatorContext<'a>, directive: &'a Spanning<Directive>) {
        let Some(schema) = ctx.schema() else { return };
        let Some(directive_def) = schema.directive_by_name(&directive.item.name.item) else { return };
        check_arguments(
            ctx,
            directive.item.arguments.as_ref(),
            &directive_def.arguments,
            &directive.item.name.item,
        );
    }
}

fn check_arguments<'a>(
    ctx: &mut ValidatorContext<'a>,
    supplied: Option<&'a crate::ast::Arguments>,
    defs: &crate::schema::meta::Arguments,
    owner_name: &str,
) {
    if let Some(supplied) = supplied {
        for (name, value) in supplied {
            if !defs.contains_key(name.as_str()) {
                ctx.report_error(
                    format!("Unknown argument \"{name}\" on \"{owner_name}\""),
                    &[value.start],
                );
            }
        }
    }
    for (name, def) in defs {
        let literal = supplied.and_then(|args| args.get(name.as_str()));
        let missing = match literal {
            None => true,
            Some(spanning) => spanning.item.is_null() && def.default_value.is_none(),
        };
        if missing && def.arg_type.is_non_null() && def.default_value.is_none() {
            ctx.report_error(
                format!("Argument \"{name}\" of required type \"{}\" was not provided", def.arg_type),
                &[],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{spanned, Arguments as AstArguments, Definition, Field, InputValue, Operation, OperationType, Selection};
    use crate::schema::meta::{Argument, Field as SchemaField, MetaType, ObjectMeta};
    use crate::schema::model::SchemaType;
    use crate::schema::SchemaBuilder;
    use crate::validation::validate;

    fn schema() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Query")
                    .field(
                        SchemaField::new("greet", crate::ast::Type::Named("String".into()))
                            .argument(Argument::new("loud", crate::ast::Type::Named("Boolean".into()).wrap_non_null())),
                    )
                    .field(
                        SchemaField::new("echo", crate::ast::Type::Named("String".into())).argument(
                            Argument::new("text", crate::ast::Type::Named("String".into()))
                                .default_value(InputValue::scalar("hi")),
                        ),
                    ),
            ))
            .query_type("Query")
            .build()
    }

    fn doc(field_name: &str, args: Option<AstArguments>) -> crate::ast::Document {
        let field = Field {
            alias: None,
            name: spanned(field_name.into()),
            arguments: args,
            directives: None,
            selection_set: None,
        };
        vec![Definition::Operation(spanned(Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![Selection::Field(spanned(field))],
        }))]
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        let schema = schema();
        let doc = doc("greet", None);
        let errors = validate(&schema, &doc);
        assert!(errors.iter().any(|e| e.message().contains("loud") && e.message().contains("not provided")));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let schema = schema();
        let mut args = AstArguments::new();
        args.insert("bogus".into(), spanned(InputValue::scalar("z")));
        let doc = doc("echo", Some(args));
        let errors = validate(&schema, &doc);
        assert!(errors.iter().any(|e| e.message().contains("Unknown argument \"bogus\"")));
    }

    #[test]
    fn supplied_required_argument_is_accepted() {
        let schema = schema();
        let mut args = AstArguments::new();
        args.insert("loud".into(), spanned(InputValue::scalar(true)));
        let doc = doc("greet", Some(args));
        assert!(validate(&schema, &doc).is_empty());
    }

    #[test]
    fn missing_optional_argument_with_default_is_accepted() {
        let schema = schema();
        let doc = doc("echo", None);
        assert!(validate(&schema, &doc).is_empty());
    }
}
