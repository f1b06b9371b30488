//! Directives rule (spec §4.4 "Directives"): every directive used must be
//! declared, used only at an allowed location, and appear at most once per
//! selection or definition.

use std::collections::HashSet;

use crate::ast::{Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType};
use crate::parser::Spanning;
use crate::schema::model::DirectiveLocation;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Directives {
    Directives
}

pub struct Directives;

impl<'a> Visitor<'a> for Directives {
    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: &'a Spanning<Operation>) {
        let location = match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        };
        check_directive_list(ctx, op.item.directives.as_deref(), location);
    }

    fn enter_fragment_definition(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<Fragment>) {
        check_directive_list(ctx, frag.item.directives.as_deref(), DirectiveLocation::FragmentDefinition);
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        check_directive_list(ctx, field.item.directives.as_deref(), DirectiveLocation::Field);
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidatorContext<'a>, spread: &'a Spanning<FragmentSpread>) {
        check_directive_list(ctx, spread.item.directives.as_deref(), DirectiveLocation::FragmentSpread);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<InlineFragment>) {
        check_directive_list(ctx, frag.item.directives.as_deref(), DirectiveLocation::InlineFragment);
    }
}

fn check_directive_list<'a>(
    ctx: &mut ValidatorContext<'a>,
    directives: Option<&'a [Spanning<crate::ast::Directive>]>,
    location: DirectiveLocation,
) {
    let Some(directives) = directives else { return };
    let Some(schema) = ctx.schema() else { return };
    let mut seen = HashSet::new();

    for directive in directives {
        let name = directive.item.name.item.as_str();
        let Some(def) = schema.directive_by_name(name) else {
            ctx.report_error(format!("Unknown directive \"{name}\""), &[directive.start]);
            continue;
        };

        if !def.locations.contains(&location) {
            ctx.report_error(
                format!("Directive \"{name}\" may not be used on {location}"),
                &[directive.start],
            );
        }

        if !seen.insert(name) {
            ctx.report_error(format!("The directive \"{name}\" can only be used once at this location"), &[directive.start]);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{spanned, Definition, Directive, Field, Fragment, InputValue, Operation, OperationType, Selection};
    use crate::schema::meta::{Field as SchemaField, MetaType, ObjectMeta};
    use crate::schema::model::SchemaType;
    use crate::schema::SchemaBuilder;
    use crate::validation::validate;

    fn schema() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Query").field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .query_type("Query")
            .build()
    }

    fn directive(name: &str, bool_arg: Option<bool>) -> crate::parser::Spanning<Directive> {
        let arguments = bool_arg.map(|b| {
            let mut args = crate::ast::Arguments::new();
            args.insert("if".into(), spanned(InputValue::scalar(b)));
            args
        });
        spanned(Directive {
            name: spanned(name.into()),
            arguments,
        })
    }

    fn field_with_directives(directives: Vec<crate::parser::Spanning<Directive>>) -> Selection {
        Selection::Field(spanned(Field {
            alias: None,
            name: spanned("name".into()),
            arguments: None,
            directives: Some(directives),
            selection_set: None,
        }))
    }

    fn operation_doc(selection_set: Vec<Selection>) -> crate::ast::Document {
        vec![Definition::Operation(spanned(Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set,
        }))]
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let schema = schema();
        let doc = operation_doc(vec![field_with_directives(vec![directive("bogus", None)])]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Unknown directive \"bogus\"")));
    }

    #[test]
    fn directive_used_at_disallowed_location_is_rejected() {
        let schema = schema();
        let frag = Definition::Fragment(spanned(Fragment {
            name: spanned("F".into()),
            type_condition: spanned("Query".into()),
            directives: Some(vec![directive("skip", Some(true))]),
            selection_set: vec![Selection::Field(spanned(Field {
                alias: None,
                name: spanned("name".into()),
                arguments: None,
                directives: None,
                selection_set: None,
            }))],
        }));
        let mut doc = operation_doc(vec![Selection::FragmentSpread(spanned(crate::ast::FragmentSpread {
            name: spanned("F".into()),
            directives: None,
        }))]);
        doc.push(frag);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("may not be used on")));
    }

    #[test]
    fn repeated_directive_at_same_location_is_rejected() {
        let schema = schema();
        let doc = operation_doc(vec![field_with_directives(vec![
            directive("skip", Some(false)),
            directive("skip", Some(false)),
        ])]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("can only be used once")));
    }

    #[test]
    fn directive_at_an_allowed_location_is_accepted() {
        let schema = schema();
        let doc = operation_doc(vec![field_with_directives(vec![directive("skip", Some(false))])]);
        assert!(validate(&schema, &doc).is_empty());
    }
}
