//! The shared AST-walk trait every validator rule implements (spec §4.4).
//!
//! One [`crate::validation::visit`] call drives every registered rule's
//! visitor in lockstep over a single depth-first pass, pushing and popping
//! [`crate::typeinfo::TypeInfo`] scope as it enters/exits selection sets and
//! fields -- mirroring `juniper`'s `validation::visitor::visit` /
//! `validation::traits::Visitor` split.

use crate::ast::{
    Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment, Operation,
    Selection, VariableDefinition,
};
use crate::parser::Spanning;
use crate::validation::context::ValidatorContext;

#[allow(unused_variables, reason = "default no-op visitor methods")]
pub trait Visitor<'a> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {}
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {}

    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: &'a Spanning<Operation>) {}
    fn exit_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: &'a Spanning<Operation>) {}

    fn enter_fragment_definition(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<Fragment>) {}
    fn exit_fragment_definition(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<Fragment>) {}

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a (Spanning<compact_str::CompactString>, VariableDefinition),
    ) {
    }
    fn exit_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a (Spanning<compact_str::CompactString>, VariableDefinition),
    ) {
    }

    fn enter_directive(&mut self, ctx: &mut ValidatorContext<'a>, directive: &'a Spanning<Directive>) {}
    fn exit_directive(&mut self, ctx: &mut ValidatorContext<'a>, directive: &'a Spanning<Directive>) {}

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        name: &'a str,
        value: &'a Spanning<crate::ast::InputValue>,
    ) {
    }

    fn enter_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, set: &'a [Selection]) {}
    fn exit_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, set: &'a [Selection]) {}

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {}
    fn exit_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {}

    fn enter_fragment_spread(&mut self, ctx: &mut ValidatorContext<'a>, spread: &'a Spanning<FragmentSpread>) {}

    fn enter_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<InlineFragment>) {}
    fn exit_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<InlineFragment>) {}
}

/// Runs every visitor in `visitors` over `doc` in a single shared pass.
pub fn visit<'a>(visitors: &mut [Box<dyn Visitor<'a> + 'a>], ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    for v in visitors.iter_mut() {
        v.enter_document(ctx, doc);
    }

    for def in doc {
        match def {
            Definition::Operation(op) => visit_operation(visitors, ctx, op),
            Definition::Fragment(frag) => visit_fragment(visitors, ctx, frag),
        }
    }

    for v in visitors.iter_mut() {
        v.exit_document(ctx, doc);
    }
}

fn visit_operation<'a>(
    visitors: &mut [Box<dyn Visitor<'a> + 'a>],
    ctx: &mut ValidatorContext<'a>,
    op: &'a Spanning<Operation>,
) {
    let root_type = ctx.schema().and_then(|s| match op.item.operation_type {
        crate::ast::OperationType::Query => s.concrete_type_by_name(s.query_type_name()),
        crate::ast::OperationType::Mutation => {
            s.mutation_type_name().and_then(|n| s.concrete_type_by_name(n))
        }
        crate::ast::OperationType::Subscription => {
            s.subscription_type_name().and_then(|n| s.concrete_type_by_name(n))
        }
    });
    ctx.push_type(root_type.map(crate::schema::model::TypeType::Concrete));

    for v in visitors.iter_mut() {
        v.enter_operation_definition(ctx, op);
    }

    if let Some(defs) = &op.item.variable_definitions {
        for def in &defs.item {
            for v in visitors.iter_mut() {
                v.enter_variable_definition(ctx, def);
            }
            for v in visitors.iter_mut() {
                v.exit_variable_definition(ctx, def);
            }
        }
    }

    if let Some(directives) = &op.item.directives {
        visit_directives(visitors, ctx, directives);
    }

    visit_selection_set(visitors, ctx, &op.item.selection_set);

    for v in visitors.iter_mut() {
        v.exit_operation_definition(ctx, op);
    }
    ctx.pop_type();
}

fn visit_fragment<'a>(
    visitors: &mut [Box<dyn Visitor<'a> + 'a>],
    ctx: &mut ValidatorContext<'a>,
    frag: &'a Spanning<Fragment>,
) {
    let cond_type = ctx
        .schema()
        .and_then(|s| s.concrete_type_by_name(&frag.item.type_condition.item));
    ctx.push_type(cond_type.map(crate::schema::model::TypeType::Concrete));

    for v in visitors.iter_mut() {
        v.enter_fragment_definition(ctx, frag);
    }

    if let Some(directives) = &frag.item.directives {
        visit_directives(visitors, ctx, directives);
    }

    visit_selection_set(visitors, ctx, &frag.item.selection_set);

    for v in visitors.iter_mut() {
        v.exit_fragment_definition(ctx, frag);
    }
    ctx.pop_type();
}

fn visit_directives<'a>(
    visitors: &mut [Box<dyn Visitor<'a> + 'a>],
    ctx: &mut ValidatorContext<'a>,
    directives: &'a [Spanning<Directive>],
) {
    for directive in directives {
        for v in visitors.iter_mut() {
            v.enter_directive(ctx, directive);
        }
        if let Some(args) = &directive.item.arguments {
            for (name, value) in args {
                for v in visitors.iter_mut() {
                    v.enter_argument(ctx, name, value);
                }
            }
        }
        for v in visitors.iter_mut() {
            v.exit_directive(ctx, directive);
        }
    }
}

fn visit_selection_set<'a>(
    visitors: &mut [Box<dyn Visitor<'a> + 'a>],
    ctx: &mut ValidatorContext<'a>,
    set: &'a [Selection],
) {
    for v in visitors.iter_mut() {
        v.enter_selection_set(ctx, set);
    }

    for selection in set {
        match selection {
            Selection::Field(field) => {
                ctx.type_info_mut().enter_field(&field.item.name.item);
                for v in visitors.iter_mut() {
                    v.enter_field(ctx, field);
                }
                if let Some(args) = &field.item.arguments {
                    for (name, value) in args {
                        for v in visitors.iter_mut() {
                            v.enter_argument(ctx, name, value);
                        }
                    }
                }
                if let Some(directives) = &field.item.directives {
                    visit_directives(visitors, ctx, directives);
                }
                if let Some(sub_set) = &field.item.selection_set {
                    visit_selection_set(visitors, ctx, sub_set);
                }
                for v in visitors.iter_mut() {
                    v.exit_field(ctx, field);
                }
                ctx.type_info_mut().exit_field();
            }
            Selection::FragmentSpread(spread) => {
                for v in visitors.iter_mut() {
                    v.enter_fragment_spread(ctx, spread);
                }
                if let Some(directives) = &spread.item.directives {
                    visit_directives(visitors, ctx, directives);
                }
            }
            Selection::InlineFragment(frag) => {
                let cond_type = frag.item.type_condition.as_ref().and_then(|cond| {
                    ctx.schema().and_then(|s| s.concrete_type_by_name(&cond.item))
                });
                if frag.item.type_condition.is_some() {
                    ctx.push_type(cond_type.map(crate::schema::model::TypeType::Concrete));
                } else {
                    ctx.push_type(ctx.current_type().cloned());
                }

                for v in visitors.iter_mut() {
                    v.enter_inline_fragment(ctx, frag);
                }
                if let Some(directives) = &frag.item.directives {
                    visit_directives(visitors, ctx, directives);
                }
                visit_selection_set(visitors, ctx, &frag.item.selection_set);
                for v in visitors.iter_mut() {
                    v.exit_inline_fragment(ctx, frag);
                }
                ctx.pop_type();
            }
        }
    }

    for v in visitors.iter_mut() {
        v.exit_selection_set(ctx, set);
    }
}
