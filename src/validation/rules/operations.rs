//! Operations rule (spec §4.4 "Operations").

use std::collections::HashMap;

use crate::ast::{Document, OperationType};
use crate::parser::Spanning;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Operations {
    Operations::default()
}

#[derive(Default)]
pub struct Operations;

impl<'a> Visitor<'a> for Operations {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        let operations: Vec<_> = crate::ast::operations(doc).collect();

        let mut by_name: HashMap<&str, Vec<&Spanning<crate::ast::Operation>>> = HashMap::new();
        let mut anonymous = 0;
        for op in &operations {
            match &op.item.name {
                Some(name) => by_name.entry(&name.item).or_default().push(op),
                None => anonymous += 1,
            }
        }
        for (name, ops) in &by_name {
            if ops.len() > 1 {
                for op in ops {
                    ctx.report_error(
                        format!("There can be only one operation named \"{name}\""),
                        &[op.start],
                    );
                }
            }
        }
        if anonymous > 0 && operations.len() > 1 {
            for op in &operations {
                if op.item.name.is_none() {
                    ctx.report_error(
                        "This anonymous operation must be the only defined operation",
                        &[op.start],
                    );
                }
            }
        }

        for op in &operations {
            self.check_root_type(ctx, op);
            if op.item.operation_type == OperationType::Subscription {
                self.check_single_root_field(ctx, doc, op);
            }
        }
    }
}

impl Operations {
    fn check_root_type<'a>(&self, ctx: &mut ValidatorContext<'a>, op: &'a Spanning<crate::ast::Operation>) {
        let schema = ctx.schema().expect("schema always present during validation");
        let exists = match op.item.operation_type {
            OperationType::Query => true,
            OperationType::Mutation => schema.mutation_type_name().is_some(),
            OperationType::Subscription => schema.subscription_type_name().is_some(),
        };
        if !exists {
            ctx.report_error(
                format!("Schema is not configured for {}s", op.item.operation_type),
                &[op.start],
            );
        }
    }

    fn check_single_root_field<'a>(
        &self,
        ctx: &mut ValidatorContext<'a>,
        doc: &'a Document,
        op: &'a Spanning<crate::ast::Operation>,
    ) {
        let grouped = super::collect::grouped_fields(&op.item.selection_set, doc);
        if grouped.len() != 1 {
            ctx.report_error(
                format!(
                    "Subscription operations must have exactly one root field, found {}",
                    grouped.len()
                ),
                &[op.start],
            );
        }
    }
}
