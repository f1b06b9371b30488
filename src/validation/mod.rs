//! Validation (spec §4.4): confirms a document is well-formed against a
//! schema before any part of it is executed.
//!
//! [`validate`] runs the "lightweight" rules (ones the shared
//! [`visitor::Visitor`] walk can drive in a single pass) together, then the
//! "heavy" rules (ones that need their own dedicated traversal, see each
//! rule's own doc comment) as separate passes over the same document.
//! [`rules::cost::check_cost`] is deliberately not part of this default set --
//! callers opt into cost enforcement explicitly.

pub mod context;
pub mod rules;
pub mod visitor;

pub use context::ValidatorContext;
pub use visitor::{visit, Visitor};

use crate::ast::Document;
use crate::error::RuleError;
use crate::schema::model::SchemaType;

/// Runs every default validation rule over `doc` and returns the surviving
/// errors (primary errors only, if any exist; sorted by location+message).
pub fn validate<'a>(schema: &'a SchemaType, doc: &'a Document) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(schema, doc);

    {
        let mut visitors: Vec<Box<dyn Visitor<'a> + 'a>> = vec![
            Box::new(rules::document::factory()),
            Box::new(rules::operations::factory()),
            Box::new(rules::fields::factory()),
            Box::new(rules::arguments::factory()),
            Box::new(rules::directives::factory()),
            Box::new(rules::values::factory()),
            Box::new(rules::fragments::factory()),
        ];
        visit(&mut visitors, &mut ctx, doc);
    }

    ctx.append_errors(rules::fields::check_merging(doc, schema));
    ctx.append_errors(rules::variables::check(doc, schema));

    ctx.into_errors()
}
