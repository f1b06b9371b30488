//! Fragments rule (spec §4.4 "Fragments"): uniqueness, type-condition
//! validity, spread-target existence, spread-possibility, acyclic spread
//! graph, and reachability from at least one operation.
//!
//! Folds what the teacher keeps as five separate passes
//! (`unique_fragment_names`, `known_fragment_names`, `no_fragment_cycles`,
//! `no_unused_fragments`, `possible_fragment_spreads`) into one rule struct,
//! matching this crate's "one rule per spec section" organization.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::ast::{fragments, Document, Fragment, FragmentSpread, InlineFragment, Operation};
use crate::parser::{SourcePosition, Spanning};
use crate::schema::meta::MetaType;
use crate::validation::context::ValidatorContext;
use crate::validation::visitor::Visitor;

pub fn factory<'a>() -> Fragments<'a> {
    Fragments::default()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

#[derive(Default)]
pub struct Fragments<'a> {
    names: HashMap<&'a str, SourcePosition>,
    fragment_order: Vec<&'a str>,
    fragment_types: HashMap<&'a str, &'a MetaType>,
    scope_stack: Vec<Option<&'a MetaType>>,
    current_scope: Option<Scope<'a>>,
    spreads: HashMap<Scope<'a>, Vec<(&'a str, SourcePosition)>>,
}

impl<'a> Visitor<'a> for Fragments<'a> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        for frag in fragments(doc) {
            if let Some(t) = ctx.schema().and_then(|s| s.concrete_type_by_name(&frag.item.type_condition.item)) {
                self.fragment_types.insert(frag.item.name.item.as_str(), t);
            }
        }
    }

    fn enter_operation_definition(&mut self, _ctx: &mut ValidatorContext<'a>, op: &'a Spanning<Operation>) {
        self.current_scope = Some(Scope::Operation(op.item.name.as_ref().map(|n| n.item.as_str())));
    }

    fn enter_fragment_definition(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<Fragment>) {
        let name = frag.item.name.item.as_str();
        self.current_scope = Some(Scope::Fragment(name));
        self.fragment_order.push(name);

        match self.names.entry(name) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    format!("There can only be one fragment named {name}"),
                    &[*e.get(), frag.item.name.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(frag.item.name.start);
            }
        }

        let cond_name = frag.item.type_condition.item.as_str();
        match ctx.schema().and_then(|s| s.concrete_type_by_name(cond_name)) {
            Some(MetaType::Object(_)) | Some(MetaType::Interface(_)) | Some(MetaType::Union(_)) => {}
            Some(_) => ctx.report_error(
                format!("Fragment \"{name}\" cannot condition on non composite type \"{cond_name}\""),
                &[frag.item.type_condition.start],
            ),
            None => {
                ctx.report_error(format!("Unknown type \"{cond_name}\""), &[frag.item.type_condition.start]);
            }
        }
    }

    fn enter_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, _set: &'a [crate::ast::Selection]) {
        self.scope_stack.push(ctx.current_type().and_then(|t| t.to_concrete()));
    }

    fn exit_selection_set(&mut self, _ctx: &mut ValidatorContext<'a>, _set: &'a [crate::ast::Selection]) {
        self.scope_stack.pop();
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidatorContext<'a>, spread: &'a Spanning<FragmentSpread>) {
        let name = spread.item.name.item.as_str();
        if let Some(scope) = &self.current_scope {
            self.spreads.entry(scope.clone()).or_default().push((name, spread.start));
        }

        if !ctx.is_known_fragment(name) {
            ctx.report_error(format!("Unknown fragment \"{name}\""), &[spread.start]);
            return;
        }

        let (Some(schema), Some(parent), Some(frag_type)) = (
            ctx.schema(),
            self.scope_stack.last().copied().flatten(),
            self.fragment_types.get(name).copied(),
        ) else {
            return;
        };
        if !spread_is_possible(schema, parent, frag_type) {
            ctx.report_error(
                format!(
                    "Fragment \"{name}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\"",
                    parent.name(),
                    frag_type.name()
                ),
                &[spread.start],
            );
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, frag: &'a Spanning<InlineFragment>) {
        let Some(cond) = &frag.item.type_condition else { return };
        let (Some(schema), Some(parent), Some(frag_type)) = (
            ctx.schema(),
            self.scope_stack.last().copied().flatten(),
            ctx.schema().and_then(|s| s.concrete_type_by_name(&cond.item)),
        ) else {
            return;
        };
        if !spread_is_possible(schema, parent, frag_type) {
            ctx.report_error(
                format!(
                    "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\"",
                    parent.name(),
                    frag_type.name()
                ),
                &[frag.start],
            );
        }
    }

    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _doc: &'a Document) {
        self.check_cycles(ctx);
        self.check_unused(ctx);
    }
}

/// A spread is legal at a site of declared type `parent` if the set of
/// concrete object types satisfying `parent` intersects the set satisfying
/// `frag_type` -- except an interface fragment spread into a narrower
/// interface that it itself implements is always legal, even with an empty
/// implementer overlap today.
fn spread_is_possible(schema: &crate::schema::model::SchemaType, parent: &MetaType, frag_type: &MetaType) -> bool {
    if let MetaType::Interface(i) = frag_type {
        if i.name.as_str() == parent.name() {
            return true;
        }
    }
    schema.type_overlap(parent, frag_type)
}

impl<'a> Fragments<'a> {
    fn check_cycles(&self, ctx: &mut ValidatorContext<'a>) {
        let mut spreads: HashMap<&str, Vec<(&str, SourcePosition)>> = HashMap::new();
        for (scope, targets) in &self.spreads {
            if let Scope::Fragment(name) = scope {
                spreads.insert(name, targets.clone());
            }
        }

        let mut visited = HashSet::new();
        for name in &self.fragment_order {
            if !visited.contains(name) {
                detect_cycle(name, &spreads, &mut visited, &mut Vec::new(), &mut HashMap::new(), ctx);
            }
        }
    }

    fn check_unused(&self, ctx: &mut ValidatorContext<'a>) {
        let mut reachable = HashSet::new();
        for scope in self.spreads.keys() {
            if let Scope::Operation(_) = scope {
                self.collect_reachable(scope, &mut reachable);
            }
        }
        for name in &self.fragment_order {
            if !reachable.contains(name) {
                if let Some(pos) = self.names.get(name) {
                    ctx.report_error(format!("Fragment \"{name}\" is never used"), &[*pos]);
                }
            }
        }
    }

    fn collect_reachable(&self, from: &Scope<'a>, result: &mut HashSet<&'a str>) {
        if let Scope::Fragment(name) = from {
            if !result.insert(name) {
                return;
            }
        }
        if let Some(targets) = self.spreads.get(from) {
            for (name, _) in targets {
                self.collect_reachable(&Scope::Fragment(name), result);
            }
        }
    }
}

#[allow(clippy::too_many_arguments, reason = "mirrors the teacher's explicit worklist cycle detector")]
fn detect_cycle<'a>(
    from: &'a str,
    spreads: &HashMap<&'a str, Vec<(&'a str, SourcePosition)>>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<(&'a str, SourcePosition)>,
    path_indices: &mut HashMap<&'a str, usize>,
    ctx: &mut ValidatorContext<'a>,
) {
    visited.insert(from);
    let Some(targets) = spreads.get(from) else { return };
    path_indices.insert(from, path.len());

    for &(name, pos) in targets {
        if let Some(&index) = path_indices.get(name) {
            let err_pos = path.get(index).map(|(_, p)| *p).unwrap_or(pos);
            ctx.report_error(format!("Cannot spread fragment \"{name}\""), &[err_pos]);
        } else {
            path.push((name, pos));
            detect_cycle(name, spreads, visited, path, path_indices, ctx);
            path.pop();
        }
    }
    path_indices.remove(from);
}

#[cfg(test)]
mod tests {
    use crate::ast::{spanned, Definition, Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType, Selection};
    use crate::schema::meta::{Field as SchemaField, MetaType, ObjectMeta};
    use crate::schema::model::SchemaType;
    use crate::schema::SchemaBuilder;
    use crate::validation::validate;

    fn schema() -> SchemaType {
        SchemaBuilder::new()
            .add_type(MetaType::Object(
                ObjectMeta::new("Dog").field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .add_type(MetaType::Object(
                ObjectMeta::new("Cat").field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .add_type(MetaType::Object(
                ObjectMeta::new("Query")
                    .field(SchemaField::new("dog", crate::ast::Type::Named("Dog".into())))
                    .field(SchemaField::new("name", crate::ast::Type::Named("String".into()))),
            ))
            .query_type("Query")
            .build()
    }

    fn name_field() -> Selection {
        Selection::Field(spanned(Field {
            alias: None,
            name: spanned("name".into()),
            arguments: None,
            directives: None,
            selection_set: None,
        }))
    }

    fn fragment_def(name: &str, type_condition: &str, selection_set: Vec<Selection>) -> Definition {
        Definition::Fragment(spanned(Fragment {
            name: spanned(name.into()),
            type_condition: spanned(type_condition.into()),
            directives: None,
            selection_set,
        }))
    }

    fn spread(name: &str) -> Selection {
        Selection::FragmentSpread(spanned(FragmentSpread {
            name: spanned(name.into()),
            directives: None,
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
    fn duplicate_fragment_name_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![spread("F")]);
        doc.push(fragment_def("F", "Dog", vec![name_field()]));
        doc.push(fragment_def("F", "Dog", vec![name_field()]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("only be one fragment named F")));
    }

    #[test]
    fn fragment_on_non_composite_type_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![spread("F")]);
        doc.push(fragment_def("F", "String", vec![name_field()]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("cannot condition on non composite")));
    }

    #[test]
    fn fragment_on_unknown_type_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![spread("F")]);
        doc.push(fragment_def("F", "Phantom", vec![name_field()]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Unknown type \"Phantom\"")));
    }

    #[test]
    fn spread_of_unknown_fragment_is_rejected() {
        let schema = schema();
        let doc = operation_doc(vec![spread("Missing")]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Unknown fragment \"Missing\"")));
    }

    #[test]
    fn unused_fragment_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![name_field()]);
        doc.push(fragment_def("F", "Dog", vec![name_field()]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("is never used")));
    }

    #[test]
    fn cyclic_fragment_spread_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![spread("A")]);
        doc.push(fragment_def("A", "Dog", vec![spread("B")]));
        doc.push(fragment_def("B", "Dog", vec![spread("A")]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("Cannot spread fragment")));
    }

    #[test]
    fn impossible_fragment_spread_is_rejected() {
        let schema = schema();
        let mut doc = operation_doc(vec![Selection::Field(spanned(Field {
            alias: None,
            name: spanned("dog".into()),
            arguments: None,
            directives: None,
            selection_set: Some(vec![spread("CatFields")]),
        }))]);
        doc.push(fragment_def("CatFields", "Cat", vec![name_field()]));
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("can never be of type")));
    }

    #[test]
    fn well_formed_fragment_spread_is_accepted() {
        let schema = schema();
        let mut doc = operation_doc(vec![Selection::Field(spanned(Field {
            alias: None,
            name: spanned("dog".into()),
            arguments: None,
            directives: None,
            selection_set: Some(vec![spread("DogFields")]),
        }))]);
        doc.push(fragment_def("DogFields", "Dog", vec![name_field()]));
        assert!(validate(&schema, &doc).is_empty());
    }

    #[test]
    fn inline_fragment_spread_impossible_on_disjoint_type_is_rejected() {
        let schema = schema();
        let doc = operation_doc(vec![Selection::Field(spanned(Field {
            alias: None,
            name: spanned("dog".into()),
            arguments: None,
            directives: None,
            selection_set: Some(vec![Selection::InlineFragment(spanned(InlineFragment {
                type_condition: Some(spanned("Cat".into())),
                directives: None,
                selection_set: vec![name_field()],
            }))]),
        }))]);
        assert!(validate(&schema, &doc).iter().any(|e| e.message().contains("can never be of type")));
    }
}
