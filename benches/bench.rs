#[macro_use]
extern crate bencher;

use std::sync::Arc;

use bencher::Bencher;
use graphul::ast::{spanned, Definition, Field as AstField, Operation, OperationType, Selection, Type as AstType};
use graphul::executor::{execute_request, FieldContext, FieldValue, Request, RequestContext};
use graphul::schema::meta::{Field as SchemaField, ObjectMeta};
use graphul::schema::{MetaType, SchemaBuilder};

fn flat_schema() -> graphul::schema::SchemaType {
    let mut object = ObjectMeta::new("Query");
    for i in 0..20 {
        object = object.field(
            SchemaField::new(format!("field{i}"), AstType::Named("Int".into()))
                .resolver(Arc::new(move |_: &FieldContext<'_>| FieldValue::value(i as i64))),
        );
    }
    SchemaBuilder::new().add_type(MetaType::Object(object)).query_type("Query").build()
}

fn flat_query_document() -> Vec<Definition> {
    let selection_set = (0..20)
        .map(|i| {
            Selection::Field(spanned(AstField {
                alias: None,
                name: spanned(format!("field{i}").into()),
                arguments: None,
                directives: None,
                selection_set: None,
            }))
        })
        .collect();
    vec![Definition::Operation(spanned(Operation {
        operation_type: OperationType::Query,
        name: None,
        variable_definitions: None,
        directives: None,
        selection_set,
    }))]
}

fn execute_flat_query(b: &mut Bencher) {
    let schema = flat_schema();
    let doc = flat_query_document();
    let vars = serde_json::Map::new();
    let ctx = RequestContext::new();
    b.iter(|| {
        let request = Request {
            document: &doc,
            schema: &schema,
            operation_name: None,
            variable_values: &vars,
            initial_value: graphul::Value::Null,
            context: &ctx,
            user_context: &(),
        };
        execute_request(request, None).unwrap()
    });
}

fn nested_list_schema() -> graphul::schema::SchemaType {
    // "n" has no resolver, so it falls back to the default field resolver
    // (reads the same-named property off each list element).
    let item = ObjectMeta::new("Item").field(SchemaField::new("n", AstType::Named("Int".into())));
    let query = ObjectMeta::new("Query").field(
        SchemaField::new("items", AstType::Named("Item".into()).wrap_list()).resolver(Arc::new(
            |_: &FieldContext<'_>| {
                let items = (0..100)
                    .map(|i| {
                        let mut obj = graphul::Object::new();
                        obj.add_field("n", graphul::Value::scalar(i as i64));
                        graphul::Value::Object(obj)
                    })
                    .collect();
                FieldValue::value(graphul::Value::List(items))
            },
        )),
    );
    SchemaBuilder::new()
        .add_type(MetaType::Object(item))
        .add_type(MetaType::Object(query))
        .query_type("Query")
        .build()
}

fn nested_list_document() -> Vec<Definition> {
    let n_field = Selection::Field(spanned(AstField {
        alias: None,
        name: spanned("n".into()),
        arguments: None,
        directives: None,
        selection_set: None,
    }));
    let items_field = AstField {
        alias: None,
        name: spanned("items".into()),
        arguments: None,
        directives: None,
        selection_set: Some(vec![n_field]),
    };
    vec![Definition::Operation(spanned(Operation {
        operation_type: OperationType::Query,
        name: None,
        variable_definitions: None,
        directives: None,
        selection_set: vec![Selection::Field(spanned(items_field))],
    }))]
}

fn execute_nested_list_query(b: &mut Bencher) {
    let schema = nested_list_schema();
    let doc = nested_list_document();
    let vars = serde_json::Map::new();
    let ctx = RequestContext::new();
    b.iter(|| {
        let request = Request {
            document: &doc,
            schema: &schema,
            operation_name: None,
            variable_values: &vars,
            initial_value: graphul::Value::Null,
            context: &ctx,
            user_context: &(),
        };
        execute_request(request, None).unwrap()
    });
}

benchmark_group!(executor, execute_flat_query, execute_nested_list_query);
benchmark_main!(executor);
