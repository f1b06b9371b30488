//! Request execution (spec §4.6): turns a validated document plus a root
//! value into a response value and an error list.
//!
//! Grounded in `juniper`'s `executor` module (`execute_validated_query` /
//! `get_operation` for dispatch, `types::base::resolve_selection_set_into_recursive`
//! for the collect -> resolve -> complete loop) but rebuilt around this
//! crate's own [`crate::future::Future`] instead of `juniper`'s direct
//! (blocking) or `async` (Tokio-driven) execution paths -- there is no
//! executor runtime here, just repeated polling under [`Future::block`].

pub mod context;
pub mod path;
pub mod promise;

pub use context::{FieldContext, FieldValue, RequestContext};
pub use path::{PathSegment, ResponsePath};
pub use promise::{ResolvePromise, ResolvePromiseSender};

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll};

use compact_str::CompactString;
use fnv::FnvHashMap;
use futures::Stream;
use indexmap::IndexMap;

use crate::ast::{self, Document, Field as AstField, Selection, Type as AstType};
use crate::coercion::{self, Variables};
use crate::error::{ExecutionError, FieldError, GraphQLError, Location};
use crate::future::Future;
use crate::parser::Spanning;
use crate::schema::meta::{Field as SchemaField, MetaType, ObjectMeta};
use crate::schema::model::SchemaType;
use crate::value::{Object, Value};

/// Everything one [`execute_request`]/[`subscribe`] call shares across every
/// field in the document: the read-only schema/document/variables, the
/// type-erased user context, the cancellation handle, the accumulated error
/// list, and the field-collection cache (spec §4.6 step 1 "memoize per
/// `(object type, selection list)` pair").
struct Executor<'r> {
    schema: &'r SchemaType,
    document: &'r Document,
    variables: Variables,
    user_context: &'r dyn Any,
    request_context: &'r RequestContext,
    errors: RefCell<Vec<ExecutionError>>,
    field_set_cache: RefCell<FnvHashMap<(CompactString, usize), Rc<IndexMap<CompactString, Vec<AstField>>>>>,
}

impl<'r> Executor<'r> {
    fn new(
        schema: &'r SchemaType,
        document: &'r Document,
        variables: Variables,
        user_context: &'r dyn Any,
        request_context: &'r RequestContext,
    ) -> Self {
        Executor {
            schema,
            document,
            variables,
            user_context,
            request_context,
            errors: RefCell::new(Vec::new()),
            field_set_cache: RefCell::new(FnvHashMap::default()),
        }
    }

    fn into_errors(self) -> Vec<ExecutionError> {
        let mut errors = self.errors.into_inner();
        errors.sort();
        errors.dedup();
        errors
    }

    /// Groups `set` into response-key buckets, expanding fragment spreads and
    /// inline fragments and dropping anything `@skip`/`@include` excludes.
    /// Cached by `(object type name, pointer identity of set)` -- repeat
    /// calls for the same concrete type against the same selection list (the
    /// common case: every element of a list field shares one merged
    /// sub-selection) skip re-walking the AST.
    fn collect_fields(&self, object_type: &MetaType, set: &[Selection]) -> Rc<IndexMap<CompactString, Vec<AstField>>> {
        let key = (CompactString::from(object_type.name()), set.as_ptr() as usize);
        if let Some(cached) = self.field_set_cache.borrow().get(&key) {
            return cached.clone();
        }
        let mut out = IndexMap::new();
        let mut visited = HashSet::new();
        self.collect_into(object_type, set, &mut visited, &mut out);
        let rc = Rc::new(out);
        self.field_set_cache.borrow_mut().insert(key, rc.clone());
        rc
    }

    fn collect_into(
        &self,
        object_type: &MetaType,
        set: &[Selection],
        visited: &mut HashSet<CompactString>,
        out: &mut IndexMap<CompactString, Vec<AstField>>,
    ) {
        for selection in set {
            match selection {
                Selection::Field(field) => {
                    if !self.directives_allow(field.item.directives.as_deref()) {
                        continue;
                    }
                    out.entry(CompactString::from(field.item.response_key()))
                        .or_default()
                        .push(field.item.clone());
                }
                Selection::FragmentSpread(spread) => {
                    if !self.directives_allow(spread.item.directives.as_deref()) {
                        continue;
                    }
                    let name = spread.item.name.item.as_str();
                    if visited.insert(CompactString::from(name)) {
                        if let Some(frag) = ast::fragment_by_name(self.document, name) {
                            if self.type_condition_applies(object_type, &frag.type_condition.item) {
                                self.collect_into(object_type, &frag.selection_set, visited, out);
                            }
                        }
                    }
                }
                Selection::InlineFragment(frag) => {
                    if !self.directives_allow(frag.item.directives.as_deref()) {
                        continue;
                    }
                    let applies = match &frag.item.type_condition {
                        Some(cond) => self.type_condition_applies(object_type, &cond.item),
                        None => true,
                    };
                    if applies {
                        self.collect_into(object_type, &frag.item.selection_set, visited, out);
                    }
                }
            }
        }
    }

    fn type_condition_applies(&self, object_type: &MetaType, cond_name: &str) -> bool {
        if object_type.name() == cond_name {
            return true;
        }
        match self.schema.concrete_type_by_name(cond_name) {
            Some(cond_type) if cond_type.is_abstract() => self.schema.is_possible_type(cond_type, object_type),
            _ => false,
        }
    }

    fn directives_allow(&self, directives: Option<&[Spanning<ast::Directive>]>) -> bool {
        let Some(directives) = directives else { return true };
        for directive in directives {
            let Some(def) = self.schema.directive_by_name(directive.item.name.item.as_str()) else {
                continue;
            };
            let Some(filter) = &def.field_collection_filter else { continue };
            let args = coercion::coerce_argument_values(
                &def.arguments,
                directive.item.arguments.as_ref(),
                self.schema,
                &self.variables,
            )
            .unwrap_or_default();
            if !filter(&args) {
                return false;
            }
        }
        true
    }
}

/// Records `error` at `path` exactly once and hands it back so the caller can
/// embed it in an `Err`. Every other place in this module that observes an
/// `Err` is re-propagating one already recorded here -- see the module-level
/// "Error model" note on [`complete_value`].
fn fail(exec: &Executor, error: FieldError, path: &ResponsePath, locations: Vec<Location>) -> FieldError {
    exec.errors
        .borrow_mut()
        .push(ExecutionError::new(error.clone(), locations, path.clone()));
    error
}

fn merged_sub_selections(occurrences: &[AstField]) -> Rc<[Selection]> {
    let merged: Vec<Selection> = occurrences
        .iter()
        .filter_map(|f| f.selection_set.clone())
        .flatten()
        .collect();
    Rc::from(merged)
}

/// Resolves one response-key bucket: argument coercion, cancellation check,
/// resolver invocation (or a meta-field shortcut), then value completion.
fn execute_one_field<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    object_type: &'r MetaType,
    parent_value: &Value,
    occurrences: &[AstField],
    path: ResponsePath,
) -> Future<'x, Value, FieldError> {
    let first = &occurrences[0];
    let name = first.name.item.as_str();
    let locations: Vec<Location> = occurrences.iter().map(|f| f.name.start.into()).collect();

    if name == "__typename" {
        return Future::ok(Value::scalar(object_type.name()));
    }
    if name == "__schema" && exec.schema.query_type_name() == object_type.name() {
        return Future::ok(introspect_schema(exec.schema));
    }
    if name == "__type" && exec.schema.query_type_name() == object_type.name() {
        let requested = first
            .arguments
            .as_ref()
            .and_then(|args| args.get("name"))
            .and_then(|v| match &v.item {
                ast::InputValue::Scalar(crate::value::ScalarValue::String(s)) => Some(s.to_string()),
                _ => None,
            });
        let value = requested
            .and_then(|n| exec.schema.concrete_type_by_name(&n))
            .map(introspect_type)
            .unwrap_or(Value::Null);
        return Future::ok(value);
    }

    let Some(field_def) = object_type.field_by_name(name) else {
        // The validator rejects unknown field names before execution ever
        // starts; this is unreachable on a validated document.
        return Future::ok(Value::Null);
    };

    if exec.request_context.is_cancelled() {
        let err = exec.request_context.error().unwrap_or_else(FieldError::cancelled);
        let err = fail(exec, err, &path, locations);
        return complete_value(exec, &field_def.field_type, Err(err), Rc::from(Vec::new()), path, Vec::new());
    }

    let args = match coercion::coerce_argument_values(
        &field_def.arguments,
        first.arguments.as_ref(),
        exec.schema,
        &exec.variables,
    ) {
        Ok(args) => args,
        Err(errs) => {
            let err = fail(exec, FieldError::new(errs.join("; ")), &path, locations);
            return complete_value(exec, &field_def.field_type, Err(err), Rc::from(Vec::new()), path, Vec::new());
        }
    };

    let ctx = FieldContext {
        schema: exec.schema,
        parent_value,
        arguments: args,
        user_context: exec.user_context,
        path: path.clone(),
        request_context: exec.request_context,
        is_subscribe: false,
    };

    let field_type = field_def.field_type.clone();
    let sub_selections = merged_sub_selections(occurrences);
    let raw_future = match &field_def.resolver {
        Some(resolver) => resolver(&ctx).into_future(),
        // No resolver configured: fall back to reading a same-named property
        // off the parent object, the convention every mainstream GraphQL
        // implementation's "default field resolver" follows for fields that
        // are plain data accessors rather than computed values.
        None => Future::ok(
            parent_value
                .as_object()
                .and_then(|o| o.get_field_value(name))
                .cloned()
                .unwrap_or(Value::Null),
        ),
    };

    raw_future.then(move |result| {
        let result = result.map_err(|e| fail(exec, e, &path, locations.clone()));
        complete_value(exec, &field_type, result, sub_selections, path.clone(), locations)
    })
}

/// Value completion (spec §4.6 step 2). `raw` is either a resolver's output
/// or a bubbled-up recursive completion result; by the time any `Err(e)`
/// reaches this function, `e` has *already* been recorded by whoever created
/// it (the resolver-error branch above, or the non-null/scalar/abstract-type
/// failure branches below). So every `Err` case here only decides whether to
/// *propagate* it (this slot's type is `NonNull`) or *catch* it into
/// `Ok(Value::Null)` (this slot's type is nullable) -- it never records
/// twice, which is what keeps "error recorded once, nulled up to the nearest
/// nullable ancestor" true even through deep nesting.
fn complete_value<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    ty: &'r AstType,
    raw: Result<Value, FieldError>,
    sub_selections: Rc<[Selection]>,
    path: ResponsePath,
    locations: Vec<Location>,
) -> Future<'x, Value, FieldError> {
    match ty {
        AstType::NonNull(inner) => match raw {
            Err(e) => Future::err(e),
            Ok(Value::Null) => {
                let e = fail(exec, FieldError::null_for_non_null(), &path, locations);
                Future::err(e)
            }
            Ok(value) => complete_non_null(exec, inner, value, sub_selections, path, locations),
        },
        _ => match raw {
            Err(_) => Future::ok(Value::Null),
            Ok(Value::Null) => Future::ok(Value::Null),
            Ok(value) => complete_non_null(exec, ty, value, sub_selections, path, locations).then(|result| match result {
                Ok(v) => Future::ok(v),
                Err(_) => Future::ok(Value::Null),
            }),
        },
    }
}

/// Completes a value against a type already known not to be `NonNull` at
/// this level (list, named scalar/enum/object/interface/union).
fn complete_non_null<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    ty: &'r AstType,
    value: Value,
    sub_selections: Rc<[Selection]>,
    path: ResponsePath,
    locations: Vec<Location>,
) -> Future<'x, Value, FieldError> {
    match ty {
        AstType::NonNull(_) => unreachable!("non-null wrapper already stripped by the caller"),
        AstType::List(elem_ty, _) => match value {
            Value::List(items) => {
                let futures: Vec<_> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        complete_value(
                            exec,
                            elem_ty,
                            Ok(item),
                            sub_selections.clone(),
                            path.push_index(i),
                            locations.clone(),
                        )
                    })
                    .collect();
                Future::join(futures).map_ok(Value::List)
            }
            other => {
                let e = fail(exec, FieldError::new(format!("Expected a list, found {other:?}")), &path, locations);
                Future::err(e)
            }
        },
        AstType::Named(name) => complete_named(exec, name, value, sub_selections, path, locations),
    }
}

fn complete_named<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    name: &str,
    value: Value,
    sub_selections: Rc<[Selection]>,
    path: ResponsePath,
    locations: Vec<Location>,
) -> Future<'x, Value, FieldError> {
    let Some(meta) = exec.schema.concrete_type_by_name(name) else {
        let e = fail(exec, FieldError::new(format!("Unknown type \"{name}\"")), &path, locations);
        return Future::err(e);
    };
    match meta {
        MetaType::Scalar(scalar) => match (scalar.coerce_result)(&value) {
            Ok(v) => Future::ok(v),
            Err(msg) => Future::err(fail(exec, FieldError::new(msg), &path, locations)),
        },
        MetaType::Enum(e_meta) => match value.as_scalar().and_then(|s| s.as_str()) {
            Some(v) if e_meta.values.iter().any(|ev| ev.name == v) => Future::ok(Value::scalar(v)),
            _ => Future::err(fail(
                exec,
                FieldError::new(format!("Invalid value for enum \"{}\"", e_meta.name)),
                &path,
                locations,
            )),
        },
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => {
            match select_concrete_type(exec.schema, meta, &value) {
                Some(concrete) => execute_selection_set(exec, concrete, value, &sub_selections, path, false),
                None => Future::err(fail(
                    exec,
                    FieldError::new(format!("Could not resolve a concrete type for abstract type \"{name}\"")),
                    &path,
                    locations,
                )),
            }
        }
        MetaType::InputObject(_) => Future::err(fail(
            exec,
            FieldError::new(format!("\"{name}\" is not an output type")),
            &path,
            locations,
        )),
    }
}

/// Picks the concrete object type a resolved value represents when
/// completing an interface/union-typed field (spec §3 "`IsTypeOf`"). Objects
/// with an explicit `IsTypeOf` are matched first; lacking one, the value is
/// expected to carry its own `__typename` hint (a common convention for
/// resolvers returning already-tagged data) -- an object with neither is
/// treated as a match by default so single-implementation interfaces/unions
/// still resolve without any tagging at all.
fn select_concrete_type<'r>(schema: &'r SchemaType, meta: &'r MetaType, value: &Value) -> Option<&'r MetaType> {
    match meta {
        MetaType::Object(_) => Some(meta),
        MetaType::Interface(_) | MetaType::Union(_) => schema.possible_types(meta).into_iter().find(|candidate| {
            let MetaType::Object(object) = candidate else { return false };
            match object.matches(value) {
                Some(result) => result,
                None => typename_hint_matches(object, value),
            }
        }),
        _ => None,
    }
}

fn typename_hint_matches(object: &ObjectMeta, value: &Value) -> bool {
    match value.as_object().and_then(|o| o.get_field_value("__typename")) {
        Some(Value::Scalar(crate::value::ScalarValue::String(s))) => s.as_str() == object.name.as_str(),
        Some(_) | None => true,
    }
}

/// Executes a selection set against `object_type`/`parent_value` (spec §4.6
/// step 3 "Serial vs. parallel scheduling"). Mutation root fields run
/// `serial`; every nested selection set (including a mutation's own field
/// return values) runs in parallel.
fn execute_selection_set<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    object_type: &'r MetaType,
    parent_value: Value,
    set: &[Selection],
    path: ResponsePath,
    serial: bool,
) -> Future<'x, Value, FieldError> {
    let grouped = exec.collect_fields(object_type, set);
    if serial {
        execute_selection_set_serial(exec, object_type, parent_value, grouped, path)
    } else {
        execute_selection_set_parallel(exec, object_type, parent_value, grouped, path)
    }
}

fn execute_selection_set_serial<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    object_type: &'r MetaType,
    parent_value: Value,
    grouped: Rc<IndexMap<CompactString, Vec<AstField>>>,
    path: ResponsePath,
) -> Future<'x, Value, FieldError> {
    let mut chain: Future<'x, (Object, Option<FieldError>), FieldError> =
        Future::ok((Object::with_capacity(grouped.len()), None));
    for (key, occurrences) in grouped.iter() {
        let key = key.clone();
        let occurrences = occurrences.clone();
        let field_path = path.push_key(key.as_str());
        let parent_value = parent_value.clone();
        // Each iteration's field future is built only inside this closure,
        // i.e. only once the previous field in the chain has reached
        // readiness -- this is what makes mutation field resolution serial
        // without any explicit blocking call.
        chain = chain.then(move |acc_result| {
            let (mut acc, mut failure) = match acc_result {
                Ok(v) => v,
                Err(e) => return Future::err(e),
            };
            execute_one_field(exec, object_type, &parent_value, &occurrences, field_path.clone()).then(move |result| {
                match result {
                    Ok(v) => acc.add_field(key.to_string(), v),
                    Err(e) => {
                        if failure.is_none() {
                            failure = Some(e);
                        }
                    }
                }
                Future::ok((acc, failure))
            })
        });
    }
    chain.then(|result| match result {
        Ok((_obj, Some(e))) => Future::err(e),
        Ok((obj, None)) => Future::ok(Value::Object(obj)),
        Err(e) => Future::err(e),
    })
}

fn execute_selection_set_parallel<'x, 'r: 'x>(
    exec: &'x Executor<'r>,
    object_type: &'r MetaType,
    parent_value: Value,
    grouped: Rc<IndexMap<CompactString, Vec<AstField>>>,
    path: ResponsePath,
) -> Future<'x, Value, FieldError> {
    let keys: Vec<CompactString> = grouped.keys().cloned().collect();
    let futures: Vec<Future<'x, Value, FieldError>> = grouped
        .iter()
        .map(|(key, occurrences)| {
            execute_one_field(exec, object_type, &parent_value, occurrences, path.push_key(key.as_str()))
        })
        .collect();
    Future::join(futures).map_ok(move |values| {
        let mut obj = Object::with_capacity(values.len());
        for (key, value) in keys.into_iter().zip(values) {
            obj.add_field(key.to_string(), value);
        }
        Value::Object(obj)
    })
}

/// A minimal `__schema`/`__type` introspection payload: enough to describe
/// the type registry's shape (names, kinds, field names/types, directive
/// locations). Full introspection-type-object construction belongs to the
/// external schema-building layer (spec §6 "Introspection surface" scopes
/// the type-system machinery out); this is only what the bundled reference
/// schema model in [`crate::schema`] can answer on its own.
fn introspect_schema(schema: &SchemaType) -> Value {
    let mut obj = Object::new();
    obj.add_field("queryType", introspect_type_ref(schema.query_type_name()));
    obj.add_field(
        "mutationType",
        schema.mutation_type_name().map(introspect_type_ref).unwrap_or(Value::Null),
    );
    obj.add_field(
        "subscriptionType",
        schema
            .subscription_type_name()
            .map(introspect_type_ref)
            .unwrap_or(Value::Null),
    );
    let types: Vec<Value> = schema
        .type_list()
        .filter(|t| !t.is_builtin())
        .map(introspect_type)
        .collect();
    obj.add_field("types", Value::List(types));
    let directives: Vec<Value> = schema.directive_list().map(introspect_directive).collect();
    obj.add_field("directives", Value::List(directives));
    Value::Object(obj)
}

fn introspect_type_ref(name: &str) -> Value {
    let mut obj = Object::new();
    obj.add_field("name", Value::scalar(name));
    Value::Object(obj)
}

fn introspect_type(meta: &MetaType) -> Value {
    let mut obj = Object::new();
    obj.add_field("name", Value::scalar(meta.name()));
    obj.add_field("kind", Value::scalar(format!("{:?}", meta.type_kind())));
    let fields = match meta {
        MetaType::Object(o) => Some(&o.fields),
        MetaType::Interface(i) => Some(&i.fields),
        _ => None,
    };
    obj.add_field(
        "fields",
        match fields {
            Some(fields) => Value::List(fields.values().filter(|f| !f.is_builtin()).map(introspect_field).collect()),
            None => Value::Null,
        },
    );
    Value::Object(obj)
}

fn introspect_field(field: &SchemaField) -> Value {
    let mut obj = Object::new();
    obj.add_field("name", Value::scalar(field.name.as_str()));
    obj.add_field("type", introspect_type_ref(field.field_type.innermost_name()));
    Value::Object(obj)
}

fn introspect_directive(directive: &crate::schema::model::DirectiveType) -> Value {
    let mut obj = Object::new();
    obj.add_field("name", Value::scalar(directive.name.as_str()));
    obj.add_field(
        "locations",
        Value::List(directive.locations.iter().map(|l| Value::scalar(l.to_string())).collect()),
    );
    Value::Object(obj)
}

/// Everything one execution needs (spec §6): the document, schema, selected
/// operation name, raw (pre-coercion) variable values, the root resolver's
/// parent value, the type-erased user context, and the cancellation handle.
pub struct Request<'r> {
    pub document: &'r Document,
    pub schema: &'r SchemaType,
    pub operation_name: Option<&'r str>,
    pub variable_values: &'r serde_json::Map<String, serde_json::Value>,
    pub initial_value: Value,
    pub context: &'r RequestContext,
    pub user_context: &'r dyn Any,
}

fn select_operation<'r>(
    doc: &'r Document,
    operation_name: Option<&'r str>,
) -> Result<&'r ast::Operation, GraphQLError<'r>> {
    match operation_name {
        Some(name) => ast::operations(doc)
            .map(|op| &op.item)
            .find(|op| op.name.as_ref().is_some_and(|n| n.item.as_str() == name))
            .ok_or(GraphQLError::UnknownOperationName(name)),
        None => {
            let mut ops = ast::operations(doc).map(|op| &op.item);
            let first = ops.next().ok_or(GraphQLError::NoOperationProvided)?;
            if ops.next().is_some() {
                Err(GraphQLError::MultipleOperationsProvided)
            } else {
                Ok(first)
            }
        }
    }
}

/// Executes a query or mutation request (spec §6 "`ExecuteRequest`"). Use
/// [`subscribe`] for subscription operations. `idle` is polled whenever a
/// step makes no progress (spec §5 "Idle handler contract") -- pass `None`
/// for a request known to never suspend on a pending promise.
pub fn execute_request<'r>(
    request: Request<'r>,
    idle: Option<&mut dyn FnMut() -> bool>,
) -> Result<(Option<Object>, Vec<ExecutionError>), GraphQLError<'r>> {
    let operation = select_operation(request.document, request.operation_name)?;

    if matches!(operation.operation_type, ast::OperationType::Subscription) {
        return Err(GraphQLError::IsSubscription(
            "use `subscribe` to execute a subscription operation",
        ));
    }

    let root_name = match operation.operation_type {
        ast::OperationType::Query => request.schema.query_type_name(),
        ast::OperationType::Mutation => request
            .schema
            .mutation_type_name()
            .expect("validated documents only select mutation fields against a schema with a mutation root"),
        ast::OperationType::Subscription => unreachable!("handled above"),
    };
    let root_type = request
        .schema
        .concrete_type_by_name(root_name)
        .unwrap_or_else(|| panic!("root type \"{root_name}\" missing from schema"));

    let empty_defs = Vec::new();
    let defs = operation
        .variable_definitions
        .as_ref()
        .map(|d| &d.item)
        .unwrap_or(&empty_defs);
    let variables =
        coercion::coerce_variable_definitions(defs, request.variable_values, request.schema).unwrap_or_default();

    let exec = Executor::new(request.schema, request.document, variables, request.user_context, request.context);
    let set: Rc<[Selection]> = Rc::from(operation.selection_set.clone());
    let serial = matches!(operation.operation_type, ast::OperationType::Mutation);

    let future = execute_selection_set(&exec, root_type, request.initial_value, &set, ResponsePath::root(), serial);
    let data = match future.try_block(idle) {
        Ok(Ok(Value::Object(obj))) => Some(obj),
        Ok(_) => None,
        Err(crate::future::Stalled) => {
            fail(&exec, FieldError::new("no idle handler defined"), &ResponsePath::root(), Vec::new());
            None
        }
    };
    Ok((data, exec.into_errors()))
}

/// A live subscription (spec §6 "`Subscribe`"): one [`execute_selection_set`]
/// run per event pulled from `source`. Each event is resolved synchronously
/// (via [`Future::try_block`] with no idle handler) against the subscription
/// root field's own `IsSubscribe`-flagged context -- feeding events from an
/// asynchronous transport into `source` is the caller's job, same as driving
/// [`execute_request`]'s idle handler is. A resolver that returns a pending
/// promise here has no idle handler to drive it, so the event's response
/// reports a "no idle handler defined" error rather than panicking.
pub struct Subscription<'r> {
    schema: &'r SchemaType,
    document: &'r Document,
    root_type_name: CompactString,
    selection_set: Rc<[Selection]>,
    variables: Variables,
    user_context: &'r dyn Any,
    request_context: &'r RequestContext,
    source: Box<dyn Iterator<Item = Value> + 'r>,
}

impl<'r> Stream for Subscription<'r> {
    type Item = (Option<Object>, Vec<ExecutionError>);

    fn poll_next(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(event) = this.source.next() else {
            return Poll::Ready(None);
        };
        let exec = Executor::new(
            this.schema,
            this.document,
            this.variables.clone(),
            this.user_context,
            this.request_context,
        );
        let root_type = this
            .schema
            .concrete_type_by_name(&this.root_type_name)
            .unwrap_or_else(|| panic!("root type \"{}\" missing from schema", this.root_type_name));
        let future = execute_selection_set(&exec, root_type, event, &this.selection_set, ResponsePath::root(), false);
        let data = match future.try_block(None) {
            Ok(Ok(Value::Object(obj))) => Some(obj),
            Ok(_) => None,
            Err(crate::future::Stalled) => {
                fail(&exec, FieldError::new("no idle handler defined"), &ResponsePath::root(), Vec::new());
                None
            }
        };
        Poll::Ready(Some((data, exec.into_errors())))
    }
}

/// Begins a subscription (spec §6 "`Subscribe`"). Rejects any request whose
/// selected operation is not a `subscription` (use [`execute_request`]
/// instead).
pub fn subscribe<'r>(
    request: Request<'r>,
    source: impl Iterator<Item = Value> + 'r,
) -> Result<Subscription<'r>, GraphQLError<'r>> {
    let operation = select_operation(request.document, request.operation_name)?;
    if !matches!(operation.operation_type, ast::OperationType::Subscription) {
        return Err(GraphQLError::IsNotSubscription(
            "use `execute_request` for query/mutation operations",
        ));
    }

    let root_name = request
        .schema
        .subscription_type_name()
        .expect("validated documents only select subscription fields against a schema with a subscription root");
    let root_type = request
        .schema
        .concrete_type_by_name(root_name)
        .unwrap_or_else(|| panic!("root type \"{root_name}\" missing from schema"));

    let empty_defs = Vec::new();
    let defs = operation
        .variable_definitions
        .as_ref()
        .map(|d| &d.item)
        .unwrap_or(&empty_defs);
    let variables =
        coercion::coerce_variable_definitions(defs, request.variable_values, request.schema).unwrap_or_default();

    Ok(Subscription {
        schema: request.schema,
        document: request.document,
        root_type_name: CompactString::from(root_type.name()),
        selection_set: Rc::from(operation.selection_set.clone()),
        variables,
        user_context: request.user_context,
        request_context: request.context,
        source: Box::new(source),
    })
}
